//! Function for building the command line hierarchy.

use super::{
    generate_sdf::create_generate_sdf_subcommand, inspect::create_inspect_subcommand,
    sample::create_sample_subcommand,
};
use clap::{self, Arg, Command};

/// Build the `discregrid` command line hierarchy.
pub fn build() -> Command<'static> {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("Print status messages"),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .global(true)
                .help("Show progress bars for long-running operations"),
        )
        .subcommand(create_generate_sdf_subcommand())
        .subcommand(create_sample_subcommand())
        .subcommand(create_inspect_subcommand())
}
