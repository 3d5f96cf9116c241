//! Function for running the command line program.

use super::{
    build, generate_sdf::run_generate_sdf_subcommand, inspect::run_inspect_subcommand,
    sample::run_sample_subcommand,
};
use clap::ArgMatches;
use std::time::Instant;

/// Runs the `discregrid` command line program.
pub fn run() {
    let command = build::build();
    run_with_args(command.get_matches());
}

/// Runs the `discregrid` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    let start_instant = Instant::now();

    if let Some(generate_sdf_arguments) = arguments.subcommand_matches("generate-sdf") {
        run_generate_sdf_subcommand(generate_sdf_arguments);
    }
    if let Some(sample_arguments) = arguments.subcommand_matches("sample") {
        run_sample_subcommand(sample_arguments);
    }
    if let Some(inspect_arguments) = arguments.subcommand_matches("inspect") {
        run_inspect_subcommand(inspect_arguments);
    }

    if arguments.is_present("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}
