//! Command line interface for printing information about grid files.

use crate::{
    exit_on_error,
    field::{DiscreteField, ABSENT_COEFFICIENT},
    grid::{
        cubic_lagrange::CubicLagrangeGrid, fgr, trilinear::TrilinearGrid, DiscreteGrid, GridType,
    },
    io::grid_file,
};
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

/// Builds a representation of the `inspect` command line subcommand.
pub fn create_inspect_subcommand() -> Command<'static> {
    Command::new("inspect")
        .about("Print information about a grid file")
        .arg(
            Arg::new("grid-file")
                .value_name("GRID_FILE")
                .help("Path to the grid file")
                .required(true)
                .takes_value(true),
        )
}

/// Runs the actions for the `inspect` subcommand using the given arguments.
pub fn run_inspect_subcommand(arguments: &ArgMatches) {
    let grid_file_path = Path::new(
        arguments
            .value_of("grid-file")
            .expect("No value for required argument"),
    );
    let header = exit_on_error!(
        grid_file::read_header_from_file(grid_file_path),
        "Error: Could not read grid file header: {}"
    );
    match header.grid_type {
        GridType::CubicLagrange => {
            let grid = exit_on_error!(
                CubicLagrangeGrid::load(grid_file_path),
                "Error: Could not read grid file: {}"
            );
            print_grid_info(&grid);
        }
        GridType::Trilinear => {
            let grid = exit_on_error!(
                TrilinearGrid::load(grid_file_path),
                "Error: Could not read grid file: {}"
            );
            print_grid_info(&grid);
        }
    }
}

fn print_grid_info<G: DiscreteGrid>(grid: &G) {
    println!("Grid type: {}", G::TYPE);
    println!("Domain: {}", grid.domain());
    println!("Resolution: {}", grid.resolution());
    println!("Cell size: {}", grid.cell_size());
    println!("Number of cells: {}", grid.n_cells());
    println!("Number of nodes: {}", grid.n_nodes());
    println!("Number of fields: {}", grid.n_fields());
    for (field_id, field) in grid.fields().iter().enumerate() {
        print_field_info(field_id, field);
    }
}

fn print_field_info(field_id: usize, field: &DiscreteField) {
    println!("Field {}:", field_id);
    println!(
        "    Coefficients: {} ({} absent)",
        field.n_coefficients(),
        field.n_absent_coefficients()
    );
    println!("    Cells: {}", field.n_present_cells());
    let (min_value, max_value) = field
        .coefficients()
        .iter()
        .filter(|&&value| value != ABSENT_COEFFICIENT)
        .fold((fgr::INFINITY, fgr::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    if min_value <= max_value {
        println!("    Value range: [{}, {}]", min_value, max_value);
    }
}
