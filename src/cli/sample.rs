//! Command line interface for evaluating grid fields at points.

use crate::{
    cli::utils,
    exit_on_error,
    geometry::Point3,
    grid::{
        cubic_lagrange::CubicLagrangeGrid, fgr, trilinear::TrilinearGrid, DiscreteGrid, GridType,
    },
    io::grid_file,
};
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

/// Builds a representation of the `sample` command line subcommand.
pub fn create_sample_subcommand() -> Command<'static> {
    Command::new("sample")
        .about("Evaluate a field of a grid file at a point")
        .arg(
            Arg::new("grid-file")
                .value_name("GRID_FILE")
                .help("Path to the grid file")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("point")
                .long("point")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .allow_hyphen_values(true)
                .value_names(&["X", "Y", "Z"])
                .help("Coordinates of the point to evaluate the field at")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("field")
                .long("field")
                .require_equals(true)
                .value_name("ID")
                .help("Index of the field to evaluate")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("gradient")
                .long("gradient")
                .help("Also evaluate the gradient of the field"),
        )
}

/// Runs the actions for the `sample` subcommand using the given arguments.
pub fn run_sample_subcommand(arguments: &ArgMatches) {
    let grid_file_path = Path::new(
        arguments
            .value_of("grid-file")
            .expect("No value for required argument"),
    );
    let coords: Vec<fgr> =
        utils::get_finite_float_values_from_required_parseable_argument(arguments, "point");
    utils::verify_argument_value_count("point", &coords, 3);
    let point = Point3::new(coords[0], coords[1], coords[2]);
    let field_id: usize = utils::get_value_from_required_parseable_argument(arguments, "field");
    let with_gradient = arguments.is_present("gradient");

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
            sample_grid(&grid, field_id, &point, with_gradient);
        }
        GridType::Trilinear => {
            let grid = exit_on_error!(
                TrilinearGrid::load(grid_file_path),
                "Error: Could not read grid file: {}"
            );
            sample_grid(&grid, field_id, &point, with_gradient);
        }
    }
}

fn sample_grid<G: DiscreteGrid>(
    grid: &G,
    field_id: usize,
    point: &Point3<fgr>,
    with_gradient: bool,
) {
    if with_gradient {
        let (value, gradient) = exit_on_error!(
            grid.interpolate_with_gradient(field_id, point),
            "Error: Could not evaluate field {0} at {1}: {2}",
            field_id,
            point
        );
        println!("value: {}", value);
        println!("gradient: {}", gradient);
    } else {
        let value = exit_on_error!(
            grid.interpolate(field_id, point),
            "Error: Could not evaluate field {0} at {1}: {2}",
            field_id,
            point
        );
        println!("value: {}", value);
    }
}
