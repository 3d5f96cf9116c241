//! Command line interface for generating signed distance grids from meshes.

use crate::{
    cli::utils,
    exit_on_error, exit_on_false,
    geometry::In3D,
    grid::{
        cubic_lagrange::CubicLagrangeGrid, fgr, trilinear::TrilinearGrid, DiscreteGrid, GridType,
    },
    io::{obj, utils as io_utils, OverwriteMode, Verbosity},
    mesh::TriangleMesh,
    sdf::{self, SdfGridConfig},
};
use clap::{Arg, ArgMatches, Command};
use std::{
    io::{self, Write},
    path::Path,
};

/// Builds a representation of the `generate-sdf` command line subcommand.
pub fn create_generate_sdf_subcommand() -> Command<'static> {
    Command::new("generate-sdf")
        .about("Generate a grid with the signed distance to a triangle mesh")
        .long_about(
            "Generate a grid with the signed distance to a triangle mesh.\n\
             The mesh is read from an OBJ file and must be closed and consistently oriented.\n\
             The distance is negative inside the mesh unless the sign is inverted.",
        )
        .arg(
            Arg::new("input-file")
                .value_name("INPUT_OBJ")
                .help("Path to the OBJ file containing the mesh")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output")
                .require_equals(true)
                .value_name("FILE")
                .help("Path where the grid file should be written")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("resolution")
                .short('r')
                .long("resolution")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_names(&["NX", "NY", "NZ"])
                .help("Number of grid cells along each dimension")
                .takes_value(true)
                .default_value("10,10,10"),
        )
        .arg(
            Arg::new("padding")
                .long("padding")
                .require_equals(true)
                .value_name("FRACTION")
                .help(
                    "Margin around the mesh bounding box, as a fraction of the length of its diagonal",
                )
                .takes_value(true)
                .default_value("0.1"),
        )
        .arg(
            Arg::new("invert")
                .long("invert")
                .help("Make the distance positive inside the mesh"),
        )
        .arg(
            Arg::new("narrow-band")
                .long("narrow-band")
                .require_equals(true)
                .value_name("WIDTH")
                .help(
                    "Discard cells where no node is closer to the surface than this distance\n\
                     [default: keep all cells]",
                )
                .takes_value(true),
        )
        .arg(
            Arg::new("grid-type")
                .long("grid-type")
                .require_equals(true)
                .value_name("TYPE")
                .help("Type of grid to generate")
                .takes_value(true)
                .possible_values(&["cubic", "trilinear"])
                .default_value("cubic"),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Automatically overwrite any existing file"),
        )
}

/// Runs the actions for the `generate-sdf` subcommand using the given arguments.
pub fn run_generate_sdf_subcommand(arguments: &ArgMatches) {
    let config = construct_sdf_grid_config_from_arguments(arguments);
    let verbosity = utils::parse_verbosity(arguments, true);
    let overwrite_mode = utils::overwrite_mode_from_arguments(arguments);

    let input_file_path = Path::new(
        arguments
            .value_of("input-file")
            .expect("No value for required argument"),
    );
    let output_file_path = Path::new(
        arguments
            .value_of("output-file")
            .expect("No value for required argument"),
    );

    exit_on_false!(
        overwrite_mode == OverwriteMode::Always || !output_file_path.exists(),
        "Error: File {} already exists (use --overwrite to replace it)",
        output_file_path.display()
    );

    if verbosity.print_messages() {
        println!("Reading mesh from {}", input_file_path.display());
    }
    let mesh = exit_on_error!(
        obj::read_obj_mesh(input_file_path),
        "Error: Could not read mesh: {}"
    );
    if verbosity.print_messages() {
        println!(
            "Read mesh with {} vertices and {} faces",
            mesh.n_vertices(),
            mesh.n_faces()
        );
    }

    exit_on_error!(
        match config.grid_type {
            GridType::CubicLagrange => generate_and_save::<CubicLagrangeGrid, _>(
                &mesh,
                &config,
                &verbosity,
                output_file_path,
                overwrite_mode
            ),
            GridType::Trilinear => generate_and_save::<TrilinearGrid, _>(
                &mesh,
                &config,
                &verbosity,
                output_file_path,
                overwrite_mode
            ),
        },
        "Error: Could not generate grid: {}"
    );
}

fn construct_sdf_grid_config_from_arguments(arguments: &ArgMatches) -> SdfGridConfig {
    let resolution: Vec<usize> =
        utils::get_values_from_required_parseable_argument(arguments, "resolution");
    utils::verify_argument_value_count("resolution", &resolution, 3);
    exit_on_false!(
        resolution.iter().all(|&n| n > 0),
        "Error: Resolution must be larger than zero along every dimension"
    );

    let padding_fraction: fgr =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "padding");
    exit_on_false!(
        padding_fraction >= 0.0,
        "Error: Padding must be non-negative"
    );

    let narrow_band_width: Option<fgr> =
        utils::get_finite_float_value_from_parseable_argument(arguments, "narrow-band");
    if let Some(width) = narrow_band_width {
        exit_on_false!(width > 0.0, "Error: Narrow band width must be larger than zero");
    }

    let grid_type = utils::get_value_from_required_constrained_argument(
        arguments,
        "grid-type",
        &["cubic", "trilinear"],
        &[GridType::CubicLagrange, GridType::Trilinear],
    );

    SdfGridConfig {
        resolution: In3D::new(resolution[0], resolution[1], resolution[2]),
        padding_fraction,
        invert: arguments.is_present("invert"),
        narrow_band_width,
        grid_type,
    }
}

fn generate_and_save<G, P>(
    mesh: &TriangleMesh,
    config: &SdfGridConfig,
    verbosity: &Verbosity,
    output_file_path: P,
    overwrite_mode: OverwriteMode,
) -> io::Result<()>
where
    G: DiscreteGrid,
    P: AsRef<Path>,
{
    let output_file_path = output_file_path.as_ref();
    let grid: G = sdf::generate_sdf_grid(mesh, config, verbosity)?;

    if verbosity.print_messages() {
        println!("Writing grid to {}", output_file_path.display());
    }
    let file = io_utils::create_file_and_required_dirs(output_file_path, overwrite_mode)?;
    let mut writer = io::BufWriter::new(file);
    grid.write(&mut writer)?;
    writer.flush()
}
