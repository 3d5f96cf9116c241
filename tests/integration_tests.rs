mod common;

use approx::assert_abs_diff_eq;
use common::run;
use discregrid::{
    geometry::{Dim3, Point3},
    grid::{
        cubic_lagrange::CubicLagrangeGrid, trilinear::TrilinearGrid, DiscreteGrid, GridType,
        QueryError,
    },
    io::grid_file,
};

#[test]
fn cube_sdf_is_negative_inside_and_positive_outside() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = common::write_unit_cube_obj(dir.path());
    let grid_path = dir.path().join("cube.cdm");

    run([
        "generate-sdf",
        path_str!(obj_path),
        format!("--output={}", grid_path.to_string_lossy()).as_str(),
        "--resolution=8,8,8",
    ]);
    common::assert_file_exists(&grid_path);

    let header = grid_file::read_header_from_file(&grid_path).unwrap();
    assert_eq!(header.grid_type, GridType::CubicLagrange);
    assert_eq!(header.n_fields, 1);

    let grid = CubicLagrangeGrid::load(&grid_path).unwrap();
    let center = grid.interpolate(0, &Point3::new(0.5, 0.5, 0.5)).unwrap();
    assert_abs_diff_eq!(center, -0.5, epsilon = 2e-2);
    let above = grid.interpolate(0, &Point3::new(0.5, 0.5, 1.1)).unwrap();
    assert_abs_diff_eq!(above, 0.1, epsilon = 2e-2);

    let (_, gradient) = grid
        .interpolate_with_gradient(0, &Point3::new(0.5, 0.5, 1.1))
        .unwrap();
    assert_abs_diff_eq!(gradient[Dim3::Z], 1.0, epsilon = 5e-2);
}

#[test]
fn inverted_trilinear_sdf_is_positive_inside() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = common::write_unit_cube_obj(dir.path());
    let grid_path = dir.path().join("output").join("cube_trilinear.cdm");

    run([
        "generate-sdf",
        path_str!(obj_path),
        format!("--output={}", grid_path.to_string_lossy()).as_str(),
        "--resolution=6,6,6",
        "--grid-type=trilinear",
        "--invert",
    ]);

    let header = grid_file::read_header_from_file(&grid_path).unwrap();
    assert_eq!(header.grid_type, GridType::Trilinear);

    let grid = TrilinearGrid::load(&grid_path).unwrap();
    assert!(grid.interpolate(0, &Point3::new(0.5, 0.5, 0.5)).unwrap() > 0.0);
    assert!(grid.interpolate(0, &Point3::new(1.1, 0.5, 0.5)).unwrap() < 0.0);
    assert!(CubicLagrangeGrid::load(&grid_path).is_err());
}

#[test]
fn narrow_band_sdf_discards_distant_cells() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = common::write_unit_cube_obj(dir.path());
    let grid_path = dir.path().join("cube_band.cdm");

    run([
        "generate-sdf",
        path_str!(obj_path),
        format!("--output={}", grid_path.to_string_lossy()).as_str(),
        "--resolution=10,10,10",
        "--padding=0.5",
        "--narrow-band=0.2",
    ]);

    let grid = CubicLagrangeGrid::load(&grid_path).unwrap();
    let field = grid.field(0).unwrap();
    assert!(field.n_present_cells() > 0);
    assert!(field.n_present_cells() < grid.n_cells());

    assert!(grid.interpolate(0, &Point3::new(0.5, 0.5, 1.05)).is_ok());
    let corner = *grid.domain().lower();
    assert_eq!(
        grid.interpolate(0, &corner),
        Err(QueryError::AbsentCoefficient)
    );
}

#[test]
fn existing_grid_file_is_overwritten_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = common::write_unit_cube_obj(dir.path());
    let grid_path = dir.path().join("cube.cdm");
    let output_arg = format!("--output={}", grid_path.to_string_lossy());

    run([
        "generate-sdf",
        path_str!(obj_path),
        output_arg.as_str(),
        "--resolution=2,2,2",
    ]);
    assert_eq!(
        CubicLagrangeGrid::load(&grid_path).unwrap().n_cells(),
        8
    );

    run([
        "generate-sdf",
        path_str!(obj_path),
        output_arg.as_str(),
        "--resolution=3,3,3",
        "--overwrite",
    ]);
    assert_eq!(
        CubicLagrangeGrid::load(&grid_path).unwrap().n_cells(),
        27
    );
}

#[test]
fn generated_grid_can_be_sampled_and_inspected() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = common::write_unit_cube_obj(dir.path());
    let grid_path = dir.path().join("cube.cdm");

    run([
        "--timing",
        "generate-sdf",
        path_str!(obj_path),
        format!("--output={}", grid_path.to_string_lossy()).as_str(),
        "--resolution=4,4,4",
        "--verbose",
    ]);
    run([
        "sample",
        path_str!(grid_path),
        "--point=0.5,0.5,-0.05",
        "--gradient",
    ]);
    run(["inspect", path_str!(grid_path)]);
}
