//! Generation of discretized signed distance fields for triangle meshes.

use crate::{
    geometry::{BoundingBox3, In3D, Vec3},
    grid::{fgr, DiscreteGrid, GridType},
    io::Verbosity,
    mesh::{distance::MeshDistance, TriangleMesh},
};
use std::{fmt, io};

/// Configuration parameters for signed distance grids.
#[derive(Clone, Debug)]
pub struct SdfGridConfig {
    /// Number of grid cells along each dimension.
    pub resolution: In3D<usize>,
    /// Margin added on each side of the mesh bounding box, as a fraction of
    /// the length of its diagonal.
    pub padding_fraction: fgr,
    /// Whether to flip the sign of the distance, so that it is positive inside.
    pub invert: bool,
    /// If specified, cells where no node is closer to the surface than this
    /// distance are discarded.
    pub narrow_band_width: Option<fgr>,
    /// Type of grid to generate.
    pub grid_type: GridType,
}

impl SdfGridConfig {
    pub const DEFAULT_RESOLUTION: [usize; 3] = [10, 10, 10];
    pub const DEFAULT_PADDING_FRACTION: fgr = 0.1;
    pub const DEFAULT_INVERT: bool = false;
    pub const DEFAULT_GRID_TYPE: GridType = GridType::CubicLagrange;

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        assert!(
            (&self.resolution).into_iter().all(|&n| n > 0),
            "Resolution must be larger than zero along every dimension"
        );
        assert!(
            self.padding_fraction >= 0.0 && self.padding_fraction.is_finite(),
            "Padding fraction must be finite and non-negative"
        );
        if let Some(width) = self.narrow_band_width {
            assert!(width > 0.0, "Narrow band width must be larger than zero");
        }
    }
}

impl Default for SdfGridConfig {
    fn default() -> Self {
        let [nx, ny, nz] = Self::DEFAULT_RESOLUTION;
        SdfGridConfig {
            resolution: In3D::new(nx, ny, nz),
            padding_fraction: Self::DEFAULT_PADDING_FRACTION,
            invert: Self::DEFAULT_INVERT,
            narrow_band_width: None,
            grid_type: Self::DEFAULT_GRID_TYPE,
        }
    }
}

impl fmt::Display for SdfGridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} grid with resolution {}, padding {}",
            self.grid_type, self.resolution, self.padding_fraction
        )?;
        if self.invert {
            write!(f, ", inverted sign")?;
        }
        if let Some(width) = self.narrow_band_width {
            write!(f, ", narrow band width {}", width)?;
        }
        Ok(())
    }
}

/// Computes the domain of a signed distance grid for the given mesh.
///
/// The domain is the bounding box of the mesh extended on every side by the
/// padding fraction of its diagonal.
pub fn compute_sdf_domain(
    mesh: &TriangleMesh,
    padding_fraction: fgr,
) -> io::Result<BoundingBox3<fgr>> {
    let bounds = mesh.bounding_box().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Mesh has no vertices")
    })?;
    let margin = padding_fraction * bounds.diagonal().length();
    let domain = bounds.extended(&Vec3::equal_components(margin));
    if domain.diagonal().min() <= 0.0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Grid domain {} has zero extent", domain),
        ));
    }
    Ok(domain)
}

/// Creates a grid holding the signed distance to the given mesh.
///
/// # Parameters
///
/// - `mesh`: Closed and consistently oriented triangle mesh.
/// - `config`: Configuration parameters for the grid.
/// - `verbosity`: Whether and how to pass non-critical information to the user.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the grid, with the signed distance as its only field.
/// - `Err`: Contains an error if the mesh is empty or flat.
///
/// # Type parameters
///
/// - `G`: Type of grid to generate.
pub fn generate_sdf_grid<G: DiscreteGrid>(
    mesh: &TriangleMesh,
    config: &SdfGridConfig,
    verbosity: &Verbosity,
) -> io::Result<G> {
    config.validate();
    if mesh.n_faces() == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Mesh has no faces",
        ));
    }

    let domain = compute_sdf_domain(mesh, config.padding_fraction)?;
    if verbosity.print_messages() {
        println!(
            "Generating {} over {} for mesh with {} faces",
            config,
            domain,
            mesh.n_faces()
        );
    }

    let mut grid = G::new(domain, config.resolution);

    let distance = MeshDistance::new(mesh);
    let sign = if config.invert { -1.0 } else { 1.0 };
    let field_id = grid.add_function(|point| sign * distance.signed_distance(point), verbosity);

    if let Some(width) = config.narrow_band_width {
        let n_cells_before = grid.field(field_id).map_or(0, |field| field.n_present_cells());
        grid.reduce_field(field_id, |_, value| value.abs() <= width);
        if verbosity.print_messages() {
            let n_cells_after = grid.field(field_id).map_or(0, |field| field.n_present_cells());
            if n_cells_after == n_cells_before {
                println!("Kept all {} cells in narrow band", n_cells_before);
            } else {
                println!(
                    "Kept {} of {} cells in narrow band",
                    n_cells_after, n_cells_before
                );
            }
        }
    }
    Ok(grid)
}
