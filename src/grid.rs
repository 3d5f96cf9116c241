//! Discretization grids over axis-aligned domains.

pub mod cubic_lagrange;
pub mod trilinear;

use crate::{
    field::DiscreteField,
    geometry::{
        BoundingBox3,
        Dim3::{self, X, Y, Z},
        Idx3, In3D, Point3, Vec3,
    },
    io::{grid_file, utils, OverwriteMode, Verbosity},
};
use std::{error, fmt, io, path::Path};

/// Floating-point precision to use for grid coordinates and field values.
#[allow(non_camel_case_types)]
pub type fgr = f64;

/// The concrete family of basis functions used by a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridType {
    CubicLagrange = 0,
    Trilinear = 1,
}

impl GridType {
    /// Returns the grid type with the given numeric code, if any.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::CubicLagrange),
            1 => Some(Self::Trilinear),
            _ => None,
        }
    }

    /// Returns the numeric code of the grid type.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CubicLagrange => "cubic Lagrange",
            Self::Trilinear => "trilinear",
        })
    }
}

/// Reason why a field could not be evaluated at a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// The point lies outside the domain of the grid.
    OutOfDomain,
    /// No field with the given ID has been added to the grid.
    UnknownField(usize),
    /// The point lies in a pruned cell, or one of the coefficients the
    /// evaluation depends on was never sampled.
    AbsentCoefficient,
    /// A gradient was requested from shape functions computed without derivatives.
    MissingDerivatives,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfDomain => write!(f, "Point is outside the grid domain"),
            Self::UnknownField(field_id) => write!(f, "No field with ID {}", field_id),
            Self::AbsentCoefficient => write!(f, "Field has no coefficients at point"),
            Self::MissingDerivatives => {
                write!(f, "Shape functions were determined without derivatives")
            }
        }
    }
}

impl error::Error for QueryError {}

/// Upper bound on the number of lattice nodes per grid vertex, attained by
/// the one vertex and six edge nodes of the cubic lattice.
const MAX_NODES_PER_VERTEX: usize = 7;

/// Location of a point within a grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellLocation {
    /// 3D index of the containing cell.
    pub indices: Idx3<usize>,
    /// Linear index of the containing cell.
    pub cell: usize,
    /// Coordinates of the point relative to the cell, in [-1, 1] along each dimension.
    pub local_coords: Vec3<fgr>,
}

/// Domain, resolution and cell addressing shared by all grid types.
///
/// The cell size and cell count are derived from the domain and resolution
/// when the grid domain is created and can not be modified independently.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDomain {
    domain: BoundingBox3<fgr>,
    resolution: In3D<usize>,
    cell_size: Vec3<fgr>,
    inv_cell_size: Vec3<fgr>,
    n_cells: usize,
}

impl GridDomain {
    /// Creates a new grid domain covering the given box with the given number
    /// of cells along each dimension.
    ///
    /// # Panics
    ///
    /// If any resolution component is zero or the domain has zero extent
    /// along any dimension.
    pub fn new(domain: BoundingBox3<fgr>, resolution: In3D<usize>) -> Self {
        for &dim in &Dim3::slice() {
            assert_ne!(
                resolution[dim], 0,
                "Cannot create grid with resolution zero along any dimension"
            );
            assert!(
                domain.upper()[dim] > domain.lower()[dim],
                "Cannot create grid with zero extent along any dimension"
            );
        }
        assert!(
            Self::supports_resolution(&resolution),
            "Grid resolution {} has too many nodes",
            resolution
        );

        let diagonal = domain.diagonal();
        let cell_size = Vec3::with_each_component(|dim| diagonal[dim] / (resolution[dim] as fgr));
        let inv_cell_size = cell_size.recip();
        let n_cells = resolution[X] * resolution[Y] * resolution[Z];

        Self {
            domain,
            resolution,
            cell_size,
            inv_cell_size,
            n_cells,
        }
    }

    /// Whether all node indices of a grid with the given resolution fit in
    /// 32 bits, for every supported grid type.
    pub fn supports_resolution(resolution: &In3D<usize>) -> bool {
        let (nx, ny, nz) = resolution.to_tuple();
        (nx + 1)
            .checked_mul(ny + 1)
            .and_then(|n| n.checked_mul(nz + 1))
            .and_then(|n| n.checked_mul(MAX_NODES_PER_VERTEX))
            .map_or(false, |n| n < u32::MAX as usize)
    }

    /// Returns a reference to the domain box of the grid.
    pub fn domain(&self) -> &BoundingBox3<fgr> {
        &self.domain
    }

    /// Returns a reference to the number of cells along each dimension.
    pub fn resolution(&self) -> &In3D<usize> {
        &self.resolution
    }

    /// Returns a reference to the extent of a grid cell in each dimension.
    pub fn cell_size(&self) -> &Vec3<fgr> {
        &self.cell_size
    }

    /// Returns a reference to the reciprocal of the cell extents.
    pub fn inv_cell_size(&self) -> &Vec3<fgr> {
        &self.inv_cell_size
    }

    /// Returns the total number of cells.
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Converts a linear cell index into the 3D index of the cell.
    ///
    /// # Panics
    ///
    /// If the linear index is not smaller than the number of cells.
    pub fn single_to_multi_index(&self, cell: usize) -> Idx3<usize> {
        assert!(
            cell < self.n_cells,
            "Cell index {} out of bounds for grid with {} cells",
            cell,
            self.n_cells
        );
        let (nx, ny, _) = self.resolution.to_tuple();
        let nxy = nx * ny;
        let k = cell / nxy;
        let remainder = cell % nxy;
        Idx3::new(remainder % nx, remainder / nx, k)
    }

    /// Converts the 3D index of a cell into its linear index.
    pub fn multi_to_single_index(&self, indices: &Idx3<usize>) -> usize {
        debug_assert!(
            Dim3::slice()
                .iter()
                .all(|&dim| indices[dim] < self.resolution[dim]),
            "Cell indices {} out of bounds for grid resolution {}",
            indices,
            self.resolution
        );
        let (nx, ny, _) = self.resolution.to_tuple();
        indices[X] + nx * (indices[Y] + ny * indices[Z])
    }

    /// Computes the box covered by the cell with the given 3D index.
    ///
    /// The upper corner of the last cell along a dimension coincides exactly
    /// with the upper domain bound, so that the cells tile the domain.
    pub fn subdomain(&self, indices: &Idx3<usize>) -> BoundingBox3<fgr> {
        let lower_bounds = self.domain.lower();
        let upper_bounds = self.domain.upper();
        let lower = Point3::with_each_component(|dim| {
            lower_bounds[dim] + (indices[dim] as fgr) * self.cell_size[dim]
        });
        let upper = Point3::with_each_component(|dim| {
            if indices[dim] + 1 >= self.resolution[dim] {
                upper_bounds[dim]
            } else {
                lower_bounds[dim] + ((indices[dim] + 1) as fgr) * self.cell_size[dim]
            }
        });
        BoundingBox3::new(lower, upper)
    }

    /// Computes the box covered by the cell with the given linear index.
    pub fn subdomain_of_cell(&self, cell: usize) -> BoundingBox3<fgr> {
        self.subdomain(&self.single_to_multi_index(cell))
    }

    /// Finds the cell containing the given point and the coordinates of the
    /// point relative to the cell.
    ///
    /// Cells are closed at their lower faces, so a point on a face shared by
    /// two cells belongs to the cell above it. Points on the upper domain
    /// boundary belong to the last cell.
    pub fn locate(&self, point: &Point3<fgr>) -> Result<CellLocation, QueryError> {
        if !self.domain.contains(point) {
            return Err(QueryError::OutOfDomain);
        }
        let lower_bounds = self.domain.lower();

        let indices = Idx3::with_each_component(|dim| {
            let scaled = (point[dim] - lower_bounds[dim]) * self.inv_cell_size[dim];
            usize::min(scaled.floor() as usize, self.resolution[dim] - 1)
        });

        let local_coords = Vec3::with_each_component(|dim| {
            let cell_lower = lower_bounds[dim] + (indices[dim] as fgr) * self.cell_size[dim];
            let local = 2.0 * (point[dim] - cell_lower) * self.inv_cell_size[dim] - 1.0;
            local.clamp(-1.0, 1.0)
        });

        Ok(CellLocation {
            cell: self.multi_to_single_index(&indices),
            indices,
            local_coords,
        })
    }

    /// Computes the position of the grid vertex with the given 3D index,
    /// where vertex indices run from zero to the resolution inclusive.
    pub fn vertex_position(&self, vertex: &Idx3<usize>) -> Point3<fgr> {
        self.lattice_position(vertex, &Vec3::zero())
    }

    /// Computes the position of the point offset from the given grid vertex
    /// by the given fractions of the cell size.
    pub fn lattice_position(
        &self,
        vertex: &Idx3<usize>,
        cell_fractions: &Vec3<fgr>,
    ) -> Point3<fgr> {
        let lower_bounds = self.domain.lower();
        let upper_bounds = self.domain.upper();
        Point3::with_each_component(|dim| {
            if vertex[dim] == self.resolution[dim] && cell_fractions[dim] == 0.0 {
                upper_bounds[dim]
            } else {
                lower_bounds[dim]
                    + ((vertex[dim] as fgr) + cell_fractions[dim]) * self.cell_size[dim]
            }
        })
    }

    /// Returns the scale factor converting derivatives with respect to local
    /// cell coordinates into derivatives with respect to space.
    pub fn local_to_spatial_derivative_scale(&self) -> Vec3<fgr> {
        &self.inv_cell_size * 2.0
    }
}

/// Layout of the nodes carrying field coefficients in a grid.
///
/// Nodes are shared between neighbouring cells so that interpolated values
/// are continuous across cell faces.
pub trait NodeLattice: Sync {
    /// Number of nodes contributing to the interpolation within a single cell.
    const NODES_PER_CELL: usize;

    /// Returns the total number of nodes in the lattice.
    fn n_nodes(&self) -> usize;

    /// Computes the spatial position of the node with the given index.
    fn node_position(&self, node: usize) -> Point3<fgr>;

    /// Writes the indices of the nodes of the given cell into `nodes`,
    /// in the order expected by the shape functions.
    fn fill_cell_nodes(&self, indices: &Idx3<usize>, nodes: &mut [u32]);
}

/// Defines the properties of a grid holding discretized scalar fields.
pub trait DiscreteGrid: NodeLattice + Sized + Send {
    /// Shape functions of a point, which can be reused to evaluate any field
    /// of the grid at that point.
    type ShapeFunctions: Clone + Send + Sync;

    /// The specific type of the grid.
    const TYPE: GridType;

    /// Creates a new grid without any fields.
    fn new(domain: BoundingBox3<fgr>, resolution: In3D<usize>) -> Self;

    /// Creates a grid with the given domain and existing fields.
    ///
    /// The fields must have been created for a grid of the same type and domain.
    fn from_fields(grid_domain: GridDomain, fields: Vec<DiscreteField>) -> Self;

    /// Returns a reference to the domain and cell addressing of the grid.
    fn grid_domain(&self) -> &GridDomain;

    /// Returns a slice with all fields in order of creation.
    fn fields(&self) -> &[DiscreteField];

    /// Samples the given function at every node for which the sample
    /// predicate holds, and stores the result as a new field.
    ///
    /// Nodes rejected by the predicate are marked as absent. The value
    /// `field::ABSENT_COEFFICIENT` is reserved for this, so a function
    /// returning it also leaves the node absent.
    ///
    /// # Returns
    ///
    /// The ID of the new field.
    fn add_function_with_predicate<C, P>(
        &mut self,
        function: C,
        verbosity: &Verbosity,
        sample_predicate: P,
    ) -> usize
    where
        C: Fn(&Point3<fgr>) -> fgr + Sync,
        P: Fn(&Point3<fgr>) -> bool + Sync;

    /// Determines the shape functions of the given field at the given point.
    ///
    /// Derivatives of the shape functions are only computed if
    /// `with_derivatives` is true, and are required for evaluating gradients.
    fn determine_shape_functions(
        &self,
        field_id: usize,
        point: &Point3<fgr>,
        with_derivatives: bool,
    ) -> Result<Self::ShapeFunctions, QueryError>;

    /// Evaluates the given field using previously determined shape functions.
    fn interpolate_with_shape_functions(
        &self,
        field_id: usize,
        shape_functions: &Self::ShapeFunctions,
    ) -> Result<fgr, QueryError>;

    /// Evaluates the given field and its gradient using previously
    /// determined shape functions.
    fn interpolate_gradient_with_shape_functions(
        &self,
        field_id: usize,
        shape_functions: &Self::ShapeFunctions,
    ) -> Result<(fgr, Vec3<fgr>), QueryError>;

    /// Discards the coefficients of the given field in all cells where the
    /// predicate is false for every node.
    ///
    /// The predicate receives the position and value of a node.
    /// The default implementation keeps all coefficients.
    ///
    /// # Panics
    ///
    /// If the field does not exist.
    fn reduce_field<P>(&mut self, field_id: usize, _predicate: P)
    where
        P: Fn(&Point3<fgr>, fgr) -> bool + Sync,
    {
        assert!(
            field_id < self.n_fields(),
            "No field with ID {}",
            field_id
        );
    }

    /// Samples the given function at every node and stores the result as a new field.
    fn add_function<C>(&mut self, function: C, verbosity: &Verbosity) -> usize
    where
        C: Fn(&Point3<fgr>) -> fgr + Sync,
    {
        self.add_function_with_predicate(function, verbosity, |_| true)
    }

    /// Returns the number of fields in the grid.
    fn n_fields(&self) -> usize {
        self.fields().len()
    }

    /// Returns a reference to the field with the given ID.
    fn field(&self, field_id: usize) -> Result<&DiscreteField, QueryError> {
        self.fields()
            .get(field_id)
            .ok_or(QueryError::UnknownField(field_id))
    }

    /// Evaluates the given field at the given point.
    fn interpolate(&self, field_id: usize, point: &Point3<fgr>) -> Result<fgr, QueryError> {
        let shape_functions = self.determine_shape_functions(field_id, point, false)?;
        self.interpolate_with_shape_functions(field_id, &shape_functions)
    }

    /// Evaluates the given field and its gradient at the given point.
    fn interpolate_with_gradient(
        &self,
        field_id: usize,
        point: &Point3<fgr>,
    ) -> Result<(fgr, Vec3<fgr>), QueryError> {
        let shape_functions = self.determine_shape_functions(field_id, point, true)?;
        self.interpolate_gradient_with_shape_functions(field_id, &shape_functions)
    }

    /// Evaluates the first field added to the grid at the given point.
    fn interpolate_default_field(&self, point: &Point3<fgr>) -> Result<fgr, QueryError> {
        self.interpolate(0, point)
    }

    /// Returns a reference to the domain box of the grid.
    fn domain(&self) -> &BoundingBox3<fgr> {
        self.grid_domain().domain()
    }

    /// Returns a reference to the number of cells along each dimension.
    fn resolution(&self) -> &In3D<usize> {
        self.grid_domain().resolution()
    }

    /// Returns a reference to the extent of a grid cell in each dimension.
    fn cell_size(&self) -> &Vec3<fgr> {
        self.grid_domain().cell_size()
    }

    /// Returns a reference to the reciprocal of the cell extents.
    fn inv_cell_size(&self) -> &Vec3<fgr> {
        self.grid_domain().inv_cell_size()
    }

    /// Returns the total number of cells.
    fn n_cells(&self) -> usize {
        self.grid_domain().n_cells()
    }

    /// Converts a linear cell index into the 3D index of the cell.
    fn single_to_multi_index(&self, cell: usize) -> Idx3<usize> {
        self.grid_domain().single_to_multi_index(cell)
    }

    /// Converts the 3D index of a cell into its linear index.
    fn multi_to_single_index(&self, indices: &Idx3<usize>) -> usize {
        self.grid_domain().multi_to_single_index(indices)
    }

    /// Computes the box covered by the cell with the given 3D index.
    fn subdomain(&self, indices: &Idx3<usize>) -> BoundingBox3<fgr> {
        self.grid_domain().subdomain(indices)
    }

    /// Computes the box covered by the cell with the given linear index.
    fn subdomain_of_cell(&self, cell: usize) -> BoundingBox3<fgr> {
        self.grid_domain().subdomain_of_cell(cell)
    }

    /// Writes the grid and all its fields in binary format.
    fn write<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        grid_file::write_grid(writer, self)
    }

    /// Reads a grid written by [`DiscreteGrid::write`].
    fn read<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        grid_file::read_grid(reader)
    }

    /// Saves the grid and all its fields to the given binary file.
    fn save<P: AsRef<Path>>(&self, file_path: P) -> io::Result<()> {
        let file = utils::create_file_and_required_dirs(file_path, OverwriteMode::Always)?;
        let mut writer = io::BufWriter::new(file);
        self.write(&mut writer)?;
        io::Write::flush(&mut writer)
    }

    /// Loads a grid from the given binary file.
    fn load<P: AsRef<Path>>(file_path: P) -> io::Result<Self> {
        let mut reader = io::BufReader::new(utils::open_file_and_map_err(file_path)?);
        Self::read(&mut reader)
    }

    /// Replaces the grid with the one stored in the given binary file.
    ///
    /// The grid is left untouched if loading fails.
    fn reload<P: AsRef<Path>>(&mut self, file_path: P) -> io::Result<()> {
        *self = Self::load(file_path)?;
        Ok(())
    }
}
