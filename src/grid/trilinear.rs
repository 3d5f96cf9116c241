//! Grid with trilinear interpolation within each cell.

use super::{fgr, DiscreteGrid, GridDomain, GridType, NodeLattice, QueryError};
use crate::{
    field::DiscreteField,
    geometry::{
        BoundingBox3,
        Dim3::{X, Y, Z},
        Idx3, In3D, Point3, Vec3,
    },
    interpolation::{
        determine_cell_shape_functions,
        trilinear::{TrilinearBasis, N_NODES},
        ShapeFunctions,
    },
    io::Verbosity,
};

/// A grid of cells interpolated trilinearly between the cell vertices.
///
/// Fields can not be reduced, so `reduce_field` leaves them untouched.
#[derive(Clone, Debug)]
pub struct TrilinearGrid {
    grid_domain: GridDomain,
    fields: Vec<DiscreteField>,
}

impl TrilinearGrid {
    fn vertex(&self, i: usize, j: usize, k: usize) -> usize {
        let resolution = self.grid_domain.resolution();
        i + (resolution[X] + 1) * (j + (resolution[Y] + 1) * k)
    }
}

impl NodeLattice for TrilinearGrid {
    const NODES_PER_CELL: usize = N_NODES;

    fn n_nodes(&self) -> usize {
        let (nx, ny, nz) = self.grid_domain.resolution().to_tuple();
        (nx + 1) * (ny + 1) * (nz + 1)
    }

    fn node_position(&self, node: usize) -> Point3<fgr> {
        assert!(
            node < self.n_nodes(),
            "Node index {} out of bounds for lattice with {} nodes",
            node,
            self.n_nodes()
        );
        let resolution = self.grid_domain.resolution();
        let (nx, ny) = (resolution[X] + 1, resolution[Y] + 1);
        self.grid_domain
            .vertex_position(&Idx3::new(node % nx, (node / nx) % ny, node / (nx * ny)))
    }

    fn fill_cell_nodes(&self, indices: &Idx3<usize>, nodes: &mut [u32]) {
        assert_eq!(nodes.len(), N_NODES);
        for (local_node, node) in nodes.iter_mut().enumerate() {
            let (a, b, c) = (local_node & 1, (local_node >> 1) & 1, (local_node >> 2) & 1);
            *node = self.vertex(indices[X] + a, indices[Y] + b, indices[Z] + c) as u32;
        }
    }
}

impl DiscreteGrid for TrilinearGrid {
    type ShapeFunctions = ShapeFunctions<N_NODES>;

    const TYPE: GridType = GridType::Trilinear;

    fn new(domain: BoundingBox3<fgr>, resolution: In3D<usize>) -> Self {
        Self::from_fields(GridDomain::new(domain, resolution), Vec::new())
    }

    fn from_fields(grid_domain: GridDomain, fields: Vec<DiscreteField>) -> Self {
        Self {
            grid_domain,
            fields,
        }
    }

    fn grid_domain(&self) -> &GridDomain {
        &self.grid_domain
    }

    fn fields(&self) -> &[DiscreteField] {
        &self.fields
    }

    fn add_function_with_predicate<C, P>(
        &mut self,
        function: C,
        verbosity: &Verbosity,
        sample_predicate: P,
    ) -> usize
    where
        C: Fn(&Point3<fgr>) -> fgr + Sync,
        P: Fn(&Point3<fgr>) -> bool + Sync,
    {
        let field = DiscreteField::sample(self, &function, &sample_predicate, verbosity);
        self.fields.push(field);
        self.fields.len() - 1
    }

    fn determine_shape_functions(
        &self,
        field_id: usize,
        point: &Point3<fgr>,
        with_derivatives: bool,
    ) -> Result<Self::ShapeFunctions, QueryError> {
        determine_cell_shape_functions::<_, TrilinearBasis, N_NODES>(
            self,
            field_id,
            point,
            with_derivatives,
        )
    }

    fn interpolate_with_shape_functions(
        &self,
        field_id: usize,
        shape_functions: &Self::ShapeFunctions,
    ) -> Result<fgr, QueryError> {
        shape_functions.evaluate(self.field(field_id)?)
    }

    fn interpolate_gradient_with_shape_functions(
        &self,
        field_id: usize,
        shape_functions: &Self::ShapeFunctions,
    ) -> Result<(fgr, Vec3<fgr>), QueryError> {
        shape_functions.evaluate_with_gradient(self.field(field_id)?)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn create_grid() -> TrilinearGrid {
        TrilinearGrid::new(
            BoundingBox3::new(Point3::new(0.0, -1.0, 2.0), Point3::new(2.0, 1.0, 3.0)),
            In3D::new(4, 3, 2),
        )
    }

    #[test]
    fn trilinear_function_is_reproduced() {
        let function = |p: &Point3<fgr>| 1.0 + p[X] - 2.0 * p[Y] * p[Z] + p[X] * p[Y] * p[Z];
        let mut grid = create_grid();
        grid.add_function(function, &Verbosity::Quiet);

        let xs = ndarray::Array::linspace(0.0, 2.0, 11);
        let ys = ndarray::Array::linspace(-1.0, 1.0, 7);
        let zs = ndarray::Array::linspace(2.0, 3.0, 5);
        for &x in &xs {
            for &y in &ys {
                for &z in &zs {
                    let point = Point3::new(x, y, z);
                    assert_abs_diff_eq!(
                        grid.interpolate(0, &point).unwrap(),
                        function(&point),
                        epsilon = 1e-12
                    );
                }
            }
        }
    }

    #[test]
    fn linear_gradient_is_exact() {
        let mut grid = create_grid();
        grid.add_function(|p| 3.0 * p[X] - p[Y] + 0.5 * p[Z], &Verbosity::Quiet);
        let (value, gradient) = grid
            .interpolate_with_gradient(0, &Point3::new(1.3, 0.2, 2.7))
            .unwrap();
        assert_abs_diff_eq!(value, 3.9 - 0.2 + 1.35, epsilon = 1e-12);
        assert_abs_diff_eq!(gradient, Vec3::new(3.0, -1.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn reduction_leaves_field_untouched() {
        let mut grid = create_grid();
        grid.add_function(|p| p[X], &Verbosity::Quiet);
        let original = grid.field(0).unwrap().clone();
        grid.reduce_field(0, |_, _| false);
        assert_eq!(grid.field(0).unwrap(), &original);
        assert!(grid.interpolate(0, &Point3::new(1.0, 0.0, 2.5)).is_ok());
    }

    #[test]
    fn vertices_of_cells_are_shared() {
        let grid = create_grid();
        let mut lower_nodes = [0; N_NODES];
        let mut upper_nodes = [0; N_NODES];
        grid.fill_cell_nodes(&Idx3::new(1, 1, 0), &mut lower_nodes);
        grid.fill_cell_nodes(&Idx3::new(1, 1, 1), &mut upper_nodes);
        assert_eq!(&lower_nodes[4..], &upper_nodes[..4]);
        assert_abs_diff_eq!(
            grid.node_position(upper_nodes[7] as usize),
            Point3::new(1.0, 1.0 / 3.0, 3.0),
            epsilon = 1e-12
        );
    }
}
