//! Grid with cubic serendipity interpolation within each cell.

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
        serendipity::{SerendipityBasis, N_NODES},
        ShapeFunctions,
    },
    io::Verbosity,
};

/// Numbers of lattice nodes of each kind for a given grid resolution.
///
/// The lattice nodes are numbered with all cell vertices first, followed by
/// the two nodes on each edge along x, y and z in turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LatticeLayout {
    nx: usize,
    ny: usize,
    n_vertices: usize,
    n_x_edge_nodes: usize,
    n_y_edge_nodes: usize,
    n_z_edge_nodes: usize,
}

impl LatticeLayout {
    fn new(resolution: &In3D<usize>) -> Self {
        let (nx, ny, nz) = resolution.to_tuple();
        Self {
            nx,
            ny,
            n_vertices: (nx + 1) * (ny + 1) * (nz + 1),
            n_x_edge_nodes: 2 * nx * (ny + 1) * (nz + 1),
            n_y_edge_nodes: 2 * (nx + 1) * ny * (nz + 1),
            n_z_edge_nodes: 2 * (nx + 1) * (ny + 1) * nz,
        }
    }

    fn n_nodes(&self) -> usize {
        self.n_vertices + self.n_x_edge_nodes + self.n_y_edge_nodes + self.n_z_edge_nodes
    }

    fn vertex(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    fn x_edge_node(&self, i: usize, j: usize, k: usize, s: usize) -> usize {
        self.n_vertices + 2 * (i + self.nx * (j + (self.ny + 1) * k)) + s
    }

    fn y_edge_node(&self, i: usize, j: usize, k: usize, s: usize) -> usize {
        self.n_vertices + self.n_x_edge_nodes + 2 * (i + (self.nx + 1) * (j + self.ny * k)) + s
    }

    fn z_edge_node(&self, i: usize, j: usize, k: usize, s: usize) -> usize {
        self.n_vertices
            + self.n_x_edge_nodes
            + self.n_y_edge_nodes
            + 2 * (i + (self.nx + 1) * (j + (self.ny + 1) * k))
            + s
    }
}

/// Splits a linear index into 3D indices for the given extents along x and y.
fn split_index(index: usize, extent_x: usize, extent_y: usize) -> Idx3<usize> {
    Idx3::new(
        index % extent_x,
        (index / extent_x) % extent_y,
        index / (extent_x * extent_y),
    )
}

/// A grid of cells interpolated with the 32-node cubic serendipity basis.
///
/// Field values are continuous across cell faces, while gradients are not.
#[derive(Clone, Debug)]
pub struct CubicLagrangeGrid {
    grid_domain: GridDomain,
    layout: LatticeLayout,
    fields: Vec<DiscreteField>,
}

impl CubicLagrangeGrid {
    fn with_grid_domain(grid_domain: GridDomain, fields: Vec<DiscreteField>) -> Self {
        let layout = LatticeLayout::new(grid_domain.resolution());
        Self {
            grid_domain,
            layout,
            fields,
        }
    }
}

impl NodeLattice for CubicLagrangeGrid {
    const NODES_PER_CELL: usize = N_NODES;

    fn n_nodes(&self) -> usize {
        self.layout.n_nodes()
    }

    fn node_position(&self, node: usize) -> Point3<fgr> {
        let layout = &self.layout;
        let (nx, ny) = (layout.nx, layout.ny);

        if node < layout.n_vertices {
            return self
                .grid_domain
                .vertex_position(&split_index(node, nx + 1, ny + 1));
        }
        let mut offset = node - layout.n_vertices;

        let third = |s: usize| ((s + 1) as fgr) / 3.0;

        if offset < layout.n_x_edge_nodes {
            let vertex = split_index(offset / 2, nx, ny + 1);
            return self
                .grid_domain
                .lattice_position(&vertex, &Vec3::new(third(offset % 2), 0.0, 0.0));
        }
        offset -= layout.n_x_edge_nodes;

        if offset < layout.n_y_edge_nodes {
            let vertex = split_index(offset / 2, nx + 1, ny);
            return self
                .grid_domain
                .lattice_position(&vertex, &Vec3::new(0.0, third(offset % 2), 0.0));
        }
        offset -= layout.n_y_edge_nodes;

        assert!(
            offset < layout.n_z_edge_nodes,
            "Node index {} out of bounds for lattice with {} nodes",
            node,
            layout.n_nodes()
        );
        let vertex = split_index(offset / 2, nx + 1, ny + 1);
        self.grid_domain
            .lattice_position(&vertex, &Vec3::new(0.0, 0.0, third(offset % 2)))
    }

    fn fill_cell_nodes(&self, indices: &Idx3<usize>, nodes: &mut [u32]) {
        assert_eq!(nodes.len(), N_NODES);
        let layout = &self.layout;
        let (i, j, k) = (indices[X], indices[Y], indices[Z]);
        for c in 0..2 {
            for b in 0..2 {
                for a in 0..2 {
                    nodes[a + 2 * b + 4 * c] = layout.vertex(i + a, j + b, k + c) as u32;
                }
            }
        }
        for c in 0..2 {
            for b in 0..2 {
                for s in 0..2 {
                    nodes[8 + 2 * (b + 2 * c) + s] =
                        layout.x_edge_node(i, j + b, k + c, s) as u32;
                }
            }
        }
        for c in 0..2 {
            for a in 0..2 {
                for s in 0..2 {
                    nodes[16 + 2 * (a + 2 * c) + s] =
                        layout.y_edge_node(i + a, j, k + c, s) as u32;
                }
            }
        }
        for b in 0..2 {
            for a in 0..2 {
                for s in 0..2 {
                    nodes[24 + 2 * (a + 2 * b) + s] =
                        layout.z_edge_node(i + a, j + b, k, s) as u32;
                }
            }
        }
    }
}

impl DiscreteGrid for CubicLagrangeGrid {
    type ShapeFunctions = ShapeFunctions<N_NODES>;

    const TYPE: GridType = GridType::CubicLagrange;

    fn new(domain: BoundingBox3<fgr>, resolution: In3D<usize>) -> Self {
        Self::with_grid_domain(GridDomain::new(domain, resolution), Vec::new())
    }

    fn from_fields(grid_domain: GridDomain, fields: Vec<DiscreteField>) -> Self {
        Self::with_grid_domain(grid_domain, fields)
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
        determine_cell_shape_functions::<_, SerendipityBasis, N_NODES>(
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

    fn reduce_field<P>(&mut self, field_id: usize, predicate: P)
    where
        P: Fn(&Point3<fgr>, fgr) -> bool + Sync,
    {
        assert!(
            field_id < self.fields.len(),
            "No field with ID {}",
            field_id
        );
        let reduced = self.fields[field_id].reduced(self, &self.grid_domain, &predicate);
        self.fields[field_id] = reduced;
    }
}
