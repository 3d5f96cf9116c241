//! Shape functions for interpolating discretized fields within grid cells.

pub mod serendipity;
pub mod trilinear;

use crate::{
    field::DiscreteField,
    geometry::{Point3, Vec3},
    grid::{fgr, CellLocation, DiscreteGrid, QueryError},
};

/// Defines the basis functions of a cell with `N` nodes, expressed in local
/// cell coordinates spanning [-1, 1] along each dimension.
pub trait CellBasis<const N: usize> {
    /// Returns the local coordinates of the given node of the cell.
    fn node_local_coords(node: usize) -> Vec3<fgr>;

    /// Evaluates all basis functions at the given local coordinates.
    fn weights(local_coords: &Vec3<fgr>) -> [fgr; N];

    /// Evaluates the derivatives of all basis functions with respect to the
    /// local coordinates.
    fn local_derivatives(local_coords: &Vec3<fgr>) -> [Vec3<fgr>; N];
}

/// Basis functions of a grid cell evaluated at a specific point.
///
/// The shape functions only depend on the grid and the point, so they can be
/// determined once and reused for evaluating every field of the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeFunctions<const N: usize> {
    cell: usize,
    nodes: [u32; N],
    local_coords: Vec3<fgr>,
    weights: [fgr; N],
    derivatives: Option<[Vec3<fgr>; N]>,
}

impl<const N: usize> ShapeFunctions<N> {
    /// Evaluates the shape functions of basis `B` for the point at the given
    /// cell location.
    ///
    /// # Parameters
    ///
    /// - `location`: Cell and local coordinates of the point.
    /// - `nodes`: Lattice indices of the nodes of the cell.
    /// - `derivative_scale`: If specified, the spatial derivatives of the shape
    /// functions are computed by multiplying the local derivatives with this factor.
    ///
    /// # Type parameters
    ///
    /// - `B`: Basis functions of the cell.
    pub fn new<B: CellBasis<N>>(
        location: &CellLocation,
        nodes: [u32; N],
        derivative_scale: Option<&Vec3<fgr>>,
    ) -> Self {
        let weights = B::weights(&location.local_coords);
        let derivatives = derivative_scale.map(|scale| {
            let mut derivatives = B::local_derivatives(&location.local_coords);
            for derivative in derivatives.iter_mut() {
                *derivative = derivative.component_mul(scale);
            }
            derivatives
        });
        Self {
            cell: location.cell,
            nodes,
            local_coords: location.local_coords,
            weights,
            derivatives,
        }
    }

    /// Returns the linear index of the cell containing the point.
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// Returns a reference to the lattice indices of the nodes of the cell.
    pub fn nodes(&self) -> &[u32; N] {
        &self.nodes
    }

    /// Returns a reference to the coordinates of the point relative to the cell.
    pub fn local_coords(&self) -> &Vec3<fgr> {
        &self.local_coords
    }

    /// Returns a reference to the value of each shape function at the point.
    pub fn weights(&self) -> &[fgr; N] {
        &self.weights
    }

    /// Returns a reference to the spatial derivatives of each shape function
    /// at the point, if they were computed.
    pub fn derivatives(&self) -> Option<&[Vec3<fgr>; N]> {
        self.derivatives.as_ref()
    }

    /// Computes the interpolated value of the given field.
    pub fn evaluate(&self, field: &DiscreteField) -> Result<fgr, QueryError> {
        field.evaluate(self.cell, &self.weights)
    }

    /// Computes the interpolated value and gradient of the given field.
    pub fn evaluate_with_gradient(
        &self,
        field: &DiscreteField,
    ) -> Result<(fgr, Vec3<fgr>), QueryError> {
        let derivatives = self
            .derivatives
            .as_ref()
            .ok_or(QueryError::MissingDerivatives)?;
        field.evaluate_with_gradient(self.cell, &self.weights, derivatives)
    }
}

/// Locates the given point in the grid and evaluates the basis `B` there.
///
/// Fails if the field does not exist, if the point is outside the grid or if
/// the containing cell has been pruned from the field.
pub fn determine_cell_shape_functions<G, B, const N: usize>(
    grid: &G,
    field_id: usize,
    point: &Point3<fgr>,
    with_derivatives: bool,
) -> Result<ShapeFunctions<N>, QueryError>
where
    G: DiscreteGrid,
    B: CellBasis<N>,
{
    debug_assert_eq!(G::NODES_PER_CELL, N);
    let field = grid.field(field_id)?;
    let grid_domain = grid.grid_domain();
    let location = grid_domain.locate(point)?;
    if !field.has_cell(location.cell) {
        return Err(QueryError::AbsentCoefficient);
    }
    let mut nodes = [0; N];
    grid.fill_cell_nodes(&location.indices, &mut nodes);
    let derivative_scale = grid_domain.local_to_spatial_derivative_scale();
    Ok(ShapeFunctions::new::<B>(
        &location,
        nodes,
        if with_derivatives {
            Some(&derivative_scale)
        } else {
            None
        },
    ))
}
