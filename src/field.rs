//! Scalar fields discretized on the node lattice of a grid.

use crate::{
    geometry::{Point3, Vec3},
    grid::{fgr, DiscreteGrid, GridDomain, NodeLattice, QueryError},
    io::Verbosity,
};
use indicatif::ParallelProgressIterator;
use ndarray::{Array2, Axis};
use rayon::prelude::*;

/// Coefficient value marking a node that was never sampled.
///
/// This value is reserved: a sampled function value equal to it is
/// indistinguishable from an absent coefficient.
pub const ABSENT_COEFFICIENT: fgr = fgr::MAX;

/// Cell map entry marking a cell that has been pruned from the field.
pub const ABSENT_CELL: u32 = u32::MAX;

/// A scalar field represented by coefficients on the nodes of a grid.
///
/// Each present cell has a row in the cell table holding the indices of the
/// coefficients of its nodes. The cell map associates each linear cell index
/// with its row in the cell table.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteField {
    coefficients: Vec<fgr>,
    cells: Array2<u32>,
    cell_map: Vec<u32>,
}

impl DiscreteField {
    /// Samples the given function at the nodes of the given grid.
    ///
    /// # Parameters
    ///
    /// - `grid`: Grid providing the node lattice and cell addressing.
    /// - `function`: Function to sample. Must not return `ABSENT_COEFFICIENT`,
    ///   which would be stored as an absent coefficient.
    /// - `sample_predicate`: Nodes at which the predicate is false get an absent coefficient.
    /// - `verbosity`: Whether and how to pass non-critical information to the user.
    ///
    /// # Returns
    ///
    /// A new `DiscreteField` where every cell is present.
    ///
    /// # Type parameters
    ///
    /// - `G`: Type of grid.
    /// - `C`: Function type taking a point and returning a field value.
    /// - `P`: Function type taking a point and returning a boolean value.
    pub fn sample<G, C, P>(
        grid: &G,
        function: &C,
        sample_predicate: &P,
        verbosity: &Verbosity,
    ) -> Self
    where
        G: DiscreteGrid,
        C: Fn(&Point3<fgr>) -> fgr + Sync,
        P: Fn(&Point3<fgr>) -> bool + Sync,
    {
        let n_nodes = grid.n_nodes();
        if verbosity.print_messages() {
            println!("Sampling function at {} nodes", n_nodes);
        }

        let mut coefficients = vec![ABSENT_COEFFICIENT; n_nodes];
        coefficients
            .par_iter_mut()
            .enumerate()
            .progress_with(verbosity.create_progress_bar(n_nodes))
            .for_each(|(node, coefficient)| {
                let position = grid.node_position(node);
                if sample_predicate(&position) {
                    *coefficient = function(&position);
                }
            });

        let n_absent = coefficients
            .iter()
            .filter(|&&coefficient| coefficient == ABSENT_COEFFICIENT)
            .count();
        if n_absent > 0 && verbosity.print_messages() {
            println!("Skipped {} of {} nodes", n_absent, n_nodes);
        }

        let grid_domain = grid.grid_domain();
        let n_cells = grid_domain.n_cells();
        let mut cells = Array2::zeros((n_cells, G::NODES_PER_CELL));
        cells
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each_init(
                || vec![0; G::NODES_PER_CELL],
                |nodes, (cell, mut row)| {
                    grid.fill_cell_nodes(&grid_domain.single_to_multi_index(cell), nodes);
                    for (entry, &node) in row.iter_mut().zip(nodes.iter()) {
                        *entry = node;
                    }
                },
            );

        let cell_map = (0..n_cells as u32).collect();

        Self {
            coefficients,
            cells,
            cell_map,
        }
    }

    /// Creates a field from existing coefficients, cell table and cell map.
    ///
    /// The caller is responsible for the parts being consistent.
    pub(crate) fn from_parts(
        coefficients: Vec<fgr>,
        cells: Array2<u32>,
        cell_map: Vec<u32>,
    ) -> Self {
        Self {
            coefficients,
            cells,
            cell_map,
        }
    }

    /// Returns a slice with all coefficients of the field.
    pub fn coefficients(&self) -> &[fgr] {
        &self.coefficients
    }

    /// Returns a reference to the table of coefficient indices for each present cell.
    pub fn cells(&self) -> &Array2<u32> {
        &self.cells
    }

    /// Returns a slice mapping each linear cell index to a row in the cell table.
    pub fn cell_map(&self) -> &[u32] {
        &self.cell_map
    }

    /// Returns the number of stored coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the number of stored coefficients that are absent.
    pub fn n_absent_coefficients(&self) -> usize {
        self.coefficients
            .iter()
            .filter(|&&coefficient| coefficient == ABSENT_COEFFICIENT)
            .count()
    }

    /// Returns the number of nodes of each cell.
    pub fn nodes_per_cell(&self) -> usize {
        self.cells.ncols()
    }

    /// Returns the number of cells that have not been pruned.
    pub fn n_present_cells(&self) -> usize {
        self.cells.nrows()
    }

    /// Returns the row of the given cell in the cell table, or `None` if the
    /// cell has been pruned or does not exist.
    pub fn cell_row(&self, cell: usize) -> Option<usize> {
        match self.cell_map.get(cell) {
            Some(&ABSENT_CELL) | None => None,
            Some(&row) => Some(row as usize),
        }
    }

    /// Whether the given cell is present in the field.
    pub fn has_cell(&self, cell: usize) -> bool {
        self.cell_row(cell).is_some()
    }

    /// Computes the weighted sum of the coefficients of the given cell.
    ///
    /// Fails if the cell is pruned or any of its coefficients is absent.
    pub fn evaluate(&self, cell: usize, weights: &[fgr]) -> Result<fgr, QueryError> {
        debug_assert_eq!(weights.len(), self.nodes_per_cell());
        let row = self.cell_row(cell).ok_or(QueryError::AbsentCoefficient)?;
        let mut value = 0.0;
        for (&index, &weight) in self.cells.row(row).iter().zip(weights) {
            let coefficient = self.coefficients[index as usize];
            if coefficient == ABSENT_COEFFICIENT {
                return Err(QueryError::AbsentCoefficient);
            }
            value += weight * coefficient;
        }
        Ok(value)
    }

    /// Computes the weighted sums of the coefficients of the given cell with
    /// the shape function values and with their derivatives.
    ///
    /// Fails if the cell is pruned or any of its coefficients is absent.
    pub fn evaluate_with_gradient(
        &self,
        cell: usize,
        weights: &[fgr],
        derivatives: &[Vec3<fgr>],
    ) -> Result<(fgr, Vec3<fgr>), QueryError> {
        debug_assert_eq!(weights.len(), self.nodes_per_cell());
        debug_assert_eq!(derivatives.len(), self.nodes_per_cell());
        let row = self.cell_row(cell).ok_or(QueryError::AbsentCoefficient)?;
        let mut value = 0.0;
        let mut gradient = Vec3::zero();
        for ((&index, &weight), derivative) in self
            .cells
            .row(row)
            .iter()
            .zip(weights)
            .zip(derivatives)
        {
            let coefficient = self.coefficients[index as usize];
            if coefficient == ABSENT_COEFFICIENT {
                return Err(QueryError::AbsentCoefficient);
            }
            value += weight * coefficient;
            gradient = gradient + derivative * coefficient;
        }
        Ok((value, gradient))
    }

    /// Creates a copy of the field containing only the cells where the
    /// predicate holds for at least one node with a present coefficient.
    ///
    /// Coefficients not used by any remaining cell are discarded.
    ///
    /// # Parameters
    ///
    /// - `lattice`: Node lattice the field was sampled on.
    /// - `grid_domain`: Cell addressing of the grid the field belongs to.
    /// - `predicate`: Function taking the position and value of a node and
    /// returning whether the node should be kept.
    ///
    /// # Type parameters
    ///
    /// - `L`: Type of node lattice.
    /// - `P`: Function type taking a point and a field value and returning a boolean value.
    pub fn reduced<L, P>(&self, lattice: &L, grid_domain: &GridDomain, predicate: &P) -> Self
    where
        L: NodeLattice,
        P: Fn(&Point3<fgr>, fgr) -> bool + Sync,
    {
        let n_cells = self.cell_map.len();
        let nodes_per_cell = self.nodes_per_cell();

        let keep_cell: Vec<bool> = (0..n_cells)
            .into_par_iter()
            .map_init(
                || vec![0; nodes_per_cell],
                |nodes, cell| match self.cell_row(cell) {
                    None => false,
                    Some(row) => {
                        lattice.fill_cell_nodes(&grid_domain.single_to_multi_index(cell), nodes);
                        self.cells
                            .row(row)
                            .iter()
                            .zip(nodes.iter())
                            .any(|(&index, &node)| {
                                let value = self.coefficients[index as usize];
                                value != ABSENT_COEFFICIENT
                                    && predicate(&lattice.node_position(node as usize), value)
                            })
                    }
                },
            )
            .collect();

        let mut keep_coefficient = vec![false; self.coefficients.len()];
        for cell in (0..n_cells).filter(|&cell| keep_cell[cell]) {
            if let Some(row) = self.cell_row(cell) {
                for &index in self.cells.row(row) {
                    keep_coefficient[index as usize] = true;
                }
            }
        }

        let mut new_coefficient_indices = vec![u32::MAX; self.coefficients.len()];
        let mut coefficients = Vec::new();
        for index in (0..self.coefficients.len()).filter(|&index| keep_coefficient[index]) {
            new_coefficient_indices[index] = coefficients.len() as u32;
            coefficients.push(self.coefficients[index]);
        }

        let n_kept_cells = keep_cell.iter().filter(|&&keep| keep).count();
        let mut cells = Array2::zeros((n_kept_cells, nodes_per_cell));
        let mut cell_map = vec![ABSENT_CELL; n_cells];
        let mut new_row = 0;
        for (cell, entry) in cell_map.iter_mut().enumerate() {
            if !keep_cell[cell] {
                continue;
            }
            if let Some(row) = self.cell_row(cell) {
                for (new_index, &index) in cells
                    .row_mut(new_row)
                    .iter_mut()
                    .zip(self.cells.row(row).iter())
                {
                    *new_index = new_coefficient_indices[index as usize];
                }
                *entry = new_row as u32;
                new_row += 1;
            }
        }

        Self {
            coefficients,
            cells,
            cell_map,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{
        geometry::{BoundingBox3, Dim3::X, In3D},
        grid::{cubic_lagrange::CubicLagrangeGrid, trilinear::TrilinearGrid},
    };

    fn unit_box() -> BoundingBox3<fgr> {
        BoundingBox3::new(Point3::origin(), Point3::equal_components(1.0))
    }

    #[test]
    fn sampled_field_covers_all_cells() {
        let grid = TrilinearGrid::new(unit_box(), In3D::new(2, 3, 1));
        let field = DiscreteField::sample(
            &grid,
            &|p: &Point3<fgr>| p[X],
            &|_: &Point3<fgr>| true,
            &Verbosity::Quiet,
        );
        assert_eq!(field.n_coefficients(), 3 * 4 * 2);
        assert_eq!(field.n_present_cells(), 6);
        assert_eq!(field.nodes_per_cell(), 8);
        assert_eq!(field.cell_map(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(field.n_absent_coefficients(), 0);
        for (node, &coefficient) in field.coefficients().iter().enumerate() {
            assert_eq!(coefficient, grid.node_position(node)[X]);
        }
    }

    #[test]
    fn rejected_nodes_get_absent_coefficients() {
        let grid = TrilinearGrid::new(unit_box(), In3D::same(2));
        let field = DiscreteField::sample(
            &grid,
            &|_: &Point3<fgr>| 0.0,
            &|p: &Point3<fgr>| p[X] < 0.75,
            &Verbosity::Quiet,
        );
        assert_eq!(field.n_absent_coefficients(), 9);
        assert!(field.evaluate(0, &[0.125; 8]).is_ok());
        assert_eq!(
            field.evaluate(1, &[0.125; 8]),
            Err(QueryError::AbsentCoefficient)
        );
    }

    #[test]
    fn sampled_absent_marker_value_counts_as_absent() {
        let grid = TrilinearGrid::new(unit_box(), In3D::same(1));
        let field = DiscreteField::sample(
            &grid,
            &|p: &Point3<fgr>| if p[X] > 0.5 { ABSENT_COEFFICIENT } else { 1.0 },
            &|_: &Point3<fgr>| true,
            &Verbosity::Quiet,
        );
        assert_eq!(field.n_absent_coefficients(), 4);
        assert_eq!(
            field.evaluate(0, &[0.125; 8]),
            Err(QueryError::AbsentCoefficient)
        );
    }

    #[test]
    fn reduction_compacts_coefficients_and_remaps_cells() {
        let grid = CubicLagrangeGrid::new(unit_box(), In3D::new(4, 1, 1));
        let field = DiscreteField::sample(
            &grid,
            &|p: &Point3<fgr>| p[X],
            &|_: &Point3<fgr>| true,
            &Verbosity::Quiet,
        );
        let reduced = field.reduced(&grid, grid.grid_domain(), &|p: &Point3<fgr>, _: fgr| {
            p[X] < 0.1
        });

        assert_eq!(reduced.n_present_cells(), 1);
        assert_eq!(reduced.cell_map(), &[0, ABSENT_CELL, ABSENT_CELL, ABSENT_CELL]);
        assert_eq!(reduced.n_coefficients(), 32);
        assert!(reduced
            .cells()
            .iter()
            .all(|&index| (index as usize) < reduced.n_coefficients()));

        let weights: Vec<fgr> = (0..32).map(|node| (node as fgr) / 496.0).collect();
        assert_eq!(reduced.evaluate(0, &weights), field.evaluate(0, &weights));
        assert_eq!(
            reduced.evaluate(2, &weights),
            Err(QueryError::AbsentCoefficient)
        );
    }
}
