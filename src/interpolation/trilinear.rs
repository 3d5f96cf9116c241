//! Trilinear basis of the 8-node hexahedral cell.

use super::CellBasis;
use crate::{
    geometry::{
        Dim3::{X, Y, Z},
        Vec3,
    },
    grid::fgr,
};

/// Number of nodes in a trilinear cell.
pub const N_NODES: usize = 8;

/// The trilinear basis with a node at each cell corner.
///
/// Corner `a + 2b + 4c` lies at local coordinates `(2a - 1, 2b - 1, 2c - 1)`.
#[derive(Clone, Copy, Debug)]
pub struct TrilinearBasis;

impl CellBasis<N_NODES> for TrilinearBasis {
    fn node_local_coords(node: usize) -> Vec3<fgr> {
        assert!(node < N_NODES, "Invalid trilinear node index {}", node);
        let sign = |bit: usize| if bit == 0 { -1.0 } else { 1.0 };
        Vec3::new(sign(node & 1), sign((node >> 1) & 1), sign((node >> 2) & 1))
    }

    fn weights(local_coords: &Vec3<fgr>) -> [fgr; N_NODES] {
        let mut weights = [0.0; N_NODES];
        for (node, weight) in weights.iter_mut().enumerate() {
            let node_coords = Self::node_local_coords(node);
            *weight = 0.125
                * (1.0 + local_coords[X] * node_coords[X])
                * (1.0 + local_coords[Y] * node_coords[Y])
                * (1.0 + local_coords[Z] * node_coords[Z]);
        }
        weights
    }

    fn local_derivatives(local_coords: &Vec3<fgr>) -> [Vec3<fgr>; N_NODES] {
        let mut derivatives = [Vec3::zero(); N_NODES];
        for (node, derivative) in derivatives.iter_mut().enumerate() {
            let n = Self::node_local_coords(node);
            let fx = 1.0 + local_coords[X] * n[X];
            let fy = 1.0 + local_coords[Y] * n[Y];
            let fz = 1.0 + local_coords[Z] * n[Z];
            *derivative = Vec3::new(
                0.125 * n[X] * fy * fz,
                0.125 * fx * n[Y] * fz,
                0.125 * fx * fy * n[Z],
            );
        }
        derivatives
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::interpolation::testing::*;

    #[test]
    fn trilinear_basis_is_partition_of_unity() {
        check_partition_of_unity::<TrilinearBasis, N_NODES>();
    }

    #[test]
    fn trilinear_basis_is_interpolatory() {
        check_interpolatory::<TrilinearBasis, N_NODES>();
    }

    #[test]
    fn trilinear_derivatives_match_finite_differences() {
        check_derivatives_match_finite_differences::<TrilinearBasis, N_NODES>();
    }

    #[test]
    fn trilinear_basis_reproduces_multilinear_polynomials() {
        check_reproduces::<TrilinearBasis, _, N_NODES>(|p| {
            1.0 + 2.0 * p[X] - p[Y] + 0.5 * p[Z] + p[X] * p[Y] - 3.0 * p[X] * p[Y] * p[Z]
        });
    }
}
