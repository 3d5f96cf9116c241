//! Cubic serendipity basis of the 32-node hexahedral cell.
//!
//! The cell has a node at each of its 8 corners and two nodes on each of its
//! 12 edges, located a third of the edge length from either end. Nodes are
//! ordered as the 8 corners, followed by the 8 nodes on edges along x, the 8
//! on edges along y and the 8 on edges along z.

use super::CellBasis;
use crate::{
    geometry::{
        Dim3::{self, X, Y, Z},
        Vec3,
    },
    grid::fgr,
};

/// Number of nodes in a serendipity cell.
pub const N_NODES: usize = 32;

/// Index of the first node on edges along each dimension.
const FIRST_EDGE_NODES: [usize; 3] = [8, 16, 24];

/// Local coordinate of the edge nodes along their edge.
const EDGE_NODE_COORD: fgr = 1.0 / 3.0;

/// The 32-node cubic serendipity basis.
#[derive(Clone, Copy, Debug)]
pub struct SerendipityBasis;

/// Returns the dimension of the edge the given node lies on, or `None` if it is a corner.
pub fn edge_dimension(node: usize) -> Option<Dim3> {
    match node {
        0..=7 => None,
        8..=15 => Some(X),
        16..=23 => Some(Y),
        24..=31 => Some(Z),
        _ => panic!("Invalid serendipity node index {}", node),
    }
}

/// Returns the two dimensions perpendicular to the given one, in cyclic order.
fn perpendicular_dimensions(dim: Dim3) -> (Dim3, Dim3) {
    match dim {
        X => (Y, Z),
        Y => (X, Z),
        Z => (X, Y),
    }
}

fn sign(bit: usize) -> fgr {
    if bit == 0 {
        -1.0
    } else {
        1.0
    }
}

/// Evaluates the factors of the given basis function along each dimension,
/// together with their derivatives.
///
/// The factor along the edge dimension of an edge node is the cubic
/// `(1 - x^2)(1 + 9 x x_i)`, all other factors are `1 + x x_i`.
fn factors_with_derivatives(node: usize, local_coords: &Vec3<fgr>) -> ([fgr; 3], [fgr; 3]) {
    let node_coords = SerendipityBasis::node_local_coords(node);
    let edge_dim = edge_dimension(node);
    let mut factors = [0.0; 3];
    let mut derivatives = [0.0; 3];
    for &dim in &Dim3::slice() {
        let x = local_coords[dim];
        let xi = node_coords[dim];
        if edge_dim == Some(dim) {
            factors[dim.num()] = (1.0 - x * x) * (1.0 + 9.0 * x * xi);
            derivatives[dim.num()] = -2.0 * x * (1.0 + 9.0 * x * xi) + 9.0 * xi * (1.0 - x * x);
        } else {
            factors[dim.num()] = 1.0 + x * xi;
            derivatives[dim.num()] = xi;
        }
    }
    (factors, derivatives)
}

impl CellBasis<N_NODES> for SerendipityBasis {
    fn node_local_coords(node: usize) -> Vec3<fgr> {
        match edge_dimension(node) {
            None => Vec3::new(sign(node & 1), sign((node >> 1) & 1), sign((node >> 2) & 1)),
            Some(dim) => {
                let offset = node - FIRST_EDGE_NODES[dim.num()];
                let (first, second) = perpendicular_dimensions(dim);
                let mut coords = Vec3::zero();
                coords[dim] = sign(offset & 1) * EDGE_NODE_COORD;
                coords[first] = sign((offset >> 1) & 1);
                coords[second] = sign((offset >> 2) & 1);
                coords
            }
        }
    }

    fn weights(local_coords: &Vec3<fgr>) -> [fgr; N_NODES] {
        let corner_factor = 9.0 * local_coords.squared_length() - 19.0;
        let mut weights = [0.0; N_NODES];
        for (node, weight) in weights.iter_mut().enumerate() {
            let (factors, _) = factors_with_derivatives(node, local_coords);
            let product = factors[0] * factors[1] * factors[2];
            *weight = if edge_dimension(node).is_some() {
                (9.0 / 64.0) * product
            } else {
                (1.0 / 64.0) * product * corner_factor
            };
        }
        weights
    }

    fn local_derivatives(local_coords: &Vec3<fgr>) -> [Vec3<fgr>; N_NODES] {
        let corner_factor = 9.0 * local_coords.squared_length() - 19.0;
        let mut derivatives = [Vec3::zero(); N_NODES];
        for (node, derivative) in derivatives.iter_mut().enumerate() {
            let (factors, factor_derivatives) = factors_with_derivatives(node, local_coords);
            let product = factors[0] * factors[1] * factors[2];
            let partial = |dim: Dim3| {
                let (first, second) = perpendicular_dimensions(dim);
                factor_derivatives[dim.num()] * factors[first.num()] * factors[second.num()]
            };
            *derivative = if edge_dimension(node).is_some() {
                Vec3::with_each_component(|dim| (9.0 / 64.0) * partial(dim))
            } else {
                Vec3::with_each_component(|dim| {
                    (1.0 / 64.0)
                        * (partial(dim) * corner_factor + product * 18.0 * local_coords[dim])
                })
            };
        }
        derivatives
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::interpolation::testing::*;

    #[test]
    fn node_coordinates_are_distinct_and_on_edges() {
        for node in 0..N_NODES {
            let coords = SerendipityBasis::node_local_coords(node);
            let n_unit_coords = Dim3::slice()
                .iter()
                .filter(|&&dim| coords[dim].abs() == 1.0)
                .count();
            assert_eq!(
                n_unit_coords,
                if edge_dimension(node).is_some() { 2 } else { 3 }
            );
            for other in 0..node {
                assert_ne!(coords, SerendipityBasis::node_local_coords(other));
            }
        }
        assert_eq!(
            SerendipityBasis::node_local_coords(8),
            Vec3::new(-EDGE_NODE_COORD, -1.0, -1.0)
        );
        assert_eq!(
            SerendipityBasis::node_local_coords(21),
            Vec3::new(-1.0, EDGE_NODE_COORD, 1.0)
        );
        assert_eq!(
            SerendipityBasis::node_local_coords(31),
            Vec3::new(1.0, 1.0, EDGE_NODE_COORD)
        );
    }

    #[test]
    fn serendipity_basis_is_partition_of_unity() {
        check_partition_of_unity::<SerendipityBasis, N_NODES>();
    }

    #[test]
    fn serendipity_basis_is_interpolatory() {
        check_interpolatory::<SerendipityBasis, N_NODES>();
    }

    #[test]
    fn serendipity_derivatives_match_finite_differences() {
        check_derivatives_match_finite_differences::<SerendipityBasis, N_NODES>();
    }

    #[test]
    fn serendipity_basis_reproduces_cubic_polynomials() {
        check_reproduces::<SerendipityBasis, _, N_NODES>(|p| {
            0.5 - p[X] + 2.0 * p[Y] * p[Z] + p[X] * p[X] * p[X] - 3.0 * p[X] * p[Y] * p[Z]
                + 0.25 * p[Y] * p[Y] * p[Z]
                - p[Z] * p[Z] * p[Z]
        });
    }

    #[test]
    fn face_restriction_only_depends_on_face_nodes() {
        let coords = ndarray::Array::linspace(-1.0, 1.0, 9);
        for &y in &coords {
            for &z in &coords {
                let weights = SerendipityBasis::weights(&Vec3::new(1.0, y, z));
                for (node, &weight) in weights.iter().enumerate() {
                    if SerendipityBasis::node_local_coords(node)[X] != 1.0 {
                        assert!(weight.abs() < 1e-14);
                    }
                }
            }
        }
    }
}
