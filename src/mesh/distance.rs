//! Distances from points to triangle meshes.

use super::TriangleMesh;
use crate::{
    geometry::{Point3, Vec3},
    grid::fgr,
};

/// Feature of a triangle closest to a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NearestEntity {
    /// One of the three vertices.
    Vertex(usize),
    /// Edge `e`, going from vertex `e` to vertex `(e + 1) % 3`.
    Edge(usize),
    /// The interior of the face.
    Face,
}

/// Computes the squared distance between a point and a triangle.
///
/// Uses the Voronoi region classification from Ericson's "Real-Time
/// Collision Detection".
///
/// # Parameters
///
/// - `point`: Point to compute the distance from.
/// - `triangle`: Positions of the three vertices of the triangle.
///
/// # Returns
///
/// A tuple with the squared distance, the closest point on the triangle and
/// the feature of the triangle the closest point lies on.
pub fn point_triangle_sqdistance(
    point: &Point3<fgr>,
    triangle: &[Point3<fgr>; 3],
) -> (fgr, Point3<fgr>, NearestEntity) {
    let (closest, entity) = closest_point_on_triangle(point, triangle);
    ((point - &closest).squared_length(), closest, entity)
}

fn closest_point_on_triangle(
    point: &Point3<fgr>,
    triangle: &[Point3<fgr>; 3],
) -> (Point3<fgr>, NearestEntity) {
    let [a, b, c] = triangle;
    let ab = b - a;
    let ac = c - a;

    let ap = point - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, NearestEntity::Vertex(0));
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, NearestEntity::Vertex(1));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + &(&ab * v), NearestEntity::Edge(0));
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, NearestEntity::Vertex(2));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + &(&ac * w), NearestEntity::Edge(2));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + &(&(c - b) * w), NearestEntity::Edge(1));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + &(&ab * v + &ac * w), NearestEntity::Face)
}

/// The point of a mesh closest to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestFeature {
    /// Index of the face the closest point lies on.
    pub face: usize,
    /// Squared distance from the query point to the closest point.
    pub squared_distance: fgr,
    /// Position of the closest point.
    pub closest_point: Point3<fgr>,
    /// Feature of the face the closest point lies on.
    pub entity: NearestEntity,
}

/// Computes distances from points to a triangle mesh by testing every face.
#[derive(Clone, Copy, Debug)]
pub struct MeshDistance<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> MeshDistance<'a> {
    /// Creates a distance evaluator for the given mesh.
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Returns a reference to the mesh distances are computed to.
    pub fn mesh(&self) -> &'a TriangleMesh {
        self.mesh
    }

    /// Finds the point on the mesh closest to the given point, or `None` if
    /// the mesh has no faces.
    pub fn nearest(&self, point: &Point3<fgr>) -> Option<NearestFeature> {
        self.mesh
            .faces()
            .map(|face| {
                let (squared_distance, closest_point, entity) =
                    point_triangle_sqdistance(point, &face.corners());
                NearestFeature {
                    face: face.index(),
                    squared_distance,
                    closest_point,
                    entity,
                }
            })
            .fold(None, |nearest: Option<NearestFeature>, candidate| match nearest {
                Some(nearest) if nearest.squared_distance <= candidate.squared_distance => {
                    Some(nearest)
                }
                _ => Some(candidate),
            })
    }

    /// Computes the distance from the given point to the mesh.
    ///
    /// Returns infinity if the mesh has no faces.
    pub fn unsigned_distance(&self, point: &Point3<fgr>) -> fgr {
        self.nearest(point)
            .map_or(fgr::INFINITY, |nearest| nearest.squared_distance.sqrt())
    }

    /// Computes the signed distance from the given point to the mesh, which
    /// is negative inside the mesh.
    ///
    /// The sign is determined from the pseudo-normal of the closest feature,
    /// so the mesh must be closed and consistently oriented.
    /// Returns infinity if the mesh has no faces.
    pub fn signed_distance(&self, point: &Point3<fgr>) -> fgr {
        let nearest = match self.nearest(point) {
            Some(nearest) => nearest,
            None => return fgr::INFINITY,
        };
        let normal = self.pseudo_normal(&nearest);
        let distance = nearest.squared_distance.sqrt();
        if (point - &nearest.closest_point).dot(&normal) < 0.0 {
            -distance
        } else {
            distance
        }
    }

    fn pseudo_normal(&self, nearest: &NearestFeature) -> Vec3<fgr> {
        let face = self.mesh.face(nearest.face);
        match nearest.entity {
            NearestEntity::Vertex(vertex) => *face.vertices()[vertex].normal(),
            NearestEntity::Edge(edge) => *face.edge_normal(edge),
            NearestEntity::Face => *face.normal(),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::mesh::testing::create_unit_cube;
    use approx::assert_abs_diff_eq;

    fn create_triangle() -> [Point3<fgr>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]
    }

    #[test]
    fn point_above_face_is_classified_as_face() {
        let (sqdist, closest, entity) =
            point_triangle_sqdistance(&Point3::new(0.5, 0.5, 3.0), &create_triangle());
        assert_eq!(entity, NearestEntity::Face);
        assert_abs_diff_eq!(sqdist, 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(closest, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn points_beyond_vertices_are_classified_as_vertices() {
        let triangle = create_triangle();
        let cases = [
            (Point3::new(-1.0, -1.0, 0.0), 0, 2.0),
            (Point3::new(3.0, -1.0, 1.0), 1, 3.0),
            (Point3::new(-0.5, 3.0, 0.0), 2, 1.25),
        ];
        for &(point, vertex, expected_sqdist) in &cases {
            let (sqdist, closest, entity) = point_triangle_sqdistance(&point, &triangle);
            assert_eq!(entity, NearestEntity::Vertex(vertex));
            assert_eq!(closest, triangle[vertex]);
            assert_abs_diff_eq!(sqdist, expected_sqdist, epsilon = 1e-12);
        }
    }

    #[test]
    fn points_beyond_edges_are_classified_as_edges() {
        let triangle = create_triangle();
        let cases = [
            (Point3::new(1.0, -2.0, 0.0), 0, Point3::new(1.0, 0.0, 0.0)),
            (Point3::new(2.0, 2.0, 0.0), 1, Point3::new(1.0, 1.0, 0.0)),
            (Point3::new(-1.0, 0.5, -1.0), 2, Point3::new(0.0, 0.5, 0.0)),
        ];
        for &(point, edge, expected_closest) in &cases {
            let (sqdist, closest, entity) = point_triangle_sqdistance(&point, &triangle);
            assert_eq!(entity, NearestEntity::Edge(edge));
            assert_abs_diff_eq!(closest, expected_closest, epsilon = 1e-12);
            assert_abs_diff_eq!(
                sqdist,
                (&point - &expected_closest).squared_length(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn cube_distance_is_signed() {
        let mesh = create_unit_cube();
        let distance = MeshDistance::new(&mesh);

        assert_abs_diff_eq!(
            distance.signed_distance(&Point3::equal_components(0.5)),
            -0.5,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            distance.signed_distance(&Point3::new(0.5, 0.5, 1.25)),
            0.25,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            distance.signed_distance(&Point3::new(0.2, 0.9, 0.5)),
            -0.1,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            distance.signed_distance(&Point3::new(2.0, 2.0, 2.0)),
            fgr::sqrt(3.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            distance.signed_distance(&Point3::new(1.5, -0.5, 0.5)),
            fgr::sqrt(0.5),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            distance.unsigned_distance(&Point3::new(0.5, 0.5, 0.9)),
            0.1,
            epsilon = 1e-12
        );
    }

    #[test]
    fn sign_is_correct_near_diagonal_edges() {
        let mesh = create_unit_cube();
        let distance = MeshDistance::new(&mesh);
        let xs = ndarray::Array::linspace(0.05, 0.95, 10);
        for &x in &xs {
            assert!(distance.signed_distance(&Point3::new(x, 1.0 - x, -0.1)) > 0.0);
            assert!(distance.signed_distance(&Point3::new(x, 1.0 - x, 0.02)) < 0.0);
        }
    }

    #[test]
    fn empty_mesh_is_infinitely_far() {
        let mesh = TriangleMesh::new(Vec::new(), Vec::new());
        let distance = MeshDistance::new(&mesh);
        assert!(distance.nearest(&Point3::origin()).is_none());
        assert_eq!(distance.signed_distance(&Point3::origin()), fgr::INFINITY);
    }
}
