//! Static triangle meshes.

pub mod distance;

use crate::{
    geometry::{BoundingBox3, Point3, Vec3},
    grid::fgr,
};
use std::collections::HashMap;

/// A triangle mesh with precomputed normals and vertex adjacency.
///
/// The normals are oriented by the winding of the faces, so for a closed
/// mesh with counter-clockwise faces seen from outside they point outwards.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    vertices: Vec<Point3<fgr>>,
    faces: Vec<[usize; 3]>,
    face_normals: Vec<Vec3<fgr>>,
    vertex_normals: Vec<Vec3<fgr>>,
    edge_normals: HashMap<(usize, usize), Vec3<fgr>>,
    incident_faces: Vec<Vec<usize>>,
}

fn edge_key(first: usize, second: usize) -> (usize, usize) {
    if first < second {
        (first, second)
    } else {
        (second, first)
    }
}

impl TriangleMesh {
    /// Creates a new mesh from the given vertex positions and faces, where
    /// each face holds the indices of its three vertices.
    ///
    /// # Panics
    ///
    /// If any face refers to a non-existent vertex.
    pub fn new(vertices: Vec<Point3<fgr>>, faces: Vec<[usize; 3]>) -> Self {
        let n_vertices = vertices.len();
        for (face_idx, face) in faces.iter().enumerate() {
            for &vertex in face {
                assert!(
                    vertex < n_vertices,
                    "Face {} refers to vertex {} in mesh with {} vertices",
                    face_idx,
                    vertex,
                    n_vertices
                );
            }
        }

        let face_normals: Vec<_> = faces
            .iter()
            .map(|&[a, b, c]| {
                (&vertices[b] - &vertices[a])
                    .cross(&(&vertices[c] - &vertices[a]))
                    .normalized()
            })
            .collect();

        let mut incident_faces = vec![Vec::new(); n_vertices];
        let mut vertex_normals = vec![Vec3::zero(); n_vertices];
        let mut edge_normals = HashMap::new();

        for (face_idx, (face, normal)) in faces.iter().zip(face_normals.iter()).enumerate() {
            for corner in 0..3 {
                let vertex = face[corner];
                let next = face[(corner + 1) % 3];
                let previous = face[(corner + 2) % 3];

                incident_faces[vertex].push(face_idx);

                let angle = Self::corner_angle(
                    &vertices[vertex],
                    &vertices[next],
                    &vertices[previous],
                );
                vertex_normals[vertex] = vertex_normals[vertex] + normal * angle;

                let edge_normal = edge_normals
                    .entry(edge_key(vertex, next))
                    .or_insert_with(Vec3::zero);
                *edge_normal = *edge_normal + *normal;
            }
        }

        for normal in vertex_normals.iter_mut() {
            *normal = normal.normalized();
        }
        for normal in edge_normals.values_mut() {
            *normal = normal.normalized();
        }

        Self {
            vertices,
            faces,
            face_normals,
            vertex_normals,
            edge_normals,
            incident_faces,
        }
    }

    fn corner_angle(corner: &Point3<fgr>, next: &Point3<fgr>, previous: &Point3<fgr>) -> fgr {
        let to_next = (next - corner).normalized();
        let to_previous = (previous - corner).normalized();
        to_next.dot(&to_previous).clamp(-1.0, 1.0).acos()
    }

    /// Returns the number of vertices in the mesh.
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces in the mesh.
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns a slice with the positions of all vertices.
    pub fn vertex_positions(&self) -> &[Point3<fgr>] {
        &self.vertices
    }

    /// Returns a handle to the vertex with the given index.
    ///
    /// # Panics
    ///
    /// If the vertex does not exist.
    pub fn vertex(&self, index: usize) -> VertexHandle<'_> {
        assert!(index < self.n_vertices(), "Vertex index {} out of bounds", index);
        VertexHandle { mesh: self, index }
    }

    /// Returns a handle to the face with the given index.
    ///
    /// # Panics
    ///
    /// If the face does not exist.
    pub fn face(&self, index: usize) -> FaceHandle<'_> {
        assert!(index < self.n_faces(), "Face index {} out of bounds", index);
        FaceHandle { mesh: self, index }
    }

    /// Returns an iterator over handles to all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle<'_>> + '_ {
        (0..self.n_vertices()).map(move |index| VertexHandle { mesh: self, index })
    }

    /// Returns an iterator over handles to all faces.
    pub fn faces(&self) -> impl Iterator<Item = FaceHandle<'_>> + '_ {
        (0..self.n_faces()).map(move |index| FaceHandle { mesh: self, index })
    }

    /// Returns an iterator over handles to the faces containing the given vertex.
    pub fn incident_faces(&self, vertex: usize) -> impl Iterator<Item = FaceHandle<'_>> + '_ {
        self.incident_faces[vertex]
            .iter()
            .map(move |&index| FaceHandle { mesh: self, index })
    }

    /// Returns the pseudo-normal of the edge between the given vertices, or
    /// `None` if no face has such an edge.
    pub fn edge_normal(&self, first: usize, second: usize) -> Option<&Vec3<fgr>> {
        self.edge_normals.get(&edge_key(first, second))
    }

    /// Computes the smallest box containing all vertices, or `None` if the
    /// mesh has no vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox3<fgr>> {
        BoundingBox3::enclosing(&self.vertices)
    }
}

/// Reference to a vertex of a mesh.
#[derive(Clone, Copy, Debug)]
pub struct VertexHandle<'a> {
    mesh: &'a TriangleMesh,
    index: usize,
}

impl<'a> VertexHandle<'a> {
    /// Returns the index of the vertex in its mesh.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a reference to the position of the vertex.
    pub fn position(&self) -> &'a Point3<fgr> {
        &self.mesh.vertices[self.index]
    }

    /// Returns a reference to the angle-weighted pseudo-normal of the vertex.
    pub fn normal(&self) -> &'a Vec3<fgr> {
        &self.mesh.vertex_normals[self.index]
    }

    /// Returns an iterator over handles to the faces containing the vertex.
    pub fn incident_faces(&self) -> impl Iterator<Item = FaceHandle<'a>> + 'a {
        self.mesh.incident_faces(self.index)
    }
}

/// Reference to a face of a mesh.
#[derive(Clone, Copy, Debug)]
pub struct FaceHandle<'a> {
    mesh: &'a TriangleMesh,
    index: usize,
}

impl<'a> FaceHandle<'a> {
    /// Returns the index of the face in its mesh.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a reference to the indices of the three vertices of the face.
    pub fn vertex_indices(&self) -> &'a [usize; 3] {
        &self.mesh.faces[self.index]
    }

    /// Returns handles to the three vertices of the face.
    pub fn vertices(&self) -> [VertexHandle<'a>; 3] {
        let [a, b, c] = *self.vertex_indices();
        [self.mesh.vertex(a), self.mesh.vertex(b), self.mesh.vertex(c)]
    }

    /// Returns the positions of the three vertices of the face.
    pub fn corners(&self) -> [Point3<fgr>; 3] {
        let [a, b, c] = *self.vertex_indices();
        let vertices = &self.mesh.vertices;
        [vertices[a], vertices[b], vertices[c]]
    }

    /// Returns a reference to the unit normal of the face.
    pub fn normal(&self) -> &'a Vec3<fgr> {
        &self.mesh.face_normals[self.index]
    }

    /// Returns a reference to the pseudo-normal of the given edge of the face,
    /// where edge `e` goes from vertex `e` to vertex `(e + 1) % 3`.
    pub fn edge_normal(&self, edge: usize) -> &'a Vec3<fgr> {
        let indices = self.vertex_indices();
        match self
            .mesh
            .edge_normal(indices[edge % 3], indices[(edge + 1) % 3])
        {
            Some(normal) => normal,
            None => self.normal(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {

    use super::*;

    /// Creates the closed unit cube [0, 1]^3 with outward facing normals.
    pub fn create_unit_cube() -> TriangleMesh {
        let vertices = (0..8)
            .map(|corner| {
                Point3::new(
                    (corner & 1) as fgr,
                    ((corner >> 1) & 1) as fgr,
                    ((corner >> 2) & 1) as fgr,
                )
            })
            .collect();
        let faces = vec![
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
            [0, 1, 4],
            [1, 5, 4],
            [2, 6, 3],
            [3, 6, 7],
            [0, 4, 2],
            [2, 4, 6],
            [1, 3, 5],
            [3, 7, 5],
        ];
        TriangleMesh::new(vertices, faces)
    }
}

#[cfg(test)]
mod tests {

    use super::testing::create_unit_cube;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cube_face_normals_point_outwards() {
        let mesh = create_unit_cube();
        let center = Point3::equal_components(0.5);
        for face in mesh.faces() {
            let corners = face.corners();
            let outward = &corners[0] - &center;
            assert!(face.normal().dot(&outward) > 0.0);
            assert_abs_diff_eq!(face.normal().length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cube_vertex_normals_are_diagonal() {
        let mesh = create_unit_cube();
        let center = Point3::equal_components(0.5);
        for vertex in mesh.vertices() {
            let expected = (vertex.position() - &center).normalized();
            assert_abs_diff_eq!(*vertex.normal(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn incident_faces_contain_vertex() {
        let mesh = create_unit_cube();
        let mut n_incidences = 0;
        for vertex in mesh.vertices() {
            for face in vertex.incident_faces() {
                assert!(face.vertex_indices().contains(&vertex.index()));
                n_incidences += 1;
            }
        }
        assert_eq!(n_incidences, 3 * mesh.n_faces());
    }

    #[test]
    fn edge_normals_average_adjacent_faces() {
        let mesh = create_unit_cube();
        let normal = mesh.edge_normal(0, 1).unwrap();
        let expected = Vec3::new(0.0, -1.0, -1.0).normalized();
        assert_abs_diff_eq!(*normal, expected, epsilon = 1e-12);

        let diagonal = mesh.edge_normal(1, 2).unwrap();
        assert_abs_diff_eq!(*diagonal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert!(mesh.edge_normal(0, 7).is_none());
    }

    #[test]
    fn bounding_box_encloses_vertices() {
        let mesh = create_unit_cube();
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.lower(), &Point3::origin());
        assert_eq!(bounds.upper(), &Point3::equal_components(1.0));
        assert!(TriangleMesh::new(Vec::new(), Vec::new())
            .bounding_box()
            .is_none());
    }

    #[test]
    #[should_panic]
    fn invalid_face_index_panics() {
        TriangleMesh::new(vec![Point3::origin(); 3], vec![[0, 1, 3]]);
    }
}
