//! Reading of triangle meshes from Wavefront OBJ files.

use super::utils;
use crate::{geometry::Point3, grid::fgr, mesh::TriangleMesh};
use std::{
    io::{self, BufRead},
    path::Path,
};

fn invalid_line<T>(line_number: usize, message: String) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Line {} of OBJ file: {}", line_number, message),
    ))
}

/// Reads a triangle mesh from the given OBJ file.
///
/// Only vertex positions (`v`) and faces (`f`) are used. Faces with more
/// than three vertices are split into a fan of triangles.
///
/// # Parameters
///
/// - `file_path`: Path of the OBJ file.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the mesh.
/// - `Err`: Contains an error encountered while trying to read or interpret the file.
pub fn read_obj_mesh<P: AsRef<Path>>(file_path: P) -> io::Result<TriangleMesh> {
    let file = utils::open_file_and_map_err(file_path)?;
    parse_obj_mesh(io::BufReader::new(file))
}

/// Parses a triangle mesh from OBJ data.
pub fn parse_obj_mesh<R: BufRead>(reader: R) -> io::Result<TriangleMesh> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_idx + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for coord in coords.iter_mut() {
                    *coord = match tokens.next().map(str::parse::<fgr>) {
                        Some(Ok(value)) => value,
                        Some(Err(err)) => {
                            return invalid_line(line_number, format!("Invalid vertex: {}", err))
                        }
                        None => {
                            return invalid_line(
                                line_number,
                                "Vertex has fewer than three coordinates".to_string(),
                            )
                        }
                    };
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let mut polygon = Vec::new();
                for token in tokens {
                    polygon.push(parse_vertex_reference(token, vertices.len(), line_number)?);
                }
                if polygon.len() < 3 {
                    return invalid_line(
                        line_number,
                        format!("Face has only {} vertices", polygon.len()),
                    );
                }
                for corner in 1..polygon.len() - 1 {
                    faces.push([polygon[0], polygon[corner], polygon[corner + 1]]);
                }
            }
            _ => {}
        }
    }

    if let Some(&index) = faces.iter().flatten().find(|&&index| index >= vertices.len()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "OBJ file refers to vertex {} but has only {} vertices",
                index + 1,
                vertices.len()
            ),
        ));
    }

    Ok(TriangleMesh::new(vertices, faces))
}

/// Converts a face vertex reference like `3`, `-1` or `3/1/2` into a zero-based index.
fn parse_vertex_reference(
    token: &str,
    n_vertices: usize,
    line_number: usize,
) -> io::Result<usize> {
    let index_str = token.split('/').next().unwrap_or(token);
    let index: i64 = match index_str.parse() {
        Ok(index) => index,
        Err(err) => {
            return invalid_line(
                line_number,
                format!("Invalid vertex reference `{}`: {}", token, err),
            )
        }
    };
    if index > 0 {
        Ok(index as usize - 1)
    } else if index < 0 && (index.unsigned_abs() as usize) <= n_vertices {
        Ok(n_vertices - index.unsigned_abs() as usize)
    } else {
        invalid_line(
            line_number,
            format!("Vertex reference `{}` is out of range", token),
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn parse(text: &str) -> io::Result<TriangleMesh> {
        parse_obj_mesh(io::Cursor::new(text))
    }

    #[test]
    fn triangles_and_quads_are_parsed() {
        let mesh = parse(
            "# square and triangle\n\
             o square\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             vn 0 0 1\n\
             f 1//1 2//1 3//1 4//1\n\
             v 0.5 0.5 1.0\n\
             f -3 -2 -1\n",
        )
        .unwrap();
        assert_eq!(mesh.n_vertices(), 5);
        assert_eq!(mesh.n_faces(), 3);
        assert_eq!(mesh.face(0).vertex_indices(), &[0, 1, 2]);
        assert_eq!(mesh.face(1).vertex_indices(), &[0, 2, 3]);
        assert_eq!(mesh.face(2).vertex_indices(), &[2, 3, 4]);
        assert_eq!(mesh.vertex(4).position(), &Point3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn texture_coordinate_references_are_ignored() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1/1 3/1\n").unwrap();
        assert_eq!(mesh.face(0).vertex_indices(), &[0, 1, 2]);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for text in &[
            "v 0 0\n",
            "v 0 zero 0\n",
            "v 0 0 0\nv 1 0 0\nf 1 2\n",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 -4\n",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n",
        ] {
            assert_eq!(
                parse(text).err().map(|err| err.kind()),
                Some(io::ErrorKind::InvalidData),
                "Accepted {:?}",
                text
            );
        }
    }
}
