//! The `discregrid` crate discretizes scalar functions, such as signed
//! distance fields of triangle meshes, on regular grids of cubic Lagrange
//! or trilinear cells.

pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod io;
pub mod mesh;
pub mod num;
pub mod sdf;

#[cfg(feature = "cli")]
pub mod cli;
