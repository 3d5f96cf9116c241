//! Binary file format for discretization grids.
//!
//! All values are stored in little-endian byte order. The file starts with
//! a header describing the grid, followed by the coefficients, cell table and
//! cell map of every field in order of creation.

use super::utils;
use crate::{
    field::{DiscreteField, ABSENT_CELL},
    geometry::{BoundingBox3, Dim3, In3D, Point3, Vec3},
    grid::{fgr, DiscreteGrid, GridDomain, GridType},
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::Array2;
use std::{convert::TryFrom, io, path::Path};

/// Bytes identifying a grid file.
pub const MAGIC: &[u8; 8] = b"DSCRGRID";

/// Version of the file format written by this module.
pub const FORMAT_VERSION: u32 = 1;

/// Header information of a grid file.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFileHeader {
    pub grid_type: GridType,
    pub grid_domain: GridDomain,
    pub n_fields: usize,
}

fn invalid_data<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidData, message))
}

fn to_usize(value: u64, description: &str) -> io::Result<usize> {
    usize::try_from(value).or_else(|_| invalid_data(format!("Invalid {}: {}", description, value)))
}

/// Maximum number of values read into an array at a time. Arrays grow chunk
/// by chunk, so a declared length larger than the data never gets allocated.
const READ_CHUNK_LENGTH: usize = 1 << 16;

fn read_f64_vec<R: io::Read>(reader: &mut R, length: usize) -> io::Result<Vec<fgr>> {
    let mut values = Vec::with_capacity(length.min(READ_CHUNK_LENGTH));
    while values.len() < length {
        let start = values.len();
        values.resize(length.min(start + READ_CHUNK_LENGTH), 0.0);
        reader.read_f64_into::<LittleEndian>(&mut values[start..])?;
    }
    Ok(values)
}

fn read_u32_vec<R: io::Read>(reader: &mut R, length: usize) -> io::Result<Vec<u32>> {
    let mut values = Vec::with_capacity(length.min(READ_CHUNK_LENGTH));
    while values.len() < length {
        let start = values.len();
        values.resize(length.min(start + READ_CHUNK_LENGTH), 0);
        reader.read_u32_into::<LittleEndian>(&mut values[start..])?;
    }
    Ok(values)
}

fn write_vec3<W: io::Write>(writer: &mut W, vector: &Vec3<fgr>) -> io::Result<()> {
    for &value in vector {
        writer.write_f64::<LittleEndian>(value)?;
    }
    Ok(())
}

fn write_point3<W: io::Write>(writer: &mut W, point: &Point3<fgr>) -> io::Result<()> {
    write_vec3(writer, &point.to_vec3())
}

fn read_vec3<R: io::Read>(reader: &mut R) -> io::Result<Vec3<fgr>> {
    let mut values = [0.0; 3];
    reader.read_f64_into::<LittleEndian>(&mut values)?;
    Ok(Vec3::new(values[0], values[1], values[2]))
}

/// Writes the given grid with all its fields in binary format.
pub fn write_grid<W, G>(writer: &mut W, grid: &G) -> io::Result<()>
where
    W: io::Write,
    G: DiscreteGrid,
{
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u8(G::TYPE.code())?;

    let grid_domain = grid.grid_domain();
    write_point3(writer, grid_domain.domain().lower())?;
    write_point3(writer, grid_domain.domain().upper())?;
    for &n in grid_domain.resolution() {
        writer.write_u32::<LittleEndian>(n as u32)?;
    }
    write_vec3(writer, grid_domain.cell_size())?;
    write_vec3(writer, grid_domain.inv_cell_size())?;
    writer.write_u64::<LittleEndian>(grid_domain.n_cells() as u64)?;

    writer.write_u64::<LittleEndian>(grid.n_fields() as u64)?;
    for field in grid.fields() {
        write_field(writer, field)?;
    }
    Ok(())
}

fn write_field<W: io::Write>(writer: &mut W, field: &DiscreteField) -> io::Result<()> {
    writer.write_u64::<LittleEndian>(field.n_coefficients() as u64)?;
    for &coefficient in field.coefficients() {
        writer.write_f64::<LittleEndian>(coefficient)?;
    }

    writer.write_u32::<LittleEndian>(field.nodes_per_cell() as u32)?;
    writer.write_u64::<LittleEndian>(field.n_present_cells() as u64)?;
    for &index in field.cells() {
        writer.write_u32::<LittleEndian>(index)?;
    }

    writer.write_u64::<LittleEndian>(field.cell_map().len() as u64)?;
    for &entry in field.cell_map() {
        writer.write_u32::<LittleEndian>(entry)?;
    }
    Ok(())
}

/// Reads and validates the header of a grid file.
pub fn read_header<R: io::Read>(reader: &mut R) -> io::Result<GridFileHeader> {
    let mut magic = [0; 8];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return invalid_data("Not a grid file: wrong magic bytes".to_string());
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return invalid_data(format!(
            "Unsupported grid file version {} (expected {})",
            version, FORMAT_VERSION
        ));
    }

    let type_code = reader.read_u8()?;
    let grid_type = match GridType::from_code(type_code) {
        Some(grid_type) => grid_type,
        None => return invalid_data(format!("Invalid grid type {}", type_code)),
    };

    let lower = read_vec3(reader)?.to_point3();
    let upper = read_vec3(reader)?.to_point3();
    for &dim in &Dim3::slice() {
        if !(lower[dim].is_finite() && upper[dim].is_finite() && upper[dim] > lower[dim]) {
            return invalid_data(format!("Invalid grid domain {} to {}", lower, upper));
        }
    }

    let mut resolution_values = [0; 3];
    reader.read_u32_into::<LittleEndian>(&mut resolution_values)?;
    let resolution = In3D::new(
        resolution_values[0] as usize,
        resolution_values[1] as usize,
        resolution_values[2] as usize,
    );
    if resolution.into_iter().any(|&n| n == 0) || !GridDomain::supports_resolution(&resolution) {
        return invalid_data(format!("Invalid grid resolution {}", resolution));
    }

    let grid_domain = GridDomain::new(BoundingBox3::new(lower, upper), resolution);

    let cell_size = read_vec3(reader)?;
    let inv_cell_size = read_vec3(reader)?;
    if &cell_size != grid_domain.cell_size() || &inv_cell_size != grid_domain.inv_cell_size() {
        return invalid_data(format!(
            "Cell size {} is inconsistent with domain and resolution",
            cell_size
        ));
    }

    let n_cells = reader.read_u64::<LittleEndian>()?;
    if n_cells != grid_domain.n_cells() as u64 {
        return invalid_data(format!(
            "Cell count {} is inconsistent with resolution {}",
            n_cells, resolution
        ));
    }

    let n_fields = to_usize(reader.read_u64::<LittleEndian>()?, "field count")?;

    Ok(GridFileHeader {
        grid_type,
        grid_domain,
        n_fields,
    })
}

fn read_field<R, G>(reader: &mut R, lattice: &G) -> io::Result<DiscreteField>
where
    R: io::Read,
    G: DiscreteGrid,
{
    let n_cells = lattice.n_cells();

    let n_coefficients = to_usize(reader.read_u64::<LittleEndian>()?, "coefficient count")?;
    if n_coefficients > lattice.n_nodes() {
        return invalid_data(format!(
            "Coefficient count {} exceeds number of grid nodes {}",
            n_coefficients,
            lattice.n_nodes()
        ));
    }
    let coefficients = read_f64_vec(reader, n_coefficients)?;

    let nodes_per_cell = reader.read_u32::<LittleEndian>()? as usize;
    if nodes_per_cell != G::NODES_PER_CELL {
        return invalid_data(format!(
            "Invalid number of nodes per cell {} (expected {})",
            nodes_per_cell,
            G::NODES_PER_CELL
        ));
    }

    let n_present_cells = to_usize(reader.read_u64::<LittleEndian>()?, "cell count")?;
    if n_present_cells > n_cells {
        return invalid_data(format!(
            "Present cell count {} exceeds number of grid cells {}",
            n_present_cells, n_cells
        ));
    }
    let indices = read_u32_vec(reader, n_present_cells * nodes_per_cell)?;
    if let Some(&index) = indices
        .iter()
        .find(|&&index| index as usize >= n_coefficients)
    {
        return invalid_data(format!(
            "Coefficient index {} out of bounds for {} coefficients",
            index, n_coefficients
        ));
    }
    let cells = Array2::from_shape_vec((n_present_cells, nodes_per_cell), indices)
        .or_else(|err| invalid_data(format!("Invalid cell table: {}", err)))?;

    let cell_map_len = to_usize(reader.read_u64::<LittleEndian>()?, "cell map length")?;
    if cell_map_len != n_cells {
        return invalid_data(format!(
            "Cell map length {} differs from number of grid cells {}",
            cell_map_len, n_cells
        ));
    }
    let cell_map = read_u32_vec(reader, cell_map_len)?;

    let mut next_row = 0;
    for &entry in &cell_map {
        if entry == ABSENT_CELL {
            continue;
        }
        if entry as usize != next_row {
            return invalid_data(format!(
                "Cell map entry {} is out of order (expected row {})",
                entry, next_row
            ));
        }
        next_row += 1;
    }
    if next_row != n_present_cells {
        return invalid_data(format!(
            "Cell map references {} cells but {} are present",
            next_row, n_present_cells
        ));
    }

    Ok(DiscreteField::from_parts(coefficients, cells, cell_map))
}

/// Reads a grid with all its fields from binary format.
///
/// Fails if the stored grid type differs from `G`, if the data is
/// inconsistent or truncated, or if there are any bytes after the last field.
pub fn read_grid<R, G>(reader: &mut R) -> io::Result<G>
where
    R: io::Read,
    G: DiscreteGrid,
{
    let header = read_header(reader)?;
    if header.grid_type != G::TYPE {
        return invalid_data(format!(
            "File contains a {} grid, expected a {} grid",
            header.grid_type,
            G::TYPE
        ));
    }

    let lattice = G::from_fields(header.grid_domain, Vec::new());
    let mut fields = Vec::new();
    for _ in 0..header.n_fields {
        fields.push(read_field(reader, &lattice)?);
    }

    let mut trailing = [0; 1];
    if reader.read(&mut trailing)? != 0 {
        return invalid_data("Unexpected data after last field".to_string());
    }

    Ok(G::from_fields(lattice.grid_domain().clone(), fields))
}

/// Reads the header of the given grid file.
pub fn read_header_from_file<P: AsRef<Path>>(file_path: P) -> io::Result<GridFileHeader> {
    let mut reader = io::BufReader::new(utils::open_file_and_map_err(file_path)?);
    read_header(&mut reader)
}
