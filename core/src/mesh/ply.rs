//! PLY mesh import and export.
//!
//! The exporter writes `binary_little_endian` files with a `vertex` element
//! (`x y z`, optional `nx ny nz`, `u v`, `red green blue alpha` as floats)
//! and, for triangle meshes, a `face` element with
//! `list uchar uint vertex_indices`. Point meshes are written without faces.
//!
//! The importer accepts binary (either byte order) and ASCII files with
//! properties in any order and of any scalar type. Integer color channels are
//! normalized from 0-255. Polygons with more than three corners are fan
//! triangulated.
//!
//! Triangle lists without an index buffer are written with identity faces
//! and a `comment oflike unindexed` header line, so they load back without
//! indices.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::data::{Mesh, MeshError, PrimitiveTopology};
use super::vertex::Vertex3D;

/// PLY import/export errors.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a PLY file")]
    MissingMagic,
    #[error("unsupported PLY format '{0}'")]
    UnsupportedFormat(String),
    #[error("malformed header line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },
    #[error("unknown property type '{0}'")]
    UnknownType(String),
    #[error("unexpected end of data while reading element '{0}'")]
    UnexpectedEof(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("vertex element lacks x/y/z properties")]
    MissingPosition,
    #[error("cannot export {0:?} meshes to PLY")]
    UnsupportedTopology(PrimitiveTopology),
    #[error("element '{element}' declares {count} rows, more than can be allocated")]
    TooManyRows { element: String, count: usize },
    #[error("loaded mesh is invalid: {0}")]
    InvalidMesh(#[from] MeshError),
}

/// Rows reserved up front; larger elements grow as rows are actually read.
const MAX_RESERVED_ROWS: usize = 1 << 16;

/// Header comment marking a triangle list saved without indices.
const UNINDEXED_MARKER: &str = "comment oflike unindexed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn parse(name: &str) -> Result<Self, PlyError> {
        Ok(match name {
            "char" | "int8" => Self::I8,
            "uchar" | "uint8" => Self::U8,
            "short" | "int16" => Self::I16,
            "ushort" | "uint16" => Self::U16,
            "int" | "int32" => Self::I32,
            "uint" | "uint32" => Self::U32,
            "float" | "float32" => Self::F32,
            "double" | "float64" => Self::F64,
            other => return Err(PlyError::UnknownType(other.to_string())),
        })
    }

    fn is_integer(&self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

#[derive(Debug, Clone)]
enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    kind: PropertyKind,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
    unindexed: bool,
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<Header, PlyError> {
    let mut line = String::new();
    let next_line = |reader: &mut R, line: &mut String| -> Result<bool, PlyError> {
        line.clear();
        Ok(reader.read_line(line)? > 0)
    };

    if !next_line(reader, &mut line)? || line.trim() != "ply" {
        return Err(PlyError::MissingMagic);
    }

    let mut encoding = None;
    let mut unindexed = false;
    let mut elements: Vec<Element> = Vec::new();
    let mut current_line = 1usize;
    loop {
        if !next_line(reader, &mut line)? {
            return Err(PlyError::MalformedHeader {
                line: current_line,
                reason: "missing end_header".into(),
            });
        }
        current_line += 1;
        let malformed = |reason: &str| PlyError::MalformedHeader {
            line: current_line,
            reason: reason.to_string(),
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => continue,
            ["comment", "oflike", "unindexed"] => unindexed = true,
            ["comment", ..] | ["obj_info", ..] => continue,
            ["format", kind, _version] => {
                encoding = Some(match *kind {
                    "ascii" => Encoding::Ascii,
                    "binary_little_endian" => Encoding::BinaryLittleEndian,
                    "binary_big_endian" => Encoding::BinaryBigEndian,
                    other => return Err(PlyError::UnsupportedFormat(other.to_string())),
                });
            }
            ["element", name, count] => {
                let count = count
                    .parse::<usize>()
                    .map_err(|_| malformed("element count is not a number"))?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count, item, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| malformed("property before element"))?;
                element.properties.push(Property {
                    name: name.to_string(),
                    kind: PropertyKind::List {
                        count: ScalarType::parse(count)?,
                        item: ScalarType::parse(item)?,
                    },
                });
            }
            ["property", ty, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| malformed("property before element"))?;
                element.properties.push(Property {
                    name: name.to_string(),
                    kind: PropertyKind::Scalar(ScalarType::parse(ty)?),
                });
            }
            ["end_header"] => break,
            _ => return Err(malformed("unrecognized header line")),
        }
    }

    let encoding = encoding.ok_or(PlyError::MalformedHeader {
        line: current_line,
        reason: "missing format line".into(),
    })?;
    Ok(Header {
        encoding,
        elements,
        unindexed,
    })
}

/// Source of scalar values for the element body.
trait ScalarSource {
    fn next_scalar(&mut self, ty: ScalarType, element: &str) -> Result<f64, PlyError>;
}

struct BinarySource<R> {
    reader: R,
    big_endian: bool,
}

impl<R: Read> BinarySource<R> {
    fn read_bytes<const N: usize>(&mut self, element: &str) -> Result<[u8; N], PlyError> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                PlyError::UnexpectedEof(element.to_string())
            } else {
                PlyError::Io(e)
            }
        })?;
        if self.big_endian {
            buf.reverse();
        }
        Ok(buf)
    }
}

impl<R: Read> ScalarSource for BinarySource<R> {
    fn next_scalar(&mut self, ty: ScalarType, element: &str) -> Result<f64, PlyError> {
        // bytes are normalized to little-endian by read_bytes
        Ok(match ty {
            ScalarType::I8 => i8::from_le_bytes(self.read_bytes::<1>(element)?) as f64,
            ScalarType::U8 => u8::from_le_bytes(self.read_bytes::<1>(element)?) as f64,
            ScalarType::I16 => i16::from_le_bytes(self.read_bytes::<2>(element)?) as f64,
            ScalarType::U16 => u16::from_le_bytes(self.read_bytes::<2>(element)?) as f64,
            ScalarType::I32 => i32::from_le_bytes(self.read_bytes::<4>(element)?) as f64,
            ScalarType::U32 => u32::from_le_bytes(self.read_bytes::<4>(element)?) as f64,
            ScalarType::F32 => f32::from_le_bytes(self.read_bytes::<4>(element)?) as f64,
            ScalarType::F64 => f64::from_le_bytes(self.read_bytes::<8>(element)?),
        })
    }
}

struct AsciiSource<'a> {
    tokens: std::str::SplitAsciiWhitespace<'a>,
}

impl ScalarSource for AsciiSource<'_> {
    fn next_scalar(&mut self, _ty: ScalarType, element: &str) -> Result<f64, PlyError> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| PlyError::UnexpectedEof(element.to_string()))?;
        token
            .parse::<f64>()
            .map_err(|_| PlyError::InvalidNumber(token.to_string()))
    }
}

/// Column indices of the recognized vertex properties.
#[derive(Default)]
struct VertexColumns {
    position: [Option<usize>; 3],
    normal: [Option<usize>; 3],
    uv: [Option<usize>; 2],
    color: [Option<usize>; 4],
    color_is_integer: bool,
}

impl VertexColumns {
    fn resolve(element: &Element) -> Self {
        let mut cols = VertexColumns::default();
        for (i, p) in element.properties.iter().enumerate() {
            let slot = match p.name.as_str() {
                "x" => &mut cols.position[0],
                "y" => &mut cols.position[1],
                "z" => &mut cols.position[2],
                "nx" => &mut cols.normal[0],
                "ny" => &mut cols.normal[1],
                "nz" => &mut cols.normal[2],
                "u" | "s" | "texture_u" => &mut cols.uv[0],
                "v" | "t" | "texture_v" => &mut cols.uv[1],
                "red" | "r" => &mut cols.color[0],
                "green" | "g" => &mut cols.color[1],
                "blue" | "b" => &mut cols.color[2],
                "alpha" | "a" => &mut cols.color[3],
                _ => continue,
            };
            *slot = Some(i);
            if matches!(p.name.as_str(), "red" | "r") {
                if let PropertyKind::Scalar(ty) = p.kind {
                    cols.color_is_integer = ty.is_integer();
                }
            }
        }
        cols
    }

    fn has_all<const N: usize>(slots: &[Option<usize>; N]) -> bool {
        slots.iter().all(Option::is_some)
    }
}

fn read_body(header: &Header, source: &mut dyn ScalarSource) -> Result<Mesh, PlyError> {
    let mut vertices: Vec<Vertex3D> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut has_faces = false;
    let mut streams = (false, false, false);

    for element in &header.elements {
        match element.name.as_str() {
            "vertex" => {
                let cols = VertexColumns::resolve(element);
                if !VertexColumns::has_all(&cols.position) {
                    return Err(PlyError::MissingPosition);
                }
                let has_normals = VertexColumns::has_all(&cols.normal);
                let has_uvs = VertexColumns::has_all(&cols.uv);
                let has_colors = cols.color[..3].iter().all(Option::is_some);
                streams = (has_normals, has_uvs, has_colors);

                vertices
                    .try_reserve(element.count.min(MAX_RESERVED_ROWS))
                    .map_err(|_| PlyError::TooManyRows {
                        element: element.name.clone(),
                        count: element.count,
                    })?;
                let mut row = vec![0.0f64; element.properties.len()];
                for _ in 0..element.count {
                    for (slot, property) in row.iter_mut().zip(&element.properties) {
                        *slot = read_property(property, source, &element.name)?;
                    }
                    let get = |c: Option<usize>, default: f32| c.map_or(default, |i| row[i] as f32);
                    let mut v = Vertex3D::new([
                        get(cols.position[0], 0.0),
                        get(cols.position[1], 0.0),
                        get(cols.position[2], 0.0),
                    ]);
                    if has_normals {
                        v.normal = [
                            get(cols.normal[0], 0.0),
                            get(cols.normal[1], 0.0),
                            get(cols.normal[2], 1.0),
                        ];
                    }
                    if has_uvs {
                        v.uv = [get(cols.uv[0], 0.0), get(cols.uv[1], 0.0)];
                    }
                    if has_colors {
                        let scale = if cols.color_is_integer { 1.0 / 255.0 } else { 1.0 };
                        let alpha_default = if cols.color_is_integer { 255.0 } else { 1.0 };
                        v.color = [
                            get(cols.color[0], 0.0) * scale,
                            get(cols.color[1], 0.0) * scale,
                            get(cols.color[2], 0.0) * scale,
                            get(cols.color[3], alpha_default) * scale,
                        ];
                    }
                    vertices.push(v);
                }
            }
            "face" => {
                has_faces = true;
                let list_col = element.properties.iter().position(|p| {
                    matches!(p.kind, PropertyKind::List { .. })
                        && (p.name == "vertex_indices" || p.name == "vertex_index")
                });
                for _ in 0..element.count {
                    for (i, property) in element.properties.iter().enumerate() {
                        if Some(i) == list_col {
                            let polygon = read_list(property, source, &element.name)?;
                            for k in 1..polygon.len().saturating_sub(1) {
                                indices.extend_from_slice(&[polygon[0], polygon[k], polygon[k + 1]]);
                            }
                        } else {
                            skip_property(property, source, &element.name)?;
                        }
                    }
                }
            }
            _ => {
                log::debug!("skipping PLY element '{}' ({} rows)", element.name, element.count);
                for _ in 0..element.count {
                    for property in &element.properties {
                        skip_property(property, source, &element.name)?;
                    }
                }
            }
        }
    }

    if header.unindexed && is_identity(&indices, vertices.len()) {
        indices.clear();
    }

    let topology = if has_faces {
        PrimitiveTopology::Triangles
    } else {
        PrimitiveTopology::Points
    };
    let mesh = Mesh::new(topology)
        .with_vertices(vertices)
        .with_indices(indices)
        .with_streams(streams.0, streams.1, streams.2);
    mesh.validate()?;
    Ok(mesh)
}

fn is_identity(indices: &[u32], vertex_count: usize) -> bool {
    indices.len() == vertex_count && indices.iter().enumerate().all(|(i, &index)| index as usize == i)
}

fn read_property(
    property: &Property,
    source: &mut dyn ScalarSource,
    element: &str,
) -> Result<f64, PlyError> {
    match property.kind {
        PropertyKind::Scalar(ty) => source.next_scalar(ty, element),
        PropertyKind::List { .. } => {
            // lists on the vertex element are not meaningful here
            skip_property(property, source, element)?;
            Ok(0.0)
        }
    }
}

fn read_list(
    property: &Property,
    source: &mut dyn ScalarSource,
    element: &str,
) -> Result<Vec<u32>, PlyError> {
    let PropertyKind::List { count, item } = property.kind else {
        return Ok(Vec::new());
    };
    let n = source.next_scalar(count, element)? as usize;
    (0..n)
        .map(|_| source.next_scalar(item, element).map(|v| v as u32))
        .collect()
}

fn skip_property(
    property: &Property,
    source: &mut dyn ScalarSource,
    element: &str,
) -> Result<(), PlyError> {
    match property.kind {
        PropertyKind::Scalar(ty) => {
            source.next_scalar(ty, element)?;
        }
        PropertyKind::List { count, item } => {
            let n = source.next_scalar(count, element)? as usize;
            for _ in 0..n {
                source.next_scalar(item, element)?;
            }
        }
    }
    Ok(())
}

/// Read a PLY mesh from a buffered reader.
pub fn load_ply<R: BufRead>(mut reader: R) -> Result<Mesh, PlyError> {
    let header = parse_header(&mut reader)?;
    match header.encoding {
        Encoding::Ascii => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            let mut source = AsciiSource {
                tokens: text.split_ascii_whitespace(),
            };
            read_body(&header, &mut source)
        }
        Encoding::BinaryLittleEndian | Encoding::BinaryBigEndian => {
            let mut source = BinarySource {
                reader,
                big_endian: header.encoding == Encoding::BinaryBigEndian,
            };
            read_body(&header, &mut source)
        }
    }
}

/// Read a PLY mesh from a file.
pub fn load_ply_file(path: impl AsRef<Path>) -> Result<Mesh, PlyError> {
    let path = path.as_ref();
    log::debug!("loading PLY mesh from {}", path.display());
    load_ply(BufReader::new(File::open(path)?))
}

/// Write a mesh as binary little-endian PLY.
pub fn save_ply<W: Write>(mesh: &Mesh, mut writer: W) -> Result<(), PlyError> {
    let faces: Option<Vec<[u32; 3]>> = match mesh.topology() {
        PrimitiveTopology::Points => None,
        t if t.is_triangles() => Some(mesh.triangles()),
        other => return Err(PlyError::UnsupportedTopology(other)),
    };

    let mut header = String::from("ply\nformat binary_little_endian 1.0\ncomment oflike\n");
    if mesh.topology() == PrimitiveTopology::Triangles && !mesh.is_indexed() {
        header.push_str(UNINDEXED_MARKER);
        header.push('\n');
    }
    header.push_str(&format!("element vertex {}\n", mesh.vertex_count()));
    header.push_str("property float x\nproperty float y\nproperty float z\n");
    if mesh.has_normals() {
        header.push_str("property float nx\nproperty float ny\nproperty float nz\n");
    }
    if mesh.has_uvs() {
        header.push_str("property float u\nproperty float v\n");
    }
    if mesh.has_colors() {
        header.push_str(
            "property float red\nproperty float green\nproperty float blue\nproperty float alpha\n",
        );
    }
    if let Some(faces) = &faces {
        header.push_str(&format!("element face {}\n", faces.len()));
        header.push_str("property list uchar uint vertex_indices\n");
    }
    header.push_str("end_header\n");
    writer.write_all(header.as_bytes())?;

    let mut put = |values: &[f32], w: &mut W| -> std::io::Result<()> {
        for v in values {
            w.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    };
    for v in mesh.vertices() {
        put(&v.position, &mut writer)?;
        if mesh.has_normals() {
            put(&v.normal, &mut writer)?;
        }
        if mesh.has_uvs() {
            put(&v.uv, &mut writer)?;
        }
        if mesh.has_colors() {
            put(&v.color, &mut writer)?;
        }
    }
    if let Some(faces) = faces {
        for face in faces {
            writer.write_all(&[3u8])?;
            for i in face {
                writer.write_all(&i.to_le_bytes())?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write a mesh to a binary little-endian PLY file.
pub fn save_ply_file(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), PlyError> {
    let path = path.as_ref();
    log::debug!("saving PLY mesh to {}", path.display());
    save_ply(mesh, BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::mesh::generators::{generate_icosphere, generate_plane};

    fn round_trip(mesh: &Mesh) -> Mesh {
        let mut bytes = Vec::new();
        save_ply(mesh, &mut bytes).unwrap();
        load_ply(bytes.as_slice()).unwrap()
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let mesh = generate_icosphere(1.5, 2).with_color(Color::new(0.1, 0.2, 0.3, 0.4));
        let loaded = round_trip(&mesh);
        assert_eq!(
            bytemuck::cast_slice::<_, u8>(mesh.vertices()),
            bytemuck::cast_slice::<_, u8>(loaded.vertices())
        );
        assert_eq!(mesh.indices(), loaded.indices());
        assert_eq!(loaded.topology(), PrimitiveTopology::Triangles);
        assert!(loaded.has_normals() && loaded.has_uvs() && loaded.has_colors());
    }

    #[test]
    fn test_unindexed_triangles_round_trip() {
        let mesh = Mesh::new(PrimitiveTopology::Triangles).with_vertices(vec![
            Vertex3D::new([0.0, 0.0, 0.0]),
            Vertex3D::new([1.0, 0.0, 0.0]),
            Vertex3D::new([0.0, 1.0, 0.0]),
            Vertex3D::new([1.0, 1.0, 0.0]),
            Vertex3D::new([2.0, 1.0, 0.0]),
            Vertex3D::new([1.0, 2.0, 0.0]),
        ]);
        let loaded = round_trip(&mesh);
        assert!(!loaded.is_indexed());
        assert_eq!(loaded.indices(), mesh.indices());
        assert_eq!(loaded.vertices(), mesh.vertices());
        assert_eq!(loaded.topology(), PrimitiveTopology::Triangles);
    }

    #[test]
    fn test_identity_indices_kept_without_marker() {
        let mesh = Mesh::new(PrimitiveTopology::Triangles)
            .with_vertices(vec![Vertex3D::default(); 3])
            .with_indices(vec![0, 1, 2]);
        assert_eq!(round_trip(&mesh).indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_oversized_element_count_is_an_error() {
        let text = "ply\nformat binary_little_endian 1.0\n\
            element vertex 18446744073709551615\n\
            property float x\nproperty float y\nproperty float z\nend_header\n";
        // 32-bit targets reject the count while parsing the header
        assert!(matches!(
            load_ply(text.as_bytes()),
            Err(PlyError::UnexpectedEof(_) | PlyError::MalformedHeader { .. })
        ));
        let ascii = text.replace("binary_little_endian", "ascii");
        assert!(matches!(
            load_ply(ascii.as_bytes()),
            Err(PlyError::UnexpectedEof(_) | PlyError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_round_trip_without_optional_streams() {
        let mesh = generate_plane(1.0, 1.0, 2, 2).with_streams(false, false, false);
        let loaded = round_trip(&mesh);
        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
        assert!(!loaded.has_normals());
        for (a, b) in mesh.vertices().iter().zip(loaded.vertices()) {
            assert_eq!(a.position, b.position);
            assert_eq!(b.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_point_cloud_round_trip() {
        let mesh = Mesh::new(PrimitiveTopology::Points).with_vertices(vec![
            Vertex3D::new([1.0, 2.0, 3.0]),
            Vertex3D::new([-4.0, 5.5, 0.25]),
        ]);
        let loaded = round_trip(&mesh);
        assert_eq!(loaded.topology(), PrimitiveTopology::Points);
        assert_eq!(loaded.vertices(), mesh.vertices());
        assert!(!loaded.is_indexed());
    }

    #[test]
    fn test_line_mesh_rejected() {
        let mesh = Mesh::new(PrimitiveTopology::Lines)
            .with_vertices(vec![Vertex3D::default(), Vertex3D::default()]);
        assert!(matches!(
            save_ply(&mesh, Vec::new()),
            Err(PlyError::UnsupportedTopology(PrimitiveTopology::Lines))
        ));
    }

    #[test]
    fn test_ascii_quad_with_uchar_colors() {
        let text = "ply\n\
            format ascii 1.0\n\
            comment hand written\n\
            element vertex 4\n\
            property float x\n\
            property float y\n\
            property float z\n\
            property uchar red\n\
            property uchar green\n\
            property uchar blue\n\
            element face 1\n\
            property list uchar int vertex_indices\n\
            end_header\n\
            0 0 0 255 0 0\n\
            1 0 0 0 255 0\n\
            1 1 0 0 0 255\n\
            0 1 0 255 255 255\n\
            4 0 1 2 3\n";
        let mesh = load_ply(text.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices()[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.has_colors());
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let text = "ply\nformat ascii 1.0\n\
            element vertex 3\nproperty double x\nproperty double y\nproperty double z\n\
            element edge 1\nproperty int a\nproperty int b\n\
            element face 1\nproperty uchar flags\nproperty list uchar uint vertex_index\n\
            end_header\n\
            0 0 0\n1 0 0\n0 1 0\n\
            0 1\n\
            7 3 0 1 2\n";
        let mesh = load_ply(text.as_bytes()).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_big_endian() {
        let mut bytes = b"ply\nformat binary_big_endian 1.0\nelement vertex 1\n\
            property float x\nproperty float y\nproperty float z\nend_header\n"
            .to_vec();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let mesh = load_ply(bytes.as_slice()).unwrap();
        assert_eq!(mesh.vertices()[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            load_ply("obj\n".as_bytes()),
            Err(PlyError::MissingMagic)
        ));
        assert!(matches!(
            load_ply("ply\nformat ascii 1.0\nelement vertex 1\nproperty quad x\nend_header\n".as_bytes()),
            Err(PlyError::UnknownType(_))
        ));
        assert!(matches!(
            load_ply("ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n".as_bytes()),
            Err(PlyError::UnexpectedEof(_))
        ));
        assert!(matches!(
            load_ply("ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n0\n".as_bytes()),
            Err(PlyError::MissingPosition)
        ));
        assert!(matches!(
            load_ply("ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar uint vertex_indices\nend_header\n0 0 0\n3 0 1 5\n".as_bytes()),
            Err(PlyError::InvalidMesh(MeshError::IndexOutOfRange { .. }))
        ));
    }
}
