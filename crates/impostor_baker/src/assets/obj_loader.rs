//! OBJ loading for bake sources
//!
//! Reads `v`, `vn`, `vt`, `f` and `usemtl` statements. Polygons are fan
//! triangulated. Each `usemtl` starts a new submesh, so a drawable built from
//! the result needs one material per [`ObjModel::material_names`] entry.
//! Faces without normals get their flat face normal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::render::mesh::{Mesh, SubMesh, Vertex};

/// OBJ loading errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A statement could not be parsed
    #[error("Parse error on line {line}: {message}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
    /// The file parsed but describes no usable mesh
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Mesh plus the material group names of its submeshes
#[derive(Debug, Clone)]
pub struct ObjModel {
    /// Triangulated mesh, one submesh per material group
    pub mesh: Mesh,
    /// Material name of each submesh, `"default"` before any `usemtl`
    pub material_names: Vec<String>,
}

/// Parser state for one file
#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    submeshes: Vec<SubMesh>,
    material_names: Vec<String>,
    current_material: Option<String>,
    group_start: usize,
}

impl ObjParser {
    fn parse_line(&mut self, line_number: usize, line: &str) -> Result<(), ObjError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Ok(());
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(line_number, "vertex", &args)?;
                self.positions.push([x, y, z]);
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(line_number, "normal", &args)?;
                self.normals.push([x, y, z]);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(line_number, "tex coord", &args)?;
                self.tex_coords.push([u, v]);
            }
            "f" => self.parse_face(line_number, &args)?,
            "usemtl" => {
                self.close_group();
                self.current_material = Some(args.first().copied().unwrap_or("default").to_string());
            }
            _ => log::trace!("Ignoring OBJ statement '{}' on line {}", keyword, line_number),
        }
        Ok(())
    }

    fn parse_face(&mut self, line_number: usize, args: &[&str]) -> Result<(), ObjError> {
        if args.len() < 3 {
            return Err(parse_error(line_number, "face needs at least three vertices"));
        }

        let mut corners = Vec::with_capacity(args.len());
        for corner in args {
            let mut refs = corner.split('/');
            let position = refs
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| parse_error(line_number, "face vertex without position"))?;
            let position = resolve_index(line_number, position, self.positions.len())?;
            let tex_coord = match refs.next().filter(|s| !s.is_empty()) {
                Some(index) => Some(resolve_index(line_number, index, self.tex_coords.len())?),
                None => None,
            };
            let normal = match refs.next().filter(|s| !s.is_empty()) {
                Some(index) => Some(resolve_index(line_number, index, self.normals.len())?),
                None => None,
            };
            corners.push((position, tex_coord, normal));
        }

        // Flat normal from the first three corners for corners without one
        let a = Vec3::from(self.positions[corners[0].0]);
        let b = Vec3::from(self.positions[corners[1].0]);
        let c = Vec3::from(self.positions[corners[2].0]);
        let face_normal = (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y);

        let base = self.vertices.len() as u32;
        for (position, tex_coord, normal) in &corners {
            self.vertices.push(Vertex::new(
                self.positions[*position],
                normal.map_or(face_normal.into(), |i| self.normals[i]),
                tex_coord.map_or([0.0, 0.0], |i| self.tex_coords[i]),
            ));
        }
        for i in 1..(corners.len() as u32 - 1) {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
        Ok(())
    }

    fn close_group(&mut self) {
        let count = self.indices.len() - self.group_start;
        if count > 0 {
            self.submeshes.push(SubMesh {
                index_start: self.group_start,
                index_count: count,
            });
            self.material_names
                .push(self.current_material.clone().unwrap_or_else(|| "default".to_string()));
        }
        self.group_start = self.indices.len();
    }

    fn finish(mut self) -> Result<ObjModel, ObjError> {
        self.close_group();
        if self.indices.is_empty() {
            return Err(ObjError::InvalidFormat("No faces found in OBJ data".to_string()));
        }

        log::debug!(
            "Parsed OBJ: {} vertices, {} triangles, {} material groups",
            self.vertices.len(),
            self.indices.len() / 3,
            self.submeshes.len()
        );
        Ok(ObjModel {
            mesh: Mesh::new(self.vertices, self.indices).with_submeshes(self.submeshes),
            material_names: self.material_names,
        })
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::ParseError { line, message: message.into() }
}

fn parse_floats<const N: usize>(line: usize, what: &str, args: &[&str]) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(parse_error(line, format!("{} needs {} components", what, N)));
    }
    let mut values = [0.0; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg
            .parse()
            .map_err(|_| parse_error(line, format!("invalid {} component '{}'", what, arg)))?;
    }
    Ok(values)
}

/// Resolve a 1-based (or negative, relative) OBJ index into a 0-based one
fn resolve_index(line: usize, text: &str, len: usize) -> Result<usize, ObjError> {
    let raw: i64 = text
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{}'", text)))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => usize::try_from(r - 1).ok(),
        r => usize::try_from(r.unsigned_abs()).ok().and_then(|back| len.checked_sub(back)),
    };
    resolved
        .filter(|&index| index < len)
        .ok_or_else(|| parse_error(line, format!("index {} out of range (have {})", raw, len)))
}

/// Loads OBJ files into meshes
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return its mesh
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjError> {
        Ok(Self::load_model(path)?.mesh)
    }

    /// Load an OBJ file with its material group names
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ObjModel, ObjError> {
        let path = path.as_ref();
        log::info!("Loading OBJ model from {:?}", path);
        Self::parse(BufReader::new(File::open(path)?))
    }

    /// Parse OBJ text from any buffered reader
    pub fn parse<R: BufRead>(reader: R) -> Result<ObjModel, ObjError> {
        let mut parser = ObjParser::default();
        for (i, line) in reader.lines().enumerate() {
            parser.parse_line(i + 1, &line?)?;
        }
        parser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD: &str = "\
# unit quad facing +Z
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_fan_triangulated_with_face_normal() {
        let model = ObjLoader::parse(QUAD.as_bytes()).unwrap();

        assert_eq!(model.mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(model.material_names, vec!["default".to_string()]);
        assert_relative_eq!(model.mesh.vertices[0].normal_vec(), Vec3::z());
    }

    #[test]
    fn test_usemtl_splits_submeshes() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vt 0.5 0.5
usemtl bark
f 1/1/1 2/1/1 3/1/1
usemtl leaves
f -3 -2 -1
f 1 3 2
";
        let model = ObjLoader::parse(text.as_bytes()).unwrap();

        assert_eq!(model.material_names, vec!["bark".to_string(), "leaves".to_string()]);
        assert_eq!(
            model.mesh.submeshes,
            vec![
                SubMesh { index_start: 0, index_count: 3 },
                SubMesh { index_start: 3, index_count: 6 },
            ]
        );
        assert_eq!(model.mesh.vertices[0].tex_coord, [0.5, 0.5]);
        // Second leaves face winds the other way
        assert_relative_eq!(model.mesh.vertices[6].normal_vec(), -Vec3::z());
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let err = ObjLoader::parse("v 0 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ObjError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let err = ObjLoader::parse("v 0 zero 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ObjError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_file_without_faces_is_invalid() {
        let err = ObjLoader::parse("v 0 0 0\nv 1 0 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidFormat(_)));
    }
}
