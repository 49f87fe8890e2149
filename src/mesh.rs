/*
 * Mesh Module
 *
 * Triangle meshes used by the renderer: a procedural lat/long sphere for
 * the boids and the fallback dome, a small Wavefront OBJ reader for
 * scenery assets, and the library that hands out mesh handles. The
 * simulation only ever sees a handle plus an index count.
 */

use glam::Vec3;
use std::f32::consts::PI;
use std::path::Path;

use crate::error::AssetError;

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// One unit normal per position, or empty when the source had none.
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Per-corner normals of a triangle, when the mesh carries them.
    pub fn corner_normals(&self, triangle: [usize; 3]) -> Option<[Vec3; 3]> {
        if self.normals.len() != self.positions.len() {
            return None;
        }
        Some(triangle.map(|i| self.normals[i]))
    }

    /// Sphere centred on the origin, `lat` slices around Y and `long`
    /// stacks from pole to pole. Draws `lat * long * 6` vertices.
    pub fn sphere(name: &str, radius: f32, lat: u32, long: u32) -> Self {
        let lat = lat.max(3);
        let long = long.max(2);
        let d_phi = 2.0 * PI / lat as f32;
        let d_theta = PI / long as f32;

        let mut positions = Vec::with_capacity(((lat + 1) * (long + 1)) as usize);
        let mut normals = Vec::with_capacity(positions.capacity());

        for j in 0..=long {
            let theta = -PI / 2.0 + j as f32 * d_theta;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for i in 0..=lat {
                let phi = i as f32 * d_phi;
                let normal = Vec3::new(phi.sin() * cos_theta, sin_theta, phi.cos() * cos_theta);
                normals.push(normal);
                positions.push(normal * radius);
            }
        }

        let mut indices = Vec::with_capacity((lat * long * 6) as usize);
        for j in 0..long {
            let row = j * (lat + 1);
            let next = row + lat + 1;
            for i in 0..lat {
                indices.extend_from_slice(&[row + i, row + i + 1, next + i + 1]);
                indices.extend_from_slice(&[row + i, next + i + 1, next + i]);
            }
        }

        Self {
            name: name.to_string(),
            positions,
            normals,
            indices,
        }
    }

    /// Largest sphere (twice as many slices as stacks) whose vertex count
    /// fits the budget.
    pub fn sphere_for_budget(name: &str, radius: f32, vertex_budget: usize) -> Self {
        let long = ((vertex_budget as f32 / 12.0).sqrt().floor() as u32).max(2);
        Self::sphere(name, radius, long * 2, long)
    }

    pub fn load_obj(path: &Path) -> Result<Self, AssetError> {
        let source = std::fs::read_to_string(path).map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());
        parse_obj(&name, &source)
    }
}

/// Reads `v`, `vn` and `f` records. Faces with more than three corners are
/// fan-triangulated. Normals referenced by faces are averaged onto the
/// positions they are attached to; texture coordinates and other records
/// are ignored.
pub fn parse_obj(name: &str, source: &str) -> Result<Mesh, AssetError> {
    let mut positions = Vec::new();
    let mut file_normals = Vec::new();
    let mut normal_sums: Vec<Vec3> = Vec::new();
    let mut indices = Vec::new();

    for (line_index, raw) in source.lines().enumerate() {
        let line = line_index + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(Vec3::from_array(parse_floats::<3>(line, tokens)?)),
            Some("vn") => file_normals.push(Vec3::from_array(parse_floats::<3>(line, tokens)?)),
            Some("f") => {
                let corners = tokens
                    .map(|t| parse_face_corner(line, t, positions.len(), file_normals.len()))
                    .collect::<Result<Vec<FaceCorner>, _>>()?;
                if corners.len() < 3 {
                    return Err(AssetError::Parse {
                        line,
                        reason: format!("face has {} corners", corners.len()),
                    });
                }
                for corner in &corners {
                    if let Some(normal) = corner.normal {
                        normal_sums.resize(positions.len(), Vec3::ZERO);
                        normal_sums[corner.position as usize] += file_normals[normal];
                    }
                }
                for k in 1..corners.len() - 1 {
                    indices.extend_from_slice(&[
                        corners[0].position,
                        corners[k].position,
                        corners[k + 1].position,
                    ]);
                }
            }
            _ => {}
        }
    }

    if indices.is_empty() {
        return Err(AssetError::Empty(name.to_string()));
    }

    let normals = if normal_sums.is_empty() {
        Vec::new()
    } else {
        normal_sums.resize(positions.len(), Vec3::ZERO);
        normal_sums.iter().map(|n| n.normalize_or_zero()).collect()
    };

    Ok(Mesh {
        name: name.to_string(),
        positions,
        normals,
        indices,
    })
}

fn parse_floats<'a, const N: usize>(
    line: usize,
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<[f32; N], AssetError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = tokens.next().ok_or_else(|| AssetError::Parse {
            line,
            reason: format!("expected {} numbers", N),
        })?;
        *slot = token.parse().map_err(|_| AssetError::Parse {
            line,
            reason: format!("'{token}' is not a number"),
        })?;
    }
    Ok(out)
}

struct FaceCorner {
    position: u32,
    normal: Option<usize>,
}

// "7", "7/2", "7//3" or "7/2/3"
fn parse_face_corner(
    line: usize,
    token: &str,
    vertex_count: usize,
    normal_count: usize,
) -> Result<FaceCorner, AssetError> {
    let mut parts = token.split('/');
    let position = resolve_index(line, token, parts.next().unwrap_or_default(), vertex_count)?;
    let normal = match parts.nth(1) {
        Some(part) if !part.is_empty() => Some(resolve_index(line, token, part, normal_count)?),
        _ => None,
    };
    Ok(FaceCorner {
        position: position as u32,
        normal,
    })
}

// 1-based, or negative to count back from the last element
fn resolve_index(line: usize, token: &str, part: &str, count: usize) -> Result<usize, AssetError> {
    let index: i64 = part.parse().map_err(|_| AssetError::Parse {
        line,
        reason: format!("'{token}' is not a face index"),
    })?;

    let resolved = if index < 0 {
        count as i64 + index
    } else {
        index - 1
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(AssetError::IndexOutOfRange {
            line,
            index: index.unsigned_abs() as usize,
            count,
        });
    }
    Ok(resolved as usize)
}

/// Opaque reference to a mesh in a [`MeshLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub usize);

/// What a drawable needs to know about its mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRef {
    pub handle: MeshHandle,
    pub vertex_count: usize,
}

#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh under a fresh handle. Names are labels only; two meshes
    /// with the same name get distinct handles.
    pub fn register(&mut self, mesh: Mesh) -> MeshRef {
        let vertex_count = mesh.vertex_count();
        self.meshes.push(mesh);
        MeshRef {
            handle: MeshHandle(self.meshes.len() - 1),
            vertex_count,
        }
    }

    /// Swap the mesh behind an existing handle. None if the handle is unknown.
    pub fn replace(&mut self, handle: MeshHandle, mesh: Mesh) -> Option<MeshRef> {
        let slot = self.meshes.get_mut(handle.0)?;
        let vertex_count = mesh.vertex_count();
        *slot = mesh;
        Some(MeshRef {
            handle,
            vertex_count,
        })
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
