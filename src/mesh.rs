use anyhow::{bail, Context};
use cgmath::{InnerSpace, Vector3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A triangulated surface used as the Strategy B sampling source.
#[derive(Clone, Debug)]
pub struct TriMesh {
  pub positions: Vec<Vector3<f32>>,
  pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
  pub fn triangle_area(&self, [a, b, c]: [u32; 3]) -> f32 {
    let a = self.positions[a as usize];
    let b = self.positions[b as usize];
    let c = self.positions[c as usize];
    (b - a).cross(c - a).magnitude() * 0.5
  }

  /// Recenter on the bounding-box midpoint and scale the largest half-extent
  /// to 1 so downstream per-axis multipliers mean the same thing for every
  /// asset.
  pub fn normalize(&mut self) {
    if self.positions.is_empty() {
      return;
    }
    let mut lo = self.positions[0];
    let mut hi = self.positions[0];
    for p in &self.positions {
      lo = Vector3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z));
      hi = Vector3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z));
    }
    let center = (lo + hi) * 0.5;
    let half = (hi - lo) * 0.5;
    let extent = half.x.max(half.y).max(half.z);
    let scale = if extent > 0.0 { 1.0 / extent } else { 1.0 };
    for p in &mut self.positions {
      *p = (*p - center) * scale;
    }
  }
}

/// Minimal OBJ reader: `v` positions and `f` faces, fan-triangulated.
/// Enough for static surface assets; materials, normals and UVs are ignored.
pub fn parse_obj(reader: impl BufRead) -> anyhow::Result<TriMesh> {
  let mut positions = Vec::new();
  let mut triangles = Vec::new();
  for (lineno, line) in reader.lines().enumerate() {
    let line = line.context("reading OBJ line")?;
    let mut tokens = line.split_whitespace();
    match tokens.next() {
      Some("v") => {
        let mut coord = || -> anyhow::Result<f32> {
          tokens
            .next()
            .with_context(|| format!("line {}: short vertex", lineno + 1))?
            .parse::<f32>()
            .with_context(|| format!("line {}: bad vertex coordinate", lineno + 1))
        };
        positions.push(Vector3::new(coord()?, coord()?, coord()?));
      }
      Some("f") => {
        let mut face = Vec::new();
        for tok in tokens {
          // "idx", "idx/uv" and "idx/uv/n" all start with the position index
          let idx: i64 = tok
            .split('/')
            .next()
            .unwrap_or("")
            .parse()
            .with_context(|| format!("line {}: bad face index", lineno + 1))?;
          let idx = if idx < 0 {
            positions.len() as i64 + idx
          } else {
            idx - 1
          };
          if idx < 0 || idx as usize >= positions.len() {
            bail!("line {}: face index out of range", lineno + 1);
          }
          face.push(idx as u32);
        }
        if face.len() < 3 {
          bail!("line {}: face with fewer than 3 vertices", lineno + 1);
        }
        for i in 1..face.len() - 1 {
          triangles.push([face[0], face[i], face[i + 1]]);
        }
      }
      _ => {}
    }
  }
  if triangles.is_empty() {
    bail!("OBJ contained no faces");
  }
  Ok(TriMesh {
    positions,
    triangles,
  })
}

pub fn load_obj(path: &Path) -> anyhow::Result<TriMesh> {
  let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
  parse_obj(BufReader::new(file))
}
