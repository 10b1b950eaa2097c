use crate::mesh::TriMesh;
use crate::ShapeParams;
use cgmath::{InnerSpace, Vector3};
use rand::{rngs::SmallRng, Rng};
use rand_distr::weighted_alias::WeightedAliasIndex;
use rand_distr::Distribution;
use std::f32::consts::PI;

/// Uniform scatter in a large cube, the idle "free floating" look.
pub fn scatter_targets(rng: &mut SmallRng, n: u32, extent: f32) -> Vec<Vector3<f32>> {
  (0..n)
    .map(|_| {
      Vector3::new(
        (rng.gen::<f32>() * 2.0 - 1.0) * extent,
        (rng.gen::<f32>() * 2.0 - 1.0) * extent,
        (rng.gen::<f32>() * 2.0 - 1.0) * extent,
      )
    })
    .collect()
}

/// Uniform fill of the boxed state, a smaller cube.
pub fn box_targets(rng: &mut SmallRng, n: u32, extent: f32) -> Vec<Vector3<f32>> {
  scatter_targets(rng, n, extent)
}

/// Per-particle phase offsets in [0, 2*pi), used by the drift and pulse terms.
pub fn phase_offsets(rng: &mut SmallRng, n: u32) -> Vec<f32> {
  (0..n).map(|_| rng.gen::<f32>() * 2.0 * PI).collect()
}

// Periodic valleys standing in for cortical folds.
fn fold_noise(p: Vector3<f32>) -> f32 {
  (12.0 * p.x + (12.0 * p.y).cos()).sin()
    * (12.0 * p.y + (12.0 * p.z).sin()).cos()
    * (12.0 * p.z + (12.0 * p.x).cos()).sin()
}

/// Shape predicate for one unscaled candidate in [-1,1]^3. Probabilistic
/// stages draw from `rng`, so a rejected candidate must be redrawn, not
/// retested.
fn accept_brain(p: Vector3<f32>, rng: &mut SmallRng) -> bool {
  // anisotropic ellipsoid silhouette: long in x, narrow in z
  if p.x * p.x + 1.4 * p.y * p.y + 1.2 * p.z * p.z > 1.0 {
    return false;
  }
  // flatten the bottom-front, fading out toward y = -0.4
  if p.y < -0.2 && p.x > -0.2 {
    if p.y < -0.4 {
      return false;
    }
    if rng.gen::<f32>() > (p.y + 0.4) * 5.0 {
      return false;
    }
  }
  // thin a shell around the cerebellum to suggest separation
  if p.y < -0.2 && p.x < -0.2 {
    let d = (p - Vector3::new(-0.5, -0.5, 0.0)).magnitude();
    if d > 0.4 && d < 0.5 && rng.gen::<f32>() < 0.9 {
      return false;
    }
  }
  if fold_noise(p) > 0.25 {
    return false;
  }
  // longitudinal fissure: hard gap at the midline, soft-edged to 0.08
  let f = p.z.abs();
  if f < 0.04 {
    return false;
  }
  if f < 0.08 && rng.gen::<f32>() > (f - 0.04) * 25.0 {
    return false;
  }
  true
}

// Exhaustion fallback: a point on the bare ellipsoid surface, no folds,
// still clear of the midline gap.
fn ellipsoid_fallback(rng: &mut SmallRng) -> Vector3<f32> {
  for _ in 0..32 {
    let dir = Vector3::new(
      rng.gen::<f32>() * 2.0 - 1.0,
      rng.gen::<f32>() * 2.0 - 1.0,
      rng.gen::<f32>() * 2.0 - 1.0,
    );
    let q = dir.x * dir.x + 1.4 * dir.y * dir.y + 1.2 * dir.z * dir.z;
    if q < 1e-6 {
      continue;
    }
    let p = dir / q.sqrt();
    if p.z.abs() >= 0.04 {
      return p;
    }
  }
  Vector3::new(0.0, 0.3, 0.5) / (1.4f32 * 0.09 + 1.2 * 0.25).sqrt()
}

fn apply_scale(p: Vector3<f32>, scale: [f32; 3]) -> Vector3<f32> {
  Vector3::new(p.x * scale[0], p.y * scale[1], p.z * scale[2])
}

/// Strategy A: constrained rejection sampling of the analytic brain shape.
/// Retries are bounded per point; exhausted points land on the plain
/// ellipsoid surface instead of looping forever.
pub fn brain_targets_analytic(rng: &mut SmallRng, params: &ShapeParams) -> Vec<Vector3<f32>> {
  let mut out = Vec::with_capacity(params.num_particles as usize);
  let mut fallbacks = 0u32;
  for _ in 0..params.num_particles {
    let mut accepted = None;
    for _ in 0..params.max_rejects {
      let p = Vector3::new(
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
      );
      if accept_brain(p, rng) {
        accepted = Some(p);
        break;
      }
    }
    let p = accepted.unwrap_or_else(|| {
      fallbacks += 1;
      ellipsoid_fallback(rng)
    });
    out.push(apply_scale(p, params.brain_scale));
  }
  if fallbacks > 0 {
    log::warn!("brain sampling exhausted retries for {fallbacks} points, used ellipsoid fallback");
  }
  out
}

/// Area-weighted sampling of a triangulated surface: pick a triangle with
/// probability proportional to its area, then a uniform barycentric point.
pub fn sample_surface(mesh: &TriMesh, n: u32, rng: &mut SmallRng) -> Option<Vec<Vector3<f32>>> {
  if mesh.triangles.is_empty() {
    return None;
  }
  let areas: Vec<f32> = mesh.triangles.iter().map(|t| mesh.triangle_area(*t)).collect();
  let by_area = WeightedAliasIndex::new(areas).ok()?;
  let mut out = Vec::with_capacity(n as usize);
  for _ in 0..n {
    let [a, b, c] = mesh.triangles[by_area.sample(rng)];
    let (a, b, c) = (
      mesh.positions[a as usize],
      mesh.positions[b as usize],
      mesh.positions[c as usize],
    );
    let mut u = rng.gen::<f32>();
    let mut v = rng.gen::<f32>();
    if u + v > 1.0 {
      u = 1.0 - u;
      v = 1.0 - v;
    }
    out.push(a + (b - a) * u + (c - a) * v);
  }
  Some(out)
}

/// Strategy B: sample an external surface asset. The mesh is recentered and
/// scaled to unit half-extent first so the same per-axis multipliers apply.
pub fn brain_targets_surface(
  rng: &mut SmallRng,
  params: &ShapeParams,
  mesh: &TriMesh,
) -> Option<Vec<Vector3<f32>>> {
  let mut mesh = mesh.clone();
  mesh.normalize();
  let points = sample_surface(&mesh, params.num_particles, rng)?;
  Some(points.into_iter().map(|p| apply_scale(p, params.brain_scale)).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;

  fn rng() -> SmallRng {
    SmallRng::seed_from_u64(7)
  }

  fn draw_accepted(rng: &mut SmallRng) -> Vector3<f32> {
    loop {
      let p = Vector3::new(
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
      );
      if accept_brain(p, rng) {
        return p;
      }
    }
  }

  #[test]
  fn accepted_points_satisfy_hard_predicates() {
    let mut rng = rng();
    for _ in 0..2000 {
      let p = draw_accepted(&mut rng);
      assert!(p.x * p.x + 1.4 * p.y * p.y + 1.2 * p.z * p.z <= 1.0);
      assert!(p.z.abs() >= 0.04, "midline fissure violated: {:?}", p);
      assert!(
        !(p.y < -0.4 && p.x > -0.2),
        "flattened region violated: {:?}",
        p
      );
      assert!(fold_noise(p) <= 0.25);
    }
  }

  #[test]
  fn cerebellum_shell_is_thinned() {
    let mut rng = rng();
    let center = Vector3::new(-0.5f32, -0.5, 0.0);
    let mut shell = 0u32;
    let mut inner = 0u32;
    let mut drawn = 0u32;
    // compare density in the rejected shell (0.4, 0.5) against the band
    // just inside it; a 0.9 rejection rate leaves the shell far sparser
    // even though it encloses more volume
    while drawn < 40_000 {
      let p = draw_accepted(&mut rng);
      drawn += 1;
      if p.y < -0.2 && p.x < -0.2 {
        let d = (p - center).magnitude();
        if d > 0.4 && d < 0.5 {
          shell += 1;
        } else if d > 0.3 && d <= 0.4 {
          inner += 1;
        }
      }
    }
    assert!(inner > 50, "not enough samples in the comparison band");
    assert!(
      (shell as f32) < (inner as f32) * 0.5,
      "shell {shell} not thinned vs inner band {inner}"
    );
  }

  #[test]
  fn table_invariants_hold_after_scaling() {
    let params = ShapeParams {
      num_particles: 3000,
      ..ShapeParams::default()
    };
    let brain = brain_targets_analytic(&mut rng(), &params);
    assert_eq!(brain.len(), 3000);
    let [sx, sy, sz] = params.brain_scale;
    for p in &brain {
      let (x, y, z) = (p.x / sx, p.y / sy, p.z / sz);
      assert!(x * x + 1.4 * y * y + 1.2 * z * z <= 1.0 + 1e-4);
      assert!(z.abs() >= 0.04 - 1e-6);
    }
  }

  #[test]
  fn sampling_is_reproducible_for_a_seed() {
    let params = ShapeParams {
      num_particles: 500,
      ..ShapeParams::default()
    };
    let a = brain_targets_analytic(&mut SmallRng::seed_from_u64(42), &params);
    let b = brain_targets_analytic(&mut SmallRng::seed_from_u64(42), &params);
    assert_eq!(a, b);
    let c = scatter_targets(&mut SmallRng::seed_from_u64(1), 100, 8.0);
    let d = scatter_targets(&mut SmallRng::seed_from_u64(1), 100, 8.0);
    assert_eq!(c, d);
  }

  #[test]
  fn box_targets_stay_in_bounds() {
    let pts = box_targets(&mut rng(), 2000, 2.55);
    for p in pts {
      assert!(p.x.abs() <= 2.55 && p.y.abs() <= 2.55 && p.z.abs() <= 2.55);
    }
  }

  #[test]
  fn phases_cover_the_unit_circle() {
    let phases = phase_offsets(&mut rng(), 2000);
    assert!(phases.iter().all(|p| (0.0..2.0 * PI).contains(p)));
    assert!(phases.iter().any(|p| *p > 5.0));
    assert!(phases.iter().any(|p| *p < 1.0));
  }

  #[test]
  fn surface_samples_lie_on_the_triangle() {
    let mesh = TriMesh {
      positions: vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
      ],
      triangles: vec![[0, 1, 2]],
    };
    let pts = sample_surface(&mesh, 500, &mut rng()).unwrap();
    for p in pts {
      assert_eq!(p.z, 0.0);
      assert!(p.x >= 0.0 && p.y >= 0.0);
      assert!(p.x / 2.0 + p.y / 2.0 <= 1.0 + 1e-6);
    }
  }

  #[test]
  fn empty_mesh_yields_none() {
    let mesh = TriMesh {
      positions: vec![],
      triangles: vec![],
    };
    assert!(sample_surface(&mesh, 10, &mut rng()).is_none());
  }
}
