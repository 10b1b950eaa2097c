use crate::mesh::TriMesh;
use crate::{sampler, ShapeParams};
use cgmath::{Vector3, Zero};
use rand::rngs::SmallRng;

/// Where the brain-state targets come from.
pub enum BrainSource {
  /// Strategy A, the analytic rejection-sampled shape.
  Analytic,
  /// Strategy B, area-weighted sampling of a surface asset.
  Surface(TriMesh),
}

/// Per-particle morph targets and phase offsets. Built once at startup,
/// immutable afterwards; every array holds exactly one entry per particle.
pub struct PositionTable {
  scatter: Vec<Vector3<f32>>,
  boxed: Vec<Vector3<f32>>,
  brain: Vec<Vector3<f32>>,
  phases: Vec<f32>,
}

impl PositionTable {
  /// Generate all target sets from one seeded RNG. A missing or unusable
  /// surface asset degrades to an all-zero brain set with a warning; the
  /// visualization keeps running (spec'd recoverable condition).
  pub fn generate(params: &ShapeParams, source: &BrainSource, rng: &mut SmallRng) -> Self {
    let n = params.num_particles;
    let scatter = sampler::scatter_targets(rng, n, params.scatter_extent);
    let boxed = sampler::box_targets(rng, n, params.box_extent);
    let brain = match source {
      BrainSource::Analytic => sampler::brain_targets_analytic(rng, params),
      BrainSource::Surface(mesh) => {
        sampler::brain_targets_surface(rng, params, mesh).unwrap_or_else(|| {
          log::warn!("surface asset has no usable triangles, brain targets zero-filled");
          vec![Vector3::zero(); n as usize]
        })
      }
    };
    let phases = sampler::phase_offsets(rng, n);
    Self {
      scatter,
      boxed,
      brain,
      phases,
    }
  }

  /// Zero-filled brain targets for when no asset could be loaded at all.
  pub fn generate_with_zero_brain(params: &ShapeParams, rng: &mut SmallRng) -> Self {
    let n = params.num_particles;
    Self {
      scatter: sampler::scatter_targets(rng, n, params.scatter_extent),
      boxed: sampler::box_targets(rng, n, params.box_extent),
      brain: vec![Vector3::zero(); n as usize],
      phases: sampler::phase_offsets(rng, n),
    }
  }

  pub fn len(&self) -> usize {
    self.phases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.phases.is_empty()
  }

  pub fn scatter(&self) -> &[Vector3<f32>] {
    &self.scatter
  }

  pub fn boxed(&self) -> &[Vector3<f32>] {
    &self.boxed
  }

  pub fn brain(&self) -> &[Vector3<f32>] {
    &self.brain
  }

  pub fn phases(&self) -> &[f32] {
    &self.phases
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;

  fn params(n: u32) -> ShapeParams {
    ShapeParams {
      num_particles: n,
      ..ShapeParams::default()
    }
  }

  #[test]
  fn all_arrays_match_the_particle_count() {
    let table = PositionTable::generate(
      &params(1234),
      &BrainSource::Analytic,
      &mut SmallRng::seed_from_u64(9),
    );
    assert_eq!(table.len(), 1234);
    assert_eq!(table.scatter().len(), 1234);
    assert_eq!(table.boxed().len(), 1234);
    assert_eq!(table.brain().len(), 1234);
    assert_eq!(table.phases().len(), 1234);
  }

  #[test]
  fn zero_brain_fallback_keeps_the_other_sets() {
    let table =
      PositionTable::generate_with_zero_brain(&params(64), &mut SmallRng::seed_from_u64(9));
    assert!(table.brain().iter().all(|p| *p == Vector3::zero()));
    assert!(table.scatter().iter().any(|p| *p != Vector3::zero()));
  }

  #[test]
  fn empty_surface_degrades_to_zero_brain() {
    let mesh = TriMesh {
      positions: vec![],
      triangles: vec![],
    };
    let table = PositionTable::generate(
      &params(32),
      &BrainSource::Surface(mesh),
      &mut SmallRng::seed_from_u64(9),
    );
    assert!(table.brain().iter().all(|p| *p == Vector3::zero()));
  }
}
