use crate::targets::PositionTable;
use crate::ParticleInstance;
use cgmath::Vector3;

// Three-act sequence: scatter until s=0.1, boxed by s=0.3, brain by s=0.7.
const BOX_IN: (f32, f32) = (0.1, 0.3);
const BRAIN_IN: (f32, f32) = (0.5, 0.7);
// The whole 3-D system fades in over this range while the 2-D ambient
// background fades out; both sides must keep using the same numbers.
const INTRO_FADE: (f32, f32) = (0.05, 0.15);

const SIZE_SCATTER: f32 = 20.0;
const SIZE_BOXED: f32 = 10.0;
const SIZE_BRAIN: f32 = 15.0;
const PULSE_SIZE: f32 = 4.0;

const ALPHA_SCATTER: f32 = 0.4;
const ALPHA_BOXED: f32 = 0.8;
const ALPHA_BRAIN: f32 = 0.6;

const DRIFT_AMP: f32 = 0.3;

/// Cubic Hermite ease: 0 at or below `a`, 1 at or above `b`, zero slope at
/// both ends.
pub fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
  let t = ((x - a) / (b - a)).clamp(0.0, 1.0);
  t * t * (3.0 - 2.0 * t)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
  a + (b - a) * t
}

fn lerp_v3(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
  a + (b - a) * t
}

/// Blend weights for one scroll-progress value. `brain_w` is applied after
/// `box_w` (nested, not normalized), so at brain_w = 1 the box contribution
/// is fully overridden.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Blend {
  pub box_w: f32,
  pub brain_w: f32,
}

pub fn blend_weights(s: f32) -> Blend {
  Blend {
    box_w: smoothstep(BOX_IN.0, BOX_IN.1, s),
    brain_w: smoothstep(BRAIN_IN.0, BRAIN_IN.1, s),
  }
}

/// Morphed target position for particle `i`, before the drift offset.
pub fn blend_position(table: &PositionTable, i: usize, blend: Blend) -> Vector3<f32> {
  let pos = lerp_v3(table.scatter()[i], table.boxed()[i], blend.box_w);
  lerp_v3(pos, table.brain()[i], blend.brain_w)
}

/// Idle wander in x/y, attenuated as particles get boxed so the cube reads
/// as rigid.
pub fn drift(time: f32, phase: f32, blend: Blend) -> (f32, f32) {
  let amp = DRIFT_AMP * (1.0 - 0.9 * blend.box_w);
  (
    (time * 0.8 + phase).sin() * amp,
    (time * 0.6 + phase).cos() * amp,
  )
}

/// Shared pulse term in [-1, 1]; feeds both point size and opacity.
pub fn pulse(time: f32, phase: f32) -> f32 {
  (time * 3.0 + phase).sin()
}

pub fn point_size(blend: Blend, pulse: f32) -> f32 {
  lerp(lerp(SIZE_SCATTER, SIZE_BOXED, blend.box_w), SIZE_BRAIN, blend.brain_w)
    + pulse * PULSE_SIZE
}

pub fn intro_fade(s: f32) -> f32 {
  smoothstep(INTRO_FADE.0, INTRO_FADE.1, s)
}

pub fn alpha(blend: Blend, s: f32, pulse: f32) -> f32 {
  lerp(lerp(ALPHA_SCATTER, ALPHA_BOXED, blend.box_w), ALPHA_BRAIN, blend.brain_w)
    * intro_fade(s)
    * (0.75 + 0.25 * pulse)
}

/// One frame of the morph: rewrite every instance from scroll progress `s`
/// and elapsed `time`. `out` is resized to the table on first use.
pub fn update_instances(table: &PositionTable, s: f32, time: f32, out: &mut Vec<ParticleInstance>) {
  let s = s.clamp(0.0, 1.0);
  let blend = blend_weights(s);
  out.resize(table.len(), ParticleInstance::default());
  for (i, inst) in out.iter_mut().enumerate() {
    let phase = table.phases()[i];
    let mut pos = blend_position(table, i, blend);
    let (dx, dy) = drift(time, phase, blend);
    pos.x += dx;
    pos.y += dy;
    let pulse = pulse(time, phase);
    *inst = ParticleInstance {
      pos: pos.into(),
      size: point_size(blend, pulse),
      alpha: alpha(blend, s, pulse),
    };
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::targets::{BrainSource, PositionTable};
  use crate::ShapeParams;
  use cgmath::InnerSpace;
  use rand::{rngs::SmallRng, SeedableRng};

  fn table() -> PositionTable {
    let params = ShapeParams {
      num_particles: 200,
      ..ShapeParams::default()
    };
    PositionTable::generate(&params, &BrainSource::Analytic, &mut SmallRng::seed_from_u64(3))
  }

  #[test]
  fn smoothstep_endpoints_are_exact() {
    assert_eq!(smoothstep(0.1, 0.3, 0.0), 0.0);
    assert_eq!(smoothstep(0.1, 0.3, 0.1), 0.0);
    assert_eq!(smoothstep(0.1, 0.3, 0.3), 1.0);
    assert_eq!(smoothstep(0.1, 0.3, 1.0), 1.0);
    assert!((smoothstep(0.1, 0.3, 0.2) - 0.5).abs() < 1e-6);
  }

  #[test]
  fn smoothstep_is_monotonic() {
    let mut last = 0.0;
    for i in 0..=100 {
      let v = smoothstep(0.2, 0.8, i as f32 / 100.0);
      assert!(v >= last);
      last = v;
    }
  }

  #[test]
  fn at_rest_position_is_the_scatter_target() {
    let t = table();
    let blend = blend_weights(0.0);
    assert_eq!(blend, Blend { box_w: 0.0, brain_w: 0.0 });
    for i in 0..t.len() {
      assert_eq!(blend_position(&t, i, blend), t.scatter()[i]);
    }
    // intro fade keeps everything invisible at s = 0
    assert_eq!(alpha(blend, 0.0, 1.0), 0.0);
    assert_eq!(alpha(blend, 0.0, -1.0), 0.0);
  }

  #[test]
  fn fully_boxed_at_point_three() {
    let t = table();
    let blend = blend_weights(0.3);
    assert_eq!(blend.box_w, 1.0);
    assert_eq!(blend.brain_w, 0.0);
    for i in 0..t.len() {
      assert!((blend_position(&t, i, blend) - t.boxed()[i]).magnitude() < 1e-4);
    }
  }

  #[test]
  fn brain_overrides_box_at_point_seven() {
    let t = table();
    let blend = blend_weights(0.7);
    assert_eq!(blend.brain_w, 1.0);
    for i in 0..t.len() {
      let p = blend_position(&t, i, blend);
      assert!((p - t.brain()[i]).magnitude() < 1e-4);
    }
    // box weight is irrelevant once the brain weight saturates
    let forced = Blend { box_w: 0.123, brain_w: 1.0 };
    let p = blend_position(&t, 0, forced);
    assert!((p - t.brain()[0]).magnitude() < 1e-4);
  }

  #[test]
  fn drift_attenuates_while_boxing() {
    let free = blend_weights(0.0);
    let boxed = blend_weights(0.3);
    let (fx, fy) = drift(1.7, 0.9, free);
    let (bx, by) = drift(1.7, 0.9, boxed);
    assert!((bx.abs() - fx.abs() * 0.1).abs() < 1e-6);
    assert!((by.abs() - fy.abs() * 0.1).abs() < 1e-6);
  }

  #[test]
  fn sizes_and_alphas_track_the_acts() {
    let scatter = blend_weights(0.0);
    let boxed = blend_weights(0.3);
    let brain = blend_weights(0.7);
    assert_eq!(point_size(scatter, 0.0), 20.0);
    assert_eq!(point_size(boxed, 0.0), 10.0);
    assert_eq!(point_size(brain, 0.0), 15.0);
    assert_eq!(point_size(brain, 1.0), 19.0);
    // past the intro fade the act alphas come through directly
    assert!((alpha(scatter, 0.2, 0.0) - 0.4 * 0.75).abs() < 1e-6);
    assert!((alpha(boxed, 0.3, 0.0) - 0.8 * 0.75).abs() < 1e-6);
    assert!((alpha(brain, 0.7, 0.0) - 0.6 * 0.75).abs() < 1e-6);
  }

  #[test]
  fn update_fills_every_instance() {
    let t = table();
    let mut out = Vec::new();
    update_instances(&t, 0.55, 2.0, &mut out);
    assert_eq!(out.len(), t.len());
    assert!(out.iter().all(|i| i.alpha > 0.0 && i.size > 0.0));
    // out-of-range scroll is clamped at the source
    update_instances(&t, 1.7, 2.0, &mut out);
    let clamped = out[0];
    update_instances(&t, 1.0, 2.0, &mut out);
    assert_eq!(clamped.pos, out[0].pos);
  }
}
