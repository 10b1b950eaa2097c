use crate::drag::DragController;
use cgmath::{Matrix4, Rad};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Slow idle spin around the vertical axis, radians per second.
const IDLE_SPIN: f32 = 0.05;

/// Solid faces and the wireframe overlay derive their own opacity from the
/// same computed value.
pub const SOLID_OPACITY: f32 = 0.95;
pub const WIRE_OPACITY: f32 = 0.3;

/// Shared assembly orientation: idle spin plus a full scroll-driven turn and
/// a quarter tilt, with the drag offset on top. Both rendered objects go
/// through here so they can never desynchronize.
pub fn assembly_rotation(s: f32, time: f32, drag: &DragController) -> (f32, f32) {
  let s = s.clamp(0.0, 1.0);
  let yaw = IDLE_SPIN * time + s * TAU + drag.yaw();
  let pitch = s * FRAC_PI_2 + drag.pitch();
  (yaw, pitch)
}

pub fn model_matrix(yaw: f32, pitch: f32, scale: f32) -> Matrix4<f32> {
  Matrix4::from_angle_y(Rad(yaw)) * Matrix4::from_angle_x(Rad(pitch)) * Matrix4::from_scale(scale)
}

fn ramp(s: f32, from: f32, to: f32) -> f32 {
  ((s - from) / (to - from)).clamp(0.0, 1.0)
}

/// Box visibility window: fade in over (0.1, 0.3], hold to 0.4, fade back
/// out by 0.5. Piecewise linear, continuous, exactly 0 at both ends of the
/// scroll range.
pub fn box_opacity(s: f32) -> f32 {
  if s <= 0.4 {
    ramp(s, 0.1, 0.3)
  } else {
    1.0 - ramp(s, 0.4, 0.5)
  }
}

/// The box expands to 1.8x while it breaks apart and fades over (0.4, 0.5].
pub fn box_scale(s: f32) -> f32 {
  1.0 + 0.8 * ramp(s, 0.4, 0.5)
}

/// Fully transparent geometry is skipped outright; an invisible transparent
/// mesh would still fight the particles for blend order.
pub fn box_visible(opacity: f32) -> bool {
  opacity > 0.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::DragParams;

  #[test]
  fn opacity_is_zero_at_both_ends_and_one_on_the_plateau() {
    assert_eq!(box_opacity(0.0), 0.0);
    assert_eq!(box_opacity(0.1), 0.0);
    assert_eq!(box_opacity(0.3), 1.0);
    assert_eq!(box_opacity(0.35), 1.0);
    assert_eq!(box_opacity(0.4), 1.0);
    assert_eq!(box_opacity(0.5), 0.0);
    assert_eq!(box_opacity(1.0), 0.0);
    assert!((box_opacity(0.2) - 0.5).abs() < 1e-6);
    assert!((box_opacity(0.45) - 0.5).abs() < 1e-6);
  }

  #[test]
  fn opacity_is_continuous() {
    let mut last = box_opacity(0.0);
    for i in 1..=1000 {
      let v = box_opacity(i as f32 / 1000.0);
      assert!((v - last).abs() < 0.02, "jump near s={}", i as f32 / 1000.0);
      last = v;
    }
  }

  #[test]
  fn scale_ramps_only_while_breaking_apart() {
    assert_eq!(box_scale(0.0), 1.0);
    assert_eq!(box_scale(0.4), 1.0);
    assert!((box_scale(0.45) - 1.4).abs() < 1e-6);
    assert!((box_scale(0.5) - 1.8).abs() < 1e-6);
    assert!((box_scale(1.0) - 1.8).abs() < 1e-6);
  }

  #[test]
  fn hidden_exactly_at_zero_opacity() {
    assert!(!box_visible(0.0));
    assert!(box_visible(0.001));
  }

  #[test]
  fn both_objects_share_one_rotation() {
    let mut drag = DragController::new(DragParams::default());
    drag.pointer_down(0.0, 0.0);
    drag.pointer_move(30.0, -12.0);
    let a = assembly_rotation(0.42, 3.0, &drag);
    let b = assembly_rotation(0.42, 3.0, &drag);
    assert_eq!(a, b);
    // scroll drives a full turn and a quarter tilt across its range
    let drag = DragController::new(DragParams::default());
    let (yaw0, pitch0) = assembly_rotation(0.0, 0.0, &drag);
    let (yaw1, pitch1) = assembly_rotation(1.0, 0.0, &drag);
    assert_eq!(yaw0, 0.0);
    assert_eq!(pitch0, 0.0);
    assert!((yaw1 - TAU).abs() < 1e-6);
    assert!((pitch1 - FRAC_PI_2).abs() < 1e-6);
  }
}
