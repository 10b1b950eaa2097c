use crate::ScrollParams;

/// Spring-smoothed scroll progress in [0, 1].
///
/// Wheel and touchpad input move a clamped target; `advance` integrates a
/// damped spring toward it once per frame. The morph and transform layers
/// only ever read `value()`.
pub struct ScrollSmoother {
  params: ScrollParams,
  target: f32,
  value: f32,
  vel: f32,
}

impl ScrollSmoother {
  pub fn new(params: ScrollParams) -> Self {
    Self {
      params,
      target: 0.0,
      value: 0.0,
      vel: 0.0,
    }
  }

  /// Wheel input in lines (one notch = one line).
  pub fn push_lines(&mut self, lines: f32) {
    self.set_target(self.target + lines * self.params.line_step);
  }

  /// Touchpad input in pixels.
  pub fn push_pixels(&mut self, pixels: f32) {
    self.push_lines(pixels / 40.0);
  }

  pub fn set_target(&mut self, target: f32) {
    self.target = target.clamp(0.0, 1.0);
  }

  /// One frame of spring integration. The published value may transiently
  /// overshoot the target but is bounded to [0, 1] at the source.
  pub fn advance(&mut self, dt: f32) {
    let accel = self.params.stiffness * (self.target - self.value) - self.params.damping * self.vel;
    self.vel += accel * dt;
    self.value = (self.value + self.vel * dt).clamp(0.0, 1.0);
  }

  pub fn value(&self) -> f32 {
    self.value
  }

  pub fn target(&self) -> f32 {
    self.target
  }
}
