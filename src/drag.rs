use crate::DragParams;

/// Pointer-drag orientation offset with inertial coasting.
///
/// One instance is shared by every rotating object. Pointer handlers write
/// drag deltas; exactly one per-frame call site advances the inertia via
/// [`DragController::tick_inertia`]. Everything else only reads
/// [`yaw`](DragController::yaw) / [`pitch`](DragController::pitch) — a second
/// integrator would double the decay rate and desynchronize the objects.
pub struct DragController {
  params: DragParams,
  yaw: f32,
  pitch: f32,
  vel_yaw: f32,
  vel_pitch: f32,
  dragging: bool,
  last: Option<(f32, f32)>,
}

impl DragController {
  pub fn new(params: DragParams) -> Self {
    Self {
      params,
      yaw: 0.0,
      pitch: 0.0,
      vel_yaw: 0.0,
      vel_pitch: 0.0,
      dragging: false,
      last: None,
    }
  }

  pub fn pointer_down(&mut self, x: f32, y: f32) {
    self.dragging = true;
    self.last = Some((x, y));
  }

  /// Dragging: velocity tracks the latest per-event delta and the angles
  /// accumulate immediately, so the assembly sticks to the pointer.
  pub fn pointer_move(&mut self, x: f32, y: f32) {
    if !self.dragging {
      return;
    }
    if let Some((lx, ly)) = self.last {
      self.vel_yaw = (x - lx) * self.params.sensitivity;
      self.vel_pitch = (y - ly) * self.params.sensitivity;
      self.yaw += self.vel_yaw;
      self.pitch = self.clamp_pitch(self.pitch + self.vel_pitch);
    }
    self.last = Some((x, y));
  }

  /// Release from anywhere ends the drag; the last velocities keep coasting.
  pub fn pointer_up(&mut self) {
    self.dragging = false;
    self.last = None;
  }

  /// Coasting step, run exactly once per rendered frame by the designated
  /// primary object. Velocities decay geometrically and snap to zero below
  /// the rest threshold so the assembly actually comes to rest.
  pub fn tick_inertia(&mut self) {
    if self.dragging {
      return;
    }
    self.yaw += self.vel_yaw;
    self.pitch = self.clamp_pitch(self.pitch + self.vel_pitch);
    self.vel_yaw *= self.params.damping;
    self.vel_pitch *= self.params.damping;
    if self.vel_yaw.abs() < self.params.rest_threshold {
      self.vel_yaw = 0.0;
    }
    if self.vel_pitch.abs() < self.params.rest_threshold {
      self.vel_pitch = 0.0;
    }
  }

  fn clamp_pitch(&self, pitch: f32) -> f32 {
    pitch.clamp(-self.params.pitch_limit, self.params.pitch_limit)
  }

  pub fn yaw(&self) -> f32 {
    self.yaw
  }

  pub fn pitch(&self) -> f32 {
    self.pitch
  }

  pub fn is_dragging(&self) -> bool {
    self.dragging
  }
}
