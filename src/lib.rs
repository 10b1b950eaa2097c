pub mod camera;
pub mod drag;
pub mod mesh;
pub mod morph;
pub mod render;
pub mod sampler;
pub mod scroll;
pub mod state;
pub mod targets;
pub mod transform;

use std::path::PathBuf;

/// Parameters of the morph target distributions.
pub struct ShapeParams {
  /// Number of particles; fixed for the session.
  pub num_particles: u32,
  /// Half-extent of the idle scatter cube.
  pub scatter_extent: f32,
  /// Half-extent of the boxed-state cube.
  pub box_extent: f32,
  /// Per-axis scale applied to accepted brain samples.
  pub brain_scale: [f32; 3],
  /// Attempts per point before falling back to the bare ellipsoid surface.
  pub max_rejects: u32,
}

impl Default for ShapeParams {
  fn default() -> Self {
    Self {
      num_particles: 30_000,
      scatter_extent: 8.0,
      box_extent: 2.55,
      brain_scale: [5.5, 5.0, 4.5],
      max_rejects: 200,
    }
  }
}

pub struct DragParams {
  /// Radians of rotation per pixel of pointer travel.
  pub sensitivity: f32,
  /// Per-frame velocity multiplier while coasting.
  pub damping: f32,
  /// Pitch is clamped to +/- this many radians.
  pub pitch_limit: f32,
  /// Velocities below this magnitude snap to exactly zero.
  pub rest_threshold: f32,
}

impl Default for DragParams {
  fn default() -> Self {
    Self {
      sensitivity: 0.004,
      damping: 0.90,
      pitch_limit: 0.45 * std::f32::consts::PI,
      rest_threshold: 1e-5,
    }
  }
}

pub struct ScrollParams {
  /// Spring stiffness pulling the published value toward the target.
  pub stiffness: f32,
  /// Velocity damping of the spring.
  pub damping: f32,
  /// Progress change per wheel line.
  pub line_step: f32,
}

impl Default for ScrollParams {
  fn default() -> Self {
    Self {
      stiffness: 60.0,
      damping: 14.0,
      line_step: 0.04,
    }
  }
}

/// One particle as the GPU sees it: morphed position, point size, alpha.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
  pub pos: [f32; 3],
  pub size: f32,
  pub alpha: f32,
}

pub struct RunOptions {
  pub shape: ShapeParams,
  pub seed: u64,
  /// Strategy B surface asset; None selects analytic sampling.
  pub mesh: Option<PathBuf>,
  pub headless: bool,
  /// Frames to simulate in headless mode.
  pub frames: u32,
}
