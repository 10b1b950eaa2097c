use cgmath::SquareMatrix;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Fixed perspective camera looking at the assembly. Orientation changes are
/// object rotations, not camera moves.
pub struct Camera {
  pub eye: cgmath::Point3<f32>,
  pub target: cgmath::Point3<f32>,
  pub up: cgmath::Vector3<f32>,
  pub aspect: f32,
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
}

impl Camera {
  pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
    cgmath::Matrix4::look_at_rh(self.eye, self.target, self.up)
  }

  pub fn proj_matrix(&self) -> cgmath::Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
      * cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar)
  }
}

/// View and projection are uploaded separately so point sprites can expand
/// in view space and stay camera-facing.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
  view: [[f32; 4]; 4],
  proj: [[f32; 4]; 4],
}

impl CameraUniform {
  pub fn new() -> Self {
    Self {
      view: cgmath::Matrix4::identity().into(),
      proj: cgmath::Matrix4::identity().into(),
    }
  }

  pub fn update(&mut self, camera: &Camera) {
    self.view = camera.view_matrix().into();
    self.proj = camera.proj_matrix().into();
  }
}

impl Default for CameraUniform {
  fn default() -> Self {
    Self::new()
  }
}
