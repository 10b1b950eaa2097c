use crate::transform::{SOLID_OPACITY, WIRE_OPACITY};
use crate::ParticleInstance;
use cgmath::Matrix4;
use std::borrow::Cow;
use wgpu::{util::DeviceExt, PipelineCompilationOptions};

const BOX_HALF: f32 = 2.55;

const PARTICLE_TINT: [f32; 3] = [0.62, 0.80, 1.00];
const BOX_TINT: [f32; 3] = [0.03, 0.03, 0.05];
const WIRE_TINT: [f32; 3] = [0.55, 0.70, 1.00];

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
  r: 0.004,
  g: 0.005,
  b: 0.012,
  a: 1.0,
};

// two triangles of a unit quad, expanded per instance in the vertex shader
#[rustfmt::skip]
const QUAD_CORNERS: [f32; 12] = [
  -1.0, -1.0,  1.0, -1.0,  1.0, 1.0,
  -1.0, -1.0,  1.0,  1.0, -1.0, 1.0,
];

#[rustfmt::skip]
const BOX_CORNERS: [[f32; 3]; 8] = [
  [-BOX_HALF, -BOX_HALF, -BOX_HALF],
  [ BOX_HALF, -BOX_HALF, -BOX_HALF],
  [ BOX_HALF,  BOX_HALF, -BOX_HALF],
  [-BOX_HALF,  BOX_HALF, -BOX_HALF],
  [-BOX_HALF, -BOX_HALF,  BOX_HALF],
  [ BOX_HALF, -BOX_HALF,  BOX_HALF],
  [ BOX_HALF,  BOX_HALF,  BOX_HALF],
  [-BOX_HALF,  BOX_HALF,  BOX_HALF],
];

#[rustfmt::skip]
const BOX_SOLID_INDICES: [u16; 36] = [
  0, 2, 1,  0, 3, 2, // back
  4, 5, 6,  4, 6, 7, // front
  0, 4, 7,  0, 7, 3, // left
  1, 6, 5,  1, 2, 6, // right
  3, 7, 6,  3, 6, 2, // top
  0, 1, 5,  0, 5, 4, // bottom
];

#[rustfmt::skip]
const BOX_WIRE_INDICES: [u16; 24] = [
  0, 1,  1, 2,  2, 3,  3, 0,
  4, 5,  5, 6,  6, 7,  7, 4,
  0, 4,  1, 5,  2, 6,  3, 7,
];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
  model: [[f32; 4]; 4],
  tint: [f32; 4],
}

/// Everything the GPU needs for one frame, computed by the update step.
pub struct FrameScene<'a> {
  pub instances: &'a [ParticleInstance],
  pub cloud_model: Matrix4<f32>,
  pub box_model: Matrix4<f32>,
  pub box_opacity: f32,
}

pub struct Render {
  particle_pipeline: wgpu::RenderPipeline,
  box_solid_pipeline: wgpu::RenderPipeline,
  box_wire_pipeline: wgpu::RenderPipeline,
  instance_buffer: wgpu::Buffer,
  quad_buffer: wgpu::Buffer,
  box_vertex_buffer: wgpu::Buffer,
  box_solid_index_buffer: wgpu::Buffer,
  box_wire_index_buffer: wgpu::Buffer,
  cloud_uniform: wgpu::Buffer,
  box_solid_uniform: wgpu::Buffer,
  box_wire_uniform: wgpu::Buffer,
  cloud_bind_group: wgpu::BindGroup,
  box_solid_bind_group: wgpu::BindGroup,
  box_wire_bind_group: wgpu::BindGroup,
  num_particles: u32,
}

impl Render {
  #[must_use]
  pub fn init(
    config: &wgpu::SurfaceConfiguration,
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    num_particles: u32,
  ) -> Self {
    let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("points shader"),
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/points.wgsl"))),
    });
    let box_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("box shader"),
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/box.wgsl"))),
    });

    let object_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as _),
          },
          count: None,
        }],
        label: Some("object_bind_group_layout"),
      });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("scene"),
      bind_group_layouts: &[camera_bind_group_layout, &object_bind_group_layout],
      push_constant_ranges: &[],
    });

    let blend_target = wgpu::ColorTargetState {
      format: config.view_formats[0],
      blend: Some(wgpu::BlendState::ALPHA_BLENDING),
      write_mask: wgpu::ColorWrites::ALL,
    };

    let instance_layout = wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<ParticleInstance>() as _,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32],
    };
    let quad_layout = wgpu::VertexBufferLayout {
      array_stride: 2 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![3 => Float32x2],
    };
    let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("particle pipeline"),
      layout: Some(&pipeline_layout),
      vertex: wgpu::VertexState {
        module: &points_shader,
        entry_point: "main_vs",
        compilation_options: PipelineCompilationOptions::default(),
        buffers: &[instance_layout, quad_layout],
      },
      fragment: Some(wgpu::FragmentState {
        module: &points_shader,
        entry_point: "main_fs",
        compilation_options: PipelineCompilationOptions::default(),
        targets: &[Some(blend_target.clone())],
      }),
      primitive: wgpu::PrimitiveState::default(),
      depth_stencil: None,
      multisample: wgpu::MultisampleState::default(),
      multiview: None,
      cache: None,
    });

    let box_vertex_layout = wgpu::VertexBufferLayout {
      array_stride: 3 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![0 => Float32x3],
    };
    let box_pipeline = |topology: wgpu::PrimitiveTopology, label: &str| {
      device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
          module: &box_shader,
          entry_point: "main_vs",
          compilation_options: PipelineCompilationOptions::default(),
          buffers: &[box_vertex_layout.clone()],
        },
        fragment: Some(wgpu::FragmentState {
          module: &box_shader,
          entry_point: "main_fs",
          compilation_options: PipelineCompilationOptions::default(),
          targets: &[Some(blend_target.clone())],
        }),
        primitive: wgpu::PrimitiveState {
          topology,
          ..wgpu::PrimitiveState::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
      })
    };
    let box_solid_pipeline = box_pipeline(wgpu::PrimitiveTopology::TriangleList, "box solid");
    let box_wire_pipeline = box_pipeline(wgpu::PrimitiveTopology::LineList, "box wire");

    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("Particle Instance Buffer"),
      size: (num_particles as u64) * std::mem::size_of::<ParticleInstance>() as u64,
      usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });
    let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Quad Corner Buffer"),
      contents: bytemuck::bytes_of(&QUAD_CORNERS),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let box_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Box Vertex Buffer"),
      contents: bytemuck::cast_slice(&BOX_CORNERS),
      usage: wgpu::BufferUsages::VERTEX,
    });
    let box_solid_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Box Solid Index Buffer"),
      contents: bytemuck::cast_slice(&BOX_SOLID_INDICES),
      usage: wgpu::BufferUsages::INDEX,
    });
    let box_wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Box Wire Index Buffer"),
      contents: bytemuck::cast_slice(&BOX_WIRE_INDICES),
      usage: wgpu::BufferUsages::INDEX,
    });

    let object_uniform = |label: &str| {
      device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<ObjectUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
      })
    };
    let cloud_uniform = object_uniform("Cloud Uniform");
    let box_solid_uniform = object_uniform("Box Solid Uniform");
    let box_wire_uniform = object_uniform("Box Wire Uniform");

    let object_bind_group = |buffer: &wgpu::Buffer, label: &str| {
      device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &object_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
          binding: 0,
          resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
      })
    };
    let cloud_bind_group = object_bind_group(&cloud_uniform, "cloud_bind_group");
    let box_solid_bind_group = object_bind_group(&box_solid_uniform, "box_solid_bind_group");
    let box_wire_bind_group = object_bind_group(&box_wire_uniform, "box_wire_bind_group");

    Render {
      particle_pipeline,
      box_solid_pipeline,
      box_wire_pipeline,
      instance_buffer,
      quad_buffer,
      box_vertex_buffer,
      box_solid_index_buffer,
      box_wire_index_buffer,
      cloud_uniform,
      box_solid_uniform,
      box_wire_uniform,
      cloud_bind_group,
      box_solid_bind_group,
      box_wire_bind_group,
      num_particles,
    }
  }

  pub fn render(
    &mut self,
    view: &wgpu::TextureView,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    camera_bind_group: &wgpu::BindGroup,
    scene: &FrameScene,
  ) {
    queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(scene.instances));
    let cloud = ObjectUniform {
      model: scene.cloud_model.into(),
      tint: [PARTICLE_TINT[0], PARTICLE_TINT[1], PARTICLE_TINT[2], 1.0],
    };
    queue.write_buffer(&self.cloud_uniform, 0, bytemuck::bytes_of(&cloud));
    let box_visible = crate::transform::box_visible(scene.box_opacity);
    if box_visible {
      let solid = ObjectUniform {
        model: scene.box_model.into(),
        tint: [
          BOX_TINT[0],
          BOX_TINT[1],
          BOX_TINT[2],
          scene.box_opacity * SOLID_OPACITY,
        ],
      };
      let wire = ObjectUniform {
        model: scene.box_model.into(),
        tint: [
          WIRE_TINT[0],
          WIRE_TINT[1],
          WIRE_TINT[2],
          scene.box_opacity * WIRE_OPACITY,
        ],
      };
      queue.write_buffer(&self.box_solid_uniform, 0, bytemuck::bytes_of(&solid));
      queue.write_buffer(&self.box_wire_uniform, 0, bytemuck::bytes_of(&wire));
    }

    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view,
      resolve_target: None,
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
        store: wgpu::StoreOp::Store,
      },
    })];
    let mut command_encoder =
      device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
      let mut rpass = command_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: None,
        color_attachments: &color_attachments,
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
      });
      rpass.set_bind_group(0, camera_bind_group, &[]);
      if box_visible {
        rpass.set_pipeline(&self.box_solid_pipeline);
        rpass.set_bind_group(1, &self.box_solid_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.box_vertex_buffer.slice(..));
        rpass.set_index_buffer(self.box_solid_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..BOX_SOLID_INDICES.len() as u32, 0, 0..1);

        rpass.set_pipeline(&self.box_wire_pipeline);
        rpass.set_bind_group(1, &self.box_wire_bind_group, &[]);
        rpass.set_index_buffer(self.box_wire_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..BOX_WIRE_INDICES.len() as u32, 0, 0..1);
      }
      rpass.set_pipeline(&self.particle_pipeline);
      rpass.set_bind_group(1, &self.cloud_bind_group, &[]);
      rpass.set_vertex_buffer(0, self.instance_buffer.slice(..));
      rpass.set_vertex_buffer(1, self.quad_buffer.slice(..));
      rpass.draw(0..6, 0..self.num_particles);
    }
    queue.submit(Some(command_encoder.finish()));
  }
}
