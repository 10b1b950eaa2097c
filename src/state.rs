use crate::camera::{Camera, CameraUniform};
use crate::drag::DragController;
use crate::morph;
use crate::render::{FrameScene, Render};
use crate::scroll::ScrollSmoother;
use crate::targets::{BrainSource, PositionTable};
use crate::transform;
use crate::{DragParams, ParticleInstance, RunOptions, ScrollParams};
use cgmath::{Matrix4, SquareMatrix};
use rand::{rngs::SmallRng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use wgpu::util::DeviceExt;
use winit::event::{
  ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, StartCause, TouchPhase,
  WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::{
  dpi::PhysicalSize,
  event_loop::{EventLoop, EventLoopWindowTarget},
  window::Window,
};

const FRAME_DT: f32 = 1.0 / 60.0;

struct EventLoopWrapper {
  event_loop: EventLoop<()>,
  window: Arc<Window>,
}

impl EventLoopWrapper {
  pub fn new(title: &str) -> Self {
    let event_loop = EventLoop::new().unwrap();
    let mut builder = winit::window::WindowBuilder::new();
    builder = builder.with_title(title).with_resizable(false);
    let window = Arc::new(builder.build(&event_loop).unwrap());

    Self { event_loop, window }
  }
}

struct SurfaceWrapper {
  surface: Option<wgpu::Surface<'static>>,
  config: Option<wgpu::SurfaceConfiguration>,
}

impl SurfaceWrapper {
  fn new() -> Self {
    Self {
      surface: None,
      config: None,
    }
  }

  fn resume(&mut self, context: &State, window: Arc<Window>) {
    let window_size = window.inner_size();
    let width = window_size.width.max(1);
    let height = window_size.height.max(1);
    self.surface = Some(context.instance.create_surface(window).unwrap());
    let surface = self.surface.as_ref().unwrap();
    let mut config = surface
      .get_default_config(&context.adapter, width, height)
      .unwrap();
    let view_format = config.format.add_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(&context.device, &config);
    self.config = Some(config);
  }

  fn acquire(&mut self, context: &State) -> wgpu::SurfaceTexture {
    let surface = self.surface.as_ref().unwrap();

    match surface.get_current_texture() {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Timeout) => surface.get_current_texture().unwrap(),
      Err(
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost | wgpu::SurfaceError::OutOfMemory,
      ) => {
        surface.configure(&context.device, self.config());
        surface.get_current_texture().unwrap()
      }
    }
  }

  fn suspend(&mut self) {}

  fn config(&self) -> &wgpu::SurfaceConfiguration {
    self.config.as_ref().unwrap()
  }
}

struct State {
  instance: wgpu::Instance,
  adapter: wgpu::Adapter,
  device: wgpu::Device,
  queue: wgpu::Queue,
  camera: Camera,
  camera_uniform: CameraUniform,
  camera_buffer: wgpu::Buffer,
  camera_bind_group: wgpu::BindGroup,
  camera_bind_group_layout: wgpu::BindGroupLayout,
  scroll: ScrollSmoother,
  drag: DragController,
  table: PositionTable,
  instances: Vec<ParticleInstance>,
  start: Instant,
  cursor: (f32, f32),
  cloud_model: Matrix4<f32>,
  box_model: Matrix4<f32>,
  box_opacity: f32,
}

impl State {
  /// Route pointer and wheel input. Pointer handlers only write orientation
  /// state; the visual effect lands on the next frame tick.
  fn input(&mut self, event: &WindowEvent) -> bool {
    match event {
      WindowEvent::CursorMoved { position, .. } => {
        self.cursor = (position.x as f32, position.y as f32);
        if self.drag.is_dragging() {
          self.drag.pointer_move(self.cursor.0, self.cursor.1);
          return true;
        }
        false
      }
      WindowEvent::MouseInput {
        state,
        button: MouseButton::Left,
        ..
      } => {
        match state {
          ElementState::Pressed => self.drag.pointer_down(self.cursor.0, self.cursor.1),
          ElementState::Released => self.drag.pointer_up(),
        }
        true
      }
      WindowEvent::MouseWheel { delta, .. } => {
        // scrolling down advances the sequence
        match delta {
          MouseScrollDelta::LineDelta(_, y) => self.scroll.push_lines(-y),
          MouseScrollDelta::PixelDelta(p) => self.scroll.push_pixels(-p.y as f32),
        }
        true
      }
      WindowEvent::Touch(touch) => {
        let (x, y) = (touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
          TouchPhase::Started => self.drag.pointer_down(x, y),
          TouchPhase::Moved => self.drag.pointer_move(x, y),
          TouchPhase::Ended | TouchPhase::Cancelled => self.drag.pointer_up(),
        }
        true
      }
      _ => false,
    }
  }

  /// Per-frame step: smooth the scroll input, advance drag inertia (sole
  /// call site), then derive every render quantity from the shared state.
  fn update(&mut self) {
    self.scroll.advance(FRAME_DT);
    self.drag.tick_inertia();

    let s = self.scroll.value();
    let time = self.start.elapsed().as_secs_f32();
    morph::update_instances(&self.table, s, time, &mut self.instances);

    let (yaw, pitch) = transform::assembly_rotation(s, time, &self.drag);
    self.cloud_model = transform::model_matrix(yaw, pitch, 1.0);
    self.box_model = transform::model_matrix(yaw, pitch, transform::box_scale(s));
    self.box_opacity = transform::box_opacity(s);

    self.camera_uniform.update(&self.camera);
    self.queue.write_buffer(
      &self.camera_buffer,
      0,
      bytemuck::cast_slice(&[self.camera_uniform]),
    );
  }

  fn scene(&self) -> FrameScene<'_> {
    FrameScene {
      instances: &self.instances,
      cloud_model: self.cloud_model,
      box_model: self.box_model,
      box_opacity: self.box_opacity,
    }
  }

  async fn init(surface: &SurfaceWrapper, size: &PhysicalSize<u32>, table: PositionTable) -> Self {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      #[cfg(not(target_arch = "wasm32"))]
      backends: wgpu::Backends::PRIMARY,
      ..Default::default()
    });

    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: surface.surface.as_ref(),
        force_fallback_adapter: false,
      })
      .await
      .unwrap();

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::default(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await
      .unwrap();

    // far enough back that the idle scatter cube stays in frame
    let camera = Camera {
      eye: (0.0, 0.0, 18.0).into(),
      target: (0.0, 0.0, 0.0).into(),
      up: cgmath::Vector3::unit_y(),
      aspect: size.width as f32 / size.height as f32,
      fovy: 45.0,
      znear: 0.1,
      zfar: 100.0,
    };
    let mut camera_uniform = CameraUniform::new();
    camera_uniform.update(&camera);

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Camera Buffer"),
      contents: bytemuck::cast_slice(&[camera_uniform]),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let camera_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
          },
          count: None,
        }],
        label: Some("camera_bind_group_layout"),
      });
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &camera_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: camera_buffer.as_entire_binding(),
      }],
      label: Some("camera_bind_group"),
    });

    let num_particles = table.len();
    Self {
      instance,
      adapter,
      device,
      queue,
      camera,
      camera_uniform,
      camera_buffer,
      camera_bind_group,
      camera_bind_group_layout,
      scroll: ScrollSmoother::new(ScrollParams::default()),
      drag: DragController::new(DragParams::default()),
      table,
      instances: Vec::with_capacity(num_particles),
      start: Instant::now(),
      cursor: (0.0, 0.0),
      cloud_model: Matrix4::identity(),
      box_model: Matrix4::identity(),
      box_opacity: 0.0,
    }
  }
}

fn build_table(opts: &RunOptions) -> PositionTable {
  let mut rng = SmallRng::seed_from_u64(opts.seed);
  let source = match &opts.mesh {
    None => Some(BrainSource::Analytic),
    Some(path) => match crate::mesh::load_obj(path) {
      Ok(mesh) => {
        log::info!(
          "loaded surface asset {} ({} triangles)",
          path.display(),
          mesh.triangles.len()
        );
        Some(BrainSource::Surface(mesh))
      }
      Err(err) => {
        log::warn!(
          "could not load surface asset {}: {err:#}; brain targets zero-filled",
          path.display()
        );
        None
      }
    },
  };
  let table = match source {
    Some(source) => PositionTable::generate(&opts.shape, &source, &mut rng),
    None => PositionTable::generate_with_zero_brain(&opts.shape, &mut rng),
  };
  log::info!("generated morph targets for {} particles", table.len());
  table
}

/// Drive the full scroll sequence without a window; useful for timing the
/// CPU side of the morph.
fn run_headless(opts: &RunOptions, table: PositionTable) {
  let mut scroll = ScrollSmoother::new(ScrollParams::default());
  let mut drag = DragController::new(DragParams::default());
  scroll.set_target(1.0);
  let mut instances = Vec::with_capacity(table.len());
  let started = Instant::now();
  for frame in 0..opts.frames {
    scroll.advance(FRAME_DT);
    drag.tick_inertia();
    morph::update_instances(&table, scroll.value(), frame as f32 * FRAME_DT, &mut instances);
  }
  let elapsed = started.elapsed();
  log::info!(
    "headless: {} frames x {} particles in {:.1?} ({:.2} ms/frame), final progress {:.3}",
    opts.frames,
    table.len(),
    elapsed,
    elapsed.as_secs_f64() * 1000.0 / opts.frames.max(1) as f64,
    scroll.value()
  );
}

async fn start(opts: RunOptions) {
  let table = build_table(&opts);
  if opts.headless {
    run_headless(&opts, table);
    return;
  }

  let window_loop = EventLoopWrapper::new("mindmorph");
  let mut surface = SurfaceWrapper::new();
  let mut context = State::init(&surface, &window_loop.window.inner_size(), table).await;
  let event_loop_function = EventLoop::run;
  let mut renderer = None;

  let _ = (event_loop_function)(
    window_loop.event_loop,
    move |event, target: &EventLoopWindowTarget<()>| match event {
      Event::NewEvents(StartCause::Init) => {
        surface.resume(&context, window_loop.window.clone());
        if renderer.is_none() {
          renderer = Some(Render::init(
            surface.config(),
            &context.device,
            &context.camera_bind_group_layout,
            context.table.len() as u32,
          ));
        }
      }
      Event::Suspended => {
        surface.suspend();
      }
      Event::WindowEvent { event, window_id } if window_id == window_loop.window.id() => {
        if !context.input(&event) {
          match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
              event:
                KeyEvent {
                  state: ElementState::Pressed,
                  physical_key: PhysicalKey::Code(KeyCode::Escape),
                  ..
                },
              ..
            } => target.exit(),
            WindowEvent::RedrawRequested => {
              window_loop.window.request_redraw();
              if renderer.is_none() {
                return;
              }
              context.update();
              if let Some(renderer) = &mut renderer {
                let frame = surface.acquire(&context);
                let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
                  format: Some(surface.config().view_formats[0]),
                  ..wgpu::TextureViewDescriptor::default()
                });
                renderer.render(
                  &view,
                  &context.device,
                  &context.queue,
                  &context.camera_bind_group,
                  &context.scene(),
                );
                frame.present();
              }
            }
            _ => {}
          }
        }
      }
      _ => {}
    },
  );
}

pub fn run(opts: RunOptions) {
  env_logger::init();
  pollster::block_on(start(opts));
}
