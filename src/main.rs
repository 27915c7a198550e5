use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Vec2;
use image::RgbaImage;
use sdf_raymarch_lib::{
    application::{AppState, Application, Layer, Screen, WindowSettings},
    camera::CameraController,
    config::{Args, Backend, RenderConfig},
    frame,
    renderer::{UniformBuffer, Vertex, VertexBuffer, FULL_SCREEN_QUAD},
    scene::Scene,
    shader::Uniforms,
    texture::Texture,
};
use tracing_subscriber::EnvFilter;
use wgpu::{
    include_wgsl, CommandEncoderDescriptor, PipelineLayoutDescriptor, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipelineDescriptor, TextureViewDescriptor,
};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
};

const CAMERA_SPEED: f32 = 0.2;

/// Per-backend GPU resources.
enum FrameSource {
    /// The fragment shader marches the scene, fed by a uniform block.
    Gpu {
        uniform_buffer: UniformBuffer<Uniforms>,
        bind_group: wgpu::BindGroup,
    },
    /// The CPU marches the scene into `pixels`, shown through `texture`.
    Cpu {
        pixels: RgbaImage,
        texture: Texture,
        bind_group_layout: wgpu::BindGroupLayout,
        bind_group: wgpu::BindGroup,
    },
}

impl FrameSource {
    fn bind_group(&self) -> &wgpu::BindGroup {
        match self {
            FrameSource::Gpu { bind_group, .. } | FrameSource::Cpu { bind_group, .. } => {
                bind_group
            }
        }
    }
}

struct RayMarchLayer {
    config: RenderConfig,
    camera_controller: CameraController,
    scene: Scene,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: VertexBuffer,
    source: FrameSource,
    dirty: bool,
}

impl RayMarchLayer {
    fn resolution(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    fn render_cpu_frame(&self) -> RgbaImage {
        frame::render(
            &self.config.pixel_shader(),
            &self.scene,
            self.config.width,
            self.config.height,
        )
    }

    fn export(&self, path: &Path) {
        let img = match &self.source {
            FrameSource::Cpu { pixels, .. } if !self.dirty => pixels.clone(),
            _ => self.render_cpu_frame(),
        };
        if let Err(e) = frame::save_png(&img, path) {
            tracing::error!("{:?}", e);
        }
    }
}

fn create_uniform_bind_group(
    device: &wgpu::Device,
    uniform_buffer: &UniformBuffer<Uniforms>,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.buffer().as_entire_binding(),
        }],
        label: Some("uniform_bind_group"),
    });

    (bind_group_layout, bind_group)
}

fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
        label: Some("frame_bind_group"),
    })
}

fn create_render_pipeline(
    screen: &Screen,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = screen
        .device
        .create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

    screen
        .device
        .create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: screen.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
}

impl Layer for RayMarchLayer {
    type Config = RenderConfig;
    type LayerErr = anyhow::Error;

    fn start(
        screen: &mut Screen,
        _app: &AppState,
        mut config: RenderConfig,
    ) -> Result<Self, Self::LayerErr> {
        let size = screen.size();
        config.width = size.width;
        config.height = size.height;
        let scene = Scene::default();

        let vertex_buffer = VertexBuffer::init_immediate(
            &screen.device,
            FULL_SCREEN_QUAD,
            Some("Full Screen Quad Buffer"),
        );

        let (render_pipeline, source) = match config.backend {
            Backend::Gpu => {
                let shader = screen
                    .device
                    .create_shader_module(include_wgsl!("asset/shader/raymarch.wgsl"));
                let resolution = Vec2::new(size.width as f32, size.height as f32);
                let uniform_buffer = UniformBuffer::init_immediate(
                    &screen.device,
                    &Uniforms::new(resolution, &config.camera),
                    Some("Uniform Buffer"),
                );
                let (bind_group_layout, bind_group) =
                    create_uniform_bind_group(&screen.device, &uniform_buffer);
                let render_pipeline = create_render_pipeline(screen, &shader, &bind_group_layout);
                (
                    render_pipeline,
                    FrameSource::Gpu {
                        uniform_buffer,
                        bind_group,
                    },
                )
            }
            Backend::Cpu => {
                let shader = screen
                    .device
                    .create_shader_module(include_wgsl!("asset/shader/blit.wgsl"));
                let pixels =
                    frame::render(&config.pixel_shader(), &scene, config.width, config.height);
                let texture = Texture::from_image(
                    &screen.device,
                    &screen.queue,
                    &pixels,
                    Some("Frame Texture"),
                );
                let bind_group_layout = create_texture_bind_group_layout(&screen.device);
                let bind_group =
                    create_texture_bind_group(&screen.device, &bind_group_layout, &texture);
                let render_pipeline = create_render_pipeline(screen, &shader, &bind_group_layout);
                (
                    render_pipeline,
                    FrameSource::Cpu {
                        pixels,
                        texture,
                        bind_group_layout,
                        bind_group,
                    },
                )
            }
        };
        tracing::info!(backend = ?config.backend, "layer started");

        Ok(Self {
            config,
            camera_controller: CameraController::new(CAMERA_SPEED),
            scene,
            render_pipeline,
            vertex_buffer,
            source,
            dirty: false,
        })
    }

    fn process_event(&mut self, event: &Event<()>, app: &AppState, _screen: &mut Screen) {
        let Event::WindowEvent { event, .. } = event else {
            return;
        };
        if self
            .camera_controller
            .process_events(&mut self.config.camera, event)
        {
            self.dirty = true;
        }
        if let WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(VirtualKeyCode::F12),
                    ..
                },
            ..
        } = event
        {
            let path = self
                .config
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("sdf_raymarch_{}.png", app.frame_count)));
            self.export(&path);
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>, _app: &AppState, _screen: &mut Screen) {
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.dirty = true;
    }

    fn update(&mut self, _app: &AppState, screen: &mut Screen) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let resolution = self.resolution();
        match &mut self.source {
            FrameSource::Gpu { uniform_buffer, .. } => {
                let uniforms = Uniforms::new(resolution, &self.config.camera);
                uniform_buffer.write(&screen.queue, &uniforms);
                tracing::debug!(?uniforms, "uniforms uploaded");
            }
            FrameSource::Cpu {
                pixels,
                texture,
                bind_group_layout,
                bind_group,
            } => {
                *pixels = frame::render(
                    &self.config.pixel_shader(),
                    &self.scene,
                    self.config.width,
                    self.config.height,
                );
                if (texture.width(), texture.height()) == pixels.dimensions() {
                    texture.update_data(&screen.queue, pixels);
                } else {
                    *texture = Texture::from_image(
                        &screen.device,
                        &screen.queue,
                        pixels,
                        Some("Frame Texture"),
                    );
                    *bind_group =
                        create_texture_bind_group(&screen.device, bind_group_layout, texture);
                }
            }
        }
    }

    fn render(&mut self, _app: &AppState, screen: &mut Screen) -> Result<(), wgpu::SurfaceError> {
        let output = screen.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, self.source.bind_group(), &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.draw(0..self.vertex_buffer.count(), 0..1);
        }

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn shutdown(&mut self, app: &AppState, _screen: &mut Screen) -> Result<(), Self::LayerErr> {
        tracing::info!(frames = app.frame_count, "exiting");
        Ok(())
    }
}

fn export_headless(config: &RenderConfig, output: &Path) -> anyhow::Result<()> {
    let img = frame::render(
        &config.pixel_shader(),
        &Scene::default(),
        config.width,
        config.height,
    );
    frame::save_png(&img, output)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RenderConfig::from(Args::parse());
    tracing::info!(?config, "starting");

    if let Some(output) = &config.output {
        return export_headless(&config, output);
    }

    let window = WindowSettings {
        title: "sdf_raymarch".to_owned(),
        size: PhysicalSize::new(config.width, config.height),
    };
    pollster::block_on(Application::<RayMarchLayer>::init(window, config))
}
