//! wgpu render surface.
//!
//! Draws frames into an offscreen color target that the embedding window
//! can copy or sample. Lines and surfaces share one shader; surface
//! triangles are expanded to world space on the CPU each frame.
//!
//! Opaque surfaces write depth; translucent ones are drawn after them with
//! depth testing only. Lines are always 1 pixel wide (`Frame::line_width`
//! is not supported by wgpu).

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::host::{Frame, RenderError, RenderSurface};
use crate::vertex::ColorVertex;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render surface backed by a wgpu device.
pub struct GpuSurface {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,

    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    #[allow(dead_code)] // Held for GPU resource lifetime
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    line_pipeline: wgpu::RenderPipeline,
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
}

impl GpuSurface {
    /// Create a surface rendering into a `width` x `height` target.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Camera Buffer"),
            size: std::mem::size_of::<crate::camera::CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Camera Bind Group Layout"),
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
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let line_pipeline = create_pipeline(
            &device,
            "Crosshair",
            format,
            &camera_layout,
            wgpu::PrimitiveTopology::LineList,
            true,
        );
        let opaque_pipeline = create_pipeline(
            &device,
            "Opaque Surface",
            format,
            &camera_layout,
            wgpu::PrimitiveTopology::TriangleList,
            true,
        );
        let translucent_pipeline = create_pipeline(
            &device,
            "Translucent Surface",
            format,
            &camera_layout,
            wgpu::PrimitiveTopology::TriangleList,
            false,
        );

        let (color_texture, color_view) = create_target(&device, format, width, height);
        let (depth_texture, depth_view) = create_target(&device, DEPTH_FORMAT, width, height);

        Self {
            device,
            queue,
            format,
            width,
            height,
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            camera_buffer,
            camera_bind_group,
            line_pipeline,
            opaque_pipeline,
            translucent_pipeline,
        }
    }

    /// Color target the frames are drawn into.
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color_texture
    }

    /// Target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn vertex_buffer(&self, label: &str, vertices: &[ColorVertex]) -> Option<wgpu::Buffer> {
        if vertices.is_empty() {
            return None;
        }
        Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        )
    }
}

impl RenderSurface for GpuSurface {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&frame.camera));

        let surfaces = frame.surface_vertices();
        let line_buffer = self.vertex_buffer("Crosshair Vertex Buffer", &frame.lines);
        let opaque_buffer = self.vertex_buffer("Opaque Surface Vertex Buffer", &surfaces.opaque);
        let translucent_buffer =
            self.vertex_buffer("Translucent Surface Vertex Buffer", &surfaces.translucent);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let [r, g, b, a] = frame.background.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            if let Some(buffer) = &opaque_buffer {
                pass.set_pipeline(&self.opaque_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..surfaces.opaque.len() as u32, 0..1);
            }

            if let Some(buffer) = &line_buffer {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..frame.lines.len() as u32, 0..1);
            }

            if let Some(buffer) = &translucent_buffer {
                pass.set_pipeline(&self.translucent_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..surfaces.translucent.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;

        (self.color_texture, self.color_view) =
            create_target(&self.device, self.format, width, height);
        (self.depth_texture, self.depth_view) =
            create_target(&self.device, DEPTH_FORMAT, width, height);
        tracing::debug!("GPU surface resized to {}x{}", width, height);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    topology: wgpu::PrimitiveTopology,
    depth_write_enabled: bool,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} Shader", label)),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{} Pipeline Layout", label)),
        bind_group_layouts: &[camera_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} Pipeline", label)),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[ColorVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
