use crate::resources::{prune_unreferenced, rgba8_len, texel_count};
use crate::shaders;
use crate::uniforms::{DrawUniforms, FrameUniforms, Vertex, interleave};
use showroom_camera::PerspectiveCamera;
use showroom_common::{NodeId, Viewport};
use showroom_render::{DrawItem, FramePacket, RenderError, RenderSettings, Renderer};
use showroom_scene::{EnvironmentTexture, Material, Scene, TextureImage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// An acquired surface texture with the scene already drawn into it.
///
/// Callers may draw overlays into [`SurfaceFrame::view`] before presenting.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl SurfaceFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        self.texture.present();
    }
}

struct Layouts {
    frame: wgpu::BindGroupLayout,
    draw: wgpu::BindGroupLayout,
    textured: wgpu::BindGroupLayout,
    program: wgpu::BindGroupLayout,
}

/// Depth target, plus the multisampled color target when MSAA is on.
struct Targets {
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

enum GpuMaterial {
    Standard {
        bind_group: wgpu::BindGroup,
        /// Key into `Gpu::textures`, when a base color texture is bound.
        texture: Option<usize>,
    },
    Shader {
        buffer: wgpu::Buffer,
        bind_group: wgpu::BindGroup,
    },
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    material: GpuMaterial,
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    backend: String,
    layouts: Layouts,
    model_pipeline: wgpu::RenderPipeline,
    sphere_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    default_env: wgpu::TextureView,
    env_sampler: wgpu::Sampler,
    bound_env: Option<Arc<EnvironmentTexture>>,
    /// Mean color of the bound environment, computed once per upload.
    env_mean: Option<[f32; 3]>,
    base_sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    textures: HashMap<usize, (Arc<TextureImage>, wgpu::TextureView)>,
    meshes: HashMap<NodeId, GpuMesh>,
    targets: Targets,
}

/// wgpu renderer owning the window surface, device and queue.
///
/// Draws standard materials with [`shaders::MODEL_SHADER`] and the animated
/// sphere with [`showroom_shader::SPHERE_SHADER`]. GPU buffers are cached
/// per scene node and dropped when the node stops being drawn.
pub struct WgpuRenderer {
    gpu: Option<Gpu>,
    settings: RenderSettings,
    viewport: Viewport,
    frames: u64,
}

impl WgpuRenderer {
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        viewport: Viewport,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("showroom_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb() == settings.srgb)
            .or(caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let sample_count = supported_samples(&adapter, format, settings.sample_count());

        let (width, height) = clamp_size(viewport.physical_size(), &device);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let layouts = Layouts::new(&device);
        let model_pipeline = create_pipeline(
            &device,
            "model_pipeline",
            &[&layouts.frame, &layouts.draw, &layouts.textured],
            shaders::MODEL_SHADER,
            (shaders::MODEL_VERTEX_ENTRY, shaders::MODEL_FRAGMENT_ENTRY),
            format,
            sample_count,
        );
        let sphere_pipeline = create_pipeline(
            &device,
            "sphere_pipeline",
            &[&layouts.frame, &layouts.draw, &layouts.program],
            showroom_shader::SPHERE_SHADER,
            (showroom_shader::VERTEX_ENTRY, showroom_shader::FRAGMENT_ENTRY),
            format,
            sample_count,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("env_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        let base_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("base_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let default_env = create_env_texture(
            &device,
            &queue,
            &EnvironmentTexture::new(1, 1, vec![[0.0, 0.0, 0.0, 1.0]]),
        );
        let white = create_rgba8_texture(
            &device,
            &queue,
            "white_texture",
            &TextureImage {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            },
        );
        let frame_bind_group =
            frame_bind_group(&device, &layouts.frame, &frame_buffer, &default_env, &env_sampler);
        let targets = Targets::new(&device, &config, sample_count);

        let backend = adapter.get_info().backend.to_str().to_string();
        tracing::info!(
            backend = %backend,
            ?format,
            sample_count,
            width,
            height,
            "GPU initialized"
        );

        Ok(Self {
            gpu: Some(Gpu {
                surface,
                device,
                queue,
                config,
                sample_count,
                backend,
                layouts,
                model_pipeline,
                sphere_pipeline,
                frame_buffer,
                frame_bind_group,
                default_env,
                env_sampler,
                bound_env: None,
                env_mean: None,
                base_sampler,
                white,
                textures: HashMap::new(),
                meshes: HashMap::new(),
                targets,
            }),
            settings,
            viewport,
            frames: 0,
        })
    }

    pub fn device(&self) -> Option<&wgpu::Device> {
        self.gpu.as_ref().map(|g| &g.device)
    }

    pub fn queue(&self) -> Option<&wgpu::Queue> {
        self.gpu.as_ref().map(|g| &g.queue)
    }

    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.gpu.as_ref().map(|g| g.config.format)
    }

    /// Configured surface size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        match &self.gpu {
            Some(g) => (g.config.width, g.config.height),
            None => self.viewport.physical_size(),
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.gpu.as_ref().map_or(1, |g| g.sample_count)
    }

    pub fn backend(&self) -> &str {
        self.gpu.as_ref().map_or("disposed", |g| g.backend.as_str())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for WgpuRenderer {
    /// `None` when the frame was skipped (disposed, or the surface was lost
    /// and has been reconfigured).
    type Output = Option<SurfaceFrame>;

    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (width, height) = clamp_size(viewport.physical_size(), &gpu.device);
        gpu.config.width = width;
        gpu.config.height = height;
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.targets = Targets::new(&gpu.device, &gpu.config, gpu.sample_count);
        tracing::debug!(width, height, pixel_ratio = viewport.pixel_ratio, "surface resized");
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Option<SurfaceFrame> {
        let gpu = self.gpu.as_mut()?;
        let packet = FramePacket::extract(scene, camera);
        gpu.sync_environment(packet.environment);
        gpu.sync_meshes(&packet.draws);
        gpu.queue.write_buffer(
            &gpu.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_packet(&packet, gpu.env_mean)),
        );

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return None;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping frame");
                return None;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return None;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let clear = self.settings.clear_color;
        let (color_view, resolve_target) = match &gpu.targets.msaa {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &packet.draws {
                let Some(mesh) = gpu.meshes.get(&draw.node) else {
                    continue;
                };
                match &mesh.material {
                    GpuMaterial::Standard { bind_group, .. } => {
                        pass.set_pipeline(&gpu.model_pipeline);
                        pass.set_bind_group(2, bind_group, &[]);
                    }
                    GpuMaterial::Shader { bind_group, .. } => {
                        pass.set_pipeline(&gpu.sphere_pipeline);
                        pass.set_bind_group(2, bind_group, &[]);
                    }
                }
                pass.set_bind_group(0, &gpu.frame_bind_group, &[]);
                pass.set_bind_group(1, &mesh.draw_bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));

        self.frames += 1;
        tracing::trace!(frame = self.frames, draws = packet.draws.len(), "frame encoded");
        Some(SurfaceFrame {
            texture: output,
            view,
        })
    }

    fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            tracing::info!(
                meshes = gpu.meshes.len(),
                textures = gpu.textures.len(),
                frames = self.frames,
                "renderer disposed"
            );
        }
    }
}

impl Gpu {
    fn sync_environment(&mut self, env: Option<&Arc<EnvironmentTexture>>) {
        let unchanged = match (env, &self.bound_env) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        let max = self.device.limits().max_texture_dimension_2d;
        let uploaded = env.and_then(|tex| {
            if tex.width == 0 || tex.height == 0 || tex.width > max || tex.height > max {
                tracing::warn!(
                    width = tex.width,
                    height = tex.height,
                    max,
                    "environment texture unusable, using flat ambient"
                );
                return None;
            }
            if texel_count(tex.width, tex.height) != Some(tex.texels.len()) {
                tracing::warn!("environment texel count mismatch, using flat ambient");
                return None;
            }
            Some((
                create_env_texture(&self.device, &self.queue, tex),
                tex.average_color(),
            ))
        });
        self.env_mean = uploaded.as_ref().map(|(_, mean)| *mean);
        let uploaded = uploaded.map(|(view, _)| view);
        let view = uploaded.as_ref().unwrap_or(&self.default_env);
        self.frame_bind_group = frame_bind_group(
            &self.device,
            &self.layouts.frame,
            &self.frame_buffer,
            view,
            &self.env_sampler,
        );
        self.bound_env = env.cloned();
        tracing::debug!(bound = uploaded.is_some(), "environment texture rebound");
    }

    fn sync_meshes(&mut self, draws: &[DrawItem<'_>]) {
        let mut seen = HashSet::with_capacity(draws.len());
        for draw in draws {
            seen.insert(draw.node);
            if !self.meshes.contains_key(&draw.node) {
                if let Some(mesh) = self.upload_mesh(draw) {
                    self.meshes.insert(draw.node, mesh);
                }
            }
            let Some(mesh) = self.meshes.get(&draw.node) else {
                continue;
            };
            self.queue.write_buffer(
                &mesh.draw_buffer,
                0,
                bytemuck::bytes_of(&DrawUniforms::from_draw(draw)),
            );
            if let (GpuMaterial::Shader { buffer, .. }, Material::Shader(m)) =
                (&mesh.material, &draw.mesh.material)
            {
                self.queue
                    .write_buffer(buffer, 0, bytemuck::bytes_of(&m.program.uniform()));
            }
        }
        let dropped = prune_unreferenced(&mut self.meshes, &seen);
        if dropped > 0 {
            let live: HashSet<usize> = self
                .meshes
                .values()
                .filter_map(|mesh| match &mesh.material {
                    GpuMaterial::Standard { texture, .. } => *texture,
                    GpuMaterial::Shader { .. } => None,
                })
                .collect();
            let textures = prune_unreferenced(&mut self.textures, &live);
            tracing::debug!(dropped, textures, "released mesh buffers");
        }
    }

    fn upload_mesh(&mut self, draw: &DrawItem<'_>) -> Option<GpuMesh> {
        let geometry = &draw.mesh.geometry;
        if geometry.indices.is_empty() {
            return None;
        }
        let vertices: Vec<Vertex> = interleave(geometry);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let draw_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("draw_uniforms"),
                contents: bytemuck::bytes_of(&DrawUniforms::from_draw(draw)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let draw_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &self.layouts.draw,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: draw_buffer.as_entire_binding(),
            }],
        });

        let material = match &draw.mesh.material {
            Material::Standard(m) => {
                let key = m
                    .base_color_texture
                    .as_ref()
                    .and_then(|image| self.upload_texture(image));
                let view = key
                    .and_then(|k| self.textures.get(&k))
                    .map_or(&self.white, |(_, view)| view);
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("material_bind_group"),
                    layout: &self.layouts.textured,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.base_sampler),
                        },
                    ],
                });
                GpuMaterial::Standard {
                    bind_group,
                    texture: key,
                }
            }
            Material::Shader(m) => {
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("program_uniforms"),
                        contents: bytemuck::bytes_of(&m.program.uniform()),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("program_bind_group"),
                    layout: &self.layouts.program,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                GpuMaterial::Shader { buffer, bind_group }
            }
        };

        Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            draw_buffer,
            draw_bind_group,
            material,
        })
    }

    /// Upload a material texture once per image. Returns the cache key, or
    /// `None` for malformed images, which fall back to white.
    fn upload_texture(&mut self, image: &Arc<TextureImage>) -> Option<usize> {
        let valid = image.width > 0
            && image.height > 0
            && rgba8_len(image.width, image.height) == Some(image.byte_len());
        if !valid {
            tracing::warn!(width = image.width, height = image.height, "malformed texture");
            return None;
        }
        let key = Arc::as_ptr(image) as usize;
        let (device, queue) = (&self.device, &self.queue);
        self.textures.entry(key).or_insert_with(|| {
            (
                image.clone(),
                create_rgba8_texture(device, queue, "base_color_texture", image),
            )
        });
        Some(key)
    }
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniform = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let texture = |binding, filterable| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler = |binding, ty| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(ty),
            count: None,
        };
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        Self {
            frame: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("frame_layout"),
                entries: &[
                    uniform(0, both),
                    texture(1, false),
                    sampler(2, wgpu::SamplerBindingType::NonFiltering),
                ],
            }),
            draw: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("draw_layout"),
                entries: &[uniform(0, both)],
            }),
            textured: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("textured_layout"),
                entries: &[
                    texture(0, true),
                    sampler(1, wgpu::SamplerBindingType::Filtering),
                ],
            }),
            program: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("program_layout"),
                entries: &[uniform(0, wgpu::ShaderStages::FRAGMENT)],
            }),
        }
    }
}

impl Targets {
    fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, samples: u32) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let target = |label, format| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        };
        Self {
            depth: target("depth_texture", DEPTH_FORMAT),
            msaa: (samples > 1).then(|| target("msaa_color", config.format)),
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    source: &str,
    (vs, fs): (&str, &str),
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    env: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("frame_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_env_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    tex: &EnvironmentTexture,
) -> wgpu::TextureView {
    device
        .create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("environment_texture"),
                size: wgpu::Extent3d {
                    width: tex.width,
                    height: tex.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            bytemuck::cast_slice(&tex.texels),
        )
        .create_view(&Default::default())
}

fn create_rgba8_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
) -> wgpu::TextureView {
    device
        .create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        )
        .create_view(&Default::default())
}

fn supported_samples(adapter: &wgpu::Adapter, format: wgpu::TextureFormat, requested: u32) -> u32 {
    if requested <= 1 {
        return 1;
    }
    let color = adapter.get_texture_format_features(format).flags;
    let depth = adapter.get_texture_format_features(DEPTH_FORMAT).flags;
    if color.sample_count_supported(requested) && depth.sample_count_supported(requested) {
        requested
    } else {
        tracing::warn!(requested, "MSAA sample count unsupported, antialiasing off");
        1
    }
}

fn clamp_size((width, height): (u32, u32), device: &wgpu::Device) -> (u32, u32) {
    let max = device.limits().max_texture_dimension_2d;
    (width.clamp(1, max), height.clamp(1, max))
}
