use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use super::{read_source, BindingKind, BindingSlot, ProgramInterface, ShaderError, StageKind, UniformBlock};
use crate::render::{RenderCtx, Texture};

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

pub(crate) fn next_program_id() -> u32 {
    NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)
}

/// Fixed-function state of a program's pipeline.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
    pub blend: Option<wgpu::BlendState>,
}

impl<'a> PipelineDesc<'a> {
    /// Triangle list, no blending.
    pub fn new(label: &'a str, vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>]) -> Self {
        Self {
            label,
            vertex_buffers,
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: Some(wgpu::BlendState::REPLACE),
        }
    }
}

/// A linked vertex + fragment program.
///
/// Owns the render pipeline, the program's uniform block and its bind group.
/// Texture slots start out bound to a 1x1 white placeholder.
pub struct Shader {
    id: u32,
    label: String,
    interface: ProgramInterface,

    pipeline: wgpu::RenderPipeline,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    uniforms: UniformBlock,
    uniform_buffer: Option<wgpu::Buffer>,

    views: HashMap<u32, wgpu::TextureView>,
    samplers: HashMap<u32, wgpu::Sampler>,
}

impl Shader {
    /// Reads, compiles and links the two stage files.
    ///
    /// Failures are logged at error level and returned.
    pub fn from_files(
        ctx: &RenderCtx<'_>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        desc: &PipelineDesc<'_>,
    ) -> Result<Self, ShaderError> {
        let sources = read_source(StageKind::Vertex, vertex_path)
            .and_then(|vs| Ok((vs, read_source(StageKind::Fragment, fragment_path)?)));

        match sources {
            Ok((vs, fs)) => Self::from_sources(ctx, &vs, &fs, desc),
            Err(err) => {
                log::error!("{}: {err}", desc.label);
                Err(err)
            }
        }
    }

    /// Compiles and links two in-memory stage sources.
    ///
    /// Failures are logged at error level and returned.
    pub fn from_sources(
        ctx: &RenderCtx<'_>,
        vertex_src: &str,
        fragment_src: &str,
        desc: &PipelineDesc<'_>,
    ) -> Result<Self, ShaderError> {
        let result = ProgramInterface::from_sources(vertex_src, fragment_src)
            .and_then(|interface| Self::create(ctx, interface, vertex_src, fragment_src, desc));

        if let Err(err) = &result {
            log::error!("{}: {err}", desc.label);
        }
        result
    }

    fn create(
        ctx: &RenderCtx<'_>,
        interface: ProgramInterface,
        vertex_src: &str,
        fragment_src: &str,
        desc: &PipelineDesc<'_>,
    ) -> Result<Self, ShaderError> {
        interface.check_vertex_buffers(desc.vertex_buffers)?;

        let label = desc.label;

        // Validation errors from here to the pop are returned as link errors.
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex")),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fragment_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment")),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let bind_group_layout = (!interface.slots().is_empty()).then(|| {
            let entries: Vec<_> = interface.slots().iter().map(layout_entry).collect();
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} bgl")),
                entries: &entries,
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(interface.vertex_entry()),
                compilation_options: Default::default(),
                buffers: desc.vertex_buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(interface.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: desc.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: desc.topology,
                ..Default::default()
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::link(format!("pipeline creation failed: {err}")));
        }
        let id = next_program_id();

        let uniforms = UniformBlock::new(interface.uniform_layout().cloned().unwrap_or_default());
        let uniform_buffer = interface.uniform_layout().map(|layout| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{label} ubo")),
                size: layout.size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let mut views = HashMap::new();
        let mut samplers = HashMap::new();
        if interface.slots().iter().any(|s| !matches!(s.kind, BindingKind::Uniform(_))) {
            let placeholder = Texture::placeholder(ctx);
            for slot in interface.slots() {
                match slot.kind {
                    BindingKind::Texture => {
                        views.insert(slot.binding, placeholder.view().clone());
                    }
                    BindingKind::Sampler => {
                        samplers.insert(slot.binding, placeholder.sampler().clone());
                    }
                    BindingKind::Uniform(_) => {}
                }
            }
        }

        let mut shader = Self {
            id,
            label: label.to_string(),
            interface,
            pipeline,
            bind_group_layout,
            bind_group: None,
            uniforms,
            uniform_buffer,
            views,
            samplers,
        };
        shader.rebuild_bind_group(ctx.device);

        log::debug!(
            "linked program {id} `{label}` ({} bindings)",
            shader.interface.slots().len()
        );
        Ok(shader)
    }

    /// Non-zero identifier, unique within the process.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    /// Makes this program current on `pass`: uploads pending uniform writes,
    /// sets the pipeline and binds group 0.
    pub fn activate(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(buffer) = &self.uniform_buffer {
            if self.uniforms.take_dirty() {
                ctx.queue.write_buffer(buffer, 0, self.uniforms.bytes());
            }
        }

        pass.set_pipeline(&self.pipeline);
        if let Some(bind_group) = &self.bind_group {
            pass.set_bind_group(0, bind_group, &[]);
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.uniforms.set_bool(name, value);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.uniforms.set_int(name, value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.set_float(name, value);
    }

    /// Binds `texture` to the `texture_2d` global named `name`, and its
    /// sampler to the matching sampler slot (see
    /// [`ProgramInterface::sampler_for`]).
    ///
    /// Returns false, leaving bindings unchanged, if the program has no such
    /// texture.
    pub fn bind_texture(&mut self, ctx: &RenderCtx<'_>, name: &str, texture: &Texture) -> bool {
        let Some(slot) = self.interface.slot(name).filter(|s| s.kind == BindingKind::Texture) else {
            log::debug!("program `{}` has no texture named `{name}`", self.label);
            return false;
        };
        self.views.insert(slot.binding, texture.view().clone());

        if let Some(sampler) = self.interface.sampler_for(name) {
            self.samplers.insert(sampler.binding, texture.sampler().clone());
        }

        self.rebuild_bind_group(ctx.device);
        true
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        let Some(layout) = &self.bind_group_layout else {
            return;
        };

        let mut entries = Vec::with_capacity(self.interface.slots().len());
        for slot in self.interface.slots() {
            let resource = match &slot.kind {
                BindingKind::Uniform(_) => self.uniform_buffer.as_ref().map(|b| b.as_entire_binding()),
                BindingKind::Texture => self
                    .views
                    .get(&slot.binding)
                    .map(wgpu::BindingResource::TextureView),
                BindingKind::Sampler => self
                    .samplers
                    .get(&slot.binding)
                    .map(wgpu::BindingResource::Sampler),
            };

            let Some(resource) = resource else {
                log::warn!("program `{}`: nothing bound to `{}`", self.label, slot.name);
                return;
            };
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource,
            });
        }

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} bind group", self.label)),
            layout,
            entries: &entries,
        }));
    }
}

fn layout_entry(slot: &BindingSlot) -> wgpu::BindGroupLayoutEntry {
    let ty = match slot.kind {
        BindingKind::Uniform(_) => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        BindingKind::Texture => wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        BindingKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
    };

    wgpu::BindGroupLayoutEntry {
        binding: slot.binding,
        visibility: slot.visibility,
        ty,
        count: None,
    }
}
