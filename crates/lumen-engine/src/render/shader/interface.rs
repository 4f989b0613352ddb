use std::collections::BTreeMap;

use naga::{AddressSpace, Binding, Handle, ImageClass, ImageDimension, ScalarKind, Type, TypeInner};

use super::{CompiledStage, ShaderError, StageKind};

/// Scalar type of a uniform member, as seen by the by-name setters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    F32,
    I32,
    U32,
    /// Vectors, matrices, arrays, nested structs. Present in the block but
    /// not settable through the scalar setters.
    Other,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    /// Byte offset inside the block.
    pub offset: u32,
    pub ty: UniformType,
}

/// Layout of the program's uniform block.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UniformLayout {
    /// Buffer size in bytes, a multiple of 16.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformLayout {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BindingKind {
    Uniform(UniformLayout),
    /// `texture_2d<f32>`
    Texture,
    /// Filtering `sampler`
    Sampler,
}

/// One `@group(0) @binding(n)` resource of a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingSlot {
    /// Global variable name in the WGSL source.
    pub name: String,
    pub binding: u32,
    pub kind: BindingKind,
    /// Stages that declare the resource.
    pub visibility: wgpu::ShaderStages,
}

/// Result of linking a vertex and a fragment stage.
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    vertex_entry: String,
    fragment_entry: String,
    /// Scalar kind read at each vertex input `@location`.
    vertex_inputs: BTreeMap<u32, ScalarKind>,
    /// Sorted by binding index.
    slots: Vec<BindingSlot>,
}

impl ProgramInterface {
    /// Checks that `vertex` and `fragment` fit together and merges their
    /// resource bindings.
    pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<Self, ShaderError> {
        if vertex.kind != StageKind::Vertex || fragment.kind != StageKind::Fragment {
            return Err(ShaderError::link("expected a vertex stage followed by a fragment stage"));
        }

        check_varyings(vertex, fragment)?;

        let mut merged: BTreeMap<u32, BindingSlot> = BTreeMap::new();
        for slot in reflect_bindings(vertex)?.into_iter().chain(reflect_bindings(fragment)?) {
            match merged.get_mut(&slot.binding) {
                None => {
                    merged.insert(slot.binding, slot);
                }
                Some(existing) => {
                    if existing.kind != slot.kind || existing.name != slot.name {
                        return Err(ShaderError::link(format!(
                            "@binding({}) is declared differently in the vertex and fragment stages \
                             (`{}` vs `{}`)",
                            slot.binding, existing.name, slot.name
                        )));
                    }
                    existing.visibility |= slot.visibility;
                }
            }
        }

        let slots: Vec<BindingSlot> = merged.into_values().collect();

        let uniform_blocks = slots
            .iter()
            .filter(|s| matches!(s.kind, BindingKind::Uniform(_)))
            .count();
        if uniform_blocks > 1 {
            return Err(ShaderError::link(format!(
                "a program may declare one uniform block, found {uniform_blocks}"
            )));
        }

        Ok(Self {
            vertex_entry: vertex.entry_name().to_string(),
            fragment_entry: fragment.entry_name().to_string(),
            vertex_inputs: vertex_inputs(vertex),
            slots,
        })
    }

    /// Compiles both sources and links them. No GPU involved.
    pub fn from_sources(vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        let vertex = super::compile(StageKind::Vertex, vertex_src)?;
        let fragment = super::compile(StageKind::Fragment, fragment_src)?;
        Self::link(&vertex, &fragment)
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    pub fn slots(&self) -> &[BindingSlot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&BindingSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// The uniform block, if the program declares one.
    pub fn uniform_layout(&self) -> Option<&UniformLayout> {
        self.slots.iter().find_map(|s| match &s.kind {
            BindingKind::Uniform(layout) => Some(layout),
            _ => None,
        })
    }

    /// Checks that `buffers` supply every `@location` the vertex entry point
    /// reads, with a format of the same scalar kind.
    pub fn check_vertex_buffers(&self, buffers: &[wgpu::VertexBufferLayout<'_>]) -> Result<(), ShaderError> {
        let supplied: BTreeMap<u32, wgpu::VertexFormat> = buffers
            .iter()
            .flat_map(|b| b.attributes.iter())
            .map(|a| (a.shader_location, a.format))
            .collect();

        for (&location, &kind) in &self.vertex_inputs {
            let Some(&format) = supplied.get(&location) else {
                return Err(ShaderError::link(format!(
                    "vertex input @location({location}) is not supplied by any vertex buffer"
                )));
            };
            if format_scalar_kind(format) != kind {
                return Err(ShaderError::link(format!(
                    "vertex input @location({location}) reads {kind:?} data but its buffer supplies {format:?}"
                )));
            }
        }

        Ok(())
    }

    /// The sampler paired with texture `texture`: a sampler named
    /// `<texture>_sampler`, else the only sampler in the program.
    pub fn sampler_for(&self, texture: &str) -> Option<&BindingSlot> {
        let wanted = format!("{texture}_sampler");
        let samplers: Vec<&BindingSlot> = self
            .slots
            .iter()
            .filter(|s| s.kind == BindingKind::Sampler)
            .collect();

        if let Some(named) = samplers.iter().copied().find(|s| s.name == wanted) {
            return Some(named);
        }

        match samplers.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

// ── varyings ──────────────────────────────────────────────────────────────

fn check_varyings(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<(), ShaderError> {
    let mut outputs = BTreeMap::new();
    if let Some(result) = &vertex.entry_point().function.result {
        collect_locations(&vertex.module, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = BTreeMap::new();
    for arg in &fragment.entry_point().function.arguments {
        collect_locations(&fragment.module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for (location, input_ty) in &inputs {
        match outputs.get(location) {
            None => {
                return Err(ShaderError::link(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
            Some(output_ty) if output_ty != input_ty => {
                return Err(ShaderError::link(format!(
                    "@location({location}) has type {output_ty:?} in the vertex stage \
                     but {input_ty:?} in the fragment stage"
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn vertex_inputs(vertex: &CompiledStage) -> BTreeMap<u32, ScalarKind> {
    let mut inputs = BTreeMap::new();
    for arg in &vertex.entry_point().function.arguments {
        collect_locations(&vertex.module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    inputs
        .into_iter()
        .filter_map(|(location, inner)| match inner {
            TypeInner::Scalar(s) | TypeInner::Vector { scalar: s, .. } => Some((location, s.kind)),
            _ => None,
        })
        .collect()
}

fn format_scalar_kind(format: wgpu::VertexFormat) -> ScalarKind {
    use wgpu::VertexFormat as F;

    match format {
        F::Uint8 | F::Uint8x2 | F::Uint8x4 | F::Uint16 | F::Uint16x2 | F::Uint16x4 | F::Uint32
        | F::Uint32x2 | F::Uint32x3 | F::Uint32x4 => ScalarKind::Uint,
        F::Sint8 | F::Sint8x2 | F::Sint8x4 | F::Sint16 | F::Sint16x2 | F::Sint16x4 | F::Sint32
        | F::Sint32x2 | F::Sint32x3 | F::Sint32x4 => ScalarKind::Sint,
        // Normalized, half, single and double precision formats.
        _ => ScalarKind::Float,
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut BTreeMap<u32, TypeInner>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

// ── resource bindings ─────────────────────────────────────────────────────

fn reflect_bindings(stage: &CompiledStage) -> Result<Vec<BindingSlot>, ShaderError> {
    let module = &stage.module;
    let mut slots = Vec::new();

    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let name = var.name.clone().unwrap_or_default();

        if rb.group != 0 {
            return Err(ShaderError::link(format!(
                "`{name}` uses @group({}); only @group(0) is supported",
                rb.group
            )));
        }

        let inner = &module.types[var.ty].inner;
        let kind = match (var.space, inner) {
            (AddressSpace::Uniform, _) => BindingKind::Uniform(uniform_layout(module, &name, var.ty)),
            (
                AddressSpace::Handle,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled { kind: ScalarKind::Float, multi: false },
                },
            ) => BindingKind::Texture,
            (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => BindingKind::Sampler,
            _ => {
                return Err(ShaderError::link(format!(
                    "`{name}` at @binding({}) has an unsupported resource type \
                     (supported: uniform buffers, texture_2d<f32>, sampler)",
                    rb.binding
                )));
            }
        };

        slots.push(BindingSlot {
            name,
            binding: rb.binding,
            kind,
            visibility: stage.kind.visibility(),
        });
    }

    Ok(slots)
}

fn uniform_layout(module: &naga::Module, var_name: &str, ty: Handle<Type>) -> UniformLayout {
    let inner = &module.types[ty].inner;

    let (members, size) = match inner {
        TypeInner::Struct { members, span } => {
            let members = members
                .iter()
                .map(|m| UniformMember {
                    name: m.name.clone().unwrap_or_default(),
                    offset: m.offset,
                    ty: scalar_type(&module.types[m.ty].inner),
                })
                .collect();
            (members, *span)
        }
        // A bare `var<uniform> x: f32` is a block with one member named after
        // the variable.
        other => {
            let member = UniformMember {
                name: var_name.to_string(),
                offset: 0,
                ty: scalar_type(other),
            };
            (vec![member], other.size(module.to_ctx()))
        }
    };

    UniformLayout {
        size: size.max(4).next_multiple_of(16),
        members,
    }
}

fn scalar_type(inner: &TypeInner) -> UniformType {
    match inner {
        TypeInner::Scalar(s) if s.width == 4 => match s.kind {
            ScalarKind::Float => UniformType::F32,
            ScalarKind::Sint => UniformType::I32,
            ScalarKind::Uint => UniformType::U32,
            _ => UniformType::Other,
        },
        _ => UniformType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS_COLOR: &str = r#"
struct Params {
    blend: f32,
    tiles: i32,
    show_texture: u32,
    tint: vec4<f32>,
};

@group(0) @binding(0) var<uniform> params: Params;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) color: vec3<f32>) -> VsOut {
    var v: VsOut;
    v.clip = vec4<f32>(pos, 1.0);
    v.color = color * params.blend;
    v.uv = pos.xy * f32(params.tiles);
    return v;
}
"#;

    const FS_TEXTURED: &str = r#"
struct Params {
    blend: f32,
    tiles: i32,
    show_texture: u32,
    tint: vec4<f32>,
};

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var diffuse: texture_2d<f32>;
@group(0) @binding(2) var diffuse_sampler: sampler;

@fragment
fn fs_main(@location(0) color: vec3<f32>, @location(1) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let texel = textureSample(diffuse, diffuse_sampler, uv);
    return select(vec4<f32>(color, 1.0), texel, params.show_texture != 0u);
}
"#;

    fn link(vs: &str, fs: &str) -> Result<ProgramInterface, ShaderError> {
        ProgramInterface::from_sources(vs, fs)
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn links_matching_stages() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();
        assert_eq!(p.vertex_entry(), "vs_main");
        assert_eq!(p.fragment_entry(), "fs_main");

        let bindings: Vec<_> = p.slots().iter().map(|s| (s.binding, s.name.as_str())).collect();
        assert_eq!(bindings, vec![(0, "params"), (1, "diffuse"), (2, "diffuse_sampler")]);
    }

    #[test]
    fn shared_uniform_is_visible_to_both_stages() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();
        let params = p.slot("params").unwrap();
        assert_eq!(params.visibility, wgpu::ShaderStages::VERTEX_FRAGMENT);
        assert_eq!(p.slot("diffuse").unwrap().visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn unwritten_fragment_input_fails_to_link() {
        let vs = r#"
@vertex
fn main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}
"#;
        let fs = r#"
@fragment
fn main(@location(3) c: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(c, 1.0);
}
"#;
        let err = link(vs, fs).unwrap_err();
        assert!(err.to_string().contains("@location(3)"), "{err}");
    }

    #[test]
    fn varying_type_mismatch_fails_to_link() {
        let vs = r#"
struct O { @builtin(position) p: vec4<f32>, @location(0) c: vec4<f32> };
@vertex
fn main() -> O {
    return O(vec4<f32>(0.0), vec4<f32>(1.0));
}
"#;
        let fs = r#"
@fragment
fn main(@location(0) c: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(c, 1.0);
}
"#;
        assert!(matches!(link(vs, fs), Err(ShaderError::Link(_))));
    }

    #[test]
    fn conflicting_uniform_blocks_fail_to_link() {
        let fs = FS_TEXTURED.replace("tiles: i32", "tiles: f32");
        let err = link(VS_COLOR, &fs).unwrap_err();
        assert!(err.to_string().contains("@binding(0)"), "{err}");
    }

    #[test]
    fn non_zero_group_is_rejected() {
        let fs = FS_TEXTURED.replace("@group(0) @binding(2)", "@group(1) @binding(0)");
        let err = link(VS_COLOR, &fs).unwrap_err();
        assert!(err.to_string().contains("@group(1)"), "{err}");
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn reflects_uniform_members_and_offsets() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();
        let layout = p.uniform_layout().unwrap();

        let members: Vec<_> = layout
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.offset, m.ty))
            .collect();
        assert_eq!(
            members,
            vec![
                ("blend", 0, UniformType::F32),
                ("tiles", 4, UniformType::I32),
                ("show_texture", 8, UniformType::U32),
                ("tint", 16, UniformType::Other),
            ]
        );
        assert_eq!(layout.size, 32);
    }

    #[test]
    fn bare_scalar_uniform_is_a_one_member_block() {
        let vs = r#"
@group(0) @binding(0) var<uniform> scale: f32;
@vertex
fn main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos * scale, 1.0);
}
"#;
        let fs = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let p = link(vs, fs).unwrap();
        let layout = p.uniform_layout().unwrap();
        assert_eq!(layout.size, 16);
        assert_eq!(layout.member("scale").map(|m| m.ty), Some(UniformType::F32));
    }

    #[test]
    fn program_without_resources_has_no_slots() {
        let vs = r#"
@vertex
fn main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}
"#;
        let fs = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.2, 1.0);
}
"#;
        let p = link(vs, fs).unwrap();
        assert!(p.slots().is_empty());
        assert!(p.uniform_layout().is_none());
    }

    // ── vertex buffers ────────────────────────────────────────────────────

    #[test]
    fn vertex_buffers_must_supply_every_input() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();

        let attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        let full = wgpu::VertexBufferLayout {
            array_stride: 24,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attrs,
        };
        assert!(p.check_vertex_buffers(&[full.clone()]).is_ok());

        let err = p.check_vertex_buffers(&[]).unwrap_err();
        assert!(err.to_string().contains("@location(0)"), "{err}");

        let partial = wgpu::VertexBufferLayout {
            attributes: &attrs[..1],
            ..full
        };
        let err = p.check_vertex_buffers(&[partial]).unwrap_err();
        assert!(err.to_string().contains("@location(1)"), "{err}");
    }

    #[test]
    fn vertex_format_kind_must_match_input() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();

        let attrs = wgpu::vertex_attr_array![0 => Uint32x3, 1 => Float32x3];
        let layout = wgpu::VertexBufferLayout {
            array_stride: 24,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attrs,
        };
        assert!(matches!(p.check_vertex_buffers(&[layout]), Err(ShaderError::Link(_))));

        // Component counts may differ; only the scalar kind has to agree.
        let attrs = wgpu::vertex_attr_array![0 => Float32x2, 1 => Unorm8x4];
        let layout = wgpu::VertexBufferLayout {
            array_stride: 12,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attrs,
        };
        assert!(p.check_vertex_buffers(&[layout]).is_ok());
    }

    #[test]
    fn sampler_lookup_prefers_named_sampler() {
        let p = link(VS_COLOR, FS_TEXTURED).unwrap();
        assert_eq!(p.sampler_for("diffuse").map(|s| s.binding), Some(2));
        // Only one sampler in the program, so any texture name resolves to it.
        assert_eq!(p.sampler_for("other").map(|s| s.binding), Some(2));
    }
}
