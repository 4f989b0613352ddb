use lumen_engine::render::{Mesh, PipelineDesc, PositionVertex, RenderCtx, Shader, Vertex};

const VERTEX_SHADER: &str = r#"
@vertex
fn vs_main(@location(0) a_pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_pos.x, a_pos.y, a_pos.z, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.2, 1.0);
}
"#;

const VERTICES: [PositionVertex; 3] = [
    PositionVertex::new(-0.5, -0.5, 0.0),
    PositionVertex::new(0.5, -0.5, 0.0),
    PositionVertex::new(0.0, 0.5, 0.0),
];

/// GPU resources of the triangle demo.
///
/// Fields drop in declaration order: the vertex buffer is released before the
/// program.
pub struct TriangleScene {
    mesh: Mesh,
    /// `None` if the program failed to build; the window is then only cleared.
    shader: Option<Shader>,
}

impl TriangleScene {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let layouts = [PositionVertex::layout()];
        let shader = Shader::from_sources(
            ctx,
            VERTEX_SHADER,
            FRAGMENT_SHADER,
            &PipelineDesc::new("triangle", &layouts),
        )
        .ok();

        if let Some(shader) = &shader {
            log::info!("triangle program {} ready", shader.id());
        }

        Self {
            mesh: Mesh::new(ctx, "triangle", &VERTICES),
            shader,
        }
    }

    pub fn draw(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) {
        let Some(shader) = self.shader.as_mut() else {
            return;
        };

        shader.activate(ctx, pass);
        self.mesh.draw(pass);
    }
}
