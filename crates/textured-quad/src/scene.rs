use std::path::{Path, PathBuf};

use lumen_engine::render::{
    Mesh, PipelineDesc, RenderCtx, Shader, Texture, TextureOptions, TexturedVertex, Vertex,
};

const MAX_TILES: i32 = 4;

//                              position            color            uv
const VERTICES: [TexturedVertex; 4] = [
    TexturedVertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0]), // top right
    TexturedVertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]), // bottom right
    TexturedVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]), // bottom left
    TexturedVertex::new([-0.5, 0.5, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0]), // top left
];

const INDICES: [u32; 6] = [
    0, 1, 3, // first triangle
    1, 2, 3, // second triangle
];

fn crate_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Values fed to the program's uniform block every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadParams {
    pub show_texture: bool,
    pub tiles: i32,
    /// Weight of the vertex colours in the final tint, 0..=1.
    pub blend: f32,
}

impl Default for QuadParams {
    fn default() -> Self {
        Self { show_texture: true, tiles: 1, blend: 1.0 }
    }
}

impl QuadParams {
    pub fn increase_tiles(&mut self) {
        self.tiles = (self.tiles + 1).min(MAX_TILES);
    }

    pub fn decrease_tiles(&mut self) {
        self.tiles = (self.tiles - 1).max(1);
    }

    /// Pulses the vertex-colour blend with a two-second period.
    pub fn animate(&mut self, elapsed: f32) {
        self.blend = 0.5 + 0.5 * (elapsed * std::f32::consts::PI).cos();
    }
}

/// GPU resources of the quad demo. Fields drop in declaration order.
///
/// The texture is owned by the program's bind group once bound.
pub struct QuadScene {
    mesh: Mesh,
    shader: Option<Shader>,
}

impl QuadScene {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let layouts = [TexturedVertex::layout()];
        let mut shader = Shader::from_files(
            ctx,
            crate_path("shaders/shader.vert.wgsl"),
            crate_path("shaders/shader.frag.wgsl"),
            &PipelineDesc::new("textured quad", &layouts),
        )
        .ok();

        let texture = match Texture::from_path(ctx, crate_path("assets/container.png"), &TextureOptions::default()) {
            Ok(texture) => {
                log::info!(
                    "loaded texture {}x{} ({} mip levels)",
                    texture.width(),
                    texture.height(),
                    texture.mip_level_count()
                );
                texture
            }
            Err(err) => {
                log::error!("failed to load texture: {err:#}");
                Texture::placeholder(ctx)
            }
        };

        if let Some(shader) = shader.as_mut() {
            shader.bind_texture(ctx, "diffuse", &texture);
            log::info!("quad program {} ready", shader.id());
        }

        Self {
            mesh: Mesh::indexed(ctx, "quad", &VERTICES, &INDICES),
            shader,
        }
    }

    pub fn draw(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>, params: &QuadParams) {
        let Some(shader) = self.shader.as_mut() else {
            return;
        };

        shader.set_bool("show_texture", params.show_texture);
        shader.set_int("tiles", params.tiles);
        shader.set_float("blend", params.blend);

        shader.activate(ctx, pass);
        self.mesh.draw(pass);
    }
}
