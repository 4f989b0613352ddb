//! Vertex-coloured, textured quad.
//!
//! Controls: Escape closes the window, Space toggles the texture, Up/Down
//! change how often the texture repeats across the quad.

mod scene;

use winit::dpi::LogicalSize;

use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::device::GpuInit;
use lumen_engine::input::Key;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::render::Color;
use lumen_engine::window::{Runtime, RuntimeConfig};

use scene::{QuadParams, QuadScene};

const SCR_WIDTH: f64 = 800.0;
const SCR_HEIGHT: f64 = 600.0;

const CLEAR_COLOR: Color = Color::rgb(0.2, 0.3, 0.3);

#[derive(Default)]
struct TexturedQuad {
    params: QuadParams,
    scene: Option<QuadScene>,
}

impl TexturedQuad {
    fn process_input(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        if ctx.input.key_down(Key::Escape) {
            ctx.close_window();
        }

        let pressed = ctx.input_frame;
        if pressed.pressed(Key::Space) {
            self.params.show_texture = !self.params.show_texture;
            log::info!("texture {}", if self.params.show_texture { "on" } else { "off" });
        }
        if pressed.pressed(Key::ArrowUp) {
            self.params.increase_tiles();
        }
        if pressed.pressed(Key::ArrowDown) {
            self.params.decrease_tiles();
        }
    }
}

impl App for TexturedQuad {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.process_input(ctx);
        self.params.animate(ctx.time.elapsed);

        let params = &self.params;
        let scene = &mut self.scene;
        ctx.render(CLEAR_COLOR, |rctx, pass| {
            scene
                .get_or_insert_with(|| QuadScene::new(rctx))
                .draw(rctx, pass, params);
        })
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "textured-quad".to_string(),
        initial_size: LogicalSize::new(SCR_WIDTH, SCR_HEIGHT),
        ..RuntimeConfig::default()
    };

    if let Err(err) = Runtime::run(config, GpuInit::default(), TexturedQuad::default()) {
        log::error!("{err:#}");
        std::process::exit(-1);
    }
}
