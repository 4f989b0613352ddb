//! Orange triangle on a slate background.

mod scene;

use winit::dpi::LogicalSize;

use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::device::GpuInit;
use lumen_engine::input::Key;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::render::Color;
use lumen_engine::window::{Runtime, RuntimeConfig};

use scene::TriangleScene;

const SCR_WIDTH: f64 = 800.0;
const SCR_HEIGHT: f64 = 600.0;

const CLEAR_COLOR: Color = Color::rgb(0.3, 0.3, 0.4);

#[derive(Default)]
struct HelloTriangle {
    /// Created on the first frame, once a device exists.
    scene: Option<TriangleScene>,
}

impl App for HelloTriangle {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_down(Key::Escape) {
            ctx.close_window();
            return AppControl::Continue;
        }

        let scene = &mut self.scene;
        ctx.render(CLEAR_COLOR, |rctx, pass| {
            scene
                .get_or_insert_with(|| TriangleScene::new(rctx))
                .draw(rctx, pass);
        })
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "hello-triangle".to_string(),
        initial_size: LogicalSize::new(SCR_WIDTH, SCR_HEIGHT),
        ..RuntimeConfig::default()
    };

    if let Err(err) = Runtime::run(config, GpuInit::default(), HelloTriangle::default()) {
        log::error!("{err:#}");
        std::process::exit(-1);
    }
}
