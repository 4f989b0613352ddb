use std::sync::Once;

/// Modules whose info-level output drowns the application's own logs.
const NOISY_GPU_MODULES: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "wgpu"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "lumen_engine=debug,wgpu_core=warn"). When unset, `RUST_LOG` is consulted,
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,

    /// Caps the GPU backend crates at `warn` unless a filter says otherwise.
    pub quiet_gpu_backends: bool,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            quiet_gpu_backends: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. Call early in `main`.
/// Output goes to standard error.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if config.quiet_gpu_backends {
            for module in NOISY_GPU_MODULES {
                builder.filter_module(module, log::LevelFilter::Warn);
            }
        }

        // Explicit directives come last so they override the defaults above.
        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);
        builder.target(env_logger::Target::Stderr);

        if builder.try_init().is_err() {
            // Another logger was installed first (tests, embedding hosts).
            return;
        }

        log::debug!("logging initialized");
    });
}
