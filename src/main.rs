use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use displayboard::{peripherals, Cli, Config, Interrupt, ShutdownCoordinator, Subscribe};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides --debug/--verbose.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level().to_string().to_lowercase().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let workers = cli.to_worker_config();
    tracing::info!(
        sounds = workers.sounds_enabled,
        lighting = workers.lighting_enabled,
        bell = workers.bell_enabled,
        video = workers.video_enabled,
        test_exit = workers.exit_after_start,
        "displayboard starting"
    );

    let interrupt = match Interrupt::from_os_signals() {
        Ok(interrupt) => interrupt,
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for OS signals; only internal stops apply");
            Interrupt::new()
        }
    };

    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(displayboard::LogWriter::new())];
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    let coordinator = ShutdownCoordinator::builder(Config::default())
        .with_subscribers(subs)
        .with_interrupt(interrupt)
        .build(peripherals::default_subsystems(cli.to_video_config()));

    let code = coordinator.run(workers).await;
    tracing::info!(code, "displayboard exiting");
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
