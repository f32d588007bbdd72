mod app;

use app::UploaderPlayground;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let runtime = Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "File Uploader Playground",
        options,
        Box::new(move |cc| Box::new(UploaderPlayground::new(cc, runtime))),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
