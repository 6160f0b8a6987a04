//! Rusty-Signer: desktop confirmation surface for pending transaction requests

use eframe::egui;
use eyre::WrapErr;

use rusty_signer_adapters::SignerAdapterConfig;

mod app;
mod bridge;
mod confirm_view;
mod demo;
mod qr_view;
mod requests_view;
mod state;
mod ui;

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = SignerAdapterConfig::from_env();
    tracing::info!(offline = config.is_offline(), "Starting Rusty-Signer");

    let bridge = bridge::SignerBridge::from_config(&config).wrap_err("signer setup failed")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Rusty-Signer")
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([700.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty-Signer",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, bridge)))),
    )
    .map_err(|e| eyre::eyre!("ui exited with an error: {e}"))
}
