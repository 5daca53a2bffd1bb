mod app;

use anyhow::Context;
use app::UiApp;
use eframe::{NativeOptions, egui};
use neuroscan_core::{AppConfig, FileSessionStore, MemorySessionStore, SessionStore};

fn main() {
    tracing_subscriber::fmt::init();

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{e:#}");
            AppConfig::default()
        }
    };
    let store = session_store(&config);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 860.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    let title = format!("NeuroScan {}", env!("NEUROSCAN_VERSION"));
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(|_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(config, store)))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let Some(path) = AppConfig::default_path() else {
        return Ok(AppConfig::default());
    };
    let cfg = AppConfig::load(&path).context("loading settings")?;
    tracing::info!("Settings from {}", path.display());
    Ok(cfg)
}

fn session_store(config: &AppConfig) -> Box<dyn SessionStore> {
    if let Some(path) = &config.session_file {
        return Box::new(FileSessionStore::new(path));
    }
    match FileSessionStore::in_data_dir() {
        Some(store) => {
            tracing::debug!("Session marker at {}", store.path().display());
            Box::new(store)
        }
        None => {
            tracing::warn!("No data directory, sessions will not persist");
            Box::new(MemorySessionStore::default())
        }
    }
}
