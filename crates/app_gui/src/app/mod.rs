//! eframe application shell: routing between the login and upload views.

mod login;
mod upload;

use eframe::{App, Frame, egui};
use neuroscan_core::{AppConfig, Route, SessionStore, UploadPage};

pub(crate) struct UiApp {
    store: Box<dyn SessionStore>,
    route: Route,
    /// Navigation requests raised while rendering, applied between frames.
    pending: Vec<Route>,
    page: UploadPage,
    /// Texture for the current preview, keyed by preview id.
    preview_texture: Option<(u64, egui::TextureHandle)>,
    login_name: String,
    status: String,
}

impl UiApp {
    pub(crate) fn new(config: AppConfig, store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            route: Route::Upload,
            pending: Vec::new(),
            page: UploadPage::from_config(&config),
            preview_texture: None,
            login_name: String::new(),
            status: String::new(),
        }
    }

    fn apply_navigation(&mut self) {
        for route in std::mem::take(&mut self.pending) {
            if route == self.route {
                continue;
            }
            tracing::debug!("{} -> {}", self.route.path(), route.path());
            if self.route == Route::Upload {
                self.page.unmount();
                self.preview_texture = None;
            }
            self.route = route;
        }
    }

    fn sign_out(&mut self) {
        match self.store.sign_out() {
            Ok(()) => {
                self.status.clear();
                self.pending.push(Route::Login);
            }
            Err(e) => self.status = format!("Sign out failed: {e}"),
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.route == Route::Upload {
            self.page.mount(self.store.as_ref(), &mut self.pending);
            self.apply_navigation();
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("NeuroScan");
                ui.label(env!("NEUROSCAN_VERSION"));
                if self.route == Route::Upload && ui.button("Sign out").clicked() {
                    self.sign_out();
                }
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.route {
            Route::Login => self.render_login(ui),
            Route::Upload => self.render_upload(ctx, ui),
        });

        self.apply_navigation();
    }
}
