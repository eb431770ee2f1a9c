//! # Zone Console
//!
//! An operator console for a real-time positioning deployment. The console
//! performs no positioning math itself; it configures and observes a
//! positioning backend over a small JSON HTTP API:
//! - **Configuration**: load/edit/save of the backend's nested document,
//!   including a variable-length geofence polygon editor
//! - **Map**: world-space anchors, geofence and the selected tag drawn on a
//!   fixed-size surface, refreshed on a 1 s tick
//! - **Dashboard**: 2 s status polling with per-node heartbeat freshness
//!   classification (online / stale / no HB)
//!
//! The binary logs through `env_logger`; point it at a backend with
//! `zone-console http://host:8000`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod constants;
pub mod reconciler;
pub mod scene;
pub mod shape;
pub mod tasks;
pub mod transform;
pub mod types;
mod ui;

pub use ui::{ConsoleApp, Page, UiPrefs};

/// Runs the console application.
///
/// Restores persisted UI preferences, applies the optional base-URL
/// override and starts the egui event loop.
///
/// # Arguments
///
/// * `base_url_override` - backend URL from the command line, if given
///
/// # Returns
///
/// Returns `Ok(())` when the window closes normally, or an `eframe::Error`
/// if initialization fails.
pub fn run_app(base_url_override: Option<String>) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Zone Console",
        options,
        Box::new(move |cc| {
            let mut prefs: UiPrefs = cc
                .storage
                .and_then(|storage| storage.get_string(ui::PREFS_STORAGE_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();
            if let Some(url) = base_url_override {
                prefs.base_url = url;
            }
            Ok(Box::new(ConsoleApp::new(prefs, cc.egui_ctx.clone())))
        }),
    )
}
