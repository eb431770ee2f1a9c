//! Background tasks: periodic pollers and one-shot backend operations.
//!
//! All network work runs on the app-owned tokio runtime and reports back to
//! the UI thread through `std::sync::mpsc` channels that the update loop
//! drains each frame. The two periodic tasks are driven by wall-clock
//! `tokio::time::interval` timers; each tick spawns its request as its own
//! task, so a slow response never delays the next tick. Requests in flight
//! when a task is stopped are abandoned silently.

use std::sync::mpsc::Sender;

use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::client::{ApiClient, ApiError, LoginReply};
use crate::constants::{MAP_TICK_PERIOD, STATUS_POLL_PERIOD};
use crate::types::{Anchor, MapSnapshot, StatusSnapshot, TagMeta, TagPosition};

/// Outcome of a configuration load or save, delivered to the UI thread.
#[derive(Debug)]
pub enum ConfigEvent {
    /// `GET /api/config` finished.
    Loaded(Result<Value, ApiError>),
    /// `PATCH /api/config` finished; carries the document that was sent so
    /// a success can promote it to the new baseline without a re-fetch.
    Saved {
        /// The merged document that was PATCHed.
        document: Value,
        /// Save outcome.
        result: Result<(), ApiError>,
    },
}

/// The latest map-tick result: the selected tag's id and position when the
/// fetch succeeded, `None` otherwise (no marker for that tick).
pub type TagTick = Option<(String, TagPosition)>;

/// Handle to a running periodic task.
///
/// Stopping (or dropping) the handle aborts the task; no further ticks
/// fire and any in-flight request is abandoned.
#[derive(Debug)]
pub struct PollTask {
    handle: tokio::task::JoinHandle<()>,
}

impl PollTask {
    /// Stops the task. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts the system-status poller.
///
/// Polls `GET /api/status` on a fixed wall-clock schedule and delivers
/// every result (success or failure) to `tx`.
pub fn start_status_poller(
    rt: &Runtime,
    client: ApiClient,
    tx: Sender<Result<StatusSnapshot, ApiError>>,
    ctx: egui::Context,
) -> PollTask {
    let handle = rt.spawn(async move {
        let mut ticker = interval(STATUS_POLL_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let client = client.clone();
            let tx = tx.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let result = client.fetch_status().await;
                if let Err(err) = &result {
                    log::warn!("status poll failed: {err}");
                }
                if tx.send(result).is_ok() {
                    ctx.request_repaint();
                }
            });
        }
    });
    PollTask { handle }
}

/// Starts the map tick that refreshes the selected tag's position.
///
/// The current selection is read from the watch cell at each tick, so a
/// selection change takes effect on the next tick, not retroactively. A
/// failed or empty position fetch delivers `None`, clearing the marker.
pub fn start_map_ticker(
    rt: &Runtime,
    client: ApiClient,
    selection: watch::Receiver<Option<String>>,
    tx: Sender<TagTick>,
    ctx: egui::Context,
) -> PollTask {
    let handle = rt.spawn(async move {
        let mut ticker = interval(MAP_TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let selected = selection.borrow().clone();
            let client = client.clone();
            let tx = tx.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let tick: TagTick = match selected {
                    Some(tag_id) => match client.fetch_position(&tag_id).await {
                        Ok(Some(position)) => Some((tag_id, position)),
                        Ok(None) | Err(_) => None,
                    },
                    None => None,
                };
                if tx.send(tick).is_ok() {
                    ctx.request_repaint();
                }
            });
        }
    });
    PollTask { handle }
}

/// Fetches the configuration document once.
pub fn load_config(rt: &Runtime, client: ApiClient, tx: Sender<ConfigEvent>, ctx: egui::Context) {
    rt.spawn(async move {
        let result = client.fetch_config().await;
        if let Err(err) = &result {
            log::warn!("config load failed: {err}");
        }
        if tx.send(ConfigEvent::Loaded(result)).is_ok() {
            ctx.request_repaint();
        }
    });
}

/// PATCHes a merged configuration document once.
pub fn save_config(
    rt: &Runtime,
    client: ApiClient,
    document: Value,
    tx: Sender<ConfigEvent>,
    ctx: egui::Context,
) {
    rt.spawn(async move {
        let result = client.save_config(&document).await;
        match &result {
            Ok(()) => log::info!("configuration saved"),
            Err(err) => log::warn!("config save failed: {err}"),
        }
        if tx.send(ConfigEvent::Saved { document, result }).is_ok() {
            ctx.request_repaint();
        }
    });
}

/// Fetches the anchor list once.
pub fn load_anchors(
    rt: &Runtime,
    client: ApiClient,
    tx: Sender<Result<Vec<Anchor>, ApiError>>,
    ctx: egui::Context,
) {
    rt.spawn(async move {
        let result = client.fetch_anchors().await;
        if tx.send(result).is_ok() {
            ctx.request_repaint();
        }
    });
}

/// Fetches the map snapshot once.
pub fn load_map(
    rt: &Runtime,
    client: ApiClient,
    tx: Sender<Result<MapSnapshot, ApiError>>,
    ctx: egui::Context,
) {
    rt.spawn(async move {
        let result = client.fetch_map().await;
        if tx.send(result).is_ok() {
            ctx.request_repaint();
        }
    });
}

/// Fetches the tag list once.
pub fn load_tags(
    rt: &Runtime,
    client: ApiClient,
    tx: Sender<Result<Vec<TagMeta>, ApiError>>,
    ctx: egui::Context,
) {
    rt.spawn(async move {
        let result = client.fetch_tags().await;
        if tx.send(result).is_ok() {
            ctx.request_repaint();
        }
    });
}

/// Attempts a login once.
pub fn login(
    rt: &Runtime,
    client: ApiClient,
    username: String,
    password: String,
    tx: Sender<Result<LoginReply, ApiError>>,
    ctx: egui::Context,
) {
    rt.spawn(async move {
        let result = client.login(&username, &password).await;
        if tx.send(result).is_ok() {
            ctx.request_repaint();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn test_runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime")
    }

    #[test]
    fn poll_task_stop_is_idempotent() {
        let rt = test_runtime();
        let (tx, _rx) = channel();
        let task = start_status_poller(
            &rt,
            ApiClient::new("http://127.0.0.1:1"),
            tx,
            egui::Context::default(),
        );
        task.stop();
        task.stop();
    }

    #[test]
    fn dropping_a_poll_task_stops_it() {
        let rt = test_runtime();
        let (tx, rx) = channel();
        let (_sel_tx, sel_rx) = watch::channel(None);
        let task = start_map_ticker(
            &rt,
            ApiClient::new("http://127.0.0.1:1"),
            sel_rx,
            tx,
            egui::Context::default(),
        );
        drop(task);
        // The sender side is gone once the task is aborted; the channel
        // eventually disconnects instead of accumulating ticks forever.
        drop(rx);
    }
}
