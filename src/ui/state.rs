//! Application state structures.
//!
//! All mutable console state lives on [`ConsoleApp`]; there are no module
//! globals. The [`Backend`] owns the tokio runtime, the API client and the
//! channels that background tasks report through; the update loop drains
//! them once per frame via [`ConsoleApp::process_backend_events`].

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::client::{ApiClient, ApiError, LoginReply};
use crate::config::{ConfigForm, ConfigModel};
use crate::constants::DEFAULT_BASE_URL;
use crate::reconciler::LiveState;
use crate::tasks::{self, ConfigEvent, PollTask, TagTick};
use crate::types::{Anchor, MapSnapshot, Role, StatusSnapshot, TagMeta};

/// The main console views. Which one is shown post-login depends on the
/// operator's role; the tab bar can reach all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Live system status, node list and tag table.
    Dashboard,
    /// Zone map with geofence, anchors and the selected tag.
    Map,
    /// Configuration form and geofence editor.
    Config,
}

impl Role {
    /// The distinct post-login landing view for this role.
    pub fn landing_page(&self) -> Page {
        match self {
            Role::Diag => Page::Dashboard,
            Role::Admin => Page::Map,
            Role::Superuser => Page::Config,
        }
    }
}

/// Login form and session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Granted role; `None` while logged out.
    pub role: Option<Role>,
    /// Username field text.
    pub username: String,
    /// Password field text.
    pub password: String,
    /// Inline login error, shown under the form.
    pub error: Option<String>,
    /// Whether a login request is in flight.
    pub in_flight: bool,
}

/// Outcome line shown next to the save button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// The last save was acknowledged.
    Saved,
    /// The last save failed with the given operator message.
    Failed(String),
}

/// Configuration page state: the baseline model, the editable form and the
/// read-only anchors table.
#[derive(Debug, Clone, Default)]
pub struct ConfigViewState {
    /// Baseline holder; empty until the first successful load.
    pub model: ConfigModel,
    /// The editable form, re-seeded from the baseline on every load.
    pub form: ConfigForm,
    /// Load failure message; while set, the form is not shown.
    pub load_error: Option<String>,
    /// Whether a load request is in flight.
    pub load_in_flight: bool,
    /// Result of the most recent save, if any.
    pub save_status: Option<SaveStatus>,
    /// Whether a save request is in flight.
    pub save_in_flight: bool,
    /// Read-only anchor list for the table at the bottom of the page.
    pub anchors: Vec<Anchor>,
    /// Anchor list fetch failure, shown in place of the table.
    pub anchors_error: Option<String>,
}

/// Map page state: the independently fetched map snapshot, the session tag
/// list, the operator's selection and the latest tick result.
#[derive(Debug, Clone, Default)]
pub struct MapViewState {
    /// Map snapshot; `None` until the first successful fetch.
    pub snapshot: Option<MapSnapshot>,
    /// Map snapshot fetch failure message.
    pub load_error: Option<String>,
    /// Tag list, fetched once per session.
    pub tags: Vec<TagMeta>,
    /// Currently selected tag id; changes apply on the next tick.
    pub selected_tag: Option<String>,
    /// "Only selected" toggle. Read but not yet acted on; multi-tag
    /// rendering is an extension point.
    pub only_selected: bool,
    /// Latest map-tick result; `None` means no marker this tick.
    pub last_tick: TagTick,
}

/// UI preferences persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPrefs {
    /// Whether dark mode visuals are enabled.
    pub dark_mode: bool,
    /// Backend base URL.
    pub base_url: String,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            dark_mode: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Runtime, client and channel plumbing for all background work.
pub struct Backend {
    runtime: tokio::runtime::Runtime,
    client: ApiClient,
    ctx: egui::Context,

    login_tx: Sender<Result<LoginReply, ApiError>>,
    login_rx: Receiver<Result<LoginReply, ApiError>>,
    config_tx: Sender<ConfigEvent>,
    config_rx: Receiver<ConfigEvent>,
    anchors_tx: Sender<Result<Vec<Anchor>, ApiError>>,
    anchors_rx: Receiver<Result<Vec<Anchor>, ApiError>>,
    map_tx: Sender<Result<MapSnapshot, ApiError>>,
    map_rx: Receiver<Result<MapSnapshot, ApiError>>,
    tags_tx: Sender<Result<Vec<TagMeta>, ApiError>>,
    tags_rx: Receiver<Result<Vec<TagMeta>, ApiError>>,
    status_tx: Sender<Result<StatusSnapshot, ApiError>>,
    status_rx: Receiver<Result<StatusSnapshot, ApiError>>,
    position_tx: Sender<TagTick>,
    position_rx: Receiver<TagTick>,

    selection_tx: watch::Sender<Option<String>>,
    status_task: Option<PollTask>,
    map_task: Option<PollTask>,
}

impl Backend {
    /// Creates the backend plumbing for the given base URL.
    pub fn new(base_url: &str, ctx: egui::Context) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        let (login_tx, login_rx) = channel();
        let (config_tx, config_rx) = channel();
        let (anchors_tx, anchors_rx) = channel();
        let (map_tx, map_rx) = channel();
        let (tags_tx, tags_rx) = channel();
        let (status_tx, status_rx) = channel();
        let (position_tx, position_rx) = channel();
        let (selection_tx, _) = watch::channel(None);

        Self {
            runtime,
            client: ApiClient::new(base_url),
            ctx,
            login_tx,
            login_rx,
            config_tx,
            config_rx,
            anchors_tx,
            anchors_rx,
            map_tx,
            map_rx,
            tags_tx,
            tags_rx,
            status_tx,
            status_rx,
            position_tx,
            position_rx,
            selection_tx,
            status_task: None,
            map_task: None,
        }
    }

    /// The configured API client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Starts the status poller and the map ticker. Idempotent.
    pub fn start_pollers(&mut self) {
        if self.status_task.is_none() {
            self.status_task = Some(tasks::start_status_poller(
                &self.runtime,
                self.client.clone(),
                self.status_tx.clone(),
                self.ctx.clone(),
            ));
        }
        if self.map_task.is_none() {
            self.map_task = Some(tasks::start_map_ticker(
                &self.runtime,
                self.client.clone(),
                self.selection_tx.subscribe(),
                self.position_tx.clone(),
                self.ctx.clone(),
            ));
        }
    }

    /// Stops both periodic tasks.
    pub fn stop_pollers(&mut self) {
        self.status_task = None;
        self.map_task = None;
    }

    /// Publishes the tag selection; the map ticker reads it on its next tick.
    pub fn set_selection(&self, tag_id: Option<String>) {
        self.selection_tx.send_replace(tag_id);
    }

    /// Issues a login request.
    pub fn request_login(&self, username: String, password: String) {
        tasks::login(
            &self.runtime,
            self.client.clone(),
            username,
            password,
            self.login_tx.clone(),
            self.ctx.clone(),
        );
    }

    /// Issues a configuration load.
    pub fn request_config(&self) {
        tasks::load_config(
            &self.runtime,
            self.client.clone(),
            self.config_tx.clone(),
            self.ctx.clone(),
        );
    }

    /// Issues a configuration save with the given merged document.
    pub fn request_save(&self, document: Value) {
        tasks::save_config(
            &self.runtime,
            self.client.clone(),
            document,
            self.config_tx.clone(),
            self.ctx.clone(),
        );
    }

    /// Issues an anchor-list load.
    pub fn request_anchors(&self) {
        tasks::load_anchors(
            &self.runtime,
            self.client.clone(),
            self.anchors_tx.clone(),
            self.ctx.clone(),
        );
    }

    /// Issues a map-snapshot load.
    pub fn request_map(&self) {
        tasks::load_map(
            &self.runtime,
            self.client.clone(),
            self.map_tx.clone(),
            self.ctx.clone(),
        );
    }

    /// Issues a tag-list load.
    pub fn request_tags(&self) {
        tasks::load_tags(
            &self.runtime,
            self.client.clone(),
            self.tags_tx.clone(),
            self.ctx.clone(),
        );
    }
}

#[cfg(test)]
impl Backend {
    pub(crate) fn test_send_login(&self, result: Result<LoginReply, ApiError>) {
        let _ = self.login_tx.send(result);
    }

    pub(crate) fn test_send_config(&self, event: ConfigEvent) {
        let _ = self.config_tx.send(event);
    }

    pub(crate) fn test_send_status(&self, result: Result<StatusSnapshot, ApiError>) {
        let _ = self.status_tx.send(result);
    }

    pub(crate) fn test_send_tags(&self, result: Result<Vec<TagMeta>, ApiError>) {
        let _ = self.tags_tx.send(result);
    }

    pub(crate) fn test_send_map(&self, result: Result<MapSnapshot, ApiError>) {
        let _ = self.map_tx.send(result);
    }

    pub(crate) fn test_send_position(&self, tick: TagTick) {
        let _ = self.position_tx.send(tick);
    }
}

/// The main application structure: backend plumbing plus all view state.
pub struct ConsoleApp {
    /// Runtime, client and channels.
    pub backend: Backend,
    /// Login form and granted role.
    pub session: SessionState,
    /// Currently shown page.
    pub page: Page,
    /// Configuration page state.
    pub config_view: ConfigViewState,
    /// Map page state.
    pub map_view: MapViewState,
    /// Live status state fed by the status poller.
    pub live: LiveState,
    /// Whether dark mode visuals are enabled.
    pub dark_mode: bool,
}

impl ConsoleApp {
    /// Creates the app against the given backend URL.
    pub fn new(prefs: UiPrefs, ctx: egui::Context) -> Self {
        Self {
            backend: Backend::new(&prefs.base_url, ctx),
            session: SessionState::default(),
            page: Page::Dashboard,
            config_view: ConfigViewState::default(),
            map_view: MapViewState::default(),
            live: LiveState::new(),
            dark_mode: prefs.dark_mode,
        }
    }

    /// Current UI preferences, for persistence.
    pub fn prefs(&self) -> UiPrefs {
        UiPrefs {
            dark_mode: self.dark_mode,
            base_url: self.backend.client().base_url().to_string(),
        }
    }

    /// Drains every backend channel and folds the results into view state.
    ///
    /// Called once per frame before any view is drawn, mirroring the order
    /// in which the operations were issued.
    pub fn process_backend_events(&mut self) {
        while let Ok(result) = self.backend.login_rx.try_recv() {
            self.handle_login_result(result);
        }
        while let Ok(event) = self.backend.config_rx.try_recv() {
            self.handle_config_event(event);
        }
        while let Ok(result) = self.backend.anchors_rx.try_recv() {
            match result {
                Ok(anchors) => {
                    self.config_view.anchors = anchors;
                    self.config_view.anchors_error = None;
                }
                Err(err) => {
                    self.config_view.anchors_error = Some(format!("anchor fetch failed: {err}"));
                }
            }
        }
        while let Ok(result) = self.backend.map_rx.try_recv() {
            match result {
                Ok(snapshot) => {
                    self.map_view.snapshot = Some(snapshot);
                    self.map_view.load_error = None;
                }
                Err(err) => {
                    self.map_view.load_error = Some(format!("map fetch failed: {err}"));
                }
            }
        }
        while let Ok(result) = self.backend.tags_rx.try_recv() {
            if let Ok(tags) = result {
                if self.map_view.selected_tag.is_none() {
                    if let Some(first) = tags.first() {
                        self.map_view.selected_tag = Some(first.id.clone());
                        self.backend.set_selection(Some(first.id.clone()));
                    }
                }
                self.map_view.tags = tags;
            }
        }
        while let Ok(result) = self.backend.status_rx.try_recv() {
            self.live.ingest(result);
        }
        while let Ok(tick) = self.backend.position_rx.try_recv() {
            self.map_view.last_tick = tick;
        }
    }

    fn handle_login_result(&mut self, result: Result<LoginReply, ApiError>) {
        self.session.in_flight = false;
        match result {
            Ok(reply) => {
                if !reply.ok {
                    self.session.error = Some("Invalid username or password.".to_string());
                    return;
                }
                let role_name = reply.role.unwrap_or_default();
                match Role::parse(&role_name) {
                    Ok(role) => {
                        log::info!("logged in as {}", role.name());
                        self.session.role = Some(role);
                        self.session.error = None;
                        self.session.password.clear();
                        self.page = role.landing_page();
                        self.start_session();
                    }
                    Err(msg) => {
                        // Unknown role: inline error, no navigation.
                        self.session.error = Some(msg);
                    }
                }
            }
            Err(err) => {
                self.session.error = Some(format!("login failed: {err}"));
            }
        }
    }

    fn handle_config_event(&mut self, event: ConfigEvent) {
        match event {
            ConfigEvent::Loaded(Ok(document)) => {
                self.config_view.form.seed_from(&document);
                self.config_view.model.set_baseline(document);
                self.config_view.load_error = None;
                self.config_view.load_in_flight = false;
            }
            ConfigEvent::Loaded(Err(err)) => {
                // No baseline is set; the form stays hidden behind the
                // error message instead of showing stale or blank fields.
                self.config_view.load_error = Some(format!("config load failed: {err}"));
                self.config_view.load_in_flight = false;
            }
            ConfigEvent::Saved {
                document,
                result: Ok(()),
            } => {
                self.config_view.model.set_baseline(document);
                self.config_view.save_status = Some(SaveStatus::Saved);
                self.config_view.save_in_flight = false;
            }
            ConfigEvent::Saved {
                result: Err(err), ..
            } => {
                // Baseline untouched so a retry starts from known-good state.
                self.config_view.save_status = Some(SaveStatus::Failed(err.to_string()));
                self.config_view.save_in_flight = false;
            }
        }
    }

    /// Kicks off the per-session fetches and the periodic pollers.
    fn start_session(&mut self) {
        self.config_view.load_in_flight = true;
        self.backend.request_config();
        self.backend.request_anchors();
        self.backend.request_map();
        self.backend.request_tags();
        self.backend.start_pollers();
    }

    /// Handles a click on the save button: merges the form over the
    /// baseline and issues the PATCH.
    pub fn submit_config_save(&mut self) {
        let Some(baseline) = self.config_view.model.baseline() else {
            return;
        };
        let document = self.config_view.form.apply_to(baseline);
        self.config_view.save_status = None;
        self.config_view.save_in_flight = true;
        self.backend.request_save(document);
    }

    /// Handles a click on the login button.
    pub fn submit_login(&mut self) {
        if self.session.in_flight {
            return;
        }
        self.session.error = None;
        self.session.in_flight = true;
        self.backend.request_login(
            self.session.username.trim().to_string(),
            self.session.password.clone(),
        );
    }

    /// Changes the selected tag; effective on the next map tick.
    pub fn select_tag(&mut self, tag_id: String) {
        self.map_view.selected_tag = Some(tag_id.clone());
        self.backend.set_selection(Some(tag_id));
    }

    /// Logs out: stops the pollers and returns to the login view.
    pub fn logout(&mut self) {
        self.backend.stop_pollers();
        self.backend.set_selection(None);
        self.session = SessionState::default();
        self.config_view = ConfigViewState::default();
        self.map_view = MapViewState::default();
        self.live = LiveState::new();
        self.page = Page::Dashboard;
    }
}

impl Default for ConsoleApp {
    fn default() -> Self {
        Self::new(UiPrefs::default(), egui::Context::default())
    }
}
