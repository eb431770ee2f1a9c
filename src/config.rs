//! Configuration document model and form overlay.
//!
//! The remote configuration is a nested JSON document. The console keeps
//! the last fetched-or-saved copy as the *baseline* and produces save
//! payloads by deep-copying the baseline and overwriting exactly the fields
//! the form exposes. Unknown sections and fields pass through a
//! load→edit→save round trip unmodified.

use serde_json::{Map, Value};

use crate::shape::ShapeEditor;
use crate::types::WorldPoint;

// Per-field fallbacks, applied only when the baseline also lacks the field.
/// Default UDP listen port.
pub const DEFAULT_UDP_PORT: u64 = 100;
/// Default per-anchor measurement buffer size.
pub const DEFAULT_PER_ANCHOR_SIZE: u64 = 50;
/// Default measurement age window in seconds.
pub const DEFAULT_MAX_AGE_SEC: f64 = 2.0;
/// Default snapshot count kept per anchor.
pub const DEFAULT_SNAPSHOTS_PER_ANCHOR: u64 = 5;
/// Default propagation speed in meters per second.
pub const DEFAULT_C_M_PER_S: f64 = 299_792_458.0;
/// Default minimum anchor count for a solve.
pub const DEFAULT_MIN_ANCHOR_COUNT: u64 = 3;
/// Default solver iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u64 = 20;
/// Default solver convergence threshold.
pub const DEFAULT_STOP_THRESHOLD: f64 = 1e-4;
/// Default residual rejection limit in meters.
pub const DEFAULT_MAX_RESIDUAL_M: f64 = 2.0;
/// Default position measurement sigma in meters.
pub const DEFAULT_POS_SIGMA_M: f64 = 0.5;
/// Default filter process noise.
pub const DEFAULT_PROCESS_NOISE: f64 = 0.1;
/// Default tag age window in seconds.
pub const DEFAULT_TAG_MAX_AGE_SEC: f64 = 2.0;
/// Default maximum accepted position jump in meters.
pub const DEFAULT_MAX_JUMP_M: f64 = 5.0;
/// Default filter velocity damping factor.
pub const DEFAULT_VELOCITY_DAMPING: f64 = 0.8;
/// Default map side length in meters.
pub const DEFAULT_MAP_DIMENSION_M: f64 = crate::constants::DEFAULT_MAP_SIDE_M;

/// Holder of the authoritative configuration baseline.
///
/// The baseline is set on a successful load and replaced only after a
/// successful save acknowledgment; a failed save leaves it untouched so a
/// retry starts from the last known-good state.
#[derive(Debug, Clone, Default)]
pub struct ConfigModel {
    baseline: Option<Value>,
}

impl ConfigModel {
    /// Creates a model with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current baseline document, if a load or save has succeeded.
    pub fn baseline(&self) -> Option<&Value> {
        self.baseline.as_ref()
    }

    /// Installs a freshly loaded or just-saved document as the new baseline.
    pub fn set_baseline(&mut self, document: Value) {
        self.baseline = Some(document);
    }
}

/// Form-side editing state for the configuration document.
///
/// Every field is raw text; parsing is lenient and happens at merge time.
/// The geofence vertex table lives in [`ShapeEditor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigForm {
    /// `tdoa.zone_name`
    pub zone_name: String,
    /// `network.udp_port`
    pub udp_port: String,
    /// `tdoa.runtime.buffer.per_anchor_size`
    pub buffer_per_anchor_size: String,
    /// `tdoa.runtime.buffer.max_age_sec`
    pub buffer_max_age_sec: String,
    /// `tdoa.runtime.buffer.snapshots_per_anchor`
    pub buffer_snapshots_per_anchor: String,
    /// `tdoa.runtime.solver.c_m_per_s`
    pub solver_c_m_per_s: String,
    /// `tdoa.runtime.solver.min_anchor_count`
    pub solver_min_anchor_count: String,
    /// `tdoa.runtime.solver.max_iterations`
    pub solver_max_iterations: String,
    /// `tdoa.runtime.solver.stop_threshold`
    pub solver_stop_threshold: String,
    /// `tdoa.runtime.solver.max_residual_m`
    pub solver_max_residual_m: String,
    /// `tdoa.runtime.filter.pos_sigma_m`
    pub filter_pos_sigma_m: String,
    /// `tdoa.runtime.filter.process_noise`
    pub filter_process_noise: String,
    /// `tdoa.runtime.filter.tag_max_age_sec`
    pub filter_tag_max_age_sec: String,
    /// `tdoa.runtime.filter.max_jump_m`
    pub filter_max_jump_m: String,
    /// `tdoa.runtime.filter.velocity_damping`
    pub filter_velocity_damping: String,
    /// `tdoa.map.width_m`
    pub map_width_m: String,
    /// `tdoa.map.height_m`
    pub map_height_m: String,
    /// `tdoa.map.origin.x`
    pub map_origin_x: String,
    /// `tdoa.map.origin.y`
    pub map_origin_y: String,
    /// Geofence vertex table bound to `tdoa.map.shape.vertices`.
    pub shape: ShapeEditor,
}

impl ConfigForm {
    /// Re-seeds every field from the given baseline document, falling back
    /// to the per-field default where the document lacks a value.
    pub fn seed_from(&mut self, doc: &Value) {
        self.zone_name = get_str(doc, &["tdoa", "zone_name"]).unwrap_or_default();
        self.udp_port = seed_u64(doc, &["network", "udp_port"], DEFAULT_UDP_PORT);
        self.buffer_per_anchor_size = seed_u64(
            doc,
            &["tdoa", "runtime", "buffer", "per_anchor_size"],
            DEFAULT_PER_ANCHOR_SIZE,
        );
        self.buffer_max_age_sec = seed_f64(
            doc,
            &["tdoa", "runtime", "buffer", "max_age_sec"],
            DEFAULT_MAX_AGE_SEC,
        );
        self.buffer_snapshots_per_anchor = seed_u64(
            doc,
            &["tdoa", "runtime", "buffer", "snapshots_per_anchor"],
            DEFAULT_SNAPSHOTS_PER_ANCHOR,
        );
        self.solver_c_m_per_s = seed_f64(
            doc,
            &["tdoa", "runtime", "solver", "c_m_per_s"],
            DEFAULT_C_M_PER_S,
        );
        self.solver_min_anchor_count = seed_u64(
            doc,
            &["tdoa", "runtime", "solver", "min_anchor_count"],
            DEFAULT_MIN_ANCHOR_COUNT,
        );
        self.solver_max_iterations = seed_u64(
            doc,
            &["tdoa", "runtime", "solver", "max_iterations"],
            DEFAULT_MAX_ITERATIONS,
        );
        self.solver_stop_threshold = seed_f64(
            doc,
            &["tdoa", "runtime", "solver", "stop_threshold"],
            DEFAULT_STOP_THRESHOLD,
        );
        self.solver_max_residual_m = seed_f64(
            doc,
            &["tdoa", "runtime", "solver", "max_residual_m"],
            DEFAULT_MAX_RESIDUAL_M,
        );
        self.filter_pos_sigma_m = seed_f64(
            doc,
            &["tdoa", "runtime", "filter", "pos_sigma_m"],
            DEFAULT_POS_SIGMA_M,
        );
        self.filter_process_noise = seed_f64(
            doc,
            &["tdoa", "runtime", "filter", "process_noise"],
            DEFAULT_PROCESS_NOISE,
        );
        self.filter_tag_max_age_sec = seed_f64(
            doc,
            &["tdoa", "runtime", "filter", "tag_max_age_sec"],
            DEFAULT_TAG_MAX_AGE_SEC,
        );
        self.filter_max_jump_m = seed_f64(
            doc,
            &["tdoa", "runtime", "filter", "max_jump_m"],
            DEFAULT_MAX_JUMP_M,
        );
        self.filter_velocity_damping = seed_f64(
            doc,
            &["tdoa", "runtime", "filter", "velocity_damping"],
            DEFAULT_VELOCITY_DAMPING,
        );
        self.map_width_m = seed_f64(doc, &["tdoa", "map", "width_m"], DEFAULT_MAP_DIMENSION_M);
        self.map_height_m = seed_f64(doc, &["tdoa", "map", "height_m"], DEFAULT_MAP_DIMENSION_M);
        self.map_origin_x = seed_f64(doc, &["tdoa", "map", "origin", "x"], 0.0);
        self.map_origin_y = seed_f64(doc, &["tdoa", "map", "origin", "y"], 0.0);

        let vertices: Vec<WorldPoint> = get_path(doc, &["tdoa", "map", "shape", "vertices"])
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        self.shape.seed(&vertices);
    }

    /// Produces the save payload: a deep copy of the baseline with exactly
    /// the form-exposed fields overwritten.
    ///
    /// Blank or non-numeric input falls back to the baseline's existing
    /// value; the hardcoded default applies only when the baseline also
    /// lacks the field. Every other field is carried over byte-for-byte.
    pub fn apply_to(&self, baseline: &Value) -> Value {
        let mut doc = baseline.clone();

        set_path(&mut doc, &["tdoa", "zone_name"], Value::from(self.zone_name.clone()));

        merge_u64(&mut doc, &["network", "udp_port"], &self.udp_port, DEFAULT_UDP_PORT);
        merge_u64(
            &mut doc,
            &["tdoa", "runtime", "buffer", "per_anchor_size"],
            &self.buffer_per_anchor_size,
            DEFAULT_PER_ANCHOR_SIZE,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "buffer", "max_age_sec"],
            &self.buffer_max_age_sec,
            DEFAULT_MAX_AGE_SEC,
        );
        merge_u64(
            &mut doc,
            &["tdoa", "runtime", "buffer", "snapshots_per_anchor"],
            &self.buffer_snapshots_per_anchor,
            DEFAULT_SNAPSHOTS_PER_ANCHOR,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "solver", "c_m_per_s"],
            &self.solver_c_m_per_s,
            DEFAULT_C_M_PER_S,
        );
        merge_u64(
            &mut doc,
            &["tdoa", "runtime", "solver", "min_anchor_count"],
            &self.solver_min_anchor_count,
            DEFAULT_MIN_ANCHOR_COUNT,
        );
        merge_u64(
            &mut doc,
            &["tdoa", "runtime", "solver", "max_iterations"],
            &self.solver_max_iterations,
            DEFAULT_MAX_ITERATIONS,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "solver", "stop_threshold"],
            &self.solver_stop_threshold,
            DEFAULT_STOP_THRESHOLD,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "solver", "max_residual_m"],
            &self.solver_max_residual_m,
            DEFAULT_MAX_RESIDUAL_M,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "filter", "pos_sigma_m"],
            &self.filter_pos_sigma_m,
            DEFAULT_POS_SIGMA_M,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "filter", "process_noise"],
            &self.filter_process_noise,
            DEFAULT_PROCESS_NOISE,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "filter", "tag_max_age_sec"],
            &self.filter_tag_max_age_sec,
            DEFAULT_TAG_MAX_AGE_SEC,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "filter", "max_jump_m"],
            &self.filter_max_jump_m,
            DEFAULT_MAX_JUMP_M,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "runtime", "filter", "velocity_damping"],
            &self.filter_velocity_damping,
            DEFAULT_VELOCITY_DAMPING,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "map", "width_m"],
            &self.map_width_m,
            DEFAULT_MAP_DIMENSION_M,
        );
        merge_f64(
            &mut doc,
            &["tdoa", "map", "height_m"],
            &self.map_height_m,
            DEFAULT_MAP_DIMENSION_M,
        );
        merge_f64(&mut doc, &["tdoa", "map", "origin", "x"], &self.map_origin_x, 0.0);
        merge_f64(&mut doc, &["tdoa", "map", "origin", "y"], &self.map_origin_y, 0.0);

        // Shape kind is kept from the baseline when present.
        let kind = get_str(&doc, &["tdoa", "map", "shape", "type"])
            .unwrap_or_else(|| "polygon".to_string());
        set_path(&mut doc, &["tdoa", "map", "shape", "type"], Value::from(kind));
        let vertices = self.shape.collect_vertices();
        set_path(
            &mut doc,
            &["tdoa", "map", "shape", "vertices"],
            serde_json::to_value(vertices).unwrap_or_else(|_| Value::Array(Vec::new())),
        );

        doc
    }
}

/// Whether a numeric form field holds text that will not parse.
///
/// Blank text is not flagged: it falls back silently at merge time.
pub fn is_invalid_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_err()
}

fn seed_f64(doc: &Value, path: &[&str], default: f64) -> String {
    get_path(doc, path)
        .and_then(Value::as_f64)
        .unwrap_or(default)
        .to_string()
}

fn seed_u64(doc: &Value, path: &[&str], default: u64) -> String {
    get_path(doc, path)
        .and_then(Value::as_u64)
        .unwrap_or(default)
        .to_string()
}

fn merge_f64(doc: &mut Value, path: &[&str], text: &str, default: f64) {
    match text.trim().parse::<f64>() {
        Ok(v) => set_path(doc, path, Value::from(v)),
        Err(_) => {
            if !get_path(doc, path).is_some_and(Value::is_number) {
                set_path(doc, path, Value::from(default));
            }
        }
    }
}

fn merge_u64(doc: &mut Value, path: &[&str], text: &str, default: u64) {
    match text.trim().parse::<u64>() {
        Ok(v) => set_path(doc, path, Value::from(v)),
        Err(_) => {
            if !get_path(doc, path).is_some_and(Value::is_number) {
                set_path(doc, path, Value::from(default));
            }
        }
    }
}

fn get_str(doc: &Value, path: &[&str]) -> Option<String> {
    get_path(doc, path)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Walks the document down a key path.
pub fn get_path<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = doc;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// Writes a value at a key path, creating intermediate objects as needed.
/// Non-object intermediates are replaced.
pub fn set_path(doc: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *doc = value;
        return;
    };
    let mut current = doc;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .expect("just ensured object")
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(obj) = current.as_object_mut() {
        obj.insert(last.to_string(), value);
    }
}
