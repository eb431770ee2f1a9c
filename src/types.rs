//! Core data types shared across the console.
//!
//! This module defines the wire-level records the backend serves (anchors,
//! tag positions, node live records, status snapshots) together with the
//! console-side derived types: freshness classification and operator roles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::ONLINE_MAX_AGE_SEC;

/// A point in world space, in meters relative to the configured origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// East-west coordinate in meters.
    pub x: f64,
    /// North-south coordinate in meters (increases upward/north).
    pub y: f64,
}

/// A 3D position in world meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    /// East-west coordinate in meters.
    pub x: f64,
    /// North-south coordinate in meters.
    pub y: f64,
    /// Height in meters.
    #[serde(default)]
    pub z: f64,
}

/// A fixed reference device with a known position, read-only to the console.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    /// Backend-assigned anchor identifier.
    #[serde(default)]
    pub id: String,
    /// Human-readable anchor name.
    #[serde(default)]
    pub name: String,
    /// Surveyed position; absent anchors are skipped on the map.
    #[serde(default)]
    pub position: Option<Position3>,
    /// Whether the backend currently uses this anchor.
    #[serde(default)]
    pub enabled: bool,
    /// Network address the anchor reports from.
    #[serde(default)]
    pub addr: Option<String>,
}

/// Metadata for a mobile tag, as listed by `GET /api/tdoa/tags`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagMeta {
    /// Tag identifier used for position queries.
    #[serde(default)]
    pub id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl TagMeta {
    /// Label shown in the tag selector: `id` or `id - name`.
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} - {}", self.id, name),
            _ => self.id.clone(),
        }
    }
}

/// A solved tag position with its solve timestamp (Unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TagPosition {
    /// East-west coordinate in meters.
    #[serde(default)]
    pub x: f64,
    /// North-south coordinate in meters.
    #[serde(default)]
    pub y: f64,
    /// Height in meters.
    #[serde(default)]
    pub z: f64,
    /// Solve time in Unix seconds.
    #[serde(default)]
    pub time: f64,
}

/// One received datagram as recorded by the backend, either a heartbeat or
/// a measurement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Receive time in Unix seconds.
    #[serde(default)]
    pub time: f64,
    /// Raw payload length in bytes.
    #[serde(default)]
    pub raw_len: u64,
    /// Raw payload as hex.
    #[serde(default)]
    pub raw_hex: String,
    /// Decoded payload text, if the backend could decode it.
    #[serde(default)]
    pub decoded: Option<String>,
    /// Receive mode reported by the backend.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Live record for one fixed node, keyed by its source address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Source address (`ip:port`) the node reports from.
    #[serde(default)]
    pub addr: String,
    /// Most recent heartbeat, if any was ever received.
    #[serde(default)]
    pub last_hb: Option<PacketRecord>,
    /// Most recent measurement, if any was ever received.
    #[serde(default)]
    pub last_meas: Option<PacketRecord>,
}

/// Full system-status snapshot served by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Backend-reported status string.
    #[serde(default)]
    pub status: String,
    /// The last raw message the backend received, shown verbatim.
    #[serde(default)]
    pub last_msg: serde_json::Value,
    /// Latest solved position per tag id. Ordered map for stable table rows.
    #[serde(default)]
    pub tags: BTreeMap<String, TagPosition>,
    /// Live records for all known fixed nodes.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

/// Map snapshot served by `GET /api/tdoa/map`: extent, geofence and anchors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Zone width in meters, if configured.
    #[serde(default)]
    pub width_m: Option<f64>,
    /// Zone height in meters, if configured.
    #[serde(default)]
    pub height_m: Option<f64>,
    /// World origin of the zone, if configured.
    #[serde(default)]
    pub origin: Option<WorldPoint>,
    /// Geofence shape, if configured.
    #[serde(default)]
    pub shape: Option<GeofenceShape>,
    /// Anchors to place on the map.
    #[serde(default)]
    pub anchors: Vec<Anchor>,
}

/// Operator-editable polygon boundary of the tracked zone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeofenceShape {
    /// Shape kind; currently always `"polygon"`.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Ordered polygon vertices (the order is the winding order).
    #[serde(default)]
    pub vertices: Vec<WorldPoint>,
}

/// Connectivity classification derived from heartbeat age at render time.
///
/// Never persisted; recomputed from `now - last_hb.time` on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Freshness {
    /// Heartbeat seen within the online window.
    Online,
    /// Heartbeat older than the online window; carries the age in seconds.
    Stale(f64),
    /// No heartbeat ever received.
    Offline,
}

impl Freshness {
    /// Classifies a node from its last heartbeat time.
    ///
    /// # Arguments
    ///
    /// * `last_hb_time` - Unix seconds of the last heartbeat, if any
    /// * `now` - current time in Unix seconds
    pub fn classify(last_hb_time: Option<f64>, now: f64) -> Self {
        match last_hb_time {
            None => Freshness::Offline,
            Some(t) => {
                let age = now - t;
                if age < ONLINE_MAX_AGE_SEC {
                    Freshness::Online
                } else {
                    Freshness::Stale(age)
                }
            }
        }
    }

    /// Short operator-facing label, with the age to one decimal when stale.
    pub fn label(&self) -> String {
        match self {
            Freshness::Online => "online".to_string(),
            Freshness::Stale(age) => format!("stale ({age:.1} s)"),
            Freshness::Offline => "no HB".to_string(),
        }
    }
}

/// Operator role returned by login. The set is closed; anything else is
/// rejected before navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Read-only diagnostics access.
    Diag,
    /// Configuration access.
    Admin,
    /// Full access.
    Superuser,
}

impl Role {
    /// Parses a role name from the login response.
    ///
    /// # Returns
    ///
    /// The role, or an error message naming the unknown value.
    pub fn parse(name: &str) -> Result<Self, String> {
        match name {
            "Diag" => Ok(Role::Diag),
            "Admin" => Ok(Role::Admin),
            "Superuser" => Ok(Role::Superuser),
            other => Err(format!("unknown role: {other}")),
        }
    }

    /// Whether this role may save configuration changes.
    pub fn can_save_config(&self) -> bool {
        matches!(self, Role::Admin | Role::Superuser)
    }

    /// Display name, matching the backend's role strings.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Diag => "Diag",
            Role::Admin => "Admin",
            Role::Superuser => "Superuser",
        }
    }
}
