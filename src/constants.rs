//! Shared application-wide constants.
//! Centralizes tweakable values used across polling, classification and map drawing.

use std::time::Duration;

// Polling
/// Period of the system-status poll driving the dashboard.
pub const STATUS_POLL_PERIOD: Duration = Duration::from_secs(2);
/// Period of the map tick that refreshes the selected tag's position.
pub const MAP_TICK_PERIOD: Duration = Duration::from_secs(1);

// Freshness classification
/// Heartbeat age (seconds) below which a node counts as online.
pub const ONLINE_MAX_AGE_SEC: f64 = 5.0;

// Map surface
/// Drawing surface width in pixels. The surface is fixed-size; the world
/// extent is scaled uniformly to fit inside it.
pub const MAP_SURFACE_WIDTH: f32 = 640.0;
/// Drawing surface height in pixels.
pub const MAP_SURFACE_HEIGHT: f32 = 480.0;
/// Fallback side length (meters) when the map extent is absent or degenerate.
pub const DEFAULT_MAP_SIDE_M: f64 = 10.0;

// Markers
/// Radius of an anchor marker (in surface pixels).
pub const ANCHOR_MARKER_RADIUS: f32 = 4.0;
/// Radius of the selected-tag marker (in surface pixels).
pub const TAG_MARKER_RADIUS: f32 = 6.0;

/// Backend base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
