//! Live-state ingestion and per-node freshness reconciliation.
//!
//! The status poller hands every poll result to [`LiveState::ingest`]. A
//! successful poll replaces the whole snapshot (full replace, no diffing);
//! a failed poll sets a degraded-state message and retains the last good
//! snapshot. Freshness and table rows are recomputed from the snapshot at
//! render time and never stored.

use chrono::{Local, TimeZone};

use crate::client::ApiError;
use crate::types::{Freshness, StatusSnapshot};

/// Last good status snapshot plus the current degraded-state message.
#[derive(Debug, Clone, Default)]
pub struct LiveState {
    snapshot: Option<StatusSnapshot>,
    error: Option<String>,
}

impl LiveState {
    /// Creates an empty live state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests one poll result.
    ///
    /// Success replaces the snapshot and clears the degraded message;
    /// failure keeps the previous snapshot and records the message.
    pub fn ingest(&mut self, result: Result<StatusSnapshot, ApiError>) {
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(format!("status fetch failed: {err}"));
            }
        }
    }

    /// The last good snapshot, if any poll has succeeded.
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref()
    }

    /// The degraded-state message, if the most recent poll failed.
    pub fn degraded_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Renderable row for one fixed node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// Node source address.
    pub addr: String,
    /// Freshness label derived from the heartbeat age.
    pub freshness: Freshness,
    /// Decoded text of the last heartbeat, if any.
    pub last_hb_decoded: Option<String>,
    /// Localized time of the last measurement, if any.
    pub last_meas_time: Option<String>,
}

/// Builds the full node list from a snapshot, classifying each node's
/// connectivity from its heartbeat age at `now`.
pub fn node_views(snapshot: &StatusSnapshot, now: f64) -> Vec<NodeView> {
    snapshot
        .nodes
        .iter()
        .map(|node| NodeView {
            addr: node.addr.clone(),
            freshness: Freshness::classify(node.last_hb.as_ref().map(|hb| hb.time), now),
            last_hb_decoded: node.last_hb.as_ref().and_then(|hb| hb.decoded.clone()),
            last_meas_time: node.last_meas.as_ref().map(|m| format_unix_seconds(m.time)),
        })
        .collect()
}

/// Renderable row for the flat tag-position table.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRow {
    /// Tag identifier.
    pub id: String,
    /// X coordinate, three decimals.
    pub x: String,
    /// Y coordinate, three decimals.
    pub y: String,
    /// Z coordinate, three decimals.
    pub z: String,
    /// Localized solve timestamp.
    pub time: String,
}

/// Builds the tag table from a snapshot, one row per tag in id order.
pub fn tag_rows(snapshot: &StatusSnapshot) -> Vec<TagRow> {
    snapshot
        .tags
        .iter()
        .map(|(id, p)| TagRow {
            id: id.clone(),
            x: format!("{:.3}", p.x),
            y: format!("{:.3}", p.y),
            z: format!("{:.3}", p.z),
            time: format_unix_seconds(p.time),
        })
        .collect()
}

/// Formats a Unix-seconds timestamp as a localized date-time string.
/// The backend reports seconds; display resolution is milliseconds.
pub fn format_unix_seconds(seconds: f64) -> String {
    let millis = (seconds * 1000.0) as i64;
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeRecord, PacketRecord, TagPosition};

    fn snapshot_with_node(node: NodeRecord) -> StatusSnapshot {
        StatusSnapshot {
            status: "ok".into(),
            nodes: vec![node],
            ..Default::default()
        }
    }

    #[test]
    fn ingest_success_replaces_snapshot_and_clears_error() {
        let mut live = LiveState::new();
        live.ingest(Err(ApiError::Network("boom".into())));
        assert!(live.degraded_message().is_some());

        live.ingest(Ok(StatusSnapshot::default()));
        assert!(live.snapshot().is_some());
        assert!(live.degraded_message().is_none());
    }

    #[test]
    fn ingest_failure_retains_last_good_snapshot() {
        let mut live = LiveState::new();
        let snap = snapshot_with_node(NodeRecord {
            addr: "10.0.0.9:512".into(),
            ..Default::default()
        });
        live.ingest(Ok(snap.clone()));
        live.ingest(Err(ApiError::Status(503)));

        assert_eq!(live.snapshot(), Some(&snap));
        let msg = live.degraded_message().unwrap();
        assert!(msg.contains("503"), "unexpected message: {msg}");
    }

    #[test]
    fn node_view_classifies_from_heartbeat_age() {
        let now = 1_700_000_000.0;
        let snap = StatusSnapshot {
            nodes: vec![
                NodeRecord {
                    addr: "fresh".into(),
                    last_hb: Some(PacketRecord {
                        time: now - 3.0,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                NodeRecord {
                    addr: "old".into(),
                    last_hb: Some(PacketRecord {
                        time: now - 10.0,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                NodeRecord {
                    addr: "silent".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let views = node_views(&snap, now);
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].freshness, Freshness::Online);
        assert_eq!(views[1].freshness.label(), "stale (10.0 s)");
        assert_eq!(views[2].freshness, Freshness::Offline);
    }

    #[test]
    fn tag_rows_format_three_decimals() {
        let mut snap = StatusSnapshot::default();
        snap.tags.insert(
            "t1".into(),
            TagPosition {
                x: 1.23456,
                y: -0.5,
                z: 0.0,
                time: 1_700_000_000.0,
            },
        );

        let rows = tag_rows(&snap);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].x, "1.235");
        assert_eq!(rows[0].y, "-0.500");
        assert_eq!(rows[0].z, "0.000");
        assert!(!rows[0].time.is_empty());
    }

    #[test]
    fn tag_rows_are_in_id_order() {
        let mut snap = StatusSnapshot::default();
        snap.tags.insert("b".into(), TagPosition::default());
        snap.tags.insert("a".into(), TagPosition::default());

        let rows = tag_rows(&snap);
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[1].id, "b");
    }
}
