//! Pure map-scene composition.
//!
//! The renderer is split into a view-model and an adapter: this module
//! computes a renderable [`MapScene`] from the map snapshot, the latest tag
//! tick and the surface size, without touching any UI type. The egui
//! adapter in `ui::map_view` only paints the result, so scene logic is
//! testable without a rendering environment.

use crate::transform::{world_to_surface, MapExtent, SurfacePoint, SurfaceSize};
use crate::types::{MapSnapshot, TagPosition};

/// A labelled marker on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Marker center on the surface.
    pub pos: SurfacePoint,
    /// Label drawn next to the marker.
    pub label: String,
}

/// Everything one frame of the map draws, in surface coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapScene {
    /// Closed geofence outline; empty when fewer than two vertices exist.
    pub outline: Vec<SurfacePoint>,
    /// One marker per anchor with a known position.
    pub anchors: Vec<Marker>,
    /// The selected tag's marker, if its latest position fetch succeeded.
    pub tag: Option<Marker>,
}

/// Composes the scene for one tick.
///
/// The scene is rebuilt from scratch each time; nothing carries over from
/// the previous frame, so a tag whose fetch failed this tick leaves no
/// stale marker.
///
/// # Arguments
///
/// * `map` - map snapshot, or `None` before the first successful fetch
/// * `tag` - the selected tag's id and latest fetched position, if any
/// * `surface` - pixel size of the drawing surface
pub fn compose_scene(
    map: Option<&MapSnapshot>,
    tag: Option<(&str, TagPosition)>,
    surface: SurfaceSize,
) -> MapScene {
    let Some(map) = map else {
        return MapScene::default();
    };
    let extent = MapExtent::from_snapshot(map);

    let vertices = map
        .shape
        .as_ref()
        .map(|s| s.vertices.as_slice())
        .unwrap_or(&[]);
    let outline = if vertices.len() >= 2 {
        vertices
            .iter()
            .map(|v| world_to_surface(*v, Some(&extent), surface))
            .collect()
    } else {
        Vec::new()
    };

    let anchors = map
        .anchors
        .iter()
        .filter_map(|a| {
            let p = a.position?;
            Some(Marker {
                pos: world_to_surface(
                    crate::types::WorldPoint { x: p.x, y: p.y },
                    Some(&extent),
                    surface,
                ),
                label: a.id.clone(),
            })
        })
        .collect();

    let tag = tag.map(|(id, p)| Marker {
        pos: world_to_surface(
            crate::types::WorldPoint { x: p.x, y: p.y },
            Some(&extent),
            surface,
        ),
        label: id.to_string(),
    });

    MapScene {
        outline,
        anchors,
        tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Anchor, GeofenceShape, Position3, WorldPoint};

    const SURFACE: SurfaceSize = SurfaceSize {
        width_px: 400.0,
        height_px: 400.0,
    };

    fn snapshot_with_vertices(vertices: Vec<WorldPoint>) -> MapSnapshot {
        MapSnapshot {
            width_m: Some(20.0),
            height_m: Some(10.0),
            origin: Some(WorldPoint { x: 0.0, y: 0.0 }),
            shape: Some(GeofenceShape {
                kind: "polygon".into(),
                vertices,
            }),
            anchors: Vec::new(),
        }
    }

    #[test]
    fn no_map_yields_empty_scene() {
        let scene = compose_scene(None, None, SURFACE);
        assert_eq!(scene, MapScene::default());
    }

    #[test]
    fn single_vertex_suppresses_outline() {
        let map = snapshot_with_vertices(vec![WorldPoint { x: 1.0, y: 1.0 }]);
        let scene = compose_scene(Some(&map), None, SURFACE);
        assert!(scene.outline.is_empty());
    }

    #[test]
    fn empty_polygon_suppresses_outline() {
        let map = snapshot_with_vertices(Vec::new());
        let scene = compose_scene(Some(&map), None, SURFACE);
        assert!(scene.outline.is_empty());
    }

    #[test]
    fn two_vertices_produce_an_outline() {
        let map = snapshot_with_vertices(vec![
            WorldPoint { x: 0.0, y: 0.0 },
            WorldPoint { x: 5.0, y: 0.0 },
        ]);
        let scene = compose_scene(Some(&map), None, SURFACE);
        assert_eq!(scene.outline.len(), 2);
        // scale = min(400/20, 400/10) = 20; y flips to the bottom edge
        assert_eq!(scene.outline[0].x, 0.0);
        assert_eq!(scene.outline[0].y, 400.0);
        assert_eq!(scene.outline[1].x, 100.0);
    }

    #[test]
    fn anchors_without_position_are_skipped() {
        let mut map = snapshot_with_vertices(Vec::new());
        map.anchors = vec![
            Anchor {
                id: "a1".into(),
                position: Some(Position3 {
                    x: 1.0,
                    y: 1.0,
                    z: 2.0,
                }),
                ..Default::default()
            },
            Anchor {
                id: "a2".into(),
                position: None,
                ..Default::default()
            },
        ];
        let scene = compose_scene(Some(&map), None, SURFACE);
        assert_eq!(scene.anchors.len(), 1);
        assert_eq!(scene.anchors[0].label, "a1");
    }

    #[test]
    fn failed_position_fetch_leaves_no_tag_marker() {
        let map = snapshot_with_vertices(Vec::new());
        let scene = compose_scene(Some(&map), None, SURFACE);
        assert!(scene.tag.is_none());
    }

    #[test]
    fn tag_marker_is_transformed_like_everything_else() {
        let map = snapshot_with_vertices(Vec::new());
        let position = TagPosition {
            x: 5.0,
            y: 2.0,
            z: 0.0,
            time: 0.0,
        };
        let scene = compose_scene(Some(&map), Some(("t1", position)), SURFACE);
        let marker = scene.tag.unwrap();
        assert_eq!(marker.label, "t1");
        assert_eq!(marker.pos.x, 100.0);
        assert_eq!(marker.pos.y, 360.0);
    }
}
