use super::*;
use crate::client::{ApiError, LoginReply};
use crate::tasks::ConfigEvent;
use crate::types::{GeofenceShape, MapSnapshot, Role, StatusSnapshot, TagMeta, TagPosition, WorldPoint};
use eframe::egui;
use serde_json::json;

/// Run a single headless egui frame with the provided closure.
fn run_frame(mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));

    let ctx = egui::Context::default();
    ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        f(ctx);
    })
}

fn login_ok(role: &str) -> Result<LoginReply, ApiError> {
    Ok(LoginReply {
        ok: true,
        role: Some(role.to_string()),
    })
}

#[test]
fn login_with_known_role_navigates_to_its_landing_page() {
    let mut app = ConsoleApp::default();
    app.backend.test_send_login(login_ok("Admin"));

    app.process_backend_events();

    assert_eq!(app.session.role, Some(Role::Admin));
    assert_eq!(app.page, Page::Map);
    assert!(app.session.error.is_none());
}

#[test]
fn login_with_unknown_role_shows_inline_error_and_no_navigation() {
    let mut app = ConsoleApp::default();
    app.backend.test_send_login(login_ok("root"));

    app.process_backend_events();

    assert!(app.session.role.is_none());
    assert_eq!(app.page, Page::Dashboard);
    let error = app.session.error.as_deref().expect("inline error expected");
    assert!(error.contains("root"), "unexpected error: {error}");
}

#[test]
fn rejected_credentials_show_inline_error() {
    let mut app = ConsoleApp::default();
    app.backend.test_send_login(Ok(LoginReply {
        ok: false,
        role: None,
    }));

    app.process_backend_events();

    assert!(app.session.role.is_none());
    assert!(app.session.error.is_some());
}

#[test]
fn config_load_success_seeds_form_and_baseline() {
    let mut app = ConsoleApp::default();
    let doc = json!({
        "network": {"udp_port": 600},
        "tdoa": {"zone_name": "hall"},
        "web": {"port": 8000}
    });
    app.backend.test_send_config(ConfigEvent::Loaded(Ok(doc.clone())));

    app.process_backend_events();

    assert_eq!(app.config_view.model.baseline(), Some(&doc));
    assert_eq!(app.config_view.form.zone_name, "hall");
    assert_eq!(app.config_view.form.udp_port, "600");
    assert!(app.config_view.load_error.is_none());
}

#[test]
fn config_load_failure_sets_error_and_no_baseline() {
    let mut app = ConsoleApp::default();
    app.backend
        .test_send_config(ConfigEvent::Loaded(Err(ApiError::Status(502))));

    app.process_backend_events();

    assert!(app.config_view.model.baseline().is_none());
    assert!(app.config_view.load_error.is_some());
}

#[test]
fn failed_save_leaves_baseline_untouched() {
    let mut app = ConsoleApp::default();
    let baseline = json!({"tdoa": {"zone_name": "hall"}});
    app.backend
        .test_send_config(ConfigEvent::Loaded(Ok(baseline.clone())));
    app.process_backend_events();

    app.backend.test_send_config(ConfigEvent::Saved {
        document: json!({"tdoa": {"zone_name": "edited"}}),
        result: Err(ApiError::Server("forbidden".into())),
    });
    app.process_backend_events();

    assert_eq!(app.config_view.model.baseline(), Some(&baseline));
    assert_eq!(
        app.config_view.save_status,
        Some(SaveStatus::Failed("forbidden".into()))
    );
}

#[test]
fn successful_save_promotes_document_to_baseline() {
    let mut app = ConsoleApp::default();
    app.backend
        .test_send_config(ConfigEvent::Loaded(Ok(json!({"tdoa": {}}))));
    app.process_backend_events();

    let saved = json!({"tdoa": {"zone_name": "edited"}});
    app.backend.test_send_config(ConfigEvent::Saved {
        document: saved.clone(),
        result: Ok(()),
    });
    app.process_backend_events();

    assert_eq!(app.config_view.model.baseline(), Some(&saved));
    assert_eq!(app.config_view.save_status, Some(SaveStatus::Saved));
}

#[test]
fn status_poll_failure_retains_last_good_snapshot() {
    let mut app = ConsoleApp::default();
    let snap = StatusSnapshot {
        status: "ok".into(),
        ..Default::default()
    };
    app.backend.test_send_status(Ok(snap.clone()));
    app.process_backend_events();

    app.backend
        .test_send_status(Err(ApiError::Network("refused".into())));
    app.process_backend_events();

    assert_eq!(app.live.snapshot(), Some(&snap));
    assert!(app.live.degraded_message().is_some());
}

#[test]
fn first_tag_list_selects_the_first_tag() {
    let mut app = ConsoleApp::default();
    app.backend.test_send_tags(Ok(vec![
        TagMeta {
            id: "t7".into(),
            name: Some("cart".into()),
        },
        TagMeta {
            id: "t9".into(),
            name: None,
        },
    ]));

    app.process_backend_events();

    assert_eq!(app.map_view.selected_tag.as_deref(), Some("t7"));
    assert_eq!(app.map_view.tags.len(), 2);
}

#[test]
fn map_tick_replaces_the_marker_entirely() {
    let mut app = ConsoleApp::default();
    app.backend
        .test_send_position(Some(("t1".into(), TagPosition::default())));
    app.process_backend_events();
    assert!(app.map_view.last_tick.is_some());

    // A failed fetch delivers None and clears the previous marker.
    app.backend.test_send_position(None);
    app.process_backend_events();
    assert!(app.map_view.last_tick.is_none());
}

#[test]
fn login_page_renders_headless() {
    let mut app = ConsoleApp::default();
    app.session.error = Some("Invalid username or password.".into());

    run_frame(|ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_login(ui);
        });
    });
}

#[test]
fn map_page_renders_single_vertex_polygon_without_error() {
    let mut app = ConsoleApp::default();
    app.session.role = Some(Role::Diag);
    app.map_view.snapshot = Some(MapSnapshot {
        width_m: Some(20.0),
        height_m: Some(10.0),
        origin: Some(WorldPoint { x: 0.0, y: 0.0 }),
        shape: Some(GeofenceShape {
            kind: "polygon".into(),
            vertices: vec![WorldPoint { x: 1.0, y: 1.0 }],
        }),
        anchors: Vec::new(),
    });

    run_frame(|ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_map(ui);
        });
    });
}

#[test]
fn config_page_renders_seeded_form_headless() {
    let mut app = ConsoleApp::default();
    app.session.role = Some(Role::Admin);
    app.backend.test_send_config(ConfigEvent::Loaded(Ok(json!({
        "network": {"udp_port": 512},
        "tdoa": {
            "zone_name": "hall",
            "map": {"shape": {"type": "polygon", "vertices": [{"x": 0.0, "y": 0.0}]}}
        }
    }))));
    app.process_backend_events();

    run_frame(|ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_config(ui);
        });
    });

    assert_eq!(app.config_view.form.shape.rows.len(), 1);
}

#[test]
fn logout_clears_session_and_view_state() {
    let mut app = ConsoleApp::default();
    app.backend.test_send_login(login_ok("Superuser"));
    app.process_backend_events();
    assert_eq!(app.page, Page::Config);

    app.logout();

    assert!(app.session.role.is_none());
    assert!(app.live.snapshot().is_none());
    assert_eq!(app.page, Page::Dashboard);
}
