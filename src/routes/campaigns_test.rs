use serde_json::json;

use super::*;
use crate::campaign::{CampaignKind, FunnelKind};
use crate::dispatch::GameSurface;
use crate::state::test_helpers::{seed_campaign, test_app_state};

fn designed_campaign() -> Value {
    json!({
        "type": "wheel",
        "design": {
            "backgroundImage": "https://cdn.example/bg.png",
            "mobileBackgroundImage": "https://cdn.example/bg-mobile.png",
            "presentation": { "fontSize": 18.0 },
            "mobileConfig": { "fontSize": 14.0, "gameScale": 0.8, "buttonPlacement": "top" },
            "container": { "width": 400.0, "height": 600.0 },
            "elements": [
                {
                    "id": "logo",
                    "position": { "x": 10.0, "y": 10.0 },
                    "size": { "width": 120.0, "height": 40.0 },
                    "deviceConfig": { "mobile": { "x": 300.0, "width": 200.0 } }
                }
            ]
        }
    })
}

#[tokio::test]
async fn create_validates_and_reports_route() {
    let state = test_app_state();
    let body = CreateCampaignBody { id: None, name: "Spring".into(), config: json!({ "type": "dice" }) };

    let (status, Json(created)) = create_campaign(State(state.clone()), Json(body)).await.unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.route.funnel, FunnelKind::Unlocked);
    assert_eq!(created.route.surface, GameSurface::Game(CampaignKind::Dice));
    assert!(state.campaigns.fetch_campaign(created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn create_rejects_invalid_game_config() {
    let state = test_app_state();
    let body = CreateCampaignBody {
        id: None,
        name: "Broken".into(),
        config: json!({ "type": "scratch", "gameConfig": { "scratch": { "winProbability": 1.5 } } }),
    };

    let err = create_campaign(State(state), Json(body)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "E_GAME_CONFIG");
}

#[tokio::test]
async fn create_rejects_element_over_game_area() {
    let state = test_app_state();
    let mut config = designed_campaign();
    config["design"]["gameArea"] = json!({ "x": 0.0, "y": 0.0, "width": 200.0, "height": 200.0 });
    let body = CreateCampaignBody { id: None, name: "Crowded".into(), config };

    let err = create_campaign(State(state), Json(body)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "E_LAYOUT_OVERLAP");
}

#[tokio::test]
async fn create_accepts_unknown_type() {
    let state = test_app_state();
    let body = CreateCampaignBody { id: None, name: "Future".into(), config: json!({ "type": "roulette" }) };
    let (_, Json(created)) = create_campaign(State(state), Json(body)).await.unwrap();
    assert_eq!(created.route.funnel, FunnelKind::Standard);
    assert!(created.route.surface.game().is_none());
}

#[tokio::test]
async fn get_missing_campaign_is_404() {
    let err = get_campaign(State(test_app_state()), Path(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_desktop_uses_base_layout() {
    let state = test_app_state();
    let id = seed_campaign(&state, "Designed", designed_campaign()).await;

    let Json(view) =
        render_campaign(State(state), Path(id), Query(RenderQuery { device: None })).await.unwrap();

    assert_eq!(view.device, Device::Desktop);
    assert_eq!(view.background_image.as_deref(), Some("https://cdn.example/bg.png"));
    assert!((view.presentation.font_size - 18.0).abs() < f64::EPSILON);
    assert_eq!(view.elements[0].rect, Rect::new(10.0, 10.0, 120.0, 40.0));
}

#[tokio::test]
async fn render_mobile_applies_overrides_and_clamps() {
    let state = test_app_state();
    let id = seed_campaign(&state, "Designed", designed_campaign()).await;

    let Json(view) =
        render_campaign(State(state), Path(id), Query(RenderQuery { device: Some("mobile".into()) })).await.unwrap();

    assert_eq!(view.device, Device::Mobile);
    assert_eq!(view.background_image.as_deref(), Some("https://cdn.example/bg-mobile.png"));
    assert_eq!(view.presentation.button_placement, "top");
    // x=300 with width 200 would overflow a 400-wide container.
    assert_eq!(view.elements[0].rect, Rect::new(200.0, 10.0, 200.0, 40.0));
}

#[test]
fn render_tablet_uses_mobile_config_but_generic_background() {
    let campaign = Campaign::from_value(Uuid::new_v4(), "Designed", &designed_campaign()).unwrap();
    let view = render(&campaign, Device::Tablet);
    assert_eq!(view.background_image.as_deref(), Some("https://cdn.example/bg.png"));
    assert!((view.presentation.font_size - 14.0).abs() < f64::EPSILON);
}
