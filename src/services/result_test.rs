use serde_json::{Value, json};
use uuid::Uuid;

use super::*;

fn campaign_with_result(result_screen: Value) -> Campaign {
    let config = json!({
        "type": "wheel",
        "screens": [{}, {}, {}, result_screen]
    });
    Campaign::from_value(Uuid::new_v4(), "Spring", &config).unwrap()
}

#[test]
fn win_uses_configured_copy_and_cta() {
    let campaign = campaign_with_result(json!({
        "title": "Results",
        "winMessage": "You won a voucher!",
        "ctaLink": "https://shop.example.com/claim",
        "ctaText": "Get it",
        "replayButtonText": "Spin again"
    }));
    let view = present(&campaign, Some(Outcome::Win));

    assert_eq!(view.title.as_deref(), Some("Results"));
    assert_eq!(view.message, "You won a voucher!");
    assert_eq!(
        view.cta,
        Some(CallToAction { text: "Get it".into(), link: "https://shop.example.com/claim".into() })
    );
    assert_eq!(view.replay.label, "Spin again");
}

#[test]
fn lose_never_shows_cta() {
    let campaign = campaign_with_result(json!({
        "loseMessage": "So close!",
        "ctaLink": "https://shop.example.com/claim"
    }));
    let view = present(&campaign, Some(Outcome::Lose));
    assert_eq!(view.message, "So close!");
    assert_eq!(view.cta, None);
}

#[test]
fn win_without_link_has_no_cta() {
    let campaign = campaign_with_result(json!({ "winMessage": "Yay", "ctaText": "Claim" }));
    assert_eq!(present(&campaign, Some(Outcome::Win)).cta, None);
}

#[test]
fn missing_screens_fall_back_to_defaults() {
    let campaign = Campaign::from_value(Uuid::new_v4(), "Bare", &json!({ "type": "dice" })).unwrap();

    let win = present(&campaign, Some(Outcome::Win));
    assert_eq!(win.message, DEFAULT_WIN_MESSAGE);
    assert_eq!(win.title, None);
    assert_eq!(win.replay.label, DEFAULT_REPLAY_TEXT);

    assert_eq!(present(&campaign, Some(Outcome::Lose)).message, DEFAULT_LOSE_MESSAGE);
    assert_eq!(present(&campaign, None).message, DEFAULT_THANK_YOU_MESSAGE);
}

#[test]
fn blank_copy_counts_as_missing() {
    let campaign = campaign_with_result(json!({ "winMessage": "   ", "ctaLink": "", "replayButtonText": "" }));
    let view = present(&campaign, Some(Outcome::Win));
    assert_eq!(view.message, DEFAULT_WIN_MESSAGE);
    assert_eq!(view.cta, None);
    assert_eq!(view.replay.label, DEFAULT_REPLAY_TEXT);
}

#[test]
fn cta_text_defaults_when_only_link_is_set() {
    let campaign = campaign_with_result(json!({ "ctaLink": "https://x.example" }));
    let cta = present(&campaign, Some(Outcome::Win)).cta.unwrap();
    assert_eq!(cta.text, DEFAULT_CTA_TEXT);
}
