use serde_json::json;

use super::*;
use crate::config::StoreTimeouts;

fn participation_json(id: Uuid, campaign_id: Uuid, created_at: i64) -> serde_json::Value {
    json!({
        "id": id,
        "campaign_id": campaign_id,
        "form_data": { "prenom": "Ana", "email": "ana@example.com" },
        "user_email": "ana@example.com",
        "ip_address": null,
        "user_agent": "Mozilla/5.0",
        "utm_source": "newsletter",
        "utm_medium": null,
        "utm_campaign": null,
        "created_at": created_at
    })
}

#[test]
fn parse_rows_reads_postgrest_array() {
    let campaign_id = Uuid::new_v4();
    let body = json!([
        participation_json(Uuid::new_v4(), campaign_id, 20),
        participation_json(Uuid::new_v4(), campaign_id, 10),
    ])
    .to_string();

    let rows: Vec<Participation> = parse_rows(&body).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].created_at, 20);
    assert_eq!(rows[0].utm_source.as_deref(), Some("newsletter"));
    let keys: Vec<&String> = rows[0].form_data.keys().collect();
    assert_eq!(keys, ["prenom", "email"]);
}

#[test]
fn parse_rows_rejects_garbage() {
    let err = parse_rows::<Participation>("{not json").unwrap_err();
    assert!(matches!(err, StoreError::Payload(_)));
}

#[test]
fn parse_single_empty_body_and_empty_array_are_none() {
    assert!(parse_single::<CampaignRecord>("").unwrap().is_none());
    assert!(parse_single::<CampaignRecord>("[]").unwrap().is_none());
}

#[test]
fn parse_single_takes_first_row() {
    let id = Uuid::new_v4();
    let body = json!([{ "id": id, "name": "Dice day", "config": { "type": "dice" }, "created_at": 5 }]).to_string();
    let record: CampaignRecord = parse_single(&body).unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.name, "Dice day");
}

#[test]
fn foreign_key_violation_detected_from_error_body() {
    assert!(is_foreign_key_violation(r#"{"code":"23503","message":"violates foreign key"}"#));
    assert!(!is_foreign_key_violation(r#"{"code":"23505"}"#));
    assert!(!is_foreign_key_violation("plain text"));
}

#[test]
fn new_trims_trailing_slash() {
    let config = RestConfig {
        base_url: "https://store.example.com/rest/v1/".into(),
        api_key: "key".into(),
        timeouts: StoreTimeouts { request_secs: 5, connect_secs: 2 },
    };
    let store = RestStore::new(&config).unwrap();
    assert_eq!(store.table_url("participations"), "https://store.example.com/rest/v1/participations");
}
