use serde_json::json;

use super::*;

fn campaign_record() -> CampaignRecord {
    CampaignRecord { id: Uuid::new_v4(), name: "Spring wheel".into(), config: json!({ "type": "wheel" }), created_at: 1 }
}

fn new_participation(campaign_id: Uuid, email: &str) -> NewParticipation {
    let mut form_data = serde_json::Map::new();
    form_data.insert("email".into(), json!(email));
    NewParticipation { campaign_id, form_data, user_email: Some(email.into()), ..Default::default() }
}

#[tokio::test]
async fn create_requires_existing_campaign() {
    let store = MemoryStore::new();
    let missing = Uuid::new_v4();
    let err = store.create(new_participation(missing, "a@b.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::CampaignNotFound(id) if id == missing));
}

#[tokio::test]
async fn create_assigns_id_and_timestamp() {
    let store = MemoryStore::new();
    let campaign = campaign_record();
    store.save_campaign(&campaign).await.unwrap();

    let row = store.create(new_participation(campaign.id, "a@b.com")).await.unwrap();
    assert_eq!(row.campaign_id, campaign.id);
    assert!(row.created_at > 0);
    assert_eq!(row.user_email.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn list_is_newest_first_and_scoped_to_campaign() {
    let store = MemoryStore::new();
    let campaign = campaign_record();
    let other = campaign_record();
    store.save_campaign(&campaign).await.unwrap();
    store.save_campaign(&other).await.unwrap();

    let first = store.create(new_participation(campaign.id, "first@b.com")).await.unwrap();
    store.create(new_participation(other.id, "other@b.com")).await.unwrap();
    let second = store.create(new_participation(campaign.id, "second@b.com")).await.unwrap();

    let rows = store.list(campaign.id).await.unwrap();
    assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second.id, first.id]);
}

#[tokio::test]
async fn list_empty_campaign_is_empty_not_error() {
    let store = MemoryStore::new();
    assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_campaign_round_trips() {
    let store = MemoryStore::new();
    let campaign = campaign_record();
    store.save_campaign(&campaign).await.unwrap();
    assert_eq!(store.fetch_campaign(campaign.id).await.unwrap(), Some(campaign));
    assert_eq!(store.fetch_campaign(Uuid::new_v4()).await.unwrap(), None);
}
