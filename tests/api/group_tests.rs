//! Group listing API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use fellow_relay::domain::Group;

use crate::common::*;

#[tokio::test]
async fn test_list_groups_returns_every_mapping() {
    let app = TestApp::new(&[Group::new(100, 555), Group::new(200, 777)]);

    let response = app.get("/api/v1/groups").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "count": 2,
            "groups": [
                {"source_group_id": 100, "destination_chat_id": 555},
                {"source_group_id": 200, "destination_chat_id": 777}
            ]
        })
    );
}

#[tokio::test]
async fn test_list_groups_empty_store() {
    let app = TestApp::new(&[]);

    let body = json_body(app.get("/api/v1/groups").await).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["groups"], json!([]));
}
