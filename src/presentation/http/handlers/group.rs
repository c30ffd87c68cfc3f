//! Group Handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::domain::Group;
use crate::shared::error::RelayError;
use crate::startup::AppState;

/// Group mapping list response
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub count: usize,
    pub groups: Vec<Group>,
}

/// List every source group and its fellow chat
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<GroupListResponse>, RelayError> {
    let groups = state.relay.list_groups().await?;

    Ok(Json(GroupListResponse {
        count: groups.len(),
        groups,
    }))
}
