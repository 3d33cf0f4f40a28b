use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::models::template::{self, TemplateStatus};
use crate::state::AppState;

pub fn templates_routes() -> Router<AppState> {
    Router::new().route("/templates", get(list_templates))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesQuery {
    pub club_id: Option<String>,
}

/// Published template as delivered to the editor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub tags: serde_json::Value,
    pub pages: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl From<template::Model> for TemplateResponse {
    fn from(model: template::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            tags: model.tags,
            pages: model.pages,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        }
    }
}

/// Published templates of one club, most recently updated first.
async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplatesQuery>,
) -> Result<Response> {
    let Some(club_id) = query.club_id.filter(|id| !id.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "clubId parameter is required"})),
        )
            .into_response());
    };

    let db = state.get_db().await?;
    let templates: Vec<TemplateResponse> = template::Entity::find()
        .filter(template::Column::ClubId.eq(club_id))
        .filter(template::Column::Status.eq(TemplateStatus::Published))
        .order_by_desc(template::Column::UpdatedAt)
        .all(&db)
        .await?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(templates).into_response())
}
