//! Download, visit and auth analytics.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, FromQueryResult, Set, Statement};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::{athlete, download, visit};
use crate::services::athlete_store;

/// Request metadata attached to every event.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

/// Athlete ids arrive either as JSON numbers or numeric strings.
fn flexible_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadEvent {
    #[serde(default, deserialize_with = "flexible_id")]
    pub athlete_id: Option<i64>,
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitEvent {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub athlete_id: Option<i64>,
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub page_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthEvent {
    #[serde(deserialize_with = "flexible_id")]
    pub athlete_id: Option<i64>,
}

/// Body of `POST /api/analytics`, dispatched on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalyticsEvent {
    Download(DownloadEvent),
    Visit(VisitEvent),
}

pub async fn record_download(db: &DbConn, event: DownloadEvent, client: ClientInfo) -> Result<i64> {
    let row = download::ActiveModel {
        athlete_id: Set(event.athlete_id),
        club_id: Set(event.club_id),
        ip_address: Set(Some(client.ip_address)),
        user_agent: Set(Some(client.user_agent)),
        file_format: Set(event.file_format.unwrap_or_else(|| "png".to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(row.id)
}

pub async fn record_visit(db: &DbConn, event: VisitEvent, client: ClientInfo) -> Result<i64> {
    let page_path = event
        .page_path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string());

    let row = visit::ActiveModel {
        session_id: Set(event.session_id),
        athlete_id: Set(event.athlete_id),
        club_id: Set(event.club_id),
        page_path: Set(page_path),
        ip_address: Set(Some(client.ip_address)),
        user_agent: Set(Some(client.user_agent)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(row.id)
}

/// Record today's auth event for a known athlete.
pub async fn record_auth(db: &DbConn, event: AuthEvent) -> Result<()> {
    let athlete_id = event
        .athlete_id
        .ok_or_else(|| AppError::BadRequest("athlete_id is required".to_string()))?;

    if athlete::Entity::find_by_id(athlete_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Athlete {} not found", athlete_id)));
    }

    athlete_store::record_auth_event(db, athlete_id, Utc::now().date_naive()).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PeriodStats {
    pub period: String,
    pub downloads: i64,
    pub visits: i64,
    pub auth_events: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub daily: Vec<PeriodStats>,
    pub monthly: Vec<PeriodStats>,
}

async fn period_stats(db: &DbConn, view: &str, key: &str, limit: u32) -> Result<Vec<PeriodStats>> {
    let sql = format!(
        "SELECT {key} AS period, downloads, visits, auth_events \
         FROM {view} ORDER BY {key} DESC LIMIT {limit}"
    );
    Ok(
        PeriodStats::find_by_statement(Statement::from_string(db.get_database_backend(), sql))
            .all(db)
            .await?,
    )
}

/// Last 30 days and last 12 months of activity.
pub async fn stats(db: &DbConn) -> Result<StatsReport> {
    Ok(StatsReport {
        daily: period_stats(db, "daily_stats", "day", 30).await?,
        monthly: period_stats(db, "monthly_stats", "month", 12).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;
    use serde_json::json;

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: "203.0.113.9".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_event_dispatch_on_type() {
        let event: AnalyticsEvent =
            serde_json::from_value(json!({"type": "download", "athlete_id": "42", "club_id": "hedonism"}))
                .unwrap();
        match event {
            AnalyticsEvent::Download(d) => {
                assert_eq!(d.athlete_id, Some(42));
                assert_eq!(d.club_id.as_deref(), Some("hedonism"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert!(serde_json::from_value::<AnalyticsEvent>(json!({"type": "click"})).is_err());
    }

    #[tokio::test]
    async fn test_stats_aggregate_events() {
        let db = create_test_db().await;

        record_download(&db, DownloadEvent::default(), client()).await.unwrap();
        record_download(&db, DownloadEvent::default(), client()).await.unwrap();
        record_visit(&db, VisitEvent::default(), client()).await.unwrap();

        let report = stats(&db).await.unwrap();
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].downloads, 2);
        assert_eq!(report.daily[0].visits, 1);
        assert_eq!(report.daily[0].auth_events, 0);
        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.daily[0].period.len(), 10);
        assert_eq!(report.monthly[0].period.len(), 7);
    }

    #[tokio::test]
    async fn test_visit_defaults_page_path() {
        let db = create_test_db().await;
        let id = record_visit(&db, VisitEvent::default(), client()).await.unwrap();
        let row = visit::Entity::find_by_id(id).one(&db).await.unwrap().unwrap();
        assert_eq!(row.page_path, "/");
        assert_eq!(row.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[tokio::test]
    async fn test_auth_for_unknown_athlete_is_not_found() {
        let db = create_test_db().await;
        let result = record_auth(&db, AuthEvent { athlete_id: Some(1) }).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = record_auth(&db, AuthEvent { athlete_id: None }).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
