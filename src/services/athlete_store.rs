//! Persistence of connected athletes.
//!
//! The database is the primary store. When it is unavailable the profile is
//! written to `<data_dir>/athlete_<id>.json`, merged over any existing file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::db::DbConn;
use crate::error::Result;
use crate::models::{athlete, auth_event};
use crate::services::strava::StravaAthlete;

/// First 16 hex characters of the token's SHA-256 digest.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)[..16].to_string()
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn email_or_default(athlete: &StravaAthlete) -> String {
    athlete
        .email
        .clone()
        .unwrap_or_else(|| "not_provided".to_string())
}

/// Insert or refresh an athlete row; `last_seen_at` is bumped on every call.
pub async fn upsert_athlete<C>(conn: &C, profile: &StravaAthlete, token_hash: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = athlete::ActiveModel {
        athlete_id: Set(profile.id),
        username: Set(profile.username.clone()),
        firstname: Set(profile.firstname.clone()),
        lastname: Set(profile.lastname.clone()),
        email: Set(Some(email_or_default(profile))),
        city: Set(profile.city.clone()),
        country: Set(profile.country.clone()),
        profile_picture: Set(profile.profile.clone()),
        access_token_hash: Set(Some(token_hash.to_string())),
        strava_created_at: Set(parse_timestamp(profile.created_at.as_deref())),
        strava_updated_at: Set(parse_timestamp(profile.updated_at.as_deref())),
        connected_at: Set(now),
        last_seen_at: Set(now),
        is_active: Set(true),
    };

    athlete::Entity::insert(model)
        .on_conflict(
            OnConflict::column(athlete::Column::AthleteId)
                .update_columns([
                    athlete::Column::Username,
                    athlete::Column::Firstname,
                    athlete::Column::Lastname,
                    athlete::Column::Email,
                    athlete::Column::City,
                    athlete::Column::Country,
                    athlete::Column::ProfilePicture,
                    athlete::Column::AccessTokenHash,
                    athlete::Column::StravaUpdatedAt,
                    athlete::Column::LastSeenAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Record that an athlete authenticated on `day`. Repeats on the same day are ignored.
pub async fn record_auth_event<C>(conn: &C, athlete_id: i64, day: NaiveDate) -> Result<()>
where
    C: ConnectionTrait,
{
    let model = auth_event::ActiveModel {
        athlete_id: Set(athlete_id),
        event_date: Set(day),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    auth_event::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([auth_event::Column::AthleteId, auth_event::Column::EventDate])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

fn athlete_file(data_dir: &Path, athlete_id: i64) -> PathBuf {
    data_dir.join(format!("athlete_{athlete_id}.json"))
}

/// Write the athlete profile to the flat-file store, merging into an existing file.
pub async fn save_to_file(
    data_dir: &Path,
    profile: &StravaAthlete,
    token_hash: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = athlete_file(data_dir, profile.id);

    let mut record: Map<String, Value> = match tokio::fs::read(&path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(existing)) => existing,
            _ => {
                tracing::warn!(path = %path.display(), "Replacing unreadable athlete file");
                Map::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
        Err(e) => return Err(e.into()),
    };

    let update = serde_json::json!({
        "athlete_id": profile.id,
        "username": profile.username,
        "firstname": profile.firstname,
        "lastname": profile.lastname,
        "email": email_or_default(profile),
        "city": profile.city,
        "country": profile.country,
        "profile_picture": profile.profile,
        "created_at": profile.created_at,
        "updated_at": profile.updated_at,
        "connected_at": Utc::now().to_rfc3339(),
        "access_token_hash": token_hash,
    });
    if let Value::Object(fields) = update {
        record.extend(fields);
    }

    tokio::fs::write(&path, serde_json::to_vec_pretty(&Value::Object(record))?).await?;
    Ok(path)
}

/// Connected athlete as listed by the admin endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AthleteSummary {
    pub athlete_id: i64,
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl From<athlete::Model> for AthleteSummary {
    fn from(model: athlete::Model) -> Self {
        Self {
            athlete_id: model.athlete_id,
            username: model.username,
            firstname: model.firstname,
            lastname: model.lastname,
            email: model.email,
            city: model.city,
            country: model.country,
            connected_at: model.connected_at,
            last_seen_at: model.last_seen_at,
        }
    }
}

/// Active athletes, most recently connected first.
pub async fn list_active(db: &DbConn) -> Result<Vec<AthleteSummary>> {
    Ok(athlete::Entity::find()
        .filter(athlete::Column::IsActive.eq(true))
        .order_by_desc(athlete::Column::ConnectedAt)
        .all(db)
        .await?
        .into_iter()
        .map(AthleteSummary::from)
        .collect())
}

/// Athletes from the flat-file store, most recently connected first.
///
/// A missing directory yields an empty list; unreadable files are skipped.
pub async fn list_from_files(data_dir: &Path) -> Result<Vec<Value>> {
    let mut entries = match tokio::fs::read_dir(data_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut users = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !(name.starts_with("athlete_") && name.ends_with(".json")) {
            continue;
        }
        match tokio::fs::read(entry.path()).await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!(file = %name, "Skipping unreadable athlete file: {}", e),
            },
            Err(e) => tracing::warn!(file = %name, "Skipping unreadable athlete file: {}", e),
        }
    }

    let connected_at = |v: &Value| {
        v.get("connected_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    users.sort_by_key(|v| std::cmp::Reverse(connected_at(v)));
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;
    use sea_orm::PaginatorTrait;

    fn profile(id: i64) -> StravaAthlete {
        StravaAthlete {
            id,
            firstname: Some("Ana".to_string()),
            lastname: Some("Runner".to_string()),
            city: Some("Paris".to_string()),
            created_at: Some("2020-05-01T10:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_hash_token_is_truncated_sha256() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(hash_token("abc"), "ba7816bf8f01cfea");
        assert_eq!(hash_token("abc").len(), 16);
    }

    #[tokio::test]
    async fn test_upsert_athlete_updates_existing() {
        let db = create_test_db().await;
        upsert_athlete(&db, &profile(1), "aaaa").await.unwrap();

        let mut changed = profile(1);
        changed.city = Some("Lyon".to_string());
        upsert_athlete(&db, &changed, "bbbb").await.unwrap();

        assert_eq!(athlete::Entity::find().count(&db).await.unwrap(), 1);
        let row = athlete::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
        assert_eq!(row.city.as_deref(), Some("Lyon"));
        assert_eq!(row.access_token_hash.as_deref(), Some("bbbb"));
        assert_eq!(row.email.as_deref(), Some("not_provided"));
        assert!(row.strava_created_at.is_some());
    }

    #[tokio::test]
    async fn test_auth_event_unique_per_day() {
        let db = create_test_db().await;
        upsert_athlete(&db, &profile(5), "hash").await.unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        record_auth_event(&db, 5, day).await.unwrap();
        record_auth_event(&db, 5, day).await.unwrap();
        record_auth_event(&db, 5, day.succ_opt().unwrap()).await.unwrap();

        assert_eq!(auth_event::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_file_store_merges_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("athlete_9.json");
        tokio::fs::write(&path, r#"{"athlete_id": 9, "note": "keep me"}"#)
            .await
            .unwrap();

        let written = save_to_file(dir.path(), &profile(9), "cafe").await.unwrap();
        assert_eq!(written, path);

        let saved: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(saved["note"], "keep me");
        assert_eq!(saved["firstname"], "Ana");
        assert_eq!(saved["access_token_hash"], "cafe");
        assert!(saved["connected_at"].is_string());
    }

    #[tokio::test]
    async fn test_list_from_files_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        for (id, connected) in [(1, "2026-01-01T00:00:00Z"), (2, "2026-02-01T00:00:00Z")] {
            let body = serde_json::json!({"athlete_id": id, "connected_at": connected});
            tokio::fs::write(
                dir.path().join(format!("athlete_{id}.json")),
                body.to_string(),
            )
            .await
            .unwrap();
        }
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();
        tokio::fs::write(dir.path().join("athlete_bad.json"), "{").await.unwrap();

        let users = list_from_files(dir.path()).await.unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u["athlete_id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_list_from_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let users = list_from_files(&dir.path().join("missing")).await.unwrap();
        assert!(users.is_empty());
    }
}
