//! Import and synchronization of template definitions into the `templates` table.
//!
//! Every run executes inside one transaction: either all templates of the
//! batch are written or none are.

use std::fmt;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::db::DbConn;
use crate::error::Result;
use crate::extract::{ClubTemplates, TemplateDefinition};
use crate::models::template::{self, TemplateStatus};
use crate::services::clubs::ensure_club;
use crate::templates::{build_pages, tags_for, Layout};

/// What to do with a template id that already has a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingPolicy {
    /// Leave the row untouched.
    Skip,
    /// Set status back to `published` when it is not; the version is kept.
    Republish,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub layout: Layout,
    pub existing: ExistingPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Republished,
    AlreadyPublished,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub club_id: String,
    pub template_id: String,
    pub name: String,
    pub action: SyncAction,
    pub previous_status: Option<TemplateStatus>,
    pub version: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub clubs_created: Vec<String>,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}

/// Apply one template definition inside an open connection or transaction.
pub async fn sync_template<C>(
    conn: &C,
    club_id: &str,
    definition: &TemplateDefinition,
    options: SyncOptions,
) -> Result<SyncOutcome>
where
    C: ConnectionTrait,
{
    let existing = template::Entity::find_by_id(definition.id.clone())
        .one(conn)
        .await?;

    let outcome = |action, previous_status, version| SyncOutcome {
        club_id: club_id.to_string(),
        template_id: definition.id.clone(),
        name: definition.name.clone(),
        action,
        previous_status,
        version,
    };

    let Some(row) = existing else {
        let now = chrono::Utc::now();
        let pages = build_pages(definition, club_id, options.layout);
        let model = template::ActiveModel {
            id: Set(definition.id.clone()),
            club_id: Set(club_id.to_string()),
            name: Set(definition.name.clone()),
            description: Set(Some(definition.description.clone().unwrap_or_default())),
            tags: Set(serde_json::to_value(tags_for(definition))?),
            pages: Set(serde_json::to_value(pages)?),
            version: Set(1),
            status: Set(TemplateStatus::Published),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(conn).await?;
        tracing::info!(template_id = %definition.id, club_id, "Template created");
        return Ok(outcome(SyncAction::Created, None, 1));
    };

    let previous = row.status;
    let version = row.version;

    match (options.existing, previous) {
        (ExistingPolicy::Skip, _) => {
            tracing::info!(template_id = %definition.id, "Template exists, skipping");
            Ok(outcome(SyncAction::Skipped, Some(previous), version))
        }
        (ExistingPolicy::Republish, TemplateStatus::Published) => {
            Ok(outcome(SyncAction::AlreadyPublished, Some(previous), version))
        }
        (ExistingPolicy::Republish, _) => {
            let mut active = row.into_active_model();
            active.status = Set(TemplateStatus::Published);
            active.updated_at = Set(chrono::Utc::now());
            active.update(conn).await?;
            tracing::info!(
                template_id = %definition.id,
                from = %previous,
                "Template republished"
            );
            Ok(outcome(SyncAction::Republished, Some(previous), version))
        }
    }
}

/// Ensure each club exists, then sync every template, all in one transaction.
pub async fn sync_catalogue(
    db: &DbConn,
    catalogue: &[ClubTemplates],
    options: SyncOptions,
) -> Result<SyncReport> {
    let txn = db.begin().await?;
    let mut report = SyncReport::default();

    for club in catalogue {
        if ensure_club(&txn, &club.club_id).await? {
            report.clubs_created.push(club.club_id.clone());
        }
        for definition in &club.templates {
            let outcome = sync_template(&txn, &club.club_id, definition, options).await?;
            report.outcomes.push(outcome);
        }
    }

    txn.commit().await?;
    Ok(report)
}

/// Rows soft-deleted via `status = 'deleted'`, most recently updated first.
pub async fn list_deleted(db: &DbConn) -> Result<Vec<template::Model>> {
    Ok(template::Entity::find()
        .filter(template::Column::Status.eq(TemplateStatus::Deleted))
        .order_by_desc(template::Column::UpdatedAt)
        .all(db)
        .await?)
}

/// Permanently remove soft-deleted rows. Returns the number removed.
pub async fn purge_deleted(db: &DbConn) -> Result<u64> {
    let txn = db.begin().await?;
    let result = template::Entity::delete_many()
        .filter(template::Column::Status.eq(TemplateStatus::Deleted))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(removed = result.rows_affected, "Purged deleted templates");
    Ok(result.rows_affected)
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for club in &self.clubs_created {
            writeln!(f, "Created club: {club}")?;
        }
        let mut current = None;
        for outcome in &self.outcomes {
            if current != Some(outcome.club_id.as_str()) {
                current = Some(outcome.club_id.as_str());
                writeln!(f, "Club: {}", outcome.club_id)?;
            }
            let label = match outcome.action {
                SyncAction::Created => "created",
                SyncAction::Republished => "republished",
                SyncAction::AlreadyPublished => "already published",
                SyncAction::Skipped => "exists, skipped",
            };
            writeln!(
                f,
                "  {:<30} {:<20} {} (v{})",
                outcome.name, outcome.template_id, label, outcome.version
            )?;
        }
        write!(
            f,
            "Created: {} | Republished: {} | Unchanged: {}",
            self.count(SyncAction::Created),
            self.count(SyncAction::Republished),
            self.count(SyncAction::AlreadyPublished) + self.count(SyncAction::Skipped),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::fallback_catalogue;
    use crate::test_helpers::create_test_db;
    use sea_orm::PaginatorTrait;

    const REPUBLISH: SyncOptions = SyncOptions {
        layout: Layout::Blank,
        existing: ExistingPolicy::Republish,
    };

    async fn set_status(db: &DbConn, id: &str, status: TemplateStatus) {
        let row = template::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .unwrap()
            .unwrap();
        let mut active = row.into_active_model();
        active.status = Set(status);
        active.update(db).await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_creates_published_templates() {
        let db = create_test_db().await;
        let report = sync_catalogue(&db, &fallback_catalogue(), REPUBLISH)
            .await
            .unwrap();

        assert_eq!(report.clubs_created.len(), 2);
        assert_eq!(report.count(SyncAction::Created), 6);

        let published = template::Entity::find()
            .filter(template::Column::Status.eq(TemplateStatus::Published))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(published, 6);
    }

    #[tokio::test]
    async fn test_republish_keeps_version() {
        let db = create_test_db().await;
        sync_catalogue(&db, &fallback_catalogue(), REPUBLISH)
            .await
            .unwrap();
        set_status(&db, "nip-mono", TemplateStatus::Draft).await;

        let report = sync_catalogue(&db, &fallback_catalogue(), REPUBLISH)
            .await
            .unwrap();
        assert_eq!(report.count(SyncAction::Republished), 1);
        assert_eq!(report.count(SyncAction::AlreadyPublished), 5);

        let row = template::Entity::find_by_id("nip-mono".to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, TemplateStatus::Published);
        assert_eq!(row.version, 1);
    }

    #[tokio::test]
    async fn test_skip_policy_leaves_draft() {
        let db = create_test_db().await;
        sync_catalogue(&db, &fallback_catalogue(), REPUBLISH)
            .await
            .unwrap();
        set_status(&db, "hedonism-night", TemplateStatus::Draft).await;

        let options = SyncOptions {
            layout: Layout::Story,
            existing: ExistingPolicy::Skip,
        };
        let report = sync_catalogue(&db, &fallback_catalogue(), options)
            .await
            .unwrap();
        assert_eq!(report.count(SyncAction::Skipped), 6);

        let row = template::Entity::find_by_id("hedonism-night".to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, TemplateStatus::Draft);
    }

    #[tokio::test]
    async fn test_failed_batch_is_rolled_back() {
        let db = create_test_db().await;
        let mut catalogue = fallback_catalogue();
        catalogue.push(ClubTemplates {
            club_id: "unknown-club".to_string(),
            templates: Vec::new(),
        });

        assert!(sync_catalogue(&db, &catalogue, REPUBLISH).await.is_err());
        assert_eq!(template::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_removes_only_deleted() {
        let db = create_test_db().await;
        sync_catalogue(&db, &fallback_catalogue(), REPUBLISH)
            .await
            .unwrap();
        set_status(&db, "nip-classic", TemplateStatus::Deleted).await;
        set_status(&db, "hedonism-mono", TemplateStatus::Deleted).await;

        let deleted = list_deleted(&db).await.unwrap();
        assert_eq!(deleted.len(), 2);

        assert_eq!(purge_deleted(&db).await.unwrap(), 2);
        assert_eq!(template::Entity::find().count(&db).await.unwrap(), 4);
        assert!(list_deleted(&db).await.unwrap().is_empty());
    }

    #[test]
    fn test_report_display_summarises_counts() {
        let report = SyncReport {
            clubs_created: vec!["hedonism".to_string()],
            outcomes: vec![SyncOutcome {
                club_id: "hedonism".to_string(),
                template_id: "hedonism-night".to_string(),
                name: "Night Drive".to_string(),
                action: SyncAction::Created,
                previous_status: None,
                version: 1,
            }],
        };
        let text = report.to_string();
        assert!(text.contains("Created club: hedonism"));
        assert!(text.contains("Created: 1 | Republished: 0 | Unchanged: 0"));
    }
}
