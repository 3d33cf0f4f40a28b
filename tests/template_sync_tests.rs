//! Club seeding, template import and reporting against a migrated database

use std::io::Write;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

mod common;
use common::create_test_db;

use addicted::extract::{load_template_definitions, parse_template_definitions};
use addicted::models::template::{self, TemplateStatus};
use addicted::services::template_report::{check, check_local, compare};
use addicted::services::template_sync::{purge_deleted, SyncAction};
use addicted::services::{init_clubs, sync_catalogue, ExistingPolicy, SyncOptions};
use addicted::templates::{fallback_catalogue, Layout};

const REPUBLISH: SyncOptions = SyncOptions {
    layout: Layout::Story,
    existing: ExistingPolicy::Republish,
};

#[tokio::test]
async fn test_seed_and_sync_publishes_six_templates() {
    let db = create_test_db().await;
    let clubs = init_clubs(&db).await.unwrap();
    assert_eq!(clubs.len(), 2);

    let report = sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();
    assert_eq!(report.count(SyncAction::Created), 6);

    let published = template::Entity::find()
        .filter(template::Column::Status.eq(TemplateStatus::Published))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(published.len(), 6);
    for club in ["hedonism", "not-in-paris"] {
        assert_eq!(published.iter().filter(|t| t.club_id == club).count(), 3);
    }

    let drafts = template::Entity::find()
        .filter(template::Column::Status.eq(TemplateStatus::Draft))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(drafts, 0);
}

#[tokio::test]
async fn test_sync_twice_is_idempotent() {
    let db = create_test_db().await;
    init_clubs(&db).await.unwrap();

    sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();
    let second = sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();

    assert_eq!(second.count(SyncAction::Created), 0);
    assert_eq!(second.count(SyncAction::AlreadyPublished), 6);
    assert_eq!(template::Entity::find().count(&db).await.unwrap(), 6);

    let versions: Vec<i32> = template::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.version)
        .collect();
    assert!(versions.iter().all(|v| *v == 1));
}

#[tokio::test]
async fn test_compare_round_trip_and_restore() {
    let db = create_test_db().await;
    init_clubs(&db).await.unwrap();

    let before = compare(&db, &fallback_catalogue()).await.unwrap();
    assert!(!before.in_sync());
    assert!(before.clubs.iter().all(|c| c.missing.len() == 3));

    sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();
    let after = compare(&db, &fallback_catalogue()).await.unwrap();
    assert!(after.in_sync());
    assert!(after.clubs.iter().all(|c| c.published.len() == 3));

    // Soft-delete one template, then restore it.
    let victim = template::Entity::find().one(&db).await.unwrap().unwrap();
    let victim_id = victim.id.clone();
    let mut active: template::ActiveModel = victim.into();
    active.status = Set(TemplateStatus::Deleted);
    active.update(&db).await.unwrap();

    assert!(!compare(&db, &fallback_catalogue()).await.unwrap().in_sync());

    let report = sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();
    assert_eq!(report.count(SyncAction::Republished), 1);
    let restored = template::Entity::find_by_id(victim_id).one(&db).await.unwrap().unwrap();
    assert_eq!(restored.status, TemplateStatus::Published);
    assert_eq!(restored.version, 1);
}

#[tokio::test]
async fn test_check_counts_statuses() {
    let db = create_test_db().await;
    init_clubs(&db).await.unwrap();
    sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();

    let report = check(&db).await.unwrap();
    assert_eq!(report.published().count(), 6);
    let rendered = report.to_string();
    assert!(rendered.contains("hedonism"));
    assert!(rendered.contains("not-in-paris"));
}

#[tokio::test]
async fn test_purge_removes_only_deleted() {
    let db = create_test_db().await;
    init_clubs(&db).await.unwrap();
    sync_catalogue(&db, &fallback_catalogue(), REPUBLISH).await.unwrap();

    let victim = template::Entity::find().one(&db).await.unwrap().unwrap();
    let mut active: template::ActiveModel = victim.into();
    active.status = Set(TemplateStatus::Deleted);
    active.update(&db).await.unwrap();

    assert_eq!(purge_deleted(&db).await.unwrap(), 1);
    assert_eq!(template::Entity::find().count(&db).await.unwrap(), 5);
}

#[tokio::test]
async fn test_import_from_source_file_skips_existing() {
    let mut source = tempfile::NamedTempFile::new().unwrap();
    write!(
        source,
        r#"
const templates = {{
    'hedonism': [
        {{ id: 'hedonism-night', name: 'Night Run', description: "After dark", badge: 'NEW',
           config: {{ backgroundMode: 'gradient', fontColor: 'white' }} }},
        {{ id: 'hedonism-nameless', description: 'no name here' }}
    ],
    'not-in-paris': []
}};
"#
    )
    .unwrap();

    let catalogue = load_template_definitions(source.path()).unwrap();
    let hedonism = catalogue.iter().find(|c| c.club_id == "hedonism").unwrap();
    assert_eq!(hedonism.templates.len(), 1);
    assert_eq!(hedonism.templates[0].name, "Night Run");

    let db = create_test_db().await;
    init_clubs(&db).await.unwrap();
    let options = SyncOptions {
        layout: Layout::Blank,
        existing: ExistingPolicy::Skip,
    };

    let first = sync_catalogue(&db, &catalogue, options).await.unwrap();
    assert_eq!(first.count(SyncAction::Created), 1);
    let second = sync_catalogue(&db, &catalogue, options).await.unwrap();
    assert_eq!(second.count(SyncAction::Skipped), 1);

    let row = template::Entity::find_by_id("hedonism-night".to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.tags, serde_json::json!(["new"]));
}

#[test]
fn test_check_local_against_fallback() {
    let fallback = fallback_catalogue();
    let report = check_local(&fallback, &fallback);
    assert!(report.in_sync());

    let source = parse_template_definitions("'hedonism': [ { id: 'other', name: 'Other' } ]");
    let report = check_local(&source, &fallback);
    assert!(!report.in_sync());
    let hedonism = report.clubs.iter().find(|c| c.club_id == "hedonism").unwrap();
    assert_eq!(hedonism.only_source, vec!["other".to_string()]);
    assert_eq!(hedonism.only_catalogue.len(), 3);
}
