use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, TransactionTrait};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::club;
use crate::templates::{builtin_club, builtin_clubs, ClubSeed};

fn active_model(seed: &ClubSeed) -> Result<club::ActiveModel> {
    let now = chrono::Utc::now();
    Ok(club::ActiveModel {
        id: Set(seed.id.to_string()),
        name: Set(seed.name.to_string()),
        slug: Set(seed.slug.to_string()),
        description: Set(Some(seed.description.to_string())),
        theme: Set(serde_json::to_value(&seed.theme)?),
        status: Set("active".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

/// Insert or refresh the built-in clubs. Returns the ids written.
pub async fn init_clubs(db: &DbConn) -> Result<Vec<String>> {
    let txn = db.begin().await?;
    let mut written = Vec::new();

    for seed in builtin_clubs() {
        club::Entity::insert(active_model(&seed)?)
            .on_conflict(
                OnConflict::column(club::Column::Id)
                    .update_columns([
                        club::Column::Name,
                        club::Column::Slug,
                        club::Column::Description,
                        club::Column::Theme,
                        club::Column::Status,
                        club::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        tracing::info!(club_id = seed.id, "Club upserted");
        written.push(seed.id.to_string());
    }

    txn.commit().await?;
    Ok(written)
}

/// Make sure a built-in club row exists without touching an existing one.
///
/// Returns `true` when the club was created.
pub async fn ensure_club<C>(conn: &C, club_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    if club::Entity::find_by_id(club_id.to_string())
        .one(conn)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let seed = builtin_club(club_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown club: {}", club_id)))?;
    active_model(&seed)?.insert(conn).await?;
    tracing::info!(club_id, "Club created");
    Ok(true)
}
