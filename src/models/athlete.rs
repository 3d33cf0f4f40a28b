use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "athletes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub athlete_id: i64,
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
    /// First 16 hex chars of the SHA-256 of the access token. The token itself is never stored.
    pub access_token_hash: Option<String>,
    pub strava_created_at: Option<DateTimeUtc>,
    pub strava_updated_at: Option<DateTimeUtc>,
    pub connected_at: DateTimeUtc,
    pub last_seen_at: DateTimeUtc,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_event::Entity")]
    AuthEvents,
}

impl Related<super::auth_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
