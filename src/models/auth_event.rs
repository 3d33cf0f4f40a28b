use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub athlete_id: i64,
    pub event_date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::athlete::Entity",
        from = "Column::AthleteId",
        to = "super::athlete::Column::AthleteId",
        on_delete = "Cascade"
    )]
    Athlete,
}

impl Related<super::athlete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
