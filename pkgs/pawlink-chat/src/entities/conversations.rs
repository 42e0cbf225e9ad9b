//! Conversation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String, // appointment event id, one conversation per event
    pub owner_participant_id: Option<String>, // pet-owner participant, filled on first owner-side open
    pub vet_participant_id: Option<String>, // veterinarian participant, filled on first vet-side open
    pub status: String,         // "Open" or "Closed"
    pub created_at: i64,        // epoch millis, set once at creation
    pub closed_at: Option<i64>, // epoch millis, non-null iff status is "Closed"
    pub updated_at: i64,        // epoch millis, bumped on every write
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
