//! `SeaORM` Entity for journal_entries table.
//!
//! Lines are stored inline as JSONB in their wire shape.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub linked_doc: Option<String>,
    pub description: Option<String>,
    #[sea_orm(unique)]
    pub idempotency_key: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub lines: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
