//! Point-in-time capture of a piece of content. The `affiliate_links` payload
//! is semi-structured JSON scraped from the page; the denormalizer parses it
//! tolerantly when computing the monetization flag.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::SnapshotKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_snapshots")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub content_id: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    #[sea_orm(column_type = "Json", nullable)]
    pub disclosures: Option<Json>,
    #[sea_orm(column_type = "Json", nullable)]
    pub affiliate_links: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
