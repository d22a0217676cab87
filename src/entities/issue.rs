//! A flagged content violation for a brand. The widest entity in the schema:
//! the issues list view joins seven related entities to build its records.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{IssueKind, IssuePriority, IssueStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "compliance_issues")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub is_valid: bool,
    pub brand_id: String,
    pub content_id: i32,
    /// Sequential number within the brand; combined with the brand's
    /// `issue_identifier` prefix to form the displayed id.
    pub issue_number: i32,
    #[sea_orm(column_type = "Text")]
    pub issue_identifier: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub status: IssueStatus,
    pub priority: Option<IssuePriority>,
    #[sea_orm(column_type = "Text", nullable)]
    pub violating_content: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub explanation: Option<String>,
    pub risk: Option<i16>,
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,
    pub document_id: Option<i32>,
    pub user_id: Option<i64>,
    pub snapshot_id: Option<i32>,
    pub scan_id: Option<i32>,
    pub scorecard_item_id: Option<i64>,
    pub affiliate_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id"
    )]
    Brand,
    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::ContentId",
        to = "super::content::Column::Id"
    )]
    Content,
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::DocumentId",
        to = "super::document::Column::Id"
    )]
    Document,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::scan::Entity",
        from = "Column::ScanId",
        to = "super::scan::Column::Id"
    )]
    Scan,
    #[sea_orm(
        belongs_to = "super::snapshot::Entity",
        from = "Column::SnapshotId",
        to = "super::snapshot::Column::Id"
    )]
    Snapshot,
    #[sea_orm(
        belongs_to = "super::scorecard_item::Entity",
        from = "Column::ScorecardItemId",
        to = "super::scorecard_item::Column::Id"
    )]
    ScorecardItem,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scan.def()
    }
}

impl Related<super::snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Snapshot.def()
    }
}

impl Related<super::scorecard_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScorecardItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
