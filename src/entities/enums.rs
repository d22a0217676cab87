//! Closed enumerations shared across the entity modules.
//!
//! The string values are contract surface: they round-trip through the
//! database, the query string, and JSON responses, so every variant pins its
//! exact wire form. Task and issue lifecycles overlap textually but are
//! independent domains and stay separate types.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a compliance issue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum IssueStatus {
    #[sea_orm(string_value = "todo")]
    #[serde(rename = "todo")]
    Todo,
    #[sea_orm(string_value = "in_progress")]
    #[serde(rename = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "in_review")]
    #[serde(rename = "in_review")]
    InReview,
    #[sea_orm(string_value = "in_remediation")]
    #[serde(rename = "in_remediation")]
    InRemediation,
    #[sea_orm(string_value = "resolved")]
    #[serde(rename = "resolved")]
    Resolved,
    #[sea_orm(string_value = "invalid")]
    #[serde(rename = "invalid")]
    Invalid,
    #[sea_orm(string_value = "exception")]
    #[serde(rename = "exception")]
    Exception,
    #[sea_orm(string_value = "backlog")]
    #[serde(rename = "backlog")]
    Backlog,
    #[sea_orm(string_value = "archived")]
    #[serde(rename = "archived")]
    Archived,
    #[sea_orm(string_value = "canceled")]
    #[serde(rename = "canceled")]
    Canceled,
    #[sea_orm(string_value = "done")]
    #[serde(rename = "done")]
    Done,
}

/// Issue priority. Nullable on the issue row, hence the explicit `none`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum IssuePriority {
    #[sea_orm(string_value = "low")]
    #[serde(rename = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[serde(rename = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    #[serde(rename = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    #[serde(rename = "urgent")]
    Urgent,
    #[sea_orm(string_value = "none")]
    #[serde(rename = "none")]
    None,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum IssueKind {
    #[sea_orm(string_value = "text")]
    #[serde(rename = "text")]
    Text,
    #[sea_orm(string_value = "image")]
    #[serde(rename = "image")]
    Image,
    #[sea_orm(string_value = "link")]
    #[serde(rename = "link")]
    Link,
}

/// Lifecycle of a task. Distinct from [`IssueStatus`] even where the labels
/// coincide; note the hyphenated `in-progress` wire form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum TaskStatus {
    #[sea_orm(string_value = "todo")]
    #[serde(rename = "todo")]
    Todo,
    #[sea_orm(string_value = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "done")]
    #[serde(rename = "done")]
    Done,
    #[sea_orm(string_value = "canceled")]
    #[serde(rename = "canceled")]
    Canceled,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    #[serde(rename = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[serde(rename = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    #[serde(rename = "high")]
    High,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum TaskLabel {
    #[sea_orm(string_value = "bug")]
    #[serde(rename = "bug")]
    Bug,
    #[sea_orm(string_value = "feature")]
    #[serde(rename = "feature")]
    Feature,
    #[sea_orm(string_value = "enhancement")]
    #[serde(rename = "enhancement")]
    Enhancement,
    #[sea_orm(string_value = "documentation")]
    #[serde(rename = "documentation")]
    Documentation,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum DocumentKind {
    #[sea_orm(string_value = "guidelines")]
    #[serde(rename = "guidelines")]
    Guidelines,
    #[sea_orm(string_value = "product-info")]
    #[serde(rename = "product-info")]
    ProductInfo,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum ScanStatus {
    #[sea_orm(string_value = "waiting")]
    #[serde(rename = "waiting")]
    Waiting,
    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    Active,
    #[sea_orm(string_value = "complete")]
    #[serde(rename = "complete")]
    Complete,
    #[sea_orm(string_value = "error")]
    #[serde(rename = "error")]
    Error,
    #[sea_orm(string_value = "review")]
    #[serde(rename = "review")]
    Review,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum SnapshotKind {
    #[sea_orm(string_value = "website")]
    #[serde(rename = "website")]
    Website,
    #[sea_orm(string_value = "video")]
    #[serde(rename = "video")]
    Video,
    #[sea_orm(string_value = "audio")]
    #[serde(rename = "audio")]
    Audio,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
pub enum ContentType {
    #[sea_orm(string_value = "blog")]
    #[serde(rename = "blog")]
    Blog,
    #[sea_orm(string_value = "video")]
    #[serde(rename = "video")]
    Video,
    #[sea_orm(string_value = "email")]
    #[serde(rename = "email")]
    Email,
    #[sea_orm(string_value = "youtube")]
    #[serde(rename = "youtube")]
    Youtube,
    #[sea_orm(string_value = "instagram")]
    #[serde(rename = "instagram")]
    Instagram,
    #[sea_orm(string_value = "linkedin")]
    #[serde(rename = "linkedin")]
    Linkedin,
    #[sea_orm(string_value = "tiktok")]
    #[serde(rename = "tiktok")]
    Tiktok,
    #[sea_orm(string_value = "website")]
    #[serde(rename = "website")]
    Website,
    #[sea_orm(string_value = "podcast")]
    #[serde(rename = "podcast")]
    Podcast,
}
