//! Query parameters and response envelopes for the list endpoints.
//!
//! Composite values travel JSON-encoded inside individual query-string
//! parameters so the whole table state fits in a URL:
//!
//! - **Sorting:** `sort=[{"id":"createdAt","desc":true}]`, ordered and
//!   multi-key; ids may name derived fields such as `brandName`.
//! - **Advanced filters:** `filters=[{"id":"status","operator":"isIn",
//!   "value":["todo"],"variant":"select"}]` plus `joinOperator=and|or`,
//!   active when `filterMode=advanced`.
//! - **Simple filters:** per-field parameters (`title=...`,
//!   `status=todo,done`, `createdAt=[from,to]` in epoch milliseconds),
//!   active in the default basic mode.
//!
//! All of it decodes tolerantly: unknown or malformed state never fails a
//! request.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::filtering::{FilterNode, parse_filter_nodes, parse_sort};

/// How the per-view filter parameters are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    #[default]
    Basic,
    /// The aliases preserve URL state written by older clients.
    #[serde(alias = "advancedFilters", alias = "commandFilters")]
    Advanced,
}

/// Combinator applied at the root of the advanced filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

/// One requested sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortField {
    /// External field id; either a column of the queried entity or a derived
    /// field of the denormalized record.
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

/// One page of a list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    /// `ceil(total / perPage)`; 0 exactly when `total` is 0.
    pub page_count: u64,
    pub total: u64,
}

impl<T> ListResponse<T> {
    /// The degraded result every list query falls back to on storage
    /// failure: no rows, no pages.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            page_count: 0,
            total: 0,
        }
    }
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Observed bounds of a numeric column, e.g. task estimated hours. Drives
/// range-slider endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct NumberRangeBounds {
    pub min: f32,
    pub max: f32,
}

/// Query parameters of the tasks list view.
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    /// 1-based page number.
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// JSON sort state, e.g. `[{"id":"createdAt","desc":true}]`.
    pub sort: Option<String>,
    /// Substring match on the task title.
    pub title: Option<String>,
    /// Comma-separated task statuses.
    #[param(example = "todo,in-progress")]
    pub status: Option<String>,
    /// Comma-separated task priorities.
    pub priority: Option<String>,
    /// JSON `[from,to]` bounds on estimated hours.
    pub estimated_hours: Option<String>,
    /// JSON `[from,to]` creation-date bounds in epoch milliseconds.
    pub created_at: Option<String>,
    #[serde(alias = "filterFlag")]
    pub filter_mode: Option<FilterMode>,
    /// JSON advanced filter tree.
    pub filters: Option<String>,
    pub join_operator: Option<JoinOperator>,
}

/// Query parameters of the products list view.
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// JSON sort state; `brandName` sorts the joined brand name in memory.
    pub sort: Option<String>,
    /// Substring match on the product name.
    pub name: Option<String>,
    /// JSON `[from,to]` creation-date bounds in epoch milliseconds.
    pub created_at: Option<String>,
    /// JSON `[from,to]` update-date bounds in epoch milliseconds.
    pub updated_at: Option<String>,
    #[serde(alias = "filterFlag")]
    pub filter_mode: Option<FilterMode>,
    pub filters: Option<String>,
    pub join_operator: Option<JoinOperator>,
}

/// Query parameters of the compliance-issues list view.
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct IssueListParams {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
    pub sort: Option<String>,
    /// Exact brand id.
    pub brand_id: Option<String>,
    /// Substring match on the sequential issue number.
    pub issue_number: Option<String>,
    /// Comma-separated issue statuses.
    #[param(example = "todo,in_review")]
    pub status: Option<String>,
    /// Comma-separated issue priorities.
    pub priority: Option<String>,
    /// JSON `[from,to]` creation-date bounds in epoch milliseconds.
    pub created_at: Option<String>,
    /// JSON `[from,to]` update-date bounds in epoch milliseconds; used by the
    /// status-count facet.
    pub updated_at: Option<String>,
    #[serde(alias = "filterFlag")]
    pub filter_mode: Option<FilterMode>,
    pub filters: Option<String>,
    pub join_operator: Option<JoinOperator>,
}

macro_rules! shared_param_accessors {
    ($params:ty) => {
        impl $params {
            #[must_use]
            pub fn mode(&self) -> FilterMode {
                self.filter_mode.unwrap_or_default()
            }

            #[must_use]
            pub fn join_operator(&self) -> JoinOperator {
                self.join_operator.unwrap_or_default()
            }

            #[must_use]
            pub fn sort_fields(&self) -> Vec<SortField> {
                parse_sort(self.sort.as_deref())
            }

            #[must_use]
            pub fn filter_nodes(&self) -> Vec<FilterNode> {
                parse_filter_nodes(self.filters.as_deref())
            }
        }
    };
}

shared_param_accessors!(TaskListParams);
shared_param_accessors!(ProductListParams);
shared_param_accessors!(IssueListParams);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_mode_accepts_legacy_flag_values() {
        for raw in ["\"advanced\"", "\"advancedFilters\"", "\"commandFilters\""] {
            let mode: FilterMode = serde_json::from_str(raw).unwrap();
            assert_eq!(mode, FilterMode::Advanced);
        }
        let mode: FilterMode = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(mode, FilterMode::Basic);
    }

    #[test]
    fn params_default_to_basic_and_on_newest_first() {
        let params = IssueListParams::default();
        assert_eq!(params.mode(), FilterMode::Basic);
        assert_eq!(params.join_operator(), JoinOperator::And);
        assert!(params.filter_nodes().is_empty());
        let sort = params.sort_fields();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].id, "createdAt");
        assert!(sort[0].desc);
    }

    #[test]
    fn list_response_serializes_with_camel_case_envelope() {
        let response = ListResponse {
            data: vec![1, 2, 3],
            page_count: 1,
            total: 3,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pageCount"], 1);
        assert_eq!(json["total"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }
}
