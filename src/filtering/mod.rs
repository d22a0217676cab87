//! # Filtering, sorting & pagination
//!
//! The query-composition layer behind the list views. A request's URL state
//! flows through this module in three steps:
//!
//! 1. [`conditions`] compiles basic per-field filters or the advanced filter
//!    tree into a [`sea_orm::Condition`], consulting the view's
//!    [`catalog::FieldCatalog`].
//! 2. [`sort`] parses the sort state and splits it into native ORDER BY keys
//!    and derived keys.
//! 3. [`pagination`] supplies the offset/page-count arithmetic, and
//!    [`derived`] applies the derived sort keys in memory after
//!    denormalization.
//!
//! Everything here is tolerant by contract: stale or malformed filter and
//! sort state degrades to "no constraint", never to a failed request.

pub mod catalog;
pub mod conditions;
pub mod derived;
pub mod pagination;
pub mod sort;

pub use catalog::{FieldCatalog, FieldDef, FieldVariant};
pub use conditions::{
    BasicFilter, FilterCondition, FilterNode, FilterOperator, compile, compile_basic,
    compile_tree, parse_filter_nodes, parse_millis_pair, parse_number_pair, split_csv,
};
pub use derived::{SortAccessor, SortValue, sort_by_derived_keys};
pub use pagination::{clamp_page, clamp_per_page, offset, page_count};
pub use sort::{default_sort, parse_sort, split_sort};
