//! # compliance-core
//!
//! Query engine behind the compliance-monitoring dashboard's data tables.
//! Staff browse tasks, products and flagged compliance issues through
//! filterable, sortable, paginated list views; this crate owns everything
//! between the decoded query string and the JSON page the table renders:
//!
//! - **Predicate compilation** ([`filtering::conditions`]): simple per-field
//!   filters or a general AND/OR condition tree, compiled against a static
//!   per-view field catalog into Sea-ORM conditions.
//! - **Sort planning** ([`filtering::sort`]): multi-key sort state split into
//!   storage-side ORDER BY keys and derived keys resolved in memory.
//! - **Paginated execution** ([`queries`]): one page of rows plus the total
//!   count, read in a single transaction so pagination math stays consistent
//!   under concurrent writes.
//! - **Denormalization** ([`records`]): joined rows flattened into the flat
//!   records the UI consumes, with derived fields like the formatted issue
//!   id and the monetization flag.
//!
//! List reads never surface storage errors: failures are logged via
//! `tracing` and degrade to an empty page, so the table always renders.
//! Malformed or stale filter state from the URL is dropped per field rather
//! than failing the request.

pub mod entities;
pub mod filtering;
pub mod models;
pub mod queries;
pub mod records;
pub mod routes;

pub use models::{
    FilterMode, IssueListParams, JoinOperator, ListResponse, NumberRangeBounds,
    ProductListParams, SortField, TaskListParams,
};
pub use records::{AffiliateLink, IssueRecord, ProductRecord, parse_affiliate_links};
pub use routes::router;
