//! List and summary queries for the dashboard views.
//!
//! Each view module owns its field catalog, its basic-filter mapping and its
//! public query functions. The public functions never fail: a storage error
//! is logged through `tracing` and degraded to an empty page (or an all-zero
//! count map), so the tables always render.

use sea_orm::{
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select,
};

use crate::filtering::pagination::offset;

pub mod issues;
pub mod products;
pub mod tasks;

/// Run the row query and the count query for one page against the same
/// transaction, so the total and the rows describe the same snapshot even
/// under concurrent writes.
///
/// `query` must already carry the compiled predicate and the native ORDER BY
/// keys; this applies only LIMIT/OFFSET for the requested page.
pub(crate) async fn fetch_page<E>(
    txn: &DatabaseTransaction,
    query: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let rows = query
        .clone()
        .limit(per_page)
        .offset(offset(page, per_page))
        .all(txn)
        .await?;
    let total = query.count(txn).await?;
    Ok((rows, total))
}
