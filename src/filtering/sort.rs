//! Sort-state parsing and the native/derived sort plan split.

use sea_orm::{ColumnTrait, Order};

use super::catalog::FieldCatalog;
use crate::models::SortField;

/// Decode the `sort` query parameter, a JSON array of `{"id", "desc"}`
/// entries. An absent or malformed parameter falls back to the default sort
/// state (newest first); an explicit empty array is honored and left for the
/// query layer to default.
#[must_use]
pub fn parse_sort(raw: Option<&str>) -> Vec<SortField> {
    let Some(raw) = raw else {
        return default_sort();
    };
    match serde_json::from_str(raw) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed sort parameter");
            default_sort()
        }
    }
}

/// Default sort state shared by the three list views.
#[must_use]
pub fn default_sort() -> Vec<SortField> {
    vec![SortField {
        id: "createdAt".to_owned(),
        desc: true,
    }]
}

/// Partition requested sort keys into storage-side ORDER BY entries and
/// derived keys for the in-memory pass, both preserving request order. A key
/// is native iff the catalog knows it and marks it sortable; everything else
/// (joined fields, stale ids) is handed to the derived pass.
pub fn split_sort<C: ColumnTrait>(
    sort: &[SortField],
    catalog: &FieldCatalog<C>,
) -> (Vec<(C, Order)>, Vec<SortField>) {
    let mut native = Vec::new();
    let mut derived = Vec::new();
    for field in sort {
        match catalog.get(&field.id) {
            Some(def) if def.sortable => native.push((def.column, order_from(field.desc))),
            _ => derived.push(field.clone()),
        }
    }
    (native, derived)
}

fn order_from(desc: bool) -> Order {
    if desc { Order::Desc } else { Order::Asc }
}
