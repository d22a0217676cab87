//! Static field catalogs.
//!
//! Each list view declares, once, the set of fields a caller may filter or
//! sort on: the external field id, the backing column, the value shape, and
//! whether the storage layer can order by it. Both the predicate compiler and
//! the sort splitter consult the catalog instead of doing dynamic property
//! lookups, so a stale field id arriving from URL state simply resolves to
//! nothing.

use sea_orm::ColumnTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Value shape of a filterable field, driving which operators apply and how
/// the raw JSON value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FieldVariant {
    Text,
    Number,
    Boolean,
    DateRange,
    Select,
    MultiSelect,
}

/// One entry of a field catalog.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef<C> {
    /// External id as it appears in sort/filter state, e.g. `createdAt`.
    pub id: &'static str,
    pub column: C,
    pub variant: FieldVariant,
    /// Whether the column participates in storage-side ORDER BY. Fields with
    /// `sortable = false` (and ids unknown to the catalog, such as joined
    /// fields) are handled by the in-memory derived sort pass instead.
    pub sortable: bool,
}

/// Lookup table over a const slice of [`FieldDef`]s.
#[derive(Debug, Clone, Copy)]
pub struct FieldCatalog<C: 'static> {
    fields: &'static [FieldDef<C>],
}

impl<C: ColumnTrait> FieldCatalog<C> {
    #[must_use]
    pub const fn new(fields: &'static [FieldDef<C>]) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FieldDef<C>> {
        self.fields.iter().find(|field| field.id == id)
    }

    #[must_use]
    pub fn is_sortable(&self, id: &str) -> bool {
        self.get(id).is_some_and(|field| field.sortable)
    }
}
