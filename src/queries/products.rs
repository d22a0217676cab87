//! Products list view: products joined with their brand, sortable by the
//! joined brand name.

use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, LoaderTrait, Order, QueryFilter, QueryOrder,
    TransactionTrait,
};

use super::fetch_page;
use crate::entities::{brand, product};
use crate::filtering::{
    BasicFilter, FieldCatalog, FieldDef, FieldVariant, clamp_page, clamp_per_page, compile,
    page_count, parse_millis_pair, sort_by_derived_keys, split_sort,
};
use crate::models::{ListResponse, ProductListParams};
use crate::records::{ProductRecord, denormalize_product};

/// Storage-side sorting covers the id, name, brand and timestamp columns;
/// `link`, `image`, `documentId` and the joined `brandName` fall through to
/// the derived pass.
const FIELDS: &[FieldDef<product::Column>] = &[
    FieldDef { id: "id", column: product::Column::Id, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "name", column: product::Column::Name, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "brandId", column: product::Column::BrandId, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "link", column: product::Column::Link, variant: FieldVariant::Text, sortable: false },
    FieldDef { id: "image", column: product::Column::Image, variant: FieldVariant::Text, sortable: false },
    FieldDef { id: "documentId", column: product::Column::DocumentId, variant: FieldVariant::Number, sortable: false },
    FieldDef { id: "createdAt", column: product::Column::CreatedAt, variant: FieldVariant::DateRange, sortable: true },
    FieldDef { id: "updatedAt", column: product::Column::UpdatedAt, variant: FieldVariant::DateRange, sortable: true },
];

pub(crate) const CATALOG: FieldCatalog<product::Column> = FieldCatalog::new(FIELDS);

fn basic_filters(params: &ProductListParams) -> Vec<BasicFilter<product::Column>> {
    let (created_from, created_to) = parse_millis_pair(params.created_at.as_deref());
    let (updated_from, updated_to) = parse_millis_pair(params.updated_at.as_deref());
    vec![
        BasicFilter::TextContains(
            product::Column::Name,
            params.name.clone().unwrap_or_default(),
        ),
        BasicFilter::DateRange(product::Column::CreatedAt, created_from, created_to),
        BasicFilter::DateRange(product::Column::UpdatedAt, updated_from, updated_to),
    ]
}

/// Page through products with their brand names. Storage failures degrade to
/// an empty page.
pub async fn list_products(
    db: &DatabaseConnection,
    params: &ProductListParams,
) -> ListResponse<ProductRecord> {
    match try_list_products(db, params).await {
        Ok(page) => page,
        Err(err) => {
            tracing::error!(error = %err, view = "products", "list query failed, returning empty page");
            ListResponse::empty()
        }
    }
}

async fn try_list_products(
    db: &DatabaseConnection,
    params: &ProductListParams,
) -> Result<ListResponse<ProductRecord>, DbErr> {
    let page = clamp_page(params.page);
    let per_page = clamp_per_page(params.per_page);

    let condition = compile(
        &CATALOG,
        params.mode(),
        basic_filters(params),
        &params.filter_nodes(),
        params.join_operator(),
    );

    let sort = params.sort_fields();
    let (native, derived) = split_sort(&sort, &CATALOG);

    let mut query = product::Entity::find().filter(condition);
    if sort.is_empty() {
        query = query.order_by(product::Column::UpdatedAt, Order::Desc);
    } else {
        for (column, order) in native {
            query = query.order_by(column, order);
        }
    }

    let txn = db.begin().await?;
    let (rows, total) = fetch_page(&txn, query, page, per_page).await?;
    let brands = rows.load_one(brand::Entity, &txn).await?;
    txn.commit().await?;

    let mut records: Vec<ProductRecord> = rows
        .into_iter()
        .zip(brands)
        .map(|(product, brand)| denormalize_product(product, brand))
        .collect();
    sort_by_derived_keys(&mut records, &derived);

    Ok(ListResponse {
        data: records,
        page_count: page_count(total, per_page),
        total,
    })
}
