//! Compliance-issues list view and its status facet. The widest query in the
//! crate: one page of issues plus seven loaded relations, flattened into
//! [`IssueRecord`]s.

use std::collections::{BTreeMap, HashMap};

use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Iterable,
    LoaderTrait, Order, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};

use super::fetch_page;
use crate::entities::enums::IssueStatus;
use crate::entities::{
    affiliate, brand, content, document, issue, scan, scorecard_item, snapshot, user,
};
use crate::filtering::{
    BasicFilter, FieldCatalog, FieldDef, FieldVariant, clamp_page, clamp_per_page, compile,
    compile_basic, page_count, parse_millis_pair, sort_by_derived_keys, split_csv, split_sort,
};
use crate::models::{FilterMode, IssueListParams, ListResponse};
use crate::records::{IssueJoins, IssueRecord, denormalize_issue};

/// Issue columns exposed to filtering/sorting. `priority` is not
/// storage-sortable: it is ordered in memory with the other derived keys,
/// and that per-page ordering is part of the observable contract.
const FIELDS: &[FieldDef<issue::Column>] = &[
    FieldDef { id: "id", column: issue::Column::Id, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "risk", column: issue::Column::Risk, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "issueNumber", column: issue::Column::IssueNumber, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "status", column: issue::Column::Status, variant: FieldVariant::Select, sortable: true },
    FieldDef { id: "priority", column: issue::Column::Priority, variant: FieldVariant::Select, sortable: false },
    FieldDef { id: "type", column: issue::Column::Kind, variant: FieldVariant::Select, sortable: false },
    FieldDef { id: "isValid", column: issue::Column::IsValid, variant: FieldVariant::Boolean, sortable: false },
    FieldDef { id: "scorecardItemId", column: issue::Column::ScorecardItemId, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "documentId", column: issue::Column::DocumentId, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "contentId", column: issue::Column::ContentId, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "context", column: issue::Column::Context, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "violatingContent", column: issue::Column::ViolatingContent, variant: FieldVariant::Text, sortable: false },
    FieldDef { id: "explanation", column: issue::Column::Explanation, variant: FieldVariant::Text, sortable: false },
    FieldDef { id: "affiliateId", column: issue::Column::AffiliateId, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "brandId", column: issue::Column::BrandId, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "createdAt", column: issue::Column::CreatedAt, variant: FieldVariant::DateRange, sortable: true },
    FieldDef { id: "updatedAt", column: issue::Column::UpdatedAt, variant: FieldVariant::DateRange, sortable: true },
];

pub(crate) const CATALOG: FieldCatalog<issue::Column> = FieldCatalog::new(FIELDS);

fn basic_filters(params: &IssueListParams) -> Vec<BasicFilter<issue::Column>> {
    let (created_from, created_to) = parse_millis_pair(params.created_at.as_deref());
    vec![
        BasicFilter::IdEquals(
            issue::Column::BrandId,
            params.brand_id.clone().unwrap_or_default(),
        ),
        BasicFilter::KeyIn(issue::Column::Status, split_csv(params.status.as_deref())),
        BasicFilter::KeyIn(issue::Column::Priority, split_csv(params.priority.as_deref())),
        BasicFilter::NumberContains(
            issue::Column::IssueNumber,
            params.issue_number.clone().unwrap_or_default(),
        ),
        BasicFilter::DateRange(issue::Column::CreatedAt, created_from, created_to),
    ]
}

/// Page through compliance issues as denormalized records. Storage failures
/// degrade to an empty page.
pub async fn list_issues(
    db: &DatabaseConnection,
    params: &IssueListParams,
) -> ListResponse<IssueRecord> {
    match try_list_issues(db, params).await {
        Ok(page) => page,
        Err(err) => {
            tracing::error!(error = %err, view = "issues", "list query failed, returning empty page");
            ListResponse::empty()
        }
    }
}

async fn try_list_issues(
    db: &DatabaseConnection,
    params: &IssueListParams,
) -> Result<ListResponse<IssueRecord>, DbErr> {
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

    let mut query = issue::Entity::find().filter(condition);
    if sort.is_empty() {
        query = query.order_by(issue::Column::UpdatedAt, Order::Desc);
    } else {
        for (column, order) in native {
            query = query.order_by(column, order);
        }
    }

    let txn = db.begin().await?;
    let (rows, total) = fetch_page(&txn, query, page, per_page).await?;
    let joins = load_joins(&txn, &rows).await?;
    txn.commit().await?;

    let mut records: Vec<IssueRecord> = rows
        .into_iter()
        .zip(joins)
        .map(|(row, joins)| denormalize_issue(row, joins))
        .collect();
    sort_by_derived_keys(&mut records, &derived);

    Ok(ListResponse {
        data: records,
        page_count: page_count(total, per_page),
        total,
    })
}

/// Load the relations of one page of issues inside the list transaction.
/// The affiliate hangs off the content row, not the issue, so it is resolved
/// through the loaded contents.
async fn load_joins(
    txn: &DatabaseTransaction,
    rows: &[issue::Model],
) -> Result<Vec<IssueJoins>, DbErr> {
    let mut brands = rows.load_one(brand::Entity, txn).await?;
    let mut contents = rows.load_one(content::Entity, txn).await?;
    let mut documents = rows.load_one(document::Entity, txn).await?;
    let mut users = rows.load_one(user::Entity, txn).await?;
    let mut scans = rows.load_one(scan::Entity, txn).await?;
    let mut snapshots = rows.load_one(snapshot::Entity, txn).await?;
    let mut scorecard_items = rows.load_one(scorecard_item::Entity, txn).await?;

    let affiliate_ids: Vec<i32> = contents
        .iter()
        .flatten()
        .map(|content| content.affiliate_id)
        .collect();
    let affiliates: HashMap<i32, affiliate::Model> = if affiliate_ids.is_empty() {
        HashMap::new()
    } else {
        affiliate::Entity::find()
            .filter(affiliate::Column::Id.is_in(affiliate_ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|affiliate| (affiliate.id, affiliate))
            .collect()
    };

    let mut joined = Vec::with_capacity(rows.len());
    for i in 0..rows.len() {
        let content = contents[i].take();
        let affiliate = content
            .as_ref()
            .and_then(|content| affiliates.get(&content.affiliate_id))
            .cloned();
        joined.push(IssueJoins {
            brand: brands[i].take(),
            content,
            affiliate,
            document: documents[i].take(),
            user: users[i].take(),
            scan: scans[i].take(),
            snapshot: snapshots[i].take(),
            scorecard_item: scorecard_items[i].take(),
        });
    }
    Ok(joined)
}

/// Number of matching issues per status, with all eleven statuses present
/// even at zero. The basic-mode predicate for this facet uses only the
/// issue-number search and the update-date range: a facet filtered by its
/// own status selection would blank out every other bucket. Degrades to an
/// all-zero map on failure.
pub async fn issue_status_counts(
    db: &DatabaseConnection,
    params: &IssueListParams,
) -> BTreeMap<IssueStatus, i64> {
    let zeroes: BTreeMap<IssueStatus, i64> =
        IssueStatus::iter().map(|status| (status, 0)).collect();
    match try_status_counts(db, params).await {
        Ok(found) => {
            let mut counts = zeroes;
            counts.extend(found);
            counts
        }
        Err(err) => {
            tracing::error!(error = %err, view = "issues", "status-count query failed, returning zeroes");
            zeroes
        }
    }
}

async fn try_status_counts(
    db: &DatabaseConnection,
    params: &IssueListParams,
) -> Result<Vec<(IssueStatus, i64)>, DbErr> {
    let condition = match params.mode() {
        FilterMode::Basic => {
            let (updated_from, updated_to) = parse_millis_pair(params.updated_at.as_deref());
            compile_basic(vec![
                BasicFilter::NumberContains(
                    issue::Column::IssueNumber,
                    params.issue_number.clone().unwrap_or_default(),
                ),
                BasicFilter::DateRange(issue::Column::UpdatedAt, updated_from, updated_to),
            ])
        }
        FilterMode::Advanced => crate::filtering::compile_tree(
            &CATALOG,
            &params.filter_nodes(),
            params.join_operator(),
        ),
    };

    issue::Entity::find()
        .select_only()
        .column(issue::Column::Status)
        .column_as(issue::Column::Status.count(), "count")
        .filter(condition)
        .group_by(issue::Column::Status)
        .having(Expr::expr(issue::Column::Status.count()).gt(0))
        .into_tuple()
        .all(db)
        .await
}
