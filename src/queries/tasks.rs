//! Tasks list view and its summary facets.

use std::collections::BTreeMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Iterable, Order, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};

use super::fetch_page;
use crate::entities::enums::{TaskPriority, TaskStatus};
use crate::entities::task;
use crate::filtering::{
    BasicFilter, FieldCatalog, FieldDef, FieldVariant, clamp_page, clamp_per_page, compile,
    page_count, parse_millis_pair, parse_number_pair, split_csv, split_sort,
};
use crate::models::{ListResponse, NumberRangeBounds, TaskListParams};

/// Tasks are a flat table: every catalog field is a physical column, so no
/// derived sort pass is needed.
const FIELDS: &[FieldDef<task::Column>] = &[
    FieldDef { id: "id", column: task::Column::Id, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "code", column: task::Column::Code, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "title", column: task::Column::Title, variant: FieldVariant::Text, sortable: true },
    FieldDef { id: "status", column: task::Column::Status, variant: FieldVariant::Select, sortable: true },
    FieldDef { id: "label", column: task::Column::Label, variant: FieldVariant::Select, sortable: true },
    FieldDef { id: "priority", column: task::Column::Priority, variant: FieldVariant::Select, sortable: true },
    FieldDef { id: "estimatedHours", column: task::Column::EstimatedHours, variant: FieldVariant::Number, sortable: true },
    FieldDef { id: "archived", column: task::Column::Archived, variant: FieldVariant::Boolean, sortable: true },
    FieldDef { id: "createdAt", column: task::Column::CreatedAt, variant: FieldVariant::DateRange, sortable: true },
    FieldDef { id: "updatedAt", column: task::Column::UpdatedAt, variant: FieldVariant::DateRange, sortable: true },
];

pub(crate) const CATALOG: FieldCatalog<task::Column> = FieldCatalog::new(FIELDS);

fn basic_filters(params: &TaskListParams) -> Vec<BasicFilter<task::Column>> {
    let (hours_from, hours_to) = parse_number_pair(params.estimated_hours.as_deref());
    let (created_from, created_to) = parse_millis_pair(params.created_at.as_deref());
    vec![
        BasicFilter::TextContains(
            task::Column::Title,
            params.title.clone().unwrap_or_default(),
        ),
        BasicFilter::KeyIn(task::Column::Status, split_csv(params.status.as_deref())),
        BasicFilter::KeyIn(task::Column::Priority, split_csv(params.priority.as_deref())),
        BasicFilter::NumberRange(task::Column::EstimatedHours, hours_from, hours_to),
        BasicFilter::DateRange(task::Column::CreatedAt, created_from, created_to),
    ]
}

/// Page through the tasks table. Storage failures degrade to an empty page.
pub async fn list_tasks(db: &DatabaseConnection, params: &TaskListParams) -> ListResponse<task::Model> {
    match try_list_tasks(db, params).await {
        Ok(page) => page,
        Err(err) => {
            tracing::error!(error = %err, view = "tasks", "list query failed, returning empty page");
            ListResponse::empty()
        }
    }
}

async fn try_list_tasks(
    db: &DatabaseConnection,
    params: &TaskListParams,
) -> Result<ListResponse<task::Model>, DbErr> {
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
    let (native, _derived) = split_sort(&sort, &CATALOG);

    let mut query = task::Entity::find().filter(condition);
    if sort.is_empty() {
        query = query.order_by(task::Column::CreatedAt, Order::Desc);
    } else {
        for (column, order) in native {
            query = query.order_by(column, order);
        }
    }

    let txn = db.begin().await?;
    let (rows, total) = fetch_page(&txn, query, page, per_page).await?;
    txn.commit().await?;

    Ok(ListResponse {
        data: rows,
        page_count: page_count(total, per_page),
        total,
    })
}

/// Number of tasks per status, with every status present even at zero.
/// Degrades to an all-zero map on storage failure.
pub async fn task_status_counts(db: &DatabaseConnection) -> BTreeMap<TaskStatus, i64> {
    let zeroes: BTreeMap<TaskStatus, i64> = TaskStatus::iter().map(|status| (status, 0)).collect();
    match try_status_counts(db).await {
        Ok(found) => {
            let mut counts = zeroes;
            counts.extend(found);
            counts
        }
        Err(err) => {
            tracing::error!(error = %err, view = "tasks", "status-count query failed, returning zeroes");
            zeroes
        }
    }
}

async fn try_status_counts(db: &DatabaseConnection) -> Result<Vec<(TaskStatus, i64)>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Status)
        .column_as(task::Column::Status.count(), "count")
        .group_by(task::Column::Status)
        .having(Expr::expr(task::Column::Status.count()).gt(0))
        .into_tuple()
        .all(db)
        .await
}

/// Number of tasks per priority, with every priority present even at zero.
pub async fn task_priority_counts(db: &DatabaseConnection) -> BTreeMap<TaskPriority, i64> {
    let zeroes: BTreeMap<TaskPriority, i64> =
        TaskPriority::iter().map(|priority| (priority, 0)).collect();
    match try_priority_counts(db).await {
        Ok(found) => {
            let mut counts = zeroes;
            counts.extend(found);
            counts
        }
        Err(err) => {
            tracing::error!(error = %err, view = "tasks", "priority-count query failed, returning zeroes");
            zeroes
        }
    }
}

async fn try_priority_counts(db: &DatabaseConnection) -> Result<Vec<(TaskPriority, i64)>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Priority)
        .column_as(task::Column::Priority.count(), "count")
        .group_by(task::Column::Priority)
        .having(Expr::expr(task::Column::Priority.count()).gt(0))
        .into_tuple()
        .all(db)
        .await
}

/// Observed min/max of `estimated_hours`, zeroed when the table is empty or
/// the query fails. Drives the range-slider bounds in the filter toolbar.
pub async fn estimated_hours_range(db: &DatabaseConnection) -> NumberRangeBounds {
    match try_hours_range(db).await {
        Ok(Some((min, max))) => NumberRangeBounds {
            min: min.unwrap_or(0.0),
            max: max.unwrap_or(0.0),
        },
        Ok(None) => NumberRangeBounds::default(),
        Err(err) => {
            tracing::error!(error = %err, view = "tasks", "hours-range query failed, returning zeroes");
            NumberRangeBounds::default()
        }
    }
}

#[allow(clippy::type_complexity)]
async fn try_hours_range(
    db: &DatabaseConnection,
) -> Result<Option<(Option<f32>, Option<f32>)>, DbErr> {
    task::Entity::find()
        .select_only()
        .column_as(task::Column::EstimatedHours.min(), "min")
        .column_as(task::Column::EstimatedHours.max(), "max")
        .into_tuple()
        .one(db)
        .await
}
