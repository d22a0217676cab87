//! Axum router for the list and summary endpoints.
//!
//! Handlers decode the query string, delegate to the query layer and wrap
//! the result in JSON. The query layer never fails on list paths, so these
//! handlers have no error branch; a degraded (empty) page is still a 200.

use std::collections::BTreeMap;

use axum::{Json, Router, extract::Query, extract::State, routing::get};
use sea_orm::DatabaseConnection;

use crate::entities::enums::{IssueStatus, TaskPriority, TaskStatus};
use crate::entities::task;
use crate::models::{
    IssueListParams, ListResponse, NumberRangeBounds, ProductListParams, TaskListParams,
};
use crate::queries::{issues, products, tasks};
use crate::records::{IssueRecord, ProductRecord};

/// Build the API router over a database connection.
pub fn router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/status-counts", get(task_status_counts))
        .route("/tasks/priority-counts", get(task_priority_counts))
        .route("/tasks/estimated-hours-range", get(estimated_hours_range))
        .route("/products", get(list_products))
        .route("/issues", get(list_issues))
        .route("/issues/status-counts", get(issue_status_counts))
        .with_state(db)
}

async fn list_tasks(
    State(db): State<DatabaseConnection>,
    Query(params): Query<TaskListParams>,
) -> Json<ListResponse<task::Model>> {
    Json(tasks::list_tasks(&db, &params).await)
}

async fn task_status_counts(
    State(db): State<DatabaseConnection>,
) -> Json<BTreeMap<TaskStatus, i64>> {
    Json(tasks::task_status_counts(&db).await)
}

async fn task_priority_counts(
    State(db): State<DatabaseConnection>,
) -> Json<BTreeMap<TaskPriority, i64>> {
    Json(tasks::task_priority_counts(&db).await)
}

async fn estimated_hours_range(State(db): State<DatabaseConnection>) -> Json<NumberRangeBounds> {
    Json(tasks::estimated_hours_range(&db).await)
}

async fn list_products(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ProductListParams>,
) -> Json<ListResponse<ProductRecord>> {
    Json(products::list_products(&db, &params).await)
}

async fn list_issues(
    State(db): State<DatabaseConnection>,
    Query(params): Query<IssueListParams>,
) -> Json<ListResponse<IssueRecord>> {
    Json(issues::list_issues(&db, &params).await)
}

async fn issue_status_counts(
    State(db): State<DatabaseConnection>,
    Query(params): Query<IssueListParams>,
) -> Json<BTreeMap<IssueStatus, i64>> {
    Json(issues::issue_status_counts(&db, &params).await)
}
