//! Behavioral tests for the tasks list view and its summary facets.

use chrono::Duration;
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde_json::json;

mod common;
use common::{base_time, setup_db, task_row};

use compliance_core::entities::enums::{TaskPriority, TaskStatus};
use compliance_core::entities::task;
use compliance_core::queries::tasks::{
    estimated_hours_range, list_tasks, task_priority_counts, task_status_counts,
};
use compliance_core::{FilterMode, TaskListParams};

async fn seed_tasks(db: &sea_orm::DatabaseConnection) {
    let mut urgent_fix = task_row("t1", "Fix disclosure banner");
    urgent_fix.status = Set(TaskStatus::InProgress);
    urgent_fix.priority = Set(TaskPriority::High);
    urgent_fix.estimated_hours = Set(8.0);

    let mut audit = task_row("t2", "Audit affiliate links");
    audit.status = Set(TaskStatus::Todo);
    audit.priority = Set(TaskPriority::Medium);
    audit.estimated_hours = Set(3.5);
    audit.created_at = Set(base_time() + Duration::days(1));

    let mut docs = task_row("t3", "Document scan pipeline");
    docs.status = Set(TaskStatus::Done);
    docs.priority = Set(TaskPriority::Low);
    docs.estimated_hours = Set(1.0);
    docs.created_at = Set(base_time() + Duration::days(2));

    task::Entity::insert_many([urgent_fix, audit, docs])
        .exec(db)
        .await
        .unwrap();
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let page = list_tasks(&db, &TaskListParams::default()).await;
    assert_eq!(page.total, 3);
    let ids: Vec<&str> = page.data.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2", "t1"]);
}

#[tokio::test]
async fn title_filter_is_a_case_insensitive_substring_match() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let params = TaskListParams {
        title: Some("AFFILIATE".to_owned()),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, "t2");
}

#[tokio::test]
async fn status_and_priority_filters_take_comma_separated_sets() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let params = TaskListParams {
        status: Some("todo,done".to_owned()),
        priority: Some("low,medium".to_owned()),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    let mut ids: Vec<&str> = page.data.iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["t2", "t3"]);
}

#[tokio::test]
async fn estimated_hours_range_filter_is_inclusive() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let params = TaskListParams {
        estimated_hours: Some("[3.5,8]".to_owned()),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    let mut ids: Vec<&str> = page.data.iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["t1", "t2"]);

    // Open-ended lower bound.
    let params = TaskListParams {
        estimated_hours: Some("[null,2]".to_owned()),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, "t3");
}

#[tokio::test]
async fn advanced_mode_filters_tasks_too() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let filters = json!([
        {"id": "label", "operator": "equals", "value": "bug", "variant": "select"},
        {"id": "estimatedHours", "operator": "isBetween", "value": [2, 10], "variant": "number"}
    ]);
    let params = TaskListParams {
        filter_mode: Some(FilterMode::Advanced),
        filters: Some(filters.to_string()),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    let mut ids: Vec<&str> = page.data.iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[tokio::test]
async fn multi_key_native_sort_applies_in_request_order() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;
    let mut extra = task_row("t4", "Backfill reports");
    extra.status = Set(TaskStatus::Todo);
    extra.priority = Set(TaskPriority::Medium);
    extra.estimated_hours = Set(9.0);
    task::Entity::insert(extra).exec(&db).await.unwrap();

    let params = TaskListParams {
        sort: Some(
            r#"[{"id":"status","desc":false},{"id":"estimatedHours","desc":true}]"#.to_owned(),
        ),
        ..TaskListParams::default()
    };
    let page = list_tasks(&db, &params).await;
    let ids: Vec<&str> = page.data.iter().map(|t| t.id.as_str()).collect();
    // Statuses sort by wire value: done < in-progress < todo; within todo the
    // higher estimate comes first.
    assert_eq!(ids, vec!["t3", "t1", "t4", "t2"]);
}

#[tokio::test]
async fn storage_failure_degrades_to_an_empty_page() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;
    db.execute_unprepared("DROP TABLE tasks").await.unwrap();

    let page = list_tasks(&db, &TaskListParams::default()).await;
    assert_eq!(page.total, 0);
    assert_eq!(page.page_count, 0);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn status_counts_cover_all_four_statuses() {
    let db = setup_db().await.unwrap();
    seed_tasks(&db).await;

    let counts = task_status_counts(&db).await;
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[&TaskStatus::Todo], 1);
    assert_eq!(counts[&TaskStatus::InProgress], 1);
    assert_eq!(counts[&TaskStatus::Done], 1);
    assert_eq!(counts[&TaskStatus::Canceled], 0);
}

#[tokio::test]
async fn priority_counts_cover_all_three_priorities() {
    let db = setup_db().await.unwrap();

    // Empty table: every bucket present at zero.
    let counts = task_priority_counts(&db).await;
    assert_eq!(counts.len(), 3);
    assert!(counts.values().all(|&count| count == 0));

    seed_tasks(&db).await;
    let counts = task_priority_counts(&db).await;
    assert_eq!(counts[&TaskPriority::High], 1);
    assert_eq!(counts[&TaskPriority::Medium], 1);
    assert_eq!(counts[&TaskPriority::Low], 1);
}

#[tokio::test]
async fn hours_range_reports_min_and_max() {
    let db = setup_db().await.unwrap();

    let empty = estimated_hours_range(&db).await;
    assert_eq!((empty.min, empty.max), (0.0, 0.0));

    seed_tasks(&db).await;
    let bounds = estimated_hours_range(&db).await;
    assert_eq!((bounds.min, bounds.max), (1.0, 8.0));
}
