//! Shared setup for the behavioral tests: an in-memory sqlite database with
//! the full schema, plus row builders with sensible defaults.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use uuid::Uuid;

use compliance_core::entities::enums::{
    ContentType, DocumentKind, IssueKind, IssueStatus, ScanStatus, SnapshotKind, TaskLabel,
    TaskPriority, TaskStatus,
};
use compliance_core::entities::{
    affiliate, brand, content, document, issue, product, scan, scorecard_item, snapshot, task,
    user,
};

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    db.execute(backend.build(&schema.create_table_from_entity(task::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(brand::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(affiliate::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(content::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(document::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(user::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(scan::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(snapshot::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(scorecard_item::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(issue::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(product::Entity)))
        .await?;

    Ok(db)
}

/// Fixed reference instant so tests are reproducible: 2024-03-01T12:00:00Z.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn brand_row(id: &str, name: &str, issue_prefix: &str) -> brand::ActiveModel {
    brand::ActiveModel {
        id: Set(id.to_owned()),
        name: Set(name.to_owned()),
        website: Set(format!("https://{}.example", id.to_lowercase())),
        issue_identifier: Set(issue_prefix.to_owned()),
        industry: Set(None),
        created_at: Set(base_time()),
    }
}

pub fn affiliate_row(id: i32, name: &str) -> affiliate::ActiveModel {
    affiliate::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        full_name: Set(format!("{name} Media Ltd")),
        website: Set(format!("https://{}.example", name.to_lowercase())),
        created_at: Set(base_time()),
    }
}

pub fn content_row(id: i32, affiliate_id: i32, url: &str, title: Option<&str>) -> content::ActiveModel {
    content::ActiveModel {
        id: Set(id),
        url: Set(url.to_owned()),
        affiliate_id: Set(affiliate_id),
        content_type: Set(ContentType::Blog),
        title: Set(title.map(str::to_owned)),
        description: Set(None),
        published_at: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(None),
    }
}

pub fn snapshot_row(
    id: i32,
    content_id: i32,
    affiliate_links: Option<serde_json::Value>,
) -> snapshot::ActiveModel {
    snapshot::ActiveModel {
        id: Set(id),
        content_id: Set(content_id),
        kind: Set(SnapshotKind::Website),
        disclosures: Set(None),
        affiliate_links: Set(affiliate_links),
        created_at: Set(base_time()),
    }
}

pub fn document_row(id: i32, brand_id: &str, name: &str) -> document::ActiveModel {
    document::ActiveModel {
        id: Set(id),
        brand_id: Set(brand_id.to_owned()),
        name: Set(name.to_owned()),
        kind: Set(DocumentKind::Guidelines),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
}

pub fn user_row(id: i64, first: Option<&str>, last: Option<&str>) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id),
        email: Set(format!("user{id}@example.com")),
        first_name: Set(first.map(str::to_owned)),
        last_name: Set(last.map(str::to_owned)),
        picture_url: Set(None),
        created_at: Set(base_time()),
    }
}

pub fn scan_row(id: i32, brand_id: &str, content_id: i32) -> scan::ActiveModel {
    scan::ActiveModel {
        id: Set(id),
        brand_id: Set(brand_id.to_owned()),
        content_id: Set(content_id),
        status: Set(ScanStatus::Complete),
        created_at: Set(base_time()),
        completed_at: Set(Some(base_time())),
    }
}

pub fn scorecard_item_row(id: i64, brand_id: &str, title: &str) -> scorecard_item::ActiveModel {
    scorecard_item::ActiveModel {
        id: Set(id),
        brand_id: Set(brand_id.to_owned()),
        kind: Set(IssueKind::Text),
        title: Set(title.to_owned()),
        description: Set(format!("{title} description")),
        risk: Set(4),
        created_at: Set(base_time()),
        updated_at: Set(None),
    }
}

/// Issue row builder. Tests override what they care about via the returned
/// active model before inserting.
pub fn issue_row(number: i32, brand_id: &str, prefix: &str, content_id: i32) -> issue::ActiveModel {
    issue::ActiveModel {
        id: Set(Uuid::new_v4()),
        is_valid: Set(false),
        brand_id: Set(brand_id.to_owned()),
        content_id: Set(content_id),
        issue_number: Set(number),
        issue_identifier: Set(prefix.to_owned()),
        kind: Set(IssueKind::Text),
        status: Set(IssueStatus::Todo),
        priority: Set(None),
        violating_content: Set(None),
        explanation: Set(None),
        risk: Set(None),
        context: Set(None),
        document_id: Set(None),
        user_id: Set(None),
        snapshot_id: Set(None),
        scan_id: Set(None),
        scorecard_item_id: Set(None),
        affiliate_id: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
}

pub fn task_row(id: &str, title: &str) -> task::ActiveModel {
    task::ActiveModel {
        id: Set(id.to_owned()),
        code: Set(format!("TASK-{id}")),
        title: Set(Some(title.to_owned())),
        status: Set(TaskStatus::Todo),
        label: Set(TaskLabel::Bug),
        priority: Set(TaskPriority::Low),
        estimated_hours: Set(0.0),
        archived: Set(false),
        created_at: Set(base_time()),
        updated_at: Set(None),
    }
}

pub fn product_row(id: i32, brand_id: &str, name: &str) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(id),
        brand_id: Set(brand_id.to_owned()),
        name: Set(name.to_owned()),
        link: Set(None),
        image: Set(None),
        document_id: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(Some(base_time())),
    }
}

/// Seed the pair of brands, affiliates and contents most issue tests hang
/// their rows off.
pub async fn seed_issue_world(db: &DatabaseConnection) -> Result<(), DbErr> {
    brand::Entity::insert_many([
        brand_row("BR1", "Acme", "ACME"),
        brand_row("BR2", "Zenith", "ZEN"),
    ])
    .exec(db)
    .await?;
    affiliate::Entity::insert_many([
        affiliate_row(1, "Linkworks"),
        affiliate_row(2, "Blogcorp"),
    ])
    .exec(db)
    .await?;
    content::Entity::insert_many([
        content_row(1, 1, "https://linkworks.example/review", Some("Acme review")),
        content_row(2, 2, "https://blogcorp.example/roundup", Some("Spring roundup")),
    ])
    .exec(db)
    .await?;
    Ok(())
}
