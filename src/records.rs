//! Denormalized records for the list views.
//!
//! Each list row leaves the storage layer as a primary entity plus loaded
//! relations; the functions here flatten that into the single flat record the
//! table UI consumes, computing the derived fields (formatted issue id,
//! monetization flag, display name) along the way. Denormalization is pure:
//! rows in, records out, no storage access.

use chrono::{DateTime, Utc};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::enums::{DocumentKind, IssueKind, IssuePriority, IssueStatus};
use crate::entities::{affiliate, brand, content, document, scan, scorecard_item, snapshot, user};
use crate::filtering::{SortAccessor, SortValue};

/// One affiliate link scraped into a content snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AffiliateLink {
    /// Link as it appeared on the page.
    pub original: String,
    /// Link after redirects were followed.
    #[serde(rename = "final")]
    pub final_url: String,
    /// Anchor texts, when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    /// Brand the link was attributed to, when resolved.
    #[serde(default, rename = "brandId", skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
}

/// Parse the semi-structured `affiliate_links` payload of a snapshot.
///
/// Returns `None` when the payload is absent or not an array. Individual
/// entries that fail validation are dropped, so one malformed link never
/// hides the rest.
#[must_use]
pub fn parse_affiliate_links(payload: Option<&Value>) -> Option<Vec<AffiliateLink>> {
    let Value::Array(entries) = payload? else {
        return None;
    };
    Some(
        entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
    )
}

/// Flat record of the compliance-issues table.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub id: Uuid,
    pub is_valid: bool,
    pub brand_id: String,
    pub content_id: i32,
    pub issue_number: i32,
    pub issue_identifier: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub status: IssueStatus,
    pub priority: Option<IssuePriority>,
    pub violating_content: Option<String>,
    pub explanation: Option<String>,
    pub risk: Option<i16>,
    pub context: Option<String>,
    pub document_id: Option<i32>,
    pub user_id: Option<i64>,
    pub snapshot_id: Option<i32>,
    pub scan_id: Option<i32>,
    pub scorecard_item_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Human-readable id: brand prefix + sequential number, e.g. `ACME-42`.
    pub formatted_id: String,
    pub brand_name: Option<String>,
    #[serde(rename = "contentURL")]
    pub content_url: Option<String>,
    pub content_title: Option<String>,
    /// Whether any affiliate link on the content snapshot belongs to this
    /// issue's brand. `None` when the snapshot carries no link payload.
    pub monetized: Option<bool>,
    pub affiliate_name: Option<String>,
    pub affiliate_id: Option<i32>,
    pub scorecard_item_title: Option<String>,
    pub scorecard_item_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<user::Model>,
    pub user_name: Option<String>,
    pub snapshot_created_at: Option<DateTime<Utc>>,
    pub document_name: Option<String>,
    #[serde(rename = "documentType")]
    pub document_kind: Option<DocumentKind>,
    pub scan_started_at: Option<DateTime<Utc>>,
}

/// Relations loaded alongside one issue row. All optional: a missing
/// relation simply leaves its derived fields absent.
#[derive(Debug, Default, Clone)]
pub struct IssueJoins {
    pub brand: Option<brand::Model>,
    pub content: Option<content::Model>,
    pub affiliate: Option<affiliate::Model>,
    pub document: Option<document::Model>,
    pub user: Option<user::Model>,
    pub scan: Option<scan::Model>,
    pub snapshot: Option<snapshot::Model>,
    pub scorecard_item: Option<scorecard_item::Model>,
}

/// Flatten one issue row and its loaded relations.
#[must_use]
pub fn denormalize_issue(issue: crate::entities::issue::Model, joins: IssueJoins) -> IssueRecord {
    let monetized = joins.snapshot.as_ref().and_then(|snapshot| {
        parse_affiliate_links(snapshot.affiliate_links.as_ref()).map(|links| {
            links
                .iter()
                .any(|link| link.brand_id.as_deref() == Some(issue.brand_id.as_str()))
        })
    });

    let user_name = joins.user.as_ref().and_then(full_name);

    IssueRecord {
        formatted_id: format!("{}-{}", issue.issue_identifier, issue.issue_number),
        brand_name: joins.brand.map(|b| b.name),
        content_url: joins.content.as_ref().map(|c| c.url.clone()),
        content_title: joins.content.as_ref().and_then(|c| c.title.clone()),
        monetized,
        affiliate_name: joins.affiliate.as_ref().map(|a| a.name.clone()),
        affiliate_id: joins.affiliate.as_ref().map(|a| a.id),
        scorecard_item_title: joins.scorecard_item.as_ref().map(|s| s.title.clone()),
        scorecard_item_description: joins.scorecard_item.map(|s| s.description),
        user_name,
        user: joins.user,
        snapshot_created_at: joins.snapshot.map(|s| s.created_at),
        document_name: joins.document.as_ref().map(|d| d.name.clone()),
        document_kind: joins.document.map(|d| d.kind),
        scan_started_at: joins.scan.map(|s| s.created_at),
        id: issue.id,
        is_valid: issue.is_valid,
        brand_id: issue.brand_id,
        content_id: issue.content_id,
        issue_number: issue.issue_number,
        issue_identifier: issue.issue_identifier,
        kind: issue.kind,
        status: issue.status,
        priority: issue.priority,
        violating_content: issue.violating_content,
        explanation: issue.explanation,
        risk: issue.risk,
        context: issue.context,
        document_id: issue.document_id,
        user_id: issue.user_id,
        snapshot_id: issue.snapshot_id,
        scan_id: issue.scan_id,
        scorecard_item_id: issue.scorecard_item_id,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
    }
}

fn full_name(user: &user::Model) -> Option<String> {
    let first = user.first_name.as_deref()?;
    let joined = match user.last_name.as_deref() {
        Some(last) => format!("{first} {last}"),
        None => first.to_owned(),
    };
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl SortAccessor for IssueRecord {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "formattedId" => Some(SortValue::Text(self.formatted_id.clone())),
            "brandName" => self.brand_name.clone().map(SortValue::Text),
            "contentURL" => self.content_url.clone().map(SortValue::Text),
            "contentTitle" => self.content_title.clone().map(SortValue::Text),
            "monetized" => self.monetized.map(SortValue::Bool),
            "affiliateName" => self.affiliate_name.clone().map(SortValue::Text),
            "scorecardItemTitle" => self.scorecard_item_title.clone().map(SortValue::Text),
            "scorecardItemDescription" => {
                self.scorecard_item_description.clone().map(SortValue::Text)
            }
            "userName" => self.user_name.clone().map(SortValue::Text),
            "snapshotCreatedAt" => self.snapshot_created_at.map(SortValue::Timestamp),
            "documentName" => self.document_name.clone().map(SortValue::Text),
            "documentType" => self
                .document_kind
                .map(|kind| SortValue::Text(kind.to_value())),
            "scanStartedAt" => self.scan_started_at.map(SortValue::Timestamp),
            "priority" => self
                .priority
                .map(|priority| SortValue::Text(priority.to_value())),
            "type" => Some(SortValue::Text(self.kind.to_value())),
            "isValid" => Some(SortValue::Bool(self.is_valid)),
            "violatingContent" => self.violating_content.clone().map(SortValue::Text),
            "explanation" => self.explanation.clone().map(SortValue::Text),
            _ => None,
        }
    }
}

/// Flat record of the products table.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: i32,
    pub brand_id: String,
    pub name: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub document_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub brand_name: Option<String>,
}

/// Flatten one product row and its loaded brand.
#[must_use]
pub fn denormalize_product(
    product: crate::entities::product::Model,
    brand: Option<brand::Model>,
) -> ProductRecord {
    ProductRecord {
        id: product.id,
        brand_id: product.brand_id,
        name: product.name,
        link: product.link,
        image: product.image,
        document_id: product.document_id,
        created_at: product.created_at,
        updated_at: product.updated_at,
        brand_name: brand.map(|b| b.name),
    }
}

impl SortAccessor for ProductRecord {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "brandName" => self.brand_name.clone().map(SortValue::Text),
            "name" => Some(SortValue::Text(self.name.clone())),
            "link" => self.link.clone().map(SortValue::Text),
            "image" => self.image.clone().map(SortValue::Text),
            "documentId" => self.document_id.map(|id| SortValue::Number(f64::from(id))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::enums::SnapshotKind;
    use serde_json::json;

    fn issue_row() -> crate::entities::issue::Model {
        crate::entities::issue::Model {
            id: Uuid::new_v4(),
            is_valid: true,
            brand_id: "BR1".to_owned(),
            content_id: 7,
            issue_number: 42,
            issue_identifier: "ACME".to_owned(),
            kind: IssueKind::Text,
            status: IssueStatus::Todo,
            priority: Some(IssuePriority::High),
            violating_content: None,
            explanation: None,
            risk: Some(3),
            context: None,
            document_id: None,
            user_id: None,
            snapshot_id: None,
            scan_id: None,
            scorecard_item_id: None,
            affiliate_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot_with(links: Option<Value>) -> snapshot::Model {
        snapshot::Model {
            id: 1,
            content_id: 7,
            kind: SnapshotKind::Website,
            disclosures: None,
            affiliate_links: links,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn affiliate_links_parse_drops_invalid_entries() {
        let payload = json!([
            {"original": "a", "final": "b", "brandId": "BR1"},
            {"original": "missing final"},
            {"original": "c", "final": "d", "text": ["anchor"]},
        ]);
        let links = parse_affiliate_links(Some(&payload)).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].brand_id.as_deref(), Some("BR1"));
        assert_eq!(links[1].text.as_deref(), Some(&["anchor".to_owned()][..]));
    }

    #[test]
    fn affiliate_links_parse_rejects_non_arrays() {
        assert!(parse_affiliate_links(None).is_none());
        assert!(parse_affiliate_links(Some(&json!({"not": "an array"}))).is_none());
        assert_eq!(parse_affiliate_links(Some(&json!([]))).unwrap().len(), 0);
    }

    #[test]
    fn monetized_is_true_when_a_link_matches_the_brand() {
        let joins = IssueJoins {
            snapshot: Some(snapshot_with(Some(json!([
                {"original": "a", "final": "b", "brandId": "BR1"}
            ])))),
            ..IssueJoins::default()
        };
        let record = denormalize_issue(issue_row(), joins);
        assert_eq!(record.monetized, Some(true));
    }

    #[test]
    fn monetized_is_false_for_an_empty_link_list() {
        let joins = IssueJoins {
            snapshot: Some(snapshot_with(Some(json!([])))),
            ..IssueJoins::default()
        };
        let record = denormalize_issue(issue_row(), joins);
        assert_eq!(record.monetized, Some(false));
    }

    #[test]
    fn monetized_is_absent_without_a_link_payload() {
        // No snapshot at all.
        let record = denormalize_issue(issue_row(), IssueJoins::default());
        assert_eq!(record.monetized, None);
        // Snapshot present but payload missing.
        let joins = IssueJoins {
            snapshot: Some(snapshot_with(None)),
            ..IssueJoins::default()
        };
        let record = denormalize_issue(issue_row(), joins);
        assert_eq!(record.monetized, None);
    }

    #[test]
    fn monetized_ignores_links_for_other_brands() {
        let joins = IssueJoins {
            snapshot: Some(snapshot_with(Some(json!([
                {"original": "a", "final": "b", "brandId": "OTHER"},
                {"original": "c", "final": "d"}
            ])))),
            ..IssueJoins::default()
        };
        let record = denormalize_issue(issue_row(), joins);
        assert_eq!(record.monetized, Some(false));
    }

    #[test]
    fn formatted_id_joins_prefix_and_number() {
        let record = denormalize_issue(issue_row(), IssueJoins::default());
        assert_eq!(record.formatted_id, "ACME-42");
    }

    #[test]
    fn user_name_requires_a_first_name() {
        let base = user::Model {
            id: 1,
            email: "jo@example.com".to_owned(),
            first_name: None,
            last_name: Some("Doe".to_owned()),
            picture_url: None,
            created_at: Utc::now(),
        };
        assert_eq!(full_name(&base), None);

        let with_first = user::Model {
            first_name: Some("Jo".to_owned()),
            ..base.clone()
        };
        assert_eq!(full_name(&with_first).as_deref(), Some("Jo Doe"));

        let first_only = user::Model {
            first_name: Some("Jo".to_owned()),
            last_name: None,
            ..base
        };
        assert_eq!(full_name(&first_only).as_deref(), Some("Jo"));
    }

    #[test]
    fn missing_relations_leave_derived_fields_absent() {
        let record = denormalize_issue(issue_row(), IssueJoins::default());
        assert!(record.brand_name.is_none());
        assert!(record.content_url.is_none());
        assert!(record.affiliate_name.is_none());
        assert!(record.user_name.is_none());
        assert!(record.document_name.is_none());
        assert!(record.scan_started_at.is_none());
    }

    #[test]
    fn record_serializes_with_contract_field_names() {
        let record = denormalize_issue(issue_row(), IssueJoins::default());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("formattedId").is_some());
        assert!(json.get("contentURL").is_some());
        assert_eq!(json["type"], "text");
        assert_eq!(json["status"], "todo");
        assert_eq!(json["priority"], "high");
    }
}
