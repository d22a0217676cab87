//! Filter predicate compilation.
//!
//! Translates the two filtering modes of the list views into a
//! [`Condition`] tree for the storage layer:
//!
//! - **Basic mode**: one simple constraint per field (substring match,
//!   set membership, inclusive range), always combined with AND.
//! - **Advanced mode**: a general boolean tree of conditions with per-group
//!   AND/OR combinators, decoded from a JSON query-string parameter.
//!
//! Compilation is tolerant end to end: unknown field ids, malformed nodes,
//! unsupported operator/variant pairs and empty values all compile to *no
//! constraint*. Filter state arrives from URLs that can outlive schema
//! changes, and a stale filter must never take down the whole list view.

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::catalog::{FieldCatalog, FieldVariant};
use crate::models::{FilterMode, JoinOperator};

/// Upper bound on filter value length, matching the request-size discipline
/// of the HTTP layer. Longer values are ignored rather than truncated.
const MAX_FILTER_VALUE_LENGTH: usize = 10_000;

/// Comparison operator of an advanced filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    LessThan,
    GreaterThan,
    IsBetween,
    IsEmpty,
    IsNotEmpty,
    IsIn,
    IsNotIn,
}

/// A leaf of the advanced filter tree.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Field id, resolved against the view's [`FieldCatalog`].
    pub id: String,
    pub operator: FilterOperator,
    /// Raw value; its expected shape depends on the operator. Ignored for
    /// `isEmpty` / `isNotEmpty`.
    #[serde(default)]
    pub value: Value,
    /// Variant as sent by the client. Kept for round-tripping filter state;
    /// the catalog's variant is authoritative during compilation.
    pub variant: FieldVariant,
}

/// A node of the advanced filter tree: either a leaf condition or a group
/// combining children with its own AND/OR operator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FilterNode {
    Group {
        #[serde(rename = "joinOperator")]
        join_operator: JoinOperator,
        conditions: Vec<FilterNode>,
    },
    Condition(FilterCondition),
}

/// A single basic-mode constraint, bound to a concrete column.
#[derive(Debug, Clone)]
pub enum BasicFilter<C> {
    /// Case-insensitive substring match on a text column.
    TextContains(C, String),
    /// Case-insensitive substring match over the textual form of a numeric
    /// column (used for issue-number lookup).
    NumberContains(C, String),
    /// Exact match on an identifier column.
    IdEquals(C, String),
    /// Set membership over enum wire values.
    KeyIn(C, Vec<String>),
    /// Inclusive numeric range; either bound may be absent.
    NumberRange(C, Option<f64>, Option<f64>),
    /// Inclusive date range in epoch milliseconds, widened to start-of-day /
    /// end-of-day; either bound may be absent.
    DateRange(C, Option<i64>, Option<i64>),
}

/// Compile a view's filter state into a storage predicate.
///
/// Basic mode ANDs the non-empty `basic` constraints; advanced mode compiles
/// the `advanced` tree under the request's root `join_operator`. Either way
/// an input with no active constraints yields an empty condition, which the
/// storage layer treats as "match all rows".
pub fn compile<C: ColumnTrait>(
    catalog: &FieldCatalog<C>,
    mode: FilterMode,
    basic: Vec<BasicFilter<C>>,
    advanced: &[FilterNode],
    join_operator: JoinOperator,
) -> Condition {
    match mode {
        FilterMode::Basic => compile_basic(basic),
        FilterMode::Advanced => compile_tree(catalog, advanced, join_operator),
    }
}

/// AND together every basic filter that carries an active value.
pub fn compile_basic<C: ColumnTrait>(filters: Vec<BasicFilter<C>>) -> Condition {
    let mut condition = Condition::all();
    for filter in filters {
        if let Some(compiled) = filter.into_condition() {
            condition = condition.add(compiled);
        }
    }
    condition
}

/// Recursively compile the advanced filter tree.
pub fn compile_tree<C: ColumnTrait>(
    catalog: &FieldCatalog<C>,
    nodes: &[FilterNode],
    join_operator: JoinOperator,
) -> Condition {
    let mut condition = match join_operator {
        JoinOperator::And => Condition::all(),
        JoinOperator::Or => Condition::any(),
    };
    for node in nodes {
        if let Some(compiled) = compile_node(catalog, node) {
            condition = condition.add(compiled);
        }
    }
    condition
}

fn compile_node<C: ColumnTrait>(catalog: &FieldCatalog<C>, node: &FilterNode) -> Option<Condition> {
    match node {
        FilterNode::Group {
            join_operator,
            conditions,
        } => {
            let children: Vec<Condition> = conditions
                .iter()
                .filter_map(|child| compile_node(catalog, child))
                .collect();
            if children.is_empty() {
                return None;
            }
            let mut group = match join_operator {
                JoinOperator::And => Condition::all(),
                JoinOperator::Or => Condition::any(),
            };
            for child in children {
                group = group.add(child);
            }
            Some(group)
        }
        FilterNode::Condition(leaf) => compile_leaf(catalog, leaf),
    }
}

/// Compile one leaf. Returns `None` for unknown fields, unsupported
/// operator/variant pairs and empty values. The operator match per variant is
/// exhaustive so a new operator cannot be silently ignored.
#[allow(clippy::too_many_lines)]
fn compile_leaf<C: ColumnTrait>(
    catalog: &FieldCatalog<C>,
    leaf: &FilterCondition,
) -> Option<Condition> {
    use FilterOperator as Op;

    let field = catalog.get(&leaf.id)?;
    let col = field.column;

    match field.variant {
        FieldVariant::Text => match leaf.operator {
            Op::Equals => text_value(&leaf.value).map(|v| one(col.eq(v))),
            Op::NotEquals => text_value(&leaf.value).map(|v| one(col.ne(v))),
            Op::Contains => text_value(&leaf.value).map(|v| one(contains_ci(col, &v))),
            Op::NotContains => text_value(&leaf.value).map(|v| one(contains_ci(col, &v)).not()),
            Op::IsEmpty => Some(is_blank(col)),
            Op::IsNotEmpty => Some(is_blank(col).not()),
            Op::LessThan | Op::GreaterThan | Op::IsBetween | Op::IsIn | Op::IsNotIn => None,
        },
        FieldVariant::Number => match leaf.operator {
            Op::Equals => number_value(&leaf.value).map(|v| one(col.eq(v))),
            Op::NotEquals => number_value(&leaf.value).map(|v| one(col.ne(v))),
            Op::LessThan => number_value(&leaf.value).map(|v| one(col.lt(v))),
            Op::GreaterThan => number_value(&leaf.value).map(|v| one(col.gt(v))),
            Op::IsBetween => {
                let (from, to) = number_bounds(&leaf.value)?;
                bounded(from.map(|v| col.gte(v)), to.map(|v| col.lte(v)))
            }
            Op::IsEmpty => Some(one(col.is_null())),
            Op::IsNotEmpty => Some(one(col.is_not_null())),
            Op::Contains | Op::NotContains | Op::IsIn | Op::IsNotIn => None,
        },
        FieldVariant::Boolean => match leaf.operator {
            Op::Equals => bool_value(&leaf.value).map(|v| one(col.eq(v))),
            Op::NotEquals => bool_value(&leaf.value).map(|v| one(col.ne(v))),
            Op::Contains
            | Op::NotContains
            | Op::LessThan
            | Op::GreaterThan
            | Op::IsBetween
            | Op::IsEmpty
            | Op::IsNotEmpty
            | Op::IsIn
            | Op::IsNotIn => None,
        },
        FieldVariant::DateRange => match leaf.operator {
            // Equality on a date means "any time that day".
            Op::Equals => {
                let ms = millis_value(&leaf.value)?;
                bounded(
                    start_of_day(ms).map(|v| col.gte(v)),
                    end_of_day(ms).map(|v| col.lte(v)),
                )
            }
            Op::NotEquals => {
                let ms = millis_value(&leaf.value)?;
                bounded(
                    start_of_day(ms).map(|v| col.gte(v)),
                    end_of_day(ms).map(|v| col.lte(v)),
                )
                .map(Condition::not)
            }
            Op::LessThan => millis_value(&leaf.value)
                .and_then(start_of_day)
                .map(|v| one(col.lt(v))),
            Op::GreaterThan => millis_value(&leaf.value)
                .and_then(end_of_day)
                .map(|v| one(col.gt(v))),
            Op::IsBetween => {
                let (from, to) = millis_bounds(&leaf.value)?;
                bounded(
                    from.and_then(start_of_day).map(|v| col.gte(v)),
                    to.and_then(end_of_day).map(|v| col.lte(v)),
                )
            }
            Op::IsEmpty => Some(one(col.is_null())),
            Op::IsNotEmpty => Some(one(col.is_not_null())),
            Op::Contains | Op::NotContains | Op::IsIn | Op::IsNotIn => None,
        },
        FieldVariant::Select | FieldVariant::MultiSelect => match leaf.operator {
            Op::Equals => text_value(&leaf.value).map(|v| one(col.eq(v))),
            Op::NotEquals => text_value(&leaf.value).map(|v| one(col.ne(v))),
            Op::IsIn => list_value(&leaf.value).map(|vs| one(col.is_in(vs))),
            Op::IsNotIn => list_value(&leaf.value).map(|vs| one(col.is_not_in(vs))),
            Op::IsEmpty => Some(one(col.is_null())),
            Op::IsNotEmpty => Some(one(col.is_not_null())),
            Op::Contains | Op::NotContains | Op::LessThan | Op::GreaterThan | Op::IsBetween => None,
        },
    }
}

impl<C: ColumnTrait> BasicFilter<C> {
    fn into_condition(self) -> Option<Condition> {
        match self {
            Self::TextContains(col, needle) => {
                let needle = active_text(&needle)?;
                Some(one(contains_ci(col, needle)))
            }
            Self::NumberContains(col, needle) => {
                let needle = active_text(&needle)?;
                Some(one(contains_ci_text_cast(col, needle)))
            }
            Self::IdEquals(col, value) => {
                let value = active_text(&value)?;
                Some(one(col.eq(value)))
            }
            Self::KeyIn(col, keys) => {
                if keys.is_empty() {
                    return None;
                }
                Some(one(col.is_in(keys)))
            }
            Self::NumberRange(col, from, to) => {
                bounded(from.map(|v| col.gte(v)), to.map(|v| col.lte(v)))
            }
            Self::DateRange(col, from, to) => bounded(
                from.and_then(start_of_day).map(|v| col.gte(v)),
                to.and_then(end_of_day).map(|v| col.lte(v)),
            ),
        }
    }
}

fn one(expr: SimpleExpr) -> Condition {
    Condition::all().add(expr)
}

/// AND up to two bound expressions; `None` when neither bound is present.
fn bounded(lower: Option<SimpleExpr>, upper: Option<SimpleExpr>) -> Option<Condition> {
    if lower.is_none() && upper.is_none() {
        return None;
    }
    let mut condition = Condition::all();
    if let Some(expr) = lower {
        condition = condition.add(expr);
    }
    if let Some(expr) = upper {
        condition = condition.add(expr);
    }
    Some(condition)
}

/// Case-insensitive substring match: `UPPER(col) LIKE UPPER('%needle%')`.
fn contains_ci<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::upper(Expr::col(col)))
        .like(format!("%{}%", needle.to_uppercase()))
}

/// Same as [`contains_ci`] with the column cast to TEXT first, for numeric
/// columns matched as text.
fn contains_ci_text_cast<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::upper(Expr::cast_as(Expr::col(col), Alias::new("TEXT"))))
        .like(format!("%{}%", needle.to_uppercase()))
}

/// NULL or empty string, the two "nothing here" encodings of text columns.
fn is_blank<C: ColumnTrait>(col: C) -> Condition {
    Condition::any().add(col.is_null()).add(col.eq(""))
}

fn active_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && trimmed.len() <= MAX_FILTER_VALUE_LENGTH).then_some(trimmed)
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => active_text(s).map(str::to_owned),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn millis_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_bounds(value: &Value) -> Option<(Option<f64>, Option<f64>)> {
    let Value::Array(entries) = value else {
        return None;
    };
    Some((
        entries.first().and_then(number_value),
        entries.get(1).and_then(number_value),
    ))
}

fn millis_bounds(value: &Value) -> Option<(Option<i64>, Option<i64>)> {
    let Value::Array(entries) = value else {
        return None;
    };
    Some((
        entries.first().and_then(millis_value),
        entries.get(1).and_then(millis_value),
    ))
}

fn list_value(value: &Value) -> Option<Vec<String>> {
    let Value::Array(entries) = value else {
        return None;
    };
    let values: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) => active_text(s).map(str::to_owned),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Start of the civil day (UTC) containing the given epoch-millisecond
/// instant.
pub(crate) fn start_of_day(ms: i64) -> Option<DateTime<Utc>> {
    let instant = Utc.timestamp_millis_opt(ms).single()?;
    instant
        .date_naive()
        .and_hms_milli_opt(0, 0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Last representable millisecond of the civil day (UTC) containing the
/// given instant.
pub(crate) fn end_of_day(ms: i64) -> Option<DateTime<Utc>> {
    let instant = Utc.timestamp_millis_opt(ms).single()?;
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Decode the `filters` query parameter into filter nodes. Malformed JSON or
/// individually malformed nodes are dropped, never surfaced as errors.
#[must_use]
pub fn parse_filter_nodes(raw: Option<&str>) -> Vec<FilterNode> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed filters parameter");
            Vec::new()
        }
    }
}

/// Decode a `"[from,to]"` numeric-range query parameter. Either bound may be
/// `null`; anything malformed decodes as no bounds.
#[must_use]
pub fn parse_number_pair(raw: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    serde_json::from_str::<Vec<Option<f64>>>(raw)
        .map(|bounds| {
            (
                bounds.first().copied().flatten(),
                bounds.get(1).copied().flatten(),
            )
        })
        .unwrap_or((None, None))
}

/// Decode a `"[from,to]"` epoch-millisecond range query parameter.
#[must_use]
pub fn parse_millis_pair(raw: Option<&str>) -> (Option<i64>, Option<i64>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    serde_json::from_str::<Vec<Option<i64>>>(raw)
        .map(|bounds| {
            (
                bounds.first().copied().flatten(),
                bounds.get(1).copied().flatten(),
            )
        })
        .unwrap_or((None, None))
}

/// Split a comma-separated query parameter into trimmed, non-empty values.
#[must_use]
pub fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect()
    })
}
