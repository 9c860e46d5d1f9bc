//! Query-parameter driven filtering, sorting and pagination
//!
//! The admin listing endpoint accepts free-form query parameters and turns
//! them into comparison filters over the documents' JSON representation.
//! `field=value` is an equality test; `field[op]=value` applies one of the
//! gt/gte/lt/lte/in operators. `select`, `sort`, `page` and `limit` are
//! reserved control parameters, never filters.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Reserved query parameters that are not filters
const RESERVED_PARAMS: &[&str] = &["select", "sort", "page", "limit"];

/// Default page size for listings
pub const DEFAULT_PAGE_LIMIT: usize = 25;

// ============================================================================
// Filters
// ============================================================================

/// Comparison operator parsed from a `field[op]=value` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// A single field comparison
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl FieldFilter {
    /// Parse a raw query key/value pair. Returns `None` for reserved keys and
    /// unknown operators.
    fn from_param(key: &str, value: &str) -> Option<Self> {
        if RESERVED_PARAMS.contains(&key) {
            return None;
        }

        if let Some((field, rest)) = key.split_once('[') {
            let op_str = rest.strip_suffix(']')?;
            let op = FilterOp::parse(op_str)?;
            return Some(Self {
                field: field.to_string(),
                op,
                value: value.to_string(),
            });
        }

        Some(Self {
            field: key.to_string(),
            op: FilterOp::Eq,
            value: value.to_string(),
        })
    }

    /// Test a document (as JSON) against this filter
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(field) = doc.get(&self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => json_as_string(field) == self.value,
            FilterOp::In => self
                .value
                .split(',')
                .any(|candidate| json_as_string(field) == candidate.trim()),
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                let Some(ord) = compare_json_to_str(field, &self.value) else {
                    return false;
                };
                match self.op {
                    FilterOp::Gt => ord.is_gt(),
                    FilterOp::Gte => ord.is_ge(),
                    FilterOp::Lt => ord.is_lt(),
                    FilterOp::Lte => ord.is_le(),
                    _ => unreachable!(),
                }
            }
        }
    }
}

/// String form of a scalar JSON value (no surrounding quotes)
fn json_as_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compare a JSON field to a raw query value. Numbers compare numerically;
/// everything else compares lexicographically, which is ordering-correct for
/// RFC 3339 timestamps.
fn compare_json_to_str(field: &Value, value: &str) -> Option<std::cmp::Ordering> {
    if let (Some(lhs), Ok(rhs)) = (field.as_f64(), value.parse::<f64>()) {
        return lhs.partial_cmp(&rhs);
    }
    Some(json_as_string(field).as_str().cmp(value))
}

// ============================================================================
// List Parameters
// ============================================================================

/// Parsed listing controls: filters plus sort/page/limit
#[derive(Debug, Clone)]
pub struct ListParams {
    pub filters: Vec<FieldFilter>,
    /// Comma-separated sort keys; a `-` prefix means descending
    pub sort: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ListParams {
    /// Build from raw query parameters
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let filters = params
            .iter()
            .filter_map(|(k, v)| FieldFilter::from_param(k, v))
            .collect();

        let page = params
            .get("page")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        Self {
            filters,
            sort: params.get("sort").cloned(),
            page,
            limit,
        }
    }

    /// Apply filters, sorting and pagination to a set of documents.
    ///
    /// `default_sort` is used when no `sort` parameter was given (e.g.
    /// `-appointmentDateTime` for appointment listings).
    pub fn apply<T: Serialize + Clone>(&self, docs: &[T], default_sort: &str) -> ListPage<T> {
        // Pair each document with its JSON view so filters and sort keys see
        // the wire-format field names.
        let mut rows: Vec<(T, Value)> = docs
            .iter()
            .filter_map(|d| serde_json::to_value(d).ok().map(|v| (d.clone(), v)))
            .filter(|(_, v)| self.filters.iter().all(|f| f.matches(v)))
            .collect();

        let sort_spec = self.sort.as_deref().unwrap_or(default_sort);
        sort_rows(&mut rows, sort_spec);

        let total = rows.len();
        // page and limit come straight from query parameters; saturate so
        // extreme values produce an empty page instead of overflowing
        let start = (self.page - 1).saturating_mul(self.limit);
        let end = start.saturating_add(self.limit).min(total);
        let items: Vec<T> = if start < total {
            rows[start..end].iter().map(|(d, _)| d.clone()).collect()
        } else {
            Vec::new()
        };

        let pagination = Pagination {
            next: (end < total).then(|| PageRef {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (start > 0).then_some(PageRef {
                page: self.page - 1,
                limit: self.limit,
            }),
        };

        ListPage {
            items,
            total,
            pagination,
        }
    }
}

fn sort_rows<T>(rows: &mut [(T, Value)], sort_spec: &str) {
    let keys: Vec<(&str, bool)> = sort_spec
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| match k.strip_prefix('-') {
            Some(field) => (field, true),
            None => (k, false),
        })
        .collect();

    rows.sort_by(|(_, a), (_, b)| {
        for (field, descending) in &keys {
            let lhs = a.get(field);
            let rhs = b.get(field);
            let ord = compare_json_fields(lhs, rhs);
            if ord != std::cmp::Ordering::Equal {
                return if *descending { ord.reverse() } else { ord };
            }
        }
        std::cmp::Ordering::Equal
    });
}

fn compare_json_fields(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                json_as_string(a).cmp(&json_as_string(b))
            }
        }
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

// ============================================================================
// Results
// ============================================================================

/// One page of listing results
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub pagination: Pagination,
}

/// Next/previous page hints
#[derive(Debug, Clone, Default, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// Reference to an adjacent page
#[derive(Debug, Clone, Serialize)]
pub struct PageRef {
    pub page: usize,
    pub limit: usize,
}

// ============================================================================
// Tests
// ============================================================================
