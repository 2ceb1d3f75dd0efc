//! Filtered-read query construction (PostgREST query-string dialect).
//!
//! ```text
//! GET /rest/v1/clienti?or=(telefono.eq.+39111,nome.ilike.*Mario*)&select=*&limit=1
//! GET /rest/v1/bookings?date=eq.2025-03-01&status=eq.available&select=*
//! ```

use serde_json::{Map, Value};

use crate::registry::FieldIssue;

/// Characters PostgREST treats as syntax inside `or=(...)` lists.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\'];

/// Pattern wildcards of `ilike` (`*` is PostgREST's alias for `%`).
const WILDCARDS: &[char] = &['*', '%'];

/// One row predicate. Argument-backed predicates take their value from the
/// tool call; `Fixed` ones are part of the operation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column=eq.<argument>`
    Eq { column: String, argument: String },
    /// `column=ilike.*<argument>*` (case-insensitive substring match)
    ILike { column: String, argument: String },
    /// `column=eq.<value>`
    Fixed { column: String, value: String },
    /// `or=(...)` over the predicates whose arguments were supplied.
    AnyOf(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::Eq {
            column: column.into(),
            argument: argument.into(),
        }
    }

    pub fn ilike(column: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::ILike {
            column: column.into(),
            argument: argument.into(),
        }
    }

    pub fn fixed(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Fixed {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn any_of(filters: Vec<Filter>) -> Self {
        Self::AnyOf(filters)
    }

    /// Argument names this filter reads.
    pub fn arguments(&self) -> Vec<&str> {
        match self {
            Self::Eq { argument, .. } | Self::ILike { argument, .. } => vec![argument.as_str()],
            Self::Fixed { .. } => Vec::new(),
            Self::AnyOf(inner) => inner.iter().flat_map(|f| f.arguments()).collect(),
        }
    }

    fn render(
        &self,
        args: &Map<String, Value>,
        pairs: &mut Vec<(String, String)>,
        issues: &mut Vec<FieldIssue>,
    ) {
        match self {
            Self::Eq { column, argument } => match scalar_argument(args, argument) {
                Ok(Some(v)) => pairs.push((column.clone(), format!("eq.{v}"))),
                Ok(None) => issues.push(FieldIssue::missing(argument.as_str())),
                Err(issue) => issues.push(issue),
            },
            Self::ILike { column, argument } => match pattern_argument(args, argument) {
                Ok(Some(v)) => pairs.push((column.clone(), format!("ilike.*{v}*"))),
                Ok(None) => issues.push(FieldIssue::missing(argument.as_str())),
                Err(issue) => issues.push(issue),
            },
            Self::Fixed { column, value } => pairs.push((column.clone(), format!("eq.{value}"))),
            Self::AnyOf(inner) => {
                let mut terms = Vec::with_capacity(inner.len());
                for filter in inner {
                    match filter.or_term(args) {
                        Ok(Some(term)) => terms.push(term),
                        Ok(None) => {}
                        Err(issue) => issues.push(issue),
                    }
                }
                if terms.is_empty() {
                    issues.push(FieldIssue::new(
                        "",
                        format!("at least one of {} is required", self.arguments().join(", ")),
                    ));
                } else {
                    pairs.push(("or".to_string(), format!("({})", terms.join(","))));
                }
            }
        }
    }

    /// `column.op.value` term inside an `or=(...)` list; `None` when the
    /// argument is absent.
    fn or_term(&self, args: &Map<String, Value>) -> Result<Option<String>, FieldIssue> {
        Ok(match self {
            Self::Eq { column, argument } => scalar_argument(args, argument)?
                .map(|v| format!("{column}.eq.{}", quote_reserved(&v))),
            Self::ILike { column, argument } => pattern_argument(args, argument)?
                .map(|v| format!("{column}.ilike.{}", quote_reserved(&format!("*{v}*")))),
            Self::Fixed { column, value } => {
                Some(format!("{column}.eq.{}", quote_reserved(value)))
            }
            Self::AnyOf(_) => {
                return Err(FieldIssue::new("", "nested filter groups are not supported"))
            }
        })
    }
}

/// A filtered read against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub select: String,
    pub limit: Option<u32>,
}

impl ReadQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            select: "*".to_string(),
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    pub fn limit(mut self, rows: u32) -> Self {
        self.limit = Some(rows);
        self
    }

    /// Render the query string pairs for `args`, or every argument problem found.
    pub fn query_pairs(
        &self,
        args: &Map<String, Value>,
    ) -> Result<Vec<(String, String)>, Vec<FieldIssue>> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        let mut issues = Vec::new();

        for filter in &self.filters {
            filter.render(args, &mut pairs, &mut issues);
        }
        if !issues.is_empty() {
            return Err(issues);
        }

        pairs.push(("select".to_string(), self.select.clone()));
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        Ok(pairs)
    }
}

/// Textual value of a scalar argument. Absent, null and blank strings count
/// as not supplied: a blank `ilike` pattern would match every row.
fn scalar_argument(args: &Map<String, Value>, name: &str) -> Result<Option<String>, FieldIssue> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(FieldIssue::new(name, "expected a string, number or boolean")),
    }
}

/// Literal text of an `ilike` argument. Wildcards (`*`, `%`) are dropped, so
/// a value made only of wildcards counts as not supplied.
fn pattern_argument(args: &Map<String, Value>, name: &str) -> Result<Option<String>, FieldIssue> {
    Ok(scalar_argument(args, name)?.and_then(|v| {
        let literal: String = v.chars().filter(|c| !WILDCARDS.contains(c)).collect();
        let literal = literal.trim();
        (!literal.is_empty()).then(|| literal.to_string())
    }))
}

fn quote_reserved(value: &str) -> String {
    if value.contains(RESERVED) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
