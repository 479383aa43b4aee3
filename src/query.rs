use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{error::ApiError, policy::ScopeFilter};

/// FieldValue
///
/// A single typed value read out of a record or bound into a query. This is the
/// lingua franca between the predicate, the in-memory evaluation used by tests,
/// and the SQL rendering in the repository — all three must agree on it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Id(Uuid),
}

/// Record
///
/// The capability a record type must provide to participate in scoped listing:
/// where it lives, what it can be sorted by, which fields free-text search spans,
/// and how to read a field back out of a loaded record. The pagination engine and
/// the generic Postgres record set are both parameterized over this trait, so the
/// filter/search/page logic exists exactly once for all record types.
pub trait Record: Send + Sync + Unpin + 'static {
    /// The backing table name.
    const TABLE: &'static str;
    /// Fields a caller may sort by. Anything else is `InvalidSortField`.
    const SORTABLE: &'static [&'static str];
    /// Sort applied when the caller supplies none (`-` prefix = descending).
    const DEFAULT_SORT: &'static str;
    /// Per-resource page size override; `None` defers to the configured default.
    const DEFAULT_PAGE_SIZE: Option<i64> = None;
    /// Fields the free-text search OR-group spans.
    const SEARCH_FIELDS: &'static [&'static str];

    /// Reads a field by column name. Returns `None` for unknown fields.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Clause
///
/// One conjunct of a predicate. All clauses are ANDed together; the search clause
/// is internally an OR-group across its fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on a single field.
    Eq {
        field: &'static str,
        value: FieldValue,
    },
    /// Inclusive date range; open-ended when a bound is absent.
    DateRange {
        field: &'static str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Case-insensitive substring match across all listed fields.
    Search {
        term: String,
        fields: &'static [&'static str],
    },
}

/// Predicate
///
/// The fully composed query filter: caller-supplied field filters, the role
/// policy's scope filter, and the free-text search clause, merged with AND
/// semantics. An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub clauses: Vec<Clause>,
}

impl Predicate {
    /// matches
    ///
    /// Reference evaluation of the predicate against an in-memory record. The SQL
    /// rendering in the repository must produce the same result set; integration
    /// tests rely on this to exercise scoping and search without a database.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq { field, value } => record.field(field).as_ref() == Some(value),
            Clause::DateRange { field, from, to } => match record.field(field) {
                Some(FieldValue::Date(d)) => {
                    from.is_none_or(|f| d >= f) && to.is_none_or(|t| d <= t)
                }
                Some(FieldValue::Timestamp(ts)) => {
                    let d = ts.date_naive();
                    from.is_none_or(|f| d >= f) && to.is_none_or(|t| d <= t)
                }
                _ => false,
            },
            Clause::Search { term, fields } => {
                let needle = term.to_lowercase();
                fields.iter().any(|f| match record.field(f) {
                    Some(FieldValue::Text(text)) => text.to_lowercase().contains(&needle),
                    _ => false,
                })
            }
        })
    }
}

/// ScopedQuery
///
/// Builder that assembles a `Predicate` from the three filter sources. The scope
/// filter is applied at construction so that no call-site can accidentally build
/// an unscoped query for a scoped resource.
#[derive(Debug, Clone)]
pub struct ScopedQuery {
    clauses: Vec<Clause>,
}

impl ScopedQuery {
    pub fn new(scope: ScopeFilter) -> Self {
        let mut clauses = Vec::new();
        match scope {
            ScopeFilter::Unrestricted => {}
            ScopeFilter::Office(office_id) => clauses.push(Clause::Eq {
                field: "office_id",
                value: FieldValue::Text(office_id),
            }),
            ScopeFilter::CreatedBy(email) => clauses.push(Clause::Eq {
                field: "created_by",
                value: FieldValue::Text(email),
            }),
        }
        Self { clauses }
    }

    /// A builder with no scope restriction, for globally visible resources.
    pub fn unscoped() -> Self {
        Self::new(ScopeFilter::Unrestricted)
    }

    /// Exact match on a text field.
    pub fn eq_text(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Eq {
            field,
            value: FieldValue::Text(value.into()),
        });
        self
    }

    /// Exact match on an optional text filter; absent values add no clause.
    pub fn eq_text_opt(self, field: &'static str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.eq_text(field, v),
            None => self,
        }
    }

    /// Match on the primary key.
    pub fn id(mut self, id: Uuid) -> Self {
        self.clauses.push(Clause::Eq {
            field: "id",
            value: FieldValue::Id(id),
        });
        self
    }

    /// Exact match on an optional numeric filter. The value must be finite and
    /// non-negative; anything else is rejected rather than silently coerced.
    pub fn eq_amount(mut self, field: &'static str, value: Option<f64>) -> Result<Self, ApiError> {
        if let Some(amount) = value {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ApiError::InvalidFilterValue(field));
            }
            self.clauses.push(Clause::Eq {
                field,
                value: FieldValue::Number(amount),
            });
        }
        Ok(self)
    }

    /// Inclusive date range. Adds no clause when both bounds are absent.
    pub fn date_range(
        mut self,
        field: &'static str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        if from.is_some() || to.is_some() {
            self.clauses.push(Clause::DateRange { field, from, to });
        }
        self
    }

    /// Free-text search OR-group. An empty or whitespace-only term adds no clause,
    /// so "no search" and "empty search" are indistinguishable by design.
    pub fn search(mut self, term: Option<&str>, fields: &'static [&'static str]) -> Self {
        if let Some(term) = term {
            let term = term.trim();
            if !term.is_empty() && !fields.is_empty() {
                self.clauses.push(Clause::Search {
                    term: term.to_string(),
                    fields,
                });
            }
        }
        self
    }

    pub fn build(self) -> Predicate {
        Predicate {
            clauses: self.clauses,
        }
    }
}

/// Sort
///
/// A validated sort order: a field name from the record type's sortable set, with
/// an optional `-` prefix in the raw form for descending.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: &'static str,
    pub descending: bool,
}

impl Sort {
    /// parse
    ///
    /// Resolves the caller-supplied sort (or the record type's default) against the
    /// sortable allowlist. Unknown fields fail with `InvalidSortField` instead of
    /// silently falling back, so a typo in a client is visible immediately.
    pub fn parse<T: Record>(raw: Option<&str>) -> Result<Self, ApiError> {
        let raw = raw.unwrap_or(T::DEFAULT_SORT);
        let (field_name, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        let field = T::SORTABLE
            .iter()
            .find(|f| **f == field_name)
            .copied()
            .ok_or_else(|| ApiError::InvalidSortField(field_name.to_string()))?;

        Ok(Self { field, descending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filter_becomes_leading_clause() {
        let predicate = ScopedQuery::new(ScopeFilter::Office("DXB-01".into())).build();
        assert_eq!(
            predicate.clauses,
            vec![Clause::Eq {
                field: "office_id",
                value: FieldValue::Text("DXB-01".into()),
            }]
        );
    }

    #[test]
    fn empty_search_term_adds_no_clause() {
        let with_empty = ScopedQuery::unscoped()
            .search(Some(""), &["passenger_name"])
            .build();
        let with_blank = ScopedQuery::unscoped()
            .search(Some("   "), &["passenger_name"])
            .build();
        let without = ScopedQuery::unscoped().build();
        assert_eq!(with_empty, without);
        assert_eq!(with_blank, without);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = ScopedQuery::unscoped()
            .eq_amount("amount", Some(-1.0))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilterValue("amount")));

        let err = ScopedQuery::unscoped()
            .eq_amount("amount", Some(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFilterValue("amount")));
    }

    #[test]
    fn absent_date_bounds_add_no_clause() {
        let predicate = ScopedQuery::unscoped().date_range("date", None, None).build();
        assert!(predicate.clauses.is_empty());
    }
}
