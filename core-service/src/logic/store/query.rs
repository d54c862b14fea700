//! Grouped Aggregate Queries
//!
//! Typed description of one grouped-aggregate read, rendered to SQL.
//! Identifiers come from `Column`; only integer filter values are bound.

use serde::{Deserialize, Serialize};

use super::schema::Column;

/// Alias of the grouping expression in the result set
const SEGMENT_ALIAS: &str = "segment";

/// Grouping expression
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// Plain column value
    Column(Column),
    /// Left-inclusive bands over a numeric column.
    /// `labels.len()` must be `edges.len() + 1`; the last label catches the rest.
    Bands {
        column: Column,
        edges: Vec<i64>,
        labels: Vec<&'static str>,
    },
}

/// Aggregate over the selected rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Count,
    Sum(Column),
    Avg(Column),
    Min(Column),
    Max(Column),
    /// `SUM(is_defaulted)`
    Defaults,
    /// `AVG(is_defaulted) * 100`
    DefaultRate,
}

/// Row filter (integer equality only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Eq(Column, i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ordering of grouped rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderBy {
    /// The grouping expression
    Key(SortDirection),
    /// The n-th measure of the query
    Measure(usize, SortDirection),
    /// `MIN(column)` of each group
    MinOf(Column, SortDirection),
}

/// One grouped-aggregate read
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedQuery {
    pub group: Option<GroupKey>,
    pub measures: Vec<Measure>,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl GroupedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_by(mut self, key: GroupKey) -> Self {
        self.group = Some(key);
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render SQL for `table` plus the bound parameters in order
    pub fn to_sql(&self, table: &str) -> (String, Vec<i64>) {
        let mut select = Vec::new();
        if let Some(group) = &self.group {
            select.push(format!("{} AS {}", render_group(group), SEGMENT_ALIAS));
        }
        for (i, m) in self.measures.iter().enumerate() {
            select.push(format!("{} AS m{}", render_measure(m), i));
        }

        let mut sql = format!("SELECT {} FROM {}", select.join(", "), table);
        let mut params = Vec::new();

        if !self.filters.is_empty() {
            let clauses: Vec<String> = self
                .filters
                .iter()
                .map(|f| match f {
                    Filter::Eq(column, value) => {
                        params.push(*value);
                        format!("{} = ?{}", column.as_str(), params.len())
                    }
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if self.group.is_some() {
            sql.push_str(&format!(" GROUP BY {}", SEGMENT_ALIAS));
        }

        if !self.order.is_empty() {
            let terms: Vec<String> = self
                .order
                .iter()
                .map(|o| match o {
                    OrderBy::Key(dir) => format!("{} {}", SEGMENT_ALIAS, dir.as_sql()),
                    OrderBy::Measure(i, dir) => format!("m{} {}", i, dir.as_sql()),
                    OrderBy::MinOf(column, dir) => format!("MIN({}) {}", column.as_str(), dir.as_sql()),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }
}

fn render_group(group: &GroupKey) -> String {
    match group {
        GroupKey::Column(column) => column.as_str().to_string(),
        GroupKey::Bands { column, edges, labels } => {
            // NULL compares false everywhere and would otherwise take the ELSE band
            let mut case = format!("CASE WHEN {} IS NULL THEN NULL", column.as_str());
            for (edge, label) in edges.iter().zip(labels.iter()) {
                case.push_str(&format!(
                    " WHEN {} < {} THEN '{}'",
                    column.as_str(),
                    edge,
                    escape_literal(label)
                ));
            }
            let fallback = labels.get(edges.len()).copied().unwrap_or("Other");
            case.push_str(&format!(" ELSE '{}' END", escape_literal(fallback)));
            case
        }
    }
}

fn render_measure(measure: &Measure) -> String {
    match measure {
        Measure::Count => "COUNT(*)".to_string(),
        Measure::Sum(c) => format!("SUM({})", c.as_str()),
        Measure::Avg(c) => format!("AVG({})", c.as_str()),
        Measure::Min(c) => format!("MIN({})", c.as_str()),
        Measure::Max(c) => format!("MAX({})", c.as_str()),
        Measure::Defaults => format!("SUM({})", Column::IsDefaulted.as_str()),
        Measure::DefaultRate => format!("AVG(CAST({} AS REAL)) * 100", Column::IsDefaulted.as_str()),
    }
}

fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
