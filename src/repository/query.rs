//! PostgREST query-string builder.
//!
//! Filters are rendered as `column=operator.value` pairs, disjunctions as a
//! single `or=(...)` pair and pagination as `offset`/`limit`. The pairs are
//! URL-encoded by the HTTP client.

use crate::repository::StudentListQuery;

/// Columns the free-text search is matched against.
pub const SEARCH_COLUMNS: [&str; 3] = ["email", "nome", "transacao"];

/// Column used for the fixed most-recent-first ordering.
pub const PURCHASE_DATE_COLUMN: &str = "data_compra";

const RESERVED_CHARS: [char; 7] = [',', '(', ')', '.', ':', '"', '\\'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostgrestQuery {
    params: Vec<(String, String)>,
    exact_count: bool,
}

impl PostgrestQuery {
    pub fn select(columns: &str) -> Self {
        Self {
            params: vec![("select".to_string(), columns.to_string())],
            exact_count: false,
        }
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: &str) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lte(self, column: &str, value: &str) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, "not.is", "null")
    }

    /// Case-insensitive substring match of `term` against any of `columns`.
    pub fn any_ilike(mut self, columns: &[&str], term: &str) -> Self {
        let pattern = quote_logic_value(&format!("*{term}*"));
        let conditions = columns
            .iter()
            .map(|column| format!("{column}.ilike.{pattern}"))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push(("or".to_string(), format!("({conditions})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Restricts the result to the zero-based inclusive row range.
    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.params.push(("offset".to_string(), from.to_string()));
        self.params
            .push(("limit".to_string(), (to + 1 - from).to_string()));
        self
    }

    /// Asks the backend for the exact number of matching rows.
    pub fn exact_count(mut self) -> Self {
        self.exact_count = true;
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn counts_exactly(&self) -> bool {
        self.exact_count
    }

    fn filter(mut self, column: &str, operator: &str, value: &str) -> Self {
        self.params
            .push((column.to_string(), format!("{operator}.{value}")));
        self
    }
}

/// Double-quotes a value placed inside an `or=(...)` list when it contains
/// characters PostgREST treats as syntax.
fn quote_logic_value(value: &str) -> String {
    if value.contains(RESERVED_CHARS) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Query for one filtered page of students, most recent purchase first.
pub fn list_students_query(query: &StudentListQuery) -> PostgrestQuery {
    let filters = &query.filters;
    let mut pg = PostgrestQuery::select("*")
        .exact_count()
        .order(PURCHASE_DATE_COLUMN, false);

    if let Some(curso) = &filters.curso {
        pg = pg.eq("curso", curso.as_str());
    }
    if let Some(from) = &filters.data_inicio {
        pg = pg.gte(PURCHASE_DATE_COLUMN, from.as_str());
    }
    if let Some(until) = &filters.data_fim {
        pg = pg.lte(PURCHASE_DATE_COLUMN, until.as_str());
    }
    if let Some(term) = &filters.query {
        pg = pg.any_ilike(&SEARCH_COLUMNS, term.as_str());
    }
    if let Some(pagination) = &query.pagination {
        let (from, to) = pagination.range();
        pg = pg.range(from, to);
    }

    pg
}

pub fn access_flags_query() -> PostgrestQuery {
    PostgrestQuery::select("discord_user_id,status_acesso")
}

pub fn courses_query() -> PostgrestQuery {
    PostgrestQuery::select("curso").not_null("curso")
}

/// Parsed `Content-Range` response header, e.g. `0-49/1200` or `*/0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub rows: Option<(usize, usize)>,
    /// `None` when the backend answered `*` (count not computed).
    pub total: Option<usize>,
}

pub fn parse_content_range(value: &str) -> Option<ContentRange> {
    let (rows, total) = value.trim().split_once('/')?;

    let rows = match rows {
        "*" => None,
        rows => {
            let (first, last) = rows.split_once('-')?;
            Some((first.parse().ok()?, last.parse().ok()?))
        }
    };
    let total = match total {
        "*" => None,
        total => Some(total.parse().ok()?),
    };

    Some(ContentRange { rows, total })
}
