use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::{CourseName, PageSize, PurchaseDate, SearchTerm};

/// A row of the students collection.
///
/// The backend owns the schema, so the record is kept as a plain JSON object
/// and only the columns the query layer relies on get typed accessors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct StudentRecord(Map<String, Value>);

impl StudentRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw value of a column, `None` when the column was not selected.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// String value of a column; `None` for missing, null or non-string values.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    pub fn curso(&self) -> Option<&str> {
        self.get_str("curso")
    }

    pub fn data_compra(&self) -> Option<&str> {
        self.get_str("data_compra")
    }

    /// Whether the student linked a Discord account. A missing column counts
    /// as not linked.
    pub fn has_discord(&self) -> bool {
        !matches!(self.get("discord_user_id"), None | Some(Value::Null))
    }

    pub fn status_acesso(&self) -> Option<&str> {
        self.get_str("status_acesso")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for StudentRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Payload inserted into the students collection.
///
/// No shape validation happens here: the backend is the sole source of
/// schema enforcement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct NewStudent(Map<String, Value>);

impl NewStudent {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for NewStudent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Optional constraints applied to the students list.
///
/// Every present field narrows the result. `query` matches any of `email`,
/// `nome` or `transacao`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentFilters {
    pub curso: Option<CourseName>,
    pub data_inicio: Option<PurchaseDate>,
    pub data_fim: Option<PurchaseDate>,
    pub query: Option<SearchTerm>,
}

impl StudentFilters {
    /// Builds filters from raw user input, treating blank values as absent.
    #[must_use]
    pub fn from_raw(
        curso: Option<String>,
        data_inicio: Option<String>,
        data_fim: Option<String>,
        query: Option<String>,
    ) -> Self {
        Self {
            curso: curso.and_then(|s| CourseName::new(s).ok()),
            data_inicio: data_inicio.and_then(|s| PurchaseDate::new(s).ok()),
            data_fim: data_fim.and_then(|s| PurchaseDate::new(s).ok()),
            query: query.and_then(|s| SearchTerm::new(s).ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.curso.is_none()
            && self.data_inicio.is_none()
            && self.data_fim.is_none()
            && self.query.is_none()
    }
}

/// One page of students together with the total match count.
#[derive(Clone, Debug, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    pub data: Vec<StudentRecord>,
    /// Rows matching the filters, ignoring pagination.
    pub count: usize,
    pub total_pages: usize,
}

impl StudentPage {
    #[must_use]
    pub fn new(data: Vec<StudentRecord>, count: usize, limit: PageSize) -> Self {
        Self {
            data,
            count,
            total_pages: count.div_ceil(limit.get()),
        }
    }
}

/// Aggregate counters shown on the dashboard.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub discord_count: usize,
    pub ativas_count: usize,
}
