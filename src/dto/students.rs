//! DTOs exposed by the students API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::student::StudentFilters;
use crate::domain::types::{PageNumber, PageSize, TypeConstraintError};

/// Query parameters accepted by `GET /api/v1/students`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentsQuery {
    pub curso: Option<String>,
    /// Inclusive lower bound on the purchase date.
    pub data_inicio: Option<String>,
    /// Inclusive upper bound on the purchase date.
    pub data_fim: Option<String>,
    /// Free-form search across email, name and transaction code.
    pub query: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl StudentsQuery {
    /// Splits the raw parameters into filters and validated pagination,
    /// falling back to page 1 and `default_limit`.
    pub fn into_parts(
        self,
        default_limit: usize,
    ) -> Result<(StudentFilters, PageNumber, PageSize), TypeConstraintError> {
        let page = PageNumber::new(self.page.unwrap_or(1))?;
        let limit = PageSize::new(self.limit.unwrap_or(default_limit))?;
        let filters = StudentFilters::from_raw(self.curso, self.data_inicio, self.data_fim, self.query);
        Ok((filters, page, limit))
    }
}

/// Body returned for failed API calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
