//! HTTP implementation of the student repository traits.
//!
//! Talks to the PostgREST endpoint exposed by the hosted backend under
//! `/rest/v1/<table>`, authenticating every request with the project API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};

use crate::domain::student::{NewStudent, StudentRecord};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::query::{
    PostgrestQuery, access_flags_query, courses_query, list_students_query, parse_content_range,
};
use crate::repository::{StudentListQuery, StudentReader, StudentWriter};

const PREFER: &str = "Prefer";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Clone)]
pub struct PostgrestRepository {
    client: Client,
    endpoint: String,
}

impl PostgrestRepository {
    /// Builds a repository for `table` on the backend at `base_url`.
    pub fn new(
        base_url: &str,
        api_key: &str,
        table: &str,
        timeout: Option<Duration>,
    ) -> RepositoryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {api_key}"))?);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let endpoint = format!("{}/rest/v1/{table}", base_url.trim_end_matches('/'));

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a read query returning the exact count (when requested) and rows.
    async fn fetch(
        &self,
        query: PostgrestQuery,
    ) -> RepositoryResult<(Option<usize>, Vec<StudentRecord>)> {
        let mut request = self.client.get(&self.endpoint).query(query.params());
        if query.counts_exactly() {
            request = request.header(PREFER, "count=exact");
        }

        log::debug!("GET {} {:?}", self.endpoint, query.params());
        let response = ensure_success(request.send().await?).await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .and_then(|range| range.total);

        let rows = response
            .json::<Option<Vec<StudentRecord>>>()
            .await?
            .unwrap_or_default();

        Ok((total, rows))
    }
}

fn header_value(value: &str) -> RepositoryResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RepositoryError::ConnectionError(format!("Invalid API key header: {e}")))
}

async fn ensure_success(response: Response) -> RepositoryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::from_response(status, &body))
}

#[async_trait]
impl StudentReader for PostgrestRepository {
    async fn list_students(
        &self,
        query: StudentListQuery,
    ) -> RepositoryResult<(usize, Vec<StudentRecord>)> {
        let (total, rows) = self.fetch(list_students_query(&query)).await?;
        Ok((total.unwrap_or(0), rows))
    }

    async fn list_access_flags(&self) -> RepositoryResult<Vec<StudentRecord>> {
        let (_, rows) = self.fetch(access_flags_query()).await?;
        Ok(rows)
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<StudentRecord>> {
        let (_, rows) = self.fetch(courses_query()).await?;
        Ok(rows)
    }
}

#[async_trait]
impl StudentWriter for PostgrestRepository {
    async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<StudentRecord> {
        log::debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("select", "*")])
            .header(PREFER, "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(new_student)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json::<StudentRecord>().await?)
    }
}
