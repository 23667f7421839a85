//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::domain::{DEFAULT_PAGE_SIZE, STUDENTS_TABLE};

#[derive(Clone, Debug, Deserialize)]
/// Settings for the HTTP server and the students backend.
pub struct AppConfig {
    pub address: String,
    pub port: u16,
    /// Project URL of the hosted backend, without the `/rest/v1` suffix.
    pub supabase_url: String,
    pub supabase_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_table() -> String {
    STUDENTS_TABLE.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
