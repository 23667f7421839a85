//! In-process stand-in for the PostgREST endpoint used by integration tests.
//!
//! Understands the subset of the query grammar the repository emits:
//! `select`, `order`, `offset`, `limit`, `eq`, `gte`, `lte`, `not.is.null`
//! and an `or=(...)` list of `ilike` conditions.
#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use alunas::models::config::AppConfig;
use alunas::repository::PostgrestRepository;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

pub const API_KEY: &str = "test-key";
pub const TABLE: &str = "alunas_hotmart";

pub struct FakeBackend {
    rows: Mutex<Vec<Map<String, Value>>>,
    requests: AtomicUsize,
    failing: AtomicBool,
}

pub struct FakePostgrest {
    pub base_url: String,
    backend: web::Data<FakeBackend>,
}

impl FakePostgrest {
    pub async fn start(rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let backend = web::Data::new(FakeBackend {
            rows: Mutex::new(rows),
            requests: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        });

        let data = backend.clone();
        let path = format!("/rest/v1/{TABLE}");
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route(&path, web::get().to(select_rows))
                .route(&path, web::post().to(insert_row))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake backend");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self {
            base_url: format!("http://{addr}"),
            backend,
        }
    }

    pub fn repository(&self) -> PostgrestRepository {
        PostgrestRepository::new(&self.base_url, API_KEY, TABLE, None).expect("repository")
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            address: "127.0.0.1".into(),
            port: 0,
            supabase_url: self.base_url.clone(),
            supabase_key: API_KEY.into(),
            table: TABLE.into(),
            default_page_size: 50,
            request_timeout_secs: Some(5),
        }
    }

    /// Number of authorized requests served so far.
    pub fn request_count(&self) -> usize {
        self.backend.requests.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.backend.failing.store(failing, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.backend.rows.lock().len()
    }
}

fn guard(req: &HttpRequest, backend: &FakeBackend) -> Option<HttpResponse> {
    let authorized = req
        .headers()
        .get("apikey")
        .and_then(|value| value.to_str().ok())
        == Some(API_KEY);
    if !authorized {
        return Some(HttpResponse::Unauthorized().json(json!({
            "message": "Invalid API key",
            "hint": "Double check your Supabase `anon` or `service_role` API key."
        })));
    }

    backend.requests.fetch_add(1, Ordering::SeqCst);

    if backend.failing.load(Ordering::SeqCst) {
        return Some(HttpResponse::InternalServerError().json(json!({
            "code": "XX000",
            "message": "boom",
            "details": null,
            "hint": null
        })));
    }
    None
}

enum Condition {
    Eq(String, String),
    Gte(String, String),
    Lte(String, String),
    NotNull(String),
    AnyIlike(Vec<(String, String)>),
}

impl Condition {
    fn parse(column: &str, expr: &str) -> Option<Self> {
        if column == "or" {
            let inner = expr.strip_prefix('(')?.strip_suffix(')')?;
            let mut alternatives = Vec::new();
            for part in split_unquoted(inner) {
                let mut pieces = part.splitn(3, '.');
                let column = pieces.next()?;
                if pieces.next()? != "ilike" {
                    return None;
                }
                let pattern = unquote(pieces.next()?);
                let needle = pattern.trim_matches('*').to_lowercase();
                alternatives.push((column.to_string(), needle));
            }
            return Some(Condition::AnyIlike(alternatives));
        }

        let (op, value) = expr.split_once('.')?;
        let column = column.to_string();
        let value = value.to_string();
        match op {
            "eq" => Some(Condition::Eq(column, value)),
            "gte" => Some(Condition::Gte(column, value)),
            "lte" => Some(Condition::Lte(column, value)),
            "not" if value == "is.null" => Some(Condition::NotNull(column)),
            _ => None,
        }
    }

    fn matches(&self, row: &Map<String, Value>) -> bool {
        let text = |column: &str| row.get(column).and_then(Value::as_str).map(str::to_string);
        match self {
            Condition::Eq(column, value) => text(column).as_deref() == Some(value.as_str()),
            Condition::Gte(column, value) => text(column).is_some_and(|v| v.as_str() >= value.as_str()),
            Condition::Lte(column, value) => text(column).is_some_and(|v| v.as_str() <= value.as_str()),
            Condition::NotNull(column) => !matches!(row.get(column), None | Some(Value::Null)),
            Condition::AnyIlike(alternatives) => alternatives.iter().any(|(column, needle)| {
                text(column).is_some_and(|v| v.to_lowercase().contains(needle))
            }),
        }
    }
}

/// Splits an `or` list on commas that are not inside double quotes.
fn split_unquoted(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for ch in list.chars() {
        match ch {
            _ if escaped => {
                escaped = false;
                current.push(ch);
            }
            '\\' => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                quoted = !quoted;
                current.push(ch);
            }
            ',' if !quoted => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

async fn select_rows(
    req: HttpRequest,
    params: web::Query<Vec<(String, String)>>,
    backend: web::Data<FakeBackend>,
) -> HttpResponse {
    if let Some(response) = guard(&req, &backend) {
        return response;
    }

    let mut columns: Option<Vec<String>> = None;
    let mut order: Option<(String, bool)> = None;
    let mut offset = 0usize;
    let mut limit: Option<usize> = None;
    let mut conditions = Vec::new();

    for (key, value) in params.into_inner() {
        match key.as_str() {
            "select" if value != "*" => {
                columns = Some(value.split(',').map(str::to_string).collect());
            }
            "select" => {}
            "order" => {
                let (column, direction) = value.split_once('.').unwrap_or((value.as_str(), "asc"));
                order = Some((column.to_string(), direction == "asc"));
            }
            "offset" => offset = value.parse().unwrap_or(0),
            "limit" => limit = value.parse().ok(),
            column => match Condition::parse(column, &value) {
                Some(condition) => conditions.push(condition),
                None => {
                    return HttpResponse::BadRequest()
                        .json(json!({"message": format!("unsupported filter {column}={value}")}));
                }
            },
        }
    }

    let mut rows: Vec<Map<String, Value>> = backend
        .rows
        .lock()
        .iter()
        .filter(|row| conditions.iter().all(|c| c.matches(row)))
        .cloned()
        .collect();

    if let Some((column, ascending)) = &order {
        rows.sort_by(|a, b| {
            let a = a.get(column).and_then(Value::as_str);
            let b = b.get(column).and_then(Value::as_str);
            let ordering = match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => CmpOrdering::Less,
                (None, Some(_)) => CmpOrdering::Greater,
                (None, None) => CmpOrdering::Equal,
            };
            if *ascending { ordering } else { ordering.reverse() }
        });
    }

    let total = rows.len();
    let page: Vec<Value> = rows
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| match &columns {
            Some(columns) => Value::Object(
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect(),
            ),
            None => Value::Object(row),
        })
        .collect();

    let wants_count = req
        .headers()
        .get("Prefer")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("count=exact"));
    let rows_range = if page.is_empty() {
        "*".to_string()
    } else {
        format!("{}-{}", offset, offset + page.len() - 1)
    };
    let total = if wants_count {
        total.to_string()
    } else {
        "*".to_string()
    };

    HttpResponse::Ok()
        .insert_header(("Content-Range", format!("{rows_range}/{total}")))
        .json(page)
}

async fn insert_row(
    req: HttpRequest,
    body: web::Json<Value>,
    backend: web::Data<FakeBackend>,
) -> HttpResponse {
    if let Some(response) = guard(&req, &backend) {
        return response;
    }

    let Value::Object(mut row) = body.into_inner() else {
        return HttpResponse::BadRequest().json(json!({"message": "expected a JSON object"}));
    };

    let mut rows = backend.rows.lock();
    row.entry("id").or_insert_with(|| json!(rows.len() + 1));
    rows.push(row.clone());

    let single = req
        .headers()
        .get("Accept")
        .and_then(|value| value.to_str().ok())
        == Some("application/vnd.pgrst.object+json");

    if single {
        HttpResponse::Created().json(Value::Object(row))
    } else {
        HttpResponse::Created().json(vec![Value::Object(row)])
    }
}

/// Five students with overlapping discord links, statuses and courses.
pub fn sample_rows() -> Vec<Value> {
    vec![
        json!({
            "id": 1, "nome": "Ana Souza", "email": "ana@example.com", "transacao": "HP001",
            "curso": "Python", "data_compra": "2024-01-10T09:00:00",
            "discord_user_id": "d-1", "status_acesso": "ativo"
        }),
        json!({
            "id": 2, "nome": "Bruno Lima", "email": "bruno@example.com", "transacao": "HP002",
            "curso": "python", "data_compra": "2024-01-15T12:00:00",
            "discord_user_id": null, "status_acesso": "ativo"
        }),
        json!({
            "id": 3, "nome": "Carla Dias", "email": "mariana.carla@example.com", "transacao": "HP003",
            "curso": "Python", "data_compra": "2024-02-01T00:00:00",
            "discord_user_id": "d-3", "status_acesso": "inativo"
        }),
        json!({
            "id": 4, "nome": "Diego Rocha", "email": "diego@example.com", "transacao": "HP-ANA-4",
            "curso": "", "data_compra": "2024-02-20T18:30:00",
            "discord_user_id": null, "status_acesso": "ativo"
        }),
        json!({
            "id": 5, "nome": "Eva Melo", "email": "eva@example.com", "transacao": "HP005",
            "curso": null, "data_compra": "2024-03-05T08:15:00",
            "discord_user_id": null, "status_acesso": null
        }),
    ]
}
