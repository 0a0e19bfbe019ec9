//! HTTP server for the employee directory.
//!
//! # API Endpoints
//!
//! | Method | Path                                  | Description                         |
//! |--------|---------------------------------------|-------------------------------------|
//! | GET    | `/health`                             | Health check                        |
//! | GET    | `/api/employees`                      | List all employees                  |
//! | POST   | `/api/employees`                      | Add an employee                     |
//! | GET    | `/api/employees/{email}`              | Find by email                       |
//! | PUT    | `/api/employees/{email}`              | Update salary / position / status   |
//! | DELETE | `/api/employees/{email}`              | Remove an employee                  |
//! | PATCH  | `/api/employees/{email}/status`       | Change employment status            |
//! | GET    | `/api/employees/status/{status}`      | Employees with a status             |
//! | GET    | `/api/employees/company/{company}`    | Employees of a company              |
//! | GET    | `/api/statistics/salary/average`      | Average salary (`?company=`)        |
//! | GET    | `/api/statistics/companies`           | Per-company statistics              |
//! | GET    | `/api/statistics/company/{name}`      | Statistics of one company           |
//! | GET    | `/api/statistics/positions`           | Head count per job title            |
//! | GET    | `/api/statistics/status`              | Head count per status               |
//! | POST   | `/api/import/csv`                     | Import an uploaded delimited file   |
//! | POST   | `/api/import/xml`                     | Import an uploaded markup file      |
//! | POST   | `/api/import/feed`                    | Import the remote feed (`?url=`)    |
//! | GET    | `/api/logs`                           | SSE stream of import logs           |

use std::collections::BTreeMap;
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, patch, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::logs::LOG_BROADCASTER;
use super::types::{
    AverageSalaryQuery, AverageSalaryResponse, EmployeeDto, FeedImportQuery, ImportResponse,
    StatusUpdateRequest, UpdateEmployeeRequest,
};
use crate::error::{ServerError, ServerResult};
use crate::import::{FeedClient, ImportOptions, ImportPipeline};
use crate::models::{CompanyStatistics, Employee, EmployeePatch, EmploymentStatus};
use crate::repository::EmployeeRepository;
use crate::stats::StatisticsAggregator;

/// Shared state of all handlers.
///
/// The repository sits behind one reader/writer lock: queries read, mutations
/// and whole import batches write.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<RwLock<EmployeeRepository>>,
    pub options: ImportOptions,
    pub feed: Option<FeedClient>,
}

impl AppState {
    pub fn new(repository: EmployeeRepository) -> Self {
        Self {
            repository: Arc::new(RwLock::new(repository)),
            options: ImportOptions::default(),
            feed: None,
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_feed(mut self, feed: Option<FeedClient>) -> Self {
        self.feed = feed;
        self
    }
}

/// Build the router with every endpoint.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::LOCATION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/{email}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/api/employees/{email}/status", patch(update_status))
        .route("/api/employees/status/{status}", get(employees_by_status))
        .route("/api/employees/company/{company}", get(employees_by_company))
        .route("/api/statistics/salary/average", get(average_salary))
        .route("/api/statistics/companies", get(company_statistics))
        .route("/api/statistics/company/{name}", get(single_company_statistics))
        .route("/api/statistics/positions", get(position_counts))
        .route("/api/statistics/status", get(status_counts))
        .route("/api/import/csv", post(import_csv))
        .route("/api/import/xml", post(import_xml))
        .route("/api/import/feed", post(import_feed))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "workforce server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let employees = state.repository.read().await.len();
    Json(json!({
        "status": "ok",
        "service": "workforce",
        "version": env!("CARGO_PKG_VERSION"),
        "employees": employees,
    }))
}

// =============================================================================
// Employees
// =============================================================================

async fn list_employees(State(state): State<AppState>) -> Json<Vec<EmployeeDto>> {
    Json(to_dtos(state.repository.read().await.list_all()))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(dto): Json<EmployeeDto>,
) -> ServerResult<Response> {
    let mut repository = state.repository.write().await;
    let created = EmployeeDto::from(repository.add(Employee::from(dto))?.clone());

    let location = HeaderValue::from_str(&format!("/api/employees/{}", created.email))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

async fn get_employee(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ServerResult<Json<EmployeeDto>> {
    state
        .repository
        .read()
        .await
        .find_by_email(&email)
        .map(|e| Json(e.into()))
        .ok_or(ServerError::NotFound(email))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> ServerResult<Json<EmployeeDto>> {
    let patch = EmployeePatch::from(request);
    state
        .repository
        .write()
        .await
        .update(&email, &patch)?
        .map(|e| Json(e.into()))
        .ok_or(ServerError::NotFound(email))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ServerResult<StatusCode> {
    if state.repository.write().await.remove_by_email(&email) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(email))
    }
}

async fn update_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> ServerResult<Json<EmployeeDto>> {
    let status = parse_status(&request.status)?;
    state
        .repository
        .write()
        .await
        .update_status(&email, status)
        .map(|e| Json(e.into()))
        .ok_or(ServerError::NotFound(email))
}

async fn employees_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ServerResult<Json<Vec<EmployeeDto>>> {
    let status = parse_status(&status)?;
    Ok(Json(to_dtos(state.repository.read().await.find_by_status(status))))
}

async fn employees_by_company(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> Json<Vec<EmployeeDto>> {
    Json(to_dtos(state.repository.read().await.find_by_company(&company)))
}

// =============================================================================
// Statistics
// =============================================================================

async fn average_salary(
    State(state): State<AppState>,
    Query(query): Query<AverageSalaryQuery>,
) -> Json<AverageSalaryResponse> {
    let repository = state.repository.read().await;
    let company = query.company.filter(|c| !c.trim().is_empty());
    let average_salary = StatisticsAggregator::from_repository(&repository).average_salary(company.as_deref());
    Json(AverageSalaryResponse {
        company,
        average_salary,
    })
}

async fn company_statistics(State(state): State<AppState>) -> Json<BTreeMap<String, CompanyStatistics>> {
    let repository = state.repository.read().await;
    Json(StatisticsAggregator::from_repository(&repository).per_company())
}

async fn single_company_statistics(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Json<CompanyStatistics>> {
    let repository = state.repository.read().await;
    StatisticsAggregator::from_repository(&repository)
        .for_company(&name)
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("company '{}'", name)))
}

async fn position_counts(State(state): State<AppState>) -> Json<BTreeMap<String, usize>> {
    Json(state.repository.read().await.count_by_job_title())
}

async fn status_counts(State(state): State<AppState>) -> Json<BTreeMap<EmploymentStatus, usize>> {
    Json(state.repository.read().await.status_counts())
}

// =============================================================================
// Import
// =============================================================================

async fn import_csv(State(state): State<AppState>, multipart: Multipart) -> ServerResult<Json<ImportResponse>> {
    let (name, bytes) = read_upload(multipart).await?;
    info!(file = %name, bytes = bytes.len(), "delimited upload received");

    let mut repository = state.repository.write().await;
    let summary = ImportPipeline::with_options(&mut repository, state.options.clone())
        .import_csv_bytes(&name, &bytes);
    Ok(Json(ImportResponse::new(name, summary)))
}

async fn import_xml(State(state): State<AppState>, multipart: Multipart) -> ServerResult<Json<ImportResponse>> {
    let (name, bytes) = read_upload(multipart).await?;
    info!(file = %name, bytes = bytes.len(), "markup upload received");

    let mut repository = state.repository.write().await;
    let summary = ImportPipeline::with_options(&mut repository, state.options.clone())
        .import_xml_bytes(&name, &bytes);
    Ok(Json(ImportResponse::new(name, summary)))
}

async fn import_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedImportQuery>,
) -> ServerResult<Json<ImportResponse>> {
    let client = match (query.url, &state.feed) {
        (Some(url), Some(configured)) => FeedClient::new(url).with_timeout(configured.timeout()),
        (Some(url), None) => FeedClient::new(url),
        (None, Some(configured)) => configured.clone(),
        (None, None) => {
            return Err(ServerError::BadRequest("no feed URL configured".to_string()));
        }
    };

    // fetch before taking the write lock
    let fetched = client.fetch().await;

    let mut repository = state.repository.write().await;
    let summary = ImportPipeline::with_options(&mut repository, state.options.clone())
        .import_fetched(client.url(), fetched);
    Ok(Json(ImportResponse::new(client.url(), summary)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Helpers
// =============================================================================

/// Read the `file` field of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> ServerResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("read error: {}", e)))?;
            return Ok((name, bytes.to_vec()));
        }
    }

    Err(ServerError::BadRequest("no file provided".to_string()))
}

fn parse_status(value: &str) -> ServerResult<EmploymentStatus> {
    EmploymentStatus::parse(value)
        .ok_or_else(|| ServerError::BadRequest(format!("unknown status '{}'", value)))
}

fn to_dtos(employees: Vec<Employee>) -> Vec<EmployeeDto> {
    employees.into_iter().map(EmployeeDto::from).collect()
}
