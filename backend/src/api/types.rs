//! REST API types.
//!
//! Employees travel as [`EmployeeDto`] (`email`, `company`, `position`), not
//! as the internal [`Employee`] field names.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ServerError, ValidationError};
use crate::models::{Employee, EmployeePatch, EmploymentStatus, ImportSummary};

/// Employee as exchanged over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub position: String,
    pub salary: f64,
    #[serde(default)]
    pub status: EmploymentStatus,
}

impl From<Employee> for EmployeeDto {
    fn from(employee: Employee) -> Self {
        Self {
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email_address,
            company: employee.company_name,
            position: employee.job_title,
            salary: employee.salary,
            status: employee.status,
        }
    }
}

impl From<EmployeeDto> for Employee {
    fn from(dto: EmployeeDto) -> Self {
        Employee::new(
            dto.first_name.trim(),
            dto.last_name.trim(),
            dto.email.trim(),
            dto.company.trim(),
            dto.position.trim(),
            dto.salary,
        )
        .with_status(dto.status)
    }
}

/// Body of `PUT /api/employees/{email}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub status: Option<EmploymentStatus>,
}

impl From<UpdateEmployeeRequest> for EmployeePatch {
    fn from(request: UpdateEmployeeRequest) -> Self {
        EmployeePatch {
            salary: request.salary,
            job_title: request.position,
            status: request.status,
        }
    }
}

/// Body of `PATCH /api/employees/{email}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// `GET /api/statistics/salary/average` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AverageSalaryQuery {
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageSalaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub average_salary: f64,
}

/// `POST /api/import/feed` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedImportQuery {
    /// Overrides the configured feed URL
    pub url: Option<String>,
}

/// Response sent after an import batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier
    pub job_id: Uuid,

    /// Status: "ready", "warning", "error"
    pub status: &'static str,

    /// File name or feed URL
    pub source: String,

    pub finished_at: DateTime<Utc>,

    pub imported_count: usize,

    /// Per-record errors in source order, or the single batch failure
    pub errors: Vec<String>,

    pub imported_employees: Vec<EmployeeDto>,
}

impl ImportResponse {
    pub fn new(source: impl Into<String>, summary: ImportSummary) -> Self {
        let status = match (summary.is_clean(), summary.imported_count()) {
            (true, _) => "ready",
            (false, 0) => "error",
            (false, _) => "warning",
        };

        Self {
            job_id: Uuid::new_v4(),
            status,
            source: source.into(),
            finished_at: Utc::now(),
            imported_count: summary.imported_count(),
            errors: summary.errors().to_vec(),
            imported_employees: summary
                .imported_employees()
                .iter()
                .cloned()
                .map(EmployeeDto::from)
                .collect(),
        }
    }
}

/// Create an error body
pub fn error_response(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "error": message,
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(ValidationError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation(e) => e.code(),
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let Self::Internal(_) = self {
            tracing::error!("{}", self);
        }
        let body = error_response(self.code(), &self.to_string());
        (self.status_code(), Json(body)).into_response()
    }
}
