//! Domain models for the employee directory.
//!
//! - [`Employee`] - One person's directory entry
//! - [`JobTitle`] - Fixed set of titles with base salary and hierarchy level
//! - [`EmploymentStatus`] - ACTIVE, ON_LEAVE, TERMINATED
//! - [`EmployeePatch`] - Partial update applied in place
//! - [`CompanyStatistics`] - Per-company aggregate snapshot
//! - [`ImportSummary`] - Report returned by one import batch

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::registry::normalize_email;

// =============================================================================
// Job Title
// =============================================================================

/// Job titles known to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobTitle {
    President,
    VicePresident,
    Manager,
    Developer,
    Intern,
}

/// Lower-cased display name -> title, built on first use.
static JOB_TITLES_BY_NAME: Lazy<HashMap<String, JobTitle>> = Lazy::new(|| {
    JobTitle::ALL
        .iter()
        .map(|title| (title.display_name().to_lowercase(), *title))
        .collect()
});

impl JobTitle {
    pub const ALL: [JobTitle; 5] = [
        Self::President,
        Self::VicePresident,
        Self::Manager,
        Self::Developer,
        Self::Intern,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::President => "President",
            Self::VicePresident => "Vice President",
            Self::Manager => "Manager",
            Self::Developer => "Developer",
            Self::Intern => "Intern",
        }
    }

    pub fn base_salary(&self) -> f64 {
        match self {
            Self::President => 25000.0,
            Self::VicePresident => 18000.0,
            Self::Manager => 12000.0,
            Self::Developer => 8000.0,
            Self::Intern => 3000.0,
        }
    }

    /// 1 is the top of the hierarchy.
    pub fn hierarchy_level(&self) -> u8 {
        match self {
            Self::President => 1,
            Self::VicePresident => 2,
            Self::Manager => 3,
            Self::Developer => 4,
            Self::Intern => 5,
        }
    }

    /// Resolve a display name, ignoring case and surrounding whitespace.
    pub fn from_display_name(name: &str) -> Option<Self> {
        JOB_TITLES_BY_NAME.get(&name.trim().to_lowercase()).copied()
    }
}

impl fmt::Display for JobTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Employment Status
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    #[default]
    Active,
    OnLeave,
    Terminated,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 3] = [Self::Active, Self::OnLeave, Self::Terminated];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::OnLeave => "ON_LEAVE",
            Self::Terminated => "TERMINATED",
        }
    }

    /// Parse `ACTIVE`, `on_leave`, `On-Leave`, ...
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|s| s.as_str() == normalized)
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Employee
// =============================================================================

/// A directory entry.
///
/// The email address is the identity of the record: two employees are the same
/// person when their normalized emails match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub company_name: String,
    pub job_title: String,
    pub salary: f64,
    #[serde(default)]
    pub status: EmploymentStatus,
}

impl Employee {
    /// Create an employee with the default (active) status.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email_address: impl Into<String>,
        company_name: impl Into<String>,
        job_title: impl Into<String>,
        salary: f64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_address: email_address.into(),
            company_name: company_name.into(),
            job_title: job_title.into(),
            salary,
            status: EmploymentStatus::default(),
        }
    }

    pub fn with_status(mut self, status: EmploymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Check required fields (in declaration order) and the salary.
    pub fn validate(&self) -> ValidationResult<()> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("emailAddress", &self.email_address),
            ("companyName", &self.company_name),
            ("jobTitle", &self.job_title),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::BlankField { field });
            }
        }
        validate_salary(self.salary)
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email_address)
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.normalized_email() == normalize_email(email)
    }

    pub fn works_for(&self, company: &str) -> bool {
        self.company_name.trim().to_lowercase() == company.trim().to_lowercase()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Resolved job title, when the free-text title is one of the known ones.
    pub fn known_job_title(&self) -> Option<JobTitle> {
        JobTitle::from_display_name(&self.job_title)
    }

    /// Order by last name, then first name.
    pub fn cmp_alphabetical(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
    }

    pub fn cmp_salary(&self, other: &Self) -> Ordering {
        self.salary.total_cmp(&other.salary)
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

pub(crate) fn validate_salary(salary: f64) -> ValidationResult<()> {
    if salary.is_finite() && salary >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeSalary(salary))
    }
}

// =============================================================================
// Patch
// =============================================================================

/// Fields that may change on an existing employee. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub status: Option<EmploymentStatus>,
}

impl EmployeePatch {
    pub fn salary(salary: f64) -> Self {
        Self {
            salary: Some(salary),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(salary) = self.salary {
            validate_salary(salary)?;
        }
        if let Some(title) = &self.job_title {
            if title.trim().is_empty() {
                return Err(ValidationError::BlankField { field: "jobTitle" });
            }
        }
        Ok(())
    }

    /// Apply to `employee`. Call [`EmployeePatch::validate`] first.
    pub(crate) fn apply(&self, employee: &mut Employee) {
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }
        if let Some(title) = &self.job_title {
            employee.job_title = title.trim().to_string();
        }
        if let Some(status) = self.status {
            employee.status = status;
        }
    }
}

// =============================================================================
// Company Statistics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStatistics {
    pub employee_count: usize,
    pub average_salary: f64,
    pub max_salary: f64,
}

impl fmt::Display for CompanyStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Employees: {}, Avg Salary: {:.2}, Max Salary: {:.2}",
            self.employee_count, self.average_salary, self.max_salary
        )
    }
}

// =============================================================================
// Import Summary
// =============================================================================

/// Outcome of one import batch.
///
/// Errors and imported employees are kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    imported_count: usize,
    errors: Vec<String>,
    imported_employees: Vec<Employee>,
}

impl ImportSummary {
    pub fn new(errors: Vec<String>, imported_employees: Vec<Employee>) -> Self {
        Self {
            imported_count: imported_employees.len(),
            errors,
            imported_employees,
        }
    }

    /// A batch that could not start: one error, nothing imported.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new())
    }

    pub fn imported_count(&self) -> usize {
        self.imported_count
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn imported_employees(&self) -> &[Employee] {
        &self.imported_employees
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported: {} records, {} errors",
            self.imported_count,
            self.errors.len()
        )
    }
}
