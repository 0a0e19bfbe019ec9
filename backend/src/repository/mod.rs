//! In-memory employee repository.
//!
//! [`EmployeeRepository`] owns the employee collection together with its
//! [`EmailRegistry`]. Every insertion goes through [`EmployeeRepository::add`],
//! which is the only place the email uniqueness invariant is enforced; removal
//! updates the collection and the registry together.
//!
//! Query methods hand out owned copies, so callers can never reach into the
//! backing collection.
//!
//! # Example
//!
//! ```rust
//! use workforce::{Employee, EmployeeRepository};
//!
//! let mut repository = EmployeeRepository::new();
//! repository
//!     .add(Employee::new("Jan", "Kowalski", "jan@firma.com", "Firma", "Developer", 8000.0))
//!     .unwrap();
//!
//! assert!(repository.find_by_email("JAN@firma.com").is_some());
//! assert!(repository.add(Employee::new("J", "K", "jan@FIRMA.com", "Firma", "Intern", 3000.0)).is_err());
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{ValidationError, ValidationResult};
use crate::models::{Employee, EmployeePatch, EmploymentStatus};
use crate::registry::EmailRegistry;

#[derive(Debug, Default)]
pub struct EmployeeRepository {
    employees: Vec<Employee>,
    emails: EmailRegistry,
}

impl EmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from seed records, each going through [`Self::add`].
    ///
    /// Fails on the first rejected record.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> ValidationResult<Self> {
        let mut repository = Self::new();
        for employee in employees {
            repository.add(employee)?;
        }
        Ok(repository)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validate and insert a new employee.
    ///
    /// Rejects blank required fields, an invalid salary and emails already in
    /// use (case-insensitive). Nothing is changed when an error is returned.
    pub fn add(&mut self, employee: Employee) -> ValidationResult<&Employee> {
        employee.validate()?;

        if self.emails.contains(&employee.email_address) {
            return Err(ValidationError::DuplicateEmail(
                employee.email_address.trim().to_string(),
            ));
        }

        self.emails.add(&employee.email_address);
        debug!(email = %employee.email_address, name = %employee, "employee added");
        self.employees.push(employee);

        // just pushed
        Ok(&self.employees[self.employees.len() - 1])
    }

    /// Apply `patch` to the employee with this email.
    ///
    /// `Ok(None)` when nobody has the email. An invalid patch is rejected
    /// before anything changes.
    pub fn update(&mut self, email: &str, patch: &EmployeePatch) -> ValidationResult<Option<Employee>> {
        patch.validate()?;

        match self.position(email) {
            Some(index) => {
                let employee = &mut self.employees[index];
                patch.apply(employee);
                debug!(email = %employee.email_address, "employee updated");
                Ok(Some(employee.clone()))
            }
            None => {
                warn!(email, "no employee to update");
                Ok(None)
            }
        }
    }

    /// Change only the employment status.
    pub fn update_status(&mut self, email: &str, status: EmploymentStatus) -> Option<Employee> {
        let index = self.position(email)?;
        let employee = &mut self.employees[index];
        employee.status = status;
        debug!(email = %employee.email_address, %status, "employee status updated");
        Some(employee.clone())
    }

    /// Remove the employee and release its email. Returns whether anything was removed.
    pub fn remove_by_email(&mut self, email: &str) -> bool {
        match self.position(email) {
            Some(index) => {
                let removed = self.employees.remove(index);
                self.emails.remove(&removed.email_address);
                debug!(email = %removed.email_address, "employee removed");
                true
            }
            None => {
                warn!(email, "no employee to remove");
                false
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn find_by_email(&self, email: &str) -> Option<Employee> {
        self.position(email).map(|index| self.employees[index].clone())
    }

    /// Every employee, in insertion order.
    pub fn list_all(&self) -> Vec<Employee> {
        self.employees.clone()
    }

    /// Employees of a company (case-insensitive exact match), in insertion order.
    pub fn find_by_company(&self, company: &str) -> Vec<Employee> {
        self.employees
            .iter()
            .filter(|e| e.works_for(company))
            .cloned()
            .collect()
    }

    pub fn find_by_status(&self, status: EmploymentStatus) -> Vec<Employee> {
        self.employees
            .iter()
            .filter(|e| e.status == status)
            .cloned()
            .collect()
    }

    /// Copy of the directory sorted by last name, then first name.
    pub fn sorted_alphabetically(&self) -> Vec<Employee> {
        let mut employees = self.employees.clone();
        employees.sort_by(Employee::cmp_alphabetical);
        employees
    }

    pub fn group_by_job_title(&self) -> BTreeMap<String, Vec<Employee>> {
        let mut groups: BTreeMap<String, Vec<Employee>> = BTreeMap::new();
        for employee in &self.employees {
            groups
                .entry(employee.job_title.clone())
                .or_default()
                .push(employee.clone());
        }
        groups
    }

    pub fn count_by_job_title(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for employee in &self.employees {
            *counts.entry(employee.job_title.clone()).or_default() += 1;
        }
        counts
    }

    /// Mean salary, `0.0` for an empty repository.
    pub fn average_salary(&self) -> f64 {
        average(self.employees.iter().map(|e| e.salary))
    }

    /// Best paid employee; the first one encountered wins a tie.
    pub fn highest_paid(&self) -> Option<Employee> {
        highest_paid(self.employees.iter()).cloned()
    }

    /// Number of employees per status. Every status is present, even at zero.
    pub fn status_counts(&self) -> BTreeMap<EmploymentStatus, usize> {
        let mut counts: BTreeMap<EmploymentStatus, usize> =
            EmploymentStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for employee in &self.employees {
            *counts.entry(employee.status).or_default() += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Number of emails in the registry. Always equal to [`Self::len`].
    pub fn registered_emails(&self) -> usize {
        self.emails.size()
    }

    /// Whether the email is already taken.
    pub fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    /// Read-only view for aggregations.
    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter()
    }

    fn position(&self, email: &str) -> Option<usize> {
        if !self.emails.contains(email) {
            return None;
        }
        self.employees.iter().position(|e| e.has_email(email))
    }
}

/// Mean of the values, `0.0` when there are none.
pub(crate) fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn highest_paid<'a>(employees: impl Iterator<Item = &'a Employee>) -> Option<&'a Employee> {
    employees.fold(None, |best: Option<&Employee>, e| match best {
        Some(b) if b.cmp_salary(e) != Ordering::Less => Some(b),
        _ => Some(e),
    })
}
