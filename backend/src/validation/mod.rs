//! Field-level validation for imported records.
//!
//! Turns the raw field texts of one record into an [`Employee`], or explains
//! why it cannot. Repository-level rules (blank names, duplicate emails) are
//! checked later by [`EmployeeRepository::add`](crate::EmployeeRepository::add).
//!
//! Remote feed elements are shape-checked against an embedded JSON Schema
//! (Draft 7) before their fields are read:
//!
//! - `schemas/feed-employee.json`
//!
//! # Example
//!
//! ```rust
//! use workforce::validation::{employee_from_fields, resolve_job_title};
//! use workforce::JobTitle;
//!
//! assert_eq!(resolve_job_title("vice president").unwrap(), JobTitle::VicePresident);
//!
//! let fields: Vec<String> = ["Jan", "Kowalski", "jan@firma.com", "Firma", "developer", "8000"]
//!     .iter()
//!     .map(|f| f.to_string())
//!     .collect();
//! let employee = employee_from_fields(&fields).unwrap();
//! assert_eq!(employee.job_title, "Developer");
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{RecordErrorKind, ValidationError, ValidationResult};
use crate::models::{validate_salary, Employee, JobTitle};

/// Fields per record: firstName, lastName, email, company, jobTitle, salary.
pub const RECORD_FIELD_COUNT: usize = 6;

static FEED_ITEM_VALIDATOR: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/feed-employee.json"))
        .map_err(|e| format!("invalid embedded schema: {}", e))?;
    jsonschema::draft7::new(&schema).map_err(|e| format!("invalid embedded schema: {}", e))
});

/// Resolve a job title display name (case-insensitive).
pub fn resolve_job_title(text: &str) -> ValidationResult<JobTitle> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::BlankField { field: "jobTitle" });
    }
    JobTitle::from_display_name(text).ok_or_else(|| ValidationError::UnknownJobTitle(text.to_string()))
}

/// Parse a salary: a finite, non-negative number.
pub fn parse_salary(text: &str) -> ValidationResult<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::BlankField { field: "salary" });
    }
    let salary: f64 = text
        .parse()
        .map_err(|_| ValidationError::InvalidSalary(text.to_string()))?;
    if !salary.is_finite() {
        return Err(ValidationError::InvalidSalary(text.to_string()));
    }
    validate_salary(salary)?;
    Ok(salary)
}

/// Build an employee from the six field texts of one record.
///
/// Checks run in order: field count, job title, salary. The job title is
/// stored under its canonical display name.
pub fn employee_from_fields(fields: &[String]) -> Result<Employee, RecordErrorKind> {
    let [first_name, last_name, email, company, job_title, salary] =
        <&[String; RECORD_FIELD_COUNT]>::try_from(fields)
            .map_err(|_| RecordErrorKind::WrongFieldCount(fields.len()))?;

    let title = resolve_job_title(job_title)?;
    let salary = parse_salary(salary)?;

    Ok(Employee::new(
        first_name.trim(),
        last_name.trim(),
        email.trim(),
        company.trim(),
        title.display_name(),
        salary,
    ))
}

/// Validate one feed element against the embedded schema.
///
/// Returns every violation found.
pub fn validate_feed_item(item: &Value) -> Result<(), Vec<String>> {
    let validator = FEED_ITEM_VALIDATOR.as_ref().map_err(|e| vec![e.clone()])?;

    let errors: Vec<String> = validator.iter_errors(item).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against the feed element schema.
pub fn is_valid_feed_item(item: &Value) -> bool {
    validate_feed_item(item).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_resolve_job_title() {
        assert_eq!(resolve_job_title(" manager ").unwrap(), JobTitle::Manager);
        assert_eq!(
            resolve_job_title("CEO").unwrap_err(),
            ValidationError::UnknownJobTitle("CEO".into())
        );
        assert_eq!(
            resolve_job_title("  ").unwrap_err(),
            ValidationError::BlankField { field: "jobTitle" }
        );
    }

    #[test]
    fn test_parse_salary() {
        assert_eq!(parse_salary("8000").unwrap(), 8000.0);
        assert_eq!(parse_salary(" 1234.5 ").unwrap(), 1234.5);
        assert_eq!(parse_salary("0").unwrap(), 0.0);
        assert_eq!(
            parse_salary("abc").unwrap_err(),
            ValidationError::InvalidSalary("abc".into())
        );
        assert_eq!(
            parse_salary("-100").unwrap_err(),
            ValidationError::NegativeSalary(-100.0)
        );
        assert_eq!(
            parse_salary("inf").unwrap_err(),
            ValidationError::InvalidSalary("inf".into())
        );
        assert_eq!(parse_salary("").unwrap_err().code(), "blank_field");
    }

    #[test]
    fn test_employee_from_fields() {
        let employee = employee_from_fields(&fields(&[
            "Jan",
            "Kowalski",
            "jan@firma.com",
            "Firma",
            "VICE PRESIDENT",
            "18000",
        ]))
        .unwrap();
        assert_eq!(employee.job_title, "Vice President");
        assert_eq!(employee.salary, 18000.0);
        assert_eq!(employee.known_job_title(), Some(JobTitle::VicePresident));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = employee_from_fields(&fields(&["Jan", "Kowalski", "jan@firma.com", "Firma", "Developer"]))
            .unwrap_err();
        assert_eq!(err, RecordErrorKind::WrongFieldCount(5));

        let err = employee_from_fields(&fields(&["a", "b", "c", "d", "Intern", "1", "extra"])).unwrap_err();
        assert_eq!(err, RecordErrorKind::WrongFieldCount(7));
    }

    #[test]
    fn test_job_title_checked_before_salary() {
        let err = employee_from_fields(&fields(&["Jan", "K", "jan@x.pl", "X", "CEO", "abc"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown job title 'CEO'");
    }

    #[test]
    fn test_valid_feed_item() {
        let item = json!({
            "name": "Leanne Graham",
            "email": "Sincere@april.biz",
            "company": { "name": "Romaguera-Crona", "catchPhrase": "ignored" },
            "phone": "1-770-736-8031"
        });
        assert!(is_valid_feed_item(&item));
    }

    #[test]
    fn test_invalid_feed_items() {
        assert!(!is_valid_feed_item(&json!({ "name": "A B", "email": "a@b.c" })));
        assert!(!is_valid_feed_item(&json!({ "name": 1, "email": "a@b.c", "company": { "name": "X" } })));
        assert!(!is_valid_feed_item(&json!({ "name": "A B", "email": "a@b.c", "company": "X" })));
        assert!(!is_valid_feed_item(&json!("just a string")));

        let errors = validate_feed_item(&json!({})).unwrap_err();
        assert!(!errors.is_empty());
    }
}
