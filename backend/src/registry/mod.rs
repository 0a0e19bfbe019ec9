//! Email registry - case-insensitive set of the emails in use.
//!
//! An [`EmailRegistry`] belongs to exactly one
//! [`EmployeeRepository`](crate::repository::EmployeeRepository), which keeps
//! it in step with its record collection.

use std::collections::HashSet;

/// Trim and lower-case an email so it can be used as a uniqueness key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct EmailRegistry {
    emails: HashSet<String>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the email was not registered yet.
    pub fn add(&mut self, email: &str) -> bool {
        self.emails.insert(normalize_email(email))
    }

    /// Returns `true` if the email was registered.
    pub fn remove(&mut self, email: &str) -> bool {
        self.emails.remove(&normalize_email(email))
    }

    /// Blank input is never registered.
    pub fn contains(&self, email: &str) -> bool {
        let key = normalize_email(email);
        !key.is_empty() && self.emails.contains(&key)
    }

    pub fn size(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn clear(&mut self) {
        self.emails.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_case_insensitive() {
        let mut registry = EmailRegistry::new();
        assert!(registry.add("Jan@Firma.com"));
        assert!(!registry.add("jan@firma.com"));
        assert!(!registry.add("  JAN@FIRMA.COM  "));
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_contains_normalizes() {
        let mut registry = EmailRegistry::new();
        registry.add("anna@firma.com");
        assert!(registry.contains("ANNA@firma.com"));
        assert!(registry.contains(" anna@firma.com"));
        assert!(!registry.contains("jan@firma.com"));
    }

    #[test]
    fn test_contains_blank_is_false() {
        let mut registry = EmailRegistry::new();
        registry.add("   ");
        assert!(!registry.contains(""));
        assert!(!registry.contains("   "));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = EmailRegistry::new();
        registry.add("jan@firma.com");
        assert!(registry.remove("JAN@firma.com"));
        assert!(!registry.remove("jan@firma.com"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut registry = EmailRegistry::new();
        registry.add("a@x.pl");
        registry.add("b@x.pl");
        registry.clear();
        assert_eq!(registry.size(), 0);
        assert!(!registry.contains("a@x.pl"));
    }
}
