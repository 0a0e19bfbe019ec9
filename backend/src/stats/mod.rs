//! Read-side aggregations over a repository snapshot.
//!
//! Employees are grouped by company in a single pass, in the same way
//! [`EmployeeRepository::find_by_company`] matches companies: case-insensitive,
//! keyed by the first spelling encountered.
//!
//! ```text
//! Employees (insertion order)          →  per_company()
//! ┌──────────────────────────────┐       ┌─────────────────────────────────┐
//! │ FirmaA  8000                 │       │ FirmaA  count 2  avg 10000      │
//! │ FirmaB  8000                 │  →    │         max 12000               │
//! │ firmaa 12000                 │       ├─────────────────────────────────┤
//! └──────────────────────────────┘       │ FirmaB  count 1  avg 8000  ...  │
//!                                        └─────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::models::{CompanyStatistics, Employee};
use crate::repository::{average, EmployeeRepository};

/// Pure computations over a borrowed set of employees.
pub struct StatisticsAggregator<'a> {
    employees: Vec<&'a Employee>,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(employees: impl IntoIterator<Item = &'a Employee>) -> Self {
        Self {
            employees: employees.into_iter().collect(),
        }
    }

    pub fn from_repository(repository: &'a EmployeeRepository) -> Self {
        Self::new(repository.iter())
    }

    /// Count, average salary and max salary for every company present.
    pub fn per_company(&self) -> BTreeMap<String, CompanyStatistics> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, CompanyAccumulator> = HashMap::new();

        for employee in &self.employees {
            let key = company_key(&employee.company_name);
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    CompanyAccumulator::new(&employee.company_name)
                })
                .add(employee.salary);
        }

        order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .map(CompanyAccumulator::build)
            .collect()
    }

    /// Statistics for one company, `None` if it has no employees.
    pub fn for_company(&self, company: &str) -> Option<CompanyStatistics> {
        let key = company_key(company);
        let mut acc: Option<CompanyAccumulator> = None;
        for employee in self.employees.iter().filter(|e| company_key(&e.company_name) == key) {
            acc.get_or_insert_with(|| CompanyAccumulator::new(&employee.company_name))
                .add(employee.salary);
        }
        acc.map(|a| a.build().1)
    }

    /// Average salary overall, or for one company when given. `0.0` when empty.
    pub fn average_salary(&self, company: Option<&str>) -> f64 {
        match company.map(str::trim).filter(|c| !c.is_empty()) {
            Some(company) => average(
                self.employees
                    .iter()
                    .filter(|e| e.works_for(company))
                    .map(|e| e.salary),
            ),
            None => average(self.employees.iter().map(|e| e.salary)),
        }
    }
}

fn company_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Running totals for one company.
struct CompanyAccumulator {
    name: String,
    count: usize,
    total: f64,
    max: f64,
}

impl CompanyAccumulator {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            total: 0.0,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, salary: f64) {
        self.count += 1;
        self.total += salary;
        self.max = self.max.max(salary);
    }

    fn build(self) -> (String, CompanyStatistics) {
        let stats = CompanyStatistics {
            employee_count: self.count,
            average_salary: self.total / self.count as f64,
            max_salary: self.max,
        };
        (self.name, stats)
    }
}
