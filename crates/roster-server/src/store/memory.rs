//! Process-local employee store

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BatchReport, EmployeePage, EmployeeStore, StoreError};
use crate::models::{Employee, NewEmployee};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Employee>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|e| e.email == email && Some(e.id) != except)
    }

    fn insert(&mut self, record: &NewEmployee) -> Employee {
        self.next_id += 1;
        let now = Utc::now();
        let employee = Employee {
            id: self.next_id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            company_name: record.company_name.clone(),
            address: record.address.clone(),
            city: record.city.clone(),
            county: record.county.clone(),
            postal: record.postal.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            web: record.web.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(employee.id, employee.clone());
        employee
    }
}

/// In-memory [`EmployeeStore`] with the same uniqueness rules as the database
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    state: RwLock<State>,
    fail_on_email: Option<String>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any batch containing `email` with a backend error, inserting nothing.
    pub fn fail_on_email(mut self, email: impl Into<String>) -> Self {
        self.fail_on_email = Some(email.into());
        self
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn page(rows: Vec<&Employee>, limit: i64, offset: i64) -> EmployeePage {
        let total = rows.len() as i64;
        let employees = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        EmployeePage { employees, total }
    }
}

fn matches_query(employee: &Employee, needle: &str) -> bool {
    [
        &employee.first_name,
        &employee.last_name,
        &employee.email,
        &employee.company_name,
    ]
    .iter()
    .any(|value| value.to_lowercase().contains(needle))
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn create_one(&self, record: &NewEmployee) -> Result<Employee, StoreError> {
        let mut state = self.state.write().await;
        if state.email_taken(&record.email, None) {
            return Err(StoreError::UniqueViolation {
                email: record.email.clone(),
            });
        }
        Ok(state.insert(record))
    }

    async fn create_batch(&self, records: &[NewEmployee]) -> Result<BatchReport, StoreError> {
        if let Some(ref poison) = self.fail_on_email {
            if records.iter().any(|r| &r.email == poison) {
                return Err(StoreError::Backend(format!(
                    "injected failure for batch containing {poison}"
                )));
            }
        }

        let mut state = self.state.write().await;
        let mut report = BatchReport::default();
        let mut seen = HashSet::new();

        for record in records {
            if state.email_taken(&record.email, None) || !seen.insert(record.email.as_str()) {
                report.duplicates.push(record.email.clone());
                continue;
            }
            state.insert(record);
            report.inserted += 1;
        }

        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Employee, StoreError> {
        self.state
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .rows
            .values()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<EmployeePage, StoreError> {
        let state = self.state.read().await;
        Ok(Self::page(state.rows.values().collect(), limit, offset))
    }

    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<EmployeePage, StoreError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let rows = state
            .rows
            .values()
            .filter(|e| matches_query(e, &needle))
            .collect();
        Ok(Self::page(rows, limit, offset))
    }

    async fn update(&self, id: i64, record: &NewEmployee) -> Result<Employee, StoreError> {
        let mut state = self.state.write().await;
        if !state.rows.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if state.email_taken(&record.email, Some(id)) {
            return Err(StoreError::UniqueViolation {
                email: record.email.clone(),
            });
        }

        let employee = state.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        employee.first_name = record.first_name.clone();
        employee.last_name = record.last_name.clone();
        employee.company_name = record.company_name.clone();
        employee.address = record.address.clone();
        employee.city = record.city.clone();
        employee.county = record.county.clone();
        employee.postal = record.postal.clone();
        employee.phone = record.phone.clone();
        employee.email = record.email.clone();
        employee.web = record.web.clone();
        employee.updated_at = Utc::now();

        Ok(employee.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
