//! Employee record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub postal: String,
    pub phone: String,
    pub email: String,
    pub web: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee attributes without storage-assigned fields
///
/// This is the candidate record produced from a spreadsheet row or an API body.
/// Optional columns are empty strings when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub postal: String,
    pub phone: String,
    pub email: String,
    pub web: String,
}

impl NewEmployee {
    pub fn get(&self, field: EmployeeField) -> &str {
        match field {
            EmployeeField::FirstName => &self.first_name,
            EmployeeField::LastName => &self.last_name,
            EmployeeField::CompanyName => &self.company_name,
            EmployeeField::Address => &self.address,
            EmployeeField::City => &self.city,
            EmployeeField::County => &self.county,
            EmployeeField::Postal => &self.postal,
            EmployeeField::Phone => &self.phone,
            EmployeeField::Email => &self.email,
            EmployeeField::Web => &self.web,
        }
    }

    pub fn set(&mut self, field: EmployeeField, value: String) {
        let slot = match field {
            EmployeeField::FirstName => &mut self.first_name,
            EmployeeField::LastName => &mut self.last_name,
            EmployeeField::CompanyName => &mut self.company_name,
            EmployeeField::Address => &mut self.address,
            EmployeeField::City => &mut self.city,
            EmployeeField::County => &mut self.county,
            EmployeeField::Postal => &mut self.postal,
            EmployeeField::Phone => &mut self.phone,
            EmployeeField::Email => &mut self.email,
            EmployeeField::Web => &mut self.web,
        };
        *slot = value;
    }

    /// Trim surrounding whitespace from every attribute.
    pub fn trimmed(mut self) -> Self {
        for field in EmployeeField::ALL {
            let value = self.get(field).trim().to_string();
            self.set(field, value);
        }
        self
    }
}

impl From<&Employee> for NewEmployee {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            company_name: employee.company_name.clone(),
            address: employee.address.clone(),
            city: employee.city.clone(),
            county: employee.county.clone(),
            postal: employee.postal.clone(),
            phone: employee.phone.clone(),
            email: employee.email.clone(),
            web: employee.web.clone(),
        }
    }
}

/// Partial update of an employee
///
/// `None` leaves the attribute unchanged. `Some("")` clears an optional attribute;
/// on a required attribute it fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub postal: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
}

impl EmployeePatch {
    fn get(&self, field: EmployeeField) -> Option<&String> {
        match field {
            EmployeeField::FirstName => self.first_name.as_ref(),
            EmployeeField::LastName => self.last_name.as_ref(),
            EmployeeField::CompanyName => self.company_name.as_ref(),
            EmployeeField::Address => self.address.as_ref(),
            EmployeeField::City => self.city.as_ref(),
            EmployeeField::County => self.county.as_ref(),
            EmployeeField::Postal => self.postal.as_ref(),
            EmployeeField::Phone => self.phone.as_ref(),
            EmployeeField::Email => self.email.as_ref(),
            EmployeeField::Web => self.web.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EmployeeField::ALL.iter().all(|field| self.get(*field).is_none())
    }

    /// Overlay the provided attributes onto `base`, trimming each value.
    pub fn apply_to(&self, mut base: NewEmployee) -> NewEmployee {
        for field in EmployeeField::ALL {
            if let Some(value) = self.get(field) {
                base.set(field, value.trim().to_string());
            }
        }
        base
    }
}

/// Employee as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub employee: Employee,
    pub full_name: String,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        let full_name = format!("{} {}", employee.first_name, employee.last_name);
        Self {
            employee,
            full_name,
        }
    }
}

/// The fixed column schema of an employee record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeField {
    FirstName,
    LastName,
    CompanyName,
    Address,
    City,
    County,
    Postal,
    Phone,
    Email,
    Web,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 10] = [
        EmployeeField::FirstName,
        EmployeeField::LastName,
        EmployeeField::CompanyName,
        EmployeeField::Address,
        EmployeeField::City,
        EmployeeField::County,
        EmployeeField::Postal,
        EmployeeField::Phone,
        EmployeeField::Email,
        EmployeeField::Web,
    ];

    /// Normalized spreadsheet column name
    pub fn column(self) -> &'static str {
        match self {
            EmployeeField::FirstName => "first_name",
            EmployeeField::LastName => "last_name",
            EmployeeField::CompanyName => "company_name",
            EmployeeField::Address => "address",
            EmployeeField::City => "city",
            EmployeeField::County => "county",
            EmployeeField::Postal => "postal",
            EmployeeField::Phone => "phone",
            EmployeeField::Email => "email",
            EmployeeField::Web => "web",
        }
    }

    /// Name used in validation messages, e.g. `FirstName`
    pub fn label(self) -> &'static str {
        match self {
            EmployeeField::FirstName => "FirstName",
            EmployeeField::LastName => "LastName",
            EmployeeField::CompanyName => "CompanyName",
            EmployeeField::Address => "Address",
            EmployeeField::City => "City",
            EmployeeField::County => "County",
            EmployeeField::Postal => "Postal",
            EmployeeField::Phone => "Phone",
            EmployeeField::Email => "Email",
            EmployeeField::Web => "Web",
        }
    }

    /// Columns a spreadsheet must carry
    pub fn is_required(self) -> bool {
        matches!(
            self,
            EmployeeField::FirstName | EmployeeField::LastName | EmployeeField::Email
        )
    }
}

impl std::fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Employee {
        let now = Utc::now();
        Employee {
            id: 7,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            company_name: "Acme".to_string(),
            address: String::new(),
            city: "Leeds".to_string(),
            county: String::new(),
            postal: String::new(),
            phone: String::new(),
            email: "ann@x.com".to_string(),
            web: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_response_full_name() {
        let response = EmployeeResponse::from(sample());
        assert_eq!(response.full_name, "Ann Lee");
        assert_eq!(response.employee.id, 7);
    }

    #[test]
    fn test_patch_leaves_unset_fields_alone() {
        let patch = EmployeePatch {
            city: Some("  York ".to_string()),
            company_name: Some(String::new()),
            ..Default::default()
        };

        let merged = patch.apply_to(NewEmployee::from(&sample()));
        assert_eq!(merged.city, "York");
        assert_eq!(merged.company_name, "");
        assert_eq!(merged.first_name, "Ann");
        assert_eq!(merged.email, "ann@x.com");
    }

    #[test]
    fn test_empty_patch() {
        assert!(EmployeePatch::default().is_empty());
        let patch = EmployeePatch {
            web: Some("https://x.com".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_trimmed_new_employee() {
        let record = NewEmployee {
            first_name: " Ann ".to_string(),
            email: "ann@x.com\t".to_string(),
            ..Default::default()
        }
        .trimmed();

        assert_eq!(record.first_name, "Ann");
        assert_eq!(record.email, "ann@x.com");
    }

    #[test]
    fn test_required_columns() {
        let required: Vec<_> = EmployeeField::ALL
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.column())
            .collect();
        assert_eq!(required, vec!["first_name", "last_name", "email"]);
    }
}
