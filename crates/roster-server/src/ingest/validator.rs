//! Record validator
//!
//! Stateless constraint checks over a candidate [`NewEmployee`]. Every violated
//! constraint is reported, so a spreadsheet row or API body can be fixed in one pass.
//!
//! | Field | Required | Length (chars) | Format |
//! |-------|----------|----------------|--------|
//! | first_name, last_name | yes | 2..=50 | |
//! | email | yes | ..=255 | email |
//! | company_name | | ..=100 | |
//! | address | | ..=255 | |
//! | city, county | | ..=50 | |
//! | postal, phone | | ..=20 | |
//! | web | | | URL |
//!
//! An empty required field reports only that it is required; an empty optional
//! field is never checked further.

use serde::{Deserialize, Serialize};

use crate::models::{EmployeeField, NewEmployee};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Plain,
    Email,
    Url,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    field: EmployeeField,
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
    format: Format,
}

#[rustfmt::skip]
const RULES: [Rule; 10] = [
    Rule { field: EmployeeField::FirstName, required: true, min: Some(2), max: Some(50), format: Format::Plain },
    Rule { field: EmployeeField::LastName, required: true, min: Some(2), max: Some(50), format: Format::Plain },
    Rule { field: EmployeeField::CompanyName, required: false, min: None, max: Some(100), format: Format::Plain },
    Rule { field: EmployeeField::Address, required: false, min: None, max: Some(255), format: Format::Plain },
    Rule { field: EmployeeField::City, required: false, min: None, max: Some(50), format: Format::Plain },
    Rule { field: EmployeeField::County, required: false, min: None, max: Some(50), format: Format::Plain },
    Rule { field: EmployeeField::Postal, required: false, min: None, max: Some(20), format: Format::Plain },
    Rule { field: EmployeeField::Phone, required: false, min: None, max: Some(20), format: Format::Plain },
    Rule { field: EmployeeField::Email, required: true, min: None, max: Some(255), format: Format::Email },
    Rule { field: EmployeeField::Web, required: false, min: None, max: None, format: Format::Url },
];

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Required(EmployeeField),
    TooShort { field: EmployeeField, min: usize },
    TooLong { field: EmployeeField, max: usize },
    InvalidEmail(EmployeeField),
    InvalidUrl(EmployeeField),
}

impl Violation {
    pub fn field(&self) -> EmployeeField {
        match self {
            Violation::Required(field)
            | Violation::InvalidEmail(field)
            | Violation::InvalidUrl(field) => *field,
            Violation::TooShort { field, .. } | Violation::TooLong { field, .. } => *field,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Required(field) => write!(f, "{field} is required"),
            Violation::TooShort { field, min } => {
                write!(f, "{field} must be at least {min} characters")
            },
            Violation::TooLong { field, max } => {
                write!(f, "{field} must not exceed {max} characters")
            },
            Violation::InvalidEmail(_) => f.write_str("Invalid email format"),
            Violation::InvalidUrl(_) => f.write_str("Invalid URL format"),
        }
    }
}

/// Field-level error as serialized in API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&Violation> for FieldError {
    fn from(violation: &Violation) -> Self {
        Self {
            field: violation.field().label().to_string(),
            message: violation.to_string(),
        }
    }
}

/// Check `record` against every rule and return all violations in field order.
pub fn validate_record(record: &NewEmployee) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in RULES {
        let value = record.get(rule.field);

        if value.is_empty() {
            if rule.required {
                violations.push(Violation::Required(rule.field));
            }
            continue;
        }

        let length = value.chars().count();
        if let Some(min) = rule.min {
            if length < min {
                violations.push(Violation::TooShort { field: rule.field, min });
            }
        }
        if let Some(max) = rule.max {
            if length > max {
                violations.push(Violation::TooLong { field: rule.field, max });
            }
        }

        match rule.format {
            Format::Plain => {},
            Format::Email if !is_valid_email(value) => {
                violations.push(Violation::InvalidEmail(rule.field));
            },
            Format::Url if !is_valid_url(value) => {
                violations.push(Violation::InvalidUrl(rule.field));
            },
            Format::Email | Format::Url => {},
        }
    }

    violations
}

const LOCAL_PART_SPECIALS: &str = ".!#$%&'*+/=?^_`{|}~-";

/// Structural email check: `local@domain.tld` with RFC 5322 atom characters
/// in the local part and hostname labels in the domain.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.len() > 64
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(c))
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || domain.len() > 253 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Absolute URL with a host, e.g. `https://example.com/about`.
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| parsed.has_host())
        .unwrap_or(false)
}
