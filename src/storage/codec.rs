//! Line codec for the project store.
//!
//! A project is one line of `|`-separated fields laid out by [`SCHEMA`]. Free
//! text is written as-is: values holding the delimiter or a line break are
//! rejected rather than escaped.

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::{party::Party, project::Project},
    report::{format_date, format_decimal},
};

pub const DELIMITER: char = '|';
pub const FIELD_COUNT: usize = 24;

#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("Expected {expected} fields but found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Field '{field}' is not a whole number: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("Field '{field}' is not a decimal number: '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("Field '{field}' is not a dd/mm/yyyy date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("Field '{field}' contains a reserved character (the '|' delimiter or a line break)")]
    ReservedCharacter { field: &'static str },
}

#[derive(Clone, Copy)]
enum Slot {
    Architect,
    Contractor,
    Customer,
}

impl Slot {
    fn party(self, project: &Project) -> &Party {
        match self {
            Slot::Architect => &project.architect,
            Slot::Contractor => &project.contractor,
            Slot::Customer => &project.customer,
        }
    }

    fn party_mut(self, project: &mut Project) -> &mut Party {
        match self {
            Slot::Architect => &mut project.architect,
            Slot::Contractor => &mut project.contractor,
            Slot::Customer => &mut project.customer,
        }
    }
}

#[derive(Clone, Copy)]
enum PartyField {
    Role,
    Name,
    Phone,
    Email,
    Address,
}

impl PartyField {
    fn get(self, party: &Party) -> &String {
        match self {
            PartyField::Role => &party.role,
            PartyField::Name => &party.name,
            PartyField::Phone => &party.phone_number,
            PartyField::Email => &party.email_address,
            PartyField::Address => &party.postal_address,
        }
    }

    fn get_mut(self, party: &mut Party) -> &mut String {
        match self {
            PartyField::Role => &mut party.role,
            PartyField::Name => &mut party.name,
            PartyField::Phone => &mut party.phone_number,
            PartyField::Email => &mut party.email_address,
            PartyField::Address => &mut party.postal_address,
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    JobNumber,
    JobName,
    BuildType,
    SiteAddress,
    ErfNumber,
    TotalFee,
    TotalPaid,
    Deadline,
    Party(Slot, PartyField),
    Completed,
}

/// One named column of the store line.
#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    kind: Kind,
}

const fn column(name: &'static str, kind: Kind) -> Column {
    Column { name, kind }
}

/// Column order of a store line. Reordering fields is a change to this table only.
pub const SCHEMA: [Column; FIELD_COUNT] = [
    column("job_number", Kind::JobNumber),
    column("job_name", Kind::JobName),
    column("build_type", Kind::BuildType),
    column("site_address", Kind::SiteAddress),
    column("erf_number", Kind::ErfNumber),
    column("total_fee", Kind::TotalFee),
    column("total_paid", Kind::TotalPaid),
    column("deadline", Kind::Deadline),
    column("architect.role", Kind::Party(Slot::Architect, PartyField::Role)),
    column("architect.name", Kind::Party(Slot::Architect, PartyField::Name)),
    column("architect.phone", Kind::Party(Slot::Architect, PartyField::Phone)),
    column("architect.email", Kind::Party(Slot::Architect, PartyField::Email)),
    column("architect.address", Kind::Party(Slot::Architect, PartyField::Address)),
    column("contractor.role", Kind::Party(Slot::Contractor, PartyField::Role)),
    column("contractor.name", Kind::Party(Slot::Contractor, PartyField::Name)),
    column("contractor.phone", Kind::Party(Slot::Contractor, PartyField::Phone)),
    column("contractor.email", Kind::Party(Slot::Contractor, PartyField::Email)),
    column("contractor.address", Kind::Party(Slot::Contractor, PartyField::Address)),
    column("customer.role", Kind::Party(Slot::Customer, PartyField::Role)),
    column("customer.name", Kind::Party(Slot::Customer, PartyField::Name)),
    column("customer.phone", Kind::Party(Slot::Customer, PartyField::Phone)),
    column("customer.email", Kind::Party(Slot::Customer, PartyField::Email)),
    column("customer.address", Kind::Party(Slot::Customer, PartyField::Address)),
    column("completed", Kind::Completed),
];

impl Column {
    /// Free-text value of this column, `None` for typed columns.
    fn text<'a>(&self, project: &'a Project) -> Option<&'a str> {
        match self.kind {
            Kind::JobName => Some(project.job_name.as_str()),
            Kind::BuildType => Some(project.build_type.as_str()),
            Kind::SiteAddress => Some(project.site_address.as_str()),
            Kind::Party(slot, field) => Some(field.get(slot.party(project)).as_str()),
            _ => None,
        }
    }

    /// Decimal value of this column, `None` for other columns.
    fn decimal(&self, project: &Project) -> Option<f64> {
        match self.kind {
            Kind::TotalFee => Some(project.total_fee),
            Kind::TotalPaid => Some(project.total_paid),
            _ => None,
        }
    }

    pub fn encode(&self, project: &Project) -> String {
        match self.kind {
            Kind::JobNumber => project.job_number.to_string(),
            Kind::ErfNumber => project.erf_number.to_string(),
            Kind::TotalFee => format_decimal(project.total_fee),
            Kind::TotalPaid => format_decimal(project.total_paid),
            Kind::Deadline => format_date(project.deadline),
            Kind::Completed => project.completed.to_string(),
            _ => self.text(project).unwrap_or_default().to_string(),
        }
    }

    pub fn decode(&self, raw: &str, project: &mut Project) -> Result<(), FormatError> {
        match self.kind {
            Kind::JobNumber => project.job_number = self.parse_integer(raw)?,
            Kind::JobName => project.job_name = raw.to_string(),
            Kind::BuildType => project.build_type = raw.to_string(),
            Kind::SiteAddress => project.site_address = raw.to_string(),
            Kind::ErfNumber => project.erf_number = self.parse_integer(raw)?,
            Kind::TotalFee => project.total_fee = self.parse_decimal(raw)?,
            Kind::TotalPaid => project.total_paid = self.parse_decimal(raw)?,
            Kind::Deadline => {
                project.deadline = parse_date(raw).ok_or_else(|| FormatError::InvalidDate {
                    field: self.name,
                    value: raw.to_string(),
                })?
            }
            Kind::Party(slot, field) => *field.get_mut(slot.party_mut(project)) = raw.to_string(),
            Kind::Completed => project.completed = raw == "true",
        }
        Ok(())
    }

    fn parse_integer(&self, raw: &str) -> Result<u32, FormatError> {
        // Digits only: a sign would not survive being written back.
        let digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
        digits
            .then(|| raw.parse().ok())
            .flatten()
            .ok_or_else(|| FormatError::InvalidInteger {
                field: self.name,
                value: raw.to_string(),
            })
    }

    fn parse_decimal(&self, raw: &str) -> Result<f64, FormatError> {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| FormatError::InvalidDecimal {
                field: self.name,
                value: raw.to_string(),
            })
    }
}

/// Parse a strict `dd/mm/yyyy` date naming a real calendar day.
pub fn parse_date(raw: &str) -> Option<Date> {
    let mut parts = raw.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(day, 2) || !all_digits(month, 2) || !all_digits(year, 4) {
        return None;
    }

    Date::new(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?).ok()
}

/// Whether a value can be stored in a free-text column.
pub fn is_storable_text(value: &str) -> bool {
    !value.contains([DELIMITER, '\n', '\r'])
}

/// Check a decimal destined for the `field` column.
pub fn check_decimal(field: &'static str, value: f64) -> Result<(), FormatError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FormatError::InvalidDecimal {
            field,
            value: value.to_string(),
        })
    }
}

/// Check that every column of `project` can be written and read back: no
/// reserved characters in free text, no non-finite decimals.
pub fn validate(project: &Project) -> Result<(), FormatError> {
    for column in &SCHEMA {
        if let Some(text) = column.text(project) {
            if !is_storable_text(text) {
                return Err(FormatError::ReservedCharacter { field: column.name });
            }
        }
        if let Some(value) = column.decimal(project) {
            check_decimal(column.name, value)?;
        }
    }
    Ok(())
}

pub fn encode_line(project: &Project) -> Result<String, FormatError> {
    validate(project)?;

    let fields: Vec<String> = SCHEMA.iter().map(|column| column.encode(project)).collect();
    Ok(fields.join(&DELIMITER.to_string()))
}

pub fn decode_line(line: &str) -> Result<Project, FormatError> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(FormatError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    // Fields are restored verbatim; name derivation only applies to new entries.
    let mut project = Project::default();
    for (column, raw) in SCHEMA.iter().zip(fields) {
        column.decode(raw, &mut project)?;
    }
    Ok(project)
}
