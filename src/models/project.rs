use std::fmt;

use jiff::civil::Date;

use crate::models::party::Party;
use crate::report::format_decimal;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Project {
    /// External identifier, unique by convention only
    pub job_number: u32,
    /// Job name, derived from build type and customer when left empty at creation
    pub job_name: String,
    /// Kind of building, e.g. "House" or "Warehouse"
    pub build_type: String,
    /// Address of the construction site
    pub site_address: String,
    /// ERF (land parcel) number
    pub erf_number: u32,
    /// Total fee charged for the project
    pub total_fee: f64,
    /// Amount paid so far, may exceed the total fee
    pub total_paid: f64,
    /// Build deadline
    pub deadline: Date,
    pub architect: Party,
    pub contractor: Party,
    pub customer: Party,
    /// Set once the project has been finalised
    pub completed: bool,
}

/// Field values for a freshly entered project.
pub struct NewProject {
    pub job_number: u32,
    pub job_name: String,
    pub build_type: String,
    pub site_address: String,
    pub erf_number: u32,
    pub total_fee: f64,
    pub total_paid: f64,
    pub deadline: Date,
    pub architect: Party,
    pub contractor: Party,
    pub customer: Party,
}

impl From<NewProject> for Project {
    fn from(new: NewProject) -> Self {
        // Derived once here; later edits to build type or customer don't rename the job.
        let job_name = if new.job_name.is_empty() {
            format!("{} {}", new.build_type, new.customer.name)
        } else {
            new.job_name
        };

        Self {
            job_number: new.job_number,
            job_name,
            build_type: new.build_type,
            site_address: new.site_address,
            erf_number: new.erf_number,
            total_fee: new.total_fee,
            total_paid: new.total_paid,
            deadline: new.deadline,
            architect: new.architect,
            contractor: new.contractor,
            customer: new.customer,
            completed: false,
        }
    }
}

impl Project {
    /// Mark the project as completed. Completed projects stay editable.
    pub fn mark_finalized(&mut self) {
        self.completed = true;
    }

    pub fn add_payment(&mut self, amount: f64) {
        self.total_paid += amount;
    }

    pub fn amount_owed(&self) -> AmountOwed {
        AmountOwed::from_balance(self.total_fee, self.total_paid)
    }

    /// An unfinished project whose deadline lies strictly before `today`.
    pub fn is_overdue(&self, today: Date) -> bool {
        !self.completed && self.deadline < today
    }
}

/// Outstanding balance of a project. Overpayment is reported as fully paid,
/// never as a negative amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountOwed {
    FullyPaid,
    Outstanding(f64),
}

impl AmountOwed {
    pub fn from_balance(total_fee: f64, total_paid: f64) -> Self {
        let owed = total_fee - total_paid;
        if owed <= 0.0 {
            AmountOwed::FullyPaid
        } else {
            AmountOwed::Outstanding(owed)
        }
    }
}

impl fmt::Display for AmountOwed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountOwed::FullyPaid => write!(f, "Fully Paid"),
            AmountOwed::Outstanding(amount) => write!(f, "{}", format_decimal(*amount)),
        }
    }
}
