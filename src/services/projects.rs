use std::path::PathBuf;

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::{
        party::ContactDetails,
        project::{AmountOwed, NewProject, Project},
    },
    repository::{ProjectRepository, RepositoryError},
    storage::{
        Storage,
        codec::{self, FormatError},
    },
};

#[derive(Debug, Error)]
pub enum CreateProjectError {
    #[error("Project number {0} is already in use")]
    DuplicateJobNumber(u32),

    #[error("Invalid project details: {0}")]
    InvalidDetails(#[from] FormatError),

    #[error("Changes not saved: {0}")]
    Repository(#[from] RepositoryError),
}

pub fn create_project(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: NewProject,
) -> Result<Project, CreateProjectError> {
    if repository.find_by_job_number(parameters.job_number).is_some() {
        return Err(CreateProjectError::DuplicateJobNumber(parameters.job_number));
    }

    let project = Project::from(parameters);
    codec::validate(&project)?;

    repository.append(project.clone());

    repository.save_all(storage)?;

    Ok(project)
}

#[derive(Debug, Error)]
pub enum UpdateProjectError {
    #[error("Project number {0} not found")]
    ProjectNotFound(u32),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] FormatError),

    #[error("Changes not saved: {0}")]
    Repository(#[from] RepositoryError),
}

/// A single attribute edit on an existing project.
pub enum ProjectChange {
    JobName(String),
    BuildType(String),
    SiteAddress(String),
    ErfNumber(u32),
    TotalFee(f64),
    Deadline(Date),
}

impl ProjectChange {
    fn check_text(&self, field: &'static str, value: &str) -> Result<(), FormatError> {
        if codec::is_storable_text(value) {
            Ok(())
        } else {
            Err(FormatError::ReservedCharacter { field })
        }
    }

    fn validate(&self) -> Result<(), FormatError> {
        match self {
            ProjectChange::JobName(name) => self.check_text("job_name", name),
            ProjectChange::BuildType(build_type) => self.check_text("build_type", build_type),
            ProjectChange::SiteAddress(address) => self.check_text("site_address", address),
            ProjectChange::TotalFee(total_fee) => codec::check_decimal("total_fee", *total_fee),
            ProjectChange::ErfNumber(_) | ProjectChange::Deadline(_) => Ok(()),
        }
    }

    fn apply(self, project: &mut Project) {
        match self {
            // A plain rename: an empty name is stored as given.
            ProjectChange::JobName(name) => project.job_name = name,
            ProjectChange::BuildType(build_type) => project.build_type = build_type,
            ProjectChange::SiteAddress(address) => project.site_address = address,
            ProjectChange::ErfNumber(erf_number) => project.erf_number = erf_number,
            ProjectChange::TotalFee(total_fee) => project.total_fee = total_fee,
            ProjectChange::Deadline(deadline) => project.deadline = deadline,
        }
    }
}

pub struct UpdateProjectParameters {
    pub job_number: u32,
    pub change: ProjectChange,
}

pub fn update_project(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: UpdateProjectParameters,
) -> Result<Project, UpdateProjectError> {
    parameters.change.validate()?;

    let project = repository
        .find_by_job_number_mut(parameters.job_number)
        .ok_or(UpdateProjectError::ProjectNotFound(parameters.job_number))?;
    parameters.change.apply(project);
    let updated = project.clone();

    repository.save_all(storage)?;

    Ok(updated)
}

pub struct AmendDeadlineParameters {
    pub job_number: u32,
    pub deadline: Date,
}

pub fn amend_deadline(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: AmendDeadlineParameters,
) -> Result<Project, UpdateProjectError> {
    update_project(
        repository,
        storage,
        UpdateProjectParameters {
            job_number: parameters.job_number,
            change: ProjectChange::Deadline(parameters.deadline),
        },
    )
}

pub struct RecordPaymentParameters {
    pub job_number: u32,
    pub amount: f64,
}

pub fn record_payment(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: RecordPaymentParameters,
) -> Result<Project, UpdateProjectError> {
    let project = repository
        .find_by_job_number_mut(parameters.job_number)
        .ok_or(UpdateProjectError::ProjectNotFound(parameters.job_number))?;
    // Checked before mutating so an overflowing total never reaches memory or the store.
    codec::check_decimal("total_paid", project.total_paid + parameters.amount)?;
    project.add_payment(parameters.amount);
    let updated = project.clone();

    repository.save_all(storage)?;

    Ok(updated)
}

#[derive(Debug, Error)]
pub enum UpdateContractorError {
    #[error("No project has a contractor named '{0}'")]
    ContractorNotFound(String),

    #[error("Invalid contact details: {0}")]
    InvalidText(#[from] FormatError),

    #[error("Changes not saved: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct UpdateContractorParameters {
    pub contractor_name: String,
    pub contact: ContactDetails,
}

/// Update the contact details of the first contractor with the given name.
pub fn update_contractor_details(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: UpdateContractorParameters,
) -> Result<Project, UpdateContractorError> {
    let project = repository
        .find_by_contractor_name_mut(&parameters.contractor_name)
        .ok_or_else(|| UpdateContractorError::ContractorNotFound(parameters.contractor_name.clone()))?;

    let mut candidate = project.clone();
    candidate.contractor.update_contact(parameters.contact);
    codec::validate(&candidate)?;
    *project = candidate.clone();

    repository.save_all(storage)?;

    Ok(candidate)
}

#[derive(Debug, Error)]
pub enum FinaliseProjectError {
    #[error("Project number {0} not found")]
    ProjectNotFound(u32),

    #[error("Project finalised but not fully recorded: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct FinaliseProjectParameters {
    pub job_number: u32,
    pub completed_on: Date,
}

pub struct FinaliseProjectResult {
    pub project: Project,
    pub amount_owed: AmountOwed,
    pub report_path: PathBuf,
}

pub fn finalise_project(
    repository: &mut ProjectRepository,
    storage: &impl Storage,
    parameters: FinaliseProjectParameters,
) -> Result<FinaliseProjectResult, FinaliseProjectError> {
    let project = repository
        .find_by_job_number_mut(parameters.job_number)
        .ok_or(FinaliseProjectError::ProjectNotFound(parameters.job_number))?;
    project.mark_finalized();
    let finalised = project.clone();

    repository.save_all(storage)?;

    let report_path =
        ProjectRepository::export_finalized(storage, &finalised, parameters.completed_on)?;

    Ok(FinaliseProjectResult {
        amount_owed: finalised.amount_owed(),
        project: finalised,
        report_path,
    })
}

/// Unfinished projects whose deadline has passed, in repository order.
pub fn overdue_projects(repository: &ProjectRepository, today: Date) -> Vec<&Project> {
    repository.iter().filter(|p| p.is_overdue(today)).collect()
}

pub fn unfinished_projects(repository: &ProjectRepository) -> Vec<&Project> {
    repository.iter().filter(|p| !p.completed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::party::{ARCHITECT, CONTRACTOR, CUSTOMER, Party},
        storage::memory::MemoryStorage,
    };

    fn new_project(job_number: u32, contractor: &str) -> NewProject {
        NewProject {
            job_number,
            job_name: String::new(),
            build_type: String::from("Warehouse"),
            site_address: String::from("12 Dock Rd"),
            erf_number: 3301,
            total_fee: 1000.0,
            total_paid: 0.0,
            deadline: jiff::civil::date(2025, 6, 30),
            architect: Party::new(ARCHITECT, "Ada Lines", "1", "ada@plans.co.za", "A St"),
            contractor: Party::new(CONTRACTOR, contractor, "2", "c@build.co.za", "B St"),
            customer: Party::new(CUSTOMER, "Smith", "3", "smith@mail.com", "C St"),
        }
    }

    fn seeded(storage: &MemoryStorage) -> ProjectRepository {
        let mut repository = ProjectRepository::new();
        create_project(&mut repository, storage, new_project(1, "Bob")).unwrap();
        create_project(&mut repository, storage, new_project(2, "Cat")).unwrap();
        repository
    }

    #[test]
    fn test_create_project_persists_immediately() {
        let storage = MemoryStorage::default();
        let mut repository = ProjectRepository::new();

        let project = create_project(&mut repository, &storage, new_project(42, "Bob")).unwrap();

        assert_eq!(project.job_name, "Warehouse Smith");
        let reloaded = ProjectRepository::load_all(&storage).unwrap();
        assert_eq!(reloaded.find_by_job_number(42), Some(&project));
    }

    #[test]
    fn test_create_project_rejects_duplicate_job_number() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let result = create_project(&mut repository, &storage, new_project(2, "Dan"));

        assert!(matches!(result, Err(CreateProjectError::DuplicateJobNumber(2))));
        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_create_project_rejects_delimiter_in_text() {
        let storage = MemoryStorage::default();
        let mut repository = ProjectRepository::new();
        let mut parameters = new_project(3, "Bob");
        parameters.site_address = String::from("Plot 4|5");

        let result = create_project(&mut repository, &storage, parameters);

        assert!(matches!(result, Err(CreateProjectError::InvalidDetails(_))));
        assert!(repository.is_empty());
        assert!(storage.contents().is_none());
    }

    #[test]
    fn test_amend_deadline() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let parameters = AmendDeadlineParameters {
            job_number: 2,
            deadline: jiff::civil::date(2026, 1, 15),
        };
        amend_deadline(&mut repository, &storage, parameters).unwrap();

        assert!(storage.contents().unwrap().contains("|15/01/2026|"));
    }

    #[test]
    fn test_record_payment_accumulates() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let pay = |repository: &mut ProjectRepository, amount| {
            record_payment(repository, &storage, RecordPaymentParameters { job_number: 1, amount })
        };
        pay(&mut repository, 400.0).unwrap();
        let project = pay(&mut repository, 350.0).unwrap();

        assert_eq!(project.total_paid, 750.0);
        assert_eq!(project.amount_owed(), AmountOwed::Outstanding(250.0));
    }

    #[test]
    fn test_record_payment_rejects_non_finite_total() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        let before = storage.contents();

        for amount in [f64::INFINITY, f64::NAN] {
            let result = record_payment(
                &mut repository,
                &storage,
                RecordPaymentParameters { job_number: 1, amount },
            );
            assert!(matches!(
                result,
                Err(UpdateProjectError::InvalidValue(FormatError::InvalidDecimal {
                    field: "total_paid",
                    ..
                }))
            ));
        }

        let huge = RecordPaymentParameters { job_number: 1, amount: f64::MAX };
        record_payment(&mut repository, &storage, huge).unwrap();
        let overflow = RecordPaymentParameters { job_number: 1, amount: f64::MAX };
        assert!(record_payment(&mut repository, &storage, overflow).is_err());

        assert_eq!(repository.find_by_job_number(1).unwrap().total_paid, f64::MAX);
        assert_ne!(storage.contents(), before);
        assert!(ProjectRepository::load_all(&storage).is_ok());
    }

    #[test]
    fn test_update_fee_rejects_non_finite_value() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        let before = storage.contents();

        let parameters = UpdateProjectParameters {
            job_number: 2,
            change: ProjectChange::TotalFee(f64::NAN),
        };

        assert!(matches!(
            update_project(&mut repository, &storage, parameters),
            Err(UpdateProjectError::InvalidValue(_))
        ));
        assert_eq!(repository.find_by_job_number(2).unwrap().total_fee, 1000.0);
        assert_eq!(storage.contents(), before);
    }

    #[test]
    fn test_create_project_rejects_non_finite_fee() {
        let storage = MemoryStorage::default();
        let mut repository = ProjectRepository::new();
        let mut parameters = new_project(5, "Bob");
        parameters.total_fee = f64::INFINITY;

        let result = create_project(&mut repository, &storage, parameters);

        assert!(matches!(result, Err(CreateProjectError::InvalidDetails(_))));
        assert!(repository.is_empty());
        assert!(storage.contents().is_none());
    }

    #[test]
    fn test_update_missing_project() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let parameters = UpdateProjectParameters {
            job_number: 99,
            change: ProjectChange::TotalFee(10.0),
        };

        assert!(matches!(
            update_project(&mut repository, &storage, parameters),
            Err(UpdateProjectError::ProjectNotFound(99))
        ));
    }

    #[test]
    fn test_rename_to_empty_does_not_rederive() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let parameters = UpdateProjectParameters {
            job_number: 1,
            change: ProjectChange::JobName(String::new()),
        };
        let project = update_project(&mut repository, &storage, parameters).unwrap();

        assert_eq!(project.job_name, "");
    }

    #[test]
    fn test_update_contractor_first_match_only() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        create_project(&mut repository, &storage, new_project(3, "Bob")).unwrap();

        let parameters = UpdateContractorParameters {
            contractor_name: String::from("Bob"),
            contact: ContactDetails {
                phone_number: String::from("099"),
                email_address: String::from("bob@new.co.za"),
                postal_address: String::from("New Rd"),
            },
        };
        let updated = update_contractor_details(&mut repository, &storage, parameters).unwrap();

        assert_eq!(updated.job_number, 1);
        assert_eq!(repository.find_by_job_number(1).unwrap().contractor.phone_number, "099");
        assert_eq!(repository.find_by_job_number(3).unwrap().contractor.phone_number, "2");
    }

    #[test]
    fn test_update_contractor_rejects_bad_text_without_mutation() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let parameters = UpdateContractorParameters {
            contractor_name: String::from("Cat"),
            contact: ContactDetails {
                phone_number: String::from("099"),
                email_address: String::from("cat@x|y"),
                postal_address: String::from("New Rd"),
            },
        };

        assert!(matches!(
            update_contractor_details(&mut repository, &storage, parameters),
            Err(UpdateContractorError::InvalidText(_))
        ));
        assert_eq!(repository.find_by_job_number(2).unwrap().contractor.phone_number, "2");
    }

    #[test]
    fn test_update_contractor_unknown_name() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);

        let parameters = UpdateContractorParameters {
            contractor_name: String::from("cat"),
            contact: ContactDetails {
                phone_number: String::new(),
                email_address: String::new(),
                postal_address: String::new(),
            },
        };

        assert!(matches!(
            update_contractor_details(&mut repository, &storage, parameters),
            Err(UpdateContractorError::ContractorNotFound(name)) if name == "cat"
        ));
    }

    #[test]
    fn test_finalise_project_persists_and_exports() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        record_payment(
            &mut repository,
            &storage,
            RecordPaymentParameters { job_number: 2, amount: 1200.0 },
        )
        .unwrap();

        let parameters = FinaliseProjectParameters {
            job_number: 2,
            completed_on: jiff::civil::date(2025, 7, 4),
        };
        let result = finalise_project(&mut repository, &storage, parameters).unwrap();

        assert!(result.project.completed);
        assert_eq!(result.amount_owed, AmountOwed::FullyPaid);
        assert!(storage.contents().unwrap().lines().nth(1).unwrap().ends_with("|true"));
        let reports = storage.reports.borrow();
        assert_eq!(reports[0].0, 2);
        assert!(reports[0].1.contains("Amount Owed:     Fully Paid"));
    }

    #[test]
    fn test_save_failure_is_reported() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        let read_only = MemoryStorage {
            read_only: true,
            ..MemoryStorage::default()
        };

        let result = record_payment(
            &mut repository,
            &read_only,
            RecordPaymentParameters { job_number: 1, amount: 10.0 },
        );

        assert!(matches!(result, Err(UpdateProjectError::Repository(_))));
        assert_eq!(repository.find_by_job_number(1).unwrap().total_paid, 10.0);
    }

    #[test]
    fn test_overdue_and_unfinished_listings() {
        let storage = MemoryStorage::default();
        let mut repository = seeded(&storage);
        let mut later = new_project(3, "Dan");
        later.deadline = jiff::civil::date(2030, 1, 1);
        create_project(&mut repository, &storage, later).unwrap();
        repository.find_by_job_number_mut(2).unwrap().mark_finalized();

        let today = jiff::civil::date(2025, 8, 1);
        let overdue: Vec<u32> = overdue_projects(&repository, today).iter().map(|p| p.job_number).collect();
        let unfinished: Vec<u32> = unfinished_projects(&repository).iter().map(|p| p.job_number).collect();

        assert_eq!(overdue, vec![1]);
        assert_eq!(unfinished, vec![1, 3]);
    }
}
