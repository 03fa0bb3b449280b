use std::{fmt::Display, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::*;
use jiff::civil::Date;

use crate::{
    models::{
        party::{ARCHITECT, CONTRACTOR, CUSTOMER, ContactDetails, Party},
        project::NewProject,
    },
    repository::ProjectRepository,
    services::projects::{
        AmendDeadlineParameters, FinaliseProjectParameters, ProjectChange,
        RecordPaymentParameters, UpdateContractorParameters, UpdateProjectParameters,
        amend_deadline, create_project, finalise_project, overdue_projects, record_payment,
        unfinished_projects, update_contractor_details, update_project,
    },
    storage::{codec, flat_file::FlatFileStorage},
};

mod models;
mod report;
mod repository;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "poised",
    about = "Project records for a structural engineering practice"
)]
struct Cli {
    /// Project store file
    #[arg(long, global = true, env = "POISED_STORE")]
    store: Option<PathBuf>,

    /// Directory for finalised project reports (defaults to the store's directory)
    #[arg(long, global = true, env = "POISED_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all projects
    List,

    /// Show a single project
    Show { job_number: u32 },

    /// Create a new project
    Add(AddArgs),

    /// Amend the deadline of a project
    Deadline {
        job_number: u32,
        /// New deadline (dd/mm/yyyy)
        #[arg(value_parser = parse_date_arg)]
        deadline: Date,
    },

    /// Add a payment to the amount paid for a project
    Pay { job_number: u32, amount: f64 },

    /// Amend a contractor's contact details
    Contractor {
        /// Contractor name, exactly as stored
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
    },

    /// Change one attribute of a project
    Update {
        job_number: u32,
        #[command(flatten)]
        field: UpdateField,
    },

    /// Show unfinished projects past their deadline
    Overdue,

    /// Show unfinished projects
    Unfinished,

    /// Mark a project as completed and write its report
    Finalise {
        job_number: u32,
        /// Completion date (dd/mm/yyyy), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<Date>,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Project number
    job_number: u32,
    /// Project name, derived from build type and customer name when omitted
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long)]
    build_type: String,
    /// Site address
    #[arg(long)]
    address: String,
    /// ERF number
    #[arg(long)]
    erf: u32,
    /// Total fee
    #[arg(long)]
    fee: f64,
    /// Amount already paid
    #[arg(long, default_value_t = 0.0)]
    paid: f64,
    /// Deadline (dd/mm/yyyy)
    #[arg(long, value_parser = parse_date_arg)]
    deadline: Date,

    #[arg(long)]
    architect_name: String,
    #[arg(long, default_value = "")]
    architect_phone: String,
    #[arg(long, default_value = "")]
    architect_email: String,
    #[arg(long, default_value = "")]
    architect_address: String,

    #[arg(long)]
    contractor_name: String,
    #[arg(long, default_value = "")]
    contractor_phone: String,
    #[arg(long, default_value = "")]
    contractor_email: String,
    #[arg(long, default_value = "")]
    contractor_address: String,

    #[arg(long)]
    customer_name: String,
    #[arg(long, default_value = "")]
    customer_phone: String,
    #[arg(long, default_value = "")]
    customer_email: String,
    #[arg(long, default_value = "")]
    customer_address: String,
}

impl From<AddArgs> for NewProject {
    fn from(args: AddArgs) -> Self {
        NewProject {
            job_number: args.job_number,
            job_name: args.name,
            build_type: args.build_type,
            site_address: args.address,
            erf_number: args.erf,
            total_fee: args.fee,
            total_paid: args.paid,
            deadline: args.deadline,
            architect: Party::new(
                ARCHITECT,
                args.architect_name,
                args.architect_phone,
                args.architect_email,
                args.architect_address,
            ),
            contractor: Party::new(
                CONTRACTOR,
                args.contractor_name,
                args.contractor_phone,
                args.contractor_email,
                args.contractor_address,
            ),
            customer: Party::new(
                CUSTOMER,
                args.customer_name,
                args.customer_phone,
                args.customer_email,
                args.customer_address,
            ),
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct UpdateField {
    /// New project name
    #[arg(long)]
    name: Option<String>,
    /// New build type
    #[arg(long)]
    build_type: Option<String>,
    /// New site address
    #[arg(long)]
    address: Option<String>,
    /// New ERF number
    #[arg(long)]
    erf: Option<u32>,
    /// New total fee
    #[arg(long)]
    fee: Option<f64>,
}

impl UpdateField {
    fn into_change(self) -> Option<ProjectChange> {
        self.name
            .map(ProjectChange::JobName)
            .or(self.build_type.map(ProjectChange::BuildType))
            .or(self.address.map(ProjectChange::SiteAddress))
            .or(self.erf.map(ProjectChange::ErfNumber))
            .or(self.fee.map(ProjectChange::TotalFee))
    }
}

fn parse_date_arg(value: &str) -> Result<Date, String> {
    codec::parse_date(value).ok_or_else(|| format!("'{value}' is not a valid dd/mm/yyyy date"))
}

fn fail(message: impl Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let store_path = cli.store.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("poised")
            .join("poisedProjects.txt")
    });

    // Create parent directory if it doesn't exist
    if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            fail(format!("Failed to create data directory: {}", e));
        });
    }

    let storage = match cli.reports_dir {
        Some(reports_dir) => {
            std::fs::create_dir_all(&reports_dir).unwrap_or_else(|e| {
                fail(format!("Failed to create reports directory: {}", e));
            });
            FlatFileStorage::new(store_path, reports_dir)
        }
        None => FlatFileStorage::beside_store(store_path),
    };

    let mut repository = match ProjectRepository::load_all(&storage) {
        Ok(repository) => repository,
        Err(e) => fail(format!(
            "Failed to load projects from '{}': {}",
            storage.path().display(),
            e
        )),
    };
    tracing::debug!(
        path = %storage.path().display(),
        count = repository.len(),
        "Project store opened"
    );

    let today = jiff::Zoned::now().date();

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => {
            let projects: Vec<_> = repository.iter().collect();
            ui::render_project_list("Projects", &projects, today);
        }
        Commands::Show { job_number } => match repository.find_by_job_number(job_number) {
            Some(project) => {
                println!();
                ui::render_project(project, today);
                println!();
            }
            None => fail(format!("Project number {} not found", job_number)),
        },
        Commands::Add(args) => {
            match create_project(&mut repository, &storage, NewProject::from(args)) {
                Ok(project) => {
                    println!("{}", "Project created.".green());
                    ui::render_project(&project, today);
                }
                Err(e) => fail(e),
            }
        }
        Commands::Deadline {
            job_number,
            deadline,
        } => {
            let parameters = AmendDeadlineParameters {
                job_number,
                deadline,
            };
            match amend_deadline(&mut repository, &storage, parameters) {
                Ok(_) => println!("{}", "Due date updated.".green()),
                Err(e) => fail(e),
            }
        }
        Commands::Pay { job_number, amount } => {
            let parameters = RecordPaymentParameters { job_number, amount };
            match record_payment(&mut repository, &storage, parameters) {
                Ok(project) => ui::render_balance(&project),
                Err(e) => fail(e),
            }
        }
        Commands::Contractor {
            name,
            phone,
            email,
            address,
        } => {
            let parameters = UpdateContractorParameters {
                contractor_name: name,
                contact: ContactDetails {
                    phone_number: phone,
                    email_address: email,
                    postal_address: address,
                },
            };
            match update_contractor_details(&mut repository, &storage, parameters) {
                Ok(project) => println!(
                    "{} (project {})",
                    "Contractor details updated.".green(),
                    project.job_number
                ),
                Err(e) => {
                    let names: Vec<_> = repository.iter().map(|p| p.contractor.name.as_str()).collect();
                    if !names.is_empty() {
                        eprintln!("Current contractors: {}", names.join(", "));
                    }
                    fail(e)
                }
            }
        }
        Commands::Update { job_number, field } => {
            let Some(change) = field.into_change() else {
                fail("Nothing to update");
            };
            let parameters = UpdateProjectParameters { job_number, change };
            match update_project(&mut repository, &storage, parameters) {
                Ok(_) => println!("{}", "Project updated.".green()),
                Err(e) => fail(e),
            }
        }
        Commands::Overdue => {
            let projects = overdue_projects(&repository, today);
            ui::render_project_list("Overdue", &projects, today);
        }
        Commands::Unfinished => {
            let projects = unfinished_projects(&repository);
            ui::render_project_list("Unfinished", &projects, today);
        }
        Commands::Finalise { job_number, date } => {
            let completed_on = date.unwrap_or(today);
            let parameters = FinaliseProjectParameters {
                job_number,
                completed_on,
            };
            match finalise_project(&mut repository, &storage, parameters) {
                Ok(result) => ui::render_finalised(&result, completed_on),
                Err(e) => fail(e),
            }
        }
    }
}
