use jiff::civil::Date;

use crate::models::project::Project;

/// Format a date as `dd/mm/yyyy`.
pub fn format_date(date: Date) -> String {
    format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year())
}

/// Locale-independent decimal text that always carries a fractional part,
/// e.g. `1000.0` or `750.25`.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// On-screen summary: job fields plus the three party names.
pub fn summary(project: &Project) -> String {
    [
        format!("Job Number:      {}", project.job_number),
        format!("Job Name:        {}", project.job_name),
        format!("Build Type:      {}", project.build_type),
        format!("Project Address: {}", project.site_address),
        format!("ERF Number:      {}", project.erf_number),
        format!("Project Total:   {}", format_decimal(project.total_fee)),
        format!("Amount Paid:     {}", format_decimal(project.total_paid)),
        format!("Build Deadline:  {}", format_date(project.deadline)),
        format!("Architect:       {}", project.architect.name),
        format!("Contractor:      {}", project.contractor.name),
        format!("Customer:        {}", project.customer.name),
    ]
    .join("\n")
}

/// Report written when a project is finalised, stamped with `completed_on`.
pub fn finalized(project: &Project, completed_on: Date) -> String {
    let mut lines = vec![
        format!("Job Number:      {}", project.job_number),
        format!("Job Name:        {}", project.job_name),
        format!("Build Type:      {}", project.build_type),
        format!("Project Address: {}", project.site_address),
        format!("ERF Number:      {}", project.erf_number),
        format!("Project Total:   {}", format_decimal(project.total_fee)),
        format!("Amount Paid:     {}", format_decimal(project.total_paid)),
        format!("Amount Owed:     {}", project.amount_owed()),
        format!("Build Deadline:  {}", format_date(project.deadline)),
        format!("Completion Date: {}", format_date(completed_on)),
    ];

    for (heading, party) in [
        ("Architect", &project.architect),
        ("Contractor", &project.contractor),
        ("Customer", &project.customer),
    ] {
        lines.push(String::new());
        lines.push(format!("-----{heading}-----"));
        lines.push(party.to_string());
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
