use colored::*;
use jiff::civil::Date;

use crate::{
    models::project::{AmountOwed, Project},
    report::{self, format_decimal},
    services::projects::FinaliseProjectResult,
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a project
pub fn get_status_glyph(project: &Project, today: Date) -> ColoredString {
    if project.completed {
        "✓".dimmed()
    } else if project.is_overdue(today) {
        "●".red()
    } else {
        "○".normal()
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let project_word = if count == 1 { "project" } else { "projects" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, project_word);
}

/// Render a separator line spanning half the terminal
pub fn render_separator() {
    let width = (get_terminal_width() / 2).max(24);
    println!("  {}", "─".repeat(width).dimmed());
}

/// Render the summary block of a project, indented, with its status glyph
pub fn render_project(project: &Project, today: Date) {
    let glyph = get_status_glyph(project, today);
    for (index, line) in report::summary(project).lines().enumerate() {
        if index == 0 {
            println!("  {}  {}", glyph, line.bold());
        } else {
            println!("     {}", line);
        }
    }
}

pub fn render_project_list(title: &str, projects: &[&Project], today: Date) {
    render_view_header(title, projects.len());
    for project in projects {
        render_project(project, today);
        render_separator();
    }
}

pub fn render_balance(project: &Project) {
    println!("  Total amount paid: {}", format_decimal(project.total_paid));
    match project.amount_owed() {
        AmountOwed::FullyPaid => println!("  {}", "Fully Paid".green()),
        owed => println!("  Total still owed:  {}", owed.to_string().yellow()),
    }
}

pub fn render_finalised(result: &FinaliseProjectResult, completed_on: Date) {
    println!("\n  {}\n", "Finalised Project".cyan().bold());
    for line in result.project.customer.to_string().lines() {
        println!("  {}", line);
    }
    match result.amount_owed {
        AmountOwed::FullyPaid => println!("  {}", "Fully Paid".green()),
        owed => println!("  Amount still to be paid: {}", owed.to_string().yellow()),
    }
    println!("  Completion date: {}", report::format_date(completed_on));
    println!(
        "  {}",
        format!("Report written to {}", result.report_path.display()).dimmed()
    );
}
