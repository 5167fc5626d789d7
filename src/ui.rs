// Terminal UI utilities

use colored::Colorize;

use crate::domain::{ReleaseResult, ReleaseStatus};

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// One line per service, plus totals
pub fn print_results(results: &ReleaseResult) {
    for (id, result) in results.iter() {
        let label = result.status.as_str();
        let status = match result.status {
            ReleaseStatus::Success => label.green(),
            ReleaseStatus::Failed => label.red(),
            ReleaseStatus::Unknown => label.yellow(),
        };
        match &result.error {
            Some(error) => println!("   {:<40} {:<8} {}", id.to_string(), status, error.dimmed()),
            None => println!("   {:<40} {}", id.to_string(), status),
        }
    }

    let counts = results.counts();
    println!();
    println!(
        "   {} succeeded, {} failed, {} unknown",
        counts.success, counts.failed, counts.unknown
    );
    println!();
}
