//! Plan command: shows how a release plan would be applied.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::{locked_services, ReleaserConfig};
use crate::domain::{partition, summarise_update, ReleasePlan, ServiceUpdate};
use crate::ui;

pub async fn execute(plan: String, config: String) -> Result<()> {
    let config = ReleaserConfig::load(Path::new(&config))?;
    let mut plan = ReleasePlan::load(Path::new(&plan))?;
    let locked = plan.exclude(&locked_services(&config));

    ui::print_header(&format!("Plan: {} service(s)", plan.updates.len()));

    let batch = partition(&plan.updates, &config.self_service_names());
    print_section("Applied and reported", &batch.ordinary);
    print_section("Applied last, no result expected", &batch.self_updates);

    if !locked.is_empty() {
        let locked: Vec<&ServiceUpdate> = locked.iter().collect();
        print_section("Locked (skipped)", &locked);
    }
    Ok(())
}

fn print_section(title: &str, updates: &[&ServiceUpdate]) {
    if updates.is_empty() {
        return;
    }
    println!("{}", title.bold());
    for update in updates {
        println!(
            "   {:<40} {}",
            update.service_id.to_string(),
            summarise_update(&update.updates).dimmed()
        );
    }
    println!();
}
