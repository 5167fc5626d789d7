//! Apply command: runs a release plan against the cluster.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{locked_services, EventLogFormat, ReleaserConfig};
use crate::domain::{ReleasePlan, ReleaseResult};
use crate::infrastructure::kubernetes::create_client;
use crate::infrastructure::{
    DryRunPlatform, EventLog, JsonEventLog, KubernetesPlatform, Platform, TracingEventLog,
};
use crate::services::ReleaseService;
use crate::ui;

pub async fn execute(
    plan: String,
    config: String,
    dry_run: bool,
    output: Option<String>,
) -> Result<()> {
    let config = ReleaserConfig::load(Path::new(&config))?;
    let mut plan = ReleasePlan::load(Path::new(&plan))?;

    for update in plan.exclude(&locked_services(&config)) {
        warn!(service_id = %update.service_id, "Service is locked, leaving it out of the release");
    }

    ui::print_header(&format!(
        "Release: {} service(s){}",
        plan.updates.len(),
        if dry_run { " [dry-run]" } else { "" }
    ));

    let platform: Arc<dyn Platform> = if dry_run {
        Arc::new(DryRunPlatform)
    } else {
        let client = create_client().await?;
        Arc::new(KubernetesPlatform::new(client, &config.kubernetes))
    };

    let events: Arc<dyn EventLog> = match config.event_log.format {
        EventLogFormat::Tracing => Arc::new(TracingEventLog),
        EventLogFormat::Json => {
            let log = JsonEventLog::new();
            info!(release_id = %log.release_id(), "Emitting JSON release events");
            Arc::new(log)
        }
    };

    let service =
        ReleaseService::new(platform, events).with_self_names(config.self_service_names());

    let mut results: ReleaseResult = std::mem::take(&mut plan.results);
    let outcome = service.apply_changes(&plan.updates, &mut results).await;

    ui::print_results(&results);

    if let Some(path) = output {
        write_results(&results, Path::new(&path))?;
        info!(path = %path, "Wrote release results");
    }

    match outcome {
        Ok(()) => {
            let counts = results.counts();
            if counts.failed > 0 {
                ui::print_warning(&format!("{} service(s) failed to release", counts.failed));
            } else {
                ui::print_success("Release applied");
            }
            Ok(())
        }
        Err(e) => {
            ui::print_error("Release could not be applied");
            Err(e.context("Release apply failed"))
        }
    }
}

fn write_results(results: &ReleaseResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}
