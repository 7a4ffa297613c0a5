//! `drstat stat` command handler

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use drstat_core::config::{MAX_JOBS, StatConfig};
use drstat_log_scan::{RunLayout, ScanMode, ScanTask, ScannedLog, StatReport, StatScanner};

use crate::cli::{ProfileKind, StatArgs};
use crate::commands::rules::resolve_profile;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Execute the `stat` command.
pub async fn execute(
    args: StatArgs,
    stat: &StatConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(&args, stat).await?;
    writer.render(&report)?;
    Ok(())
}

/// Plan and scan the inputs described by `args`, returning both tables.
pub async fn run(args: &StatArgs, stat: &StatConfig) -> Result<StatReport, CliError> {
    let jobs = effective_jobs(args.jobs, stat)?;
    let scanner = Arc::new(build_scanner(args, stat).await?);

    let (mode, tasks) = match args.dir {
        Some(ref dir) => {
            info!(dir = %dir.display(), "scanning run directory");
            (ScanMode::RunDir, scanner.plan_run_dir(dir)?)
        }
        None => {
            info!(files = args.files.len(), "scanning files");
            (ScanMode::Files, scanner.plan_files(args.files.as_slice()))
        }
    };

    let logs = scan_tasks(Arc::clone(&scanner), tasks, jobs).await?;
    info!(logs = logs.len(), "scan complete");
    Ok(scanner.report(mode, logs))
}

/// Build a scanner from profile overrides, configured profiles, or built-ins.
pub async fn build_scanner(args: &StatArgs, stat: &StatConfig) -> Result<StatScanner, CliError> {
    let (route, route_source) =
        resolve_profile(ProfileKind::Route, args.route_profile.as_deref(), stat).await?;
    let (eval, eval_source) =
        resolve_profile(ProfileKind::Eval, args.eval_profile.as_deref(), stat).await?;
    debug!(route = %route_source, eval = %eval_source, "profiles resolved");

    Ok(StatScanner::new(route, eval, RunLayout::from_config(stat))
        .with_placeholder(stat.placeholder.clone()))
}

/// `--jobs` overrides `stat.jobs`; both must lie in `1..=MAX_JOBS`.
pub fn effective_jobs(requested: Option<usize>, stat: &StatConfig) -> Result<usize, CliError> {
    let jobs = requested.unwrap_or(stat.jobs);
    if jobs == 0 || jobs > MAX_JOBS {
        return Err(CliError::Config(format!(
            "jobs must be between 1 and {}, got {}",
            MAX_JOBS, jobs
        )));
    }
    Ok(jobs)
}

/// Scan tasks on the blocking pool with at most `jobs` files in flight.
///
/// Results keep the task order. The first failing task aborts the command.
pub async fn scan_tasks(
    scanner: Arc<StatScanner>,
    tasks: Vec<ScanTask>,
    jobs: usize,
) -> Result<Vec<ScannedLog>, CliError> {
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut handles = Vec::with_capacity(tasks.len());

    for task in tasks {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| CliError::Command(format!("scan worker pool closed: {}", e)))?;
        let scanner = Arc::clone(&scanner);
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            scanner.scan_task(&task)
        }));
    }

    let mut logs = Vec::with_capacity(handles.len());
    for handle in handles {
        let log = handle
            .await
            .map_err(|e| CliError::Command(format!("scan task failed: {}", e)))??;
        logs.push(log);
    }
    Ok(logs)
}
