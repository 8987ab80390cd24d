//! Non-interactive commands: approve or reject every pending action, or
//! mark the thread resolved.
//!
//! Status lines go to stderr so `--dry-run` output on stdout stays pure
//! JSON lines.

use crate::config::InboxConfig;
use crate::inbox::{BatchController, InterruptController, Notice};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

pub async fn run_approve_all(config: &InboxConfig, path: &Path, dry_run: bool) -> Result<()> {
    let mut batch = open_batch(config, path, dry_run)?;
    let decisions = batch.approve_all().await?;
    report(batch.take_notice(), decisions.len());
    Ok(())
}

pub async fn run_reject_all(
    config: &InboxConfig,
    path: &Path,
    message: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let mut batch = open_batch(config, path, dry_run)?;
    if let Some(message) = message {
        if message.trim().is_empty() {
            bail!("Reject message must not be empty");
        }
        batch = batch.with_reject_all_message(message);
    }
    let decisions = batch.reject_all().await?;
    report(batch.take_notice(), decisions.len());
    Ok(())
}

pub async fn run_resolve(config: &InboxConfig, path: &Path, dry_run: bool) -> Result<()> {
    let interrupt = super::load_interrupt(path)?;
    let stream = super::open_stream(config, dry_run)?;

    let mut controller = InterruptController::new(stream);
    controller.set_interrupt(interrupt);
    controller.resolve().await?;

    if let Some(notice) = controller.take_notice() {
        eprintln!("  {} {}", "✓".green(), notice.description);
    }
    Ok(())
}

fn open_batch(config: &InboxConfig, path: &Path, dry_run: bool) -> Result<BatchController> {
    let interrupt = super::load_interrupt(path)?;
    let stream = super::open_stream(config, dry_run)?;

    let mut batch =
        BatchController::new(stream).with_reject_all_message(config.reject_all_message.clone());
    batch.set_interrupt(interrupt);
    if batch.request().is_none() {
        bail!(crate::inbox::InboxError::InvalidInterrupt);
    }
    Ok(batch)
}

fn report(notice: Option<Notice>, count: usize) {
    let description = notice
        .map(|notice| notice.description)
        .unwrap_or_else(|| "Done.".to_string());
    eprintln!(
        "  {} {} ({} {})",
        "✓".green().bold(),
        description,
        count,
        if count == 1 { "action" } else { "actions" }
    );
}
