//! `inboxctl check`: validate an interrupt file and show what a review
//! would start with.

use crate::inbox::{create_default_response, InboxError};
use crate::utils::text::{prettify_text, truncate};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run_check(path: &Path) -> Result<()> {
    let interrupt = super::load_interrupt(path)?;
    let Some(request) = interrupt.hitl_request() else {
        return Err(anyhow::Error::new(InboxError::InvalidInterrupt)
            .context(format!("{} is not a reviewable interrupt", path.display())));
    };

    println!();
    println!("  {} Interrupt is reviewable!", "✓".green().bold());
    if let Some(ref id) = interrupt.id {
        println!("  Id:      {}", id.cyan());
    }
    println!("  Actions: {}", request.len());
    println!();

    for (index, action) in request.action_requests.iter().enumerate() {
        println!("  {}. {}", index + 1, prettify_text(&action.name).bold());
        if let Some(ref description) = action.description {
            println!("     {}", truncate(description, 72).dimmed());
        }
        for (key, value) in crate::inbox::stringify_args(&action.args) {
            println!("     {}: {}", key.cyan(), truncate(&value, 60));
        }

        match request.review_config_for(index) {
            Some(config) => {
                let allowed: Vec<&str> = config
                    .allowed_decisions
                    .iter()
                    .map(|decision| decision.as_str())
                    .collect();
                if allowed.is_empty() {
                    println!("     {} no decisions allowed", "⚠".yellow());
                } else {
                    println!("     {} {}", "allowed:".dimmed(), allowed.join(", "));
                }
            }
            None => println!("     {} no review config", "⚠".yellow()),
        }

        // Defaults are computed the same way a review of this action would
        if let Some(single) = request.single_action(index) {
            match create_default_response(&single) {
                Ok(initial) => match initial.default_submit_type {
                    Some(decision) => {
                        println!("     {} {}", "default:".dimmed(), decision.to_string().green())
                    }
                    None => println!("     {} none", "default:".dimmed()),
                },
                Err(e) => println!("     {} {}", "✗".red(), e),
            }
        }
        println!();
    }

    Ok(())
}
