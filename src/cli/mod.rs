pub mod bulk;
pub mod check;
pub mod review;

use crate::config::InboxConfig;
use crate::inbox::types::Interrupt;
use crate::stream::{JsonlRunStream, RunStream, SocketRunStream};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Read an interrupt from a JSON file.
///
/// Accepts an interrupt envelope (`{"id": ..., "value": ...}`), a list of
/// envelopes (the first one is used), or a bare interrupt value.
pub fn load_interrupt(path: &Path) -> Result<Interrupt> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read interrupt file: {}", path.display()))?;
    parse_interrupt_str(&content)
        .with_context(|| format!("Failed to parse interrupt file: {}", path.display()))
}

pub fn parse_interrupt_str(json: &str) -> Result<Interrupt> {
    let value: Value = serde_json::from_str(json).context("Invalid JSON")?;
    match value {
        Value::Array(mut interrupts) => {
            if interrupts.is_empty() {
                bail!("Interrupt list is empty");
            }
            envelope(interrupts.swap_remove(0))
        }
        other => envelope(other),
    }
}

fn envelope(value: Value) -> Result<Interrupt> {
    let is_envelope = value
        .as_object()
        .is_some_and(|object| object.contains_key("value"));
    if is_envelope {
        serde_json::from_value(value).context("Invalid interrupt envelope")
    } else {
        Ok(Interrupt::new(value))
    }
}

/// The run stream commands go to: stdout for a dry run, otherwise the
/// configured bridge socket.
pub fn open_stream(config: &InboxConfig, dry_run: bool) -> Result<Arc<dyn RunStream + Send + Sync>> {
    if dry_run {
        return Ok(Arc::new(JsonlRunStream::stdout()));
    }
    Ok(Arc::new(SocketRunStream::from_config(config)?))
}
