//! `inboxctl review`: interactive terminal review of a pending interrupt.
//!
//! Uses crossterm directly for single keystrokes and the action box. Key
//! reads happen in raw mode on a blocking thread; free-text prompts (edit
//! values, reject reasons) switch back to cooked mode so the terminal's
//! line editing works.

use crate::config::InboxConfig;
use crate::inbox::{
    BatchController, DecisionType, InboxError, InterruptController, Notice, ReviewState,
};
use crate::inbox::types::{ActionRequest, Interrupt};
use crate::utils::text::{prettify_text, truncate};
use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::Write;
use std::path::Path;

/// Operations shared by the single-action and batch controllers.
trait Reviewing {
    fn state(&self) -> &ReviewState;
    fn apply_edit(&mut self, value: String, key: String) -> Result<bool, InboxError>;
    fn apply_reject(&mut self, message: String) -> Result<(), InboxError>;
    fn take_notice(&mut self) -> Option<Notice>;
}

impl Reviewing for InterruptController {
    fn state(&self) -> &ReviewState {
        InterruptController::state(self)
    }

    fn apply_edit(&mut self, value: String, key: String) -> Result<bool, InboxError> {
        InterruptController::apply_edit(self, value, key)
    }

    fn apply_reject(&mut self, message: String) -> Result<(), InboxError> {
        InterruptController::apply_reject(self, message)
    }

    fn take_notice(&mut self) -> Option<Notice> {
        InterruptController::take_notice(self)
    }
}

impl Reviewing for BatchController {
    fn state(&self) -> &ReviewState {
        BatchController::state(self)
    }

    fn apply_edit(&mut self, value: String, key: String) -> Result<bool, InboxError> {
        BatchController::apply_edit(self, value, key)
    }

    fn apply_reject(&mut self, message: String) -> Result<(), InboxError> {
        BatchController::apply_reject(self, message)
    }

    fn take_notice(&mut self) -> Option<Notice> {
        BatchController::take_notice(self)
    }
}

pub async fn run_review(config: &InboxConfig, path: &Path, dry_run: bool) -> Result<()> {
    let interrupt = super::load_interrupt(path)?;
    let stream = super::open_stream(config, dry_run)?;

    match interrupt.hitl_request() {
        None => show_fallback(&interrupt),
        Some(request) if request.len() > 1 => {
            let mut batch = BatchController::new(stream)
                .with_reject_all_message(config.reject_all_message.clone());
            batch.set_interrupt(interrupt);
            review_batch(&mut batch).await
        }
        Some(_) => {
            let mut controller = InterruptController::new(stream);
            controller.set_interrupt(interrupt);
            review_single(&mut controller).await
        }
    }
}

async fn review_single(controller: &mut InterruptController) -> Result<()> {
    let Some(action) = controller
        .request()
        .and_then(|request| request.action_requests.first())
        .cloned()
    else {
        bail!(InboxError::NoActionRequest);
    };

    loop {
        draw_action(&action, controller.state(), "REVIEW REQUIRED")?;
        draw_keys(&[
            ("A", "Approve", Color::Green),
            ("E", "Edit", Color::Blue),
            ("U", "Undo edits", Color::Blue),
            ("R", "Reject", Color::Red),
            ("S", "Submit", Color::Yellow),
            ("M", "Mark resolved", Color::DarkGrey),
            ("Q", "Quit", Color::DarkGrey),
        ])?;

        let key = read_key().await?;
        if is_quit(&key) {
            return cancelled();
        }

        let finished = match key.code {
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if controller.state().offers(DecisionType::Approve) {
                    controller.select(DecisionType::Approve);
                    controller.submit().await.is_ok()
                } else {
                    print_error("This action cannot be approved.")?;
                    false
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                edit_field(controller).await?;
                false
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                let _ = controller.reset_edits();
                false
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                reject_reason(controller).await?;
                false
            }
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                controller.submit().await.is_ok()
            }
            KeyCode::Char('m') | KeyCode::Char('M') => controller.resolve().await.is_ok(),
            _ => false,
        };

        flush_notice(controller)?;
        if finished {
            return Ok(());
        }
    }
}

async fn review_batch(batch: &mut BatchController) -> Result<()> {
    loop {
        let Some(action) = batch.current_action().cloned() else {
            bail!(InboxError::NoActionRequest);
        };

        draw_progress(batch)?;
        let heading = format!("ACTION {} OF {}", batch.current_index() + 1, batch.len());
        draw_action(&action, batch.state(), &heading)?;

        let mut keys = vec![
            ("A", "Approve", Color::Green),
            ("E", "Edit", Color::Blue),
            ("U", "Undo edits", Color::Blue),
            ("R", "Reject", Color::Red),
            ("S", "Save", Color::Yellow),
            ("N/P", "Next/Prev", Color::DarkGrey),
            ("F", "Submit all", Color::Yellow),
        ];
        if batch.all_allow_approve() {
            keys.push(("Y", "Approve all", Color::Green));
        }
        keys.push(("X", "Reject all", Color::Red));
        keys.push(("Q", "Quit", Color::DarkGrey));
        draw_keys(&keys)?;

        let key = read_key().await?;
        if is_quit(&key) {
            return cancelled();
        }

        let finished = match key.code {
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Right => {
                batch.next();
                false
            }
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Left => {
                batch.previous();
                false
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                let _ = batch.save_decision(Some(DecisionType::Approve));
                false
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                edit_field(batch).await?;
                false
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                let _ = batch.reset_edits();
                false
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                reject_reason(batch).await?;
                false
            }
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                let _ = batch.save_decision(None);
                false
            }
            KeyCode::Char('f') | KeyCode::Char('F') => batch.submit_all().await.is_ok(),
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if batch.all_allow_approve() {
                    batch.approve_all().await.is_ok()
                } else {
                    print_error("Approve all is not available for this batch.")?;
                    false
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => batch.reject_all().await.is_ok(),
            _ => false,
        };

        flush_notice(batch)?;
        if finished {
            return Ok(());
        }
    }
}

/// Ask which field to change and its new value.
async fn edit_field<R: Reviewing>(review: &mut R) -> Result<()> {
    let keys: Vec<String> = match review.state().edit_response() {
        Some(edited) => edited.args.keys().cloned().collect(),
        None => return print_error(&InboxError::NoEditResponse.to_string()),
    };
    if keys.is_empty() {
        return print_error("This action has no arguments to edit.");
    }

    let choice = prompt_line("Field number".to_string()).await?;
    let key = choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| keys.get(index))
        .cloned();
    let Some(key) = key else {
        return print_error("No such field.");
    };

    let value = prompt_line(format!("New value for {}", key)).await?;
    let _ = review.apply_edit(value, key);
    Ok(())
}

async fn reject_reason<R: Reviewing>(review: &mut R) -> Result<()> {
    if !review.state().offers(DecisionType::Reject) {
        return print_error(&InboxError::NoRejectResponse.to_string());
    }
    let reason = prompt_line("Reason".to_string()).await?;
    let _ = review.apply_reject(reason);
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn cancelled() -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        SetForegroundColor(Color::DarkGrey),
        Print("\n  Review left pending. Nothing was sent.\n\n"),
        ResetColor,
    )?;
    Ok(())
}

/// Wait for one key press in raw mode.
async fn read_key() -> Result<KeyEvent> {
    tokio::task::spawn_blocking(|| -> Result<KeyEvent> {
        terminal::enable_raw_mode()?;
        let key = wait_for_press();
        // Always leave raw mode, even when reading failed
        terminal::disable_raw_mode()?;
        key
    })
    .await?
}

fn wait_for_press() -> Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

async fn prompt_line(label: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let mut stdout = std::io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("\n  {}: ", label)),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await?
}

/// Draw the action box: name, description, current argument values and
/// the decision that Submit would send.
fn draw_action(action: &ActionRequest, state: &ReviewState, heading: &str) -> Result<()> {
    let mut stdout = std::io::stdout();

    execute!(
        stdout,
        Print("\n"),
        SetForegroundColor(Color::Yellow),
        Print("╔══════════════════════════════════════════════════════════╗\n"),
        Print(format!("║  ⚠  {:<53}║\n", truncate(heading, 53))),
        Print("╠══════════════════════════════════════════════════════════╣\n"),
        SetForegroundColor(Color::White),
        Print(format!(
            "║  Action:  {:<47}║\n",
            truncate(&prettify_text(&action.name), 47)
        )),
    )?;

    if let Some(ref description) = action.description {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("║  {:<56}║\n", truncate(description, 56))),
        )?;
    }

    // Edited values when the action is editable, otherwise the originals
    let args = match state.edit_response() {
        Some(edited) => edited.args.clone(),
        None => crate::inbox::stringify_args(&action.args),
    };
    if !args.is_empty() {
        execute!(
            stdout,
            SetForegroundColor(Color::White),
            Print("║  Args:                                                   ║\n"),
        )?;
    }
    for (number, (key, value)) in args.iter().enumerate() {
        let changed = state
            .original_args()
            .get(key)
            .is_some_and(|original| original != value);
        let marker = if changed { "*" } else { " " };
        let line = format!("[{}]{} {}: {}", number + 1, marker, key, value);
        execute!(
            stdout,
            SetForegroundColor(if changed { Color::Blue } else { Color::DarkGrey }),
            Print(format!("║    {:<54}║\n", truncate(&line, 54))),
        )?;
    }

    if state.has_added_response() {
        let reason = state.reject_message().unwrap_or_default();
        execute!(
            stdout,
            SetForegroundColor(Color::Red),
            Print(format!("║  Reason:  {:<47}║\n", truncate(reason, 47))),
        )?;
    }

    let selected = state
        .selected()
        .map(|decision| decision.to_string())
        .unwrap_or_else(|| "none".to_string());
    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print("║                                                          ║\n"),
        Print(format!("║  Submit sends: {:<42}║\n", selected)),
        Print("╚══════════════════════════════════════════════════════════╝\n"),
        ResetColor,
    )?;
    stdout.flush()?;
    Ok(())
}

fn draw_progress(batch: &BatchController) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, Print("\n  "))?;
    for index in 0..batch.len() {
        let (label, color) = match batch.decision_status(index) {
            Some(DecisionType::Approve) => ("✓", Color::Green),
            Some(DecisionType::Edit) => ("✎", Color::Blue),
            Some(DecisionType::Reject) => ("✗", Color::Red),
            None => ("·", Color::DarkGrey),
        };
        let cursor = if index == batch.current_index() { ">" } else { " " };
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("{}{}{} ", cursor, index + 1, label)),
        )?;
    }
    execute!(
        stdout,
        SetForegroundColor(Color::DarkGrey),
        Print(format!(" ({} remaining)\n", batch.remaining())),
        ResetColor,
    )?;
    Ok(())
}

fn draw_keys(keys: &[(&str, &str, Color)]) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, Print("  "))?;
    for (key, label, color) in keys {
        execute!(
            stdout,
            SetForegroundColor(*color),
            Print(format!("[{}] {}  ", key, label)),
        )?;
    }
    execute!(stdout, ResetColor, Print("\n"))?;
    stdout.flush()?;
    Ok(())
}

fn flush_notice<R: Reviewing>(review: &mut R) -> Result<()> {
    let Some(notice) = review.take_notice() else {
        return Ok(());
    };
    let mut stdout = std::io::stdout();
    if notice.is_error() {
        execute!(
            stdout,
            SetForegroundColor(Color::Red),
            Print(format!("\n  ✗ {}\n", notice)),
            ResetColor,
        )?;
    } else {
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print(format!("\n  ✓ {}\n", notice.description)),
            ResetColor,
        )?;
    }
    stdout.flush()?;
    Ok(())
}

fn print_error(message: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        SetForegroundColor(Color::Red),
        Print(format!("\n  ✗ {}\n", message)),
        ResetColor,
    )?;
    Ok(())
}

/// Interrupts that are not tool-call reviews are shown raw.
fn show_fallback(interrupt: &Interrupt) -> Result<()> {
    let mut stdout = std::io::stdout();
    let pretty = serde_json::to_string_pretty(&interrupt.value)?;
    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print("\n  This interrupt is not an action review. Raw value:\n\n"),
        SetForegroundColor(Color::DarkGrey),
        Print(pretty),
        Print("\n\n"),
        ResetColor,
    )?;
    Ok(())
}
