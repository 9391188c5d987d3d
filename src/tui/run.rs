//! TUI effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! This is the only module with side effects. It wires the pure models
//! (session shell, step prompt) to the real terminal via crossterm and
//! ratatui.
//!
//! Threads:
//! - Key reader: polls crossterm and forwards key presses over mpsc.
//! - Event loop (caller's thread): one key at a time, update then redraw.
//!
//! The loop also watches a [`CancellationToken`] at every tick boundary.
//! Once it is cancelled the loop stops reading input, the key reader is
//! told to stop, and the terminal is restored before returning.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::text::Text;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::workflow::{
    Decision, PromptOutcome, Step, StepExecutor, WorkflowEnd, WorkflowPlan, run_workflow,
};

use super::prompt::StepPrompt;
use super::session::{SessionModel, SessionRequest};
use super::state::{Action, Effect, Model, Transition};
use super::theme::Theme;
use super::view::{plain_lines, render};

/// Longest the loop waits before re-checking for cancellation.
pub const TICK: Duration = Duration::from_millis(50);

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a semantic Action.
///
/// Returns None for keys that don't map to any action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
///
/// Raw mode is undone if any later setup step fails.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let terminal = io::stdout()
        .execute(EnterAlternateScreen)
        .and_then(|_| Terminal::new(CrosstermBackend::new(io::stdout())));
    restore_on_error(terminal, restore_terminal)
}

/// Run `restore` when `result` is an error, keeping the original error.
fn restore_on_error<T>(
    result: io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    result.inspect_err(|_| {
        // Best-effort: the setup error is the one worth reporting
        let _ = restore();
    })
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// KEY READER
// ============================================================================

/// Spawn a thread that forwards key presses until `stop` is cancelled or
/// the receiver is dropped.
fn spawn_key_reader(
    tx: mpsc::Sender<KeyEvent>,
    stop: CancellationToken,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("key-reader".into())
        .spawn(move || {
            while !stop.is_cancelled() {
                match event::poll(TICK) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        warn!(error = %e, "terminal poll failed");
                        break;
                    }
                }
                match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(key).is_err() {
                            break; // receiver dropped, TUI is shutting down
                        }
                    }
                    Ok(_) => {} // ignore releases, mouse, resize, etc.
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                }
            }
            debug!("key reader stopped");
        })
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Why [`drive`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit<O> {
    /// The model emitted a result.
    Emitted(O),
    /// The model asked to quit.
    Quit,
    /// The cancellation token fired.
    Cancelled,
}

/// The model as it was when the loop stopped, and why it stopped.
#[derive(Debug)]
pub struct Finished<M: Model> {
    pub model: M,
    pub exit: LoopExit<M::Output>,
}

/// Draw `model`, then feed it keys until it quits, emits, or `cancel`
/// fires.
///
/// Each key is fully handled (update, redraw) before the next is read.
/// Unmapped keys are dropped. The final state is drawn before returning.
pub fn drive<M, B>(
    terminal: &mut Terminal<B>,
    mut model: M,
    keys: &mpsc::Receiver<KeyEvent>,
    cancel: &CancellationToken,
) -> Result<Finished<M>, SessionError>
where
    M: Model,
    B: Backend,
    SessionError: From<B::Error>,
{
    draw(terminal, &model)?;

    loop {
        let Some(key) = next_key(keys, cancel)? else {
            return Ok(Finished {
                model,
                exit: LoopExit::Cancelled,
            });
        };
        let Some(action) = map_key(key) else {
            continue;
        };

        let Transition { next, effect } = model.update(&action);
        model = next;
        draw(terminal, &model)?;

        match effect {
            None => {}
            Some(Effect::Quit) => {
                return Ok(Finished {
                    model,
                    exit: LoopExit::Quit,
                });
            }
            Some(Effect::Emit(output)) => {
                return Ok(Finished {
                    model,
                    exit: LoopExit::Emitted(output),
                });
            }
        }
    }
}

/// Block for the next key, waking every [`TICK`] to check `cancel`.
///
/// Returns `Ok(None)` once cancelled.
fn next_key(
    keys: &mpsc::Receiver<KeyEvent>,
    cancel: &CancellationToken,
) -> Result<Option<KeyEvent>, SessionError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        match keys.recv_timeout(TICK) {
            Ok(key) => return Ok(Some(key)),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                // A reader that died mid-cancellation is not an input failure
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                return Err(SessionError::InputClosed);
            }
        }
    }
}

fn draw<M, B>(terminal: &mut Terminal<B>, model: &M) -> Result<(), SessionError>
where
    M: Model,
    B: Backend,
    SessionError: From<B::Error>,
{
    let view = model.view();
    terminal.draw(|frame| render(view, frame))?;
    Ok(())
}

// ============================================================================
// SESSION
// ============================================================================

/// How the interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator quit.
    Quit,
    /// A termination signal cancelled the session.
    Cancelled,
}

/// Session end plus the closing notice to leave on the normal screen.
///
/// The alternate screen is discarded on restore, so the caller prints
/// `notice` once the terminal is back in cooked mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closing {
    pub end: SessionEnd,
    /// Plain text of the quitting model's last view; `None` when cancelled.
    pub notice: Option<String>,
}

impl Closing {
    fn cancelled() -> Self {
        Closing {
            end: SessionEnd::Cancelled,
            notice: None,
        }
    }

    fn quit(view: &Text<'_>) -> Self {
        let notice = plain_lines(view)
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        Closing {
            end: SessionEnd::Quit,
            notice: Some(notice),
        }
    }
}

/// Run the interactive session until the operator quits or `cancel` fires.
///
/// This is the main entry point for the TUI. The terminal is restored on
/// every path out, including errors.
pub fn run(
    config: &Config,
    theme: &Theme,
    executor: &mut dyn StepExecutor,
    cancel: CancellationToken,
) -> Result<Closing, SessionError> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let (tx, rx) = mpsc::channel::<KeyEvent>();
    let stop_reader = cancel.child_token();
    let reader = match spawn_key_reader(tx, stop_reader.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            let _ = restore_terminal();
            return Err(e.into());
        }
    };

    info!(command = %config.command, analysis_id = %config.id, "session started");
    let result = session_loop(&mut terminal, config, theme, executor, &rx, &cancel);

    stop_reader.cancel();
    if reader.join().is_err() {
        warn!("key reader panicked");
    }
    restore_terminal()?;

    match &result {
        Ok(closing) => info!(end = ?closing.end, "session ended"),
        Err(e) => warn!(error = %e, "session failed"),
    }
    result
}

/// Alternate between the session shell and workflow runs.
fn session_loop<B>(
    terminal: &mut Terminal<B>,
    config: &Config,
    theme: &Theme,
    executor: &mut dyn StepExecutor,
    keys: &mpsc::Receiver<KeyEvent>,
    cancel: &CancellationToken,
) -> Result<Closing, SessionError>
where
    B: Backend,
    SessionError: From<B::Error>,
{
    let mut shell = SessionModel::new(config, theme);

    loop {
        let Finished { model, exit } = drive(terminal, shell, keys, cancel)?;
        shell = model;

        match exit {
            LoopExit::Quit => return Ok(Closing::quit(&shell.view())),
            LoopExit::Cancelled => return Ok(Closing::cancelled()),
            LoopExit::Emitted(SessionRequest::RunWorkflow) => {
                let plan = WorkflowPlan::from_config(config);
                if plan.is_empty() {
                    shell.note("No targets configured: pass -emails, -ips, -urls or -webpages");
                    continue;
                }

                let mut farewell = None;
                let report = run_workflow(&plan, executor, |step, number, total| {
                    let Finished { model, exit } =
                        confirm_step(terminal, theme, keys, cancel, step, number, total)?;
                    if model.is_quitting() {
                        farewell = Some(model.view());
                    }
                    Ok::<_, SessionError>(PromptOutcome::from(exit))
                })?;

                match report.end {
                    WorkflowEnd::Abandoned => {
                        let view = farewell.unwrap_or_else(|| shell.view());
                        return Ok(Closing::quit(&view));
                    }
                    WorkflowEnd::Cancelled => return Ok(Closing::cancelled()),
                    WorkflowEnd::Completed | WorkflowEnd::Exited => shell.record_run(&report),
                }
            }
        }
    }
}

impl From<LoopExit<Decision>> for PromptOutcome {
    fn from(exit: LoopExit<Decision>) -> Self {
        match exit {
            LoopExit::Emitted(decision) => PromptOutcome::Decided(decision),
            LoopExit::Quit => PromptOutcome::Abandoned,
            LoopExit::Cancelled => PromptOutcome::Cancelled,
        }
    }
}

/// Drive one confirmation prompt to its end.
fn confirm_step<'t, B>(
    terminal: &mut Terminal<B>,
    theme: &'t Theme,
    keys: &mpsc::Receiver<KeyEvent>,
    cancel: &CancellationToken,
    step: &Step,
    number: usize,
    total: usize,
) -> Result<Finished<StepPrompt<'t>>, SessionError>
where
    B: Backend,
    SessionError: From<B::Error>,
{
    let prompt = StepPrompt::new(theme, step.description(), number, total);
    drive(terminal, prompt, keys, cancel)
}

// ============================================================================
// TESTS
// ============================================================================
