//! Multi-step analysis workflow: planning, per-step confirmation, execution.
//!
//! A workflow is a fixed list of steps derived from the configuration.
//! Before each step the operator is asked, through a caller-supplied
//! confirmation function, whether to continue, skip, or exit. The actual
//! analysis is opaque to this module and sits behind [`StepExecutor`].
//!
//! Nothing here touches the terminal, so the driver is tested with
//! scripted confirmations.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, TargetKind};

// ============================================================================
// DECISIONS
// ============================================================================

/// Operator decision for one workflow step.
///
/// Doubles as the highlighted option of the confirmation prompt, so the
/// option index can only ever be 0, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Skip,
    Exit,
}

impl Decision {
    /// Menu order.
    pub const ALL: [Decision; 3] = [Decision::Continue, Decision::Skip, Decision::Exit];

    pub fn index(self) -> usize {
        match self {
            Decision::Continue => 0,
            Decision::Skip => 1,
            Decision::Exit => 2,
        }
    }

    /// Next option down the menu, wrapping Exit → Continue.
    pub fn next(self) -> Decision {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous option up the menu, wrapping Continue → Exit.
    pub fn previous(self) -> Decision {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Decision::Continue => "Continue to next step",
            Decision::Skip => "Skip next step",
            Decision::Exit => "Exit process",
        }
    }
}

/// How a confirmation prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The operator confirmed a menu option.
    Decided(Decision),
    /// The operator pressed a quit key: hard stop, no decision.
    Abandoned,
    /// The session was cancelled from outside (termination signal).
    Cancelled,
}

// ============================================================================
// PLAN
// ============================================================================

/// What a step analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Targets(TargetKind),
    /// Correlate findings across every target group.
    Combine,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Targets(kind) => f.write_str(kind.label()),
            StepKind::Combine => f.write_str("combined threats"),
        }
    }
}

/// One unit of analysis work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub targets: Vec<String>,
    pub active_recon: bool,
    pub timeout: Duration,
    pub max_depth: u32,
}

impl Step {
    /// Text shown on the confirmation prompt.
    pub fn description(&self) -> String {
        let mut text = match self.kind {
            StepKind::Targets(kind) => format!(
                "Analyse {} {}: {}",
                self.targets.len(),
                kind.label(),
                self.targets.join(", ")
            ),
            StepKind::Combine => format!(
                "Combine findings across {} target groups",
                self.targets.len()
            ),
        };
        if self.kind == StepKind::Targets(TargetKind::Webpages) {
            text.push_str(&format!(" (crawl depth {})", self.max_depth));
        }
        if self.active_recon && self.kind != StepKind::Combine {
            text.push_str(" [active reconnaissance]");
        }
        text
    }
}

/// Ordered steps for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPlan {
    pub analysis_id: String,
    pub steps: Vec<Step>,
}

impl WorkflowPlan {
    /// One step per non-empty target category, plus a combine step when
    /// requested and there is more than one group to combine.
    pub fn from_config(config: &Config) -> Self {
        let mut steps: Vec<Step> = TargetKind::ALL
            .iter()
            .filter_map(|&kind| {
                let targets = config.target_list(kind);
                if targets.is_empty() {
                    return None;
                }
                Some(Step {
                    kind: StepKind::Targets(kind),
                    targets: targets.into_iter().map(String::from).collect(),
                    active_recon: config.active_recon,
                    timeout: config.timeout(),
                    max_depth: config.max_depth,
                })
            })
            .collect();

        if config.combine && steps.len() > 1 {
            let groups = steps.iter().map(|step| step.kind.to_string()).collect();
            steps.push(Step {
                kind: StepKind::Combine,
                targets: groups,
                active_recon: config.active_recon,
                timeout: config.timeout(),
                max_depth: config.max_depth,
            });
        }

        WorkflowPlan {
            analysis_id: config.id.clone(),
            steps,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// Failure reported by a step executor. Recorded, never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),
}

/// Runs the analysis behind one step.
pub trait StepExecutor {
    fn execute(&mut self, step: &Step) -> Result<(), StepError>;
}

/// Executor that records what would be analysed without contacting any
/// target.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: usize,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps handed to this executor so far.
    pub fn executed(&self) -> usize {
        self.executed
    }
}

impl StepExecutor for DryRunExecutor {
    fn execute(&mut self, step: &Step) -> Result<(), StepError> {
        self.executed += 1;
        info!(
            kind = %step.kind,
            targets = ?step.targets,
            timeout_secs = step.timeout.as_secs(),
            max_depth = step.max_depth,
            "dry run: step not dispatched"
        );
        Ok(())
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Failed(String),
    Skipped,
    NotRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub kind: StepKind,
    pub status: StepStatus,
}

/// Why the workflow stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEnd {
    /// Every step was either run or skipped.
    Completed,
    /// The operator chose "Exit process".
    Exited,
    /// The operator pressed a quit key on a prompt.
    Abandoned,
    /// A termination signal cancelled the session.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub records: Vec<StepRecord>,
    pub end: WorkflowEnd,
}

impl WorkflowReport {
    pub fn count(&self, predicate: impl Fn(&StepStatus) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.status)).count()
    }

    /// One-line summary for the session status bar.
    pub fn summary(&self) -> String {
        let completed = self.count(|s| *s == StepStatus::Completed);
        let failed = self.count(|s| matches!(s, StepStatus::Failed(_)));
        let skipped = self.count(|s| *s == StepStatus::Skipped);
        let not_run = self.count(|s| *s == StepStatus::NotRun);
        let ending = match self.end {
            WorkflowEnd::Completed => "Workflow finished",
            WorkflowEnd::Exited => "Workflow exited",
            WorkflowEnd::Abandoned => "Workflow abandoned",
            WorkflowEnd::Cancelled => "Workflow cancelled",
        };
        format!(
            "{ending}: {completed} completed, {failed} failed, {skipped} skipped, {not_run} not run"
        )
    }
}

// ============================================================================
// DRIVER
// ============================================================================

/// Walk the plan, asking `confirm(step, number, total)` before each step.
///
/// Step numbers are 1-based. Errors from `confirm` abort the run and are
/// returned unchanged; executor failures are recorded and the run goes on.
pub fn run_workflow<E, F>(
    plan: &WorkflowPlan,
    executor: &mut dyn StepExecutor,
    mut confirm: F,
) -> Result<WorkflowReport, E>
where
    F: FnMut(&Step, usize, usize) -> Result<PromptOutcome, E>,
{
    let total = plan.len();
    let mut records = Vec::with_capacity(total);
    let mut end = WorkflowEnd::Completed;

    info!(analysis_id = %plan.analysis_id, steps = total, "workflow started");

    for (i, step) in plan.steps.iter().enumerate() {
        let outcome = confirm(step, i + 1, total)?;
        info!(step = i + 1, kind = %step.kind, ?outcome, "step confirmation");

        let status = match outcome {
            PromptOutcome::Decided(Decision::Continue) => match executor.execute(step) {
                Ok(()) => StepStatus::Completed,
                Err(e) => {
                    warn!(step = i + 1, kind = %step.kind, error = %e, "step failed");
                    StepStatus::Failed(e.to_string())
                }
            },
            PromptOutcome::Decided(Decision::Skip) => StepStatus::Skipped,
            PromptOutcome::Decided(Decision::Exit) => {
                end = WorkflowEnd::Exited;
                StepStatus::NotRun
            }
            PromptOutcome::Abandoned => {
                end = WorkflowEnd::Abandoned;
                StepStatus::NotRun
            }
            PromptOutcome::Cancelled => {
                end = WorkflowEnd::Cancelled;
                StepStatus::NotRun
            }
        };
        records.push(StepRecord {
            kind: step.kind,
            status,
        });

        if end != WorkflowEnd::Completed {
            records.extend(plan.steps[i + 1..].iter().map(|rest| StepRecord {
                kind: rest.kind,
                status: StepStatus::NotRun,
            }));
            break;
        }
    }

    let report = WorkflowReport { records, end };
    info!(analysis_id = %plan.analysis_id, summary = %report.summary(), "workflow ended");
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
