//! Step-confirmation prompt: Continue / Skip / Exit for one workflow step.
//!
//! States: Active → Quitting (terminal). While Active the highlight moves
//! circularly over the three options and Confirm emits the highlighted
//! [`Decision`]. A quit key ends the prompt without a decision.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span, Text};

use crate::workflow::Decision;

use super::state::{Action, Model, Transition};
use super::theme::Theme;

/// Key hint shown under the options.
const KEY_HINT: &str = "↑/↓: navigate • enter: select • q: quit";

/// Closing notice after a quit key.
const TERMINATED_NOTICE: &str = "Process terminated by user";

/// Confirmation prompt for one workflow step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPrompt<'a> {
    description: String,
    step_number: usize,
    total_steps: usize,
    selected: Decision,
    quitting: bool,
    theme: &'a Theme,
}

impl<'a> StepPrompt<'a> {
    /// Fresh prompt for step `step_number` of `total_steps`, highlighting
    /// Continue.
    pub fn new(
        theme: &'a Theme,
        description: impl Into<String>,
        step_number: usize,
        total_steps: usize,
    ) -> Self {
        StepPrompt {
            description: description.into(),
            step_number,
            total_steps,
            selected: Decision::Continue,
            quitting: false,
            theme,
        }
    }

    pub fn selected(&self) -> Decision {
        self.selected
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    fn option_line(&self, option: Decision) -> Line<'static> {
        let is_selected = option == self.selected;
        let cursor = if is_selected {
            Span::styled(">", self.theme.title)
        } else {
            Span::raw(" ")
        };

        let mut style = match option {
            Decision::Continue => self.theme.safe,
            Decision::Skip => self.theme.warning,
            Decision::Exit => self.theme.danger,
        };
        if is_selected {
            style = style.add_modifier(Modifier::BOLD);
        }

        Line::from(vec![cursor, Span::raw(" "), Span::styled(option.label(), style)])
    }
}

impl Model for StepPrompt<'_> {
    type Output = Decision;

    fn update(mut self, action: &Action) -> Transition<Self, Decision> {
        if self.quitting {
            return Transition::stay(self);
        }

        match action {
            Action::MoveUp => {
                self.selected = self.selected.previous();
                Transition::stay(self)
            }
            Action::MoveDown => {
                self.selected = self.selected.next();
                Transition::stay(self)
            }
            Action::Confirm => {
                let decision = self.selected;
                Transition::emit(self, decision)
            }
            Action::Quit => {
                self.quitting = true;
                Transition::quit(self)
            }
            Action::ToggleHelp => Transition::stay(self),
        }
    }

    fn view(&self) -> Text<'static> {
        if self.quitting {
            return Text::from(Line::styled(
                format!(" {TERMINATED_NOTICE} "),
                self.theme.status_bar,
            ));
        }

        let mut lines = vec![
            Line::styled(
                format!(" Step {} of {} ", self.step_number, self.total_steps),
                self.theme.status_bar,
            ),
            Line::from(""),
            Line::styled(self.description.clone(), self.theme.command_bar),
            Line::from(""),
        ];
        lines.extend(Decision::ALL.iter().map(|&option| self.option_line(option)));
        lines.push(Line::from(""));
        lines.push(Line::styled(KEY_HINT, self.theme.help));

        Text::from(lines)
    }
}

// ============================================================================
// TESTS
// ============================================================================
