//! Main session shell: banner, active command, help panel, run status.
//!
//! States: Running → Quitting (terminal). The shell owns no workflow
//! logic; Enter merely asks the runner to start one for the configured
//! command.

use ratatui::text::{Line, Text};

use crate::config::Config;
use crate::workflow::WorkflowReport;

use super::state::{Action, Model, Transition};
use super::theme::Theme;

const BANNER: &str = r"
:::::::::  :::        ::::::::  :::::::::  :::::::::  :::    ::: ::::::::::: ::::::::  :::    :::
:+:    :+: :+:       :+:    :+: :+:    :+: :+:    :+: :+:    :+:     :+:    :+:    :+: :+:    :+:
+:+    +:+ +:+       +:+    +:+ +:+    +:+ +:+    +:+ +:+    +:+     +:+    +:+        +:+    +:+
+#++:++#+  +#+       +#+    +:+ +#++:++#+  +#++:++#+  +#++:++#++     +#+    +#++:++#++ +#++:++#++
+#+    +#+ +#+       +#+    +#+ +#+    +#+ +#+        +#+    +#+     +#+           +#+ +#+    +#+
#+#    #+# #+#       #+#    #+# #+#    #+# #+#    #+# #+#        #+#    #+#     #+#    #+#    #+#
#########  ########## ########  #########  ###        ###    ### ########### ########  ###    ###
";

const GOODBYE: &str = "Goodbye!";

/// Key bindings listed in the expanded help panel.
const HELP_ENTRIES: [(&str, &str); 3] = [
    ("?", "toggle help"),
    ("enter", "run workflow"),
    ("q", "quit"),
];

/// Request from the shell to its runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    /// Plan and run the workflow for the configured command.
    RunWorkflow,
}

/// Top-level interactive model.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionModel<'a> {
    config: &'a Config,
    theme: &'a Theme,
    help_expanded: bool,
    quitting: bool,
    /// Outcome of the most recent workflow run, or a notice.
    status: Option<String>,
}

impl<'a> SessionModel<'a> {
    pub fn new(config: &'a Config, theme: &'a Theme) -> Self {
        SessionModel {
            config,
            theme,
            help_expanded: false,
            quitting: false,
            status: None,
        }
    }

    pub fn help_expanded(&self) -> bool {
        self.help_expanded
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Remember how the last workflow ended.
    pub fn record_run(&mut self, report: &WorkflowReport) {
        self.status = Some(report.summary());
    }

    /// Show a one-line notice under the command.
    pub fn note(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

impl Model for SessionModel<'_> {
    type Output = SessionRequest;

    fn update(mut self, action: &Action) -> Transition<Self, SessionRequest> {
        if self.quitting {
            return Transition::stay(self);
        }

        match action {
            Action::ToggleHelp => {
                self.help_expanded = !self.help_expanded;
                Transition::stay(self)
            }
            Action::Quit => {
                self.quitting = true;
                Transition::quit(self)
            }
            Action::Confirm if !self.config.command.is_empty() => {
                Transition::emit(self, SessionRequest::RunWorkflow)
            }
            _ => Transition::stay(self),
        }
    }

    fn view(&self) -> Text<'static> {
        if self.quitting {
            return Text::from(Line::styled(format!(" {GOODBYE} "), self.theme.status_bar));
        }

        let mut text = Text::styled(BANNER, self.theme.ascii);
        text.lines.push(Line::from(""));

        if !self.config.command.is_empty() {
            text.lines.push(Line::styled(
                format!("Command: {}", self.config.command),
                self.theme.command_bar,
            ));
        }

        if let Some(status) = &self.status {
            text.lines
                .push(Line::styled(format!(" {status} "), self.theme.status_bar));
        }

        if self.help_expanded {
            text.lines.push(Line::from(""));
            text.lines.extend(HELP_ENTRIES.iter().map(|(key, what)| {
                Line::styled(format!("{key:<6} {what}"), self.theme.help)
            }));
        }

        text
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::state::Effect;
    use crate::tui::view::plain_lines;
    use crate::workflow::{StepKind, StepRecord, StepStatus, WorkflowEnd};

    static THEME: Theme = Theme::kanagawa();

    fn scan_config() -> Config {
        Config {
            command: "scan".to_string(),
            ..Config::default()
        }
    }

    fn lines(model: &SessionModel<'_>) -> Vec<String> {
        plain_lines(&model.view())
    }

    #[test]
    fn starts_running_with_help_collapsed() {
        let config = Config::default();
        let model = SessionModel::new(&config, &THEME);
        assert!(!model.help_expanded());
        assert!(!model.is_quitting());
        assert!(model.status().is_none());
    }

    #[test]
    fn toggle_help_flips_and_stays_running() {
        let config = Config::default();
        let t = SessionModel::new(&config, &THEME).update(&Action::ToggleHelp);
        assert!(t.next.help_expanded());
        assert_eq!(t.effect, None);
        let t = t.next.update(&Action::ToggleHelp);
        assert!(!t.next.help_expanded());
    }

    #[test]
    fn quit_ends_the_loop() {
        let config = Config::default();
        let t = SessionModel::new(&config, &THEME).update(&Action::Quit);
        assert!(t.next.is_quitting());
        assert_eq!(t.effect, Some(Effect::Quit));
    }

    #[test]
    fn quitting_ignores_further_input() {
        let config = scan_config();
        let quitting = SessionModel::new(&config, &THEME).update(&Action::Quit).next;
        for action in [Action::ToggleHelp, Action::Confirm, Action::Quit] {
            let t = quitting.clone().update(&action);
            assert_eq!(t.effect, None);
            assert_eq!(t.next, quitting);
        }
    }

    #[test]
    fn confirm_requests_workflow_only_with_a_command() {
        let with_command = scan_config();
        let t = SessionModel::new(&with_command, &THEME).update(&Action::Confirm);
        assert_eq!(t.effect, Some(Effect::Emit(SessionRequest::RunWorkflow)));

        let without = Config::default();
        let t = SessionModel::new(&without, &THEME).update(&Action::Confirm);
        assert_eq!(t.effect, None);
    }

    #[test]
    fn navigation_keys_are_ignored() {
        let config = scan_config();
        let model = SessionModel::new(&config, &THEME);
        let t = model.clone().update(&Action::MoveDown);
        assert_eq!(t.effect, None);
        assert_eq!(t.next, model);
    }

    #[test]
    fn view_shows_banner_then_command() {
        let config = scan_config();
        let view = lines(&SessionModel::new(&config, &THEME));
        assert!(view.iter().any(|l| l.starts_with(":::::::::")));
        assert_eq!(view.last().unwrap(), "Command: scan");
    }

    #[test]
    fn view_omits_command_line_without_command() {
        let config = Config::default();
        let view = lines(&SessionModel::new(&config, &THEME));
        assert!(!view.iter().any(|l| l.starts_with("Command:")));
    }

    #[test]
    fn expanded_help_lists_bindings_after_command() {
        let config = scan_config();
        let model = SessionModel::new(&config, &THEME)
            .update(&Action::ToggleHelp)
            .next;
        let view = lines(&model);
        let command_at = view.iter().position(|l| l == "Command: scan").unwrap();
        let help_at = view.iter().position(|l| l.starts_with('?')).unwrap();
        assert!(help_at > command_at);
        assert!(view.iter().any(|l| l.starts_with("q") && l.ends_with("quit")));
    }

    #[test]
    fn goodbye_replaces_everything() {
        let config = scan_config();
        let model = SessionModel::new(&config, &THEME)
            .update(&Action::ToggleHelp)
            .next
            .update(&Action::Quit)
            .next;
        let view = lines(&model);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].trim(), GOODBYE);
    }

    #[test]
    fn recorded_run_appears_as_status() {
        let config = scan_config();
        let mut model = SessionModel::new(&config, &THEME);
        model.record_run(&WorkflowReport {
            records: vec![StepRecord {
                kind: StepKind::Combine,
                status: StepStatus::Skipped,
            }],
            end: WorkflowEnd::Exited,
        });
        let expected = "Workflow exited: 0 completed, 0 failed, 1 skipped, 0 not run";
        assert_eq!(model.status(), Some(expected));
        assert!(lines(&model).iter().any(|l| l.trim() == expected));

        model.note("No targets configured");
        assert_eq!(model.status(), Some("No targets configured"));
    }
}
