//! TUI state algebra: actions, transitions, and the model capability.
//!
//! Every interactive view (the main session shell and the per-step
//! confirmation prompt) is a [`Model`]: a value that consumes an
//! [`Action`] and yields its successor plus an optional [`Effect`], and
//! that can describe itself as styled text. The runner drives any model
//! through the same loop.

use ratatui::text::Text;

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic user action, decoupled from raw key events.
///
/// The effects layer maps key presses to Actions. Each model decides what
/// an Action means for it and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the highlight up.
    MoveUp,
    /// Move the highlight down.
    MoveDown,
    /// Select the highlighted option / launch.
    Confirm,
    /// Expand or collapse the help panel.
    ToggleHelp,
    /// Abandon the session.
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Side effect requested by a pure transition.
///
/// Models never act on these; the runner interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<O> {
    /// Stop driving this model and end the interactive loop.
    Quit,
    /// Hand a result to whoever is driving this model.
    Emit(O),
}

/// Result of a pure state transition: the next model and what, if
/// anything, the runner should do about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<M, O> {
    pub next: M,
    pub effect: Option<Effect<O>>,
}

impl<M, O> Transition<M, O> {
    /// Move to `next` with no effect.
    pub fn stay(next: M) -> Self {
        Transition { next, effect: None }
    }

    /// Move to `next` and end the loop.
    pub fn quit(next: M) -> Self {
        Transition {
            next,
            effect: Some(Effect::Quit),
        }
    }

    /// Move to `next` and emit `output`.
    pub fn emit(next: M, output: O) -> Self {
        Transition {
            next,
            effect: Some(Effect::Emit(output)),
        }
    }
}

// ============================================================================
// MODEL CAPABILITY
// ============================================================================

/// Anything the runner can drive: a pure transition plus a pure render.
pub trait Model: Sized {
    /// What this model hands back through [`Effect::Emit`].
    type Output;

    /// Apply one action. Must not perform I/O.
    fn update(self, action: &Action) -> Transition<Self, Self::Output>;

    /// Describe the current state as styled text.
    fn view(&self) -> Text<'static>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_the_expected_effect() {
        assert_eq!(Transition::<u8, ()>::stay(1).effect, None);
        assert_eq!(Transition::<u8, ()>::quit(2).effect, Some(Effect::Quit));
        let emitted = Transition::emit(3u8, "done");
        assert_eq!(emitted.next, 3);
        assert_eq!(emitted.effect, Some(Effect::Emit("done")));
    }

    #[test]
    fn effect_variants_are_distinguishable() {
        assert_ne!(Effect::<u8>::Quit, Effect::Emit(0));
        assert_ne!(Effect::Emit(1), Effect::Emit(2));
    }
}
