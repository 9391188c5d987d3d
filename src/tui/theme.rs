//! TUI color semantics and style roles.
//!
//! One [`Theme`] value is built at startup and lent to every renderer.
//! Nothing here is mutable.
//!
//! Color semantics (Kanagawa palette):
//! - Green: continue / safe
//! - Yellow: skip / attention
//! - Red: exit / errors, the higher-risk choice
//! - Blue: titles and the selection cursor
//! - Purple: the banner
//! - Gray: key-binding hints

use crossterm::style::{Attribute, StyledContent, Stylize};
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// PALETTE
// ============================================================================

/// Kanagawa color palette.
pub mod kanagawa {
    use ratatui::style::Color;

    pub const FOREGROUND: Color = Color::Rgb(0xDC, 0xD7, 0xBA);
    pub const SELECTION: Color = Color::Rgb(0x2D, 0x4F, 0x67);
    pub const COMMENT: Color = Color::Rgb(0x72, 0x71, 0x69);
    pub const RED: Color = Color::Rgb(0xC3, 0x40, 0x43);
    pub const GREEN: Color = Color::Rgb(0x76, 0x94, 0x6A);
    pub const YELLOW: Color = Color::Rgb(0xC0, 0xA3, 0x6E);
    pub const BLUE: Color = Color::Rgb(0x7E, 0x9C, 0xD8);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);
}

// ============================================================================
// STYLE ROLES
// ============================================================================

/// Semantic roles → rendering attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Titles and the selection cursor.
    pub title: Style,
    /// ASCII banner on the main view.
    pub ascii: Style,
    /// Fatal error messages.
    pub error: Style,
    /// Key-binding hints and the help panel.
    pub help: Style,
    /// Step counter and closing notices.
    pub status_bar: Style,
    /// Active command and step description.
    pub command_bar: Style,
    /// "Continue" option.
    pub safe: Style,
    /// "Skip" option.
    pub warning: Style,
    /// "Exit" option.
    pub danger: Style,
}

impl Theme {
    pub const fn kanagawa() -> Self {
        Theme {
            title: Style::new().fg(kanagawa::BLUE).add_modifier(Modifier::BOLD),
            ascii: Style::new().fg(kanagawa::PURPLE).add_modifier(Modifier::BOLD),
            error: Style::new().fg(kanagawa::RED).add_modifier(Modifier::BOLD),
            help: Style::new().fg(kanagawa::COMMENT),
            status_bar: Style::new().fg(kanagawa::FOREGROUND).bg(kanagawa::SELECTION),
            command_bar: Style::new().fg(kanagawa::GREEN),
            safe: Style::new().fg(kanagawa::GREEN),
            warning: Style::new().fg(kanagawa::YELLOW),
            danger: Style::new().fg(kanagawa::RED),
        }
    }

    /// Style a fatal error for plain stdout, outside the TUI.
    pub fn paint_error(&self, message: &str) -> StyledContent<String> {
        paint(self.error, message)
    }

    /// Style a closing notice for the normal screen after the TUI exits.
    pub fn paint_notice(&self, message: &str) -> StyledContent<String> {
        paint(self.status_bar, message)
    }
}

/// Carry a ratatui style over to crossterm for output outside the TUI.
fn paint(style: Style, message: &str) -> StyledContent<String> {
    let mut styled = message.to_string().stylize();
    if let Some(fg) = style.fg {
        styled = styled.with(to_crossterm(fg));
    }
    if let Some(bg) = style.bg {
        styled = styled.on(to_crossterm(bg));
    }
    if style.add_modifier.contains(Modifier::BOLD) {
        styled = styled.attribute(Attribute::Bold);
    }
    styled
}

fn to_crossterm(color: Color) -> crossterm::style::Color {
    use crossterm::style::Color as Term;
    match color {
        Color::Rgb(r, g, b) => Term::Rgb { r, g, b },
        Color::Red => Term::DarkRed,
        Color::Green => Term::DarkGreen,
        Color::Yellow => Term::DarkYellow,
        Color::Blue => Term::DarkBlue,
        Color::White => Term::White,
        _ => Term::Reset,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_roles_have_distinct_colors() {
        let theme = Theme::kanagawa();
        assert_eq!(theme.safe.fg, Some(kanagawa::GREEN));
        assert_eq!(theme.warning.fg, Some(kanagawa::YELLOW));
        assert_eq!(theme.danger.fg, Some(kanagawa::RED));
        assert_ne!(theme.safe.fg, theme.danger.fg);
    }

    #[test]
    fn error_and_title_are_bold() {
        let theme = Theme::kanagawa();
        assert!(theme.error.add_modifier.contains(Modifier::BOLD));
        assert!(theme.title.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn status_bar_has_background() {
        assert_eq!(Theme::kanagawa().status_bar.bg, Some(kanagawa::SELECTION));
    }

    #[test]
    fn painted_error_keeps_text_and_color() {
        let painted = Theme::kanagawa().paint_error("boom");
        assert_eq!(painted.content(), "boom");
        assert_eq!(
            painted.style().foreground_color,
            Some(crossterm::style::Color::Rgb { r: 0xC3, g: 0x40, b: 0x43 })
        );
        assert!(painted.style().attributes.has(Attribute::Bold));
    }

    #[test]
    fn painted_notice_keeps_the_status_bar_background() {
        let painted = Theme::kanagawa().paint_notice("Goodbye!");
        assert_eq!(painted.content(), "Goodbye!");
        assert_eq!(
            painted.style().background_color,
            Some(crossterm::style::Color::Rgb { r: 0x2D, g: 0x4F, b: 0x67 })
        );
        assert!(!painted.style().attributes.has(Attribute::Bold));
    }
}
