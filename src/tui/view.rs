//! Pure rendering helpers shared by every model.
//!
//! Models describe themselves as [`Text`]; this module puts that text on
//! a frame. The only effect is `Frame::render_widget()`, which writes to
//! the terminal buffer.

use ratatui::Frame;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Paragraph, Wrap};

/// Render a model's view across the whole frame.
pub fn render(view: Text<'static>, frame: &mut Frame) {
    let area = frame.area();
    let paragraph = Paragraph::new(view).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Flatten one line to its unstyled content.
pub fn plain_line(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Flatten text to unstyled lines.
pub fn plain_lines(text: &Text<'_>) -> Vec<String> {
    text.lines.iter().map(plain_line).collect()
}
