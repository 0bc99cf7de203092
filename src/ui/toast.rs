//! Transient notification shown in the top-right corner.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ToastMessage {
    title: String,
    description: String,
    expires_at: Duration,
}

pub struct Toast {
    duration: Duration,
    message: Option<ToastMessage>,
}

impl Toast {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            message: None,
        }
    }

    /// Show a message, replacing any current one
    pub fn show(&mut self, title: &str, description: &str, now: Duration) {
        self.message = Some(ToastMessage {
            title: title.to_string(),
            description: description.to_string(),
            expires_at: now + self.duration,
        });
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.title.as_str())
    }

    /// Drop the message once it has expired
    pub fn poll(&mut self, now: Duration) {
        if self.message.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.message = None;
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let Some(ref message) = self.message else {
            return;
        };

        let full = frame.area();
        let width = (message.description.chars().count() as u16 + 6)
            .max(message.title.chars().count() as u16 + 6)
            .min(full.width);
        let area = Rect {
            x: full.x + full.width.saturating_sub(width + 1),
            y: full.y + 1,
            width,
            height: 4,
        }
        .intersection(full);
        if area.is_empty() {
            return;
        }

        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(Span::styled(
                format!("✓ {}", message.title),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                message.description.clone(),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            ),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_duration() {
        let mut toast = Toast::new(Duration::from_millis(3000));
        toast.show("OTP Verified", "Security verification successful", Duration::from_millis(500));
        assert_eq!(toast.title(), Some("OTP Verified"));

        toast.poll(Duration::from_millis(3499));
        assert!(toast.is_visible());

        toast.poll(Duration::from_millis(3500));
        assert!(!toast.is_visible());
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let mut toast = Toast::new(Duration::from_millis(1000));
        toast.show("a", "first", Duration::ZERO);
        toast.show("b", "second", Duration::from_millis(800));

        toast.poll(Duration::from_millis(1500));
        assert_eq!(toast.title(), Some("b"));
    }

    #[test]
    fn test_dismiss() {
        let mut toast = Toast::new(Duration::from_secs(1));
        toast.show("a", "b", Duration::ZERO);
        toast.dismiss();
        assert!(!toast.is_visible());
    }

    #[test]
    fn test_render_fits_short_terminals() {
        use ratatui::{backend::TestBackend, Terminal};

        for height in 1..=5 {
            let mut toast = Toast::new(Duration::from_secs(3));
            toast.show("OTP Verified", "Security verification successful", Duration::ZERO);

            let mut terminal = Terminal::new(TestBackend::new(80, height)).unwrap();
            terminal.draw(|f| toast.render(f)).unwrap();
        }

        let mut toast = Toast::new(Duration::from_secs(3));
        toast.show("OTP Verified", "Security verification successful", Duration::ZERO);
        let mut terminal = Terminal::new(TestBackend::new(80, 6)).unwrap();
        terminal.draw(|f| toast.render(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("OTP Verified"));
    }
}
