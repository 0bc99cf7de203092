use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

use super::centered_rect;
use crate::otp::{OtpInput, CODE_LENGTH};

pub const OTP_TITLE: &str = "Security Verification Required";
pub const OTP_DESCRIPTION: &str = "Please enter the 6-digit OTP to continue the workflow execution.";

/// Which button Enter activates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtpFocus {
    #[default]
    Submit,
    Resend,
}

/// Outcome of activating the focused button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpAction {
    /// Nothing happened (e.g. submit while incomplete)
    None,
    /// Simulated verification started
    Verifying,
    /// Resend was requested
    Resend,
}

/// Dialog collecting the one-time code for the gated step
pub struct OtpDialog {
    pub visible: bool,
    pub focus: OtpFocus,
    input: OtpInput,
}

impl OtpDialog {
    pub fn new(verify_delay: Duration) -> Self {
        Self {
            visible: false,
            focus: OtpFocus::default(),
            input: OtpInput::new(verify_delay),
        }
    }

    pub fn code(&self) -> &str {
        self.input.code()
    }

    pub fn is_verifying(&self) -> bool {
        self.input.is_verifying()
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.focus = OtpFocus::Submit;
    }

    /// Close without discarding typed digits
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Close and forget everything, including an in-flight verification
    pub fn reset(&mut self) {
        self.visible = false;
        self.focus = OtpFocus::Submit;
        self.input.clear();
    }

    pub fn handle_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.input.paste(text);
    }

    pub fn handle_backspace(&mut self) {
        self.input.backspace();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            OtpFocus::Submit => OtpFocus::Resend,
            OtpFocus::Resend => OtpFocus::Submit,
        };
    }

    /// Press the focused button
    pub fn activate(&mut self, now: Duration) -> OtpAction {
        match self.focus {
            OtpFocus::Submit if self.input.submit(now) => OtpAction::Verifying,
            OtpFocus::Submit => OtpAction::None,
            OtpFocus::Resend => {
                self.input.resend();
                OtpAction::Resend
            }
        }
    }

    /// Code that finished verifying. The dialog closes when one is released.
    pub fn poll(&mut self, now: Duration) -> Option<String> {
        let code = self.input.poll(now)?;
        self.hide();
        Some(code)
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" 🛡 {} ", OTP_TITLE))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Description
                Constraint::Length(3), // Digit slots
                Constraint::Length(1),
                Constraint::Length(1), // Submit
                Constraint::Length(1), // Resend
                Constraint::Min(0),
                Constraint::Length(1), // Instructions
            ])
            .margin(1)
            .split(inner);

        frame.render_widget(
            Paragraph::new(OTP_DESCRIPTION)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        frame.render_widget(
            Paragraph::new(self.slots()).alignment(Alignment::Center),
            chunks[1],
        );

        let submit_focused = self.focus == OtpFocus::Submit;
        let submit_label = if self.is_verifying() {
            " ⟳ Verifying... ".to_string()
        } else {
            " Submit OTP ".to_string()
        };
        let submit_style = if !self.input.can_submit() && !self.is_verifying() {
            Style::default().fg(Color::DarkGray)
        } else if submit_focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(submit_label, submit_style)).alignment(Alignment::Center),
            chunks[3],
        );

        let resend_style = if self.focus == OtpFocus::Resend {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(Span::styled("Didn't receive code? Resend OTP", resend_style))
                .alignment(Alignment::Center),
            chunks[4],
        );

        let instructions = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" switch  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" activate  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" close"),
        ]);
        frame.render_widget(
            Paragraph::new(instructions).alignment(Alignment::Center),
            chunks[6],
        );
    }

    /// One boxed slot per digit, the next empty slot highlighted
    fn slots(&self) -> Vec<Line<'static>> {
        let digits: Vec<char> = self.code().chars().collect();
        let mut top = Vec::with_capacity(CODE_LENGTH);
        let mut mid = Vec::with_capacity(CODE_LENGTH);
        let mut bottom = Vec::with_capacity(CODE_LENGTH);

        for i in 0..CODE_LENGTH {
            let style = if i < digits.len() {
                Style::default().fg(Color::Cyan)
            } else if i == digits.len() && !self.is_verifying() {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let digit = digits.get(i).copied().unwrap_or(' ');
            top.push(Span::styled("┌───┐ ", style));
            mid.push(Span::styled(format!("│ {} │ ", digit), style));
            bottom.push(Span::styled("└───┘ ", style));
        }

        vec![Line::from(top), Line::from(mid), Line::from(bottom)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog() -> OtpDialog {
        let mut dialog = OtpDialog::new(Duration::from_millis(1000));
        dialog.show();
        dialog
    }

    #[test]
    fn test_otp_dialog_new_is_hidden() {
        let dialog = OtpDialog::new(Duration::from_millis(1000));
        assert!(!dialog.visible);
        assert_eq!(dialog.code(), "");
        assert_eq!(dialog.focus, OtpFocus::Submit);
    }

    #[test]
    fn test_otp_dialog_keeps_digits_only() {
        let mut dialog = dialog();
        for c in "4x2-7".chars() {
            dialog.handle_char(c);
        }
        dialog.handle_paste("1 9 3 8");
        assert_eq!(dialog.code(), "427193");

        dialog.handle_backspace();
        assert_eq!(dialog.code(), "42719");
    }

    #[test]
    fn test_otp_dialog_submit_disabled_until_complete() {
        let mut dialog = dialog();
        dialog.handle_paste("12345");
        assert_eq!(dialog.activate(Duration::ZERO), OtpAction::None);
        assert!(!dialog.is_verifying());
    }

    #[test]
    fn test_otp_dialog_releases_code_after_delay_and_closes() {
        let mut dialog = dialog();
        dialog.handle_paste("123456");
        assert_eq!(dialog.activate(Duration::ZERO), OtpAction::Verifying);

        assert_eq!(dialog.poll(Duration::from_millis(999)), None);
        assert!(dialog.visible);

        assert_eq!(
            dialog.poll(Duration::from_millis(1000)),
            Some("123456".to_string())
        );
        assert!(!dialog.visible);
    }

    #[test]
    fn test_otp_dialog_tab_switches_to_resend() {
        let mut dialog = dialog();
        dialog.handle_paste("123456");
        dialog.toggle_focus();
        assert_eq!(dialog.focus, OtpFocus::Resend);

        assert_eq!(dialog.activate(Duration::ZERO), OtpAction::Resend);
        assert!(!dialog.is_verifying());
        assert_eq!(dialog.code(), "123456");

        dialog.toggle_focus();
        assert_eq!(dialog.focus, OtpFocus::Submit);
    }

    #[test]
    fn test_otp_dialog_hide_keeps_digits_reset_clears() {
        let mut dialog = dialog();
        dialog.handle_paste("123");
        dialog.hide();
        assert_eq!(dialog.code(), "123");

        dialog.show();
        dialog.reset();
        assert!(!dialog.visible);
        assert_eq!(dialog.code(), "");
    }

    #[test]
    fn test_otp_dialog_slots_show_typed_digits() {
        let mut dialog = dialog();
        dialog.handle_paste("98");
        let slots = dialog.slots();
        assert_eq!(slots.len(), 3);
        let mid: String = slots[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(mid.starts_with("│ 9 │ │ 8 │ │   │"));
    }
}
