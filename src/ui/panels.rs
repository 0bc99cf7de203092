use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

use crate::reveal::Typewriter;
use crate::workflow::{Step, StepStatus, WorkflowRun};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub const SUBTITLE: &str = "Experience a futuristic AI agent workflow with real-time status updates, security verification, and intelligent responses.";

/// Spinner glyph for the given clock reading
pub fn spinner_frame(now: Duration) -> char {
    let index = (now.as_millis() / 100) as usize % SPINNER.len();
    SPINNER[index]
}

fn status_color(status: StepStatus) -> Color {
    match status {
        StepStatus::Complete => Color::Green,
        StepStatus::Active | StepStatus::Loading => Color::Cyan,
        StepStatus::Pending => Color::DarkGray,
    }
}

fn status_icon(status: StepStatus, now: Duration) -> char {
    match status {
        StepStatus::Complete => '✓',
        StepStatus::Active => '●',
        StepStatus::Loading => spinner_frame(now),
        StepStatus::Pending => '◷',
    }
}

pub struct HeaderBar {
    pub running: bool,
}

impl HeaderBar {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let button = if self.running {
            Span::styled(
                " ⚡ Workflow Active ",
                Style::default().fg(Color::Black).bg(Color::DarkGray),
            )
        } else {
            Span::styled(
                " ▶ Initiate Workflow ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        };

        let lines = vec![
            Line::from(Span::styled(
                "Agentic Workflow System",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(button),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// One card per step, in catalog order
pub struct StepsPanel<'a> {
    pub run: &'a WorkflowRun,
    pub now: Duration,
}

impl<'a> StepsPanel<'a> {
    /// Rows a step card needs, borders included
    fn card_height(&self, index: usize, step: &Step) -> u16 {
        let description = u16::from(step.description.is_some());
        let sub_steps = self.run.visible_sub_steps(index).len() as u16;
        3 + description + sub_steps
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.run.is_running() {
            Line::from(vec![
                Span::raw(" Workflow Progress "),
                Span::styled("[r] Reset ", Style::default().fg(Color::Yellow)),
            ])
        } else {
            Line::from(" Workflow Progress ")
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let steps = self.run.steps();
        let mut constraints: Vec<Constraint> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| Constraint::Length(self.card_height(i, step)))
            .collect();
        constraints.push(Constraint::Min(0));

        let cards = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, step) in steps.iter().enumerate() {
            self.render_card(frame, cards[i], i, step);
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, index: usize, step: &Step) {
        let status = step.status();
        let color = status_color(status);

        let mut title_style = Style::default().fg(color);
        if status.is_in_progress() {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{} ", status_icon(status, self.now)),
                Style::default().fg(color),
            ),
            Span::styled(step.title.clone(), title_style),
        ])];

        if let Some(ref description) = step.description {
            lines.push(Line::from(Span::styled(
                format!("  {}", description),
                Style::default().fg(Color::Gray),
            )));
        }

        for sub_step in self.run.visible_sub_steps(index) {
            lines.push(Line::from(vec![
                Span::styled("    • ", Style::default().fg(Color::Cyan)),
                Span::styled(sub_step.clone(), Style::default().fg(Color::Gray)),
            ]));
        }

        let card = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(card, area);
    }
}

/// Final response with the typewriter reveal. Only drawn when a response exists.
pub struct ResponsePanel<'a> {
    pub typewriter: &'a Typewriter,
}

impl<'a> ResponsePanel<'a> {
    pub fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(
            " 🤖 Agent Response ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if !self.typewriter.is_revealing() {
            spans.push(Span::styled("✓ ", Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            self.typewriter.displayed().to_string(),
            Style::default().fg(Color::White),
        )];
        if self.typewriter.shows_cursor() {
            spans.push(Span::styled(
                crate::reveal::CURSOR.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        let panel = Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .title(self.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(panel, area);
    }
}

pub struct StatusBar {
    pub running: bool,
    pub pending_confirmation: bool,
    pub dialog_open: bool,
}

impl StatusBar {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status = if self.pending_confirmation {
            Span::styled("🛡 AWAITING OTP", Style::default().fg(Color::Yellow))
        } else if self.running {
            Span::styled("⚡ RUNNING", Style::default().fg(Color::Cyan))
        } else {
            Span::styled("○ IDLE", Style::default().fg(Color::Gray))
        };

        let mut hint = if self.running {
            String::from("  [r]eset")
        } else {
            String::from("  [s]tart")
        };
        if self.pending_confirmation && !self.dialog_open {
            hint.push_str(" [o]tp");
        }
        hint.push_str(" [?]help [q]uit");

        let content = Line::from(vec![
            status,
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]);

        let bar = Paragraph::new(content).block(Block::default().borders(Borders::TOP));
        frame.render_widget(bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ManualClock, WorkflowController, WorkflowTimings};
    use std::sync::Arc;

    #[test]
    fn test_spinner_cycles_with_clock() {
        assert_eq!(spinner_frame(Duration::ZERO), '⠋');
        assert_eq!(spinner_frame(Duration::from_millis(150)), '⠙');
        assert_eq!(spinner_frame(Duration::from_millis(1000)), '⠋');
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon(StepStatus::Complete, Duration::ZERO), '✓');
        assert_eq!(status_icon(StepStatus::Active, Duration::ZERO), '●');
        assert_eq!(status_icon(StepStatus::Pending, Duration::ZERO), '◷');
        assert!(SPINNER.contains(&status_icon(StepStatus::Loading, Duration::ZERO)));
    }

    #[test]
    fn test_active_card_grows_by_sub_steps() {
        let clock = ManualClock::new();
        let mut controller =
            WorkflowController::new(Arc::new(clock.clone()), WorkflowTimings::default());
        controller.start().unwrap();
        clock.advance_ms(2000);
        controller.poll();

        let panel = StepsPanel {
            run: controller.run(),
            now: Duration::ZERO,
        };
        let steps = controller.steps();
        assert_eq!(panel.card_height(0, &steps[0]), 4);
        assert_eq!(panel.card_height(1, &steps[1]), 7);
    }

    #[test]
    fn test_response_title_check_mark_after_reveal() {
        let mut typewriter = Typewriter::new(Duration::from_millis(30));
        typewriter.set_revealing(true, Duration::ZERO);
        typewriter.set_source("done", Duration::ZERO);
        let title = |tw: &Typewriter| -> String {
            ResponsePanel { typewriter: tw }
                .title()
                .spans
                .iter()
                .map(|s| s.content.to_string())
                .collect()
        };
        assert!(!title(&typewriter).contains('✓'));

        typewriter.set_revealing(false, Duration::ZERO);
        assert!(title(&typewriter).contains('✓'));
    }
}
