use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::reveal::Typewriter;
use crate::ui::{
    install_panic_hook, HeaderBar, HelpDialog, OtpAction, OtpDialog, ResponsePanel, StatusBar,
    StepsPanel, TerminalGuard, Toast,
};
use crate::workflow::{Clock, TokioClock, WorkflowController, WorkflowEvent};

pub struct App {
    config: Config,
    clock: Arc<dyn Clock>,
    controller: WorkflowController,
    typewriter: Typewriter,
    otp_dialog: OtpDialog,
    help_dialog: HelpDialog,
    toast: Toast,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(TokioClock::new()))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let controller = WorkflowController::new(clock.clone(), config.workflow.timings());
        Self {
            typewriter: Typewriter::new(config.reveal.interval()),
            otp_dialog: OtpDialog::new(config.otp.verify_delay()),
            help_dialog: HelpDialog::new(),
            toast: Toast::new(config.toast_duration()),
            controller,
            clock,
            config,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn otp_dialog(&self) -> &OtpDialog {
        &self.otp_dialog
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let _guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = self.config.refresh_rate();
        info!("TUI started");

        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code);
                    }
                    Event::Paste(text) => self.handle_paste(&text),
                    _ => {}
                }
            }

            self.tick();
        }

        terminal.show_cursor()?;
        info!("TUI exited");
        Ok(())
    }

    /// Advance every time-driven piece of state to the current clock reading
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if let Some(code) = self.otp_dialog.poll(now) {
            if let Err(e) = self.controller.confirm(&code) {
                debug!("Verified code not applied: {}", e);
            }
        }

        self.controller.poll();
        for event in self.controller.drain_events() {
            self.apply_event(event);
        }

        self.typewriter
            .set_revealing(self.controller.is_revealing(), now);
        self.typewriter.poll(now);
        self.toast.poll(now);
    }

    fn apply_event(&mut self, event: WorkflowEvent) {
        let now = self.clock.now();
        match event {
            WorkflowEvent::Started { .. } | WorkflowEvent::Reset { .. } => {
                self.typewriter.clear();
                self.otp_dialog.reset();
                self.toast.dismiss();
            }
            WorkflowEvent::AwaitingConfirmation { .. } => self.otp_dialog.show(),
            WorkflowEvent::ConfirmationAccepted { .. } => {
                self.toast
                    .show("OTP Verified", "Security verification successful", now);
            }
            WorkflowEvent::ResponseReady { text, .. } => {
                self.typewriter.set_revealing(true, now);
                self.typewriter.set_source(&text, now);
            }
            WorkflowEvent::StepActivated { .. }
            | WorkflowEvent::StepCompleted { .. }
            | WorkflowEvent::Settled { .. } => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if self.help_dialog.visible {
            self.help_dialog.toggle();
            return;
        }

        if self.otp_dialog.visible {
            self.handle_otp_key(key);
        } else {
            self.handle_main_key(key);
        }

        // Apply lifecycle events right away so the next frame is consistent
        for event in self.controller.drain_events() {
            self.apply_event(event);
        }
    }

    fn handle_main_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.help_dialog.toggle();
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if let Err(e) = self.controller.start() {
                    debug!("Start refused: {}", e);
                }
            }
            KeyCode::Char('r') if self.controller.is_running() => {
                self.controller.reset();
            }
            KeyCode::Char('o') if self.controller.pending_confirmation() => {
                self.otp_dialog.show();
            }
            _ => {}
        }
    }

    fn handle_otp_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') if self.controller.is_running() => {
                self.controller.reset();
            }
            KeyCode::Char(c) => self.otp_dialog.handle_char(c),
            KeyCode::Backspace => self.otp_dialog.handle_backspace(),
            KeyCode::Tab | KeyCode::BackTab => self.otp_dialog.toggle_focus(),
            KeyCode::Enter => {
                if self.otp_dialog.activate(self.clock.now()) == OtpAction::Verifying {
                    debug!("Verifying confirmation code");
                }
            }
            KeyCode::Esc => self.otp_dialog.hide(),
            _ => {}
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.otp_dialog.visible {
            self.otp_dialog.handle_paste(text);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Header
                Constraint::Min(10),   // Steps and response
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        HeaderBar {
            running: self.controller.is_running(),
        }
        .render(frame, chunks[0]);

        let steps = StepsPanel {
            run: self.controller.run(),
            now: self.clock.now(),
        };
        if self.controller.response().is_some() {
            let main = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(10), Constraint::Length(7)])
                .split(chunks[1]);
            steps.render(frame, main[0]);
            ResponsePanel {
                typewriter: &self.typewriter,
            }
            .render(frame, main[1]);
        } else {
            steps.render(frame, chunks[1]);
        }

        StatusBar {
            running: self.controller.is_running(),
            pending_confirmation: self.controller.pending_confirmation(),
            dialog_open: self.otp_dialog.visible,
        }
        .render(frame, chunks[2]);

        self.toast.render(frame);
        self.otp_dialog.render(frame);
        self.help_dialog.render(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ManualClock, StepStatus, RESPONSE_TEXT};
    use ratatui::backend::TestBackend;

    fn app() -> (App, ManualClock) {
        let clock = ManualClock::new();
        let app = App::with_clock(Config::default(), Arc::new(clock.clone()));
        (app, clock)
    }

    fn advance(app: &mut App, clock: &ManualClock, ms: u64) {
        clock.advance_ms(ms);
        app.tick();
    }

    fn gated() -> (App, ManualClock) {
        let (mut app, clock) = app();
        app.handle_key(KeyCode::Char('s'));
        advance(&mut app, &clock, 2000);
        advance(&mut app, &clock, 3000);
        (app, clock)
    }

    #[test]
    fn test_start_key_begins_workflow() {
        let (mut app, _clock) = app();
        app.handle_key(KeyCode::Enter);
        assert!(app.controller().is_running());
        assert_eq!(app.controller().current_index(), Some(0));
    }

    #[test]
    fn test_dialog_opens_at_gate() {
        let (app, _clock) = gated();
        assert!(app.controller().pending_confirmation());
        assert!(app.otp_dialog().visible);
    }

    #[test]
    fn test_typed_code_confirms_after_verify_delay() {
        let (mut app, clock) = gated();
        for c in "123456".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(app.otp_dialog().is_verifying());

        advance(&mut app, &clock, 999);
        assert!(app.controller().pending_confirmation());

        advance(&mut app, &clock, 1);
        assert!(!app.controller().pending_confirmation());
        assert!(!app.otp_dialog().visible);
        assert_eq!(app.toast().title(), Some("OTP Verified"));
        assert_eq!(app.controller().run().statuses()[3], StepStatus::Active);
    }

    #[test]
    fn test_pasted_code_is_sanitized() {
        let (mut app, _clock) = gated();
        app.handle_paste("12-34-56-78");
        assert_eq!(app.otp_dialog().code(), "123456");
    }

    #[test]
    fn test_short_code_cannot_submit() {
        let (mut app, clock) = gated();
        app.handle_paste("12345");
        app.handle_key(KeyCode::Enter);
        advance(&mut app, &clock, 5000);
        assert!(app.controller().pending_confirmation());
        assert!(app.otp_dialog().visible);
    }

    #[test]
    fn test_dismissed_dialog_reopens_with_o() {
        let (mut app, _clock) = gated();
        app.handle_key(KeyCode::Esc);
        assert!(!app.otp_dialog().visible);
        assert!(!app.should_quit());

        app.handle_key(KeyCode::Char('o'));
        assert!(app.otp_dialog().visible);
    }

    #[test]
    fn test_reset_clears_dialog_and_steps() {
        let (mut app, _clock) = gated();
        app.handle_paste("123");
        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('r'));

        assert!(!app.controller().is_running());
        assert!(!app.otp_dialog().visible);
        assert_eq!(app.otp_dialog().code(), "");
        assert!(app
            .controller()
            .run()
            .statuses()
            .iter()
            .all(|s| *s == StepStatus::Pending));
    }

    #[test]
    fn test_reset_key_works_inside_open_dialog() {
        let (mut app, _clock) = gated();
        app.handle_paste("12");
        assert!(app.otp_dialog().visible);

        app.handle_key(KeyCode::Char('r'));

        assert!(!app.controller().is_running());
        assert!(!app.otp_dialog().visible);
        assert_eq!(app.otp_dialog().code(), "");
        assert_eq!(app.controller().current_index(), None);
    }

    #[test]
    fn test_reset_dismisses_verified_toast() {
        let (mut app, clock) = gated();
        app.handle_paste("123456");
        app.handle_key(KeyCode::Enter);
        advance(&mut app, &clock, 1000);
        assert!(app.toast().is_visible());

        app.handle_key(KeyCode::Char('r'));
        assert!(!app.toast().is_visible());
    }

    #[test]
    fn test_response_reveals_then_settles() {
        let (mut app, clock) = gated();
        app.handle_paste("123456");
        app.handle_key(KeyCode::Enter);
        advance(&mut app, &clock, 1000);
        advance(&mut app, &clock, 3000);
        advance(&mut app, &clock, 1500);

        assert!(app.typewriter().is_revealing());
        assert_eq!(app.typewriter().displayed(), "");

        advance(&mut app, &clock, 300);
        assert_eq!(app.typewriter().revealed_chars(), 10);

        advance(&mut app, &clock, 2700);
        assert!(!app.controller().is_running());
        assert!(!app.typewriter().is_revealing());
        assert_eq!(app.typewriter().displayed(), RESPONSE_TEXT);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let (mut app, _clock) = app();
        app.handle_key(KeyCode::Char('?'));
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.should_quit());

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_draw_renders_at_every_stage() {
        let (mut app, clock) = gated();
        let mut terminal = Terminal::new(TestBackend::new(100, 45)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        app.handle_paste("123456");
        app.handle_key(KeyCode::Enter);
        advance(&mut app, &clock, 1000);
        advance(&mut app, &clock, 4500);
        assert!(app.controller().response().is_some());
        terminal.draw(|f| app.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Agent Response"));
        assert!(text.contains("Workflow Progress"));
    }
}
