//! TUI for the nibble bench
//!
//! Scope of every output bit on the left, spectrum of bit 0 on the right.

mod scope;
mod spectrum;
mod state;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use nibble_dsp::modules::ControlMessage;

pub use state::{ScopeFrame, UiState};

use scope::render_scope;
use spectrum::{render_spectrum, SpectrumAnalyzer};

/// Host samples kept for the scope
const SCOPE_LEN: usize = 512;
/// Host samples fed to the FFT
const FFT_LEN: usize = 4096;

pub struct UiApp {
    scope_rx: Consumer<ScopeFrame>,
    control_tx: Producer<ControlMessage>,
    state: UiState,
    frames: Vec<ScopeFrame>,
    bit0: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        scope_rx: Consumer<ScopeFrame>,
        control_tx: Producer<ControlMessage>,
        state: UiState,
    ) -> Self {
        Self {
            scope_rx,
            control_tx,
            analyzer: SpectrumAnalyzer::new(FFT_LEN, state.sample_rate),
            state,
            frames: Vec::with_capacity(SCOPE_LEN * 2),
            bit0: Vec::with_capacity(FFT_LEN * 2),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_scope(&mut self) {
        while let Ok(frame) = self.scope_rx.pop() {
            self.frames.push(frame);
            self.bit0.push(frame.bits[0]);
        }
        if self.frames.len() > SCOPE_LEN {
            let excess = self.frames.len() - SCOPE_LEN;
            self.frames.drain(0..excess);
        }
        if self.bit0.len() > FFT_LEN {
            let excess = self.bit0.len() - FFT_LEN;
            self.bit0.drain(0..excess);
        }
        self.analyzer.update(&self.bit0);
    }

    fn send(&mut self, message: ControlMessage) -> bool {
        if self.control_tx.push(message).is_ok() {
            true
        } else {
            self.state.dropped += 1;
            false
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                let next = self.state.anti_alias.next();
                if self.send(ControlMessage::AntiAlias(next)) {
                    self.state.anti_alias = next;
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                let enabled = !self.state.dc_block;
                if self.send(ControlMessage::DcBlock(enabled)) {
                    self.state.dc_block = enabled;
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send(ControlMessage::Reset);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status
                Constraint::Min(12),   // Scope + spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let status = Paragraph::new(format!(
            " {:.0} Hz  sweep {:.1} Hz  anti-alias: {}  dc block: {}  dropped: {}",
            self.state.sample_rate,
            self.state.sweep_hz,
            self.state.anti_alias.name(),
            if self.state.dc_block { "on" } else { "off" },
            self.state.dropped,
        ))
        .style(Style::default().fg(Color::White));
        frame.render_widget(status, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        render_scope(frame, columns[0], &self.frames);
        render_spectrum(frame, columns[1], &self.analyzer);

        let help = Paragraph::new(" [A] Anti-alias  [D] DC block  [R] Reset  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[2]);
    }
}
