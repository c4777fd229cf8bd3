//! Live board view.
//!
//! Scoring shortcuts go through [`mats_core::keymap`]. Keys handled here
//! on top of those:
//!
//! | Key | Action |
//! |---|---|
//! | `q` / Esc / ctrl-c | quit |
//! | `[` `]` | previous / next period |
//! | `<` `>` | bout -1 / +1 |
//! | `m` / `M` | mat +1 / -1 |
//! | `n` | rename the active side |
//! | `s` | set the clock (`M:SS`) |
//! | `o` | record an outcome by label |
//! | `z` | reset the clock to zero |

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mats_core::clock::Clock;
use mats_core::dispatch::Action;
use mats_core::keymap::KeyPress;
use mats_core::store::StateStore;
use mats_core::timer::{TickOutcome, TimerSetting};
use mats_core::{Outcome, ScoreboardState, Session, Side};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use std::time::Duration;

/// Poll timeout while the clock is stopped.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// A single-line text prompt shown over the board.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompt {
    Rename { side: Side, buf: String },
    SetTime { buf: String },
    Outcome { buf: String },
}

impl Prompt {
    fn title(&self) -> String {
        match self {
            Self::Rename { side, .. } => format!(" Name for {side} "),
            Self::SetTime { .. } => " Set clock (M:SS) ".to_string(),
            Self::Outcome { .. } => " Outcome label ".to_string(),
        }
    }

    fn buf_mut(&mut self) -> &mut String {
        match self {
            Self::Rename { buf, .. } | Self::SetTime { buf } | Self::Outcome { buf } => buf,
        }
    }

    fn buf(&self) -> &str {
        match self {
            Self::Rename { buf, .. } | Self::SetTime { buf } | Self::Outcome { buf } => buf,
        }
    }
}

pub struct LiveBoard<S, C> {
    session: Session<S, C>,
    default_minutes: u32,
    prompt: Option<Prompt>,
    status: Option<String>,
    should_quit: bool,
}

impl<S: StateStore, C: Clock> LiveBoard<S, C> {
    pub fn new(session: Session<S, C>, default_minutes: u32) -> Self {
        Self {
            session,
            default_minutes,
            prompt: None,
            status: None,
            should_quit: false,
        }
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub const fn state(&self) -> &ScoreboardState {
        self.session.state()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// How long the event loop may block waiting for a key.
    pub fn poll_timeout(&self) -> Duration {
        self.session.next_delay().unwrap_or(IDLE_POLL)
    }

    /// Advance the clock if a poll is due.
    ///
    /// # Errors
    ///
    /// Returns an error when saving the board fails.
    pub fn tick(&mut self) -> Result<()> {
        if let TickOutcome::Expired { .. } = self.session.tick()? {
            self.status = Some("Time!".to_string());
        }
        Ok(())
    }

    /// Handle one key press.
    ///
    /// # Errors
    ///
    /// Returns an error when saving the board fails.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let KeyCode::Char(ch) = key.code else {
            if key.code == KeyCode::Esc {
                self.should_quit = true;
            }
            return Ok(());
        };

        let action = match ch {
            'c' if ctrl => {
                self.should_quit = true;
                return Ok(());
            }
            'q' => {
                self.should_quit = true;
                return Ok(());
            }
            '[' => Action::CyclePeriod(-1),
            ']' => Action::CyclePeriod(1),
            '<' | ',' => Action::ChangeBout(-1),
            '>' | '.' => Action::ChangeBout(1),
            'm' => Action::ChangeMat(1),
            'M' => Action::ChangeMat(-1),
            'z' => Action::ResetTimer,
            'n' => {
                let side = self.state().active_side;
                self.prompt = Some(Prompt::Rename {
                    side,
                    buf: self.state().name(side).to_string(),
                });
                return Ok(());
            }
            's' => {
                self.prompt = Some(Prompt::SetTime {
                    buf: format!("{}:00", self.default_minutes),
                });
                return Ok(());
            }
            'o' => {
                self.prompt = Some(Prompt::Outcome { buf: String::new() });
                return Ok(());
            }
            _ => {
                let shift = key.modifiers.contains(KeyModifiers::SHIFT) || ch.is_ascii_uppercase();
                let press = if shift {
                    KeyPress::shifted(ch)
                } else {
                    KeyPress::plain(ch)
                };
                let outcome = self.session.apply_key(press)?;
                self.note(outcome);
                return Ok(());
            }
        };

        let outcome = self.session.apply(&action)?;
        self.note(Some(outcome));
        Ok(())
    }

    fn note(&mut self, outcome: Option<Outcome>) {
        self.status = match outcome {
            Some(Outcome::Debounced) => Some("ignored repeat".to_string()),
            _ => None,
        };
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.buf_mut().pop();
            }
            KeyCode::Char(c) => prompt.buf_mut().push(c),
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit(prompt)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit(&mut self, prompt: Prompt) -> Result<()> {
        let action = match prompt {
            Prompt::Rename { side, buf } => Action::Rename { side, name: buf },
            Prompt::SetTime { buf } => match buf.parse::<TimerSetting>() {
                Ok(setting) => Action::SetTimer(setting),
                Err(err) => {
                    self.status = Some(err.to_string());
                    return Ok(());
                }
            },
            Prompt::Outcome { buf } => match self.session.presets().outcome(buf.trim()) {
                Some(outcome) => Action::RecordOutcome {
                    label: outcome.label.clone(),
                    title: outcome.title.clone(),
                },
                None => {
                    self.status = Some(format!("no outcome labelled '{}'", buf.trim()));
                    return Ok(());
                }
            },
        };
        let outcome = self.session.apply(&action)?;
        self.note(Some(outcome));
        Ok(())
    }

    /// Render the board into `area` within the given frame.
    pub fn render(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let state = self.state();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Paragraph::new(format!(
            "Mat {}   Bout {}   Period {}",
            state.mat,
            state.bout,
            state.period.as_str()
        ))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(header, chunks[0]);

        let sides = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        frame.render_widget(score_panel(state, Side::Left, Color::Red), sides[0]);
        frame.render_widget(score_panel(state, Side::Right, Color::Green), sides[1]);

        let clock_style = if state.timer_running {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let clock = Paragraph::new(state.formatted_clock())
            .alignment(Alignment::Center)
            .style(clock_style)
            .block(Block::default().borders(Borders::ALL).title(" Clock "));
        frame.render_widget(clock, chunks[2]);

        let items: Vec<ListItem<'_>> = state
            .log
            .iter()
            .rev()
            .map(|entry| ListItem::new(entry.summary()))
            .collect();
        let log = List::new(items).block(Block::default().borders(Borders::ALL).title(" Log "));
        frame.render_widget(log, chunks[3]);

        let footer = self.status.as_deref().map_or_else(
            || {
                Line::from(Span::styled(
                    "space clock  t/r/1-4/p presets  +/- manual  a side  u undo  s set  o outcome  q quit",
                    Style::default().fg(Color::DarkGray),
                ))
            },
            |msg| Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Yellow))),
        );
        frame.render_widget(Paragraph::new(footer), chunks[4]);

        if let Some(prompt) = &self.prompt {
            let popup = centered(area, 40, 3);
            frame.render_widget(Clear, popup);
            let input = Paragraph::new(format!("{}▏", prompt.buf()))
                .block(Block::default().borders(Borders::ALL).title(prompt.title()));
            frame.render_widget(input, popup);
        }
    }
}

fn score_panel(state: &ScoreboardState, side: Side, color: Color) -> Paragraph<'static> {
    let active = state.active_side == side;
    let border = if active {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = if active {
        format!(" ▶ {} ", state.name(side))
    } else {
        format!(" {} ", state.name(side))
    };
    Paragraph::new(Line::from(Span::styled(
        state.score(side).to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
