//! `mats show`: print the current board.

use crate::cmd::Context;
use crate::output::{Renderable, pretty_kv, pretty_rule, pretty_section, render_item};
use clap::Args;
use mats_core::{ScoreboardState, Side};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// How many recent log entries to include.
    #[arg(long, default_value_t = 5)]
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct CompetitorView {
    pub name: String,
    pub score: u32,
    pub active: bool,
}

/// The board as printed by `show` and `apply`.
#[derive(Debug, Serialize)]
pub struct BoardView {
    pub mat: u32,
    pub bout: u32,
    pub period: String,
    pub left: CompetitorView,
    pub right: CompetitorView,
    pub clock: String,
    pub timer_seconds: u32,
    pub timer_running: bool,
    pub log_entries: usize,
    /// Newest first.
    pub recent: Vec<String>,
}

impl BoardView {
    pub fn new(state: &ScoreboardState, recent: usize) -> Self {
        let competitor = |side: Side| CompetitorView {
            name: state.name(side).to_string(),
            score: state.score(side),
            active: state.active_side == side,
        };
        Self {
            mat: state.mat,
            bout: state.bout,
            period: state.period.as_str().to_string(),
            left: competitor(Side::Left),
            right: competitor(Side::Right),
            clock: state.formatted_clock(),
            timer_seconds: state.timer_seconds,
            timer_running: state.timer_running,
            log_entries: state.log.len(),
            recent: state.log.iter().rev().take(recent).map(|e| e.summary()).collect(),
        }
    }

    fn clock_label(&self) -> String {
        if self.timer_running {
            format!("{} (running)", self.clock)
        } else {
            self.clock.clone()
        }
    }
}

fn competitor_line(c: &CompetitorView) -> String {
    let marker = if c.active { "▶" } else { " " };
    format!("{marker} {:<20} {:>3}", c.name, c.score)
}

impl Renderable for BoardView {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(
            w,
            &format!("Mat {}  Bout {}  Period {}", self.mat, self.bout, self.period),
        )?;
        writeln!(w, "{}", competitor_line(&self.left))?;
        writeln!(w, "{}", competitor_line(&self.right))?;
        pretty_rule(w)?;
        pretty_kv(w, "clock", self.clock_label())?;
        pretty_kv(w, "entries", self.log_entries.to_string())?;
        for line in &self.recent {
            writeln!(w, "  {line}")?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "mat={} bout={} period={} left={}:{} right={}:{} active={} clock={}{}",
            self.mat,
            self.bout,
            self.period,
            self.left.name,
            self.left.score,
            self.right.name,
            self.right.score,
            if self.left.active { "left" } else { "right" },
            self.clock,
            if self.timer_running { " running" } else { "" },
        )
    }
}

/// Execute `mats show`.
///
/// # Errors
///
/// Returns an error if the board cannot be read or output fails.
pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    render_item(&BoardView::new(session.state(), args.entries), ctx.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use mats_core::model::EntryEvent;

    fn board() -> ScoreboardState {
        let mut state = ScoreboardState::default();
        let at = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        state.adjust_score(Side::Left, 3);
        state.record(EntryEvent::score(Side::Left, "T3", 3), at);
        state.record(EntryEvent::score(Side::Left, "E1", 1), at);
        state.toggle_active_side();
        state.set_timer(95);
        state
    }

    #[test]
    fn view_lists_recent_entries_newest_first() {
        let view = BoardView::new(&board(), 1);
        assert_eq!(view.recent.len(), 1);
        assert!(view.recent[0].contains("E1"));
        assert_eq!(view.log_entries, 2);
        assert!(view.right.active);
        assert_eq!(view.clock, "01:35");
    }

    #[test]
    fn text_row_is_one_line() {
        let mut buf = Vec::new();
        BoardView::new(&board(), 5)
            .render_table(&mut buf)
            .expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "mat=1 bout=101 period=1 left=Red:3 right=Green:0 active=right clock=01:35\n"
        );
    }

    #[test]
    fn json_has_stable_fields() {
        let mut buf = Vec::new();
        BoardView::new(&board(), 5)
            .render_json(&mut buf)
            .expect("render");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["left"]["score"], 3);
        assert_eq!(value["period"], "1");
        assert_eq!(value["timer_running"], false);
    }
}
