//! `mats timer run`: drive the countdown in the foreground.

use crate::cmd::Context;
use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use mats_core::Session;
use mats_core::clock::Clock;
use mats_core::dispatch::Action;
use mats_core::model::format_clock;
use mats_core::store::StateStore;
use mats_core::timer::{TickOutcome, TimerSetting};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Subcommand, Debug)]
pub enum TimerCommand {
    /// Poll the clock until it stops or reaches zero, saving every second.
    Run(TimerRunArgs),
}

#[derive(Args, Debug)]
pub struct TimerRunArgs {
    /// Set the clock first (`M:SS` or whole minutes).
    #[arg(long, value_name = "M:SS")]
    pub set: Option<TimerSetting>,

    /// Start the clock if it is stopped.
    #[arg(long)]
    pub start: bool,
}

#[derive(Debug, Default, Serialize)]
struct RunReport {
    consumed: u32,
    remaining: u32,
    expired: bool,
}

/// Execute `mats timer <command>`.
///
/// # Errors
///
/// Returns an error if the board cannot be opened or a save fails.
pub fn run_timer(command: &TimerCommand, ctx: &Context) -> Result<()> {
    match command {
        TimerCommand::Run(args) => run_foreground(args, ctx),
    }
}

fn run_foreground(args: &TimerRunArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    if let Some(setting) = args.set {
        session.apply(&Action::SetTimer(setting))?;
    }
    if args.start {
        session.apply(&Action::StartTimer)?;
    }

    if !session.state().timer_running {
        tracing::info!(remaining = session.state().timer_seconds, "timer is not running");
    }

    let report = drive(&mut session, ctx.output, |delay| std::thread::sleep(delay))?;
    render(ctx.output, &report, |r, w| {
        if r.expired {
            writeln!(w, "time")
        } else {
            writeln!(w, "stopped at {}", format_clock(r.remaining))
        }
    })
}

/// Poll until the engine goes idle. Each whole-second change is echoed in
/// pretty/text mode.
fn drive<S: StateStore, C: Clock>(
    session: &mut Session<S, C>,
    output: OutputMode,
    mut sleep: impl FnMut(std::time::Duration),
) -> Result<RunReport> {
    let mut report = RunReport {
        remaining: session.state().timer_seconds,
        ..RunReport::default()
    };
    let stdout = io::stdout();

    while let Some(delay) = session.next_delay() {
        sleep(delay);
        let outcome = session.tick().context("failed to save the clock")?;
        match outcome {
            TickOutcome::Ticked { consumed, remaining } => {
                report.consumed += consumed;
                report.remaining = remaining;
            }
            TickOutcome::Expired { consumed } => {
                report.consumed += consumed;
                report.remaining = 0;
                report.expired = true;
            }
            TickOutcome::Idle | TickOutcome::NotDue | TickOutcome::Pending => continue,
        }
        if !output.is_json() {
            let mut out = stdout.lock();
            writeln!(out, "{}", format_clock(report.remaining))?;
            out.flush()?;
        }
    }
    Ok(report)
}
