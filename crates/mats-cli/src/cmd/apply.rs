//! `mats apply`: run a sequence of actions against the saved board.
//!
//! Every token is parsed before anything is applied, so a typo in the
//! third token leaves the board untouched. Undo history lives only for
//! the duration of one invocation.

use crate::cmd::Context;
use crate::cmd::show::BoardView;
use crate::output::{Renderable, render};
use anyhow::{Context as _, Result};
use clap::Args;
use mats_core::dispatch::Action;
use mats_core::presets::PresetTable;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Action tokens, applied in order.
    #[arg(required = true, value_name = "ACTION")]
    pub actions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StepReport {
    action: String,
    outcome: &'static str,
}

#[derive(Debug, Serialize)]
struct ApplyReport {
    steps: Vec<StepReport>,
    board: BoardView,
}

/// Parse every token up front.
///
/// # Errors
///
/// Returns the first token that does not parse, with the token in context.
pub fn parse_actions(tokens: &[String], presets: &PresetTable) -> Result<Vec<Action>> {
    tokens
        .iter()
        .map(|token| {
            Action::parse(token, presets).with_context(|| format!("invalid action '{token}'"))
        })
        .collect()
}

/// Execute `mats apply`.
///
/// # Errors
///
/// Returns an error if a token does not parse, the board cannot be opened,
/// or a save fails.
pub fn run_apply(args: &ApplyArgs, ctx: &Context) -> Result<()> {
    let actions = parse_actions(&args.actions, &ctx.config.preset_table())?;
    let mut session = ctx.open_session()?;

    let mut steps = Vec::with_capacity(actions.len());
    for action in &actions {
        let outcome = session
            .apply(action)
            .with_context(|| format!("failed to save after '{action}'"))?;
        steps.push(StepReport {
            action: action.to_string(),
            outcome: outcome.as_str(),
        });
    }

    let report = ApplyReport {
        steps,
        board: BoardView::new(session.state(), 3),
    };
    let output = ctx.output;
    render(output, &report, |r, w| {
        for step in &r.steps {
            if output.is_pretty() {
                let mark = if step.outcome == "applied" { "✓" } else { "·" };
                writeln!(w, "{mark} {:<20} {}", step.action, step.outcome)?;
            } else {
                writeln!(w, "{}  {}", step.outcome, step.action)?;
            }
        }
        if output.is_pretty() {
            writeln!(w)?;
            r.board.render_human(w)
        } else {
            r.board.render_table(w)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mats_core::error::ErrorCode;
    use mats_core::dispatch::ActionParseError;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_every_token_in_order() -> Result<()> {
        let actions = parse_actions(
            &tokens(&["quick=T3", "toggle-side", "undo"]),
            &PresetTable::default(),
        )?;
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[2], Action::Undo);
        Ok(())
    }

    #[test]
    fn first_bad_token_is_reported_with_its_code() {
        let err = parse_actions(
            &tokens(&["mat-inc", "timer-set=1:75", "fly"]),
            &PresetTable::default(),
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("timer-set=1:75"));
        let parse_err = err
            .downcast_ref::<ActionParseError>()
            .expect("parse error in chain");
        assert_eq!(parse_err.code(), ErrorCode::InvalidTimeInput);
    }
}
