//! Plain-text presentation of a [`Screen`].

use cogex_core::{
    ArithmeticQuestion, InkColor, RotationTrial, ScoreSummary, Side, Stage, StroopStimulus,
};
use cogex_experiment::{Deadline, Screen, View};
use std::fmt::{self, Write};
use std::time::Duration;

/// Identity of what is on screen, ignoring the countdown. The host redraws
/// only when this changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Other(Option<Stage>),
    Start(Stage),
    Trial { stage: Stage, index: usize, rejected: bool },
    Completed(Stage),
}

pub fn prompt_of(screen: &Screen) -> Prompt {
    fn view<S>(stage: Stage, view: &View<S>) -> Prompt {
        match view {
            View::Start { .. } => Prompt::Start(stage),
            View::Trial {
                index, rejected, ..
            } => Prompt::Trial {
                stage,
                index: *index,
                rejected: *rejected,
            },
            View::Completed(_) => Prompt::Completed(stage),
        }
    }
    match screen {
        Screen::Arithmetic(v) => view(Stage::Arithmetic, v),
        Screen::Stroop(v) => view(Stage::Stroop, v),
        Screen::MentalRotation(v) => view(Stage::MentalRotation, v),
        other => Prompt::Other(other.stage()),
    }
}

fn ansi(color: InkColor) -> &'static str {
    match color {
        InkColor::Red => "\x1b[1;31m",
        InkColor::Green => "\x1b[1;32m",
        InkColor::Blue => "\x1b[1;34m",
        InkColor::Yellow => "\x1b[1;33m",
    }
}

const RESET: &str = "\x1b[0m";

fn title(stage: Stage) -> &'static str {
    match stage {
        Stage::Arithmetic => "NUMERICAL ABILITY",
        Stage::Stroop => "STROOP TEST",
        Stage::MentalRotation => "MENTAL ROTATION",
        _ => "",
    }
}

fn start(out: &mut dyn Write, stage: Stage, trials: usize, deadline: Deadline) -> fmt::Result {
    writeln!(out, "=== {} ===", title(stage))?;
    match (stage, deadline) {
        (_, Deadline::WholeTest(limit)) => {
            writeln!(
                out,
                "Solve as many of up to {trials} questions as you can in {} minutes.",
                limit.as_secs() / 60
            )?;
            writeln!(out, "Type each answer as a whole number and press Enter.")?;
        }
        (Stage::Stroop, Deadline::PerTrial(limit)) => {
            writeln!(
                out,
                "{trials} words. Name the COLOUR each word is printed in, not the word itself."
            )?;
            writeln!(
                out,
                "Answer with red/green/blue/yellow (or r/g/b/y) within {} seconds.",
                limit.as_secs()
            )?;
        }
        (_, Deadline::PerTrial(limit)) => {
            writeln!(
                out,
                "{trials} figures. Pick the option that is the target rotated, not mirrored."
            )?;
            writeln!(out, "Answer A or B within {} seconds.", limit.as_secs())?;
        }
    }
    writeln!(out, "Press Enter to begin.")
}

fn arithmetic(out: &mut dyn Write, q: &ArithmeticQuestion) -> fmt::Result {
    writeln!(out, "  {} = ?", q.text)
}

fn stroop(out: &mut dyn Write, s: &StroopStimulus) -> fmt::Result {
    writeln!(out, "  {}{}{}", ansi(s.ink), s.word, RESET)
}

fn rotation(out: &mut dyn Write, t: &RotationTrial) -> fmt::Result {
    writeln!(out, "  target: {}", t.target)?;
    for side in [Side::Left, Side::Right] {
        writeln!(out, "  {}: {}", side.label(), t.option(side).image)?;
    }
    Ok(())
}

fn summary(out: &mut dyn Write, summary: &ScoreSummary) -> fmt::Result {
    let pct = |m: Option<f64>| m.map_or("n/a".to_string(), |v| format!("{v:.1}%"));
    let secs = |m: Option<f64>| m.map_or("n/a".to_string(), |v| format!("{v:.3}s"));
    match summary {
        ScoreSummary::Arithmetic(s) => {
            writeln!(out, "Attempted: {}  Correct: {}", s.attempted, s.correct)?;
            writeln!(out, "Weighted accuracy: {:.1}%", s.weighted_accuracy * 100.0)?;
            writeln!(out, "Speed efficiency: {:.1}%", s.speed_efficiency * 100.0)?;
            writeln!(out, "Numerical score: {:.3}", s.numerical_score)?;
        }
        ScoreSummary::Stroop(s) => {
            writeln!(out, "Correct: {}/{}", s.correct, s.trials)?;
            writeln!(out, "Error rate: {}", pct(s.error_rate))?;
            writeln!(out, "Mean reaction time: {}", secs(s.mean_rt_secs))?;
            writeln!(out, "Stroop interference: {}", secs(s.interference_secs))?;
        }
        ScoreSummary::MentalRotation(s) => {
            writeln!(out, "Correct: {}/{}  Timed out: {}", s.correct, s.trials, s.timed_out)?;
            writeln!(out, "Accuracy: {}", pct(s.accuracy))?;
            writeln!(out, "Average reaction time: {}", secs(s.avg_reaction_time_secs))?;
        }
    }
    Ok(())
}

fn test_view<S>(
    out: &mut dyn Write,
    stage: Stage,
    view: &View<S>,
    stimulus_fn: impl Fn(&mut dyn Write, &S) -> fmt::Result,
) -> fmt::Result {
    match view {
        View::Start {
            trials, deadline, ..
        } => start(out, stage, *trials, *deadline),
        View::Trial {
            index,
            total,
            stimulus,
            remaining,
            rejected,
        } => {
            writeln!(
                out,
                "[{}/{}] {} left",
                index + 1,
                total,
                clock_face(*remaining)
            )?;
            stimulus_fn(out, stimulus)?;
            if *rejected {
                writeln!(out, "Please enter a whole number.")?;
            }
            Ok(())
        }
        View::Completed(s) => {
            writeln!(out, "=== {} COMPLETE ===", title(stage))?;
            summary(out, s)?;
            writeln!(out, "Press Enter to continue.")
        }
    }
}

fn clock_face(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Full text of a screen, ready to print.
pub struct Rendered<'a>(pub &'a Screen);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_screen(f, self.0)
    }
}

fn write_screen(out: &mut dyn Write, screen: &Screen) -> fmt::Result {
    match screen {
        Screen::Consent { error } => {
            if let Some(error) = error {
                writeln!(out, "Cannot continue: {error}.")?;
            }
        }
        Screen::Instructions => {
            writeln!(out, "=== INSTRUCTIONS ===")?;
            writeln!(out, "You will take three short timed tests:")?;
            writeln!(out, "  1. Numerical ability: mental arithmetic against the clock.")?;
            writeln!(out, "  2. Stroop: name the ink colour of colour words.")?;
            writeln!(out, "  3. Mental rotation: match rotated figures.")?;
            writeln!(out, "Work quickly but accurately. Press Enter when ready.")?;
        }
        Screen::Arithmetic(view) => test_view(out, Stage::Arithmetic, view, arithmetic)?,
        Screen::Stroop(view) => test_view(out, Stage::Stroop, view, stroop)?,
        Screen::MentalRotation(view) => test_view(out, Stage::MentalRotation, view, rotation)?,
        Screen::Final { profile, summaries } => {
            writeln!(out, "=== ASSESSMENT COMPLETE ===")?;
            if let Some(profile) = profile {
                writeln!(out, "Thank you, {}.", profile.name)?;
            }
            for s in summaries {
                writeln!(out, "-- {} --", title(s.stage()))?;
                summary(out, s)?;
            }
        }
        Screen::Rerun => {}
    }
    Ok(())
}

/// Expands colour shortcuts; anything else is passed through.
pub fn colour_choice(line: &str) -> String {
    let line = line.trim();
    let expanded = match line.to_ascii_lowercase().as_str() {
        "r" => InkColor::Red.name(),
        "g" => InkColor::Green.name(),
        "b" => InkColor::Blue.name(),
        "y" => InkColor::Yellow.name(),
        _ => line,
    };
    expanded.to_string()
}
