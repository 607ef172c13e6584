use crate::{intake, render};
use anyhow::{Context, Result};
use cogex_core::Stage;
use cogex_experiment::{Assessment, AssessmentConfig, Input, Screen, View};
use cogex_store::MemoryStore;
use cogex_timing::{CadenceMonitor, Clock, HighPrecisionClock};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound between re-invocations while waiting for input.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Per-trial deadlines tolerate at most this much lateness.
const CADENCE_BOUND: Duration = Duration::from_secs(1);

pub struct App {
    assessment: Assessment<MemoryStore, HighPrecisionClock, StdRng>,
    clock: HighPrecisionClock,
    cadence: CadenceMonitor,
    lines: Receiver<String>,
    output_dir: PathBuf,
    exported: HashSet<Stage>,
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match std::env::var_os("COGEX_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                AssessmentConfig::load(&path)
                    .with_context(|| format!("loading config from {}", path.display()))?
            }
            None => AssessmentConfig::default(),
        };
        let output_dir = std::env::var_os("COGEX_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;

        let clock = HighPrecisionClock::new();
        let assessment = Assessment::from_config(config, MemoryStore::new(), clock.clone())?;

        Ok(Self {
            assessment,
            clock,
            cadence: CadenceMonitor::default(),
            lines: spawn_stdin_reader(),
            output_dir,
            exported: HashSet::new(),
        })
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== COGNITIVE ASSESSMENT ===");
        println!("Platform: {}", std::env::consts::OS);
        println!();

        let mut input = Input::Idle;
        let mut shown = None;
        loop {
            self.cadence.record(self.clock.now());
            let screen = self.assessment.poll(&input)?;
            input = Input::Idle;

            if screen == Screen::Rerun {
                continue;
            }
            self.export_completed(&screen)?;

            let prompt = render::prompt_of(&screen);
            if shown != Some(prompt) {
                print!("{}", render::Rendered(&screen));
                shown = Some(prompt);
            }

            match &screen {
                Screen::Final { .. } => break,
                Screen::Consent { .. } => {
                    // A refused intake comes back as the same prompt with an error.
                    shown = None;
                    input = Input::Register(intake::collect(&self.lines)?);
                    continue;
                }
                _ => {}
            }

            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => input = input_for(&screen, &line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("input closed before the assessment finished");
                    return Ok(());
                }
            }
        }

        self.write_results()?;
        let stats = self.cadence.stats();
        info!(
            polls = stats.samples,
            mean_ms = stats.mean_interval_ns / 1e6,
            max_ms = stats.max_interval_ns as f64 / 1e6,
            "poll cadence"
        );
        if self.cadence.exceeds(CADENCE_BOUND) {
            warn!("some polls were more than {CADENCE_BOUND:?} apart; timeouts may be late");
        }
        Ok(())
    }

    /// Trial logs are dropped when the stage advances, so each test's CSV is
    /// written as soon as its completion screen appears.
    fn export_completed(&mut self, screen: &Screen) -> Result<()> {
        let stage = match screen {
            Screen::Arithmetic(View::Completed(_)) => Stage::Arithmetic,
            Screen::Stroop(View::Completed(_)) => Stage::Stroop,
            Screen::MentalRotation(View::Completed(_)) => Stage::MentalRotation,
            _ => return Ok(()),
        };
        if !self.exported.insert(stage) {
            return Ok(());
        }
        if let Some(csv) = self.assessment.trial_log_csv(stage)? {
            let path = self.output_dir.join(format!("{stage}_results.csv"));
            std::fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "trial log exported");
        }
        Ok(())
    }

    fn write_results(&self) -> Result<()> {
        let path = self.output_dir.join("assessment_results.json");
        std::fs::write(&path, self.assessment.results_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Results saved to {}. Thank you!", path.display());
        Ok(())
    }
}

/// Maps a typed line onto the event the current screen expects.
fn input_for(screen: &Screen, line: &str) -> Input {
    match screen {
        Screen::Instructions => Input::Continue,
        Screen::Arithmetic(view) => view_input(view, || Input::Submit {
            trial: trial_of(view),
            text: line.to_string(),
        }),
        Screen::Stroop(view) => view_input(view, || Input::Select {
            trial: trial_of(view),
            choice: render::colour_choice(line),
        }),
        Screen::MentalRotation(view) => view_input(view, || Input::Select {
            trial: trial_of(view),
            choice: line.trim().to_string(),
        }),
        Screen::Consent { .. } | Screen::Final { .. } | Screen::Rerun => Input::Idle,
    }
}

fn view_input<S>(view: &View<S>, response: impl FnOnce() -> Input) -> Input {
    match view {
        View::Start { .. } => Input::Start,
        View::Trial { .. } => response(),
        View::Completed(_) => Input::Continue,
    }
}

fn trial_of<S>(view: &View<S>) -> usize {
    match view {
        View::Trial { index, .. } => *index,
        _ => 0,
    }
}
