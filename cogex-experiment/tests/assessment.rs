use cogex_core::{
    ArithmeticQuestion, Difficulty, InkColor, Intake, ParticipantProfile, ScoreSummary, Stage,
    StroopStimulus, Tally, TestPhase,
};
use cogex_experiment::controller::{SESSION, StageController};
use cogex_experiment::engine::StateOf;
use cogex_experiment::{
    ArithmeticConfig, ArithmeticTest, Assessment, AssessmentConfig, AssessmentError, Directive,
    Input, RotationConfig, RotationTest, Screen, StroopConfig, StroopTest, TestState,
    TimedTrialEngine, View, export,
};
use cogex_store::{MemoryStore, SessionStore, save};
use cogex_timing::ManualClock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

const SEC: Duration = Duration::from_secs(1);

fn intake() -> Intake {
    Intake {
        consent: true,
        profile: ParticipantProfile {
            name: "Ada".into(),
            ..Default::default()
        },
    }
}

fn engine<T: cogex_experiment::TimedTest>(
    test: T,
    clock: &ManualClock,
) -> TimedTrialEngine<T, ManualClock, StdRng> {
    TimedTrialEngine::new(test, clock.clone(), StdRng::seed_from_u64(99))
}

/// Starts the engine at the current time and returns the first trial view.
fn start<T: cogex_experiment::TimedTest>(
    engine: &mut TimedTrialEngine<T, ManualClock, StdRng>,
    store: &mut MemoryStore,
) -> View<T::Stimulus> {
    match engine.poll(store, &Input::Idle).unwrap() {
        Directive::Render(View::Start { .. }) => {}
        other => panic!("expected start screen, got {other:?}"),
    }
    match engine.poll(store, &Input::Start).unwrap() {
        Directive::Render(view) => view,
        other => panic!("expected a trial, got {other:?}"),
    }
}

fn select(trial: usize, choice: &str) -> Input {
    Input::Select {
        trial,
        choice: choice.into(),
    }
}

fn submit(trial: usize, text: &str) -> Input {
    Input::Submit {
        trial,
        text: text.into(),
    }
}

/// Replaces the open trial's stimulus with a known one.
fn pin_current<T: cogex_experiment::TimedTest>(
    store: &mut MemoryStore,
    stimulus: T::Stimulus,
) {
    let key = TimedTrialEngine::<T, ManualClock, StdRng>::state_key();
    let mut state: StateOf<T> = cogex_store::load(store, &key).unwrap().unwrap();
    state.current = Some(stimulus);
    save(store, &key, &state).unwrap();
}

#[test]
fn arithmetic_hard_question_is_scored_in_its_tier() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let question = ArithmeticQuestion::parse("(10 - 2) * 4", Difficulty::Hard).unwrap();
    let config = ArithmeticConfig {
        question_pool: 1,
        ..Default::default()
    };
    let mut engine = engine(ArithmeticTest::new(config).unwrap(), &clock);
    start(&mut engine, &mut store);
    pin_current::<ArithmeticTest>(&mut store, question);

    clock.advance(3 * SEC);
    let directive = engine.poll(&mut store, &submit(0, "32")).unwrap();
    let Directive::Render(View::Completed(ScoreSummary::Arithmetic(summary))) = directive else {
        panic!("expected completion, got {directive:?}");
    };
    assert_eq!(
        summary.tiers[&Difficulty::Hard],
        Tally {
            attempted: 1,
            correct: 1
        }
    );
    assert_eq!(summary.weighted_accuracy, 1.0);

    let state = engine.state(&store).unwrap();
    let record = &state.log.records()[0];
    assert_eq!(record.response.as_deref(), Some("32"));
    assert_eq!(record.reaction_time_ns, Some(3_000_000_000));
    assert!(store.contains("scores.arithmetic"));
}

#[test]
fn malformed_arithmetic_answer_keeps_the_trial_open() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(ArithmeticTest::new(ArithmeticConfig::default()).unwrap(), &clock);
    start(&mut engine, &mut store);
    let before = store.clone();

    for junk in ["", "abc", "4.5"] {
        let directive = engine.poll(&mut store, &submit(0, junk)).unwrap();
        let Directive::Render(View::Trial { index, rejected, .. }) = directive else {
            panic!("expected the same trial, got {directive:?}");
        };
        assert_eq!(index, 0);
        assert!(rejected);
    }
    assert_eq!(store, before);
}

#[test]
fn arithmetic_ends_when_the_countdown_runs_out() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(ArithmeticTest::new(ArithmeticConfig::default()).unwrap(), &clock);
    let mut view = start(&mut engine, &mut store);

    for _ in 0..4 {
        let View::Trial { index, stimulus, .. } = view else {
            panic!("expected a trial");
        };
        clock.advance(10 * SEC);
        view = match engine
            .poll(&mut store, &submit(index, &stimulus.answer.to_string()))
            .unwrap()
        {
            Directive::Render(view) => view,
            other => panic!("unexpected {other:?}"),
        };
    }
    let View::Trial { remaining, .. } = view else {
        panic!("expected a trial");
    };
    assert_eq!(remaining, Duration::from_secs(260));

    clock.advance(260 * SEC);
    let directive = engine.poll(&mut store, &submit(4, "0")).unwrap();
    let Directive::Render(View::Completed(ScoreSummary::Arithmetic(summary))) = directive else {
        panic!("expected completion, got {directive:?}");
    };
    // The late answer lost to the deadline and the open question is dropped.
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.correct, 4);
    assert!((summary.speed_efficiency - 0.04).abs() < 1e-12);
    assert_eq!(engine.log(&store).unwrap().len(), 4);
}

#[test]
fn stroop_response_and_timeout() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let config = StroopConfig {
        trials: 2,
        ..Default::default()
    };
    let mut engine = engine(StroopTest::new(config), &clock);
    start(&mut engine, &mut store);
    pin_current::<StroopTest>(
        &mut store,
        StroopStimulus::incongruent(InkColor::Red, InkColor::Green),
    );

    clock.advance(Duration::from_millis(1_200));
    let directive = engine.poll(&mut store, &select(0, "GREEN")).unwrap();
    assert!(matches!(directive, Directive::Render(View::Trial { index: 1, .. })));

    clock.advance(5 * SEC);
    assert_eq!(engine.poll(&mut store, &Input::Idle).unwrap(), Directive::Rerun);
    let directive = engine.poll(&mut store, &Input::Idle).unwrap();
    assert!(matches!(directive, Directive::Render(View::Completed(_))));

    let log = engine.log(&store).unwrap();
    assert_eq!(log.len(), 2);
    let first = &log.records()[0];
    assert!(first.correct());
    assert_eq!(first.stimulus.word, "RED");
    assert_eq!(first.expected, "green");
    assert_eq!(first.reaction_time_ns, Some(1_200_000_000));
    let second = &log.records()[1];
    assert!(second.timed_out());
    assert!(!second.correct());
    assert_eq!(second.response, None);

    let csv = export::to_csv(&log);
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("1,RED,green,Incongruent,"));
    assert!(rows[2].contains(",No Response,false,true,"));
}

#[test]
fn timeout_beats_a_late_response_and_replays_are_ignored() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(StroopTest::new(StroopConfig::default()), &clock);
    let View::Trial { stimulus, .. } = start(&mut engine, &mut store) else {
        panic!("expected a trial");
    };

    clock.advance(Duration::from_millis(5_001));
    let late = select(0, stimulus.ink.name());
    assert_eq!(engine.poll(&mut store, &late).unwrap(), Directive::Rerun);
    assert!(engine.log(&store).unwrap().records()[0].timed_out());

    let snapshot = {
        engine.poll(&mut store, &Input::Idle).unwrap();
        store.clone()
    };
    // Trial 1 is open now; the replayed trial-0 answer changes nothing.
    engine.poll(&mut store, &late).unwrap();
    assert_eq!(store, snapshot);
    assert_eq!(engine.log(&store).unwrap().len(), 1);
}

#[test]
fn polling_without_events_is_idempotent() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(StroopTest::new(StroopConfig::default()), &clock);
    let first = start(&mut engine, &mut store);
    let snapshot = store.clone();

    for _ in 0..5 {
        let directive = engine.poll(&mut store, &Input::Idle).unwrap();
        assert_eq!(directive, Directive::Render(first.clone()));
    }
    assert_eq!(store, snapshot);
}

#[test]
fn duplicate_submission_is_recorded_once() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(StroopTest::new(StroopConfig::default()), &clock);
    let View::Trial { stimulus, .. } = start(&mut engine, &mut store) else {
        panic!("expected a trial");
    };
    let answer = select(0, stimulus.ink.name());

    clock.advance(SEC);
    engine.poll(&mut store, &answer).unwrap();
    let after_first = store.clone();
    engine.poll(&mut store, &answer).unwrap();

    assert_eq!(store, after_first);
    let log = engine.log(&store).unwrap();
    assert_eq!(log.len(), 1);
    assert!(log.records()[0].correct());
}

#[test]
fn mental_rotation_accuracy_and_timeouts() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let mut engine = engine(RotationTest::new(RotationConfig::default()), &clock);
    let mut view = start(&mut engine, &mut store);

    for trial in 0..15 {
        let View::Trial {
            index, stimulus, ..
        } = &view
        else {
            panic!("expected a trial, got {view:?}");
        };
        assert_eq!(*index, trial);
        assert_eq!(stimulus.options.iter().filter(|o| o.is_match).count(), 1);

        let directive = if trial < 3 {
            clock.advance(10 * SEC);
            assert_eq!(engine.poll(&mut store, &Input::Idle).unwrap(), Directive::Rerun);
            engine.poll(&mut store, &Input::Idle).unwrap()
        } else {
            clock.advance(2 * SEC);
            let side = stimulus.match_side();
            let choice = if trial < 12 { side } else { side.other() };
            engine.poll(&mut store, &select(trial, choice.label())).unwrap()
        };
        let Directive::Render(next) = directive else {
            panic!("unexpected {directive:?}");
        };
        view = next;
    }

    let View::Completed(ScoreSummary::MentalRotation(summary)) = view else {
        panic!("expected completion, got {view:?}");
    };
    assert_eq!(summary.trials, 15);
    assert_eq!(summary.timed_out, 3);
    assert_eq!(summary.correct, 9);
    assert!((summary.accuracy.unwrap() - 60.0).abs() < 1e-9);
    // (3*10 + 12*2) / 15
    assert!((summary.avg_reaction_time_secs.unwrap() - 3.6).abs() < 1e-9);

    let state = engine.state(&store).unwrap();
    assert_eq!(state.phase, TestPhase::Completed);
    let mut sets: Vec<usize> = state.log.iter().map(|r| r.stimulus.set).collect();
    sets.sort_unstable();
    sets.dedup();
    assert_eq!(sets.len(), 15);
}

#[test]
fn controller_rejects_skips_and_clears_on_advance() {
    let mut store = MemoryStore::new();
    store.set("session.stage", serde_json::json!("arithmetic"));
    store.set(
        "session.profile",
        serde_json::to_value(intake().profile).unwrap(),
    );
    let mut state: TestState<ArithmeticQuestion, Vec<ArithmeticQuestion>> = TestState::default();
    state.begin(0, 1, Vec::new());
    save(&mut store, "arithmetic.state", &state).unwrap();

    let mut controller = StageController::new(&mut store);
    assert!(matches!(
        controller.advance(Stage::MentalRotation),
        Err(AssessmentError::InvalidTransition { .. })
    ));
    assert_eq!(controller.current_stage().unwrap(), Stage::Arithmetic);
    controller.advance(Stage::Stroop).unwrap();
    assert_eq!(controller.current_stage().unwrap(), Stage::Stroop);
    assert!(!store.contains("arithmetic.state"));
}

fn small_config() -> AssessmentConfig {
    AssessmentConfig {
        seed: Some(5),
        arithmetic: ArithmeticConfig {
            question_pool: 3,
            ..Default::default()
        },
        stroop: StroopConfig {
            trials: 3,
            ..Default::default()
        },
        rotation: RotationConfig {
            trials: 2,
            ..Default::default()
        },
    }
}

/// Answers every trial of the current test correctly, one second apart,
/// and returns the completion screen.
fn answer_all(assessment: &mut Assessment<MemoryStore, ManualClock, StdRng>, clock: &ManualClock) -> Screen {
    let mut screen = assessment.poll(&Input::Start).unwrap();
    loop {
        clock.advance(SEC);
        let input = match &screen {
            Screen::Arithmetic(View::Trial { index, stimulus, .. }) => {
                submit(*index, &stimulus.answer.to_string())
            }
            Screen::Stroop(View::Trial { index, stimulus, .. }) => {
                select(*index, stimulus.ink.name())
            }
            Screen::MentalRotation(View::Trial { index, stimulus, .. }) => {
                select(*index, stimulus.match_side().label())
            }
            _ => return screen,
        };
        screen = assessment.poll(&input).unwrap();
    }
}

#[test]
fn full_session_walkthrough() {
    let clock = ManualClock::new();
    let mut assessment =
        Assessment::from_config(small_config(), MemoryStore::new(), clock.clone()).unwrap();

    assert_eq!(assessment.poll(&Input::Idle).unwrap(), Screen::Consent { error: None });
    assert!(matches!(
        assessment.poll(&Input::Start).unwrap(),
        Screen::Consent { error: None }
    ));
    let refused = Intake {
        consent: false,
        ..intake()
    };
    assert!(matches!(
        assessment.poll(&Input::Register(refused)).unwrap(),
        Screen::Consent { error: Some(_) }
    ));
    assert_eq!(assessment.poll(&Input::Register(intake())).unwrap(), Screen::Instructions);
    assert!(matches!(
        assessment.poll(&Input::Continue).unwrap(),
        Screen::Arithmetic(View::Start { trials: 3, .. })
    ));

    let done = answer_all(&mut assessment, &clock);
    assert!(matches!(done, Screen::Arithmetic(View::Completed(_))));
    let csv = assessment.trial_log_csv(Stage::Arithmetic).unwrap().unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(matches!(
        assessment.poll(&Input::Continue).unwrap(),
        Screen::Stroop(View::Start { trials: 3, .. })
    ));
    assert_eq!(assessment.trial_log_csv(Stage::Arithmetic).unwrap(), None);

    let done = answer_all(&mut assessment, &clock);
    assert!(matches!(done, Screen::Stroop(View::Completed(_))));
    assessment.poll(&Input::Continue).unwrap();

    let done = answer_all(&mut assessment, &clock);
    assert!(matches!(done, Screen::MentalRotation(View::Completed(_))));

    let Screen::Final { profile, summaries } = assessment.poll(&Input::Continue).unwrap() else {
        panic!("expected the final screen");
    };
    assert_eq!(profile.unwrap().name, "Ada");
    let stages: Vec<Stage> = summaries.iter().map(ScoreSummary::stage).collect();
    assert_eq!(stages, [Stage::Arithmetic, Stage::Stroop, Stage::MentalRotation]);
    assert!(summaries[0].headline().is_some());
    assert_eq!(summaries[2].headline(), Some(100.0));

    let results: serde_json::Value =
        serde_json::from_str(&assessment.results_json().unwrap()).unwrap();
    assert_eq!(results["participant"]["name"], "Ada");
    assert_eq!(results["scores"][1]["test"], "stroop");

    // No working state survives the run.
    let keys = assessment.store().keys();
    assert!(keys.iter().all(|k| k.starts_with("session.") || k.starts_with("scores.")), "{keys:?}");
}

/// Drives an [`Assessment`] the way a stateless host does: a new instance
/// around the same store for every call.
struct Rebuilt {
    config: AssessmentConfig,
    clock: ManualClock,
    store: Option<MemoryStore>,
}

impl Rebuilt {
    fn at(stage: Stage, config: AssessmentConfig, clock: &ManualClock) -> Self {
        let mut store = MemoryStore::new();
        save(&mut store, &SESSION.key("stage"), &stage).unwrap();
        save(&mut store, &SESSION.key("profile"), &intake().profile).unwrap();
        Self {
            config,
            clock: clock.clone(),
            store: Some(store),
        }
    }

    fn poll(&mut self, input: &Input) -> Screen {
        let store = self.store.take().unwrap();
        let mut assessment =
            Assessment::from_config(self.config.clone(), store, self.clock.clone()).unwrap();
        let screen = assessment.poll(input).unwrap();
        self.store = Some(assessment.into_store());
        screen
    }

    fn store(&self) -> &MemoryStore {
        self.store.as_ref().unwrap()
    }
}

#[test]
fn stroop_survives_a_rebuild_on_every_call() {
    let clock = ManualClock::new();
    let config = AssessmentConfig {
        seed: Some(5),
        stroop: StroopConfig {
            trials: 12,
            ..Default::default()
        },
        ..Default::default()
    };
    let deadline = config.stroop.deadline();
    let mut host = Rebuilt::at(Stage::Stroop, config, &clock);

    assert!(matches!(host.poll(&Input::Idle), Screen::Stroop(View::Start { trials: 12, .. })));
    let mut screen = host.poll(&Input::Start);
    let mut shown = Vec::new();
    let summary = loop {
        match screen {
            Screen::Stroop(View::Trial { index, stimulus, .. }) => {
                assert_eq!(index, shown.len());
                // A re-render from a fresh instance shows the cached stimulus.
                assert!(matches!(
                    host.poll(&Input::Idle),
                    Screen::Stroop(View::Trial { stimulus: ref again, .. }) if *again == stimulus
                ));
                shown.push(stimulus.clone());
                if index % 2 == 0 {
                    clock.advance(Duration::from_millis(700));
                    let answer = select(index, stimulus.ink.name());
                    screen = host.poll(&answer);
                    let after = host.store().clone();
                    host.poll(&answer);
                    assert_eq!(host.store(), &after);
                } else {
                    clock.advance(deadline + SEC);
                    assert_eq!(host.poll(&Input::Idle), Screen::Rerun);
                    screen = host.poll(&Input::Idle);
                }
            }
            Screen::Stroop(View::Completed(ScoreSummary::Stroop(summary))) => break summary,
            other => panic!("unexpected {other:?}"),
        }
    };

    assert_eq!(shown.len(), 12);
    assert!(shown.iter().any(|s| *s != shown[0]), "{shown:?}");
    assert_eq!(summary.trials, 12);
    assert_eq!(summary.correct, 6);

    let key = TimedTrialEngine::<StroopTest, ManualClock, StdRng>::state_key();
    let state: StateOf<StroopTest> = cogex_store::load(host.store(), &key).unwrap().unwrap();
    let indices: Vec<usize> = state.log.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert_eq!(state.log.timed_out_count(), 6);
    assert!(state.log.iter().zip(&shown).all(|(r, s)| r.stimulus == *s));
}

#[test]
fn rotation_sides_vary_when_the_engine_is_rebuilt() {
    let clock = ManualClock::new();
    let mut store = MemoryStore::new();
    let fresh = || {
        TimedTrialEngine::new(
            RotationTest::new(RotationConfig::default()),
            clock.clone(),
            StdRng::seed_from_u64(5),
        )
    };

    fresh().poll(&mut store, &Input::Idle).unwrap();
    let mut directive = fresh().poll(&mut store, &Input::Start).unwrap();
    let mut sides = Vec::new();
    while let Directive::Render(View::Trial { index, stimulus, .. }) = directive {
        sides.push(stimulus.match_side());
        clock.advance(SEC);
        directive = fresh()
            .poll(&mut store, &select(index, stimulus.match_side().label()))
            .unwrap();
    }

    assert!(matches!(directive, Directive::Render(View::Completed(_))));
    assert_eq!(sides.len(), 15);
    assert!(sides.iter().any(|s| *s != sides[0]), "{sides:?}");
}
