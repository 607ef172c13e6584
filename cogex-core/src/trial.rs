use crate::Stimulus;
use serde::{Deserialize, Serialize};

/// Lifecycle of one timed test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    #[default]
    NotStarted,
    Running,
    Completed,
}

/// Terminal state of a trial. A trial reaches exactly one of these, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl TrialOutcome {
    pub fn answered(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord<S> {
    pub index: usize,
    pub stimulus: S,
    pub label: String,
    pub expected: String,
    pub response: Option<String>,
    pub reaction_time_ns: Option<u64>,
    pub outcome: TrialOutcome,
}

impl<S: Stimulus> TrialRecord<S> {
    pub fn answered(
        index: usize,
        stimulus: S,
        response: String,
        reaction_time_ns: u64,
        correct: bool,
    ) -> Self {
        Self {
            index,
            label: stimulus.label().to_string(),
            expected: stimulus.expected(),
            stimulus,
            response: Some(response),
            reaction_time_ns: Some(reaction_time_ns),
            outcome: TrialOutcome::answered(correct),
        }
    }

    /// No response and no reaction time; never correct.
    pub fn timeout(index: usize, stimulus: S) -> Self {
        Self {
            index,
            label: stimulus.label().to_string(),
            expected: stimulus.expected(),
            stimulus,
            response: None,
            reaction_time_ns: None,
            outcome: TrialOutcome::TimedOut,
        }
    }
}

impl<S> TrialRecord<S> {
    pub fn correct(&self) -> bool {
        self.outcome.is_correct()
    }

    pub fn timed_out(&self) -> bool {
        self.outcome.timed_out()
    }

    pub fn reaction_time_secs(&self) -> Option<f64> {
        self.reaction_time_ns.map(|ns| ns as f64 / 1e9)
    }
}

/// Append-only, ordered log of resolved trials for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialLog<S> {
    records: Vec<TrialRecord<S>>,
}

impl<S> Default for TrialLog<S> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<S> TrialLog<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TrialRecord<S>) {
        debug_assert_eq!(record.index, self.records.len(), "trials are logged in order");
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialRecord<S>> {
        self.records.iter()
    }

    pub fn records(&self) -> &[TrialRecord<S>] {
        &self.records
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct()).count()
    }

    pub fn timed_out_count(&self) -> usize {
        self.records.iter().filter(|r| r.timed_out()).count()
    }
}

impl<'a, S> IntoIterator for &'a TrialLog<S> {
    type Item = &'a TrialRecord<S>;
    type IntoIter = std::slice::Iter<'a, TrialRecord<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, InkColor, StroopStimulus};

    fn stimulus() -> StroopStimulus {
        StroopStimulus::incongruent(InkColor::Red, InkColor::Green)
    }

    #[test]
    fn each_record_has_exactly_one_terminal_state() {
        let answered = TrialRecord::answered(0, stimulus(), "GREEN".into(), 800_000_000, true);
        let wrong = TrialRecord::answered(1, stimulus(), "RED".into(), 900_000_000, false);
        let missed = TrialRecord::timeout(2, stimulus());

        for record in [&answered, &wrong, &missed] {
            let states = [
                record.outcome == TrialOutcome::Correct,
                record.outcome == TrialOutcome::Incorrect,
                record.timed_out(),
            ];
            assert_eq!(states.iter().filter(|s| **s).count(), 1);
        }
        assert!(!missed.correct());
        assert_eq!(missed.response, None);
        assert_eq!(answered.reaction_time_secs(), Some(0.8));
    }

    #[test]
    fn record_captures_label_and_ground_truth() {
        let record = TrialRecord::timeout(0, stimulus());
        assert_eq!(record.label, Condition::Incongruent.as_str());
        assert_eq!(record.expected, "green");
    }

    #[test]
    fn log_counts() {
        let mut log = TrialLog::new();
        log.push(TrialRecord::answered(0, stimulus(), "GREEN".into(), 1, true));
        log.push(TrialRecord::timeout(1, stimulus()));
        assert_eq!(log.len(), 2);
        assert_eq!(log.correct_count(), 1);
        assert_eq!(log.timed_out_count(), 1);
        assert_eq!((&log).into_iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1]);
    }
}
