use std::time::Duration;

/// How a test's clock runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Each trial has its own window; expiry records a timeout and moves on.
    PerTrial(Duration),
    /// One countdown for the whole test; expiry ends the test.
    WholeTest(Duration),
}

impl Deadline {
    pub fn limit(&self) -> Duration {
        match self {
            Self::PerTrial(d) | Self::WholeTest(d) => *d,
        }
    }

    /// Time left given the elapsed time of the relevant window.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.limit().saturating_sub(elapsed)
    }
}

/// A test's verdict on one response event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgement {
    /// Resolves the trial. `response` is the normalised text recorded.
    Accepted { correct: bool, response: String },
    /// Malformed input; the trial stays open and nothing is recorded.
    Rejected,
    /// Not a response this test understands.
    Ignored,
}
