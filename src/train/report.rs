use std::fmt;

use serde::{Serialize, Deserialize};

/// Summary of one `train` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Examples passed through `train_on_example`.
    pub examples: usize,
    /// Weight updates applied, one per completed batch.
    pub updates: usize,
    /// Examples of an unfinished final batch. Their gradients stay in the
    /// network's accumulators and were not applied.
    pub pending: usize,
    /// Mean per-example squared error over the run; 0 when no example ran.
    pub mean_loss: f64,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

/// Tally of a `test` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
}

impl TestResults {
    /// Fraction of examples judged correct, or `None` if nothing was tested.
    pub fn rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }

    pub(crate) fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.total += 1;
    }
}

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test Results:")?;
        writeln!(f, "    Total Correct: {}", self.correct)?;
        writeln!(f, "    Total Incorrect: {}", self.incorrect)?;
        writeln!(f, "    Total Examples: {}", self.total)?;
        match self.rate() {
            Some(rate) => write!(f, "    Correct Rate: {:.4}", rate),
            None => write!(f, "    Correct Rate: n/a"),
        }
    }
}
