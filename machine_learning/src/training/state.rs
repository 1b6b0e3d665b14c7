/// The lifecycle of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Training {
        epoch: usize,
    },
    Done,
}

/// The counters of a training run.
///
/// The running loss only covers the steps taken since the last report, it's reset every time
/// a report is produced.
#[derive(Debug, Clone, Default)]
pub struct TrainingState {
    phase: Phase,
    epoch: usize,
    step: usize,
    running_loss: f64,
    running_steps: usize,
}

impl TrainingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the current 0-based epoch.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Returns the amount of steps completed since training started.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub(super) fn start_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
        self.phase = Phase::Training { epoch };
    }

    pub(super) fn finish(&mut self) {
        self.phase = Phase::Done;
    }

    /// Counts a completed step and its loss.
    pub(super) fn record(&mut self, loss: f64) {
        self.step += 1;
        self.running_loss += loss;
        self.running_steps += 1;
    }

    /// Adds the loss of a failed step to the pending report without counting the step as
    /// completed.
    pub(super) fn record_failed(&mut self, loss: f64) {
        self.running_loss += loss;
        self.running_steps += 1;
    }

    /// Takes the average loss of the steps since the last call, `None` if there were none.
    pub(super) fn take_running(&mut self) -> Option<(usize, f64)> {
        if self.running_steps == 0 {
            return None;
        }

        let steps = self.running_steps;
        let avg = self.running_loss / steps as f64;

        self.running_loss = 0.;
        self.running_steps = 0;
        Some((steps, avg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_loss_resets_when_taken() {
        let mut state = TrainingState::new();
        assert_eq!(state.take_running(), None);

        state.record(1.);
        state.record(3.);
        assert_eq!(state.take_running(), Some((2, 2.)));
        assert_eq!(state.take_running(), None);
        assert_eq!(state.step(), 2);
    }

    #[test]
    fn failed_steps_reach_the_report_but_not_the_counter() {
        let mut state = TrainingState::new();
        state.record(1.);
        state.record_failed(f64::INFINITY);

        let (steps, avg) = state.take_running().unwrap();
        assert_eq!(steps, 2);
        assert!(!avg.is_finite());
        assert_eq!(state.step(), 1);
    }

    #[test]
    fn phases_advance() {
        let mut state = TrainingState::new();
        assert_eq!(state.phase(), Phase::Idle);

        state.start_epoch(1);
        assert_eq!(state.phase(), Phase::Training { epoch: 1 });
        assert_eq!(state.epoch(), 1);

        state.finish();
        assert!(state.is_done());
    }
}
