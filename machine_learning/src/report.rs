use log::info;
use serde::Serialize;

/// The average loss over the steps taken since the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossReport {
    /// 0-based epoch the report was produced in.
    pub epoch: usize,
    /// Amount of steps taken since training started.
    pub step: usize,
    /// Amount of steps the average covers.
    pub steps: usize,
    pub avg_loss: f64,
}

/// Per-epoch training statistics returned by `train`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochStats {
    /// 0-based epoch number.
    pub epoch: usize,
    /// Amount of steps taken during the epoch.
    pub steps: usize,
    /// Mean training loss over the epoch's batches.
    pub avg_loss: f64,
    /// Wall-clock duration of the epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// The loss of a model over a whole dataset, and its accuracy when the targets are classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: Option<f64>,
}

/// Receives the periodic loss reports of a training run.
///
/// Reports are for observability only, they never affect the training.
pub trait ReportSink {
    fn report(&mut self, report: LossReport);
}

/// Logs every report at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, report: LossReport) {
        info!(
            epoch = report.epoch,
            step = report.step,
            steps = report.steps,
            avg_loss = report.avg_loss;
            "training loss"
        );
    }
}

impl ReportSink for Vec<LossReport> {
    fn report(&mut self, report: LossReport) {
        self.push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_serialize_with_their_field_names() {
        let report = LossReport {
            epoch: 1,
            step: 20,
            steps: 10,
            avg_loss: 0.5,
        };

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "epoch": 1, "step": 20, "steps": 10, "avg_loss": 0.5 })
        );
    }
}
