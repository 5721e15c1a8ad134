// crates/tabflow-core/src/runner.rs
//
// Sequences the four stages. Transitions are strictly forward:
// Idle -> Extracting -> Transforming -> Loading -> Done, with Failed
// absorbing the first error from any stage. Every state boundary is
// reported to the progress log; stage errors additionally get a final
// failure entry (best effort, since the sink itself may be the thing
// that failed) before the error propagates to the caller.

use polars::prelude::DataFrame;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract;
use crate::load;
use crate::progress::ProgressLog;
use crate::transform::{self, ReferenceTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Extracting,
    Transforming,
    Loading,
    Done,
    Failed,
}

pub struct PipelineRunner<'a> {
    name: &'a str,
    log: &'a ProgressLog,
    state: PipelineState,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(name: &'a str, log: &'a ProgressLog) -> Self {
        Self {
            name,
            log,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Drive the three stage closures through the state machine and
    /// return the loaded frame for any post-run reporting.
    pub fn run<E, T, L>(&mut self, extract: E, transform: T, load: L) -> Result<DataFrame>
    where
        E: FnOnce() -> Result<DataFrame>,
        T: FnOnce(DataFrame) -> Result<DataFrame>,
        L: FnOnce(&DataFrame) -> Result<()>,
    {
        self.log.record(&format!("{}: ETL job started", self.name))?;

        let extracted = self.stage(PipelineState::Extracting, "Extract", extract)?;
        let transformed = self.stage(PipelineState::Transforming, "Transform", || {
            transform(extracted)
        })?;
        self.stage(PipelineState::Loading, "Load", || {
            load(&transformed).map(|()| DataFrame::empty())
        })?;

        self.state = PipelineState::Done;
        self.log.record(&format!("{}: ETL job ended", self.name))?;
        info!(pipeline = self.name, rows = transformed.height(), "pipeline done");
        Ok(transformed)
    }

    fn stage<F>(&mut self, state: PipelineState, label: &str, body: F) -> Result<DataFrame>
    where
        F: FnOnce() -> Result<DataFrame>,
    {
        self.state = state;
        self.log
            .record(&format!("{}: {label} phase started", self.name))?;
        match body() {
            Ok(df) => {
                self.log
                    .record(&format!("{}: {label} phase ended", self.name))?;
                Ok(df)
            }
            Err(err) => {
                self.state = PipelineState::Failed;
                error!(pipeline = self.name, phase = label, %err, "pipeline failed");
                // The sink may be what failed; a second failure here
                // must not mask the original error.
                let _ = self
                    .log
                    .record(&format!("{}: {label} phase failed: {err}", self.name));
                Err(err)
            }
        }
    }
}

/// Run a fully configured pipeline end to end: standard extract
/// adapters, the configured transform plan, every configured target.
pub fn execute(config: &PipelineConfig, reference: Option<&ReferenceTable>) -> Result<DataFrame> {
    let log = ProgressLog::new(&config.log_path);
    let mut runner = PipelineRunner::new(&config.name, &log);
    runner.run(
        || extract::run(&config.sources, &config.contract),
        |df| transform::apply(df, &config.transforms, reference),
        |df| load::run(df, &config.targets),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use polars::prelude::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![Series::new("price".into(), &[1.0f64, 2.0]).into()]).unwrap()
    }

    #[test]
    fn successful_run_logs_every_phase_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.txt");
        let log = ProgressLog::new(&log_path);
        let mut runner = PipelineRunner::new("cars", &log);

        let out = runner
            .run(|| Ok(frame()), Ok, |_| Ok(()))
            .unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(runner.state(), PipelineState::Done);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let messages: Vec<&str> = contents
            .lines()
            .map(|line| line.split(" - ").nth(1).unwrap())
            .collect();
        assert_eq!(
            messages,
            vec![
                "cars: ETL job started",
                "cars: Extract phase started",
                "cars: Extract phase ended",
                "cars: Transform phase started",
                "cars: Transform phase ended",
                "cars: Load phase started",
                "cars: Load phase ended",
                "cars: ETL job ended",
            ]
        );
    }

    #[test]
    fn stage_error_moves_to_failed_and_logs_it() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.txt");
        let log = ProgressLog::new(&log_path);
        let mut runner = PipelineRunner::new("gdp", &log);

        let result = runner.run(
            || {
                Err(EtlError::Fetch {
                    url: "https://example.test".to_string(),
                    detail: "connection refused".to_string(),
                })
            },
            Ok,
            |_| Ok(()),
        );
        assert!(matches!(result, Err(EtlError::Fetch { .. })));
        assert_eq!(runner.state(), PipelineState::Failed);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("gdp: Extract phase failed: fetch failed"));
        // Forward-only: no transform or load entries after the failure.
        assert!(!contents.contains("Transform phase started"));
    }

    #[test]
    fn load_failure_leaves_no_done_state() {
        let dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(dir.path().join("log.txt"));
        let mut runner = PipelineRunner::new("banks", &log);

        let result = runner.run(
            || Ok(frame()),
            Ok,
            |_| {
                Err(EtlError::Storage {
                    detail: "disk full".to_string(),
                })
            },
        );
        assert!(matches!(result, Err(EtlError::Storage { .. })));
        assert_eq!(runner.state(), PipelineState::Failed);
    }
}
