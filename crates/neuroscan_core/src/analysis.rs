//! Analysis backends and the cancellable worker that runs them.

use crate::error::{UploadError, UploadResult};
use crate::file::SelectedFile;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// Verdict produced by [`SimulatedAnalyzer`].
pub const GLIOMA_VERDICT: &str = "🧠 Glioma tumor detected in the left hemisphere.";

/// Time the simulated analysis takes.
pub const SIMULATED_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed { verdict: String },
    /// The run was cancelled before it produced a verdict.
    Cancelled,
}

/// Signal observed by a running analysis. Cancelled once the paired sender
/// is dropped.
#[derive(Debug)]
pub struct CancelToken {
    rx: Receiver<()>,
}

impl CancelToken {
    /// Returns the sender that keeps the token alive, and the token.
    pub fn pair() -> (Sender<()>, CancelToken) {
        let (tx, rx) = mpsc::channel();
        (tx, CancelToken { rx })
    }

    pub fn is_cancelled(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleeps for `timeout` unless cancelled first. Returns `true` on cancel.
    pub fn wait(&self, timeout: Duration) -> bool {
        !matches!(
            self.rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }
}

/// Something that can turn a selected file into a verdict.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, file: &SelectedFile, cancel: &CancelToken) -> UploadResult<AnalysisOutcome>;
}

/// Stand-in for an inference service: waits, then returns a fixed verdict.
#[derive(Debug, Clone)]
pub struct SimulatedAnalyzer {
    pub delay: Duration,
    pub verdict: String,
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self {
            delay: SIMULATED_DELAY,
            verdict: GLIOMA_VERDICT.to_string(),
        }
    }
}

impl Analyzer for SimulatedAnalyzer {
    fn analyze(&self, file: &SelectedFile, cancel: &CancelToken) -> UploadResult<AnalysisOutcome> {
        tracing::debug!("Simulating analysis of {} ({})", file.name, file.mime);
        if cancel.wait(self.delay) {
            return Ok(AnalysisOutcome::Cancelled);
        }
        Ok(AnalysisOutcome::Completed {
            verdict: self.verdict.clone(),
        })
    }
}

/// One analysis run on a worker thread.
///
/// Dropping the task cancels it and discards any late result.
#[derive(Debug)]
pub struct AnalysisTask {
    cancel: Option<Sender<()>>,
    rx: Receiver<UploadResult<AnalysisOutcome>>,
    started: Instant,
}

impl AnalysisTask {
    pub fn spawn(analyzer: Arc<dyn Analyzer>, file: SelectedFile) -> UploadResult<Self> {
        let (cancel_tx, token) = CancelToken::pair();
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("analysis".into())
            .spawn(move || {
                let result = analyzer.analyze(&file, &token);
                // Receiver gone means the page moved on.
                let _ = tx.send(result);
            })
            .map_err(|e| UploadError::AnalysisFailed(format!("cannot start worker: {e}")))?;
        Ok(Self {
            cancel: Some(cancel_tx),
            rx,
            started: Instant::now(),
        })
    }

    /// Non-blocking check for the result.
    pub fn try_finish(&mut self) -> Option<UploadResult<AnalysisOutcome>> {
        match self.rx.try_recv() {
            Ok(result) => {
                tracing::debug!("Analysis finished after {:.1?}", self.started.elapsed());
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(UploadError::AnalysisFailed(
                "analysis worker stopped unexpectedly".into(),
            ))),
        }
    }

    pub fn cancel(&mut self) {
        if self.cancel.take().is_some() {
            tracing::debug!("Analysis cancelled after {:.1?}", self.started.elapsed());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for AnalysisTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
