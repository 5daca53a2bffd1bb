//! State of the upload page: selected file, preview, analysis run and result.

use crate::analysis::{AnalysisOutcome, AnalysisTask, Analyzer, SimulatedAnalyzer};
use crate::config::AppConfig;
use crate::error::UploadError;
use crate::file::{CandidateFile, FileFilter, SelectedFile};
use crate::preview::{PreviewRef, PreviewRegistry};
use crate::session::{GuardOutcome, Navigator, SessionGuard, SessionStore};
use std::sync::Arc;

/// Where the analyze flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No file selected.
    Idle,
    /// File selected, nothing running.
    Ready,
    Processing,
    /// A verdict is on screen and nothing is running.
    Done,
}

pub struct UploadPage {
    filter: FileFilter,
    previews: PreviewRegistry,
    analyzer: Arc<dyn Analyzer>,
    guard: SessionGuard,
    selected: Option<SelectedFile>,
    preview: Option<PreviewRef>,
    task: Option<AnalysisTask>,
    result: Option<String>,
    error: Option<UploadError>,
    drag_active: bool,
}

impl UploadPage {
    pub fn new(analyzer: Arc<dyn Analyzer>, previews: PreviewRegistry) -> Self {
        Self {
            filter: FileFilter,
            previews,
            analyzer,
            guard: SessionGuard::default(),
            selected: None,
            preview: None,
            task: None,
            result: None,
            error: None,
            drag_active: false,
        }
    }

    /// Page wired to the simulated analyzer described by `cfg`.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let analyzer = SimulatedAnalyzer {
            delay: cfg.analysis_delay(),
            verdict: cfg.verdict.clone(),
        };
        Self::new(Arc::new(analyzer), PreviewRegistry::new(cfg.preview_size))
    }

    /// Runs the session guard. Only the first call per mount has an effect.
    pub fn mount(
        &mut self,
        store: &dyn SessionStore,
        navigator: &mut dyn Navigator,
    ) -> GuardOutcome {
        self.guard.check_on_mount(store, navigator)
    }

    /// Cancels any running analysis and releases the preview.
    pub fn unmount(&mut self) {
        self.task = None;
        self.preview = None;
        self.selected = None;
        self.result = None;
        self.error = None;
        self.drag_active = false;
        self.guard = SessionGuard::default();
    }

    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    /// Handles one drop or dialog interaction. Returns `true` when the
    /// selected file changed.
    ///
    /// A new file clears the previous verdict and error and cancels any
    /// running analysis. A rejected interaction leaves the selection as is
    /// and records the rejection.
    pub fn accept_files(&mut self, files: Vec<CandidateFile>) -> bool {
        match self.filter.select(files) {
            Ok(None) => false,
            Ok(Some(file)) => {
                tracing::info!("Selected {} ({})", file.name, file.mime);
                if let Some(mut task) = self.task.take() {
                    task.cancel();
                }
                self.result = None;
                self.error = None;
                // release the previous reference before creating the next one
                self.preview = None;
                self.preview = Some(self.previews.create(&file));
                self.selected = Some(file);
                true
            }
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    pub fn can_analyze(&self) -> bool {
        self.selected.is_some() && !self.is_processing()
    }

    /// Starts an analysis run. No-op (returns `false`) when
    /// [`UploadPage::can_analyze`] is false.
    pub fn analyze(&mut self) -> bool {
        if !self.can_analyze() {
            return false;
        }
        let Some(file) = self.selected.clone() else {
            return false;
        };
        self.error = None;
        tracing::info!("Analyzing {}", file.name);
        match AnalysisTask::spawn(self.analyzer.clone(), file) {
            Ok(task) => {
                self.task = Some(task);
                true
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error = Some(e);
                false
            }
        }
    }

    /// Applies a finished analysis, if any. Returns `true` when state changed.
    pub fn poll(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let Some(result) = task.try_finish() else {
            return false;
        };
        self.task = None;
        match result {
            Ok(AnalysisOutcome::Completed { verdict }) => {
                tracing::info!("Analysis complete: {verdict}");
                self.result = Some(verdict);
            }
            Ok(AnalysisOutcome::Cancelled) => {}
            Err(e) => {
                tracing::warn!("{e}");
                self.error = Some(e);
            }
        }
        true
    }

    pub fn phase(&self) -> Phase {
        if self.is_processing() {
            Phase::Processing
        } else if self.selected.is_none() {
            Phase::Idle
        } else if self.result.is_some() {
            Phase::Done
        } else {
            Phase::Ready
        }
    }

    pub fn is_processing(&self) -> bool {
        self.task.is_some()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn guard_outcome(&self) -> Option<GuardOutcome> {
        self.guard.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CancelToken;
    use crate::error::UploadResult;
    use crate::session::{MemorySessionStore, Route};
    use std::thread;
    use std::time::{Duration, Instant};

    struct Failing;

    impl Analyzer for Failing {
        fn analyze(&self, _: &SelectedFile, _: &CancelToken) -> UploadResult<AnalysisOutcome> {
            Err(UploadError::AnalysisFailed("backend offline".into()))
        }
    }

    fn page_with_delay(ms: u64) -> (UploadPage, PreviewRegistry) {
        let registry = PreviewRegistry::new(32);
        let analyzer = SimulatedAnalyzer {
            delay: Duration::from_millis(ms),
            verdict: "done".into(),
        };
        (UploadPage::new(Arc::new(analyzer), registry.clone()), registry)
    }

    fn file(name: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, vec![0u8; 8])
    }

    fn settle(page: &mut UploadPage) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while page.is_processing() {
            page.poll();
            assert!(Instant::now() < deadline, "analysis did not settle");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn starts_idle_with_trigger_disabled() {
        let (mut page, _) = page_with_delay(1);
        assert_eq!(page.phase(), Phase::Idle);
        assert!(!page.can_analyze());
        assert!(!page.analyze());
        assert!(!page.is_processing());
    }

    #[test]
    fn accepting_replaces_selection_and_releases_preview() {
        let (mut page, registry) = page_with_delay(1);
        assert!(page.accept_files(vec![file("a.png")]));
        let first_id = page.preview().unwrap().id();
        assert!(page.accept_files(vec![file("b.jpg")]));
        assert_eq!(page.selected().unwrap().name, "b.jpg");
        assert_ne!(page.preview().unwrap().id(), first_id);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(page.phase(), Phase::Ready);
    }

    #[test]
    fn rejected_file_keeps_selection_and_reports() {
        let (mut page, _) = page_with_delay(1);
        page.accept_files(vec![file("a.png")]);
        assert!(!page.accept_files(vec![file("virus.exe")]));
        assert_eq!(page.selected().unwrap().name, "a.png");
        assert!(matches!(
            page.error(),
            Some(UploadError::InvalidFileType { .. })
        ));
        page.dismiss_error();
        assert!(page.error().is_none());
    }

    #[test]
    fn empty_drop_is_ignored() {
        let (mut page, _) = page_with_delay(1);
        assert!(!page.accept_files(Vec::new()));
        assert!(page.selected().is_none());
        assert!(page.error().is_none());
    }

    #[test]
    fn analyze_runs_to_done_and_can_rerun() {
        let (mut page, _) = page_with_delay(10);
        page.accept_files(vec![file("scan.png")]);
        assert!(page.analyze());
        assert_eq!(page.phase(), Phase::Processing);
        assert!(!page.can_analyze());
        assert!(!page.analyze());
        settle(&mut page);
        assert_eq!(page.phase(), Phase::Done);
        assert_eq!(page.result(), Some("done"));
        assert!(page.can_analyze());

        assert!(page.analyze());
        assert_eq!(page.phase(), Phase::Processing);
        settle(&mut page);
        assert_eq!(page.result(), Some("done"));
    }

    #[test]
    fn new_file_clears_result_and_cancels_run() {
        let (mut page, _) = page_with_delay(10);
        page.accept_files(vec![file("a.png")]);
        page.analyze();
        settle(&mut page);
        assert_eq!(page.phase(), Phase::Done);

        page.accept_files(vec![file("b.png")]);
        assert_eq!(page.result(), None);
        assert_eq!(page.phase(), Phase::Ready);

        let (mut slow, _) = page_with_delay(60_000);
        slow.accept_files(vec![file("a.png")]);
        slow.analyze();
        slow.accept_files(vec![file("b.png")]);
        assert!(!slow.is_processing());
        assert!(slow.can_analyze());
    }

    #[test]
    fn failure_keeps_file_and_reenables_trigger() {
        let mut page = UploadPage::new(Arc::new(Failing), PreviewRegistry::new(16));
        page.accept_files(vec![file("scan.png")]);
        assert!(page.analyze());
        settle(&mut page);
        assert!(matches!(page.error(), Some(UploadError::AnalysisFailed(_))));
        assert!(page.result().is_none());
        assert_eq!(page.phase(), Phase::Ready);
        assert!(page.can_analyze());
    }

    #[test]
    fn unmount_releases_everything() {
        let (mut page, registry) = page_with_delay(60_000);
        page.accept_files(vec![file("scan.png")]);
        page.analyze();
        page.unmount();
        assert_eq!(registry.live_count(), 0);
        assert!(!page.is_processing());
        assert_eq!(page.phase(), Phase::Idle);
        assert_eq!(page.guard_outcome(), None);
    }

    #[test]
    fn mount_without_session_redirects_once() {
        let (mut page, _) = page_with_delay(1);
        let store = MemorySessionStore::default();
        let mut nav = Vec::new();
        assert_eq!(page.mount(&store, &mut nav), GuardOutcome::Redirected);
        assert_eq!(page.mount(&store, &mut nav), GuardOutcome::AlreadyChecked);
        assert_eq!(nav, vec![Route::Login]);
    }

    #[test]
    fn from_config_uses_configured_delay() {
        let cfg = AppConfig {
            analysis_delay_ms: 5,
            verdict: "configured".into(),
            ..AppConfig::default()
        };
        let mut page = UploadPage::from_config(&cfg);
        page.accept_files(vec![file("scan.jpeg")]);
        page.analyze();
        settle(&mut page);
        assert_eq!(page.result(), Some("configured"));
    }
}
