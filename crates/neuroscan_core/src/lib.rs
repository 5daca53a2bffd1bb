//! Core of the NeuroScan upload page: file acceptance, previews, the session
//! guard and the (simulated) analysis flow. Nothing here depends on the GUI
//! toolkit.

pub mod analysis;
pub mod config;
pub mod error;
pub mod file;
pub mod page;
pub mod preview;
pub mod session;

pub use analysis::{
    AnalysisOutcome, AnalysisTask, Analyzer, CancelToken, GLIOMA_VERDICT, SIMULATED_DELAY,
    SimulatedAnalyzer,
};
pub use config::AppConfig;
pub use error::{UploadError, UploadResult};
pub use file::{ACCEPTED_EXTENSIONS, CandidateFile, FileFilter, FileSource, SelectedFile};
pub use page::{Phase, UploadPage};
pub use preview::{PreviewImage, PreviewRef, PreviewRegistry};
pub use session::{
    FileSessionStore, GuardOutcome, MemorySessionStore, Navigator, Route, SessionGuard,
    SessionStore,
};
