//! Drop-zone acceptance: candidate files, the extension/MIME filter and the
//! single selected file.

use crate::error::{UploadError, UploadResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions the picker offers and the drop zone accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "dicom"];

/// MIME family a declared type has to belong to.
pub const ACCEPTED_MIME_PREFIX: &str = "image/";

/// Files kept per interaction; extra files are ignored.
pub const MAX_FILES: usize = 1;

/// Where the contents of a file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file offered by a drop or by the file dialog, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    /// MIME type reported by the platform. Desktop drops usually leave it empty.
    pub declared_mime: Option<String>,
    pub source: FileSource,
}

impl CandidateFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            declared_mime: None,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            declared_mime: None,
            source: FileSource::Bytes(bytes.into()),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }
}

/// The one file the page currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// Reads the full file contents.
    pub fn read_bytes(&self) -> UploadResult<Arc<[u8]>> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => fs::read(path)
                .map(Arc::from)
                .map_err(|e| UploadError::io(path, e)),
        }
    }
}

/// Filter applied to every drop and dialog selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFilter;

impl FileFilter {
    /// Checks a single candidate against the extension allow-list and MIME family.
    pub fn check(&self, file: &CandidateFile) -> UploadResult<()> {
        let Some(ext) = file.extension() else {
            return Err(UploadError::invalid_file(&file.name, "missing extension"));
        };
        if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::invalid_file(
                &file.name,
                format!("expected one of .{}", ACCEPTED_EXTENSIONS.join(", .")),
            ));
        }
        if let Some(mime) = file.declared_mime.as_deref()
            && !mime.is_empty()
            && !mime.starts_with(ACCEPTED_MIME_PREFIX)
        {
            return Err(UploadError::invalid_file(
                &file.name,
                format!("type {mime} is not an image"),
            ));
        }
        Ok(())
    }

    /// Picks the file to keep from one interaction.
    ///
    /// Returns `Ok(None)` for an empty interaction. Otherwise the first file
    /// that passes [`FileFilter::check`] wins and everything else is ignored;
    /// when none pass, the first rejection is returned.
    pub fn select(&self, files: Vec<CandidateFile>) -> UploadResult<Option<SelectedFile>> {
        let total = files.len();
        let mut first_rejection = None;
        for file in files {
            match self.check(&file) {
                Ok(()) => {
                    if total > MAX_FILES {
                        tracing::debug!("{total} files offered, keeping {}", file.name);
                    }
                    let mime = resolve_mime(&file);
                    return Ok(Some(SelectedFile {
                        name: file.name,
                        mime,
                        source: file.source,
                    }));
                }
                Err(e) => {
                    tracing::info!("Rejected file: {e}");
                    first_rejection.get_or_insert(e);
                }
            }
        }
        first_rejection.map_or(Ok(None), Err)
    }

    /// Extensions in the form the native file dialog expects.
    pub fn dialog_extensions(&self) -> &'static [&'static str] {
        &ACCEPTED_EXTENSIONS
    }
}

fn resolve_mime(file: &CandidateFile) -> String {
    if let Some(mime) = file.declared_mime.as_deref()
        && !mime.is_empty()
    {
        return mime.to_string();
    }
    match file.extension().as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg".to_string(),
        Some("png") => "image/png".to_string(),
        Some("dicom") => "image/dicom".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn named(name: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, vec![0u8; 4])
    }

    #[rstest]
    #[case("scan.png", true)]
    #[case("scan.PNG", true)]
    #[case("scan.jpg", true)]
    #[case("scan.jpeg", true)]
    #[case("scan.dicom", true)]
    #[case("scan.gif", false)]
    #[case("scan.dcm", false)]
    #[case("notes.txt", false)]
    #[case("scan", false)]
    fn check_enforces_extension_allow_list(#[case] name: &str, #[case] accepted: bool) {
        assert_eq!(FileFilter.check(&named(name)).is_ok(), accepted);
    }

    #[test]
    fn check_rejects_non_image_declared_type() {
        let file = named("scan.png").with_mime("application/pdf");
        let err = FileFilter.check(&file).unwrap_err();
        assert!(matches!(err, UploadError::InvalidFileType { .. }));
    }

    #[test]
    fn check_ignores_empty_declared_type() {
        let file = named("scan.dicom").with_mime("");
        assert!(FileFilter.check(&file).is_ok());
    }

    #[test]
    fn select_empty_interaction_is_ignored() {
        assert_eq!(FileFilter.select(Vec::new()).unwrap(), None);
    }

    #[test]
    fn select_keeps_first_of_two() {
        let picked = FileFilter
            .select(vec![named("a.png"), named("b.jpg")])
            .unwrap()
            .unwrap();
        assert_eq!(picked.name, "a.png");
        assert_eq!(picked.mime, "image/png");
    }

    #[test]
    fn select_skips_rejected_files() {
        let picked = FileFilter
            .select(vec![named("notes.txt"), named("b.jpg")])
            .unwrap()
            .unwrap();
        assert_eq!(picked.name, "b.jpg");
        assert_eq!(picked.mime, "image/jpeg");
    }

    #[test]
    fn select_reports_first_rejection() {
        let err = FileFilter
            .select(vec![named("notes.txt"), named("clip.mp4")])
            .unwrap_err();
        match err {
            UploadError::InvalidFileType { name, .. } => assert_eq!(name, "notes.txt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn declared_mime_is_preserved() {
        let picked = FileFilter
            .select(vec![named("scan.dicom").with_mime("image/x-dicom")])
            .unwrap()
            .unwrap();
        assert_eq!(picked.mime, "image/x-dicom");
    }

    #[test]
    fn read_bytes_from_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.png");
        fs::write(&path, b"abc")?;
        let picked = FileFilter
            .select(vec![CandidateFile::from_path(&path)])?
            .unwrap();
        assert_eq!(picked.name, "scan.png");
        assert_eq!(&*picked.read_bytes()?, b"abc");
        Ok(())
    }
}
