//! Preview references for the selected file.
//!
//! A [`PreviewRef`] is the local stand-in for an object URL: it is handed out
//! by a [`PreviewRegistry`] and released when dropped, so replacing or
//! discarding the selected file never leaks the previous preview.

use crate::file::SelectedFile;
use image::imageops::FilterType;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Default edge length of preview thumbnails, in pixels.
pub const PREVIEW_SIZE: u32 = 256;

/// Decoded RGBA thumbnail ready to be uploaded as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PreviewImage {
    /// Decodes the file and scales it to fit within `max_edge` square.
    pub fn decode(file: &SelectedFile, max_edge: u32) -> anyhow::Result<Self> {
        let bytes = file.read_bytes()?;
        let img = image::load_from_memory(&bytes)?;
        let thumb = img.resize(max_edge, max_edge, FilterType::Triangle).to_rgba8();
        let (width, height) = thumb.dimensions();
        Ok(Self {
            width,
            height,
            rgba: thumb.into_raw(),
        })
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashSet<u64>,
}

/// Issues preview references and tracks which are still alive.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    max_edge: u32,
}

impl PreviewRegistry {
    pub fn new(max_edge: u32) -> Self {
        Self {
            inner: Arc::default(),
            max_edge,
        }
    }

    /// Creates a reference for `file`, decoding a thumbnail when possible.
    pub fn create(&self, file: &SelectedFile) -> PreviewRef {
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.next_id += 1;
            let id = inner.next_id;
            inner.live.insert(id);
            id
        };
        let max_edge = if self.max_edge == 0 {
            PREVIEW_SIZE
        } else {
            self.max_edge
        };
        let image = match PreviewImage::decode(file, max_edge) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!("No thumbnail for {}: {}", file.name, e);
                None
            }
        };
        PreviewRef {
            id,
            url: format!("preview://{id}/{}", file.name),
            image,
            registry: self.inner.clone(),
        }
    }

    /// Number of references not yet released.
    pub fn live_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live
            .len()
    }
}

/// A displayable reference to the selected file. Released on drop.
#[derive(Debug)]
pub struct PreviewRef {
    id: u64,
    url: String,
    image: Option<PreviewImage>,
    registry: Arc<Mutex<RegistryInner>>,
}

impl PreviewRef {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Thumbnail, absent when the format cannot be decoded (e.g. DICOM).
    pub fn image(&self) -> Option<&PreviewImage> {
        self.image.as_ref()
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        let mut inner = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        inner.live.remove(&self.id);
        tracing::trace!("released {}", self.url);
    }
}
