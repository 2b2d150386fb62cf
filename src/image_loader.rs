//! Background image decoding.
//!
//! Each requested path is decoded on its own worker thread; results are picked up with
//! [`ImageLoader::poll`] once per frame, so loading never blocks the frame loop.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use ahash::AHashSet;
use image::RgbaImage;

use crate::error::GalleryError;

/// Outcome of one image request.
#[derive(Debug)]
pub enum ImageLoad {
    Loaded { path: String, image: RgbaImage },
    Failed { path: String, error: GalleryError },
}

impl ImageLoad {
    pub fn path(&self) -> &str {
        match self {
            ImageLoad::Loaded { path, .. } | ImageLoad::Failed { path, .. } => path,
        }
    }
}

/// Reads and decodes an image file into RGBA8.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage, GalleryError> {
    let path = path.as_ref();
    image::open(path)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| GalleryError::ImageDecode {
            path: PathBuf::from(path),
            source,
        })
}

/// How long [`ImageLoader::wait_all`] waits for outstanding loads before giving up.
pub const WAIT_ALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs `decode` for `path`, turning a panic inside the decoder into a failed load so every
/// request produces exactly one result.
fn finish_load(
    path: String,
    decode: impl FnOnce(&str) -> Result<RgbaImage, GalleryError>,
) -> ImageLoad {
    match panic::catch_unwind(AssertUnwindSafe(|| decode(&path))) {
        Ok(Ok(image)) => ImageLoad::Loaded { path, image },
        Ok(Err(error)) => ImageLoad::Failed { path, error },
        Err(_) => {
            let error = GalleryError::ImageDecode {
                path: PathBuf::from(&path),
                source: image::ImageError::IoError(std::io::Error::other("decoder panicked")),
            };
            ImageLoad::Failed { path, error }
        }
    }
}

pub struct ImageLoader {
    sender: Sender<ImageLoad>,
    receiver: Receiver<ImageLoad>,
    requested: AHashSet<String>,
    pending: usize,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            requested: AHashSet::new(),
            pending: 0,
        }
    }

    /// Starts decoding `path` unless it was requested before. Returns whether a new load
    /// was started.
    pub fn request(&mut self, path: &str) -> bool {
        if !self.requested.insert(path.to_string()) {
            return false;
        }

        let sender = self.sender.clone();
        let owned_path = path.to_string();
        let spawned = thread::Builder::new()
            .name("gallery-image-loader".to_string())
            .spawn(move || {
                let load = finish_load(owned_path, |path| load_image(path));
                // The loader may already be gone when the gallery was destroyed mid-load.
                let _ = sender.send(load);
            });

        if let Err(error) = spawned {
            let _ = self.sender.send(ImageLoad::Failed {
                path: path.to_string(),
                error: GalleryError::ImageDecode {
                    path: PathBuf::from(path),
                    source: image::ImageError::IoError(error),
                },
            });
        }

        self.pending += 1;
        true
    }

    /// Drains every finished load without blocking.
    pub fn poll(&mut self) -> Vec<ImageLoad> {
        let finished: Vec<ImageLoad> = self.receiver.try_iter().collect();
        self.pending = self.pending.saturating_sub(finished.len());

        for load in &finished {
            if let ImageLoad::Failed { path, error } = load {
                tracing::debug!(path = %path, error = %error, "image failed to load");
            }
        }
        finished
    }

    /// Number of requests that have not been returned by `poll` yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Blocks until every pending request has finished or [`WAIT_ALL_TIMEOUT`] has passed.
    /// Meant for tests and tools.
    pub fn wait_all(&mut self) -> Vec<ImageLoad> {
        self.wait_all_for(WAIT_ALL_TIMEOUT)
    }

    /// Like [`ImageLoader::wait_all`] with an explicit deadline. Loads still outstanding
    /// when it expires stay pending and show up in a later `poll`.
    pub fn wait_all_for(&mut self, timeout: Duration) -> Vec<ImageLoad> {
        let deadline = Instant::now() + timeout;
        let mut finished = Vec::new();
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(load) => {
                    self.pending -= 1;
                    finished.push(load);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending = self.pending, "gave up waiting for image loads");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        finished.extend(self.poll());
        finished
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_failure() {
        let mut loader = ImageLoader::new();
        assert!(loader.request("does/not/exist.png"));
        assert!(!loader.request("does/not/exist.png"));

        let results = loader.wait_all();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], ImageLoad::Failed { .. }));
        assert_eq!(results[0].path(), "does/not/exist.png");
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn panicking_decoder_still_reports_a_result() {
        let load = finish_load("broken.png".to_string(), |_| panic!("corrupt header"));
        assert_eq!(load.path(), "broken.png");
        assert!(matches!(load, ImageLoad::Failed { .. }));

        let load = finish_load("fine.png".to_string(), |_| Ok(RgbaImage::new(1, 1)));
        assert!(matches!(load, ImageLoad::Loaded { .. }));
    }

    #[test]
    fn waiting_on_a_lost_load_returns_after_the_deadline() {
        let mut loader = ImageLoader::new();
        // Counted as requested but no worker will ever answer.
        loader.pending = 1;

        let started = Instant::now();
        let results = loader.wait_all_for(Duration::from_millis(50));
        assert!(results.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(loader.pending(), 1);
    }

    #[test]
    fn decodes_png_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "circular-gallery-loader-{}.png",
            std::process::id()
        ));
        RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30, 255]);

        let _ = std::fs::remove_file(path);
    }
}
