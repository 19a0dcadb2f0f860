//! Upload path: image files dropped onto the window become bitmaps ready to place as layers.

use egui::{Context, DroppedFile, Pos2, Vec2};
use log::{debug, info, warn};
use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::error::CanvasError;

/// Each further file of one drop lands this far from the previous one
const CASCADE_STEP: f32 = 24.0;

#[derive(Debug, Error)]
pub enum DropError {
    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("failed to read {name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} has no accessible data")]
    NoData(String),

    #[error("{name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: CanvasError,
    },
}

/// A decoded drop, with where it should go in workspace coordinates
#[derive(Debug)]
pub struct DroppedImage {
    pub name: String,
    pub bitmap: Bitmap,
    pub position: Pos2,
}

#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up this frame's drops. Returns true when there is something to process.
    pub fn check_for_dropped_files(&mut self, ctx: &Context) -> bool {
        ctx.input(|input| {
            if !input.raw.dropped_files.is_empty() {
                self.dropped_files.extend(input.raw.dropped_files.iter().cloned());
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Decodes every pending drop. Files that fail are reported and never become layers.
    pub fn process_dropped_files(&mut self, drop_point: Pos2) -> (Vec<DroppedImage>, Vec<DropError>) {
        let mut images = Vec::new();
        let mut errors = Vec::new();

        for file in self.dropped_files.drain(..) {
            match load_dropped_file(&file) {
                Ok(bitmap) => {
                    let position = drop_point + Vec2::splat(CASCADE_STEP * images.len() as f32);
                    images.push(DroppedImage {
                        name: display_name(&file),
                        bitmap,
                        position,
                    });
                }
                Err(err) => {
                    warn!("⚠️ Dropped file rejected: {}", err);
                    errors.push(err);
                }
            }
        }
        images.iter().for_each(|image| info!("📥 Dropped {} at {:?}", image.name, image.position));
        (images, errors)
    }
}

fn display_name(file: &DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

fn is_image_file(file: &DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| file.name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()));
    matches!(name.as_deref(), Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

/// Reads and decodes one dropped file, from memory when the platform provides bytes and from
/// disk otherwise
pub fn load_dropped_file(file: &DroppedFile) -> Result<Bitmap, DropError> {
    let name = display_name(file);
    if !is_image_file(file) {
        return Err(DropError::NotAnImage(name));
    }

    let decode = |bytes: &[u8]| {
        Bitmap::decode_bytes(bytes).map_err(|source| DropError::Decode {
            name: name.clone(),
            source,
        })
    };

    if let Some(bytes) = &file.bytes {
        debug!("Decoding {} from memory ({} bytes)", name, bytes.len());
        decode(&bytes[..])
    } else if let Some(path) = &file.path {
        let bytes = std::fs::read(path).map_err(|source| DropError::Unreadable {
            name: name.clone(),
            source,
        })?;
        debug!("Decoding {} from disk", name);
        decode(&bytes)
    } else {
        Err(DropError::NoData(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::encode_png;
    use image::RgbaImage;
    use std::sync::Arc;

    fn png_file(name: &str) -> DroppedFile {
        let bytes = encode_png(&RgbaImage::new(6, 3)).unwrap();
        DroppedFile {
            name: name.to_owned(),
            bytes: Some(Arc::from(bytes)),
            ..Default::default()
        }
    }

    #[test]
    fn png_bytes_become_a_bitmap() {
        let bitmap = load_dropped_file(&png_file("cat.png")).unwrap();
        assert_eq!((bitmap.native_width(), bitmap.native_height()), (6, 3));
    }

    #[test]
    fn non_images_are_rejected() {
        let file = DroppedFile {
            name: "notes.txt".to_owned(),
            bytes: Some(Arc::from(b"hello".to_vec())),
            ..Default::default()
        };
        assert!(matches!(load_dropped_file(&file), Err(DropError::NotAnImage(_))));
    }

    #[test]
    fn corrupt_images_are_reported() {
        let file = DroppedFile {
            name: "broken.png".to_owned(),
            bytes: Some(Arc::from(vec![0u8; 16])),
            ..Default::default()
        };
        assert!(matches!(load_dropped_file(&file), Err(DropError::Decode { .. })));
    }

    #[test]
    fn multiple_drops_cascade() {
        let mut handler = FileHandler::new();
        handler.dropped_files = vec![png_file("a.png"), png_file("b.png")];
        let (images, errors) = handler.process_dropped_files(Pos2::new(10.0, 10.0));
        assert!(errors.is_empty());
        assert_eq!(images[1].position, Pos2::new(10.0 + CASCADE_STEP, 10.0 + CASCADE_STEP));
    }
}
