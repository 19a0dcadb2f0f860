use egui::{Rect, Vec2, vec2};
use image::RgbaImage;
use log::{debug, warn};
use std::sync::Arc;

use crate::error::{CanvasError, CanvasResult};
use crate::id_generator::BitmapId;

/// Where a bitmap's pixels come from
#[derive(Clone)]
enum BitmapSource {
    /// Decoded on upload, before the layer was created
    Pixels(Arc<RgbaImage>),
    /// Handed over by another part of the app as encoded bytes with a known size.
    /// Decoded only when the pixels are needed.
    Encoded(Arc<[u8]>),
}

/// Source image of a layer, immutable once created
#[derive(Clone)]
pub struct Bitmap {
    id: BitmapId,
    source: BitmapSource,
    native_width: u32,
    native_height: u32,
}

// RgbaImage would dump every pixel
impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.source {
            BitmapSource::Pixels(_) => "pixels",
            BitmapSource::Encoded(_) => "encoded",
        };
        f.debug_struct("Bitmap")
            .field("id", &self.id)
            .field("source", &kind)
            .field("native_width", &self.native_width)
            .field("native_height", &self.native_height)
            .finish()
    }
}

impl Bitmap {
    /// Wraps already decoded pixels
    pub fn from_pixels(pixels: RgbaImage) -> CanvasResult<Self> {
        let (native_width, native_height) = pixels.dimensions();
        if native_width == 0 || native_height == 0 {
            return Err(CanvasError::EmptyBitmap);
        }
        Ok(Self {
            id: BitmapId::next(),
            source: BitmapSource::Pixels(Arc::new(pixels)),
            native_width,
            native_height,
        })
    }

    /// Decodes an uploaded file (png, jpeg, webp, ...). A failure here is reported to the
    /// user and nothing is inserted.
    pub fn decode_bytes(bytes: &[u8]) -> CanvasResult<Self> {
        let decoded = image::load_from_memory(bytes)?;
        debug!("Decoded {} bytes into {}x{}", bytes.len(), decoded.width(), decoded.height());
        Self::from_pixels(decoded.into_rgba8())
    }

    /// Keeps encoded bytes with a declared size and defers decoding
    pub fn from_encoded(bytes: impl Into<Arc<[u8]>>, native_width: u32, native_height: u32) -> CanvasResult<Self> {
        if native_width == 0 || native_height == 0 {
            return Err(CanvasError::EmptyBitmap);
        }
        Ok(Self {
            id: BitmapId::next(),
            source: BitmapSource::Encoded(bytes.into()),
            native_width,
            native_height,
        })
    }

    /// Like [`Bitmap::from_encoded`], reading the size from the image header
    pub fn from_encoded_bytes(bytes: Vec<u8>) -> CanvasResult<Self> {
        let (width, height) = image::ImageReader::new(std::io::Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(image::ImageError::from)?
            .into_dimensions()?;
        Self::from_encoded(bytes, width, height)
    }

    pub fn id(&self) -> BitmapId {
        self.id
    }

    pub fn native_width(&self) -> u32 {
        self.native_width
    }

    pub fn native_height(&self) -> u32 {
        self.native_height
    }

    pub fn native_size(&self) -> Vec2 {
        vec2(self.native_width as f32, self.native_height as f32)
    }

    /// `native_width / native_height`
    pub fn aspect_ratio(&self) -> f32 {
        self.native_width as f32 / self.native_height as f32
    }

    /// Decoded pixels at native resolution
    pub fn pixels(&self) -> CanvasResult<Arc<RgbaImage>> {
        match &self.source {
            BitmapSource::Pixels(pixels) => Ok(Arc::clone(pixels)),
            BitmapSource::Encoded(bytes) => {
                let decoded = image::load_from_memory(bytes)?.into_rgba8();
                if decoded.dimensions() != (self.native_width, self.native_height) {
                    warn!(
                        "{} decoded to {}x{}, declared {}x{}",
                        self.id,
                        decoded.width(),
                        decoded.height(),
                        self.native_width,
                        self.native_height
                    );
                }
                Ok(Arc::new(decoded))
            }
        }
    }

    /// Rasterizes the native sub-rectangle `native_rect` into a new bitmap.
    ///
    /// The rectangle is snapped to whole pixels and clipped to the bitmap; at least one pixel
    /// survives on each axis.
    pub fn crop_native(&self, native_rect: Rect) -> CanvasResult<Bitmap> {
        let pixels = self.pixels()?;
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyBitmap);
        }

        let x = (native_rect.min.x.round().max(0.0) as u32).min(width - 1);
        let y = (native_rect.min.y.round().max(0.0) as u32).min(height - 1);
        let right = (native_rect.max.x.round().max(0.0) as u32).clamp(x + 1, width);
        let bottom = (native_rect.max.y.round().max(0.0) as u32).clamp(y + 1, height);

        let cropped = image::imageops::crop_imm(pixels.as_ref(), x, y, right - x, bottom - y).to_image();
        debug!(
            "Cropped {} to {}x{} at ({}, {})",
            self.id,
            cropped.width(),
            cropped.height(),
            x,
            y
        );
        Bitmap::from_pixels(cropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn zero_sized_pixels_are_rejected() {
        assert!(matches!(
            Bitmap::from_pixels(RgbaImage::new(0, 4)),
            Err(CanvasError::EmptyBitmap)
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Bitmap::decode_bytes(b"definitely not an image"),
            Err(CanvasError::Decode(_))
        ));
    }

    #[test]
    fn lazy_bitmap_fails_only_when_pixels_are_requested() {
        let bitmap = Bitmap::from_encoded(b"junk".to_vec(), 10, 10).unwrap();
        assert_eq!(bitmap.native_size(), vec2(10.0, 10.0));
        assert!(bitmap.pixels().is_err());
    }

    #[test]
    fn encoded_bytes_report_their_header_size() {
        let png = crate::compositor::encode_png(&gradient(5, 7)).unwrap();
        let bitmap = Bitmap::from_encoded_bytes(png).unwrap();
        assert_eq!((bitmap.native_width(), bitmap.native_height()), (5, 7));
        assert_eq!(bitmap.pixels().unwrap().get_pixel(4, 6), &Rgba([4, 6, 0, 255]));
    }

    #[test]
    fn crop_native_copies_the_exact_region() {
        let bitmap = Bitmap::from_pixels(gradient(40, 30)).unwrap();
        let cropped = bitmap
            .crop_native(Rect::from_min_max(pos2(10.0, 5.0), pos2(30.0, 25.0)))
            .unwrap();
        assert_eq!((cropped.native_width(), cropped.native_height()), (20, 20));
        let pixels = cropped.pixels().unwrap();
        assert_eq!(pixels.get_pixel(0, 0), &Rgba([10, 5, 0, 255]));
        assert_eq!(pixels.get_pixel(19, 19), &Rgba([29, 24, 0, 255]));
        assert_ne!(cropped.id(), bitmap.id());
    }

    #[test]
    fn crop_native_clips_to_bounds() {
        let bitmap = Bitmap::from_pixels(gradient(8, 8)).unwrap();
        let cropped = bitmap
            .crop_native(Rect::from_min_max(pos2(-4.0, 6.0), pos2(20.0, 40.0)))
            .unwrap();
        assert_eq!((cropped.native_width(), cropped.native_height()), (8, 2));
    }
}
