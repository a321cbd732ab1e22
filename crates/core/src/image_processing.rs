//! Image loading, editing and encoding utilities.
//!
//! Every edit takes the current image by reference and returns a new one;
//! the caller replaces its buffer wholesale, which is what makes whole-image
//! snapshots a valid undo history.
//!
//! Images are normalised on load to 8-bit RGB or RGBA so that the rest of
//! the crate only deals with three or four channels. Edits preserve the
//! channel count.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::geometry::{CropRegion, ImageSize, Size};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::{debug, info};

/// JPEG quality used when none is requested.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Brightness, contrast and gamma applied in one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustments {
    /// Additive offset, `-100..=100`.
    pub brightness: f32,
    /// Contrast around mid-grey, `-100..=100`.
    pub contrast: f32,
    /// Gamma, `> 0`. `1.0` is neutral.
    pub gamma: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            gamma: 1.0,
        }
    }
}

impl Adjustments {
    pub fn validate(&self) -> Result<()> {
        if !(-100.0..=100.0).contains(&self.brightness) {
            return Err(AppError::InvalidAdjustment(format!(
                "brightness {} outside -100..=100",
                self.brightness
            )));
        }
        if !(-100.0..=100.0).contains(&self.contrast) {
            return Err(AppError::InvalidAdjustment(format!(
                "contrast {} outside -100..=100",
                self.contrast
            )));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(AppError::InvalidAdjustment(format!(
                "gamma {} must be positive",
                self.gamma
            )));
        }
        Ok(())
    }

    fn lut(&self) -> [u8; 256] {
        let factor = (259.0 * (self.contrast + 255.0)) / (255.0 * (259.0 - self.contrast));
        let inv_gamma = 1.0 / self.gamma;
        let mut lut = [0u8; 256];
        for (i, out) in lut.iter_mut().enumerate() {
            let v = factor * (i as f32 + self.brightness - 128.0) + 128.0;
            let normalized = (v / 255.0).clamp(0.0, 1.0);
            *out = (normalized.powf(inv_gamma) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        lut
    }
}

/// A whole-image edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edit {
    RotateLeft,
    RotateRight,
    Rotate180,
    FlipHorizontal,
    FlipVertical,
    Crop(CropRegion),
    Resize { width: u32, height: u32 },
    Grayscale,
    Sepia,
    Invert,
    Blur { sigma: f32 },
    Sharpen { sigma: f32, threshold: i32 },
    Adjust(Adjustments),
}

impl Edit {
    /// Edits after which the view goes back to fit-to-window.
    pub fn changes_geometry(&self) -> bool {
        matches!(
            self,
            Self::RotateLeft | Self::RotateRight | Self::Rotate180 | Self::Crop(_) | Self::Resize { .. }
        )
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RotateLeft => write!(f, "rotate left"),
            Self::RotateRight => write!(f, "rotate right"),
            Self::Rotate180 => write!(f, "rotate 180"),
            Self::FlipHorizontal => write!(f, "flip horizontal"),
            Self::FlipVertical => write!(f, "flip vertical"),
            Self::Crop(region) => write!(f, "crop {region}"),
            Self::Resize { width, height } => write!(f, "resize {width}x{height}"),
            Self::Grayscale => write!(f, "grayscale"),
            Self::Sepia => write!(f, "sepia"),
            Self::Invert => write!(f, "invert"),
            Self::Blur { sigma } => write!(f, "blur {sigma}"),
            Self::Sharpen { sigma, threshold } => write!(f, "sharpen {sigma}/{threshold}"),
            Self::Adjust(a) => write!(
                f,
                "adjust brightness {} contrast {} gamma {}",
                a.brightness, a.contrast, a.gamma
            ),
        }
    }
}

/// How the resize dialog derives the target size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizeTarget {
    /// Exact dimensions, aspect ratio ignored.
    Exact { width: u32, height: u32 },
    /// Width given, height follows the aspect ratio.
    Width(u32),
    /// Height given, width follows the aspect ratio.
    Height(u32),
    /// Both sides scaled by a percentage.
    Percent(f64),
}

/// Image processing utilities for the viewer.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Decodes an image file and normalises it to RGB8 or RGBA8.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read and
    /// [`AppError::Image`] if it cannot be decoded.
    pub fn load(path: &Path) -> Result<DynamicImage> {
        let decoded = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        let image = Self::normalize(decoded);
        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            channels = Self::channel_count(&image),
            "image loaded"
        );
        Ok(image)
    }

    /// Converts any pixel layout to RGB8, or RGBA8 if it has alpha.
    pub fn normalize(image: DynamicImage) -> DynamicImage {
        match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }
    }

    pub fn channel_count(image: &DynamicImage) -> u8 {
        image.color().channel_count()
    }

    pub fn size(image: &DynamicImage) -> ImageSize {
        Size::from_u32(image.width(), image.height())
    }

    /// Applies one edit and returns the new image.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidCrop`] if a crop region does not fit the image
    /// - [`AppError::InvalidResize`] for zero target dimensions
    /// - [`AppError::InvalidAdjustment`] for out-of-range adjustments
    pub fn apply(image: &DynamicImage, edit: &Edit) -> Result<DynamicImage> {
        let out = match *edit {
            Edit::RotateLeft => image.rotate270(),
            Edit::RotateRight => image.rotate90(),
            Edit::Rotate180 => image.rotate180(),
            Edit::FlipHorizontal => image.fliph(),
            Edit::FlipVertical => image.flipv(),
            Edit::Crop(region) => Self::crop(image, region)?,
            Edit::Resize { width, height } => Self::resize(image, width, height)?,
            Edit::Grayscale => Self::grayscale(image),
            Edit::Sepia => Self::map_rgb(image, |r, g, b| {
                let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
                (
                    (0.393 * r + 0.769 * g + 0.189 * b).min(255.0) as u8,
                    (0.349 * r + 0.686 * g + 0.168 * b).min(255.0) as u8,
                    (0.272 * r + 0.534 * g + 0.131 * b).min(255.0) as u8,
                )
            }),
            Edit::Invert => {
                let mut out = image.clone();
                out.invert();
                out
            }
            Edit::Blur { sigma } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(AppError::InvalidAdjustment(format!("blur sigma {sigma}")));
                }
                image.blur(sigma)
            }
            Edit::Sharpen { sigma, threshold } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(AppError::InvalidAdjustment(format!("sharpen sigma {sigma}")));
                }
                image.unsharpen(sigma, threshold)
            }
            Edit::Adjust(adjustments) => {
                adjustments.validate()?;
                let lut = adjustments.lut();
                Self::map_rgb(image, |r, g, b| {
                    (lut[usize::from(r)], lut[usize::from(g)], lut[usize::from(b)])
                })
            }
        };
        debug!(%edit, width = out.width(), height = out.height(), "edit applied");
        Ok(Self::normalize(out))
    }

    /// Cuts `region` out of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCrop`] if the region is empty or does not
    /// lie inside the image.
    pub fn crop(image: &DynamicImage, region: CropRegion) -> Result<DynamicImage> {
        if !region.fits_within(image.width(), image.height()) {
            return Err(AppError::crop(format!(
                "region {region} exceeds image {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(image.crop_imm(region.x, region.y, region.w, region.h))
    }

    /// Resizes to exact dimensions with a high-quality filter.
    pub fn resize(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidResize(format!(
                "target {width}x{height} has a zero side"
            )));
        }
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    /// Resolves a resize dialog request against the current dimensions.
    pub fn resized_dimensions(width: u32, height: u32, target: ResizeTarget) -> Result<(u32, u32)> {
        if width == 0 || height == 0 {
            return Err(AppError::degenerate(format!("image size {width}x{height}")));
        }
        let ratio = f64::from(height) / f64::from(width);
        let (w, h) = match target {
            ResizeTarget::Exact { width, height } => (width, height),
            ResizeTarget::Width(w) => (w, (f64::from(w) * ratio).round().max(1.0) as u32),
            ResizeTarget::Height(h) => ((f64::from(h) / ratio).round().max(1.0) as u32, h),
            ResizeTarget::Percent(p) => {
                if !(p.is_finite() && p > 0.0) {
                    return Err(AppError::InvalidResize(format!("percentage {p}")));
                }
                let f = p / 100.0;
                (
                    (f64::from(width) * f).round().max(1.0) as u32,
                    (f64::from(height) * f).round().max(1.0) as u32,
                )
            }
        };
        if w == 0 || h == 0 {
            return Err(AppError::InvalidResize(format!("target {w}x{h} has a zero side")));
        }
        Ok((w, h))
    }

    /// Writes `image` to `path`, choosing the format from the extension.
    ///
    /// `jpeg_quality` only applies to JPEG output; alpha is dropped for
    /// formats that cannot store it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnsupportedFormat`] for unknown extensions and
    /// [`AppError::Image`] or [`AppError::Io`] if encoding or writing fails.
    pub fn save(image: &DynamicImage, path: &Path, jpeg_quality: Option<u8>) -> Result<()> {
        let format = ImageFormat::from_path(path)
            .map_err(|_| AppError::UnsupportedFormat(path.display().to_string()))?;

        match format {
            ImageFormat::Jpeg => {
                let quality = jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
                let mut writer = BufWriter::new(File::create(path)?);
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
            }
            ImageFormat::Bmp if image.color().has_alpha() => {
                DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)?;
            }
            ImageFormat::Png | ImageFormat::Bmp | ImageFormat::WebP | ImageFormat::Gif => {
                image.save_with_format(path, format)?;
            }
            other => {
                return Err(AppError::UnsupportedFormat(format!("{other:?}")));
            }
        }

        info!(path = %path.display(), ?format, "image saved");
        Ok(())
    }

    /// RGBA8 copy of the image, as clipboards and GPU textures want it.
    pub fn to_rgba(image: &DynamicImage) -> RgbaImage {
        image.to_rgba8()
    }

    fn grayscale(image: &DynamicImage) -> DynamicImage {
        let gray = image.grayscale();
        if image.color().has_alpha() {
            DynamicImage::ImageRgba8(gray.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(gray.to_rgb8())
        }
    }

    /// Runs `f` over the colour channels, leaving alpha untouched.
    fn map_rgb(image: &DynamicImage, f: impl Fn(u8, u8, u8) -> (u8, u8, u8)) -> DynamicImage {
        match Self::normalize(image.clone()) {
            DynamicImage::ImageRgba8(buf) => {
                let out = RgbaImage::from_fn(buf.width(), buf.height(), |x, y| {
                    let Rgba([r, g, b, a]) = *buf.get_pixel(x, y);
                    let (r, g, b) = f(r, g, b);
                    Rgba([r, g, b, a])
                });
                DynamicImage::ImageRgba8(out)
            }
            other => {
                let buf = other.to_rgb8();
                let out = RgbImage::from_fn(buf.width(), buf.height(), |x, y| {
                    let Rgb([r, g, b]) = *buf.get_pixel(x, y);
                    let (r, g, b) = f(r, g, b);
                    Rgb([r, g, b])
                });
                DynamicImage::ImageRgb8(out)
            }
        }
    }
}
