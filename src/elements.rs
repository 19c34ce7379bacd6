//! Letter-specific elements built on top of `genpdf` primitives.
//!
//! This module holds the fixed-height [`Spacer`] used between letter blocks,
//! the decoded logo that the page chrome stamps onto every page and the solid
//! [`ColorBlock`] used for the sidebar and the rules.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error, ErrorKind};
use genpdf::style::Style;
use genpdf::{render, Element, RenderResult, Scale, Size};
use log::{debug, warn};

use crate::geometry::{mm, mm_to_f64, MM_PER_INCH};

const DEFAULT_IMAGE_DPI: f64 = 300.0;

/// Vertical whitespace of a fixed height.
///
/// A spacer that does not fit on the current page is cut short at the page end
/// rather than carried over to the next page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacer {
    height_mm: f64,
}

impl Spacer {
    /// Creates a spacer `height_mm` millimetres high.
    pub fn new(height_mm: f64) -> Self {
        Self {
            height_mm: height_mm.max(0.0),
        }
    }

    /// Height of the spacer.
    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }
}

impl Element for Spacer {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let available = mm_to_f64(area.size().height);
        let mut result = RenderResult::default();
        result.size = Size::new(0, mm(self.height_mm.min(available)));
        Ok(result)
    }
}

/// Space a logo occupies on the page, in millimetres.
///
/// The default footprint is empty and stands for "no logo".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LogoFootprint {
    pub width: f64,
    pub height: f64,
}

impl LogoFootprint {
    /// Creates a footprint.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Footprint of an image `px_width` by `px_height` pixels scaled to `width`,
    /// keeping the aspect ratio.
    pub fn scaled(px_width: u32, px_height: u32, width: f64) -> Self {
        if px_width == 0 {
            return Self::default();
        }
        Self {
            width,
            height: width * f64::from(px_height) / f64::from(px_width),
        }
    }

    /// Shrinks the footprint, keeping its aspect ratio, so that it is at most
    /// `max_height` high.
    pub fn fit_height(self, max_height: f64) -> Self {
        if self.height <= max_height || self.height <= 0.0 {
            return self;
        }
        let ratio = max_height.max(0.0) / self.height;
        Self {
            width: self.width * ratio,
            height: self.height * ratio,
        }
    }

    /// Whether the footprint covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Natural width of an image printed at the default resolution.
fn natural_width_mm(px_width: u32) -> f64 {
    MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI
}

/// A decoded logo ready to be stamped onto pages at a fixed width.
#[derive(Clone, Debug)]
pub struct LogoImage {
    image: image::DynamicImage,
    footprint: LogoFootprint,
    scale: f64,
}

impl LogoImage {
    /// Prepares `image` to be printed `width_mm` wide and at most
    /// `max_height_mm` high.
    ///
    /// Logos too tall for `width_mm` are narrowed until they fit. The alpha
    /// channel is dropped because PDF images are embedded without one.
    pub fn from_dynamic_image(
        image: image::DynamicImage,
        width_mm: f64,
        max_height_mm: f64,
    ) -> Result<Self, Error> {
        let (px_width, px_height) = image.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err(Error::new(
                "Logo image has no pixels",
                ErrorKind::InvalidData,
            ));
        }
        let natural = LogoFootprint::scaled(px_width, px_height, width_mm);
        let footprint = natural.fit_height(max_height_mm);
        if footprint != natural {
            warn!(
                "Logo would be {:.2} mm high; shrinking it to {:.2} x {:.2} mm.",
                natural.height, footprint.width, footprint.height
            );
        }
        let image = image::DynamicImage::ImageRgb8(image.to_rgb8());
        Ok(Self {
            scale: footprint.width / natural_width_mm(px_width),
            footprint,
            image,
        })
    }

    /// Decodes the image at `path` and prepares it like
    /// [`LogoImage::from_dynamic_image`].
    pub fn load(path: impl AsRef<Path>, width_mm: f64, max_height_mm: f64) -> Result<Self, Error> {
        let image = decode_image_from_path(path)?;
        Self::from_dynamic_image(image, width_mm, max_height_mm)
    }

    /// Like [`LogoImage::load`], but a missing or undecodable logo yields `None`.
    pub fn load_optional(
        path: impl AsRef<Path>,
        width_mm: f64,
        max_height_mm: f64,
    ) -> Option<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("No logo at {}; rendering without it.", path.display());
            return None;
        }
        match Self::load(path, width_mm, max_height_mm) {
            Ok(logo) => Some(logo),
            Err(err) => {
                warn!("Logo at {} unusable ({}); rendering without it.", path.display(), err);
                None
            }
        }
    }

    /// Space the logo occupies on the page.
    pub fn footprint(&self) -> LogoFootprint {
        self.footprint
    }

    /// Builds a `genpdf` image element scaled to the logo width.
    pub fn element(&self) -> Result<Image, Error> {
        let mut image = Image::from_dynamic_image(self.image.clone())?;
        image.set_scale(Scale::new(self.scale, self.scale));
        Ok(image)
    }
}

/// A solid rectangle of one color.
///
/// `genpdf` can only stroke hairlines, so filled shapes are painted as a single
/// pixel stretched to the requested size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorBlock {
    rgb: [u8; 3],
    width_mm: f64,
    height_mm: f64,
}

impl ColorBlock {
    /// Creates a block `width_mm` by `height_mm` filled with `rgb`.
    pub fn new(rgb: [u8; 3], width_mm: f64, height_mm: f64) -> Self {
        Self {
            rgb,
            width_mm: width_mm.max(0.0),
            height_mm: height_mm.max(0.0),
        }
    }

    /// Horizontal and vertical stretch applied to the pixel.
    pub fn scale(&self) -> (f64, f64) {
        let pixel = natural_width_mm(1);
        (self.width_mm / pixel, self.height_mm / pixel)
    }

    /// Builds the `genpdf` image element for the block.
    pub fn element(&self) -> Result<Image, Error> {
        let pixel = image::RgbImage::from_pixel(1, 1, image::Rgb(self.rgb));
        let (x, y) = self.scale();
        let image = Image::from_dynamic_image(image::DynamicImage::ImageRgb8(pixel))?;
        Ok(image.with_scale(Scale::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    #[test]
    fn footprint_keeps_aspect_ratio() {
        let footprint = LogoFootprint::scaled(400, 200, 31.75);
        assert_eq!(footprint.width, 31.75);
        assert!((footprint.height - 15.875).abs() < 1e-9);
        assert!(!footprint.is_empty());
    }

    #[test]
    fn zero_width_image_has_empty_footprint() {
        assert!(LogoFootprint::scaled(0, 10, 31.75).is_empty());
        assert!(LogoFootprint::default().is_empty());
    }

    #[test]
    fn tall_footprint_is_narrowed_to_fit() {
        let square = LogoFootprint::scaled(400, 400, 31.75).fit_height(17.6);
        assert!((square.height - 17.6).abs() < 1e-9);
        assert!((square.width - 17.6).abs() < 1e-9);

        let wide = LogoFootprint::scaled(400, 200, 31.75);
        assert_eq!(wide.fit_height(17.6), wide);
    }

    #[test]
    fn square_logo_stays_above_the_header_rule() {
        let chrome = crate::geometry::ChromeDimensions::default();
        let logo = LogoImage::from_dynamic_image(
            DynamicImage::ImageRgb8(image::RgbImage::new(400, 400)),
            chrome.logo_width_mm,
            chrome.logo_max_height(),
        )
        .expect("logo prepared");
        let footprint = logo.footprint();
        assert!(chrome.logo_top_mm + footprint.height <= chrome.header_rule_y() + 1e-9);
        assert!((footprint.width - footprint.height).abs() < 1e-9);
        assert!((logo.scale * natural_width_mm(400) - footprint.width).abs() < 1e-9);
    }

    #[test]
    fn color_block_stretches_one_pixel() {
        let block = ColorBlock::new([0x18, 0x7f, 0x76], 10.0, 297.0);
        let (x, y) = block.scale();
        assert!((x * MM_PER_INCH / DEFAULT_IMAGE_DPI - 10.0).abs() < 1e-9);
        assert!((y * MM_PER_INCH / DEFAULT_IMAGE_DPI - 297.0).abs() < 1e-9);
        assert!(block.element().is_ok());
        assert_eq!(ColorBlock::new([0, 0, 0], -1.0, 2.0).scale().0, 0.0);
    }

    #[test]
    fn logo_scale_matches_requested_width() {
        let logo = LogoImage::from_dynamic_image(
            DynamicImage::ImageRgba8(RgbaImage::new(300, 150)),
            25.4,
            100.0,
        )
        .expect("logo prepared");
        // 300 px at 300 dpi is one inch wide already.
        assert!((logo.scale - 1.0).abs() < 1e-9);
        assert!((logo.footprint().height - 12.7).abs() < 1e-9);
        assert!(!logo.image.color().has_alpha());
    }

    #[test]
    fn missing_logo_is_none() {
        assert!(LogoImage::load_optional("/nonexistent/logo.png", 31.75, 17.6).is_none());
    }

    #[test]
    fn undecodable_logo_is_none() {
        let dir = std::env::temp_dir().join(format!("letterhead-logo-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("logo.png");
        std::fs::write(&path, b"not an image").expect("write file");
        assert!(LogoImage::load_optional(&path, 31.75, 17.6).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn spacer_never_goes_negative() {
        assert_eq!(Spacer::new(-3.0).height_mm(), 0.0);
        assert_eq!(Spacer::new(6.35).height_mm(), 6.35);
    }
}
