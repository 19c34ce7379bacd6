//! Page geometry and the dimensions of the letterhead chrome.
//!
//! All values are stored as plain millimetres so they can be serialized in a
//! configuration file and reasoned about in tests without a font cache. They are
//! converted to [`genpdf`] units only at the rendering boundary.

use genpdf::{Margins, Mm, Size};
use serde::{Deserialize, Serialize};

use crate::error::LetterError;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = MM_PER_INCH / 72.0;

/// Converts inches to millimetres.
pub fn inches(value: f64) -> f64 {
    value * MM_PER_INCH
}

/// Converts points to millimetres.
pub fn points(value: f64) -> f64 {
    value * MM_PER_PT
}

pub(crate) fn mm(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Page size and margins of a letter; identical for every page of a document.
///
/// The margins carve out the header and footer bands. Body content is laid out
/// strictly inside them, so [`PageGeometry::validate`] is what keeps the body
/// clear of the chrome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Page width.
    pub width_mm: f64,
    /// Page height.
    pub height_mm: f64,
    /// Top margin, reserving the header band.
    pub top_mm: f64,
    /// Bottom margin, reserving the footer band.
    pub bottom_mm: f64,
    /// Left margin.
    pub left_mm: f64,
    /// Right margin.
    pub right_mm: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait with the letterhead margins.
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            top_mm: inches(2.0),
            bottom_mm: inches(1.25),
            left_mm: 20.0,
            right_mm: 20.0,
        }
    }

    /// Width of the content region.
    pub fn content_width(&self) -> f64 {
        self.width_mm - self.left_mm - self.right_mm
    }

    /// Height of the content region.
    pub fn content_height(&self) -> f64 {
        self.height_mm - self.top_mm - self.bottom_mm
    }

    /// Distance from the top edge to the bottom of the content region.
    pub fn content_bottom(&self) -> f64 {
        self.height_mm - self.bottom_mm
    }

    /// Checks that the margins leave room for the chrome bands.
    pub fn validate(&self, chrome: &ChromeDimensions) -> Result<(), LetterError> {
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(LetterError::Geometry(format!(
                "margins leave no content region on a {}x{} mm page",
                self.width_mm, self.height_mm
            )));
        }

        if chrome.logo_max_height() <= 0.0 {
            return Err(LetterError::Geometry(format!(
                "logo top {:.2} mm is below the header rule ({:.2} mm)",
                chrome.logo_top_mm,
                chrome.header_rule_y()
            )));
        }

        let header_needed = chrome.header_rule_y() + chrome.band_clearance_mm;
        if self.top_mm < header_needed {
            return Err(LetterError::Geometry(format!(
                "top margin {:.2} mm is smaller than the header band ({:.2} mm)",
                self.top_mm, header_needed
            )));
        }

        let footer_needed = chrome.footer_band_height();
        if self.bottom_mm < footer_needed {
            return Err(LetterError::Geometry(format!(
                "bottom margin {:.2} mm is smaller than the footer band ({:.2} mm)",
                self.bottom_mm, footer_needed
            )));
        }

        Ok(())
    }

    pub(crate) fn paper_size(&self) -> Size {
        Size::new(mm(self.width_mm), mm(self.height_mm))
    }

    pub(crate) fn margins(&self) -> Margins {
        Margins::trbl(
            mm(self.top_mm),
            mm(self.right_mm),
            mm(self.bottom_mm),
            mm(self.left_mm),
        )
    }
}

/// Fixed dimensions of the page chrome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeDimensions {
    /// Width of the accent bar at the left page edge.
    pub sidebar_width_mm: f64,
    /// Height of the header band measured from the top edge.
    pub header_band_mm: f64,
    /// Distance between the header band and the separator rule.
    pub separator_gap_mm: f64,
    /// Minimum space between a rule and the content region.
    pub band_clearance_mm: f64,
    /// Distance from the top edge to the top of the logo.
    pub logo_top_mm: f64,
    /// Rendered logo width; the height follows the image aspect ratio.
    pub logo_width_mm: f64,
    /// Gap between the logo and the organization name.
    pub logo_text_gap_mm: f64,
    /// Distance between the bottom of the content region and the footer rule.
    pub footer_rule_offset_mm: f64,
    /// Distance between the footer rule and the top of the footer columns.
    pub footer_padding_mm: f64,
    /// Minimum distance between the footer text and the bottom page edge.
    pub footer_min_bottom_mm: f64,
    /// Thickness of both rules, in points.
    pub rule_thickness_pt: f64,
}

impl Default for ChromeDimensions {
    fn default() -> Self {
        Self {
            sidebar_width_mm: 10.0,
            header_band_mm: 40.0,
            separator_gap_mm: 3.0,
            band_clearance_mm: 2.0,
            logo_top_mm: inches(1.0),
            logo_width_mm: inches(1.25),
            logo_text_gap_mm: 5.0,
            footer_rule_offset_mm: 3.0,
            footer_padding_mm: 3.0,
            footer_min_bottom_mm: 12.0,
            rule_thickness_pt: 0.5,
        }
    }
}

impl ChromeDimensions {
    /// Vertical position of the header separator rule.
    pub fn header_rule_y(&self) -> f64 {
        self.header_band_mm + self.separator_gap_mm
    }

    /// Tallest logo that still ends above the header rule.
    pub fn logo_max_height(&self) -> f64 {
        self.header_rule_y() - self.logo_top_mm
    }

    /// Space the footer needs below the content region.
    pub fn footer_band_height(&self) -> f64 {
        self.footer_rule_offset_mm + self.footer_padding_mm + self.footer_min_bottom_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_defaults_satisfy_band_invariants() {
        let geometry = PageGeometry::a4();
        assert!(geometry.validate(&ChromeDimensions::default()).is_ok());
        assert!((geometry.content_width() - 170.0).abs() < 1e-9);
        assert!((geometry.top_mm - 50.8).abs() < 1e-9);
    }

    #[test]
    fn rejects_top_margin_inside_header_band() {
        let geometry = PageGeometry {
            top_mm: 30.0,
            ..PageGeometry::a4()
        };
        let err = geometry.validate(&ChromeDimensions::default()).unwrap_err();
        assert!(matches!(err, LetterError::Geometry(message) if message.contains("top margin")));
    }

    #[test]
    fn rejects_bottom_margin_inside_footer_band() {
        let geometry = PageGeometry {
            bottom_mm: 10.0,
            ..PageGeometry::a4()
        };
        let err = geometry.validate(&ChromeDimensions::default()).unwrap_err();
        assert!(matches!(err, LetterError::Geometry(message) if message.contains("bottom margin")));
    }

    #[test]
    fn rejects_logo_anchor_below_the_header_rule() {
        let chrome = ChromeDimensions {
            logo_top_mm: 45.0,
            ..ChromeDimensions::default()
        };
        let err = PageGeometry::a4().validate(&chrome).unwrap_err();
        assert!(matches!(err, LetterError::Geometry(message) if message.contains("logo top")));
        assert!((ChromeDimensions::default().logo_max_height() - 17.6).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_content_region() {
        let geometry = PageGeometry {
            left_mm: 120.0,
            right_mm: 120.0,
            ..PageGeometry::a4()
        };
        assert!(geometry.validate(&ChromeDimensions::default()).is_err());
    }

    #[test]
    fn unit_conversions() {
        assert!((inches(1.0) - 25.4).abs() < 1e-9);
        assert!((points(72.0) - 25.4).abs() < 1e-9);
    }
}
