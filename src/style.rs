//! Colors, alignment and the immutable per-role style table.
//!
//! The table is produced by [`StyleTable::build`] from a base style and a list
//! of per-role overrides. Roles without an override inherit every attribute of
//! the base, so looking up a role can never fail.

use std::convert::TryFrom;
use std::fmt;

use genpdf::style::{Color, Style};
use genpdf::Alignment;
use serde::{Deserialize, Serialize};

use crate::fonts::{FaceHandle, Weight};
use crate::geometry::points;

/// An RGB color written as `#RRGGBB` in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    /// Creates a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn parse(value: &str) -> Result<Self, InvalidColor> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(value.to_owned()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| InvalidColor(value.to_owned()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Red, green and blue channels.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Converts the color for use with [`genpdf`].
    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Error returned for color strings that are not `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidColor(String);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color `{}`; expected #RRGGBB", self.0)
    }
}

impl std::error::Error for InvalidColor {}

/// Brand colors of the letterhead.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Sidebar accent (cyan turquoise).
    pub accent: HexColor,
    /// Text color (indigo).
    pub ink: HexColor,
    /// Separator rules (light silver).
    pub rule: HexColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: HexColor::rgb(0x18, 0x7f, 0x76),
            ink: HexColor::rgb(0x1e, 0x3a, 0x5f),
            rule: HexColor::rgb(0xd7, 0xd9, 0xdb),
        }
    }
}

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

impl From<Align> for Alignment {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => Alignment::Left,
            Align::Center => Alignment::Center,
            Align::Right => Alignment::Right,
        }
    }
}

/// The role a block plays in the letter, used to pick its style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Base style, also used for salutation, closing and signature.
    Normal,
    /// The date line.
    Date,
    /// Recipient address lines.
    Recipient,
    /// The letter title.
    Heading,
    /// Body paragraphs.
    Body,
    /// Footer column text.
    Footer,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Role; 6] = [
        Role::Normal,
        Role::Date,
        Role::Recipient,
        Role::Heading,
        Role::Body,
        Role::Footer,
    ];

    fn index(self) -> usize {
        match self {
            Role::Normal => 0,
            Role::Date => 1,
            Role::Recipient => 2,
            Role::Heading => 3,
            Role::Body => 4,
            Role::Footer => 5,
        }
    }
}

/// A fully resolved text style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    /// Face name, resolved through [`crate::fonts::FontRegistry::resolve_face`].
    pub face: String,
    /// Font size in points.
    pub size: u8,
    /// Line spacing factor applied to the face's natural line height.
    pub line_spacing: f64,
    /// Text color.
    pub color: HexColor,
    /// Horizontal alignment.
    pub alignment: Align,
    /// Space above the block, in points.
    pub space_before_pt: f64,
    /// Space below the block, in points.
    pub space_after_pt: f64,
}

impl StyleSpec {
    /// Space above the block in millimetres.
    pub fn space_before_mm(&self) -> f64 {
        points(self.space_before_pt)
    }

    /// Space below the block in millimetres.
    pub fn space_after_mm(&self) -> f64 {
        points(self.space_after_pt)
    }

    /// Builds the [`genpdf`] style for these attributes rendered with `face`.
    pub fn to_style(&self, face: &FaceHandle) -> Style {
        let mut style = Style::new()
            .with_font_size(self.size)
            .with_line_spacing(self.line_spacing)
            .with_color(self.color.to_color());
        if face.weight() == Weight::Bold {
            style.set_bold();
        }
        style
    }

    fn apply(&mut self, patch: &StyleOverride) {
        if let Some(face) = &patch.face {
            self.face = face.clone();
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(line_spacing) = patch.line_spacing {
            self.line_spacing = line_spacing;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(alignment) = patch.alignment {
            self.alignment = alignment;
        }
        if let Some(before) = patch.space_before_pt {
            self.space_before_pt = before;
        }
        if let Some(after) = patch.space_after_pt {
            self.space_after_pt = after;
        }
    }
}

/// Attributes a role changes relative to the base style.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverride {
    /// Face name for the role.
    ///
    /// Only the configured regular and bold faces are loaded into the document.
    /// Any other name picks one of those two by weight: names containing
    /// "bold" (in any case) set the role in the bold face, all others in the
    /// regular face.
    pub face: Option<String>,
    pub size: Option<u8>,
    pub line_spacing: Option<f64>,
    pub color: Option<HexColor>,
    pub alignment: Option<Align>,
    pub space_before_pt: Option<f64>,
    pub space_after_pt: Option<f64>,
}

/// Immutable mapping from [`Role`] to [`StyleSpec`].
#[derive(Clone, Debug, PartialEq)]
pub struct StyleTable {
    styles: [StyleSpec; 6],
}

impl StyleTable {
    /// Resolves every role against `base`, applying `overrides` in order.
    ///
    /// Several overrides for the same role are merged, later ones winning.
    pub fn build<'a, I>(base: StyleSpec, overrides: I) -> Self
    where
        I: IntoIterator<Item = (Role, &'a StyleOverride)>,
    {
        let styles = [
            base.clone(),
            base.clone(),
            base.clone(),
            base.clone(),
            base.clone(),
            base,
        ];
        Self { styles }.with_overrides(overrides)
    }

    /// Returns a copy of the table with `overrides` applied on top, in order.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (Role, &'a StyleOverride)>,
    {
        for (role, patch) in overrides {
            self.styles[role.index()].apply(patch);
        }
        self
    }

    /// Returns the style of `role`.
    pub fn get(&self, role: Role) -> &StyleSpec {
        &self.styles[role.index()]
    }
}

/// Builds the letter's style table for the given regular and bold face names.
///
/// `extra` overrides from the configuration are applied after the built-in ones.
pub fn letter_styles<'a, I>(regular: &str, bold: &str, palette: &Palette, extra: I) -> StyleTable
where
    I: IntoIterator<Item = (Role, &'a StyleOverride)>,
{
    let base = StyleSpec {
        face: regular.to_owned(),
        size: 10,
        line_spacing: 1.2,
        color: palette.ink,
        alignment: Align::Left,
        space_before_pt: 0.0,
        space_after_pt: 0.0,
    };

    let builtin = [
        (
            Role::Recipient,
            StyleOverride {
                space_before_pt: Some(10.0),
                ..StyleOverride::default()
            },
        ),
        (
            Role::Date,
            StyleOverride {
                alignment: Some(Align::Right),
                ..StyleOverride::default()
            },
        ),
        (
            Role::Heading,
            StyleOverride {
                face: Some(bold.to_owned()),
                size: Some(18),
                line_spacing: Some(1.0),
                color: Some(palette.ink),
                space_before_pt: Some(12.0),
                space_after_pt: Some(6.0),
                ..StyleOverride::default()
            },
        ),
        (
            Role::Body,
            StyleOverride {
                space_after_pt: Some(12.0),
                ..StyleOverride::default()
            },
        ),
        (
            Role::Footer,
            StyleOverride {
                face: Some(regular.to_owned()),
                size: Some(8),
                line_spacing: Some(1.1),
                color: Some(palette.ink),
                ..StyleOverride::default()
            },
        ),
    ];

    StyleTable::build(base, builtin.iter().map(|(role, patch)| (*role, patch)))
        .with_overrides(extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StyleTable {
        letter_styles(
            "Satoshi",
            "Satoshi-Bold",
            &Palette::default(),
            std::iter::empty(),
        )
    }

    #[test]
    fn every_role_resolves() {
        let table = table();
        for role in Role::ALL {
            assert!(!table.get(role).face.is_empty());
        }
    }

    #[test]
    fn roles_without_overrides_inherit_the_base() {
        let table = table();
        assert_eq!(table.get(Role::Normal).alignment, Align::Left);
        assert_eq!(table.get(Role::Date).size, table.get(Role::Normal).size);
        assert_eq!(table.get(Role::Date).alignment, Align::Right);
        assert_eq!(table.get(Role::Body).space_after_pt, 12.0);
        assert_eq!(table.get(Role::Body).face, "Satoshi");
    }

    #[test]
    fn heading_uses_bold_face() {
        let table = table();
        let heading = table.get(Role::Heading);
        assert_eq!(heading.face, "Satoshi-Bold");
        assert_eq!(heading.size, 18);
        assert_eq!(heading.space_before_pt, 12.0);
    }

    #[test]
    fn later_overrides_win() {
        let first = StyleOverride {
            size: Some(11),
            alignment: Some(Align::Center),
            ..StyleOverride::default()
        };
        let second = StyleOverride {
            size: Some(12),
            ..StyleOverride::default()
        };
        let table = letter_styles(
            "Helvetica",
            "Helvetica-Bold",
            &Palette::default(),
            [(Role::Body, &first), (Role::Body, &second)],
        );
        assert_eq!(table.get(Role::Body).size, 12);
        assert_eq!(table.get(Role::Body).alignment, Align::Center);
        assert_eq!(table.get(Role::Body).space_after_pt, 12.0);
    }

    #[test]
    fn config_overrides_apply_after_builtin_ones() {
        let heading = StyleOverride {
            size: Some(24),
            ..StyleOverride::default()
        };
        let table = letter_styles(
            "Satoshi",
            "Satoshi-Bold",
            &Palette::default(),
            vec![(Role::Heading, &heading)],
        );
        assert_eq!(table.get(Role::Heading).size, 24);
        assert_eq!(table.get(Role::Heading).face, "Satoshi-Bold");
        assert_eq!(table.get(Role::Heading).space_after_pt, 6.0);
    }

    #[test]
    fn unregistered_override_faces_map_to_a_weight() {
        let serif = StyleOverride {
            face: Some("Georgia".to_owned()),
            ..StyleOverride::default()
        };
        let black = StyleOverride {
            face: Some("Inter-ExtraBold".to_owned()),
            ..StyleOverride::default()
        };
        let table = letter_styles(
            "Satoshi",
            "Satoshi-Bold",
            &Palette::default(),
            [(Role::Body, &serif), (Role::Date, &black)],
        );
        let registry = crate::fonts::FontRegistry::new(Vec::new());
        let body = registry.resolve_face(&table.get(Role::Body).face);
        let date = registry.resolve_face(&table.get(Role::Date).face);
        assert_eq!(body.weight(), Weight::Regular);
        assert!(body.is_builtin());
        assert_eq!(date.weight(), Weight::Bold);
        assert!(table.get(Role::Date).to_style(&date).is_bold());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            HexColor::parse("#187f76"),
            Ok(HexColor::rgb(0x18, 0x7f, 0x76))
        );
        assert_eq!(HexColor::parse("1E3A5F"), Ok(HexColor::rgb(0x1e, 0x3a, 0x5f)));
        assert!(HexColor::parse("#12FG34").is_err());
        assert!(HexColor::parse("#123").is_err());
        assert_eq!(HexColor::rgb(0xd7, 0xd9, 0xdb).to_string(), "#d7d9db");
    }

    #[test]
    fn palette_round_trips_through_json() {
        let json = serde_json::to_string(&Palette::default()).expect("serialize palette");
        assert!(json.contains("#187f76"));
        let palette: Palette = serde_json::from_str(&json).expect("deserialize palette");
        assert_eq!(palette, Palette::default());
    }
}
