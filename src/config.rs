//! Configuration of the letter template.
//!
//! Every field has a default matching the stock letterhead, so an empty JSON
//! object is a valid configuration and callers only spell out what they change.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decorator::FooterColumn;
use crate::error::LetterError;
use crate::fonts;
use crate::geometry::{ChromeDimensions, PageGeometry};
use crate::style::{Align, Palette, Role, StyleOverride};

/// Location of the optional font and logo assets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Directory the file names below are resolved against.
    pub directory: PathBuf,
    /// Regular font file name.
    pub regular_font: String,
    /// Bold font file name.
    pub bold_font: String,
    /// Logo image file name.
    pub logo: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::in_directory(discover_asset_directory())
    }
}

impl AssetPaths {
    /// Uses the stock file names inside `directory`.
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            regular_font: "Satoshi-Regular.ttf".to_owned(),
            bold_font: "Satoshi-Bold.ttf".to_owned(),
            logo: "logo.png".to_owned(),
        }
    }

    /// Full path of the regular font.
    pub fn regular_font_path(&self) -> PathBuf {
        self.directory.join(&self.regular_font)
    }

    /// Full path of the bold font.
    pub fn bold_font_path(&self) -> PathBuf {
        self.directory.join(&self.bold_font)
    }

    /// Full path of the logo.
    pub fn logo_path(&self) -> PathBuf {
        self.directory.join(&self.logo)
    }
}

fn asset_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("assets")];

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

/// Returns the first existing `assets` directory, or `assets` if there is none.
pub fn discover_asset_directory() -> PathBuf {
    asset_directory_candidates()
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// Face names used by the letter and where built-in metrics are searched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Name the regular font file is registered under.
    pub regular_face: String,
    /// Name the bold font file is registered under.
    pub bold_face: String,
    /// Directories searched for metric files of the built-in faces.
    pub metric_dirs: Vec<PathBuf>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            regular_face: "Satoshi".to_owned(),
            bold_face: "Satoshi-Bold".to_owned(),
            metric_dirs: fonts::default_metric_dirs(),
        }
    }
}

/// Organization details printed in the header and footer of every page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationProfile {
    /// Name next to the logo.
    pub name: String,
    /// Postal address lines.
    pub address: Vec<String>,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Social media handles, one per line.
    pub social: Vec<String>,
}

impl Default for OrganizationProfile {
    fn default() -> Self {
        Self {
            name: "ACCESS DISCREETKIT LTD".to_owned(),
            address: vec![
                "House No. 57, Kofi Annan East Avenue,".to_owned(),
                "Madina, Accra, Ghana".to_owned(),
            ],
            email: "discreetkit@gmail.com".to_owned(),
            phone: "+233 20 300 1107".to_owned(),
            social: vec![
                "Twitter: @discreetkit".to_owned(),
                "LinkedIn: /company/discreetkit".to_owned(),
            ],
        }
    }
}

impl OrganizationProfile {
    /// The address, contact and social footer columns, left to right.
    pub fn footer_columns(&self) -> [FooterColumn; 3] {
        [
            FooterColumn::new("Address", self.address.clone(), Align::Left),
            FooterColumn::new(
                "Contact",
                vec![
                    format!("Email: {}", self.email),
                    format!("Phone: {}", self.phone),
                ],
                Align::Center,
            ),
            FooterColumn::new("Follow Us", self.social.clone(), Align::Right),
        ]
    }
}

/// Complete configuration of a letter generation call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    /// Font and logo locations.
    pub assets: AssetPaths,
    /// Face names and built-in metric directories.
    pub fonts: FontSettings,
    /// Page size and margins.
    pub geometry: PageGeometry,
    /// Chrome dimensions.
    pub chrome: ChromeDimensions,
    /// Header and footer text.
    pub organization: OrganizationProfile,
    /// Brand colors.
    pub palette: Palette,
    /// Per-role style changes applied on top of the stock styles.
    pub styles: BTreeMap<Role, StyleOverride>,
    /// PDF document title; the letter title is used when absent.
    pub document_title: Option<String>,
}

impl LetterConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, LetterError> {
        serde_json::from_str(json).map_err(LetterError::Config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LetterError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| LetterError::io(path, err))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = LetterConfig::from_json_str("{}").expect("parse empty config");
        assert_eq!(config.organization.name, "ACCESS DISCREETKIT LTD");
        assert_eq!(config.geometry, PageGeometry::a4());
        assert_eq!(config.fonts.regular_face, "Satoshi");
        assert!(config.styles.is_empty());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = LetterConfig::from_json_str(
            r##"{
                "organization": { "name": "Innovate Corp." },
                "geometry": { "left_mm": 25.0 },
                "palette": { "ink": "#000000" },
                "styles": { "Body": { "size": 11 } }
            }"##,
        )
        .expect("parse config");

        assert_eq!(config.organization.name, "Innovate Corp.");
        assert_eq!(config.organization.email, "discreetkit@gmail.com");
        assert_eq!(config.geometry.left_mm, 25.0);
        assert_eq!(config.geometry.right_mm, 20.0);
        assert_eq!(config.palette.ink.to_string(), "#000000");
        assert_eq!(config.styles[&Role::Body].size, Some(11));
    }

    #[test]
    fn invalid_color_is_a_config_error() {
        let err = LetterConfig::from_json_str(r#"{ "palette": { "ink": "blue" } }"#).unwrap_err();
        assert!(matches!(err, LetterError::Config(_)));
    }

    #[test]
    fn footer_columns_follow_profile() {
        let columns = OrganizationProfile::default().footer_columns();
        assert_eq!(columns[0].label(), "Address");
        assert_eq!(columns[1].lines()[0], "Email: discreetkit@gmail.com");
        assert_eq!(columns[1].lines()[1], "Phone: +233 20 300 1107");
        assert_eq!(columns[2].lines()[1], "LinkedIn: /company/discreetkit");
        assert_eq!(columns[2].align(), Align::Right);
    }

    #[test]
    fn asset_paths_join_directory() {
        let assets = AssetPaths::in_directory("/srv/letters");
        assert_eq!(
            assets.logo_path(),
            PathBuf::from("/srv/letters").join("logo.png")
        );
        assert_eq!(
            assets.bold_font_path(),
            PathBuf::from("/srv/letters").join("Satoshi-Bold.ttf")
        );
    }
}
