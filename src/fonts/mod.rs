//! Font registration and face resolution.
//!
//! Faces are registered by name once, when a [`FontRegistry`] is built, and are
//! looked up through [`FontRegistry::resolve_face`]. Names that were never
//! registered (a missing or unreadable font file) resolve to the built-in
//! Helvetica faces of the matching weight, so resolution never fails.
//!
//! `genpdf` needs glyph metrics even for the built-in PDF faces. The built-in
//! faces take their metrics from a metric-compatible TrueType file found in one
//! of the configured metric directories, or from the DejaVu Sans faces compiled
//! into the crate when no such file exists. Either way the document only
//! references the standard Helvetica fonts.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

use crate::config::{AssetPaths, FontSettings, LetterConfig};
use crate::error::LetterError;

/// Name of the built-in regular face.
pub const BUILTIN_REGULAR_FACE: &str = "Helvetica";

/// Name of the built-in bold face.
pub const BUILTIN_BOLD_FACE: &str = "Helvetica-Bold";

/// Regular, bold, italic and bold italic files with Helvetica-like metrics.
const METRIC_FILES: &[[&str; 4]] = &[
    [
        "LiberationSans-Regular.ttf",
        "LiberationSans-Bold.ttf",
        "LiberationSans-Italic.ttf",
        "LiberationSans-BoldItalic.ttf",
    ],
    ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"],
    [
        "Arial.ttf",
        "Arial Bold.ttf",
        "Arial Italic.ttf",
        "Arial Bold Italic.ttf",
    ],
    [
        "DejaVuSans.ttf",
        "DejaVuSans-Bold.ttf",
        "DejaVuSans-Oblique.ttf",
        "DejaVuSans-BoldOblique.ttf",
    ],
];

/// Metrics used for the built-in faces when no metric file is installed.
const EMBEDDED_METRICS: [&[u8]; 4] = [
    include_bytes!("../../assets/fonts/DejaVuSans.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Oblique.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-BoldOblique.ttf"),
];

/// Stroke weight of a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    /// Regular weight.
    Regular,
    /// Bold weight.
    Bold,
}

impl Weight {
    /// Guesses the weight from a face name such as `Satoshi-Bold`.
    pub fn from_face_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("bold") {
            Weight::Bold
        } else {
            Weight::Regular
        }
    }
}

/// Where the glyph data of a face comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaceSource {
    /// A TrueType file embedded into the document.
    File(PathBuf),
    /// One of the standard PDF faces.
    Builtin,
}

/// One of the four slots of a `genpdf` font family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Upright regular.
    Regular,
    /// Upright bold.
    Bold,
    /// Slanted regular.
    Italic,
    /// Slanted bold.
    BoldItalic,
}

impl Variant {
    fn slanted(weight: Weight) -> Self {
        match weight {
            Weight::Regular => Variant::Italic,
            Weight::Bold => Variant::BoldItalic,
        }
    }

    fn index(self) -> usize {
        match self {
            Variant::Regular => 0,
            Variant::Bold => 1,
            Variant::Italic => 2,
            Variant::BoldItalic => 3,
        }
    }

    fn builtin_font(self) -> printpdf::BuiltinFont {
        match self {
            Variant::Regular => printpdf::BuiltinFont::Helvetica,
            Variant::Bold => printpdf::BuiltinFont::HelveticaBold,
            Variant::Italic => printpdf::BuiltinFont::HelveticaOblique,
            Variant::BoldItalic => printpdf::BuiltinFont::HelveticaBoldOblique,
        }
    }
}

impl From<Weight> for Variant {
    fn from(weight: Weight) -> Self {
        match weight {
            Weight::Regular => Variant::Regular,
            Weight::Bold => Variant::Bold,
        }
    }
}

/// A resolved, registered face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceHandle {
    name: String,
    weight: Weight,
    source: FaceSource,
}

impl FaceHandle {
    fn builtin(weight: Weight) -> Self {
        let name = match weight {
            Weight::Regular => BUILTIN_REGULAR_FACE,
            Weight::Bold => BUILTIN_BOLD_FACE,
        };
        Self {
            name: name.to_owned(),
            weight,
            source: FaceSource::Builtin,
        }
    }

    /// Registered name of the face.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weight of the face.
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Source of the glyph data.
    pub fn source(&self) -> &FaceSource {
        &self.source
    }

    /// Whether this is one of the built-in PDF faces.
    pub fn is_builtin(&self) -> bool {
        self.source == FaceSource::Builtin
    }
}

/// Name-to-face registry shared by every document generated with it.
#[derive(Clone, Debug)]
pub struct FontRegistry {
    faces: BTreeMap<String, FaceHandle>,
    metric_dirs: Vec<PathBuf>,
}

impl FontRegistry {
    /// Creates a registry holding only the built-in faces.
    pub fn new(metric_dirs: Vec<PathBuf>) -> Self {
        let mut faces = BTreeMap::new();
        for weight in [Weight::Regular, Weight::Bold] {
            let face = FaceHandle::builtin(weight);
            faces.insert(face.name.clone(), face);
        }
        Self { faces, metric_dirs }
    }

    /// Builds a registry with the faces named in `settings`, loaded from `assets`.
    ///
    /// Missing or unreadable font files are logged and left unregistered.
    pub fn from_assets(assets: &AssetPaths, settings: &FontSettings) -> Self {
        let mut registry = Self::new(settings.metric_dirs.clone());
        let faces = [
            (&settings.regular_face, assets.regular_font_path(), Weight::Regular),
            (&settings.bold_face, assets.bold_font_path(), Weight::Bold),
        ];

        for (name, path, weight) in faces {
            if let Err(err) = registry.register(name, &path, weight) {
                warn!(
                    "Font '{}' unavailable ({}); using {} instead.",
                    name,
                    err,
                    FaceHandle::builtin(weight).name
                );
            }
        }

        registry
    }

    /// Builds the registry for a letter configuration.
    pub fn from_config(config: &LetterConfig) -> Self {
        Self::from_assets(&config.assets, &config.fonts)
    }

    /// Registers `name` backed by the font file at `path`.
    ///
    /// Returns `Ok(false)` without touching the file when `name` is already
    /// registered, so registering twice is harmless.
    pub fn register(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        weight: Weight,
    ) -> Result<bool, LetterError> {
        if self.faces.contains_key(name) {
            debug!("Font '{}' already registered; skipping.", name);
            return Ok(false);
        }

        let path = path.as_ref();
        if !path.is_file() {
            return Err(LetterError::FontLoad(Error::new(
                format!("font file missing at {}", path.display()),
                io::Error::new(io::ErrorKind::NotFound, "font file not found"),
            )));
        }
        FontData::load(path, None).map_err(LetterError::FontLoad)?;

        self.faces.insert(
            name.to_owned(),
            FaceHandle {
                name: name.to_owned(),
                weight,
                source: FaceSource::File(path.to_path_buf()),
            },
        );
        Ok(true)
    }

    /// Whether a face with this exact name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.faces.contains_key(name)
    }

    /// Looks up `name`, falling back to the built-in face of the same weight.
    pub fn resolve_face(&self, name: &str) -> FaceHandle {
        match self.faces.get(name) {
            Some(face) => face.clone(),
            None => FaceHandle::builtin(Weight::from_face_name(name)),
        }
    }

    /// Loads the glyph data of the regular and bold faces as a `genpdf` family.
    ///
    /// The italic slots always use the built-in oblique faces of the matching
    /// weight, since only upright faces are configured. When no bold face can
    /// be loaded at all, bold text is set in the regular face.
    pub fn load_family(
        &self,
        regular: &FaceHandle,
        bold: &FaceHandle,
    ) -> Result<FontFamily<FontData>, LetterError> {
        let bold_data = match self.load_face(bold) {
            Ok(data) => data,
            Err(err) => {
                warn!("No bold face available ({}); bold text uses the regular face.", err);
                self.load_face(regular)?
            }
        };

        Ok(FontFamily {
            regular: self.load_face(regular)?,
            bold: bold_data,
            italic: self.load_builtin(Variant::slanted(regular.weight))?,
            bold_italic: self.load_builtin(Variant::slanted(bold.weight))?,
        })
    }

    fn load_face(&self, face: &FaceHandle) -> Result<FontData, LetterError> {
        match &face.source {
            FaceSource::File(path) => match FontData::load(path, None) {
                Ok(data) => Ok(data),
                Err(err) => {
                    warn!(
                        "Failed to load font '{}' from {}: {}; using the built-in face.",
                        face.name,
                        path.display(),
                        err
                    );
                    self.load_builtin(face.weight.into())
                }
            },
            FaceSource::Builtin => self.load_builtin(face.weight.into()),
        }
    }

    fn load_builtin(&self, variant: Variant) -> Result<FontData, LetterError> {
        let builtin = Some(variant.builtin_font());
        match self.metric_file(variant) {
            Some(path) => FontData::load(&path, builtin).map_err(LetterError::FontLoad),
            None => {
                debug!(
                    "No metric file for {:?} in {} director(ies); using the embedded metrics.",
                    variant,
                    self.metric_dirs.len()
                );
                FontData::new(EMBEDDED_METRICS[variant.index()].to_vec(), builtin)
                    .map_err(LetterError::FontLoad)
            }
        }
    }

    fn metric_file(&self, variant: Variant) -> Option<PathBuf> {
        self.metric_dirs.iter().find_map(|dir| {
            METRIC_FILES.iter().find_map(|files| {
                let candidate = dir.join(files[variant.index()]);
                candidate.is_file().then_some(candidate)
            })
        })
    }

    /// Whether the built-in faces take their metrics from an installed file
    /// rather than the embedded fallback.
    pub fn builtin_metrics_available(&self) -> bool {
        [Variant::Regular, Variant::Bold]
            .into_iter()
            .all(|variant| self.metric_file(variant).is_some())
    }
}

/// Directories searched for Helvetica-compatible metric files by default.
pub fn default_metric_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("assets/fonts")];
    dirs.extend(
        [
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/truetype/liberation2",
            "/usr/share/fonts/liberation-sans",
            "/usr/share/fonts/liberation",
            "/usr/share/fonts/TTF",
            "/usr/share/fonts/truetype/dejavu",
            "/Library/Fonts",
            "/System/Library/Fonts/Supplemental",
            "C:\\Windows\\Fonts",
        ]
        .iter()
        .map(PathBuf::from),
    );
    dirs
}

static REGISTRY: OnceLock<FontRegistry> = OnceLock::new();

/// Process-wide registry built from the default configuration on first use.
pub fn registry() -> &'static FontRegistry {
    REGISTRY.get_or_init(|| FontRegistry::from_config(&LetterConfig::default()))
}

/// Resolves `name` through the process-wide registry.
pub fn resolve_face(name: &str) -> FaceHandle {
    registry().resolve_face(name)
}
