//! Letter assembly and rendering.
//!
//! [`assemble_blocks`] turns a [`LetterContent`] into the ordered block
//! sequence of the letter body. [`LetterBuilder`] converts those blocks into
//! `genpdf` elements, attaches the letterhead chrome as the page decorator and
//! lets the engine paginate. [`generate_document`] wraps the whole pipeline and
//! reports an [`Outcome`] instead of an error.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use genpdf::{Element, Margins};
use log::{debug, error, info};

use crate::config::{AssetPaths, FontSettings, LetterConfig};
use crate::decorator::{ChromeDecorator, ChromeLayout, LetterheadChrome, PageCounter, PaintLog};
use crate::elements::{LogoImage, Spacer};
use crate::error::LetterError;
use crate::fonts::{self, FontRegistry};
use crate::geometry::{mm, MM_PER_INCH};
use crate::model::LetterContent;
use crate::richtext;
use crate::style::{letter_styles, Role, StyleTable};

/// Gap after the date, after the recipient lines and before the signature.
pub const WIDE_GAP_MM: f64 = 0.25 * MM_PER_INCH;

/// Gap after the title and after the salutation.
pub const NARROW_GAP_MM: f64 = 0.1 * MM_PER_INCH;

/// One entry of the letter body.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// A paragraph set in the style of `role`.
    Text { role: Role, text: String },
    /// Fixed vertical whitespace in millimetres.
    Gap(f64),
}

impl Block {
    fn text(role: Role, text: &str) -> Self {
        Block::Text {
            role,
            text: text.to_owned(),
        }
    }
}

/// Builds the block sequence of a letter.
///
/// The order is fixed: date, recipient lines, title, salutation, body
/// paragraphs, closing and signature lines, separated by fixed gaps. Empty text
/// fields produce no block; the gaps around them stay in place.
pub fn assemble_blocks(content: &LetterContent) -> Vec<Block> {
    fn push_text(blocks: &mut Vec<Block>, role: Role, text: &str) {
        if text.trim().is_empty() {
            debug!("Skipping empty {:?} block.", role);
        } else {
            blocks.push(Block::text(role, text));
        }
    }

    let mut blocks = Vec::new();

    push_text(&mut blocks, Role::Date, &content.date);
    blocks.push(Block::Gap(WIDE_GAP_MM));

    for line in &content.recipient {
        push_text(&mut blocks, Role::Recipient, line);
    }
    blocks.push(Block::Gap(WIDE_GAP_MM));

    push_text(&mut blocks, Role::Heading, &content.title);
    blocks.push(Block::Gap(NARROW_GAP_MM));

    push_text(&mut blocks, Role::Normal, &content.salutation);
    blocks.push(Block::Gap(NARROW_GAP_MM));

    for paragraph in &content.body {
        push_text(&mut blocks, Role::Body, paragraph);
    }

    push_text(&mut blocks, Role::Normal, &content.closing);
    blocks.push(Block::Gap(WIDE_GAP_MM));

    for line in &content.signature {
        push_text(&mut blocks, Role::Normal, line);
    }

    blocks
}

/// A letter rendered in memory.
#[derive(Clone, Debug)]
pub struct RenderedLetter {
    /// The PDF document.
    pub bytes: Vec<u8>,
    /// Number of pages the chrome was painted on.
    pub pages: usize,
    /// Chrome painted on each page, in page order.
    pub chrome: Vec<ChromeLayout>,
}

/// Summary of a letter written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderReport {
    /// Where the PDF was written.
    pub path: PathBuf,
    /// Number of pages.
    pub pages: usize,
    /// Size of the PDF in bytes.
    pub bytes: usize,
}

/// Renders letters with one configuration.
#[derive(Clone, Debug, Default)]
pub struct LetterBuilder {
    config: LetterConfig,
    registry: Option<FontRegistry>,
}

impl LetterBuilder {
    /// Creates a builder with the stock configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for `config`.
    pub fn with_config(config: LetterConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Uses `registry` instead of one derived from the configuration.
    pub fn with_registry(mut self, registry: FontRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The configuration letters are rendered with.
    pub fn config(&self) -> &LetterConfig {
        &self.config
    }

    fn registry(&self) -> Cow<'_, FontRegistry> {
        if let Some(registry) = &self.registry {
            return Cow::Borrowed(registry);
        }
        if self.config.assets == AssetPaths::default() && self.config.fonts == FontSettings::default()
        {
            Cow::Borrowed(fonts::registry())
        } else {
            Cow::Owned(FontRegistry::from_config(&self.config))
        }
    }

    fn styles(&self) -> StyleTable {
        let fonts = &self.config.fonts;
        letter_styles(
            &fonts.regular_face,
            &fonts.bold_face,
            &self.config.palette,
            self.config.styles.iter().map(|(role, patch)| (*role, patch)),
        )
    }

    fn document_title(&self, content: &LetterContent) -> String {
        if let Some(title) = &self.config.document_title {
            return title.clone();
        }
        if content.title.trim().is_empty() {
            self.config.organization.name.clone()
        } else {
            content.title.clone()
        }
    }

    /// Builds the `genpdf` document for `content` without rendering it.
    ///
    /// The returned decorator handles report the pages and chrome painted once
    /// the document has been rendered.
    pub fn build_document(
        &self,
        content: &LetterContent,
    ) -> Result<(genpdf::Document, ChromeHandles), LetterError> {
        let config = &self.config;
        config.geometry.validate(&config.chrome)?;

        let registry = self.registry();
        let styles = self.styles();
        let regular = registry.resolve_face(&config.fonts.regular_face);
        let bold = registry.resolve_face(&config.fonts.bold_face);
        let family = registry.load_family(&regular, &bold)?;

        let mut document = genpdf::Document::new(family);
        document.set_paper_size(config.geometry.paper_size());
        document.set_title(self.document_title(content));
        let normal = styles.get(Role::Normal);
        document.set_font_size(normal.size);
        document.set_line_spacing(normal.line_spacing);

        let footer = styles.get(Role::Footer);
        let chrome = LetterheadChrome::new(
            config.geometry,
            config.chrome,
            config.palette,
            config.organization.name.clone(),
            Vec::from(config.organization.footer_columns()),
            LogoImage::load_optional(
                config.assets.logo_path(),
                config.chrome.logo_width_mm,
                config.chrome.logo_max_height(),
            ),
            &registry.resolve_face(&footer.face),
            footer,
        );
        let decorator = ChromeDecorator::new(chrome, config.geometry);
        let handles = ChromeHandles {
            pages: decorator.page_counter(),
            paint_log: decorator.paint_log(),
        };
        document.set_page_decorator(decorator);

        for block in assemble_blocks(content) {
            match block {
                Block::Text { role, text } => {
                    push_paragraph(&mut document, &styles, &registry, role, &text)
                }
                Block::Gap(height) => document.push(Spacer::new(height)),
            }
        }

        Ok((document, handles))
    }

    /// Renders `content` into memory.
    pub fn render(&self, content: &LetterContent) -> Result<RenderedLetter, LetterError> {
        let (document, handles) = self.build_document(content)?;
        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(LetterError::Render)?;
        Ok(RenderedLetter {
            bytes,
            pages: handles.pages.get(),
            chrome: handles.paint_log.take(),
        })
    }

    /// Renders `content` and writes the PDF to `path`.
    pub fn write_to(
        &self,
        path: impl AsRef<Path>,
        content: &LetterContent,
    ) -> Result<RenderReport, LetterError> {
        let path = path.as_ref();
        let rendered = self.render(content)?;
        fs::write(path, &rendered.bytes).map_err(|err| LetterError::io(path, err))?;
        Ok(RenderReport {
            path: path.to_path_buf(),
            pages: rendered.pages,
            bytes: rendered.bytes.len(),
        })
    }
}

/// Readers for what the page decorator recorded while a document rendered.
#[derive(Clone, Debug)]
pub struct ChromeHandles {
    pub pages: PageCounter,
    pub paint_log: PaintLog,
}

fn push_paragraph(
    document: &mut genpdf::Document,
    styles: &StyleTable,
    registry: &FontRegistry,
    role: Role,
    text: &str,
) {
    let spec = styles.get(role);
    let face = registry.resolve_face(&spec.face);
    let mut paragraph = richtext::paragraph(&richtext::spans_or_plain(text));
    paragraph.set_alignment(spec.alignment.into());

    let padding = Margins::trbl(
        mm(spec.space_before_mm()),
        0,
        mm(spec.space_after_mm()),
        0,
    );
    document.push(paragraph.styled(spec.to_style(&face)).padded(padding));
}

/// Result of [`generate_document`].
#[derive(Debug)]
pub enum Outcome {
    /// The PDF was written.
    Generated(RenderReport),
    /// Generation failed; nothing usable was written.
    Failed(LetterError),
}

impl Outcome {
    /// Whether the PDF was written.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Generated(_))
    }

    /// The report of a successful generation.
    pub fn report(&self) -> Option<&RenderReport> {
        match self {
            Outcome::Generated(report) => Some(report),
            Outcome::Failed(_) => None,
        }
    }

    /// The error of a failed generation.
    pub fn error(&self) -> Option<&LetterError> {
        match self {
            Outcome::Generated(_) => None,
            Outcome::Failed(err) => Some(err),
        }
    }

    /// Converts the outcome into a `Result`.
    pub fn into_result(self) -> Result<RenderReport, LetterError> {
        match self {
            Outcome::Generated(report) => Ok(report),
            Outcome::Failed(err) => Err(err),
        }
    }
}

/// Generates the letter PDF for `content` at `path`.
///
/// Failures are logged and returned as [`Outcome::Failed`].
pub fn generate_document(
    path: impl AsRef<Path>,
    content: &LetterContent,
    config: &LetterConfig,
) -> Outcome {
    let path = path.as_ref();
    match LetterBuilder::with_config(config.clone()).write_to(path, content) {
        Ok(report) => {
            info!(
                "Generated {} ({} page(s), {} bytes)",
                report.path.display(),
                report.pages,
                report.bytes
            );
            Outcome::Generated(report)
        }
        Err(err) => {
            error!("Failed to generate {}: {}", path.display(), err);
            Outcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::inches;

    fn gap(value_in: f64) -> Block {
        Block::Gap(inches(value_in))
    }

    fn roles(blocks: &[Block]) -> Vec<Option<Role>> {
        blocks
            .iter()
            .map(|block| match block {
                Block::Text { role, .. } => Some(*role),
                Block::Gap(_) => None,
            })
            .collect()
    }

    #[test]
    fn blocks_follow_letter_order() {
        let content = LetterContent::new()
            .with_date("16 October 2026")
            .with_recipient(["Mr. John Doe", "Innovate Corp."])
            .with_title("Proposal")
            .with_salutation("Dear Mr. Doe,")
            .with_body(["One.", "Two."])
            .with_closing("Sincerely,")
            .with_signature(["Jane Smith", "Director"]);

        let blocks = assemble_blocks(&content);
        assert_eq!(
            roles(&blocks),
            vec![
                Some(Role::Date),
                None,
                Some(Role::Recipient),
                Some(Role::Recipient),
                None,
                Some(Role::Heading),
                None,
                Some(Role::Normal),
                None,
                Some(Role::Body),
                Some(Role::Body),
                Some(Role::Normal),
                None,
                Some(Role::Normal),
                Some(Role::Normal),
            ]
        );
        assert_eq!(blocks[1], gap(0.25));
        assert_eq!(blocks[6], gap(0.1));
        assert_eq!(
            blocks[13],
            Block::Text {
                role: Role::Normal,
                text: "Jane Smith".to_owned()
            }
        );
    }

    #[test]
    fn empty_letter_keeps_only_gaps() {
        let blocks = assemble_blocks(&LetterContent::default());
        assert_eq!(
            blocks,
            vec![
                Block::Gap(WIDE_GAP_MM),
                Block::Gap(WIDE_GAP_MM),
                Block::Gap(NARROW_GAP_MM),
                Block::Gap(NARROW_GAP_MM),
                Block::Gap(WIDE_GAP_MM),
            ]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let content = LetterContent::new().with_recipient(["  ", "Innovate Corp."]);
        let recipients = assemble_blocks(&content)
            .into_iter()
            .filter(|block| matches!(block, Block::Text { role: Role::Recipient, .. }))
            .count();
        assert_eq!(recipients, 1);
    }

    #[test]
    fn document_title_prefers_configuration() {
        let mut config = LetterConfig::default();
        let content = LetterContent::new().with_title("Proposal");
        assert_eq!(
            LetterBuilder::with_config(config.clone()).document_title(&content),
            "Proposal"
        );
        assert_eq!(
            LetterBuilder::new().document_title(&LetterContent::default()),
            "ACCESS DISCREETKIT LTD"
        );
        config.document_title = Some("Partnership".to_owned());
        assert_eq!(
            LetterBuilder::with_config(config).document_title(&content),
            "Partnership"
        );
    }

    #[test]
    fn invalid_geometry_fails_before_fonts_load() {
        let mut config = LetterConfig::default();
        config.geometry.top_mm = 10.0;
        let err = LetterBuilder::with_config(config)
            .with_registry(FontRegistry::new(Vec::new()))
            .render(&LetterContent::default())
            .unwrap_err();
        assert!(matches!(err, LetterError::Geometry(_)));
    }

    #[test]
    fn failures_become_outcomes() {
        let mut config = LetterConfig::default();
        config.geometry.bottom_mm = 5.0;
        let outcome = generate_document(
            std::env::temp_dir().join("never-written.pdf"),
            &LetterContent::default(),
            &config,
        );
        assert!(!outcome.is_success());
        assert!(outcome.report().is_none());
        assert!(matches!(outcome.error(), Some(LetterError::Geometry(_))));
    }
}
