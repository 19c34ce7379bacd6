//! Page chrome: sidebar, logo, organization name, rules and the footer columns.
//!
//! The chrome is computed by [`ChromeLayout::compute`] from the page geometry,
//! the logo footprint and text measurements, and then painted by
//! [`LetterheadChrome`]. The layout depends on nothing but those inputs, so every
//! page of a document receives the same chrome no matter how much body content
//! it carries.
//!
//! [`ChromeDecorator`] plugs a [`PageChrome`] into `genpdf`: at every page start
//! it paints the chrome over the full page and hands the area inside the page
//! margins back to the engine for the body flow.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::Image;
use genpdf::error::Error;
use genpdf::fonts::FontCache;
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Context, Element, PageDecorator, Position};
use log::{debug, warn};

use crate::elements::{ColorBlock, LogoFootprint, LogoImage};
use crate::fonts::FaceHandle;
use crate::geometry::{mm, mm_to_f64, points, ChromeDimensions, PageGeometry};
use crate::style::{Align, Palette, StyleSpec};

/// Font size of the organization name in the header.
pub const ORGANIZATION_NAME_SIZE: u8 = 9;

/// One of the three footer blocks: a bold label followed by plain lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FooterColumn {
    label: String,
    lines: Vec<String>,
    align: Align,
}

impl FooterColumn {
    /// Creates a footer column.
    pub fn new(label: impl Into<String>, lines: Vec<String>, align: Align) -> Self {
        Self {
            label: label.into(),
            lines,
            align,
        }
    }

    /// The bold label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The plain lines below the label.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Alignment inside the column.
    pub fn align(&self) -> Align {
        self.align
    }
}

/// Text measurement used to lay out the chrome, in millimetres.
pub trait TextMeasure {
    /// Width of `text` in the regular or bold face.
    fn width(&self, text: &str, bold: bool) -> f64;

    /// Distance between consecutive baselines.
    fn line_height(&self) -> f64;
}

/// Measures text with the faces loaded into a `genpdf` font cache.
pub struct FontMeasure<'a> {
    cache: &'a FontCache,
    regular: Style,
    bold: Style,
}

impl<'a> FontMeasure<'a> {
    /// Measures text set in `style` and its bold variant.
    pub fn new(cache: &'a FontCache, style: Style) -> Self {
        Self {
            cache,
            regular: style,
            bold: style.bold(),
        }
    }
}

impl TextMeasure for FontMeasure<'_> {
    fn width(&self, text: &str, bold: bool) -> f64 {
        let style = if bold { &self.bold } else { &self.regular };
        mm_to_f64(style.str_width(self.cache, text))
    }

    fn line_height(&self) -> f64 {
        mm_to_f64(self.regular.line_height(self.cache))
    }
}

/// Breaks `text` into lines no wider than `max_width` at word boundaries.
///
/// A single word wider than `max_width` occupies a line of its own.
pub fn wrap_words<F>(text: &str, max_width: f64, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if width_of(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// An axis-aligned rectangle; `y` grows downwards from the top page edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A horizontal rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub x_start: f64,
    pub x_end: f64,
    pub y: f64,
}

/// A line of text whose top-left corner sits at `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub bold: bool,
    pub x: f64,
    pub y: f64,
}

/// A measured and positioned footer column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    /// Space the column occupies; its height is the measured wrapped height.
    pub bounds: Rect,
    /// Wrapped lines, label first.
    pub lines: Vec<PlacedText>,
}

/// Positions of every chrome element on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct ChromeLayout {
    pub sidebar: Rect,
    pub logo: Option<Rect>,
    pub organization_name: PlacedText,
    pub header_rule: Rule,
    pub footer_rule: Rule,
    pub columns: Vec<ColumnLayout>,
}

impl ChromeLayout {
    /// Lays out the chrome of a page.
    ///
    /// `name_line_height` is the line height of the organization name and
    /// `footer` measures footer text.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        geometry: &PageGeometry,
        chrome: &ChromeDimensions,
        logo: LogoFootprint,
        organization_name: &str,
        name_line_height: f64,
        columns: &[FooterColumn],
        footer: &dyn TextMeasure,
    ) -> Self {
        let left = geometry.left_mm;
        let right = geometry.width_mm - geometry.right_mm;

        let sidebar = Rect {
            x: 0.0,
            y: 0.0,
            width: chrome.sidebar_width_mm,
            height: geometry.height_mm,
        };

        let logo_rect = (!logo.is_empty()).then_some(Rect {
            x: left,
            y: chrome.logo_top_mm,
            width: logo.width,
            height: logo.height,
        });

        let name_x = match logo_rect {
            Some(rect) => rect.x + rect.width + chrome.logo_text_gap_mm,
            None => left,
        };
        let name_center = chrome.logo_top_mm + logo.height / 2.0;
        let organization_name = PlacedText {
            text: organization_name.to_owned(),
            bold: false,
            x: name_x,
            y: name_center - name_line_height / 2.0,
        };

        let header_rule = Rule {
            x_start: left,
            x_end: right,
            y: chrome.header_rule_y(),
        };
        let footer_rule = Rule {
            x_start: left,
            x_end: right,
            y: geometry.content_bottom() + chrome.footer_rule_offset_mm,
        };

        let column_width = geometry.content_width() / columns.len().max(1) as f64;
        let lowest_bottom = geometry.height_mm - chrome.footer_min_bottom_mm;
        let columns = columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let x = left + column_width * index as f64;
                layout_column(
                    column,
                    x,
                    column_width,
                    footer_rule.y + chrome.footer_padding_mm,
                    lowest_bottom,
                    footer,
                )
            })
            .collect();

        Self {
            sidebar,
            logo: logo_rect,
            organization_name,
            header_rule,
            footer_rule,
            columns,
        }
    }
}

fn layout_column(
    column: &FooterColumn,
    x: f64,
    width: f64,
    top: f64,
    lowest_bottom: f64,
    measure: &dyn TextMeasure,
) -> ColumnLayout {
    let mut wrapped: Vec<(String, bool)> = wrap_words(&column.label, width, |s| {
        measure.width(s, true)
    })
    .into_iter()
    .map(|line| (line, true))
    .collect();
    for line in &column.lines {
        wrapped.extend(
            wrap_words(line, width, |s| measure.width(s, false))
                .into_iter()
                .map(|line| (line, false)),
        );
    }

    let line_height = measure.line_height();
    let height = line_height * wrapped.len() as f64;
    let y = if top + height > lowest_bottom {
        lowest_bottom - height
    } else {
        top
    };

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(index, (text, bold))| {
            let slack = (width - measure.width(&text, bold)).max(0.0);
            let offset = match column.align {
                Align::Left => 0.0,
                Align::Center => slack / 2.0,
                Align::Right => slack,
            };
            PlacedText {
                text,
                bold,
                x: x + offset,
                y: y + line_height * index as f64,
            }
        })
        .collect();

    ColumnLayout {
        bounds: Rect {
            x,
            y,
            width,
            height,
        },
        lines,
    }
}

/// Chrome painted at the start of every page.
pub trait PageChrome {
    /// Paints onto `area`, which covers the whole page, and returns the layout
    /// that was painted. Painting is best effort and never fails.
    fn paint(&self, context: &Context, area: &Area<'_>, style: Style) -> ChromeLayout;
}

/// The letterhead chrome.
pub struct LetterheadChrome {
    geometry: PageGeometry,
    dimensions: ChromeDimensions,
    palette: Palette,
    organization_name: String,
    columns: Vec<FooterColumn>,
    logo: Option<LogoImage>,
    name_style: Style,
    footer_style: Style,
}

impl LetterheadChrome {
    /// Creates the chrome; footer text is set in `footer` with `footer_face`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        geometry: PageGeometry,
        dimensions: ChromeDimensions,
        palette: Palette,
        organization_name: impl Into<String>,
        columns: Vec<FooterColumn>,
        logo: Option<LogoImage>,
        footer_face: &FaceHandle,
        footer: &StyleSpec,
    ) -> Self {
        let name_style = Style::new()
            .with_font_size(ORGANIZATION_NAME_SIZE)
            .with_line_spacing(1.0)
            .with_color(palette.ink.to_color());
        Self {
            geometry,
            dimensions,
            palette,
            organization_name: organization_name.into(),
            columns,
            logo,
            name_style,
            footer_style: footer.to_style(footer_face),
        }
    }

    fn logo_footprint(&self) -> LogoFootprint {
        self.logo
            .as_ref()
            .map(LogoImage::footprint)
            .unwrap_or_default()
    }

    /// Lays out the chrome with the fonts in `cache`.
    pub fn layout(&self, cache: &FontCache, base: Style) -> ChromeLayout {
        let name_style = base.and(self.name_style);
        let footer = FontMeasure::new(cache, base.and(self.footer_style));
        ChromeLayout::compute(
            &self.geometry,
            &self.dimensions,
            self.logo_footprint(),
            &self.organization_name,
            mm_to_f64(name_style.line_height(cache)),
            &self.columns,
            &footer,
        )
    }

    fn draw_rule(&self, context: &Context, area: &Area<'_>, rule: &Rule, style: Style) {
        let thickness = points(self.dimensions.rule_thickness_pt);
        let rect = Rect {
            x: rule.x_start,
            y: rule.y - thickness / 2.0,
            width: rule.x_end - rule.x_start,
            height: thickness,
        };
        self.fill(context, area, rect, self.palette.rule.channels(), style);
    }

    fn fill(&self, context: &Context, area: &Area<'_>, rect: Rect, rgb: [u8; 3], style: Style) {
        let block = ColorBlock::new(rgb, rect.width, rect.height);
        match block.element() {
            Ok(image) => stamp(image, context, area, rect, style),
            Err(err) => warn!("Failed to fill {:?}: {}", rect, err),
        }
    }

    fn print(&self, context: &Context, area: &Area<'_>, text: &PlacedText, style: Style) {
        let style = if text.bold { style.bold() } else { style };
        match area.print_str(
            &context.font_cache,
            Position::new(mm(text.x), mm(text.y)),
            style,
            &text.text,
        ) {
            Ok(true) => {}
            Ok(false) => debug!("Chrome text '{}' does not fit on the page", text.text),
            Err(err) => warn!("Failed to print chrome text '{}': {}", text.text, err),
        }
    }

    fn paint_logo(&self, context: &Context, area: &Area<'_>, rect: Rect, style: Style) {
        let Some(logo) = &self.logo else {
            return;
        };
        match logo.element() {
            Ok(image) => stamp(image, context, area, rect, style),
            Err(err) => warn!("Skipping logo: {}", err),
        }
    }
}

/// Renders `image` with its top-left corner at the corner of `rect`.
fn stamp(mut image: Image, context: &Context, area: &Area<'_>, rect: Rect, style: Style) {
    let mut target = area.clone();
    target.add_offset(Position::new(mm(rect.x), mm(rect.y)));
    if let Err(err) = image.render(context, target, style) {
        warn!("Failed to paint image at {:?}: {}", rect, err);
    }
}

impl PageChrome for LetterheadChrome {
    fn paint(&self, context: &Context, area: &Area<'_>, style: Style) -> ChromeLayout {
        let layout = self.layout(&context.font_cache, style);

        self.fill(context, area, layout.sidebar, self.palette.accent.channels(), style);

        if let Some(rect) = layout.logo {
            self.paint_logo(context, area, rect, style);
        }

        self.print(
            context,
            area,
            &layout.organization_name,
            style.and(self.name_style),
        );

        self.draw_rule(context, area, &layout.header_rule, style);
        self.draw_rule(context, area, &layout.footer_rule, style);

        let footer_style = style.and(self.footer_style);
        for column in &layout.columns {
            for line in &column.lines {
                self.print(context, area, line, footer_style);
            }
        }

        layout
    }
}

/// Number of pages decorated during a render.
#[derive(Clone, Debug, Default)]
pub struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    /// Pages decorated so far.
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn increment(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Chrome layouts painted during a render, one per page.
#[derive(Clone, Debug, Default)]
pub struct PaintLog(Rc<RefCell<Vec<ChromeLayout>>>);

impl PaintLog {
    /// Takes the recorded layouts.
    pub fn take(&self) -> Vec<ChromeLayout> {
        self.0.take()
    }

    fn push(&self, layout: ChromeLayout) {
        self.0.borrow_mut().push(layout);
    }
}

/// Adapts a [`PageChrome`] to `genpdf`'s page decorator callback.
pub struct ChromeDecorator<C> {
    chrome: C,
    geometry: PageGeometry,
    pages: PageCounter,
    log: PaintLog,
}

impl<C: PageChrome> ChromeDecorator<C> {
    /// Creates a decorator reserving the margins of `geometry` for the chrome.
    pub fn new(chrome: C, geometry: PageGeometry) -> Self {
        Self {
            chrome,
            geometry,
            pages: PageCounter::default(),
            log: PaintLog::default(),
        }
    }

    /// Handle to the page counter, readable after the document is rendered.
    pub fn page_counter(&self) -> PageCounter {
        self.pages.clone()
    }

    /// Handle to the painted layouts, readable after the document is rendered.
    pub fn paint_log(&self) -> PaintLog {
        self.log.clone()
    }
}

impl<C: PageChrome> PageDecorator for ChromeDecorator<C> {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: Style,
    ) -> Result<Area<'a>, Error> {
        self.pages.increment();
        let layout = self.chrome.paint(context, &area, style);
        self.log.push(layout);

        area.add_margins(self.geometry.margins());
        Ok(area)
    }
}
