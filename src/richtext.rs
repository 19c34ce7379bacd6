//! Inline markup for letter paragraphs.
//!
//! Paragraph text may carry a small set of inline decorations:
//!
//! - `**bold**`
//! - `*italic*`
//! - `[color=#RRGGBB]{colored}`
//!
//! The markup is parsed into [`Span`]s, which convert into `genpdf` styled
//! strings. Text that fails to parse is rendered verbatim.

use std::fmt;

use genpdf::elements::Paragraph;
use genpdf::style::{Color, Style, StyledString};
use log::warn;

use crate::style::HexColor;

/// A run of text sharing the same inline decorations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates an undecorated span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Raw text of the span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the span is bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Whether the span is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Color of the span, if it overrides the block color.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Gives the span its own color.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    fn style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span into a `genpdf` styled string.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

/// Error produced by [`parse_markup`] with the byte offset it was found at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte offset in the input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Color(Color),
}

impl Marker {
    fn closing(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
            Marker::Color(_) => "}",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
            Marker::Color(_) => "color span",
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    open: Vec<(Marker, usize)>,
    spans: Vec<Span>,
    pending: String,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            open: Vec::new(),
            spans: Vec::new(),
            pending: String::new(),
        }
    }

    fn current(&self) -> Span {
        let mut span = Span::default();
        for (marker, _) in &self.open {
            match marker {
                Marker::Bold => span.bold = true,
                Marker::Italic => span.italic = true,
                Marker::Color(color) => span.color = Some(*color),
            }
        }
        span
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut span = self.current();
        span.text = std::mem::take(&mut self.pending);
        self.spans.push(span);
    }

    fn open(&mut self, marker: Marker, at: usize) {
        self.flush();
        self.open.push((marker, at));
    }

    fn run(mut self) -> Result<Vec<Span>, ParseError> {
        let input = self.input;
        let mut index = 0;
        while let Some(rest) = input.get(index..).filter(|rest| !rest.is_empty()) {
            if let Some((marker, _)) = self.open.last().copied() {
                if rest.starts_with(marker.closing()) {
                    self.flush();
                    self.open.pop();
                    index += marker.closing().len();
                    continue;
                }
            }

            if rest.starts_with("**") {
                self.open(Marker::Bold, index);
                index += 2;
            } else if rest.starts_with('*') {
                self.open(Marker::Italic, index);
                index += 1;
            } else if rest.starts_with("[color=") {
                let (color, consumed) = color_directive(rest, index)?;
                self.open(Marker::Color(color), index);
                index += consumed;
            } else if rest.starts_with('}') {
                return Err(ParseError::new(
                    index,
                    "unexpected `}` without a matching `[color=...]{`",
                ));
            } else if rest.starts_with('[') || rest.starts_with(']') {
                return Err(ParseError::new(
                    index,
                    "unsupported directive; expected `[color=#RRGGBB]{...}`",
                ));
            } else if let Some(ch) = rest.chars().next() {
                self.pending.push(ch);
                index += ch.len_utf8();
            }
        }

        if let Some((marker, at)) = self.open.last() {
            return Err(ParseError::new(*at, format!("unterminated {}", marker.name())));
        }
        self.flush();
        Ok(self.spans)
    }
}

/// Returns the color and the length of a `[color=#RRGGBB]{` prefix of `rest`.
fn color_directive(rest: &str, index: usize) -> Result<(Color, usize), ParseError> {
    const PREFIX: &str = "[color=";
    const DIRECTIVE_LEN: usize = PREFIX.len() + 7;

    let hex = rest
        .get(PREFIX.len()..DIRECTIVE_LEN)
        .filter(|hex| hex.starts_with('#'))
        .ok_or_else(|| {
            ParseError::new(
                index + PREFIX.len(),
                "expected `#` followed by 6 hexadecimal digits",
            )
        })?;
    let color = HexColor::parse(hex)
        .map_err(|err| ParseError::new(index + PREFIX.len(), err.to_string()))?;

    if !rest[DIRECTIVE_LEN..].starts_with("]{") {
        return Err(ParseError::new(
            index + DIRECTIVE_LEN,
            "expected `]{` after the color value",
        ));
    }

    Ok((color.to_color(), DIRECTIVE_LEN + 2))
}

/// Parses inline markup into spans.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    Parser::new(input).run()
}

/// Parses inline markup, falling back to a single plain span on malformed input.
pub fn spans_or_plain(input: &str) -> Vec<Span> {
    match parse_markup(input) {
        Ok(spans) => spans,
        Err(err) => {
            warn!("Rendering paragraph without markup: {}", err);
            vec![Span::new(input)]
        }
    }
}

/// Builds a `genpdf` paragraph from spans.
pub fn paragraph(spans: &[Span]) -> Paragraph {
    let mut iter = spans.iter();
    let mut paragraph = match iter.next() {
        Some(first) => Paragraph::new(first.to_styled_string()),
        None => Paragraph::new(""),
    };
    for span in iter {
        paragraph.push(span.to_styled_string());
    }
    paragraph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_span() {
        let spans = parse_markup("Dear Mr. Doe,").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("Dear Mr. Doe,")]);
    }

    #[test]
    fn nested_bold_and_italic() {
        let spans = parse_markup("This is **very *cool***!").expect("parse succeeds");
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].text(), "This is ");
        assert!(spans[1].is_bold() && !spans[1].is_italic());
        assert_eq!(spans[2].text(), "cool");
        assert!(spans[2].is_bold() && spans[2].is_italic());
        assert_eq!(spans[3].text(), "!");
        assert!(!spans[3].is_bold());
    }

    #[test]
    fn color_directive_applies_color() {
        let spans = parse_markup("[color=#187f76]{Accra} office").expect("parse succeeds");
        assert_eq!(spans[0].text(), "Accra");
        assert_eq!(spans[0].color(), Some(Color::Rgb(0x18, 0x7f, 0x76)));
        assert_eq!(spans[1].text(), " office");
        assert_eq!(spans[1].color(), None);
    }

    #[test]
    fn reports_unterminated_bold() {
        let err = parse_markup("a **b").unwrap_err();
        assert!(err.message().contains("unterminated bold"));
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn reports_bad_color() {
        let err = parse_markup("[color=#12FG34]{x}").unwrap_err();
        assert!(err.message().contains("invalid color"));
        let err = parse_markup("[color=#12]{x}").unwrap_err();
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn stray_brace_is_an_error() {
        assert!(parse_markup("oops }").is_err());
        assert!(parse_markup("see [1]").is_err());
    }

    #[test]
    fn malformed_markup_falls_back_to_plain_text() {
        let spans = spans_or_plain("5 * 3 = 15");
        assert_eq!(spans, vec![Span::new("5 * 3 = 15")]);
    }

    #[test]
    fn span_style_reflects_flags() {
        let styled = Span::new("Hi").bold().colored(Color::Rgb(1, 2, 3)).to_styled_string();
        assert_eq!(styled.s, "Hi");
        assert!(styled.style.is_bold());
        assert!(!styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(1, 2, 3)));
    }
}
