//! Business letters on a fixed corporate letterhead, rendered with `genpdf`.

pub mod builder;
pub mod config;
pub mod decorator;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod inspect;
pub mod model;
pub mod richtext;
pub mod sample;
pub mod style;

pub use builder::{generate_document, LetterBuilder, Outcome, RenderReport, RenderedLetter};
pub use config::LetterConfig;
pub use error::LetterError;
pub use model::LetterContent;
