//! The stock Doe/Innovate Corp partnership letter.

use chrono::{Local, NaiveDate};

use crate::model::LetterContent;

/// File name the sample letter is written to by default.
pub const SAMPLE_OUTPUT: &str = "strategic_proposal.pdf";

/// Format of the date line, e.g. `16 October 2026`.
pub const DATE_FORMAT: &str = "%d %B %Y";

/// Formats `date` for the letter's date line.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date formatted for the letter's date line.
pub fn today() -> String {
    format_date(Local::now().date_naive())
}

/// The sample partnership proposal dated `date`.
pub fn sample_letter(date: impl Into<String>) -> LetterContent {
    LetterContent::new()
        .with_date(date)
        .with_recipient([
            "Mr. John Doe",
            "Chief Executive Officer",
            "Innovate Corp.",
            "123 Innovation Drive, Accra, Ghana",
        ])
        .with_title("Proposal for Strategic Partnership")
        .with_salutation("Dear Mr. Doe,")
        .with_body([
            "We are writing to propose a strategic partnership between Access DiscreetKit Ltd \
             and Innovate Corp. Our analysis indicates that a collaboration could unlock \
             significant value in the market. We have attached a detailed deck outlining the \
             potential synergies, go-to-market strategy, and proposed financial arrangements.",
            "This is a second paragraph to demonstrate text wrapping and flow. It will continue \
             on as long as necessary, respecting the margins we've set. When this paragraph \
             becomes too long for the current page, it will automatically break and continue on \
             a new page, which will also feature the same header and footer.",
            "Thank you for considering our proposal. We look forward to the possibility of \
             working together.",
        ])
        .with_closing("Sincerely,")
        .with_signature([
            "Jane Smith",
            "Director of Business Development",
            "Access DiscreetKit Ltd",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_long_month_names() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 6).expect("valid date");
        assert_eq!(format_date(date), "06 October 2026");
    }

    #[test]
    fn sample_has_every_section() {
        let letter = sample_letter("06 October 2026");
        assert_eq!(letter.recipient.len(), 4);
        assert_eq!(letter.body.len(), 3);
        assert_eq!(letter.signature[0], "Jane Smith");
        assert!(letter.body[0].starts_with("We are writing"));
        assert!(letter.body[0].contains("Innovate Corp. Our analysis"));
    }
}
