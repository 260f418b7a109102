//! Rendering of a [`FleetReport`](crate::models::FleetReport) for humans.
//!
//! - `console` : plain-text report printed at the end of a run
//! - `card`    : MessageCard payload posted to the webhook
//!
//! Both renderers only borrow the report and produce the same output for the same input.

pub mod card;
pub mod console;

pub use card::{render_card, CardFact, CardSection, MessageCard};
pub use console::render_console;

pub const SUCCESS_GLYPH: &str = "✅";
pub const FAILURE_GLYPH: &str = "❌";

pub fn status_glyph(ok: bool) -> &'static str {
    if ok {
        SUCCESS_GLYPH
    } else {
        FAILURE_GLYPH
    }
}

/// Format an integer with `,` thousands separators (`1234567` -> `1,234,567`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(100000), "100,000");
    }

    #[test]
    fn test_status_glyph() {
        assert_eq!(status_glyph(true), "✅");
        assert_eq!(status_glyph(false), "❌");
    }
}
