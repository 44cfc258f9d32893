//! Weekday vocabulary for the special-items promotion schedule.
//!
//! The backend stores promotion days as lowercase three-letter codes
//! (`mon`..`sun`). Parsing also accepts full day names and ignores case
//! and surrounding whitespace; anything else is outside the vocabulary.

use serde::{Deserialize, Serialize};

use crate::engine::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All days in calendar order, for rendering the toggle row.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token for Weekday {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(Weekday::Mon),
            "tue" | "tuesday" => Some(Weekday::Tue),
            "wed" | "wednesday" => Some(Weekday::Wed),
            "thu" | "thursday" => Some(Weekday::Thu),
            "fri" | "friday" => Some(Weekday::Fri),
            "sat" | "saturday" => Some(Weekday::Sat),
            "sun" | "sunday" => Some(Weekday::Sun),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        Weekday::as_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_full_names() {
        assert_eq!(<Weekday as Token>::parse("mon"), Some(Weekday::Mon));
        assert_eq!(<Weekday as Token>::parse(" Friday "), Some(Weekday::Fri));
        assert_eq!(<Weekday as Token>::parse("SUN"), Some(Weekday::Sun));
        assert_eq!(<Weekday as Token>::parse("someday"), None);
        assert_eq!(<Weekday as Token>::parse(""), None);
    }

    #[test]
    fn serde_round_trips_as_lowercase_code() {
        let json = serde_json::to_string(&Weekday::Wed).unwrap();
        assert_eq!(json, "\"wed\"");
        let back: Weekday = serde_json::from_str("\"sat\"").unwrap();
        assert_eq!(back, Weekday::Sat);
    }
}
