use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};
use crate::time::{format_minutes, hours_to_minutes, parse_minutes, MAX_ESTIMATE_MINUTES};

/// Estimated effort in whole minutes. Stored and sent as a compact duration
/// string such as `"1h30m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Estimation(u32);

impl Estimation {
    pub const MAX_MINUTES: u32 = MAX_ESTIMATE_MINUTES;

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes > Self::MAX_MINUTES {
            return Err(BoardError::invalid_estimation(
                &minutes.to_string(),
                format!("exceeds the maximum of {}", format_minutes(Self::MAX_MINUTES)),
            ));
        }
        Ok(Self(minutes))
    }

    pub fn from_hours(hours: f64) -> Result<Self> {
        hours_to_minutes(hours)
            .map(Self)
            .map_err(|reason| BoardError::invalid_estimation(&hours.to_string(), reason))
    }

    pub fn parse(input: &str) -> Result<Self> {
        parse_minutes(input).map(Self)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Estimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minutes(self.0))
    }
}

impl FromStr for Estimation {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        Estimation::parse(s)
    }
}

impl TryFrom<String> for Estimation {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self> {
        Estimation::parse(&value)
    }
}

impl From<Estimation> for String {
    fn from(value: Estimation) -> Self {
        value.to_string()
    }
}

/// Estimation as sent by a caller: text (`"3h"`, `"2"`) or a JSON number of
/// hours. Resolved into an [`Estimation`] during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimationInput {
    Hours(f64),
    Text(String),
}

impl EstimationInput {
    pub fn resolve(&self) -> Result<Estimation> {
        match self {
            EstimationInput::Hours(hours) => Estimation::from_hours(*hours),
            EstimationInput::Text(text) => Estimation::parse(text),
        }
    }
}

impl From<&str> for EstimationInput {
    fn from(value: &str) -> Self {
        EstimationInput::Text(value.to_string())
    }
}

impl From<String> for EstimationInput {
    fn from(value: String) -> Self {
        EstimationInput::Text(value)
    }
}

impl From<f64> for EstimationInput {
    fn from(value: f64) -> Self {
        EstimationInput::Hours(value)
    }
}

impl From<Estimation> for EstimationInput {
    fn from(value: Estimation) -> Self {
        EstimationInput::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrips_through_parse() {
        for minutes in [0, 5, 60, 90, 600] {
            let est = Estimation::from_minutes(minutes).unwrap();
            assert_eq!(est.to_string().parse::<Estimation>().unwrap(), est);
        }
    }

    #[test]
    fn test_bounds() {
        assert!(Estimation::from_minutes(Estimation::MAX_MINUTES).is_ok());
        assert!(Estimation::from_minutes(Estimation::MAX_MINUTES + 1).is_err());
        assert!(Estimation::from_hours(-0.5).is_err());
        assert_eq!(Estimation::from_hours(3.0).unwrap().minutes(), 180);
    }

    #[test]
    fn test_serde_as_string() {
        let est = Estimation::parse("1h30m").unwrap();
        assert_eq!(serde_json::to_string(&est).unwrap(), "\"1h30m\"");
        let back: Estimation = serde_json::from_str("\"3h\"").unwrap();
        assert_eq!(back.minutes(), 180);
        assert!(serde_json::from_str::<Estimation>("\"later\"").is_err());
    }

    #[test]
    fn test_input_accepts_text_or_number() {
        let text: EstimationInput = serde_json::from_str("\"45m\"").unwrap();
        let number: EstimationInput = serde_json::from_str("2").unwrap();
        assert_eq!(text.resolve().unwrap().minutes(), 45);
        assert_eq!(number.resolve().unwrap().minutes(), 120);
        assert!(EstimationInput::from("someday").resolve().is_err());
        assert!(serde_json::from_str::<EstimationInput>("true").is_err());
    }
}
