use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lesson length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "DurationRepr")]
pub enum Duration {
    Short,
    #[default]
    Medium,
    Long,
}

impl Duration {
    pub fn minutes(self) -> u32 {
        match self {
            Duration::Short => 30,
            Duration::Medium => 45,
            Duration::Long => 60,
        }
    }

    /// Roughly one slide per six minutes of teaching.
    pub fn target_slides(self) -> u32 {
        self.minutes() / 6
    }

    /// Nearest bucket for a minute count.
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=37 => Duration::Short,
            38..=52 => Duration::Medium,
            _ => Duration::Long,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Duration::Short => "short",
            Duration::Medium => "medium",
            Duration::Long => "long",
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Duration {
    type Err = String;

    /// Accepts `short`/`medium`/`long` or a minute count such as `45` or
    /// `"45 minutes"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "short" => return Ok(Duration::Short),
            "medium" => return Ok(Duration::Medium),
            "long" => return Ok(Duration::Long),
            _ => {}
        }
        let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse::<u32>()
            .map(Duration::from_minutes)
            .map_err(|_| format!("unrecognised duration '{s}'"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Minutes(u32),
    Text(String),
}

impl TryFrom<DurationRepr> for Duration {
    type Error = String;

    fn try_from(value: DurationRepr) -> Result<Self, Self::Error> {
        match value {
            DurationRepr::Minutes(m) => Ok(Duration::from_minutes(m)),
            DurationRepr::Text(s) => s.parse(),
        }
    }
}

/// One entry of a lesson outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePlan {
    pub slide_number: u32,
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    pub layout_id: usize,
    #[serde(default)]
    pub content_plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_targets_per_bucket() {
        assert_eq!(Duration::Short.target_slides(), 5);
        assert_eq!(Duration::Medium.target_slides(), 7);
        assert_eq!(Duration::Long.target_slides(), 10);
    }

    #[test]
    fn parses_words_and_minutes() {
        assert_eq!("Short".parse::<Duration>(), Ok(Duration::Short));
        assert_eq!("45 minutes".parse::<Duration>(), Ok(Duration::Medium));
        assert_eq!("90".parse::<Duration>(), Ok(Duration::Long));
        assert!("a while".parse::<Duration>().is_err());
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let d: Duration = serde_json::from_str("30").unwrap();
        assert_eq!(d, Duration::Short);
        let d: Duration = serde_json::from_str(r#""long""#).unwrap();
        assert_eq!(d, Duration::Long);
        assert_eq!(serde_json::to_string(&Duration::Medium).unwrap(), r#""medium""#);
    }
}
