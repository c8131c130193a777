use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{Collection, Record};

/// Daglig tag-up, nyckel = kalenderdatum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tagup {
    #[serde(alias = "dateISO")]
    pub date: NaiveDate,
    #[serde(default)]
    pub yesterday_text: String,
    #[serde(default)]
    pub today_text: String,
    #[serde(default, alias = "blockers")]
    pub risks_text: String,
    /// Skapad automatiskt vid dagsskifte, aldrig redigerad
    #[serde(default)]
    pub auto_rolled: bool,
}

/// Formulärfälten för en tag-up
#[derive(Debug, Clone, Default)]
pub struct TagupDraft {
    pub yesterday_text: String,
    pub today_text: String,
    pub risks_text: String,
}

impl Tagup {
    pub fn new(date: NaiveDate, draft: TagupDraft) -> Self {
        Self {
            date,
            yesterday_text: draft.yesterday_text.trim().to_string(),
            today_text: draft.today_text.trim().to_string(),
            risks_text: draft.risks_text.trim().to_string(),
            auto_rolled: false,
        }
    }

    /// Platshållare för en dag som passerade utan tag-up
    pub fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            yesterday_text: String::new(),
            today_text: String::new(),
            risks_text: String::new(),
            auto_rolled: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.yesterday_text.is_empty() && self.today_text.is_empty() && self.risks_text.is_empty()
    }

    /// Texten som kopieras till urklipp
    pub fn clipboard_text(&self) -> String {
        format!(
            "Yesterday: {}\nToday: {}\nRisks: {}",
            self.yesterday_text, self.today_text, self.risks_text
        )
    }
}

impl Record for Tagup {
    const COLLECTION: Collection = Collection::Tagups;

    fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
    }

    #[test]
    fn test_new_trims_text() {
        let tagup = Tagup::new(
            day(),
            TagupDraft {
                yesterday_text: "  Reviewed drawings ".into(),
                today_text: "Site walk\n".into(),
                risks_text: String::new(),
            },
        );
        assert_eq!(tagup.yesterday_text, "Reviewed drawings");
        assert_eq!(tagup.today_text, "Site walk");
        assert_eq!(tagup.key(), "2024-01-09");
        assert!(!tagup.auto_rolled);
    }

    #[test]
    fn test_clipboard_text() {
        let tagup = Tagup::new(
            day(),
            TagupDraft {
                yesterday_text: "A".into(),
                today_text: "B".into(),
                risks_text: "C".into(),
            },
        );
        assert_eq!(tagup.clipboard_text(), "Yesterday: A\nToday: B\nRisks: C");
    }

    #[test]
    fn test_reads_legacy_shape() {
        let json = r#"{"dateISO": "2024-01-09", "yesterdayText": "x", "todayText": "y", "blockers": "z"}"#;
        let tagup: Tagup = serde_json::from_str(json).unwrap();
        assert_eq!(tagup.date, day());
        assert_eq!(tagup.risks_text, "z");
        assert!(!tagup.auto_rolled);
    }

    #[test]
    fn test_placeholder() {
        let p = Tagup::placeholder(day());
        assert!(p.auto_rolled);
        assert!(p.is_empty());
    }
}
