use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Collection, Record};

/// Nyckel för singleton-posten i `meta`
pub const META_KEY: &str = "app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

/// Applikationsövergripande tillstånd (singleton)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(alias = "lastTagUpISO")]
    pub last_standup_date: NaiveDate,
    #[serde(alias = "tz")]
    pub timezone: String,
    pub active_member_id: String,
    #[serde(default)]
    pub theme: Theme,
}

impl Meta {
    pub fn new(last_standup_date: NaiveDate, timezone: impl Into<String>, active_member_id: impl Into<String>) -> Self {
        Self {
            last_standup_date,
            timezone: timezone.into(),
            active_member_id: active_member_id.into(),
            theme: Theme::default(),
        }
    }
}

impl Record for Meta {
    const COLLECTION: Collection = Collection::Meta;

    fn key(&self) -> String {
        META_KEY.to_string()
    }
}
