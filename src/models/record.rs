//! Gemensamma egenskaper för allt som lagras i en samling

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::utils::error::AppResult;

/// Namngiven samling i lagringen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Meta,
    TeamMembers,
    Tagups,
    Tasks,
    Rfis,
    Risks,
    Tfr,
}

impl Collection {
    /// Tabellnamn i SQLite
    pub fn table(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::TeamMembers => "team_members",
            Self::Tagups => "tagups",
            Self::Tasks => "tasks",
            Self::Rfis => "rfis",
            Self::Risks => "risks",
            Self::Tfr => "tfr",
        }
    }

    /// Fältnamn i export-/importdokumentet
    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::TeamMembers => "teamMembers",
            Self::Tagups => "tagups",
            Self::Tasks => "tasks",
            Self::Rfis => "rfis",
            Self::Risks => "risks",
            Self::Tfr => "tfr",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Meta,
            Self::TeamMembers,
            Self::Tagups,
            Self::Tasks,
            Self::Rfis,
            Self::Risks,
            Self::Tfr,
        ]
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_name())
    }
}

/// En post med en nyckel i en bestämd samling
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn key(&self) -> String;
}

/// Post med genererat ID och CRUD-tjänst
pub trait Entity: Record {
    /// Alla fält utom ID, som formulären skickar in
    type Draft: Clone;

    const ID_PREFIX: &'static str;

    /// Sätt till true om posten behöver ett löpnummer vid skapande
    const NUMBERED: bool = false;

    fn id(&self) -> &str;

    fn from_draft(id: String, draft: Self::Draft) -> Self;

    fn validate(&self) -> AppResult<()> {
        Ok(())
    }

    /// Standardvärden vid skapande
    fn on_create(&mut self, _today: NaiveDate) {}

    /// Tilldela löpnummer utifrån befintliga poster (endast om `NUMBERED`)
    fn assign_number(&mut self, _existing: &[Self]) {}

    /// Kontroll av övergången från tidigare version vid uppdatering
    fn on_update(&mut self, _previous: &Self, _today: NaiveDate) -> AppResult<()> {
        Ok(())
    }
}

/// Serde-hjälp för valfria datum där tom sträng betyder "saknas"
pub(crate) mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
