use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{optional_date, Collection, Entity, Record};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TfrPhase {
    #[default]
    Survey,
    Install,
    AsBuilt,
    Complete,
}

impl TfrPhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Survey => "Survey",
            Self::Install => "Install",
            Self::AsBuilt => "As-Built",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for TfrPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Spårad leverans i fält (technical field report)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TfrItem {
    pub id: String,
    pub site: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub phase: TfrPhase,
    /// Procent, 0–100
    #[serde(default)]
    pub progress: u8,
    #[serde(default, alias = "updatedISO", with = "optional_date")]
    pub updated_date: Option<NaiveDate>,
    #[serde(default)]
    pub rooms: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct TfrDraft {
    pub site: String,
    pub building: String,
    pub phase: TfrPhase,
    pub progress: u8,
    pub updated_date: Option<NaiveDate>,
    pub rooms: String,
    pub notes: String,
}

impl Record for TfrItem {
    const COLLECTION: Collection = Collection::Tfr;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Entity for TfrItem {
    type Draft = TfrDraft;

    const ID_PREFIX: &'static str = "tfr";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: TfrDraft) -> Self {
        Self {
            id,
            site: draft.site.trim().to_string(),
            building: draft.building.trim().to_string(),
            phase: draft.phase,
            progress: draft.progress,
            updated_date: draft.updated_date,
            rooms: draft.rooms.trim().to_string(),
            notes: draft.notes.trim().to_string(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.site.trim().is_empty() {
            return Err(AppError::validation("TFR-post måste ha en site"));
        }
        if self.progress > 100 {
            return Err(AppError::validation(format!(
                "Progress måste vara 0–100, fick {}",
                self.progress
            )));
        }
        Ok(())
    }

    fn on_create(&mut self, today: NaiveDate) {
        self.updated_date.get_or_insert(today);
    }

    fn on_update(&mut self, _previous: &Self, today: NaiveDate) -> AppResult<()> {
        self.updated_date.get_or_insert(today);
        Ok(())
    }
}

/// Genomsnittlig progress, avrundad till heltal
pub fn average_progress(items: &[TfrItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let sum: u32 = items.iter().map(|i| u32::from(i.progress)).sum();
    let avg = (f64::from(sum) / items.len() as f64).round();
    avg.clamp(0.0, 100.0) as u8
}
