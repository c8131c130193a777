use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{optional_date, Collection, Entity, Record};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RiskStatus {
    #[default]
    Open,
    Mitigating,
    Watching,
    Closed,
}

impl RiskStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Mitigating => "Mitigating",
            Self::Watching => "Watching",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub status: RiskStatus,
    #[serde(default, alias = "openedISO", with = "optional_date")]
    pub opened_date: Option<NaiveDate>,
    #[serde(default, alias = "dueISO", with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct RiskDraft {
    pub title: String,
    pub severity: Severity,
    pub owner_id: String,
    pub status: RiskStatus,
    pub opened_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: String,
}

impl Risk {
    /// Kritiska eller höga risker som inte är stängda
    pub fn needs_attention(&self) -> bool {
        self.status != RiskStatus::Closed && self.severity >= Severity::High
    }
}

impl Record for Risk {
    const COLLECTION: Collection = Collection::Risks;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Risk {
    type Draft = RiskDraft;

    const ID_PREFIX: &'static str = "risk";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: RiskDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            severity: draft.severity,
            owner_id: draft.owner_id,
            status: draft.status,
            opened_date: draft.opened_date,
            due_date: draft.due_date,
            notes: draft.notes.trim().to_string(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("Risken måste ha en titel"));
        }
        Ok(())
    }

    fn on_create(&mut self, today: NaiveDate) {
        if self.opened_date.is_none() {
            self.opened_date = Some(today);
        }
    }

    fn on_update(&mut self, previous: &Self, _today: NaiveDate) -> AppResult<()> {
        if self.opened_date.is_none() {
            self.opened_date = previous.opened_date;
        }
        Ok(())
    }
}
