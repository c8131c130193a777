use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{optional_date, Collection, Entity, Record};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RfiStatus {
    #[default]
    Open,
    Pending,
    Resolved,
    Closed,
}

impl RfiStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Pending => "Pending",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::Pending)
    }
}

impl fmt::Display for RfiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Request for information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfi {
    pub id: String,
    #[serde(default)]
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub status: RfiStatus,
    #[serde(default, alias = "openedISO", with = "optional_date")]
    pub opened_date: Option<NaiveDate>,
    #[serde(default, alias = "dueISO", with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct RfiDraft {
    /// Tomt = nästa lediga RFI-nummer
    pub number: String,
    pub title: String,
    pub site: String,
    pub building: String,
    pub owner_id: String,
    pub status: RfiStatus,
    pub opened_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: String,
}

impl Rfi {
    /// Numerisk del av "RFI-012"
    fn sequence(&self) -> Option<u32> {
        self.number
            .rsplit(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|digits| digits.parse().ok())
    }
}

impl Record for Rfi {
    const COLLECTION: Collection = Collection::Rfis;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Rfi {
    type Draft = RfiDraft;

    const ID_PREFIX: &'static str = "rfi";
    const NUMBERED: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: RfiDraft) -> Self {
        Self {
            id,
            number: draft.number.trim().to_string(),
            title: draft.title.trim().to_string(),
            site: draft.site.trim().to_string(),
            building: draft.building.trim().to_string(),
            owner_id: draft.owner_id,
            status: draft.status,
            opened_date: draft.opened_date,
            due_date: draft.due_date,
            notes: draft.notes.trim().to_string(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("RFI måste ha en titel"));
        }
        if let (Some(opened), Some(due)) = (self.opened_date, self.due_date) {
            if due < opened {
                return Err(AppError::validation("Förfallodatum kan inte vara före öppningsdatum"));
            }
        }
        Ok(())
    }

    fn on_create(&mut self, today: NaiveDate) {
        if self.opened_date.is_none() {
            self.opened_date = Some(today);
        }
    }

    fn on_update(&mut self, previous: &Self, _today: NaiveDate) -> AppResult<()> {
        if self.number.is_empty() {
            self.number = previous.number.clone();
        }
        if self.opened_date.is_none() {
            self.opened_date = previous.opened_date;
        }
        Ok(())
    }

    fn assign_number(&mut self, existing: &[Self]) {
        if !self.number.is_empty() {
            return;
        }
        let next = existing.iter().filter_map(Rfi::sequence).max().unwrap_or(0) + 1;
        self.number = format!("RFI-{:03}", next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfi(number: &str) -> Rfi {
        Rfi::from_draft(
            format!("rfi-{}", number),
            RfiDraft {
                number: number.into(),
                title: "Door hardware".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_assign_number() {
        let existing = vec![rfi("RFI-001"), rfi("RFI-007"), rfi("custom")];
        let mut new = rfi("");
        new.assign_number(&existing);
        assert_eq!(new.number, "RFI-008");

        let mut first = rfi("");
        first.assign_number(&[]);
        assert_eq!(first.number, "RFI-001");

        let mut manual = rfi("RFI-100");
        manual.assign_number(&existing);
        assert_eq!(manual.number, "RFI-100");
    }

    #[test]
    fn test_validate_dates() {
        let mut r = rfi("RFI-001");
        r.opened_date = NaiveDate::from_ymd_opt(2024, 1, 10);
        r.due_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_status_is_open() {
        assert!(RfiStatus::Pending.is_open());
        assert!(!RfiStatus::Resolved.is_open());
    }
}
