//! Dokumentformat för export, import och startdata

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::meta::Meta;
use super::record::{Collection, Entity, Record};
use super::{Rfi, Risk, Tagup, Task, TeamMember, TfrItem};
use crate::utils::error::{AppError, AppResult};

/// Hela lagringens innehåll. Saknade samlingar tolkas som tomma.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub tagups: Vec<Tagup>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub rfis: Vec<Rfi>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub tfr: Vec<TfrItem>,
}

/// Antal poster per samling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCounts {
    pub meta: usize,
    pub team_members: usize,
    pub tagups: usize,
    pub tasks: usize,
    pub rfis: usize,
    pub risks: usize,
    pub tfr: usize,
}

impl SnapshotCounts {
    pub fn get(&self, collection: Collection) -> usize {
        match collection {
            Collection::Meta => self.meta,
            Collection::TeamMembers => self.team_members,
            Collection::Tagups => self.tagups,
            Collection::Tasks => self.tasks,
            Collection::Rfis => self.rfis,
            Collection::Risks => self.risks,
            Collection::Tfr => self.tfr,
        }
    }

    pub fn total(&self) -> usize {
        Collection::all().iter().map(|c| self.get(*c)).sum()
    }
}

impl Snapshot {
    /// Tolka ett JSON-dokument. Fel ger `ImportParse`.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| AppError::import_parse(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            meta: usize::from(self.meta.is_some()),
            team_members: self.team_members.len(),
            tagups: self.tagups.len(),
            tasks: self.tasks.len(),
            rfis: self.rfis.len(),
            risks: self.risks.len(),
            tfr: self.tfr.len(),
        }
    }

    /// Sortera varje samling på nyckel, för stabil jämförelse och export
    pub fn sorted(mut self) -> Self {
        self.team_members.sort_by_key(|r| r.key());
        self.tagups.sort_by_key(|t| t.date);
        self.tasks.sort_by_key(|r| r.key());
        self.rfis.sort_by_key(|r| r.key());
        self.risks.sort_by_key(|r| r.key());
        self.tfr.sort_by_key(|r| r.key());
        self
    }

    /// Fullständig kontroll innan något i lagringen rörs
    pub fn validate(&self) -> AppResult<()> {
        if let Some(meta) = &self.meta {
            if meta.timezone.parse::<chrono_tz::Tz>().is_err() {
                return Err(AppError::import_parse(format!(
                    "meta: okänd tidszon '{}'",
                    meta.timezone
                )));
            }
        }

        for member in &self.team_members {
            if member.id.trim().is_empty() {
                return Err(AppError::import_parse("teamMembers: tomt id"));
            }
        }
        ensure_unique_keys(&self.team_members)?;
        ensure_unique_keys(&self.tagups)?;

        validate_entities(&self.tasks)?;
        validate_entities(&self.rfis)?;
        validate_entities(&self.risks)?;
        validate_entities(&self.tfr)?;

        Ok(())
    }
}

fn ensure_unique_keys<T: Record>(records: &[T]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        let key = record.key();
        if !seen.insert(key.clone()) {
            return Err(AppError::import_parse(format!(
                "{}: dubblett av nyckel '{}'",
                T::COLLECTION,
                key
            )));
        }
    }
    Ok(())
}

fn validate_entities<T: Entity>(records: &[T]) -> AppResult<()> {
    for record in records {
        if record.id().trim().is_empty() {
            return Err(AppError::import_parse(format!("{}: post utan id", T::COLLECTION)));
        }
        record.validate().map_err(|e| {
            AppError::import_parse(format!("{} '{}': {}", T::COLLECTION, record.id(), e))
        })?;
    }
    ensure_unique_keys(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_are_empty() {
        let snapshot = Snapshot::from_json(r#"{"tasks": []}"#).unwrap();
        assert!(snapshot.meta.is_none());
        assert!(snapshot.team_members.is_empty());
        assert_eq!(snapshot.counts().total(), 0);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_import_error() {
        assert!(matches!(
            Snapshot::from_json("{\"tasks\": [{\"id\": 1"),
            Err(AppError::ImportParse(_))
        ));
        assert!(matches!(
            Snapshot::from_json(r#"{"tasks": [{"id": "t1", "title": "x", "status": "Done-ish"}]}"#),
            Err(AppError::ImportParse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let json = r#"{"tasks": [
            {"id": "t1", "title": "A"},
            {"id": "t1", "title": "B"}
        ]}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(matches!(snapshot.validate(), Err(AppError::ImportParse(_))));
    }

    #[test]
    fn test_validate_rejects_invalid_entity() {
        let json = r#"{"tfr": [{"id": "f1", "site": "DAL", "progress": 140}]}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(matches!(snapshot.validate(), Err(AppError::ImportParse(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let json = r#"{"meta": {"lastStandupDate": "2024-01-09", "timezone": "Nowhere/Else", "activeMemberId": "weston"}}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(matches!(snapshot.validate(), Err(AppError::ImportParse(_))));
    }

    #[test]
    fn test_reads_legacy_field_names() {
        let json = r#"{
            "meta": {"lastTagUpISO": "2024-01-09", "tz": "America/Chicago", "activeMemberId": "weston", "seeded": true},
            "teamMembers": [{"id": "weston", "name": "Weston", "role": "Lead"}],
            "tagups": [{"dateISO": "2024-01-09", "yesterdayText": "a", "todayText": "b", "risksText": "c"}],
            "tasks": [{"id": "t1", "title": "Finalize drawing", "ownerId": "weston", "dueISO": "2024-01-10", "priority": "High", "status": "Not Started"}],
            "rfis": [],
            "risks": [],
            "tfr": []
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.counts().total(), 4);
        assert_eq!(snapshot.tasks[0].status, crate::models::TaskStatus::NotStarted);
    }
}
