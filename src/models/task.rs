use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{optional_date, Collection, Entity, Record};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.display_name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Uppgiftsstatus med en fast övergångsgraf:
/// NotStarted -> {InProgress, Completed}, InProgress -> {Completed, Blocked},
/// Blocked -> InProgress. Completed är slutläge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(alias = "Complete")]
    Completed,
    Blocked,
}

impl TaskStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("complete") {
            return Some(Self::Completed);
        }
        Self::all()
            .iter()
            .copied()
            .find(|status| status.display_name().eq_ignore_ascii_case(s))
    }

    pub fn all() -> &'static [Self] {
        &[Self::NotStarted, Self::InProgress, Self::Completed, Self::Blocked]
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::NotStarted, Self::InProgress)
                | (Self::NotStarted, Self::Completed)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Blocked)
                | (Self::Blocked, Self::InProgress)
        )
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default, alias = "dueISO", with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, with = "optional_date")]
    pub completed_date: Option<NaiveDate>,
}

/// Formulärfälten för en uppgift
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub owner_id: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }
}

impl From<Task> for TaskDraft {
    fn from(task: Task) -> Self {
        Self {
            title: task.title,
            owner_id: task.owner_id,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
        }
    }
}

impl Task {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_completed() && self.due_date.map(|d| d < today).unwrap_or(false)
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Task {
    type Draft = TaskDraft;

    const ID_PREFIX: &'static str = "task";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            owner_id: draft.owner_id,
            due_date: draft.due_date,
            priority: draft.priority,
            status: draft.status,
            completed_date: None,
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("Uppgiften måste ha en titel"));
        }
        Ok(())
    }

    fn on_create(&mut self, today: NaiveDate) {
        if self.status.is_completed() && self.completed_date.is_none() {
            self.completed_date = Some(today);
        }
    }

    fn on_update(&mut self, previous: &Self, today: NaiveDate) -> AppResult<()> {
        if !previous.status.can_transition_to(self.status) {
            return Err(AppError::invalid_transition(previous.status, self.status));
        }

        self.completed_date = if self.status.is_completed() {
            previous.completed_date.or(Some(today))
        } else {
            None
        };

        Ok(())
    }
}

/// Filter för uppgiftslistan
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    /// Fritextsökning i titeln
    pub query: String,
    pub owner_id: Option<String>,
    pub status: Option<TaskStatus>,
    /// Dölj avslutade uppgifter
    pub exclude_completed: bool,
    /// Förfaller inom så många dagar (försenade inräknade)
    pub due_within_days: Option<i64>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }

    pub fn open_only(mut self) -> Self {
        self.exclude_completed = true;
        self
    }

    pub fn due_within(mut self, days: i64) -> Self {
        self.due_within_days = Some(days);
        self
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.query.is_empty() && !task.title.to_lowercase().contains(&self.query.to_lowercase()) {
            return false;
        }
        if let Some(owner) = &self.owner_id {
            if &task.owner_id != owner {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if self.exclude_completed && task.status.is_completed() {
            return false;
        }
        if let Some(days) = self.due_within_days {
            let horizon = today + TimeDelta::days(days);
            match task.due_date {
                Some(due) if due <= horizon => {}
                _ => return false,
            }
        }
        true
    }
}

/// Sortera på förfallodatum, uppgifter utan datum sist
pub fn sort_by_due(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| b.priority.cmp(&a.priority)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
}
