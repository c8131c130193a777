//! Nyckeltal för startsidan

use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{average_progress, TaskFilter};
use crate::utils::error::AppResult;

/// Förfallohorisont för "snart" på startsidan
pub const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub active_member: String,
    pub total_tasks: usize,
    pub total_rfis: usize,
    pub open_rfis: usize,
    pub total_risks: usize,
    pub risks_needing_attention: usize,
    pub tfr_items: usize,
    /// Genomsnittlig TFR-progress i procent
    pub tfr_progress: u8,
    pub my_tasks: usize,
    pub my_open_tasks: usize,
    pub my_completed_tasks: usize,
    pub my_due_soon: usize,
    pub last_tagup: Option<NaiveDate>,
}

impl DashboardSummary {
    /// Andel avslutade av den aktiva medlemmens uppgifter, avrundat
    pub fn my_progress_percent(&self) -> u8 {
        if self.my_tasks == 0 {
            return 0;
        }
        ((self.my_completed_tasks as f64 / self.my_tasks as f64) * 100.0).round() as u8
    }
}

pub struct DashboardService<'a> {
    db: &'a Database,
}

impl<'a> DashboardService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn summary(&self) -> AppResult<DashboardSummary> {
        let meta = self.db.meta().load()?;
        let today = self.db.dates().today_local();
        let member = meta.active_member_id;

        let tasks = self.db.tasks().list()?;
        let rfis = self.db.rfis().list()?;
        let risks = self.db.risks().list()?;
        let tfr = self.db.tfr().list()?;

        let mine = TaskFilter::owned_by(member.clone());
        let due_soon = TaskFilter::owned_by(member.clone())
            .open_only()
            .due_within(DUE_SOON_DAYS);

        let my_tasks: Vec<_> = tasks.iter().filter(|t| mine.matches(t, today)).collect();
        let my_completed_tasks = my_tasks.iter().filter(|t| t.status.is_completed()).count();

        Ok(DashboardSummary {
            active_member: self.db.team().display_name(&member)?,
            total_tasks: tasks.len(),
            total_rfis: rfis.len(),
            open_rfis: rfis.iter().filter(|r| r.status.is_open()).count(),
            total_risks: risks.len(),
            risks_needing_attention: risks.iter().filter(|r| r.needs_attention()).count(),
            tfr_items: tfr.len(),
            tfr_progress: average_progress(&tfr),
            my_tasks: my_tasks.len(),
            my_open_tasks: my_tasks.len() - my_completed_tasks,
            my_completed_tasks,
            my_due_soon: tasks.iter().filter(|t| due_soon.matches(t, today)).count(),
            last_tagup: self.db.tagups().latest()?.map(|t| t.date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskDraft, TaskStatus, TfrDraft};
    use crate::services::Seeder;
    use chrono::TimeDelta;

    #[test]
    fn test_summary_for_seeded_store() {
        let db = Database::open_in_memory().unwrap();
        Seeder::new(&db).ensure_seeded().unwrap();

        let summary = DashboardService::new(&db).summary().unwrap();
        assert_eq!(summary.active_member, "Weston");
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(summary.my_tasks, 2);
        assert_eq!(summary.my_open_tasks, 2);
        assert_eq!(summary.my_due_soon, 2);
        assert_eq!(summary.tfr_progress, 0);
        assert_eq!(summary.last_tagup, Some(db.dates().today_local() - TimeDelta::days(1)));
    }

    #[test]
    fn test_progress_counts_completed_tasks() {
        let db = Database::open_in_memory().unwrap();
        Seeder::new(&db).ensure_seeded().unwrap();

        let mut draft = TaskDraft::new("Closeout", "weston");
        draft.status = TaskStatus::Completed;
        db.tasks().create(draft).unwrap();
        db.tfr()
            .create(TfrDraft {
                site: "DAL".into(),
                progress: 40,
                ..Default::default()
            })
            .unwrap();

        let summary = DashboardService::new(&db).summary().unwrap();
        assert_eq!(summary.my_tasks, 3);
        assert_eq!(summary.my_completed_tasks, 1);
        assert_eq!(summary.my_progress_percent(), 33);
        assert_eq!(summary.tfr_progress, 40);
    }
}
