//! Textvyer för terminalen, en per route

use chrono::{DateTime, Utc};

use super::route::Route;
use crate::db::Database;
use crate::models::{TaskFilter, TeamMember, UNASSIGNED};
use crate::services::dashboard::{DashboardService, DUE_SOON_DAYS};
use crate::utils::date::format_date;
use crate::utils::error::AppResult;
use crate::utils::path::display_path;

pub struct TextRenderer<'a> {
    db: &'a Database,
    team: Vec<TeamMember>,
}

impl<'a> TextRenderer<'a> {
    pub fn new(db: &'a Database) -> AppResult<Self> {
        Ok(Self {
            db,
            team: db.team().list()?,
        })
    }

    /// Rubrik, statusrad och vyn för `route`
    pub fn render(&self, route: Route, now: DateTime<Utc>) -> AppResult<String> {
        let mut out = String::new();
        out.push_str(&format!("== {} ==\n", route.title()));
        out.push_str(&self.db.dates().status_line(now));
        out.push_str("\n\n");

        match route {
            Route::Dashboard => self.dashboard(&mut out)?,
            Route::Tagup => self.tagup(&mut out, now)?,
            Route::Tasks => self.tasks(&mut out)?,
            Route::Rfis => self.rfis(&mut out)?,
            Route::Risks => self.risks(&mut out)?,
            Route::Tfr => self.tfr(&mut out)?,
            Route::Settings => self.settings(&mut out)?,
        }

        Ok(out)
    }

    fn owner(&self, owner_id: &str) -> &str {
        self.team
            .iter()
            .find(|m| m.id == owner_id)
            .map(|m| m.name.as_str())
            .unwrap_or(UNASSIGNED)
    }

    fn dashboard(&self, out: &mut String) -> AppResult<()> {
        let s = DashboardService::new(self.db).summary()?;

        out.push_str(&format!("Active member:   {}\n", s.active_member));
        out.push_str(&format!(
            "My tasks:        {} open / {} total ({}% complete)\n",
            s.my_open_tasks,
            s.my_tasks,
            s.my_progress_percent()
        ));
        out.push_str(&format!("Due in {} days:   {}\n", DUE_SOON_DAYS, s.my_due_soon));
        out.push_str(&format!("All tasks:       {}\n", s.total_tasks));
        out.push_str(&format!("RFIs:            {} open / {}\n", s.open_rfis, s.total_rfis));
        out.push_str(&format!(
            "Risks:           {} need attention / {}\n",
            s.risks_needing_attention, s.total_risks
        ));
        out.push_str(&format!("TFR progress:    {}% over {} items\n", s.tfr_progress, s.tfr_items));
        out.push_str(&format!(
            "Last tag-up:     {}\n",
            s.last_tagup.map(format_date).unwrap_or_else(|| "-".into())
        ));
        Ok(())
    }

    fn tagup(&self, out: &mut String, now: DateTime<Utc>) -> AppResult<()> {
        let today = self.db.dates().local_date(now);
        match self.db.tagups().get(today)? {
            Some(tagup) => {
                out.push_str(&format!("Today ({})\n", self.db.dates().format_display(now)));
                out.push_str(&tagup.clipboard_text());
                out.push('\n');
            }
            None => out.push_str("No tag-up written today.\n"),
        }

        out.push_str("\nHistory\n");
        for tagup in self.db.tagups().list()?.iter().filter(|t| t.date < today).take(5) {
            let marker = if tagup.auto_rolled { " (auto)" } else { "" };
            out.push_str(&format!(
                "  {}{}: {}\n",
                format_date(tagup.date),
                marker,
                if tagup.today_text.is_empty() { "-" } else { tagup.today_text.as_str() }
            ));
        }
        Ok(())
    }

    fn tasks(&self, out: &mut String) -> AppResult<()> {
        let tasks = self.db.tasks().find(&TaskFilter::new())?;
        if tasks.is_empty() {
            out.push_str("No tasks.\n");
            return Ok(());
        }

        let today = self.db.dates().today_local();
        for task in &tasks {
            out.push_str(&format!(
                "{:<10} {:<12} {:<7} {:<12} {:<10} {}{}\n",
                task.due_date.map(format_date).unwrap_or_default(),
                task.status.display_name(),
                task.priority.display_name(),
                self.owner(&task.owner_id),
                truncate_id(&task.id),
                task.title,
                if task.is_overdue(today) { "  [overdue]" } else { "" }
            ));
        }
        Ok(())
    }

    fn rfis(&self, out: &mut String) -> AppResult<()> {
        let mut rfis = self.db.rfis().list()?;
        if rfis.is_empty() {
            out.push_str("No RFIs.\n");
            return Ok(());
        }
        rfis.sort_by(|a, b| a.number.cmp(&b.number));

        for rfi in &rfis {
            out.push_str(&format!(
                "{:<8} {:<9} {:<12} {} ({} {})\n",
                rfi.number,
                rfi.status.display_name(),
                self.owner(&rfi.owner_id),
                rfi.title,
                rfi.site,
                rfi.building
            ));
        }
        Ok(())
    }

    fn risks(&self, out: &mut String) -> AppResult<()> {
        let mut risks = self.db.risks().list()?;
        if risks.is_empty() {
            out.push_str("No risks.\n");
            return Ok(());
        }
        risks.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.title.cmp(&b.title)));

        for risk in &risks {
            out.push_str(&format!(
                "{:<9} {:<11} {:<12} {}\n",
                risk.severity.display_name(),
                risk.status.display_name(),
                self.owner(&risk.owner_id),
                risk.title
            ));
        }
        Ok(())
    }

    fn tfr(&self, out: &mut String) -> AppResult<()> {
        let mut items = self.db.tfr().list()?;
        if items.is_empty() {
            out.push_str("No TFR items.\n");
            return Ok(());
        }
        items.sort_by(|a, b| a.site.cmp(&b.site).then_with(|| a.building.cmp(&b.building)));

        for item in &items {
            out.push_str(&format!(
                "{:<12} {:<10} {:<9} {:>3}%  {}\n",
                item.site,
                item.building,
                item.phase.display_name(),
                item.progress,
                item.updated_date.map(format_date).unwrap_or_default()
            ));
        }
        out.push_str(&format!("\nAverage: {}%\n", self.db.tfr().average_progress()?));
        Ok(())
    }

    fn settings(&self, out: &mut String) -> AppResult<()> {
        let meta = self.db.meta().load()?;
        out.push_str(&format!("Timezone:       {}\n", meta.timezone));
        out.push_str(&format!("Theme:          {}\n", meta.theme));
        out.push_str(&format!("Active member:  {}\n", self.owner(&meta.active_member_id)));
        out.push_str(&format!("Last tag-up:    {}\n", format_date(meta.last_standup_date)));
        if let Some(path) = self.db.path() {
            out.push_str(&format!("Database:       {}\n", display_path(path)));
        }

        out.push_str("\nTeam\n");
        for member in &self.team {
            let marker = if member.id == meta.active_member_id { "*" } else { " " };
            out.push_str(&format!(" {} {:<10} {:<12} {}\n", marker, member.id, member.name, member.role));
        }
        Ok(())
    }
}

/// Korta UUID-baserade ID:n för tabellvisning
fn truncate_id(id: &str) -> &str {
    match id.char_indices().nth(13) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
