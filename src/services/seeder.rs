//! Startdata vid första körningen

use chrono::{NaiveDate, TimeDelta};
use rusqlite::Connection;

use crate::db::store::{get_in, put_in};
use crate::db::team_repo::first_member;
use crate::db::Database;
use crate::models::{
    Meta, Priority, Snapshot, SnapshotCounts, Tagup, TagupDraft, Task, TaskStatus, TeamMember,
    META_KEY,
};
use crate::utils::error::AppResult;

pub struct Seeder<'a> {
    db: &'a Database,
}

impl<'a> Seeder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Skriv inbyggd standarddata om meta saknas. Returnerar om något skrevs.
    pub fn ensure_seeded(&self) -> AppResult<bool> {
        let dates = self.db.dates();
        let today = dates.today_local();
        self.ensure_seeded_from(default_snapshot(today, dates.timezone_name()))
    }

    /// Skriv ett startdokument om meta saknas. Hela skrivningen sker i en
    /// transaktion och styrs enbart av om meta finns; dokumentet
    /// valideras först när det faktiskt ska skrivas.
    pub fn ensure_seeded_from(&self, snapshot: Snapshot) -> AppResult<bool> {
        let yesterday = self.db.dates().today_local() - TimeDelta::days(1);
        let timezone = self.db.dates().timezone_name();

        let counts = self.db.transaction(|tx| {
            let meta: Option<Meta> = get_in(tx, META_KEY)?;
            if meta.is_some() {
                return Ok(None);
            }
            snapshot.validate()?;
            let snapshot = complete_snapshot(snapshot.clone(), yesterday, timezone);
            write_snapshot_in(tx, &snapshot).map(Some)
        })?;

        match counts {
            Some(counts) => {
                tracing::info!(
                    "Startdata skriven: {} teammedlemmar, {} tag-ups, {} uppgifter",
                    counts.team_members,
                    counts.tagups,
                    counts.tasks
                );
                Ok(true)
            }
            None => {
                tracing::debug!("Meta finns redan, ingen startdata skrivs");
                Ok(false)
            }
        }
    }

    /// Se till att `activeMemberId` pekar på en befintlig medlem.
    /// Returnerar om något behövde lagas.
    pub fn repair_active_member(&self) -> AppResult<bool> {
        self.db.transaction(|tx| {
            let Some(meta) = get_in::<Meta>(tx, META_KEY)? else {
                return Ok(false);
            };
            let mut team: Vec<TeamMember> = crate::db::store::get_all_in(tx)?;
            if team.iter().any(|m| m.id == meta.active_member_id) {
                return Ok(false);
            }

            if team.is_empty() {
                tracing::warn!("Teamet är tomt, skriver standardteamet");
                team = TeamMember::default_team();
                for member in &team {
                    put_in(tx, member)?;
                }
            }

            let Some(first) = first_member(&team) else {
                return Ok(false);
            };
            tracing::warn!(
                "Aktiv medlem '{}' finns inte, byter till '{}'",
                meta.active_member_id,
                first
            );
            let first = first.to_string();
            crate::db::meta_repo::update_in(tx, |m| m.active_member_id = first)?;
            Ok(true)
        })
    }
}

/// Fyll i det som ett startdokument eller en import kan sakna: meta,
/// team och en giltig aktiv medlem.
pub(crate) fn complete_snapshot(
    mut snapshot: Snapshot,
    fallback_standup: NaiveDate,
    timezone: &str,
) -> Snapshot {
    if snapshot.team_members.is_empty() {
        snapshot.team_members = TeamMember::default_team();
    }

    let first = first_member(&snapshot.team_members)
        .unwrap_or_default()
        .to_string();

    let meta = snapshot
        .meta
        .get_or_insert_with(|| Meta::new(fallback_standup, timezone, first.clone()));
    if !snapshot.team_members.iter().any(|m| m.id == meta.active_member_id) {
        meta.active_member_id = first;
    }

    snapshot
}

/// Skriv alla samlingar i dokumentet via en pågående transaktion
pub(crate) fn write_snapshot_in(conn: &Connection, snapshot: &Snapshot) -> AppResult<SnapshotCounts> {
    if let Some(meta) = &snapshot.meta {
        put_in(conn, meta)?;
    }
    write_all(conn, &snapshot.team_members)?;
    write_all(conn, &snapshot.tagups)?;
    write_all(conn, &snapshot.tasks)?;
    write_all(conn, &snapshot.rfis)?;
    write_all(conn, &snapshot.risks)?;
    write_all(conn, &snapshot.tfr)?;
    Ok(snapshot.counts())
}

fn write_all<T: crate::models::Record>(conn: &Connection, records: &[T]) -> AppResult<()> {
    for record in records {
        put_in(conn, record)?;
    }
    Ok(())
}

/// Inbyggd standarddata relativt dagens datum
pub fn default_snapshot(today: NaiveDate, timezone: &str) -> Snapshot {
    let yesterday = today - TimeDelta::days(1);
    let days = |n: i64| Some(today + TimeDelta::days(n));

    let tasks = vec![
        default_task("task-seed-1", "Finalize drawing package", "weston", days(3), Priority::High, TaskStatus::InProgress),
        default_task("task-seed-2", "Walk site for as-built markups", "maria", days(1), Priority::Medium, TaskStatus::NotStarted),
        default_task("task-seed-3", "Submit RFI responses to GC", "weston", days(7), Priority::Medium, TaskStatus::NotStarted),
        default_task("task-seed-4", "Update document register", "dev", days(2), Priority::Low, TaskStatus::InProgress),
        default_task("task-seed-5", "Confirm crane schedule", "maria", days(-1), Priority::High, TaskStatus::Blocked),
    ];

    Snapshot {
        meta: Some(Meta::new(yesterday, timezone, "weston")),
        team_members: TeamMember::default_team(),
        tagups: vec![Tagup::new(
            yesterday,
            TagupDraft {
                yesterday_text: "Set up the PLM dashboard".into(),
                today_text: "Review open tasks with the team".into(),
                risks_text: "None".into(),
            },
        )],
        tasks,
        ..Default::default()
    }
}

fn default_task(
    id: &str,
    title: &str,
    owner_id: &str,
    due_date: Option<NaiveDate>,
    priority: Priority,
    status: TaskStatus,
) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        owner_id: owner_id.into(),
        due_date,
        priority,
        status,
        completed_date: None,
    }
}
