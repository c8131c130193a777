//! Export, import och återställning av all data som JSON

use std::path::Path;

use rusqlite::Connection;

use super::seeder::{complete_snapshot, write_snapshot_in, Seeder};
use crate::db::store::{clear_in, get_all_in, get_in};
use crate::db::Database;
use crate::models::{Collection, Snapshot, SnapshotCounts, META_KEY};
use crate::utils::error::AppResult;

pub struct TransferService<'a> {
    db: &'a Database,
}

impl<'a> TransferService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Läs alla samlingar under ett och samma lås
    pub fn export(&self) -> AppResult<Snapshot> {
        let snapshot = self.db.with_connection(read_snapshot_in)?;
        Ok(snapshot.sorted())
    }

    pub fn export_json(&self) -> AppResult<String> {
        self.export()?.to_json_pretty()
    }

    pub fn export_to_file(&self, path: &Path) -> AppResult<SnapshotCounts> {
        let snapshot = self.export()?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(path, snapshot.to_json_pretty()?)?;

        let counts = snapshot.counts();
        tracing::info!("Exporterade {} poster till {:?}", counts.total(), path);
        Ok(counts)
    }

    /// Tolka och kontrollera ett dokument utan att röra lagringen
    pub fn parse(&self, json: &str) -> AppResult<Snapshot> {
        let snapshot = Snapshot::from_json(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Ersätt allt innehåll med dokumentets. Samlingar som saknas i
    /// dokumentet blir tomma. Allt sker i en transaktion.
    pub fn import(&self, snapshot: Snapshot) -> AppResult<SnapshotCounts> {
        snapshot.validate()?;

        let dates = self.db.dates();
        let snapshot = complete_snapshot(snapshot, dates.today_local(), dates.timezone_name());

        let counts = self.db.transaction(|tx| {
            clear_all_in(tx)?;
            write_snapshot_in(tx, &snapshot)
        })?;

        tracing::info!(
            "Importerade {} poster ({} uppgifter, {} RFI:er, {} risker, {} TFR)",
            counts.total(),
            counts.tasks,
            counts.rfis,
            counts.risks,
            counts.tfr
        );
        Ok(counts)
    }

    pub fn import_json(&self, json: &str) -> AppResult<SnapshotCounts> {
        let snapshot = self.parse(json)?;
        self.import(snapshot)
    }

    pub fn import_from_file(&self, path: &Path) -> AppResult<SnapshotCounts> {
        let json = std::fs::read_to_string(path)?;
        self.import_json(&json)
    }

    /// Töm allt och skriv standarddata på nytt
    pub fn reset(&self) -> AppResult<()> {
        let removed = self.db.transaction(|tx| clear_all_in(tx))?;
        tracing::info!("Återställning: tog bort {} poster", removed);

        Seeder::new(self.db).ensure_seeded()?;
        Ok(())
    }
}

fn read_snapshot_in(conn: &Connection) -> AppResult<Snapshot> {
    Ok(Snapshot {
        meta: get_in(conn, META_KEY)?,
        team_members: get_all_in(conn)?,
        tagups: get_all_in(conn)?,
        tasks: get_all_in(conn)?,
        rfis: get_all_in(conn)?,
        risks: get_all_in(conn)?,
        tfr: get_all_in(conn)?,
    })
}

fn clear_all_in(conn: &Connection) -> AppResult<usize> {
    let mut removed = 0;
    for collection in Collection::all() {
        removed += clear_in(conn, *collection)?;
    }
    Ok(removed)
}
