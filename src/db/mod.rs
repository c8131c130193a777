pub mod schema;
pub mod migrations;
pub mod store;
pub mod meta_repo;
pub mod team_repo;
pub mod tagup_repo;
pub mod entity_repo;

use rusqlite::{Connection, ErrorCode, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::models::{Rfi, Risk, Task, TfrItem};
use crate::utils::date::DateService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::ids::{IdGenerator, UuidGenerator};

pub use entity_repo::{EntityRepository, RfiRepository, RiskRepository, TaskRepository, TfrRepository};
pub use meta_repo::MetaRepository;
pub use store::Store;
pub use tagup_repo::TagupRepository;
pub use team_repo::TeamMemberRepository;

/// Huvuddatabas-wrapper. Mutexen är den enda kön som alla läsningar
/// och skrivningar i processen passerar.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
    dates: DateService,
    ids: Arc<dyn IdGenerator>,
}

impl Database {
    /// Öppna eller skapa databas och skapa saknade samlingar
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = open_connection(path)?;
        migrations::run_migrations(&conn)
            .map_err(|e| AppError::storage_unavailable(format!("Kunde inte skapa schema: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
            dates: DateService::default(),
            ids: Arc::new(UuidGenerator),
        })
    }

    /// Öppna in-memory databas (för tester)
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::storage_unavailable(e.to_string()))?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
            dates: DateService::default(),
            ids: Arc::new(UuidGenerator),
        })
    }

    pub fn with_dates(mut self, dates: DateService) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn dates(&self) -> &DateService {
        &self.dates
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stäng och öppna databasfilen på nytt
    pub fn reopen(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut conn = self.lock()?;
        *conn = open_connection(path)?;
        Ok(())
    }

    pub fn store(&self) -> Store {
        Store::new(self.clone())
    }

    pub fn meta(&self) -> MetaRepository {
        MetaRepository::new(self.clone())
    }

    pub fn team(&self) -> TeamMemberRepository {
        TeamMemberRepository::new(self.clone())
    }

    pub fn tagups(&self) -> TagupRepository {
        TagupRepository::new(self.clone())
    }

    pub fn tasks(&self) -> TaskRepository {
        EntityRepository::<Task>::new(self.clone())
    }

    pub fn rfis(&self) -> RfiRepository {
        EntityRepository::<Rfi>::new(self.clone())
    }

    pub fn risks(&self) -> RiskRepository {
        EntityRepository::<Risk>::new(self.clone())
    }

    pub fn tfr(&self) -> TfrRepository {
        EntityRepository::<TfrItem>::new(self.clone())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::storage_unavailable("Databaslåset är förgiftat"))
    }

    /// Direkt tillgång till connection. En tappad anslutning ger
    /// ett (1) nytt öppningsförsök innan felet returneras.
    pub fn with_connection<F, T>(&self, f: F) -> AppResult<T>
    where
        F: Fn(&Connection) -> AppResult<T>,
    {
        let mut conn = self.lock()?;
        match f(&conn) {
            Err(e) if is_connection_lost(&e) => {
                let Some(path) = &self.path else {
                    return Err(e);
                };
                warn!("Anslutningen tappades ({}), öppnar databasen igen", e);
                *conn = open_connection(path)?;
                f(&conn)
            }
            result => result,
        }
    }

    /// Kör allt i `f` i en transaktion under samma lås. Fel ger rollback.
    /// Som i `with_connection` körs `f` en gång till efter en ny öppning
    /// om anslutningen tappades.
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: Fn(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.lock()?;
        match run_transaction(&mut conn, &f) {
            Err(e) if is_connection_lost(&e) => {
                let Some(path) = &self.path else {
                    return Err(e);
                };
                warn!("Anslutningen tappades ({}), öppnar databasen igen", e);
                *conn = open_connection(path)?;
                run_transaction(&mut conn, &f)
            }
            result => result,
        }
    }
}

fn run_transaction<F, T>(conn: &mut Connection, f: &F) -> AppResult<T>
where
    F: Fn(&Transaction<'_>) -> AppResult<T>,
{
    let tx = conn.transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            path: self.path.clone(),
            dates: self.dates,
            ids: Arc::clone(&self.ids),
        }
    }
}

fn open_connection(path: &Path) -> AppResult<Connection> {
    // Skapa katalog om den inte finns
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::storage_unavailable(format!("Kunde inte skapa {:?}: {}", parent, e))
            })?;
        }
    }

    let conn = Connection::open(path)
        .map_err(|e| AppError::storage_unavailable(format!("Kunde inte öppna {:?}: {}", path, e)))?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(|e| AppError::storage_unavailable(e.to_string()))?;

    Ok(conn)
}

fn is_connection_lost(err: &AppError) -> bool {
    match err {
        AppError::Storage(rusqlite::Error::SqliteFailure(e, _)) => {
            matches!(e.code, ErrorCode::CannotOpen | ErrorCode::SystemIoFailure)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskDraft, TeamMember};
    use std::cell::Cell;

    #[test]
    fn test_open_creates_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plm.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));

        // Andra öppningen är idempotent
        drop(db);
        Database::open(&path).unwrap();
    }

    #[test]
    fn test_open_fails_with_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = Database::open(&blocker.join("plm.db"));
        assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("plm.db")).unwrap();
        db.team().put(&TeamMember::new("weston", "Weston", "Lead")).unwrap();

        db.reopen().unwrap();
        assert!(db.team().get("weston").unwrap().is_some());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: AppResult<()> = db.transaction(|tx| {
            store::put_in(tx, &TeamMember::new("weston", "Weston", "Lead"))?;
            Err(AppError::validation("avbruten"))
        });
        assert!(result.is_err());
        assert!(db.team().get("weston").unwrap().is_none());
    }

    #[test]
    fn test_clones_share_connection() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        db.tasks().create(TaskDraft::new("Shared", "weston")).unwrap();
        assert_eq!(other.tasks().count().unwrap(), 1);
    }

    fn lost() -> AppError {
        AppError::Storage(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            None,
        ))
    }

    #[test]
    fn test_transaction_retries_once_after_lost_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("plm.db")).unwrap();
        let attempts = Cell::new(0);

        let result = db.transaction(|tx| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 {
                store::put_in(tx, &TeamMember::new("ghost", "Ghost", "-"))?;
                return Err(lost());
            }
            store::put_in(tx, &TeamMember::new("weston", "Weston", "Lead"))
        });

        assert_eq!(result.unwrap(), "weston");
        assert_eq!(attempts.get(), 2);
        // Första försöket rullades tillbaka
        assert!(db.team().get("ghost").unwrap().is_none());
        assert!(db.team().get("weston").unwrap().is_some());
    }

    #[test]
    fn test_transaction_gives_up_after_second_failure() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("plm.db")).unwrap();
        let attempts = Cell::new(0);

        let result: AppResult<()> = db.transaction(|_| {
            attempts.set(attempts.get() + 1);
            Err(lost())
        });

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn test_with_connection_retries_for_file_database_only() {
        let dir = tempfile::tempdir().unwrap();
        let file_db = Database::open(&dir.path().join("plm.db")).unwrap();
        let attempts = Cell::new(0);
        let value = file_db
            .with_connection(|_| {
                attempts.set(attempts.get() + 1);
                if attempts.get() == 1 {
                    Err(lost())
                } else {
                    Ok(7)
                }
            })
            .unwrap();
        assert_eq!((value, attempts.get()), (7, 2));

        let memory = Database::open_in_memory().unwrap();
        let attempts = Cell::new(0);
        let result: AppResult<()> = memory.with_connection(|_| {
            attempts.set(attempts.get() + 1);
            Err(lost())
        });
        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_connection_lost_classification() {
        let lost = AppError::Storage(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        ));
        assert!(is_connection_lost(&lost));
        assert!(!is_connection_lost(&AppError::validation("x")));
    }
}
