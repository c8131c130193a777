//! CRUD för poster med genererat ID (uppgifter, RFI:er, risker, TFR)

use rusqlite::Connection;
use std::marker::PhantomData;
use tracing::{debug, info};

use super::store::{count_in, delete_in, exists_in, get_all_in, get_in, put_in};
use super::Database;
use crate::models::{
    average_progress, sort_by_due, Entity, Rfi, Risk, Task, TaskFilter, TaskStatus,
    TfrItem,
};
use crate::utils::error::{AppError, AppResult};

/// Antal försök att hitta ett ledigt ID innan vi ger upp
const MAX_ID_ATTEMPTS: usize = 5;

pub struct EntityRepository<T> {
    db: Database,
    _marker: PhantomData<fn() -> T>,
}

pub type TaskRepository = EntityRepository<Task>;
pub type RfiRepository = EntityRepository<Rfi>;
pub type RiskRepository = EntityRepository<Risk>;
pub type TfrRepository = EntityRepository<TfrItem>;

impl<T> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> EntityRepository<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// Skapa ny post med nytt ID. Standardvärden och löpnummer sätts
    /// innan valideringen; ingenting skrivs om den misslyckas.
    pub fn create(&self, draft: T::Draft) -> AppResult<T> {
        let today = self.db.dates().today_local();

        let record = self.db.transaction(|tx| {
            let id = self.unique_id(tx)?;
            let mut record = T::from_draft(id, draft.clone());
            record.on_create(today);

            if T::NUMBERED {
                let existing: Vec<T> = get_all_in(tx)?;
                record.assign_number(&existing);
            }

            record.validate()?;
            put_in(tx, &record)?;
            Ok(record)
        })?;

        info!("Skapade {} {}", T::COLLECTION, record.id());
        Ok(record)
    }

    /// Ersätt hela posten. Fel om ID:t saknas.
    pub fn update(&self, id: &str, draft: T::Draft) -> AppResult<T> {
        let today = self.db.dates().today_local();

        self.db.transaction(|tx| {
            let previous: T = get_in(tx, id)?.ok_or_else(|| self.not_found(id))?;

            let mut record = T::from_draft(id.to_string(), draft.clone());
            record.on_update(&previous, today)?;
            record.validate()?;
            put_in(tx, &record)?;
            Ok(record)
        })
    }

    /// Läs, ändra och skriv en befintlig post. ID:t får inte ändras.
    pub fn modify<F>(&self, id: &str, f: F) -> AppResult<T>
    where
        F: Fn(&mut T),
    {
        let today = self.db.dates().today_local();

        self.db.transaction(|tx| {
            let previous: T = get_in(tx, id)?.ok_or_else(|| self.not_found(id))?;

            let mut record = previous.clone();
            f(&mut record);
            if record.id() != previous.id() {
                return Err(AppError::validation(format!(
                    "ID kan inte ändras ({} -> {})",
                    previous.id(),
                    record.id()
                )));
            }

            record.on_update(&previous, today)?;
            record.validate()?;
            put_in(tx, &record)?;
            Ok(record)
        })
    }

    /// Ta bort om den finns. Returnerar om något togs bort.
    pub fn remove(&self, id: &str) -> AppResult<bool> {
        let removed = self.db.with_connection(|conn| delete_in::<T>(conn, id))?;
        if removed {
            info!("Tog bort {} {}", T::COLLECTION, id);
        } else {
            debug!("{} {} fanns inte, inget att ta bort", T::COLLECTION, id);
        }
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> AppResult<Option<T>> {
        self.db.with_connection(|conn| get_in(conn, id))
    }

    /// Alla poster, utan garanterad ordning
    pub fn list(&self) -> AppResult<Vec<T>> {
        self.db.with_connection(|conn| get_all_in(conn))
    }

    pub fn list_where<P>(&self, predicate: P) -> AppResult<Vec<T>>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.list()?.into_iter().filter(|r| predicate(r)).collect())
    }

    pub fn count(&self) -> AppResult<i64> {
        self.db.with_connection(|conn| count_in(conn, T::COLLECTION))
    }

    fn unique_id(&self, conn: &Connection) -> AppResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.db.ids().next_id(T::ID_PREFIX);
            if !exists_in(conn, T::COLLECTION, &id)? {
                return Ok(id);
            }
            debug!("ID {} upptaget, försöker igen", id);
        }
        Err(AppError::validation(format!(
            "Kunde inte generera ett unikt ID för {}",
            T::COLLECTION
        )))
    }

    fn not_found(&self, id: &str) -> AppError {
        AppError::not_found(format!("{} {}", T::COLLECTION, id))
    }
}

impl EntityRepository<Task> {
    /// Filtrerade uppgifter, sorterade på förfallodatum
    pub fn find(&self, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        let today = self.db.dates().today_local();
        let mut tasks = self.list_where(|t| filter.matches(t, today))?;
        sort_by_due(&mut tasks);
        Ok(tasks)
    }

    /// Byt endast status; övergången kontrolleras
    pub fn set_status(&self, id: &str, status: TaskStatus) -> AppResult<Task> {
        self.modify(id, |task| task.status = status)
    }
}

impl EntityRepository<Rfi> {
    /// Öppna och väntande RFI:er, sorterade på nummer
    pub fn open_items(&self) -> AppResult<Vec<Rfi>> {
        let mut rfis = self.list_where(|r| r.status.is_open())?;
        rfis.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(rfis)
    }
}

impl EntityRepository<Risk> {
    /// Höga och kritiska risker som inte är stängda, allvarligast först
    pub fn needing_attention(&self) -> AppResult<Vec<Risk>> {
        let mut risks = self.list_where(Risk::needs_attention)?;
        risks.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.title.cmp(&b.title)));
        Ok(risks)
    }
}

impl EntityRepository<TfrItem> {
    pub fn average_progress(&self) -> AppResult<u8> {
        Ok(average_progress(&self.list()?))
    }
}
