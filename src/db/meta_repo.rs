use rusqlite::Connection;

use super::store::{exists_in, get_in, put_in};
use super::Database;
use crate::models::{Collection, Meta, Theme, META_KEY};
use crate::utils::error::{AppError, AppResult};

/// Enda skrivvägen till meta-singletonen. Varje ändring är
/// läs-ändra-skriv i en transaktion, så ingen anropare kan skriva
/// över fält den inte avsåg att röra.
pub struct MetaRepository {
    db: Database,
}

impl MetaRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get(&self) -> AppResult<Option<Meta>> {
        self.db.with_connection(|conn| get_in(conn, META_KEY))
    }

    /// Hämta meta, fel om applikationen inte initierats
    pub fn load(&self) -> AppResult<Meta> {
        self.get()?
            .ok_or_else(|| AppError::not_found("meta är inte initierad"))
    }

    /// Läs, applicera `f` och skriv tillbaka
    pub fn update<F>(&self, f: F) -> AppResult<Meta>
    where
        F: Fn(&mut Meta),
    {
        self.db.transaction(|tx| update_in(tx, &f))
    }

    /// Byt aktiv teammedlem; id:t måste finnas
    pub fn set_active_member(&self, member_id: &str) -> AppResult<Meta> {
        self.db.transaction(|tx| {
            if !exists_in(tx, Collection::TeamMembers, member_id)? {
                return Err(AppError::not_found(format!("Teammedlem {}", member_id)));
            }
            update_in(tx, |meta| meta.active_member_id = member_id.to_string())
        })
    }

    pub fn set_theme(&self, theme: Theme) -> AppResult<Meta> {
        self.update(|meta| meta.theme = theme)
    }

    pub fn toggle_theme(&self) -> AppResult<Theme> {
        Ok(self.update(|meta| meta.theme = meta.theme.toggled())?.theme)
    }
}

/// Läs-ändra-skriv inne i en pågående transaktion.
///
/// `last_standup_date` får aldrig minska.
pub(crate) fn update_in<F>(conn: &Connection, f: F) -> AppResult<Meta>
where
    F: FnOnce(&mut Meta),
{
    let current: Meta = get_in(conn, META_KEY)?
        .ok_or_else(|| AppError::not_found("meta är inte initierad"))?;

    let mut next = current.clone();
    f(&mut next);

    if next.last_standup_date < current.last_standup_date {
        return Err(AppError::validation(format!(
            "lastStandupDate kan inte flyttas bakåt ({} -> {})",
            current.last_standup_date, next.last_standup_date
        )));
    }

    if next != current {
        put_in(conn, &next)?;
    }

    Ok(next)
}
