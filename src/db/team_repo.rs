use super::meta_repo::update_in;
use super::store::{delete_in, get_all_in, get_in, put_in};
use super::Database;
use crate::models::{Meta, TeamMember, META_KEY, UNASSIGNED};
use crate::utils::error::{AppError, AppResult};

pub struct TeamMemberRepository {
    db: Database,
}

impl TeamMemberRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Alla medlemmar, sorterade på namn
    pub fn list(&self) -> AppResult<Vec<TeamMember>> {
        let mut members: Vec<TeamMember> = self.db.with_connection(|conn| get_all_in(conn))?;
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(members)
    }

    pub fn get(&self, id: &str) -> AppResult<Option<TeamMember>> {
        self.db.with_connection(|conn| get_in(conn, id))
    }

    pub fn put(&self, member: &TeamMember) -> AppResult<String> {
        self.db.with_connection(|conn| put_in(conn, member))
    }

    /// Ta bort en medlem. Är det den aktiva medlemmen flyttas
    /// `activeMemberId` till första kvarvarande; den sista medlemmen
    /// kan inte tas bort.
    pub fn remove(&self, id: &str) -> AppResult<bool> {
        self.db.transaction(|tx| {
            if !delete_in::<TeamMember>(tx, id)? {
                return Ok(false);
            }
            let Some(meta) = get_in::<Meta>(tx, META_KEY)? else {
                return Ok(true);
            };
            if meta.active_member_id != id {
                return Ok(true);
            }

            let remaining: Vec<TeamMember> = get_all_in(tx)?;
            let Some(next) = first_member(&remaining) else {
                return Err(AppError::validation(format!(
                    "{} är den sista teammedlemmen och kan inte tas bort",
                    id
                )));
            };
            tracing::info!("Aktiv medlem '{}' togs bort, byter till '{}'", id, next);
            let next = next.to_string();
            update_in(tx, |m| m.active_member_id = next)?;
            Ok(true)
        })
    }

    /// Namn för en ägarreferens; okända id:n blir "Unassigned"
    pub fn display_name(&self, owner_id: &str) -> AppResult<String> {
        Ok(self
            .get(owner_id)?
            .map(|m| m.name)
            .unwrap_or_else(|| UNASSIGNED.to_string()))
    }
}

/// Första medlemmen i stabil ordning (minsta id)
pub(crate) fn first_member(team: &[TeamMember]) -> Option<&str> {
    team.iter().map(|m| m.id.as_str()).min()
}
