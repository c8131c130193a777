use chrono::NaiveDate;
use tracing::debug;

use super::meta_repo::update_in;
use super::store::{count_in, delete_in, get_all_in, get_in, put_in};
use super::Database;
use crate::models::{Collection, Meta, Record, Tagup, TagupDraft, META_KEY};
use crate::utils::date::format_date;
use crate::utils::error::{AppError, AppResult};

/// Tag-ups med datumet som naturlig nyckel: högst en post per dag
pub struct TagupRepository {
    db: Database,
}

impl TagupRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Spara dagens (eller en given dags) tag-up. En andra skrivning
    /// samma datum ersätter den första. Flyttar fram `lastStandupDate`
    /// om datumet är senare.
    pub fn create(&self, date: NaiveDate, draft: TagupDraft) -> AppResult<Tagup> {
        let tagup = Tagup::new(date, draft);
        self.db.transaction(|tx| {
            put_in(tx, &tagup)?;

            let meta: Option<Meta> = get_in(tx, META_KEY)?;
            if let Some(meta) = meta {
                if date > meta.last_standup_date {
                    update_in(tx, |m| m.last_standup_date = date)?;
                }
            }

            Ok(tagup.clone())
        })
    }

    /// Dagens tag-up i den konfigurerade tidszonen
    pub fn save(&self, draft: TagupDraft) -> AppResult<Tagup> {
        self.create(self.db.dates().today_local(), draft)
    }

    /// Ersätt en befintlig tag-up
    pub fn update(&self, date: NaiveDate, draft: TagupDraft) -> AppResult<Tagup> {
        let tagup = Tagup::new(date, draft);
        self.db.transaction(|tx| {
            let existing: Option<Tagup> = get_in(tx, &tagup.key())?;
            if existing.is_none() {
                return Err(AppError::not_found(format!("Tag-up {}", format_date(date))));
            }
            put_in(tx, &tagup)?;
            Ok(tagup.clone())
        })
    }

    pub fn get(&self, date: NaiveDate) -> AppResult<Option<Tagup>> {
        let key = format_date(date);
        self.db.with_connection(|conn| get_in(conn, &key))
    }

    pub fn remove(&self, date: NaiveDate) -> AppResult<bool> {
        let key = format_date(date);
        let removed = self.db.with_connection(|conn| delete_in::<Tagup>(conn, &key))?;
        if !removed {
            debug!("Tag-up {} fanns inte, inget att ta bort", key);
        }
        Ok(removed)
    }

    /// Alla tag-ups, nyaste först
    pub fn list(&self) -> AppResult<Vec<Tagup>> {
        let mut tagups: Vec<Tagup> = self.db.with_connection(|conn| get_all_in(conn))?;
        tagups.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(tagups)
    }

    pub fn count(&self) -> AppResult<i64> {
        self.db.with_connection(|conn| count_in(conn, Collection::Tagups))
    }

    /// Senaste tag-up som faktiskt skrivits (inte automatiska platshållare)
    pub fn latest(&self) -> AppResult<Option<Tagup>> {
        Ok(self.list()?.into_iter().find(|t| !t.auto_rolled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Meta;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn draft(text: &str) -> TagupDraft {
        TagupDraft {
            yesterday_text: format!("{} y", text),
            today_text: format!("{} t", text),
            risks_text: String::new(),
        }
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.store().put(&Meta::new(day(8), "America/Chicago", "weston")).unwrap();
        db
    }

    #[test]
    fn test_at_most_one_per_day() {
        let db = setup();
        let repo = db.tagups();
        repo.create(day(9), draft("first")).unwrap();
        repo.create(day(9), draft("second")).unwrap();

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(all[0].today_text, "second t");
    }

    #[test]
    fn test_create_advances_last_standup_date() {
        let db = setup();
        db.tagups().create(day(10), draft("x")).unwrap();
        assert_eq!(db.meta().load().unwrap().last_standup_date, day(10));

        // Äldre datum flyttar inte tillbaka pekaren
        db.tagups().create(day(5), draft("old")).unwrap();
        assert_eq!(db.meta().load().unwrap().last_standup_date, day(10));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = setup();
        let result = db.tagups().update(day(3), draft("x"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(db.tagups().get(day(3)).unwrap().is_none());
    }

    #[test]
    fn test_update_clears_placeholder_flag() {
        let db = setup();
        db.store().put(&Tagup::placeholder(day(7))).unwrap();

        let updated = db.tagups().update(day(7), draft("late")).unwrap();
        assert!(!updated.auto_rolled);
        assert!(!db.tagups().get(day(7)).unwrap().unwrap().auto_rolled);
    }

    #[test]
    fn test_list_newest_first_and_latest() {
        let db = setup();
        let repo = db.tagups();
        repo.create(day(8), draft("a")).unwrap();
        db.store().put(&Tagup::placeholder(day(11))).unwrap();
        repo.create(day(10), draft("b")).unwrap();

        let dates: Vec<NaiveDate> = repo.list().unwrap().iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![day(11), day(10), day(8)]);
        assert_eq!(repo.latest().unwrap().unwrap().date, day(10));
    }

    #[test]
    fn test_remove() {
        let db = setup();
        db.tagups().create(day(9), draft("x")).unwrap();
        assert!(db.tagups().remove(day(9)).unwrap());
        assert!(!db.tagups().remove(day(9)).unwrap());
        assert!(db.tagups().get(day(9)).unwrap().is_none());
    }
}
