//! Dagsskifte för tag-ups
//!
//! Om senast registrerade tag-up-datum ligger före dagens datum skrivs en
//! platshållare för det datumet (om ingen post finns) och pekaren flyttas
//! direkt till idag. Mellanliggande missade dagar fylls inte i.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::meta_repo::update_in;
use crate::db::store::{exists_in, get_in, put_in};
use crate::db::Database;
use crate::models::{Collection, Meta, Tagup, META_KEY};
use crate::utils::date::format_date;
use crate::utils::error::{AppError, AppResult};

/// Vad ett dagsskifte gjorde
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// Pekaren var redan på dagens datum (eller senare)
    UpToDate { today: NaiveDate },
    /// Pekaren flyttades. `placeholder` är satt om en platshållare skrevs.
    Advanced {
        from: NaiveDate,
        to: NaiveDate,
        placeholder: Option<NaiveDate>,
    },
}

impl RolloverOutcome {
    pub fn advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

pub struct RolloverEngine<'a> {
    db: &'a Database,
}

impl<'a> RolloverEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn run(&self) -> AppResult<RolloverOutcome> {
        self.run_at(self.db.dates().today())
    }

    /// Dagsskifte relativt en given tidpunkt
    pub fn run_at(&self, instant: DateTime<Utc>) -> AppResult<RolloverOutcome> {
        let today = self.db.dates().local_date(instant);

        let outcome = self.db.transaction(|tx| {
            let meta: Meta = get_in(tx, META_KEY)?
                .ok_or_else(|| AppError::not_found("meta är inte initierad"))?;
            let last = meta.last_standup_date;

            if last >= today {
                return Ok(RolloverOutcome::UpToDate { today });
            }

            let placeholder = if exists_in(tx, Collection::Tagups, &format_date(last))? {
                None
            } else {
                put_in(tx, &Tagup::placeholder(last))?;
                Some(last)
            };

            update_in(tx, |m| m.last_standup_date = today)?;

            Ok(RolloverOutcome::Advanced {
                from: last,
                to: today,
                placeholder,
            })
        })?;

        match outcome {
            RolloverOutcome::Advanced { from, to, placeholder } => {
                let skipped = (to - from).num_days() - 1;
                tracing::info!(
                    "Dagsskifte {} -> {}{}",
                    from,
                    to,
                    if placeholder.is_some() { " (platshållare skriven)" } else { "" }
                );
                if skipped > 0 {
                    tracing::warn!("{} dagar utan tag-up fylls inte i", skipped);
                }
            }
            RolloverOutcome::UpToDate { .. } => {
                tracing::debug!("Inget dagsskifte behövs");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagupDraft;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    /// Mitt på dagen i Chicago
    fn noon(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 18, 0, 0).unwrap()
    }

    fn setup(last: NaiveDate) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.store().put(&Meta::new(last, "America/Chicago", "weston")).unwrap();
        db
    }

    #[test]
    fn test_rollover_writes_placeholder_and_advances() {
        let db = setup(day(9));
        let outcome = RolloverEngine::new(&db).run_at(noon(10)).unwrap();

        assert_eq!(
            outcome,
            RolloverOutcome::Advanced {
                from: day(9),
                to: day(10),
                placeholder: Some(day(9)),
            }
        );
        let placeholder = db.tagups().get(day(9)).unwrap().unwrap();
        assert!(placeholder.auto_rolled);
        assert_eq!(db.meta().load().unwrap().last_standup_date, day(10));
    }

    #[test]
    fn test_rollover_same_day_is_noop() {
        let db = setup(day(9));
        let engine = RolloverEngine::new(&db);
        engine.run_at(noon(10)).unwrap();

        let again = engine.run_at(noon(10)).unwrap();
        assert_eq!(again, RolloverOutcome::UpToDate { today: day(10) });
        assert_eq!(db.tagups().list().unwrap().len(), 1);
    }

    #[test]
    fn test_rollover_keeps_existing_tagup() {
        let db = setup(day(9));
        db.tagups()
            .create(
                day(9),
                TagupDraft {
                    today_text: "Real entry".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        let outcome = RolloverEngine::new(&db).run_at(noon(10)).unwrap();
        assert!(matches!(outcome, RolloverOutcome::Advanced { placeholder: None, .. }));

        let kept = db.tagups().get(day(9)).unwrap().unwrap();
        assert_eq!(kept.today_text, "Real entry");
        assert!(!kept.auto_rolled);
    }

    #[test]
    fn test_rollover_jumps_over_missed_days() {
        let db = setup(day(5));
        RolloverEngine::new(&db).run_at(noon(9)).unwrap();

        let dates: Vec<NaiveDate> = db.tagups().list().unwrap().iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![day(5)]);
        assert_eq!(db.meta().load().unwrap().last_standup_date, day(9));
    }

    #[test]
    fn test_rollover_uses_local_day_boundary() {
        let db = setup(day(9));
        // 03:00 UTC den 10:e är fortfarande den 9:e i Chicago
        let late_evening = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap();
        let outcome = RolloverEngine::new(&db).run_at(late_evening).unwrap();
        assert!(!outcome.advanced());
    }

    #[test]
    fn test_rollover_requires_meta() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            RolloverEngine::new(&db).run_at(noon(10)),
            Err(AppError::NotFound(_))
        ));
    }
}
