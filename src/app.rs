//! Uppstart av applikationen: öppna lagringen, skriv startdata vid
//! behov, laga aktiv medlem och kör dagsskiftet innan första vyn visas.

use chrono::Utc;

use crate::db::Database;
use crate::models::{AppSettings, Snapshot, Tagup, TagupDraft};
use crate::services::{RolloverEngine, RolloverOutcome, Seeder};
use crate::ui::{Route, TextRenderer};
use crate::utils::date::DateService;
use crate::utils::error::AppResult;
use crate::utils::path::display_path;

pub struct App {
    db: Database,
    settings: AppSettings,
}

impl App {
    /// Öppna databasen enligt inställningarna och starta
    pub fn boot(settings: AppSettings) -> AppResult<Self> {
        let db_path = settings.database_path();
        tracing::info!("Öppnar databas: {}", display_path(&db_path));

        let db = Database::open(&db_path)?;
        Self::start(db, settings)
    }

    /// Starta mot en redan öppnad databas
    pub fn start(db: Database, settings: AppSettings) -> AppResult<Self> {
        let dates = DateService::from_name(&settings.timezone).unwrap_or_else(|e| {
            tracing::warn!("{}, använder {}", e, DateService::default().timezone_name());
            DateService::default()
        });
        let db = db.with_dates(dates);

        let seeder = Seeder::new(&db);
        let seeded = match load_bootstrap(&settings) {
            Some(snapshot) => seeder.ensure_seeded_from(snapshot)?,
            None => seeder.ensure_seeded()?,
        };
        if seeded {
            tracing::info!("Ny databas initierad");
        }
        seeder.repair_active_member()?;

        // Tidszonen i meta gäller framför inställningsfilen
        let meta = db.meta().load()?;
        let db = if meta.timezone != db.dates().timezone_name() {
            match DateService::from_name(&meta.timezone) {
                Ok(dates) => db.with_dates(dates),
                Err(e) => {
                    tracing::warn!("Meta: {}", e);
                    db
                }
            }
        } else {
            db
        };

        let app = Self { db, settings };
        app.rollover()?;
        Ok(app)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn rollover(&self) -> AppResult<RolloverOutcome> {
        RolloverEngine::new(&self.db).run()
    }

    /// Textvy för en route. Tag-up-vyn kör dagsskiftet först.
    pub fn render(&self, route: Route) -> AppResult<String> {
        if route == Route::Tagup {
            self.rollover()?;
        }
        TextRenderer::new(&self.db)?.render(route, Utc::now())
    }

    /// Spara dagens tag-up
    pub fn write_standup(&self, draft: TagupDraft) -> AppResult<Tagup> {
        self.rollover()?;
        self.db.tagups().save(draft)
    }

    /// "Local time: 14:05 CST | Week 3"
    pub fn status_line(&self) -> String {
        self.db.dates().status_line(Utc::now())
    }
}

fn load_bootstrap(settings: &AppSettings) -> Option<Snapshot> {
    let path = settings.bootstrap_file.as_ref()?;
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Kunde inte läsa startfil {}: {}", display_path(path), e);
            return None;
        }
    };

    match Snapshot::from_json(&json).and_then(|snapshot| snapshot.validate().map(|_| snapshot)) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Ogiltig startfil {}, använder standarddata: {}", display_path(path), e);
            None
        }
    }
}
