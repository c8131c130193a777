//! PLM Dashboard - Entry Point
//!
//! Projektuppföljning (uppgifter, RFI:er, risker, TFR och dagliga
//! tag-ups) med lokal lagring.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use plm_dashboard::app::App;
use plm_dashboard::models::{AppSettings, Priority, TagupDraft, TaskDraft, TaskStatus};
use plm_dashboard::services::TransferService;
use plm_dashboard::ui::Route;
use plm_dashboard::utils::date::parse_date;
use plm_dashboard::utils::path::{display_path, is_json_file};

#[derive(Parser)]
#[command(name = "plm-dashboard", version, about = "PLM dashboard med lokal lagring")]
struct Cli {
    /// Databasfil (annars plattformens datakatalog)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Inställningsfil (settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Visa en vy: dashboard, tagup, tasks, rfis, risks, tfr, settings
    Show { route: Option<String> },
    /// Skriv dagens tag-up
    Standup {
        #[arg(long, default_value = "")]
        yesterday: String,
        #[arg(long, default_value = "")]
        today: String,
        #[arg(long, default_value = "")]
        risks: String,
    },
    /// Hantera uppgifter
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Exportera all data som JSON
    Export { file: PathBuf },
    /// Ersätt all data med innehållet i en JSON-fil
    Import { file: PathBuf },
    /// Töm allt och skriv standarddata på nytt
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Byt aktiv teammedlem
    Member { id: String },
    /// Växla mellan mörkt och ljust tema
    Theme,
    /// Statusrad och antal poster
    Status,
}

#[derive(Subcommand)]
enum TaskAction {
    Add {
        title: String,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value = "Medium")]
        priority: String,
    },
    /// Byt status (Not Started, In Progress, Completed, Blocked)
    Status { id: String, status: String },
    Remove { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    let (mut settings, settings_error) = match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (AppSettings::default(), Some(e)),
    };
    if let Some(db) = &cli.db {
        settings.database_path = Some(db.clone());
    }

    // Initiera logging
    tracing_subscriber::fmt()
        .with_max_level(settings.tracing_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = settings_error {
        tracing::warn!("{:#}, använder standardinställningar", e);
    }
    tracing::info!("Startar PLM Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let app = match App::boot(settings) {
        Ok(app) => app,
        Err(e) if e.is_fatal() => {
            tracing::error!("Lagringen är inte tillgänglig: {}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("Kunde inte starta applikationen"),
    };
    run(&app, cli.command.unwrap_or(Command::Show { route: None }))
}

fn run(app: &App, command: Command) -> Result<()> {
    let db = app.db();

    match command {
        Command::Show { route } => {
            let route = route.as_deref().map(Route::from_hash).unwrap_or_default();
            print!("{}", app.render(route)?);
        }
        Command::Standup { yesterday, today, risks } => {
            let tagup = app.write_standup(TagupDraft {
                yesterday_text: yesterday,
                today_text: today,
                risks_text: risks,
            })?;
            println!("{}", tagup.clipboard_text());
        }
        Command::Task { action } => run_task(app, action)?,
        Command::Export { file } => {
            let counts = TransferService::new(db).export_to_file(&file)?;
            println!("Exporterade {} poster till {}", counts.total(), display_path(&file));
        }
        Command::Import { file } => {
            if !is_json_file(&file) {
                tracing::warn!("{} har inte filändelsen .json", display_path(&file));
            }
            let counts = TransferService::new(db)
                .import_from_file(&file)
                .with_context(|| format!("Import från {} misslyckades", display_path(&file)))?;
            println!("Importerade {} poster", counts.total());
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("Återställning tar bort all data, kör igen med --yes");
            }
            TransferService::new(db).reset()?;
            println!("Data återställd till standardvärden");
        }
        Command::Member { id } => {
            match db.meta().set_active_member(&id) {
                Err(e) if e.is_not_found() => bail!("Ingen teammedlem med id {}", id),
                result => result?,
            };
            println!("Aktiv medlem: {}", db.team().display_name(&id)?);
        }
        Command::Theme => {
            let theme = db.meta().toggle_theme()?;
            println!("Tema: {}", theme);
        }
        Command::Status => {
            println!("{}", app.status_line());
            for collection in plm_dashboard::models::Collection::all() {
                println!("  {:<12} {}", collection.document_name(), db.store().count(*collection)?);
            }
        }
    }

    Ok(())
}

fn run_task(app: &App, action: TaskAction) -> Result<()> {
    let tasks = app.db().tasks();

    match action {
        TaskAction::Add { title, owner, due, priority } => {
            let owner = match owner {
                Some(owner) => owner,
                None => app.db().meta().load()?.active_member_id,
            };
            let due_date = match due {
                Some(due) => Some(parse_date(&due).with_context(|| format!("Ogiltigt datum: {}", due))?),
                None => None,
            };
            let priority = Priority::from_name(&priority)
                .with_context(|| format!("Okänd prioritet: {}", priority))?;

            let task = tasks.create(TaskDraft {
                due_date,
                priority,
                ..TaskDraft::new(title, owner)
            })?;
            println!("Skapade {}", task.id);
        }
        TaskAction::Status { id, status } => {
            let status = TaskStatus::from_name(&status)
                .with_context(|| format!("Okänd status: {}", status))?;
            let task = match tasks.set_status(&id, status) {
                Err(e) if e.is_not_found() => bail!("Ingen uppgift med id {}", id),
                result => result?,
            };
            println!("{}: {}", task.title, task.status);
        }
        TaskAction::Remove { id } => {
            if tasks.remove(&id)? {
                println!("Tog bort {}", id);
            } else {
                println!("{} fanns inte", id);
            }
        }
    }

    Ok(())
}
