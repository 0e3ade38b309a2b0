mod cli;

use crate::cli::render::{
    render_calendar, render_chart, render_cleaning, render_day_view, render_todos,
};
use crate::cli::{
    ChartMetric, CleanCommands, Cli, Commands, ConfigCommands, DayCommands, MemoCommands,
    PhotoCommands, ShellCommands, ShellLine, TodoCommands,
};
use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use lifelog::analyzer::series::Metric;
use lifelog::config::Config;
use lifelog::db::RecordStore;
use lifelog::db::table::TableName;
use lifelog::photos::PhotoStore;
use lifelog::records::cleaning::{CleaningMap, Room};
use lifelog::records::day_log::DayLog;
use lifelog::records::todo::TodoList;
use lifelog::session::{PhotoSave, Session};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status().await,
        Commands::Doctor => handle_doctor().await,
        Commands::Shell => handle_shell(cli.date).await,
        Commands::Day(command) => {
            let mut session = open_session(cli.date).await?;
            run_day_command(&mut session, command).await
        }
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

async fn handle_status() -> Result<()> {
    let config = load_or_default_config()?;
    let records = RecordStore::open(&config.records_path, config.storage_quota_bytes)?;
    let photos = PhotoStore::open(&config.photos_path);

    println!("LifeLog status");
    println!("- records_db: {}", config.records_path.display());
    println!("- photos_db: {}", config.photos_path.display());
    for name in TableName::ALL {
        let days = match name {
            TableName::DayLogs => records.load::<DayLog>().len(),
            TableName::DayTodos => records.load::<TodoList>().len(),
            TableName::DayCleaning => records.load::<CleaningMap>().len(),
        };
        println!("- {name}: {days} day(s)");
    }
    println!(
        "- storage: {} / {} bytes",
        records.stored_bytes()?,
        records.quota_bytes()
    );
    println!("- photos: {}", photos.count().await?);

    Ok(())
}

async fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(error) if config_path.exists() => {
            println!("[WARN] config.json unusable, using defaults: {error:#}");
            issues.push("config invalid".to_string());
            Config::default()
        }
        Err(_) => Config::default(),
    };

    match RecordStore::open(&config.records_path, config.storage_quota_bytes) {
        Ok(records) => {
            println!("[OK] records DB reachable: {}", config.records_path.display());
            let used = records.stored_bytes()?;
            if storage_nearly_full(used, records.quota_bytes()) {
                println!(
                    "[WARN] storage nearly full: {used} of {} bytes",
                    records.quota_bytes()
                );
                issues.push("storage nearly full".to_string());
            } else {
                println!("[OK] storage usage: {used} of {} bytes", records.quota_bytes());
            }
        }
        Err(error) => {
            println!("[WARN] records DB check failed: {error:#}");
            issues.push("records db unreachable".to_string());
        }
    }

    if PhotoStore::open(&config.photos_path).is_available().await {
        println!("[OK] photos DB reachable: {}", config.photos_path.display());
    } else {
        println!("[WARN] photos DB unavailable: {}", config.photos_path.display());
        issues.push("photos db unreachable".to_string());
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

async fn handle_shell(date: Option<String>) -> Result<()> {
    let mut session = open_session(date).await?;
    let theme = ColorfulTheme::default();

    println!("LifeLog shell. Type `help` for commands, `exit` to leave.");
    println!("{}", render_day_view(&session.day_view()));

    loop {
        let line = match Input::<String>::with_theme(&theme)
            .with_prompt(session.selected().to_string())
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(error) => {
                info!(error = %error, "shell input closed");
                break;
            }
        };

        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(error) => {
                let _ = error.print();
                continue;
            }
        };

        let outcome = match parsed.command {
            ShellCommands::Exit => break,
            ShellCommands::Select { date } => match parse_shell_date(&date) {
                Ok(date) => {
                    session.select_date(date).await;
                    println!("{}", render_day_view(&session.day_view()));
                    Ok(())
                }
                Err(error) => Err(error),
            },
            ShellCommands::Day(command) => run_day_command(&mut session, command).await,
        };

        if let Err(error) = outcome {
            println!("! {error:#}");
        }
    }

    Ok(())
}

async fn run_day_command(session: &mut Session, command: DayCommands) -> Result<()> {
    match command {
        DayCommands::Show => {
            println!("{}", render_day_view(&session.day_view()));
        }
        DayCommands::Log {
            wake,
            sleep,
            steps,
            study,
            weight,
        } => {
            let patch = DayLog {
                wake_time: wake,
                sleep_time: sleep,
                steps,
                study_minutes: study,
                weight,
                memo: None,
            };
            if patch.is_empty() {
                bail!(
                    "Nothing to log. Pass at least one of --wake, --sleep, --steps, --study, --weight"
                );
            }

            session.update_log_fields(patch)?;
            println!("{}", render_day_view(&session.day_view()));
        }
        DayCommands::Memo { command } => match command {
            MemoCommands::Set { text } => {
                session.save_memo(&text.join(" "))?;
                println!("Memo saved for {}", session.selected());
            }
            MemoCommands::Edit => {
                session.edit_memo();
                let current = session.day_view().log.memo_text().to_string();
                let memo = Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt("Memo")
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()
                    .context("Failed to read memo input")?;
                session.save_memo(&memo)?;
                println!("Memo saved for {}", session.selected());
            }
        },
        DayCommands::Todo { command } => run_todo_command(session, command)?,
        DayCommands::Clean { command } => run_clean_command(session, command)?,
        DayCommands::Photo { command } => run_photo_command(session, command).await?,
        DayCommands::Chart { metric } => {
            let points = match metric {
                ChartMetric::Steps => session.chart_series(),
                ChartMetric::Study => session.metric_series(Metric::StudyMinutes),
                ChartMetric::Weight => session.metric_series(Metric::Weight),
            };
            println!("{}", render_chart(&points));
        }
        DayCommands::Calendar { month } => {
            let (year, month) = match month {
                Some(raw) => parse_month(&raw)?,
                None => {
                    let selected = session
                        .selected()
                        .date()
                        .unwrap_or_else(|| Local::now().date_naive());
                    (selected.year(), selected.month())
                }
            };
            println!("{}", render_calendar(&session.month_marks(year, month)?));
        }
    }

    Ok(())
}

fn run_todo_command(session: &mut Session, command: TodoCommands) -> Result<()> {
    match command {
        TodoCommands::Add { text } => match session.add_todo(&text.join(" "))? {
            Some(id) => println!("Added task {id}"),
            None => println!("Task text is empty. Nothing added"),
        },
        TodoCommands::Toggle { id } => {
            if !session.toggle_todo(id)? {
                bail!("No task {id} on {}", session.selected());
            }
        }
        TodoCommands::Delete { id } => {
            if !session.delete_todo(id)? {
                bail!("No task {id} on {}", session.selected());
            }
        }
        TodoCommands::List => {}
    }

    let view = session.day_view();
    println!(
        "{}\nDone {} of goal {} ({:.0}%)",
        render_todos(&view.todos),
        view.todos.done_count(),
        session.goals().todos,
        view.progress.todos
    );
    Ok(())
}

fn run_clean_command(session: &mut Session, command: CleanCommands) -> Result<()> {
    match command {
        CleanCommands::Toggle { room } => {
            let room = room.parse::<Room>()?;
            let cleaned = session.toggle_cleaning_room(room)?;
            println!(
                "{} marked {}",
                room.label(),
                if cleaned { "cleaned" } else { "not cleaned" }
            );
        }
        CleanCommands::Reset { yes } => {
            if !yes && !confirm(&format!("Clear cleaning record for {}?", session.selected()))? {
                return Ok(());
            }
            session.reset_cleaning_for_day()?;
            println!("Cleaning record cleared for {}", session.selected());
        }
        CleanCommands::Show => {}
    }

    let view = session.day_view();
    println!("{}\n{}", render_cleaning(&view.cleaning), view.cleaning_status.symbol());
    Ok(())
}

async fn run_photo_command(session: &mut Session, command: PhotoCommands) -> Result<()> {
    match command {
        PhotoCommands::Set { path } => match session.set_photo(read_upload(&path)).await {
            PhotoSave::Stored => println!("Photo saved for {}", session.selected()),
            PhotoSave::NotSaved => {
                println!("Photo could not be saved. It is shown for this session only")
            }
            PhotoSave::Skipped => {}
        },
        PhotoCommands::Delete { yes } => {
            if !yes && !confirm(&format!("Delete photo for {}?", session.selected()))? {
                return Ok(());
            }
            if session.delete_photo().await {
                println!("Photo deleted for {}", session.selected());
            } else {
                println!("Photo could not be deleted");
            }
        }
        PhotoCommands::Export { path } => {
            let Some(photo) = session.day_view().photo else {
                bail!("No photo for {}", session.selected());
            };
            fs::write(&path, photo)
                .with_context(|| format!("Failed to write photo: {}", path.display()))?;
            println!("Photo written to {}", path.display());
        }
        PhotoCommands::Edit => {
            session.edit_photo();
            println!("Choose a new photo with `photo set <path>`");
        }
    }

    Ok(())
}

fn storage_nearly_full(used: usize, quota: usize) -> bool {
    used.saturating_mul(10) >= quota.saturating_mul(9)
}

fn read_upload(path: &Path) -> Option<Vec<u8>> {
    fs::read(path)
        .map_err(|error| {
            warn!(error = %error, path = %path.display(), "photo file not readable");
        })
        .ok()
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation input")
}

async fn open_session(date: Option<String>) -> Result<Session> {
    let config = load_or_default_config()?;
    let target_date = parse_optional_date(date)?;

    Session::open(&config, target_date).await
}

fn parse_optional_date(input: Option<String>) -> Result<NaiveDate> {
    input
        .as_deref()
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date format: {date}. Example: 2024-01-15"))
        })
        .transpose()?
        .map_or_else(|| Ok(Local::now().date_naive()), Ok)
}

fn parse_shell_date(raw: &str) -> Result<NaiveDate> {
    match raw {
        "today" => Ok(Local::now().date_naive()),
        _ => parse_optional_date(Some(raw.to_string())),
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month format: {raw}. Example: 2024-01"))?;

    Ok((first.year(), first.month()))
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|error| {
        let config_path = Config::config_path()?;
        if config_path.exists() {
            return Err(error);
        }

        let config = Config::default();
        config.save()?;
        Ok(config)
    })
}
