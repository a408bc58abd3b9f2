mod cli;
mod output;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::{Cli, Command, UserCommand};
use taskboard::client::LocalApi;
use taskboard::config::{self, Config};
use taskboard::{auth, db, http, service, tui};

fn resolve_db_path(cli_db: Option<String>, config: &Config) -> Result<String> {
    if let Some(p) = cli_db.or_else(|| config.store.path.clone()) {
        return Ok(p);
    }
    let path = config::data_dir().join("taskboard.db");
    Ok(path
        .to_str()
        .context("default DB path is not valid UTF-8")?
        .to_string())
}

fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn open_db(db_path: &str) -> Result<Connection> {
    let conn = db::open(db_path)?;
    db::init(&conn)?;
    Ok(conn)
}

fn load_config(path: Option<String>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from(Path::new(&p)),
        None => Config::load(),
    }
}

fn setup_stderr_logging(config: &Config) {
    env_logger::Builder::new()
        .parse_filters(config.log_level())
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

/// The board view owns the terminal, so its log goes next to the database.
fn setup_file_logging(db_path: &str, config: &Config) -> Result<()> {
    let dir = Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_path = dir.join("tui.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .parse_filters(config.log_level())
        .format_timestamp_secs()
        .init();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    let db_path = resolve_db_path(cli.db, &config)?;
    ensure_db_dir(&db_path)?;

    match cli.command {
        Command::Init => {
            open_db(&db_path)?;
            eprintln!("Initialized {db_path}");
        }

        Command::User {
            command: UserCommand::Add { name },
        } => {
            let conn = open_db(&db_path)?;
            let (user, token) = auth::create_user(&conn, &name)?;
            eprintln!("Added user '{}' (id {})", user.name, user.id);
            println!("{token}");
        }

        Command::Boards { user, json } => {
            let conn = open_db(&db_path)?;
            let user = auth::require_user(&conn, &user)?;
            let boards = service::list_boards(&conn, user.id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&boards)?);
            } else if boards.is_empty() {
                eprintln!("No boards.");
            } else {
                print!("{}", output::format_board_list(&boards));
            }
        }

        Command::Show { board, user, json } => {
            let conn = open_db(&db_path)?;
            let user = auth::require_user(&conn, &user)?;
            let detail = service::get_board_detail(&conn, user.id, board)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print!("{}", output::format_board_detail(&detail));
            }
        }

        Command::Serve { bind } => {
            setup_stderr_logging(&config);
            let conn = open_db(&db_path)?;
            let bind = bind.unwrap_or_else(|| config.bind().to_string());
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(http::serve(conn, &bind, config.server.static_dir.as_deref()))?;
        }

        Command::Board { user, board } => {
            setup_file_logging(&db_path, &config)?;
            let conn = open_db(&db_path)?;
            let user = auth::require_user(&conn, &user)?;
            tui::run(&db_path, LocalApi::new(conn, user.id), board)?;
        }
    }

    Ok(())
}
