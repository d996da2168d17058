use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::{Player, QuizDate, UserId};
use services::Identity;
use services::import::DEFAULT_PER_DAY;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_STATE_PATH: &str = "quiz-state.json";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidDate { raw: String },
    InvalidPerDay { raw: String },
    MissingFile,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid user id (expected a UUID): {raw}"),
            ArgsError::InvalidDate { raw } => write!(f, "invalid --start value (expected YYYY-MM-DD): {raw}"),
            ArgsError::InvalidPerDay { raw } => write!(f, "invalid --per-day value: {raw}"),
            ArgsError::MissingFile => write!(f, "seed requires --file <path>"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ui,
    Seed,
    Sync,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            "sync" => Some(Self::Sync),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedArgs {
    pub file: PathBuf,
    /// First day to schedule; today when absent.
    pub start: Option<QuizDate>,
    pub per_day: usize,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub state_path: PathBuf,
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run {
        command: Command,
        config: Config,
        seed: Option<SeedArgs>,
    },
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [ui]  [--db <sqlite_url>] [--state <path>] [--user-id <uuid>] [--username <name>] [--avatar-url <url>]");
    eprintln!("  app seed  --file <path> [--start YYYY-MM-DD] [--per-day N] [--db <sqlite_url>]");
    eprintln!("  app sync  [--db <sqlite_url>] [--state <path>] --user-id <uuid> [--username <name>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --state {DEFAULT_STATE_PATH}");
    eprintln!("  --per-day {DEFAULT_PER_DAY}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_STATE_PATH, QUIZ_USER_ID, QUIZ_USERNAME, QUIZ_AVATAR_URL, RUST_LOG");
}

/// Parse argv (without the program name). Flags override `env`.
///
/// # Errors
///
/// Returns `ArgsError` for unknown or malformed arguments.
pub fn parse_invocation(
    argv: Vec<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Invocation, ArgsError> {
    let mut args = argv.into_iter().peekable();
    let command = match args.peek().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => return Ok(Invocation::Help),
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => {
            let command =
                Command::from_arg(first).ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?;
            args.next();
            command
        }
    };

    let mut db_url = non_blank(env("QUIZ_DB_URL")).unwrap_or_else(|| DEFAULT_DB_URL.to_string());
    let mut state_path = non_blank(env("QUIZ_STATE_PATH"))
        .map_or_else(|| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from);
    let mut user_id = non_blank(env("QUIZ_USER_ID"));
    let mut username = non_blank(env("QUIZ_USERNAME"));
    let mut avatar_url = non_blank(env("QUIZ_AVATAR_URL"));
    let mut file = None;
    let mut start = None;
    let mut per_day = DEFAULT_PER_DAY;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = value;
            }
            "--state" => state_path = PathBuf::from(require_value(&mut args, "--state")?),
            "--user-id" => user_id = Some(require_value(&mut args, "--user-id")?),
            "--username" => username = Some(require_value(&mut args, "--username")?),
            "--avatar-url" => avatar_url = Some(require_value(&mut args, "--avatar-url")?),
            "--file" if command == Command::Seed => {
                file = Some(PathBuf::from(require_value(&mut args, "--file")?));
            }
            "--start" if command == Command::Seed => {
                let value = require_value(&mut args, "--start")?;
                start = Some(
                    value
                        .parse::<QuizDate>()
                        .map_err(|_| ArgsError::InvalidDate { raw: value.clone() })?,
                );
            }
            "--per-day" if command == Command::Seed => {
                let value = require_value(&mut args, "--per-day")?;
                per_day = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ArgsError::InvalidPerDay { raw: value })?;
            }
            "--help" | "-h" => return Ok(Invocation::Help),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    let identity = match user_id {
        None => Identity::Anonymous,
        Some(raw) => {
            let id = raw
                .parse::<UserId>()
                .map_err(|_| ArgsError::InvalidUserId { raw: raw.clone() })?;
            Identity::Authenticated(Player::new(
                id,
                username.unwrap_or_default(),
                avatar_url,
            ))
        }
    };

    let seed = match command {
        Command::Seed => Some(SeedArgs {
            file: file.ok_or(ArgsError::MissingFile)?,
            start,
            per_day,
        }),
        Command::Ui | Command::Sync => None,
    };

    Ok(Invocation::Run {
        command,
        config: Config {
            db_url: normalize_sqlite_url(&db_url),
            state_path,
            identity,
        },
        seed,
    })
}

/// Turns bare paths and `sqlite:` prefixes into absolute `sqlite://` URLs.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directory if missing.
///
/// # Errors
///
/// Returns an error if the URL has no path or the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
