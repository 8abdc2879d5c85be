//! Blog store administration entry point.
//!
//! # Responsibility
//! - Initialize the database schema (`initdb`).
//! - Produce password hashes for the admin settings block.
//! - Print the effective settings for inspection.

use blog_core::{hash_password, init_logging, init_schema, open_db, BlogConfig};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true, env = "BLOG_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed the reserved category
    Initdb(InitdbArgs),

    /// Print an Argon2 hash for the admin `password_hash` setting; the
    /// password is read from the first line of stdin
    HashPassword,

    /// Print the effective settings as JSON
    ShowConfig,
}

#[derive(Args)]
struct InitdbArgs {
    /// Database file, overriding the settings value
    #[arg(long)]
    database: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match cli.settings.as_ref() {
        Some(path) => BlogConfig::load(path)?,
        None => BlogConfig::default(),
    };

    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    match cli.command {
        Commands::Initdb(args) => {
            let path = args.database.unwrap_or_else(|| config.database_path.clone());
            let mut conn = open_db(&path)?;
            init_schema(&mut conn)?;
            info!("event=initdb module=cli status=ok");
            println!("Initialized the database at {}.", path.display());
        }
        Commands::HashPassword => {
            let password = read_password_line(std::io::stdin().lock())?;
            println!("{}", hash_password(&password, &config.password_hashing)?);
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

// Never taken as an argument, so it stays out of shell history and `ps`.
fn read_password_line(mut input: impl BufRead) -> Result<String, Box<dyn Error>> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::{read_password_line, Cli, Commands};
    use clap::Parser;
    use std::io::Cursor;

    #[test]
    fn password_is_first_stdin_line_without_newline() {
        let password = read_password_line(Cursor::new("s3cret pass\r\nignored\n")).unwrap();
        assert_eq!(password, "s3cret pass");
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(read_password_line(Cursor::new("\n")).is_err());
        assert!(read_password_line(Cursor::new("")).is_err());
    }

    #[test]
    fn hash_password_takes_no_password_argument() {
        let cli = Cli::try_parse_from(["blog", "hash-password"]).unwrap();
        assert!(matches!(cli.command, Commands::HashPassword));
        assert!(Cli::try_parse_from(["blog", "hash-password", "--password", "x"]).is_err());
    }
}
