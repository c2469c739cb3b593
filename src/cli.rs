use crate::error::{Error, Result};
use crate::quiz::AnswerMode;
use crate::store_factory::StoreConfig;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multiplication table practice with persistent statistics
#[derive(Parser, Debug, Clone)]
#[command(name = "Multiplication Table")]
#[command(about = "Practice the 1-9 multiplication table and track your progress", long_about = None)]
#[command(version)]
pub struct Args {
    /// Use in-memory database for testing
    #[arg(long, global = true, help = "Use in-memory database for testing")]
    pub test: bool,

    /// Custom database file path
    #[arg(long, global = true, value_name = "PATH", help = "Use custom database file path")]
    pub db_path: Option<PathBuf>,

    /// Override current date for testing (YYYY-MM-DD format)
    #[arg(
        long,
        global = true,
        value_name = "DATE",
        help = "Override current date (YYYY-MM-DD format)"
    )]
    pub override_date: Option<String>,

    /// Disable coloured output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the multiplication table, optionally highlighting a row/column
    Table {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=9))]
        row: Option<u32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=9))]
        col: Option<u32>,
    },
    /// Answer random questions; type q to quit, m to switch mode
    Quiz {
        #[arg(long, value_enum, default_value_t = AnswerMode::Input)]
        mode: AnswerMode,
        /// Stop after this many questions
        #[arg(long)]
        questions: Option<u32>,
    },
    /// Show recorded statistics
    Stats {
        /// Show per-day charts instead of the all-time tables
        #[arg(long)]
        daily: bool,
    },
    /// Delete all recorded statistics
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the override_date argument if provided
    pub fn validate_override_date(&self) -> Result<Option<NaiveDate>> {
        match &self.override_date {
            Some(date_str) => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    Error::InvalidDate(format!(
                        "Invalid date format for --override-date: '{}'. Expected YYYY-MM-DD",
                        date_str
                    ))
                }),
            None => Ok(None),
        }
    }

    /// Store settings derived from the flags
    pub fn store_config(&self) -> Result<StoreConfig> {
        let mut builder = StoreConfig::builder();
        if self.test {
            builder = builder.test_mode();
        }
        if let Some(path) = &self.db_path {
            builder = builder.path(path.to_string_lossy());
        }
        if let Some(date) = self.validate_override_date()? {
            builder = builder.date(date);
        }
        Ok(builder.build())
    }
}
