pub mod render;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "lifelog",
    about = "Daily life log: wake/sleep, steps, study, weight, memo, photo, cleaning and to-dos"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Day to work on (YYYY-MM-DD). Defaults to today")]
    pub date: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Day(DayCommands),
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Status,
    Doctor,
    #[command(about = "Interactive session over the selected day")]
    Shell,
}

#[derive(Debug, Subcommand)]
pub enum DayCommands {
    Show,
    Log {
        #[arg(long)]
        wake: Option<String>,
        #[arg(long)]
        sleep: Option<String>,
        #[arg(long)]
        steps: Option<String>,
        #[arg(long)]
        study: Option<String>,
        #[arg(long)]
        weight: Option<String>,
    },
    Memo {
        #[command(subcommand)]
        command: MemoCommands,
    },
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    Clean {
        #[command(subcommand)]
        command: CleanCommands,
    },
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    Chart {
        #[arg(long, value_enum, default_value_t = ChartMetric::Steps)]
        metric: ChartMetric,
    },
    Calendar {
        #[arg(long, help = "Month to show (YYYY-MM). Defaults to the selected day's month")]
        month: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemoCommands {
    Set {
        #[arg(required = true)]
        text: Vec<String>,
    },
    Edit,
}

#[derive(Debug, Subcommand)]
pub enum TodoCommands {
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    Toggle {
        id: i64,
    },
    Delete {
        id: i64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum CleanCommands {
    Toggle {
        room: String,
    },
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Show,
}

#[derive(Debug, Subcommand)]
pub enum PhotoCommands {
    Set {
        path: PathBuf,
    },
    Delete {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Export {
        path: PathBuf,
    },
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartMetric {
    Steps,
    Study,
    Weight,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Parser)]
#[command(name = "shell", no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommands,
}

#[derive(Debug, Subcommand)]
pub enum ShellCommands {
    #[command(flatten)]
    Day(DayCommands),
    #[command(about = "Switch to another day (YYYY-MM-DD or \"today\")")]
    Select {
        date: String,
    },
    #[command(alias = "quit")]
    Exit,
}
