use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskboard", about = "Kanban boards with ordered columns, tasks and subtasks")]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.taskboard/taskboard.db]
    #[arg(long, env = "TASKBOARD_DB", global = true)]
    pub db: Option<String>,

    /// Path to the config file [default: ~/.taskboard/config.toml]
    #[arg(long, env = "TASKBOARD_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create database and tables (idempotent)
    Init,

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// List a user's boards
    Boards {
        /// User name
        #[arg(long, env = "TASKBOARD_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a board with its columns, tasks and subtasks
    Show {
        /// Board id
        board: i64,
        /// User name
        #[arg(long, env = "TASKBOARD_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to listen on [default: from config, else 127.0.0.1:3000]
        #[arg(long)]
        bind: Option<String>,
    },

    /// Open the interactive board view
    Board {
        /// User name
        #[arg(long, env = "TASKBOARD_USER")]
        user: String,
        /// Board id [default: the user's default board]
        #[arg(long)]
        board: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user and print its bearer token
    Add {
        /// User name
        name: String,
    },
}
