use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use liftbook_core::VERSION;

/// Liftbook - workout templates, sessions and set logging from the command line
#[derive(Parser)]
#[command(name = "liftbook")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database file
    #[arg(long, global = true, env = "LIFTBOOK_DB")]
    pub db: Option<String>,

    /// Act as this user (overrides the configured user id)
    #[arg(long, global = true, env = "LIFTBOOK_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for listing commands
#[derive(Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that show one record
#[derive(Args)]
pub struct ShowArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that delete one record
#[derive(Args)]
pub struct DeleteArgs {
    /// Record ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for commands that read a JSON payload
#[derive(Args)]
pub struct PayloadArgs {
    /// JSON payload file (`-` reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub file: String,

    /// Print the stored result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ExerciseCommand {
    /// Add an exercise to the catalog
    Add {
        /// Exercise name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List catalog exercises
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retire an exercise so it can no longer be planned or logged
    Retire {
        /// Exercise ID or name
        #[arg(value_name = "EXERCISE")]
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum WorkoutCommand {
    /// Create a workout template from a JSON payload
    Create(PayloadArgs),

    /// List your workout templates, newest first
    List(ListArgs),

    /// Show a workout template and its exercises
    Show(ShowArgs),

    /// Replace a workout template with the desired state in a JSON payload
    Update {
        /// Workout ID
        #[arg(value_name = "ID")]
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a workout template
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a session from a workout template
    Start {
        /// Workout ID
        #[arg(value_name = "WORKOUT_ID")]
        workout_id: String,

        /// Print the created session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an empty session that is not tied to a template
    New {
        /// Start time (ISO-8601 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        started_at: Option<String>,

        /// Print the created session as JSON
        #[arg(long)]
        json: bool,
    },

    /// List your sessions, most recently started first
    List(ListArgs),

    /// Show a session and its sets
    Show(ShowArgs),

    /// Replace a session with the desired state in a JSON payload
    Update {
        /// Session ID
        #[arg(value_name = "ID")]
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Mark a session completed
    Finish {
        /// Session ID
        #[arg(value_name = "ID")]
        id: String,

        /// Active time in seconds
        #[arg(long, value_name = "SECS")]
        active: Option<i64>,

        /// Paused time in seconds
        #[arg(long, value_name = "SECS")]
        paused: Option<i64>,
    },

    /// Delete a session and its sets
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// Log one set in a session
    Log(SetLogArgs),

    /// Delete a logged set
    Delete {
        /// Set ID
        #[arg(value_name = "SET_ID")]
        id: String,
    },
}

/// Arguments for `set log`
#[derive(Args)]
pub struct SetLogArgs {
    /// Session ID
    #[arg(value_name = "SESSION_ID")]
    pub session_id: String,

    /// Exercise ID or name
    #[arg(long)]
    pub exercise: String,

    /// Exercise instance of this session to log into (a new one when omitted)
    #[arg(long)]
    pub instance: Option<String>,

    /// Weight lifted
    #[arg(long)]
    pub weight: Option<f64>,

    /// Repetitions performed
    #[arg(long)]
    pub reps: Option<i32>,

    /// Set number (defaults to the next free number in the instance)
    #[arg(long)]
    pub number: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and create the database
    Init(InitArgs),

    /// Manage the exercise catalog
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Manage workout templates
    #[command(subcommand)]
    Workout(WorkoutCommand),

    /// Start, edit and finish sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Log and remove individual sets
    #[command(subcommand)]
    Set(SetCommand),

    /// Check database integrity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
