use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vidnotes_cli::cli::{App, CliCommand, CliConfig, RelationAction, RelationKind};
use vidnotes_core::models::{DurationFilter, QualityFilter, UploadDateFilter, VideoFilters};
use vidnotes_core::tracing_setup::{init_tracing, init_tracing_with_file};

#[derive(Parser)]
#[command(name = "vidnotes")]
#[command(about = "Bookmarks, favorites and notes for YouTube videos")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file (contains dataDir, apiKey, logFile)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory for snapshots and the session file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// YouTube Data API key (falls back to YOUTUBE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user
    Login {
        user_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage bookmarks
    #[command(subcommand)]
    Bookmarks(RelationCommand),

    /// Manage favorites
    #[command(subcommand)]
    Favorites(RelationCommand),

    /// Manage notes
    #[command(subcommand)]
    Notes(NoteCommand),

    /// Delete all bookmarks, favorites and notes of the signed-in user
    ClearData,

    /// Browse the video catalog
    #[command(subcommand)]
    Videos(VideoCommand),
}

#[derive(Subcommand)]
enum RelationCommand {
    List,
    Add { video_id: String },
    Remove { video_id: String },
    Toggle { video_id: String },
}

#[derive(Subcommand)]
enum NoteCommand {
    List {
        /// Only notes for this video
        #[arg(long)]
        video: Option<String>,
        /// Case-insensitive match on note content or video title
        #[arg(long, short)]
        search: Option<String>,
        /// Group notes by video
        #[arg(long, short)]
        grouped: bool,
        /// Resolve video titles through the catalog
        #[arg(long)]
        titles: bool,
    },
    Add {
        video_id: String,
        content: String,
    },
    Edit {
        note_id: String,
        content: String,
    },
    Remove {
        note_id: String,
    },
}

#[derive(Subcommand)]
enum VideoCommand {
    Popular {
        #[arg(long, short = 'n', default_value_t = 9)]
        max_results: usize,
    },
    Search {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        /// short, medium or long
        #[arg(long)]
        duration: Option<DurationFilter>,
        /// today, week, month or year
        #[arg(long)]
        uploaded: Option<UploadDateFilter>,
        /// e.g. 1080p, or "all"
        #[arg(long)]
        quality: Option<QualityFilter>,
    },
    Show {
        video_id: String,
    },
}

impl RelationCommand {
    fn into_command(self, kind: RelationKind) -> CliCommand {
        let (action, video_id) = match self {
            Self::List => (RelationAction::List, None),
            Self::Add { video_id } => (RelationAction::Add, Some(video_id)),
            Self::Remove { video_id } => (RelationAction::Remove, Some(video_id)),
            Self::Toggle { video_id } => (RelationAction::Toggle, Some(video_id)),
        };
        CliCommand::Relation {
            kind,
            action,
            video_id,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    match &config.log_file {
        Some(path) => init_tracing_with_file(Some(path.as_path())),
        None => init_tracing(),
    }

    let command = match cli.command {
        Some(Commands::Login {
            user_id,
            name,
            email,
        }) => CliCommand::Login {
            user_id,
            display_name: name,
            email,
        },
        Some(Commands::Logout) => CliCommand::Logout,
        Some(Commands::Whoami) => CliCommand::WhoAmI,
        Some(Commands::Bookmarks(cmd)) => cmd.into_command(RelationKind::Bookmarks),
        Some(Commands::Favorites(cmd)) => cmd.into_command(RelationKind::Favorites),
        Some(Commands::Notes(NoteCommand::List {
            video,
            search,
            grouped,
            titles,
        })) => CliCommand::ListNotes {
            video_id: video,
            search,
            grouped,
            with_titles: titles,
        },
        Some(Commands::Notes(NoteCommand::Add { video_id, content })) => {
            CliCommand::AddNote { video_id, content }
        }
        Some(Commands::Notes(NoteCommand::Edit { note_id, content })) => {
            CliCommand::EditNote { note_id, content }
        }
        Some(Commands::Notes(NoteCommand::Remove { note_id })) => CliCommand::RemoveNote { note_id },
        Some(Commands::ClearData) => CliCommand::ClearData,
        Some(Commands::Videos(VideoCommand::Popular { max_results })) => {
            CliCommand::PopularVideos { max_results }
        }
        Some(Commands::Videos(VideoCommand::Search {
            language,
            genre,
            duration,
            uploaded,
            quality,
        })) => CliCommand::SearchVideos {
            filters: VideoFilters {
                language,
                genre,
                duration,
                upload_date: uploaded,
                quality,
            },
        },
        Some(Commands::Videos(VideoCommand::Show { video_id })) => CliCommand::ShowVideo { video_id },
        None => {
            eprintln!("No command specified. Use --help for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config, command, cli.pretty).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &CliConfig, command: CliCommand, pretty: bool) -> Result<()> {
    let mut app = App::new(config)?;
    let output = app.execute(command).await?;
    if app.store().persistence_degraded() {
        eprintln!("Warning: changes could not be saved and are kept in memory only");
    }

    let text = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

/// Config file (if given) with command line overrides applied
fn load_config(cli: &Cli) -> Result<CliConfig> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    Ok(config.with_overrides(cli.data_dir.clone(), cli.api_key.clone()))
}
