//! germanprep CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "germanprep", version, about = "German exam practice content client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate practice questions
    Generate {
        /// Skill: listening, reading, writing, speaking
        #[arg(long)]
        skill: String,

        /// CEFR level: A1, A2, B1, B2
        #[arg(long)]
        level: String,

        /// Topic to generate questions about
        #[arg(long)]
        topic: String,

        /// First question id to assign
        #[arg(long)]
        item_id_start: Option<u32>,

        /// Preferred reading question type (e.g. "TextMatch")
        #[arg(long)]
        prefer_type: Option<String>,

        /// Writing task type (e.g. "Brief")
        #[arg(long)]
        task_type: Option<String>,

        /// Speaking interaction type (e.g. "Diskussion")
        #[arg(long)]
        interaction_type: Option<String>,

        /// Bypass the cache for this request
        #[arg(long)]
        no_cache: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a written response against its task
    ValidateWriting {
        /// Writing task JSON file
        #[arg(long)]
        task: PathBuf,

        /// Plain-text file with the user's response
        #[arg(long)]
        response: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a recorded speaking response against its task
    ValidateSpeaking {
        /// Speaking task JSON file
        #[arg(long)]
        task: PathBuf,

        /// MP3 recording of the user's response
        #[arg(long)]
        audio: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage the local question cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove every cached question set
    Clear {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("germanprep=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            skill,
            level,
            topic,
            item_id_start,
            prefer_type,
            task_type,
            interaction_type,
            no_cache,
            format,
            config,
        } => {
            commands::generate::execute(
                skill,
                level,
                topic,
                item_id_start,
                prefer_type,
                task_type,
                interaction_type,
                no_cache,
                format,
                config,
            )
            .await
        }
        Commands::ValidateWriting {
            task,
            response,
            config,
        } => commands::validate::execute_writing(task, response, config).await,
        Commands::ValidateSpeaking {
            task,
            audio,
            config,
        } => commands::validate::execute_speaking(task, audio, config).await,
        Commands::Cache { command } => match command {
            CacheCommands::Clear { config } => commands::cache::execute_clear(config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
