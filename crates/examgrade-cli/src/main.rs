//! examgrade CLI: grade answer sheets, check speech matches, validate evaluations.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examgrade", version, about = "Exam auto-grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade answer sheets against an evaluation and store the results
    Grade {
        /// Evaluation TOML file
        #[arg(long)]
        evaluation: PathBuf,

        /// Answer sheet TOML file or directory of answer sheets
        #[arg(long)]
        answers: PathBuf,

        /// Text matching for fill-in-blank and reading answers: exact, contains
        #[arg(long)]
        text_match: Option<String>,

        /// Results directory (overrides config)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Max answer sheets graded concurrently (overrides config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a spoken transcript against its target phrase
    Speech {
        /// Transcript produced by speech recognition
        #[arg(long)]
        spoken: String,

        /// Expected phrase
        #[arg(long)]
        target: String,
    },

    /// Validate evaluation TOML files
    Validate {
        /// Path to evaluation file or directory
        #[arg(long)]
        evaluation: PathBuf,
    },

    /// Show stored results for an evaluation
    Show {
        /// Evaluation ID
        #[arg(long)]
        evaluation: String,

        /// Student ID (omit to list every student)
        #[arg(long)]
        student: Option<String>,

        /// Results directory (overrides config)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, evaluation and answer sheet
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examgrade=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            evaluation,
            answers,
            text_match,
            results,
            parallelism,
            format,
            config,
        } => {
            commands::grade::execute(
                evaluation,
                answers,
                text_match,
                results,
                parallelism,
                format,
                config,
            )
            .await
        }
        Commands::Speech { spoken, target } => commands::speech::execute(&spoken, &target),
        Commands::Validate { evaluation } => commands::validate::execute(evaluation),
        Commands::Show {
            evaluation,
            student,
            results,
            config,
        } => commands::show::execute(evaluation, student, results, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
