//! quizforge CLI — convert AI-generated assessment JSON into canonical questions.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "quizforge",
    version,
    about = "Canonical question conversion for AI-generated assessments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Skill context flags. Any flag given here wins over the batch file and the
/// config file.
#[derive(Args, Debug, Default, Clone)]
pub struct SkillArgs {
    /// Subject, e.g. "Math"
    #[arg(long)]
    pub subject: Option<String>,

    /// Grade level, e.g. "K" or "3"
    #[arg(long)]
    pub grade: Option<String>,

    /// Skill name, used as the question topic
    #[arg(long)]
    pub skill_name: Option<String>,

    /// Skill number, e.g. "A.1"
    #[arg(long)]
    pub skill_number: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw assessment JSON into canonical questions
    Convert {
        /// Path to a batch JSON file or a directory of them
        #[arg(long)]
        input: PathBuf,

        /// Write output here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        skill: SkillArgs,

        /// Prefix for positional question ids
        #[arg(long)]
        prefix: Option<String>,

        /// Emit the full conversion report instead of just the questions
        #[arg(long)]
        report: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check batch files for problems that would force defaults
    Validate {
        /// Path to a batch JSON file or a directory of them
        #[arg(long)]
        input: PathBuf,
    },

    /// Show how each item was classified and what was defaulted
    Explain {
        /// Path to a batch JSON file or a directory of them
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        skill: SkillArgs,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and a sample batch
    Init,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizforge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            skill,
            prefix,
            report,
            config,
        } => commands::convert::execute(input, output, skill, prefix, report, config),
        Commands::Validate { input } => commands::validate::execute(input),
        Commands::Explain {
            input,
            skill,
            config,
        } => commands::explain::execute(input, skill, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
