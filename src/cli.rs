use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "coachscore",
    version,
    about = "Score business-coaching assessments"
)]
pub struct Cli {
    /// Enable debug logging (overridden by COACHSCORE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score a JSON file of answers
    Score(ScoreArgs),
    /// Answer an assessment interactively
    Take(TakeArgs),
    /// Validate assessment definitions against their section maxima
    Check(CheckArgs),
    /// List built-in assessments
    Variants(ConfigArgs),
    /// Show a stored result
    Show(ShowArgs),
    /// List stored results
    List(ListArgs),
    /// Write a default coachscore.toml
    Init(InitArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    /// Built-in assessment id or path to an assessment .toml file
    #[arg(long, short)]
    pub assessment: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ContextArgs {
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub business: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// JSON object mapping question (or yes/no item) ids to option values
    #[arg(long)]
    pub answers: PathBuf,
    #[arg(long)]
    pub save: bool,
    #[command(flatten)]
    pub context: ContextArgs,
}

#[derive(Debug, Args, Clone)]
pub struct TakeArgs {
    #[command(flatten)]
    pub run: RunArgs,
    #[arg(long)]
    pub no_save: bool,
    #[command(flatten)]
    pub context: ContextArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    /// Assessment files to check instead of the built-in set
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    pub id: Uuid,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    #[arg(long)]
    pub user: Option<String>,
}
