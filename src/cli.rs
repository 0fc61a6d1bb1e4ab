use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::export::SubtitleFormat;
use crate::ui::OutputFormat;

/// Smart subtitle segmentation for transcribed video
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for messages
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate subtitles from a transcription result
    Generate(GenerateArgs),
    /// Report whether a transcript is CJK-dominant and its default threshold
    Profile(ProfileArgs),
    /// List the cues a transcription result segments into
    Preview(PreviewArgs),
    /// Export subtitles for a task from a task history file
    Export(ExportArgs),
    /// Show or initialize the configuration
    Config(ConfigArgs),
}

fn parse_min_length(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("minimum length must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(format!("invalid minimum length '{value}': {err}")),
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Transcription result (JSON object, or a list whose first item is used)
    #[arg(value_hint = ValueHint::FilePath)]
    pub result: PathBuf,

    /// Characters a clause needs before a comma or space may end it
    #[arg(short = 'm', long, value_parser = parse_min_length)]
    pub min_length: Option<usize>,

    /// Output format; defaults to the configured format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<SubtitleFormat>,

    /// Write to this file instead of standard output
    #[arg(short = 'o', long = "out-file", value_hint = ValueHint::FilePath)]
    pub out_file: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Transcription result (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub result: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Transcription result (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub result: PathBuf,

    /// Characters a clause needs before a comma or space may end it
    #[arg(short = 'm', long, value_parser = parse_min_length)]
    pub min_length: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Task history file (JSON list of tasks)
    #[arg(value_hint = ValueHint::FilePath)]
    pub tasks: PathBuf,

    /// Task id or unambiguous id prefix
    pub task: String,

    /// Characters a clause needs before a comma or space may end it
    #[arg(short = 'm', long, value_parser = parse_min_length)]
    pub min_length: Option<usize>,

    /// Output format; defaults to the configured format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<SubtitleFormat>,

    /// Target directory; defaults to the configured download directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// File name without extension; defaults to one built from the result metadata
    #[arg(long)]
    pub name: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Write the default configuration file
    #[arg(long)]
    pub init: bool,

    /// Replace an existing file when used with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}
