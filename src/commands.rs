use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

use crate::cli::{Cli, Commands, ConfigArgs, ExportArgs, GenerateArgs, PreviewArgs, ProfileArgs};
use crate::config::{SmartsubConfig, default_config_path};
use crate::export::{export_file_stem, sanitize_filename, write_subtitle, write_subtitle_to};
use crate::session::{ExportSession, TaskRecord};
use crate::subtitle::{LanguageProfile, TranscriptInput, format_time, generate_smart_srt, parse_srt};
use crate::ui::{self, prelude::*};

pub fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let load_config = || SmartsubConfig::load(config_path);

    match cli.command {
        Commands::Generate(args) => handle_generate(args, &load_config()?),
        Commands::Profile(args) => handle_profile(args),
        Commands::Preview(args) => handle_preview(args, &load_config()?),
        Commands::Export(args) => handle_export(args, load_config()?),
        Commands::Config(args) => handle_config(args, config_path),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn transcript_text(result: &Value) -> String {
    TranscriptInput::from_value(result)
        .map(|input| input.text().to_string())
        .unwrap_or_default()
}

fn resolve_min_length(requested: Option<usize>, result: &Value, config: &SmartsubConfig) -> usize {
    let min_length = requested.unwrap_or_else(|| config.min_length_for(&transcript_text(result)));
    emit(
        Level::Debug,
        "subtitle.threshold",
        &format!("Using minimum clause length {min_length}"),
        None,
    );
    min_length
}

fn generate_or_fail(result: &Value, min_length: usize, source: &Path) -> Result<String> {
    let document = generate_smart_srt(result, min_length);
    if document.is_empty() {
        bail!(
            "Subtitle generation failed for {}: no cues were produced (run with --debug for details)",
            source.display()
        );
    }
    Ok(document)
}

pub fn handle_generate(args: GenerateArgs, config: &SmartsubConfig) -> Result<()> {
    let result = read_json(&args.result)?;
    let min_length = resolve_min_length(args.min_length, &result, config);
    let document = generate_or_fail(&result, min_length, &args.result)?;
    let format = args.format.unwrap_or(config.default_format);

    match args.out_file {
        Some(path) => {
            write_subtitle_to(&path, format, &document, args.force)?;
            emit(
                Level::Success,
                "subtitle.generate.success",
                &format!("Wrote subtitles to {}", path.display()),
                Some(json!({ "path": path, "min_length": min_length })),
            );
        }
        None => ui::document("subtitle.generate.document", &format.render(&document)?),
    }
    Ok(())
}

pub fn handle_profile(args: ProfileArgs) -> Result<()> {
    let result = read_json(&args.result)?;
    let profile = LanguageProfile::of(&transcript_text(&result));

    emit(
        Level::Info,
        "subtitle.profile",
        &format!(
            "{} ({} of {} sampled characters are CJK), default minimum length {}",
            if profile.is_cjk() { "CJK-dominant" } else { "Not CJK-dominant" },
            profile.cjk_chars,
            profile.sample_chars,
            profile.default_min_length()
        ),
        Some(json!({
            "cjk": profile.is_cjk(),
            "sample_chars": profile.sample_chars,
            "cjk_chars": profile.cjk_chars,
            "default_min_length": profile.default_min_length(),
        })),
    );
    Ok(())
}

pub fn handle_preview(args: PreviewArgs, config: &SmartsubConfig) -> Result<()> {
    let result = read_json(&args.result)?;
    let min_length = resolve_min_length(args.min_length, &result, config);
    let document = generate_or_fail(&result, min_length, &args.result)?;
    let cues = parse_srt(&document).context("Failed to read generated subtitles")?;

    match get_output_format() {
        OutputFormat::Json => emit(
            Level::Info,
            "subtitle.preview",
            &format!("{} cues", cues.len()),
            Some(json!({ "min_length": min_length, "cues": cues })),
        ),
        OutputFormat::Text => {
            for cue in &cues {
                emit(
                    Level::Info,
                    "subtitle.preview.cue",
                    &format!(
                        "{:>4}  {} --> {}  {}",
                        cue.index,
                        format_time(cue.start_ms),
                        format_time(cue.end_ms),
                        cue.text
                    ),
                    None,
                );
            }
            emit(
                Level::Success,
                "subtitle.preview",
                &format!("{} cues at minimum length {}", cues.len(), min_length),
                None,
            );
        }
    }
    Ok(())
}

pub fn handle_export(args: ExportArgs, config: SmartsubConfig) -> Result<()> {
    let tasks: Vec<TaskRecord> = serde_json::from_value(read_json(&args.tasks)?)
        .with_context(|| format!("{} is not a list of tasks", args.tasks.display()))?;

    let dir = args.dir.unwrap_or_else(|| config.download_dir.clone());
    let format = args.format.unwrap_or(config.default_format);

    let mut session = ExportSession::new(tasks, config);
    let task_id = session.select(&args.task)?.id.clone();
    if let Some(min_length) = args.min_length {
        session.set_min_length(min_length);
    }

    let document = session.preview()?;
    let stem = match args.name {
        Some(name) => sanitize_filename(&name),
        None => export_file_stem(&session.metadata()?, &task_id),
    };
    let path = write_subtitle(&dir, &stem, format, &document, args.force)?;

    emit(
        Level::Success,
        "subtitle.export.success",
        &format!("Exported subtitles for task {} to {}", task_id, path.display()),
        Some(json!({
            "task": task_id,
            "path": path,
            "min_length": session.min_length(),
        })),
    );
    Ok(())
}

pub fn handle_config(args: ConfigArgs, path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if args.init {
        if path.exists() && !args.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        SmartsubConfig::default().save_to_path(&path)?;
        emit(
            Level::Success,
            "config.init",
            &format!("Wrote default configuration to {}", path.display()),
            Some(json!({ "path": path })),
        );
        return Ok(());
    }

    let config = SmartsubConfig::load_from_path(&path)?;
    let rendered = toml::to_string_pretty(&config).context("serializing smartsub config")?;
    emit(
        Level::Info,
        "config.show",
        &format!("# {}\n{}", path.display(), rendered.trim_end()),
        Some(json!({ "path": path, "config": config })),
    );
    Ok(())
}
