use std::process::ExitCode;

use camino::Utf8PathBuf;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use strainload::app::{Loader, RunOptions};
use strainload::commit::DirectoryLoader;
use strainload::config::{ConfigLoader, ConfigOverrides};
use strainload::domain::{LoadMode, LoadVariant};
use strainload::error::LoadError;
use strainload::output::{JsonOutput, OutputMode, TracingSink, print_text_summary};
use strainload::report::ErrorReporter;
use strainload::store::SnapshotStore;

#[derive(Parser)]
#[command(name = "strainload")]
#[command(about = "Validate curated strain files and stage coordinated bulk-load output")]
#[command(version)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate the input and publish bulk-load files")]
    Run(RunArgs),
    #[command(about = "Validate the input without publishing anything")]
    Check(RunArgs),
}

#[derive(Args, Clone)]
struct RunArgs {
    #[arg(long)]
    input: Option<String>,

    #[arg(long)]
    snapshot: Option<String>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long, value_enum)]
    variant: Option<LoadVariant>,

    #[arg(long)]
    output_dir: Option<String>,

    #[arg(long, default_value = ".")]
    log_dir: String,

    #[arg(long)]
    preview: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<LoadError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &LoadError) -> u8 {
    match error {
        LoadError::MalformedLine { .. }
        | LoadError::InputOpen(_)
        | LoadError::InputRead(_)
        | LoadError::InvalidVariant(_)
        | LoadError::InvalidMode(_)
        | LoadError::ConfigRead(_)
        | LoadError::ConfigParse(_)
        | LoadError::MissingSetting(_)
        | LoadError::Snapshot { .. } => 2,
        LoadError::Commit(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mode = requested_mode(&cli.command);
    match cli.command {
        Commands::Run(args) | Commands::Check(args) => run_load(args, mode, output_mode),
    }
}

fn requested_mode(command: &Commands) -> Option<LoadMode> {
    match command {
        Commands::Run(args) => args.preview.then_some(LoadMode::Preview),
        Commands::Check(_) => Some(LoadMode::Preview),
    }
}

fn overrides(args: &RunArgs, mode: Option<LoadMode>) -> ConfigOverrides {
    ConfigOverrides {
        variant: args.variant,
        mode,
        input: args.input.clone(),
        output_dir: args.output_dir.clone(),
        snapshot: args.snapshot.clone(),
    }
}

fn run_load(args: RunArgs, mode: Option<LoadMode>, output_mode: OutputMode) -> miette::Result<()> {
    let resolved = ConfigLoader::resolve(args.config.as_deref(), &overrides(&args, mode))?;
    let store = SnapshotStore::open(&resolved.snapshot)?;
    let mut reporter =
        ErrorReporter::create(&Utf8PathBuf::from(&args.log_dir), &resolved.input, Local::now())?;
    let bulk = DirectoryLoader::new(resolved.output_dir.clone());
    let loader = Loader::new(&store, RunOptions::from_config(&resolved));

    let output = match output_mode {
        OutputMode::Json => loader.run_file(&resolved, &mut reporter, &bulk, &JsonOutput)?,
        OutputMode::Text => loader.run_file(&resolved, &mut reporter, &bulk, &TracingSink)?,
    };

    match output_mode {
        OutputMode::Json => JsonOutput::print_summary(&output.summary).into_diagnostic()?,
        OutputMode::Text => print_text_summary(&output.summary),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use strainload::config::Config;

    use super::*;

    fn resolve(argv: &[&str], config: Config) -> LoadMode {
        let cli = Cli::try_parse_from(argv).unwrap();
        let mode = requested_mode(&cli.command);
        let (Commands::Run(args) | Commands::Check(args)) = &cli.command;
        ConfigLoader::resolve_config(config, &overrides(args, mode))
            .unwrap()
            .mode
    }

    fn config(mode: Option<LoadMode>) -> Config {
        Config {
            mode,
            input: Some("strains.txt".to_string()),
            snapshot: Some("mgd.json".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn run_keeps_config_mode_unless_preview_flag() {
        assert_eq!(
            resolve(&["strainload", "run"], config(Some(LoadMode::Preview))),
            LoadMode::Preview
        );
        assert_eq!(resolve(&["strainload", "run"], config(None)), LoadMode::Load);
        assert_eq!(
            resolve(&["strainload", "run", "--preview"], config(Some(LoadMode::Load))),
            LoadMode::Preview
        );
    }

    #[test]
    fn check_always_previews() {
        assert_eq!(
            resolve(&["strainload", "check"], config(Some(LoadMode::Load))),
            LoadMode::Preview
        );
    }
}
