//! Fireberry CLI
//!
//! Entry point for the `fireberry` command-line tool.

use clap::{Parser, Subcommand};
use fireberry_dev::component::ComponentType;
use fireberry_dev::config::EffectiveConfig;
use fireberry_dev::manifest::{load_manifest_file, manifest_path, NewComponent};
use fireberry_dev::{
    debug, validate_component, DirectoryRegistry, PackSummary, Pipeline, PipelineError, Registry,
    SchemaRules,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fireberry")]
#[command(about = "Validate and package Fireberry app components", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Manifest file name, overriding configuration
    #[arg(long, global = true)]
    manifest_file: Option<String>,

    /// Directory for scratch directories, overriding configuration
    #[arg(long, global = true)]
    scratch_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the manifest and every component's build output without packaging
    Validate {
        /// App directory (default: current directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },

    /// Validate and package every component
    Pack {
        /// App directory (default: current directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,

        /// Write archives and push.json to this directory
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Output the summary in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manifest component management
    Component {
        #[command(subcommand)]
        action: ComponentCommands,
    },

    /// Prepare a debug-mode request for a component
    Debug {
        /// Component identifier
        component_id: String,

        /// Dev server address, e.g. localhost:3000
        url: Option<String>,

        /// Stop debug mode instead of starting it
        #[arg(long)]
        stop: bool,

        /// App directory (default: current directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },

    /// Show the effective configuration and where it came from
    Config {
        /// App directory (default: current directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ComponentCommands {
    /// Add a component to the manifest
    Add {
        /// Component name; also the build directory (<name>/dist)
        #[arg(long)]
        name: String,

        /// Component type (record, global-menu, side-menu)
        #[arg(long = "type", short = 't')]
        component_type: String,

        /// Record object type
        #[arg(long)]
        object_type: Option<u64>,

        /// Record height
        #[arg(long)]
        height: Option<String>,

        /// Side menu width
        #[arg(long)]
        width: Option<String>,

        /// Global menu display name
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        icon_name: Option<String>,

        /// Record icon color
        #[arg(long)]
        icon_color: Option<String>,

        /// App directory (default: current directory)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },
}

struct AddArgs {
    name: String,
    component_type: String,
    object_type: Option<u64>,
    height: Option<String>,
    width: Option<String>,
    display_name: Option<String>,
    icon_name: Option<String>,
    icon_color: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let overrides = cli_overrides(cli.manifest_file.as_deref(), cli.scratch_root.as_deref());

    let result = match cli.command {
        Commands::Validate { dir } => run_validate(&working_dir(dir), overrides),
        Commands::Pack { dir, out, json } => run_pack(&working_dir(dir), overrides, out, json),
        Commands::Component { action } => match action {
            ComponentCommands::Add {
                name,
                component_type,
                object_type,
                height,
                width,
                display_name,
                icon_name,
                icon_color,
                dir,
            } => run_component_add(
                &working_dir(dir),
                overrides,
                AddArgs {
                    name,
                    component_type,
                    object_type,
                    height,
                    width,
                    display_name,
                    icon_name,
                    icon_color,
                },
            ),
        },
        Commands::Debug {
            component_id,
            url,
            stop,
            dir,
        } => run_debug(&working_dir(dir), overrides, &component_id, url.as_deref(), stop),
        Commands::Config { dir } => run_config(&working_dir(dir), overrides),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn working_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from("."))
}

fn cli_overrides(manifest_file: Option<&str>, scratch_root: Option<&Path>) -> Option<toml::Table> {
    let mut table = toml::Table::new();
    if let Some(file) = manifest_file {
        table.insert("manifest_file".to_string(), toml::Value::String(file.to_string()));
    }
    if let Some(root) = scratch_root {
        table.insert(
            "scratch_root".to_string(),
            toml::Value::String(root.to_string_lossy().to_string()),
        );
    }
    Some(table)
}

fn run_validate(dir: &Path, overrides: Option<toml::Table>) -> Result<(), PipelineError> {
    let effective = EffectiveConfig::discover(dir, overrides)?;
    let mut pipeline = Pipeline::new(dir, &effective.config);

    let (manifest, verified) = pipeline.check()?;

    println!("Manifest valid: {} ({})", manifest.app.name, manifest.app.id);
    if verified.is_empty() {
        println!("  No components");
    }
    for entry in &verified {
        println!(
            "  {} ({}) [{}] {}",
            entry.component.title(),
            entry.component.id(),
            entry.component.component_type(),
            entry.artifact.path.display()
        );
    }
    Ok(())
}

fn run_pack(
    dir: &Path,
    overrides: Option<toml::Table>,
    out: Option<PathBuf>,
    json_output: bool,
) -> Result<(), PipelineError> {
    let effective = EffectiveConfig::discover(dir, overrides)?;
    let mut pipeline = Pipeline::new(dir, &effective.config);

    let started = Instant::now();
    let outcome = match pipeline.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            if json_output {
                let summary = PackSummary::failure(&e, started.elapsed().as_millis() as u64);
                println!("{}", summary.to_json()?);
            }
            return Err(e);
        }
    };

    if let Some(out) = out {
        DirectoryRegistry::new(out).push(&outcome.manifest, &outcome.components)?;
    }

    let summary = PackSummary::success(
        outcome.manifest.app.id.clone(),
        &outcome.components,
        started.elapsed().as_millis() as u64,
    );

    if json_output {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary.render_human());
    }
    Ok(())
}

fn run_component_add(
    dir: &Path,
    overrides: Option<toml::Table>,
    args: AddArgs,
) -> Result<(), PipelineError> {
    let effective = EffectiveConfig::discover(dir, overrides)?;
    let config = &effective.config;
    let component_type: ComponentType = args.component_type.parse()?;

    let mut new = NewComponent::new(args.name, component_type);
    if let Some(object_type) = args.object_type {
        new = new.with_setting("objectType", object_type);
    }
    for (key, value) in [
        ("height", args.height),
        ("width", args.width),
        ("displayName", args.display_name),
        ("iconName", args.icon_name),
        ("iconColor", args.icon_color),
    ] {
        if let Some(value) = value {
            new = new.with_setting(key, value);
        }
    }

    let raw = new.into_raw();
    validate_component(&raw, &SchemaRules::from_config(config))?;

    let mut manifest = load_manifest_file(dir, &config.manifest_file)?;
    let (title, id, path) = (raw.title.clone(), raw.id.clone(), raw.path.clone());
    manifest.add_component(raw)?;
    manifest.save(&manifest_path(dir, &config.manifest_file))?;

    println!("Component \"{}\" added", title);
    println!("  ID: {}", id);
    println!("  Type: {}", component_type);
    println!("  Build path: {}", path);
    Ok(())
}

fn run_debug(
    dir: &Path,
    overrides: Option<toml::Table>,
    component_id: &str,
    url: Option<&str>,
    stop: bool,
) -> Result<(), PipelineError> {
    let effective = EffectiveConfig::discover(dir, overrides)?;
    let manifest = load_manifest_file(dir, &effective.config.manifest_file)?;

    let request = debug::prepare(&manifest, component_id, url, stop)?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

fn run_config(dir: &Path, overrides: Option<toml::Table>) -> Result<(), PipelineError> {
    let effective = EffectiveConfig::discover(dir, overrides)?;
    println!("{}", effective.to_json()?);
    Ok(())
}
