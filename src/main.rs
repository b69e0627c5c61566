//! Headless APL preview.
//!
//! ```bash
//! # Render message for the webview (local packages merged)
//! apl-preview render document.json --device "Echo Spot"
//!
//! # Component tree with structural paths
//! apl-preview tree document.json
//!
//! # Properties and source lines of one component
//! apl-preview details document.json mainTemplate/items/0
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use apl_preview_lib::commands::{directive, document, inspector, viewport};
use apl_preview_lib::config::{self, PreviewConfig};
use apl_preview_lib::error::AppError;
use apl_preview_lib::host::{HostEvent, RecordingHost};
use apl_preview_lib::preview::build_preview_html;
use apl_preview_lib::source_map::locate_in_file;
use apl_preview_lib::state::AppState;

#[derive(Parser)]
#[command(name = "apl-preview")]
#[command(version)]
#[command(about = "Preview, inflate and inspect APL documents")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config_dir>/apl-preview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the render message for a payload file
    Render {
        file: PathBuf,

        /// Example device name from the viewport catalog
        #[arg(short, long)]
        device: Option<String>,

        /// Print the preview page instead of the message
        #[arg(long)]
        html: bool,
    },

    /// Print the component tree of a payload file
    Tree { file: PathBuf },

    /// Print the properties of the component at a tree path
    Details { file: PathBuf, path: String },

    /// Print the zero-indexed line range of a tree path
    Locate { file: PathBuf, path: String },

    /// List viewport profiles and their devices
    Viewports,

    /// Print a new RenderDocument directive
    NewDirective,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = apl_preview_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli.command, cli.config.as_deref(), cli.format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            if cli.format == OutputFormat::Json {
                match serde_json::to_string(&e) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("{e}"),
                }
            } else {
                eprintln!("error: {}", e.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config_path: Option<&Path>, format: OutputFormat) -> Result<(), AppError> {
    let cfg = load_config(config_path)?;

    match command {
        Commands::Render { file, device, html } => {
            if html {
                println!(
                    "{}",
                    build_preview_html(&cfg.preview.preview_script, &cfg.preview.viewhost_script)
                );
                return Ok(());
            }
            let state = AppState::from_config(cfg)?;
            if let Some(device) = device {
                viewport::select_viewport(&state, &device)?;
            }
            let message = document::render_document(&state, &path_str(&file)?).await?;
            print_json(&message)
        }
        Commands::Tree { file } => {
            let state = AppState::from_config(cfg)?;
            document::open_document(&state, &path_str(&file)?).await?;
            let nodes = inspector::flatten_tree(&state)?;
            match format {
                OutputFormat::Json => {
                    let nodes: Vec<_> = nodes.into_iter().map(|(_, node)| node).collect();
                    print_json(&nodes)
                }
                OutputFormat::Text => {
                    for (depth, node) in nodes {
                        println!("{}{}  [{}]", "  ".repeat(depth), node.label, node.path);
                    }
                    Ok(())
                }
            }
        }
        Commands::Details { file, path } => {
            let state = AppState::from_config(cfg)?;
            document::open_document(&state, &path_str(&file)?).await?;
            let node = inspector::flatten_tree(&state)?
                .into_iter()
                .map(|(_, node)| node)
                .find(|node| node.path == path)
                .ok_or_else(|| AppError::NotFound(format!("no component at {path}")))?;
            let host = RecordingHost::for_file(file)?;
            let Some(inspection) = inspector::activate_node(&state, &node, &host).await? else {
                return Ok(());
            };
            match format {
                OutputFormat::Json => print_json(&inspection),
                OutputFormat::Text => {
                    for item in &inspection.properties {
                        let value = inspector::property_values(item)
                            .into_iter()
                            .map(|v| v.label)
                            .next()
                            .unwrap_or_default();
                        println!("{:<24} {:<32} {}", item.name, value, item.description);
                    }
                    for event in host.take_events() {
                        if let HostEvent::Highlighted(range, _) = event {
                            println!("lines {}..{}", range.start_line, range.end_line);
                        }
                    }
                    Ok(())
                }
            }
        }
        Commands::Locate { file, path } => {
            let range = locate_in_file(&file, &path)
                .ok_or_else(|| AppError::NotFound(format!("no position for {path}")))?;
            match format {
                OutputFormat::Json => print_json(&range),
                OutputFormat::Text => {
                    println!("{} {}", range.start_line, range.end_line);
                    Ok(())
                }
            }
        }
        Commands::Viewports => {
            let state = AppState::in_memory(cfg)?;
            let profiles = viewport::list_profiles(&state);
            match format {
                OutputFormat::Json => print_json(&profiles),
                OutputFormat::Text => {
                    let default = state.catalog.default_device().name.clone();
                    for profile in profiles {
                        println!("{}", profile.name);
                        for device in profile.example_devices {
                            let marker = if device.name == default { "*" } else { " " };
                            println!(
                                "  {marker} {:<28} {:?} {}x{} @{}",
                                device.name,
                                device.viewport.shape,
                                device.viewport.width,
                                device.viewport.height,
                                device.viewport.dpi
                            );
                        }
                    }
                    Ok(())
                }
            }
        }
        Commands::NewDirective => {
            println!("{}", directive::new_render_directive_text()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PreviewConfig, AppError> {
    let cfg = match path {
        Some(path) => config::load(path)?,
        None => config::load_default()?,
    };
    Ok(cfg)
}

fn path_str(path: &Path) -> Result<String, AppError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::Io(format!("path is not valid UTF-8: {}", path.display())))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AppError::Render(e.to_string()))?;
    println!("{json}");
    Ok(())
}
