//! `formtheme-ctl`: render form definitions through themes and inspect the
//! themes a project has available.

mod commands;
mod definition;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use formtheme::RendererConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "formtheme-ctl",
    version,
    about = "Render form definitions through themes and inspect theme sources",
    styles = output::clap_styles()
)]
struct Cli {
    /// Renderer config file (default: ./.formtheme.toml, then ~/.config/formtheme.toml)
    #[arg(long, global = true, env = "FORMTHEME_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a block for a form definition
    Render(RenderArgs),
    /// Show which theme supplies a block for a field
    Resolve(ResolveArgs),
    /// Inspect the themes the configuration can see
    #[command(subcommand)]
    Themes(ThemeCommands),
}

/// Which node to work on and which themes to assign to the form.
#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    /// Form definition file (.yaml, .yml, .toml or .json)
    pub definition: PathBuf,

    /// Dotted path of a descendant field (e.g. `address.street`)
    #[arg(long)]
    pub field: Option<String>,

    /// Theme to assign to the form root; repeat for several, later wins
    #[arg(long = "theme", value_name = "THEME")]
    pub themes: Vec<String>,

    /// Do not fall back to the configured default themes
    #[arg(long)]
    pub no_default_themes: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Block to render, or the base block (`row`, `widget`...) with --search
    #[arg(long, default_value = "form")]
    pub block: String,

    /// Search block prefixes from the most specific one instead of rendering
    /// the block by its exact name
    #[arg(long)]
    pub search: bool,

    /// Extra variables as a JSON object, layered over the node's own
    #[arg(long, value_name = "JSON")]
    pub vars: Option<String>,

    /// Translation catalogue (TOML tables of domain -> message -> translation)
    #[arg(long, value_name = "FILE", conflicts_with = "stub_translator")]
    pub translations: Option<PathBuf>,

    /// Wrap every translated string in [trans]...[/trans]
    #[arg(long)]
    pub stub_translator: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Block name, or base block name with --search
    pub block: String,

    /// Walk the node's block prefixes the way search-and-render does
    #[arg(long)]
    pub search: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ThemeCommands {
    /// List every theme: built-ins plus the configured theme directories
    List,
    /// Show a theme's parents and the blocks visible through it
    Show {
        /// Theme id
        id: String,
    },
    /// Load every theme in the configured directories and report failures
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => RendererConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => formtheme::load_config(),
    };
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Render(args) => commands::handle_render_command(args, &config),
        Commands::Resolve(args) => commands::handle_resolve_command(args, &config),
        Commands::Themes(cmd) => commands::handle_themes_command(cmd, &config),
    }
}

/// Logs go to stderr; stdout carries the rendered HTML.
fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("formtheme={level}").parse()?)
        .add_directive(format!("formtheme_ctl={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
