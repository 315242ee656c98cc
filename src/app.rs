//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to command handlers.

use crate::commands::{self, RunOverrides};
use crate::logging;
use crate::visual::RendererKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A terminal microphone visualizer: a circle that pulses with your voice
#[derive(Parser)]
#[command(name = "micpulse")]
#[command(version)]
#[command(long_about = "A terminal microphone visualizer: a circle that pulses with your voice.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used by default.\n\nKEYS:\n    q / Esc / Ctrl+C    Quit\n    Enter               Retry after microphone access failed\n    Tab                 Switch between canvas and element renderers\n\nSIGNALS:\n    SIGUSR1             Reload colors from the config file\n\nEXAMPLES:\n    $ micpulse\n    $ micpulse --renderer element --background-color '#000000'\n    $ micpulse list-devices\n    $ micpulse config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/micpulse/micpulse.toml\n    Logs:               ~/.local/state/micpulse/micpulse.log.*"
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for the visualizer, usable with or without `run`.
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Rendering strategy
    #[arg(short, long, value_enum, global = true)]
    renderer: Option<RendererKind>,

    /// Input device: "default", an index or a name from `list-devices`
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Outline color (#RRGGBB or #RRGGBBAA)
    #[arg(long, value_name = "HEX", global = true)]
    stroke_color: Option<String>,

    /// Fill color (#RRGGBB or #RRGGBBAA)
    #[arg(long, value_name = "HEX", global = true)]
    inner_color: Option<String>,

    /// Background color (#RRGGBB or #RRGGBBAA)
    #[arg(long, value_name = "HEX", global = true)]
    background_color: Option<String>,
}

impl From<RunArgs> for RunOverrides {
    fn from(args: RunArgs) -> Self {
        RunOverrides {
            renderer: args.renderer,
            device: args.device,
            stroke_color: args.stroke_color,
            inner_color: args.inner_color,
            background_color: args.background_color,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the visualizer (default)
    #[command(visible_alias = "r")]
    Run,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the input device in micpulse.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   micpulse completions bash > micpulse.bash
    ///   micpulse completions zsh > _micpulse
    ///   micpulse completions fish > micpulse.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization or first-run setup fails
/// - If the selected command fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that need neither logging nor setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "micpulse", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        _ => {}
    }

    logging::init_logging()?;

    let config_path = crate::config::get_config_path()?;
    crate::setup::ensure_config(&config_path).map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow::anyhow!("Setup failed: {e}")
    })?;

    match cli.command {
        None | Some(Commands::Run) => commands::handle_run(cli.run.into()).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
