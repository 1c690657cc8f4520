//! Command-line front for the redirect and theme engines.
//!
//! # Usage
//!
//! - `altfront rewrite <URL>` prints the alternate front-end URL for a page
//! - `altfront classify <PATH>` prints the route kind of a path
//! - `altfront theme --primary <COLOR> --secondary <COLOR>` prints `light` or
//!   `not-light`, followed by the icon asset to show
//! - `altfront config show|set-base|set-strategy|clear` manages saved settings
//!
//! Exit codes:
//! - 0: Success
//! - 2: No target URL could be produced, or settings could not be handled
//!
//! # Environment Variables
//!
//! - `DEBUG`: When set, enables debug output to stderr.
//! - `ALTFRONT_LOG`: Log filter, in `env_logger` syntax.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::error;

use altfront::config::{PopupMode, Settings};
use altfront::navigate::{EntryPoint, plan};
use altfront::{IconSet, LightHints, RewriteStrategy, classify_path, classify_theme, logs};

#[derive(Debug, Parser)]
#[command(name = "altfront", version, about)]
struct Cli {
    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the alternate front-end URL for a page
    Rewrite {
        /// Absolute URL of the page
        url: String,
        /// Base URL, overriding the saved one
        #[arg(long)]
        base: Option<String>,
        /// Rewrite strategy: root-to-top or passthrough
        #[arg(long)]
        strategy: Option<RewriteStrategy>,
        /// Entry point whose defaults apply: click, command or popup
        #[arg(long, default_value = "command")]
        entry: EntryPoint,
    },
    /// Print the route kind of a URL path
    Classify {
        /// URL path, e.g. /r/rust/
        path: String,
    },
    /// Decide whether a page background is near-white
    Theme {
        /// Computed background color of the body element
        #[arg(long, default_value = "")]
        primary: String,
        /// Computed background color of the root element
        #[arg(long, default_value = "")]
        secondary: String,
        /// The root element has the `light` class
        #[arg(long)]
        light_class: bool,
        /// The body element has the `light` class
        #[arg(long)]
        body_light_class: bool,
        /// Value of the root element's `data-theme` attribute
        #[arg(long)]
        data_theme: Option<String>,
        /// The OS prefers a light color scheme
        #[arg(long)]
        prefers_light: bool,
    },
    /// Manage saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the saved settings
    Show,
    /// Save the base URL
    SetBase {
        /// Root of the alternate front-end
        url: String,
    },
    /// Save a strategy override
    SetStrategy {
        /// root-to-top or passthrough
        strategy: RewriteStrategy,
    },
    /// Remove all saved settings
    Clear,
}

fn settings_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Settings::default_path(),
    }
}

fn load_settings(explicit: Option<PathBuf>) -> Result<Settings> {
    match settings_path(explicit) {
        Ok(path) => Settings::load(&path),
        Err(e) => {
            error!("{e:#}, using defaults");
            Ok(Settings::default())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Rewrite {
            url,
            base,
            strategy,
            entry,
        } => {
            let mut settings = load_settings(cli.config)?;
            if let Some(base) = base {
                settings.set_base_url(&base)?;
            }
            if strategy.is_some() {
                settings.strategy = strategy;
            }
            let redirect = plan(entry, &url, &settings).context("Failed to build target URL")?;
            println!("{}", redirect.target);
        }
        Command::Classify { path } => println!("{}", classify_path(&path)),
        Command::Theme {
            primary,
            secondary,
            light_class,
            body_light_class,
            data_theme,
            prefers_light,
        } => {
            let hints = LightHints {
                root_class_light: light_class,
                body_class_light: body_light_class,
                data_theme,
                prefers_light,
            };
            let decision = classify_theme(&primary, &secondary, &hints);
            println!("{decision}");
            let icon = IconSet::for_decision(decision);
            println!("{}", icon.path());
        }
        Command::Config { action } => {
            let path = settings_path(cli.config)?;
            let mut settings = Settings::load(&path)?;
            match action {
                ConfigAction::Show => {
                    println!("path = {}", path.display());
                    println!(
                        "base_url = {}",
                        settings.base_url.as_deref().unwrap_or("(not set)")
                    );
                    println!(
                        "strategy = {}",
                        settings
                            .strategy
                            .map_or_else(|| "(per entry point)".to_string(), |s| s.to_string())
                    );
                    let mode = match settings.popup_mode() {
                        PopupMode::Settings => "settings",
                        PopupMode::Direct => "direct",
                    };
                    println!("popup = {mode}");
                }
                ConfigAction::SetBase { url } => {
                    settings.set_base_url(&url)?;
                    settings.save(&path)?;
                    println!("Settings saved!");
                }
                ConfigAction::SetStrategy { strategy } => {
                    settings.strategy = Some(strategy);
                    settings.save(&path)?;
                    println!("Settings saved!");
                }
                ConfigAction::Clear => {
                    Settings::default().save(&path)?;
                    println!("Settings cleared");
                }
            }
        }
    }
    Ok(())
}

/// Main entry point for the altfront command-line tool.
fn main() {
    logs::init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        process::exit(2);
    }
}
