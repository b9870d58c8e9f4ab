//! CLI entry point for keyboard-remapper
//!
//! Provides commands for checking a remap profile, listing its tables,
//! replaying key sequences through the engine, and rewriting a profile in
//! canonical form.

use clap::{Parser, Subcommand};
use colored::*;
use keyboard_remapper::config::{expand_path, load_profile, ValidationReport};
use keyboard_remapper::core::buffer::pre_process_remap_table;
use keyboard_remapper::core::keys::{key_name, VirtualKey, VK_NULL};
use keyboard_remapper::core::parser::parse_key_sequence;
use keyboard_remapper::engine::{EngineContext, KeyInput, SimulatedKeyboard};
use keyboard_remapper::logging;
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_PROFILE: &str = "~/.config/keyboard-remapper/remaps.conf";

#[derive(Parser)]
#[command(name = "keyboard-remapper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a remap profile
    Check {
        /// Path to the remap profile
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// List the remap tables a profile produces
    List {
        /// Path to the remap profile
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// Replay a key sequence through the engine
    Simulate {
        /// Path to the remap profile
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,

        /// Events such as "down:Ctrl down:C up:C up:Ctrl"
        sequence: String,

        /// Foreground application for app-specific shortcuts
        #[arg(short, long)]
        app: Option<String>,
    },

    /// Rewrite a profile in canonical form (a backup is kept)
    Format {
        /// Path to the remap profile
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Check { profile } => check_profile(&profile)?,
        Commands::List { profile } => list_remaps(&profile)?,
        Commands::Simulate {
            profile,
            sequence,
            app,
        } => simulate(&profile, &sequence, app.as_deref())?,
        Commands::Format { profile } => format_profile(&profile)?,
    }

    Ok(())
}

/// Check a profile and report every issue with its line number
fn check_profile(path: &str) -> anyhow::Result<()> {
    println!("{} Parsing profile: {}", "→".cyan(), expand_path(path).display());

    let profile = load_profile(path)?;
    println!("{} Found {} remaps\n", "✓".green(), profile.len());

    let report = profile.validate();
    print_report(&report);

    if report.has_errors() {
        println!("\n{}", "⚠ This profile cannot be applied.".yellow());
        std::process::exit(1);
    }

    if report.issues.is_empty() {
        println!("{} {}", "✓".green().bold(), "No issues detected!".bold());
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in report.errors() {
        println!(
            "{} {} {}",
            "✗".red().bold(),
            format!("line {}:", issue.line).dimmed(),
            issue.message
        );
    }

    for issue in report.warnings() {
        println!(
            "{} {} {}",
            "⚠".yellow(),
            format!("line {}:", issue.line).dimmed(),
            issue.message
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("    {}", suggestion.italic());
        }
    }
}

/// List the tables a profile produces
fn list_remaps(path: &str) -> anyhow::Result<()> {
    let profile = load_profile(path)?;
    let tables = profile.to_tables()?;

    println!("{}", format!("Remaps from: {}\n", expand_path(path).display()).bold());

    // Sided pairs with the same target fold back into the generic key
    let mut single_key: BTreeMap<VirtualKey, VirtualKey> = tables.single_key.clone();
    pre_process_remap_table(&mut single_key);

    if !single_key.is_empty() {
        println!("{}", "Keys".underline());
        for (source, target) in &single_key {
            let target = if *target == VK_NULL {
                "disabled".red().to_string()
            } else {
                key_name(*target).green().to_string()
            };
            println!("  {} → {}", key_name(*source).cyan().bold(), target);
        }
    }

    if !tables.toggle_keys.is_empty() {
        println!("{}", "Toggles".underline());
        for key in &tables.toggle_keys {
            println!("  {}", key_name(*key).cyan().bold());
        }
    }

    if !tables.os_shortcuts.is_empty() {
        println!("{}", "Shortcuts".underline());
        for (source, target) in &tables.os_shortcuts {
            println!("  {} → {}", source.to_string().cyan().bold(), target.to_string().green());
        }
    }

    for (app, rows) in &tables.app_shortcuts {
        println!("{}", format!("Shortcuts for {}", app).underline());
        for (source, target) in rows {
            println!("  {} → {}", source.to_string().cyan().bold(), target.to_string().green());
        }
    }

    println!("\n{} Total: {} remaps", "✓".green(), profile.len());

    Ok(())
}

/// Commit a profile into a fresh engine and replay `sequence` through it
fn simulate(path: &str, sequence: &str, app: Option<&str>) -> anyhow::Result<()> {
    let profile = load_profile(path)?;
    let inputs: Vec<KeyInput> = parse_key_sequence(sequence)?
        .into_iter()
        .map(KeyInput::from)
        .collect();

    let engine = Arc::new(EngineContext::new());
    profile.commit(engine.store())?;

    let keyboard = SimulatedKeyboard::with_engine(engine);
    if let Some(app) = app {
        keyboard.set_foreground_app(app);
    }
    keyboard.send_input(&inputs);

    println!("{}", "Delivered to the application:".bold());
    for event in keyboard.delivered_events() {
        let transition = if event.is_down() {
            "down".green()
        } else {
            "up  ".yellow()
        };
        println!("  {} {}", transition, key_name(event.key).cyan());
    }

    let held: Vec<String> = keyboard.held_keys().into_iter().map(key_name).collect();
    if held.is_empty() {
        println!("\n{} No keys held", "✓".green());
    } else {
        println!("\n{} Still held: {}", "⚠".yellow(), held.join(", "));
    }

    Ok(())
}

/// Rewrite a profile in canonical form, keeping a backup
fn format_profile(path: &str) -> anyhow::Result<()> {
    let profile = load_profile(path)?;
    let target = expand_path(path);

    match profile.save(&target)? {
        Some(backup) => println!("{} Backup: {}", "✓".green(), backup.display()),
        None => println!("{} No previous file to back up", "→".cyan()),
    }
    println!("{} Wrote {} remaps to {}", "✓".green(), profile.len(), target.display());

    Ok(())
}
