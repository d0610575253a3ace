//! rclone-bisync-daemon: keep a local directory and an rclone remote in step.
//!
//! # Usage
//!
//! ```text
//! rclone-bisync-daemon run --dir <path> --remote-dir <remote> [--sync-interval <secs>] [--debounce <secs>]
//! rclone-bisync-daemon register --dir <path> --remote-dir <remote> [--sync-interval <secs>] [--debounce <secs>]
//! rclone-bisync-daemon resync --dir <path> --remote-dir <remote>
//! rclone-bisync-daemon unregister
//! ```

mod commands;

use std::ffi::OsString;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{DaemonArgs, TargetArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rclone-bisync-daemon",
    version,
    about = "Sync a local directory with an rclone remote on an interval and on file changes",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the daemon: sync on an interval and when file changes are detected.
    Run(DaemonArgs),

    /// Register the daemon as a systemd user service, then run one resync.
    Register(DaemonArgs),

    /// Run one full-baseline (--resync) sync and exit.
    Resync(TargetArgs),

    /// Stop, disable and remove the systemd user service.
    Unregister,
}

// ---------------------------------------------------------------------------
// Argument normalization
// ---------------------------------------------------------------------------

/// Flags every subcommand understands.
const GLOBAL_FLAGS: &[&str] = &["help", "version", "h", "V"];

/// Long flags that may also be spelled with a single dash.
const LONG_FLAGS: &[&str] = &[
    "help",
    "version",
    "dir",
    "remote-dir",
    "sync-interval",
    "debounce",
];

/// Flags a subcommand accepts, or `None` to hand its arguments to clap as-is.
fn subcommand_flags(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "run" | "register" => Some(&["dir", "remote-dir", "sync-interval", "debounce"]),
        "resync" => Some(&["dir", "remote-dir"]),
        "unregister" => Some(&[]),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Stage {
    BeforeSubcommand,
    Filtering(&'static [&'static str]),
    PassThrough,
}

/// `-name`, `--name` or `--name=value` split into its name and whether the
/// value is inline. `-` and `--` are not flags.
fn flag_name(token: &str) -> Option<(&str, bool)> {
    let body = token.strip_prefix("--").or_else(|| token.strip_prefix('-'))?;
    if body.is_empty() || body.starts_with('-') {
        return None;
    }
    match body.split_once('=') {
        Some((name, _)) => Some((name, true)),
        None => Some((body, false)),
    }
}

fn is_flag(token: &OsString) -> bool {
    token.to_str().is_some_and(|t| t.starts_with('-'))
}

/// Shape raw arguments for clap.
///
/// `-dir`, `-help`, ... become `--dir`, `--help`. After a known subcommand,
/// stray positional tokens are dropped, and so are flags the subcommand does
/// not use, together with their value (the next token unless it starts with
/// `-`).
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().peekable();
    let mut out: Vec<OsString> = args.next().into_iter().collect();
    let mut stage = Stage::BeforeSubcommand;

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            if !matches!(stage, Stage::Filtering(_)) {
                out.push(arg);
            }
            continue;
        };

        let Some((name, inline)) = flag_name(text) else {
            match stage {
                Stage::BeforeSubcommand => {
                    stage = subcommand_flags(text).map_or(Stage::PassThrough, Stage::Filtering);
                    out.push(arg);
                }
                Stage::Filtering(_) => {}
                Stage::PassThrough => out.push(arg),
            }
            continue;
        };

        let spelled = if !text.starts_with("--") && LONG_FLAGS.contains(&name) {
            OsString::from(format!("-{text}"))
        } else {
            arg.clone()
        };

        match stage {
            Stage::Filtering(accepted) => {
                let known = GLOBAL_FLAGS.contains(&name) || accepted.contains(&name);
                let takes_value = !inline && !GLOBAL_FLAGS.contains(&name);
                let value = if takes_value && args.peek().is_some_and(|next| !is_flag(next)) {
                    args.next()
                } else {
                    None
                };
                if known {
                    out.push(spelled);
                    out.extend(value);
                }
            }
            Stage::BeforeSubcommand | Stage::PassThrough => out.push(spelled),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Register(args) => commands::register::run(args),
        Commands::Resync(args) => commands::resync::run(args),
        Commands::Unregister => commands::unregister::run(),
    }
}
