// Keyrec CLI
// Replays key traces through the shortcut recorder, or records live

mod live;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use keyrec_core::{parse_trace, Platform, RecorderConfig, ShortcutRecorder, TraceStep};

/// Keyboard shortcut recorder
#[derive(Parser, Debug)]
#[command(name = "keyrec")]
#[command(version)]
#[command(about = "Record and validate keyboard shortcuts", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to <config dir>/keyrec/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Replay a key trace file, or '-' for stdin
    #[arg(short, long, value_name = "TRACE", conflicts_with = "live")]
    trace: Option<String>,

    /// Record a shortcut from the terminal
    #[arg(short, long)]
    live: bool,

    /// Apply Mac-class platform behavior regardless of detection
    #[arg(long)]
    mac: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config, print the compiled policy and exit
    #[arg(long)]
    check_config: bool,
}

/// Observable recorder state, compared between steps to print changes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    recording: bool,
    shortcut: String,
    saved: String,
    error: String,
}

impl Snapshot {
    fn of(recorder: &ShortcutRecorder) -> Self {
        let error = if recorder.error().is_none() {
            String::new()
        } else {
            format!("{}: {}", recorder.error().kind(), recorder.error().message())
        };
        Self {
            recording: recorder.is_recording(),
            shortcut: recorder.shortcut().comparison_key(),
            saved: recorder.saved_shortcut().comparison_key(),
            error,
        }
    }

    /// Lines describing what changed since `prev`
    fn changes(&self, prev: &Snapshot) -> Vec<String> {
        let mut lines = Vec::new();
        if self.recording != prev.recording {
            lines.push(if self.recording { "recording".to_string() } else { "idle".to_string() });
        }
        if self.shortcut != prev.shortcut {
            lines.push(format!("shortcut: {}", display_or_empty(&self.shortcut)));
        }
        if self.error != prev.error && !self.error.is_empty() {
            lines.push(format!("error: {}", self.error));
        }
        if self.saved != prev.saved {
            lines.push(format!("saved: {}", display_or_empty(&self.saved)));
        }
        lines
    }
}

fn display_or_empty(value: &str) -> &str {
    if value.is_empty() {
        "(empty)"
    } else {
        value
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<RecorderConfig> {
    let mut config = match &args.config {
        Some(path) => RecorderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RecorderConfig::load_default().context("loading default config")?,
    };
    if args.mac {
        config.mac = Some(true);
    }
    match config.source_path() {
        Some(path) => log::info!("Loaded config from {}", path.display()),
        None => log::debug!("No config file, using defaults"),
    }
    Ok(config)
}

fn check_config(recorder: &ShortcutRecorder) {
    let policy = recorder.policy();
    println!("Configuration is valid");
    println!(
        "  modifier keys: {}..={}",
        policy.min_mod_keys(),
        policy.max_mod_keys()
    );
    let mods: Vec<&str> = policy.excluded_mods().iter().map(|m| m.as_str()).collect();
    println!("  excluded modifiers: {}", mods.join(", "));
    let keys: Vec<&str> = policy.excluded_keys().into_iter().map(|k| k.as_str()).collect();
    println!("  excluded keys: {}", keys.join(", "));
    println!("  excluded shortcuts:");
    for shortcut in policy.excluded_shortcuts() {
        println!("    - {}", shortcut);
    }
    println!(
        "  platform: {}",
        if recorder.platform() == Platform::Mac { "mac" } else { "other" }
    );
}

fn read_trace(source: &str) -> anyhow::Result<Vec<TraceStep>> {
    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading trace from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("reading trace {}", source))?
    };
    Ok(parse_trace(&content)?)
}

/// Replay steps, returning the printed change log
fn replay(recorder: &mut ShortcutRecorder, steps: &[TraceStep]) -> Vec<String> {
    let mut output = Vec::new();
    let mut prev = Snapshot::of(recorder);
    for step in steps {
        step.apply(recorder);
        let next = Snapshot::of(recorder);
        for change in next.changes(&prev) {
            output.push(format!("{:<18} {}", step.to_string(), change));
        }
        prev = next;
    }
    output
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let mut recorder = config.build_recorder();

    if args.check_config {
        check_config(&recorder);
        return Ok(());
    }

    if args.live {
        let saved = live::record(&mut recorder)?;
        if saved.is_empty() {
            println!("No shortcut recorded");
        } else {
            println!("{}", saved);
        }
        return Ok(());
    }

    let Some(source) = args.trace.as_deref() else {
        bail!("nothing to do: pass --trace <FILE|->, --live or --check-config");
    };
    let steps = read_trace(source)?;
    log::debug!("Replaying {} step(s)", steps.len());
    for line in replay(&mut recorder, &steps) {
        println!("{}", line);
    }
    println!(
        "final: {}",
        display_or_empty(&recorder.saved_shortcut().comparison_key())
    );
    Ok(())
}
