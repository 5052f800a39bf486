use std::sync::OnceLock;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

static VERBOSITY: OnceLock<Verbosity> = OnceLock::new();

/// Set the output level once at startup. `quiet` wins over `verbose`.
pub fn init(quiet: bool, verbose: bool) {
    let level = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let _ = VERBOSITY.set(level);
}

fn verbosity() -> Verbosity {
    VERBOSITY.get().copied().unwrap_or(Verbosity::Normal)
}

fn visible() -> bool {
    verbosity() > Verbosity::Quiet
}

/// True when only errors should be printed.
pub fn is_quiet() -> bool {
    !visible()
}

/// Print a success message.
pub fn success(msg: &str) {
    if visible() {
        println!("  {} {}", "✓".green(), msg);
    }
}

/// Print a warning message.
pub fn warning(msg: &str) {
    if visible() {
        println!("  {} {}", "⚠".yellow(), msg);
    }
}

/// Print an error message. Shown even in quiet mode.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    if visible() {
        println!("\n{}", msg.bold());
    }
}

/// Print a plain indented line.
pub fn info(msg: &str) {
    if visible() {
        println!("  {msg}");
    }
}

/// Print a dimmed line, only with `--verbose`.
pub fn detail(msg: &str) {
    if verbosity() == Verbosity::Verbose {
        println!("  {}", msg.dimmed());
    }
}

/// Start a spinner; hidden in quiet mode.
pub fn spinner(msg: &str) -> ProgressBar {
    if !visible() {
        return ProgressBar::hidden();
    }
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Replace the spinner with a success line.
pub fn finish_spinner(sp: ProgressBar, msg: &str) {
    sp.finish_and_clear();
    success(msg);
}
