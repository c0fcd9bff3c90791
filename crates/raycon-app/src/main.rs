//! raycon console host.
//!
//! Reads statements from stdin line by line and runs them through the
//! console engine, the same way the in-game text box does. The autoexec
//! script is replayed at startup and rewritten on exit.
//!
//! Host-only directives: `:watch <name>`, `:unwatch <name>`, `:watches`,
//! `:history`, `:clear`, `:quit`.

mod tunables;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use raycon_console::{AutoexecStatus, Console};
use raycon_types::config::ConsoleConfig;
use raycon_types::input::ConsoleEvent;

use tunables::RenderSettings;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Config path from CLI arg or RAYCON_CONFIG env var.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RAYCON_CONFIG").ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    log::info!(
        "Starting raycon console (autoexec: {})",
        config.autoexec_path.display()
    );

    let settings = RenderSettings::default();
    let mut console = Console::new(config);
    tunables::register(&mut console, &settings);

    match console.load_autoexec() {
        Ok(AutoexecStatus::Loaded { statements }) => {
            log::info!("Replayed {statements} autoexec statements");
        },
        Ok(AutoexecStatus::NotFound) => {},
        Err(e) => log::warn!("{e}"),
    }

    let mut stdout = io::stdout();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == ":quit" {
            break;
        }
        if !run_directive(&mut console, trimmed) {
            console.execute(trimmed);
        }
        settings.frame_count.set(settings.frame_count.get() + 1);

        for text in console.take_unread() {
            writeln!(stdout, "{text}")?;
        }
        stdout.flush()?;
    }

    if !console.shutdown() {
        log::warn!("Autoexec was not saved");
    }
    Ok(())
}

/// Handle a `:`-prefixed host directive. Returns false for anything else.
fn run_directive(console: &mut Console, line: &str) -> bool {
    let Some(directive) = line.strip_prefix(':') else {
        return false;
    };
    let (verb, arg) = directive
        .split_once(char::is_whitespace)
        .map_or((directive, ""), |(v, a)| (v, a.trim()));
    let reply = match verb {
        "watch" if console.watch(arg) => format!("watching {arg}"),
        "watch" => format!("cannot watch {arg}"),
        "unwatch" if console.unwatch(arg) => format!("no longer watching {arg}"),
        "unwatch" => format!("{arg} is not watched"),
        "watches" => console
            .watches()
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        "history" => console.history().entries().collect::<Vec<_>>().join("\n"),
        "clear" => {
            console.handle_event(ConsoleEvent::Clear);
            return true;
        },
        _ => return false,
    };
    if !reply.is_empty() {
        println!("{reply}");
    }
    true
}
