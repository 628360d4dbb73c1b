//! Headless mode for the companion.
//!
//! A simple line-oriented interface for running the companion without a
//! TUI. It's designed for scripted testing and piping.

use companion_core::resources::{EMERGENCY_NOTICE, HELPLINE_DIRECTORY};
use companion_core::{ChatSession, ReplyKind, FOUR_SEVEN_EIGHT, HOTLINES};
use std::io::{self, BufRead, Write};

use crate::ui::render::{CAPTION, TITLE};

const HELP: &str = "\
[HELP]
  #quit        - Exit
  #help        - Show this help
  #resources   - Show emergency resources
  #breathe     - Show the 4-7-8 breathing pattern
  #transcript  - Print the conversation as JSON
  #reset       - Start a new conversation
  (anything else is sent as a message)";

/// Run the companion over stdin/stdout.
pub async fn run_headless(session: ChatSession) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(session, stdin.lock(), stdout.lock()).await
}

/// Run the line protocol over arbitrary reader and writer:
/// - Lines starting with `#` are commands
/// - Every other non-empty line is a message
/// - Replies are printed as `[COMPANION]`, `[CRISIS]`, `[FILTERED]` or `[ERROR]` blocks
pub async fn run_with_io<R: BufRead, W: Write>(
    mut session: ChatSession,
    input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "=== {TITLE} ===")?;
    writeln!(out, "{CAPTION}")?;
    writeln!(out, "Type #help for commands. Share whatever is on your mind.")?;
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    writeln!(out, "Take care of yourself. Goodbye!")?;
                    break;
                }
                "help" => writeln!(out, "{HELP}")?,
                "resources" => write_resources(&mut out)?,
                "breathe" => {
                    writeln!(out, "[BREATHE] {}", FOUR_SEVEN_EIGHT.name)?;
                    writeln!(out, "{}", FOUR_SEVEN_EIGHT.summary())?;
                }
                "transcript" => match session.transcript().to_json() {
                    Ok(json) => writeln!(out, "[TRANSCRIPT]\n{json}")?,
                    Err(e) => writeln!(out, "[ERROR] Could not render transcript: {e}")?,
                },
                "reset" => {
                    session.reset();
                    writeln!(out, "[RESET] Starting a new conversation.")?;
                }
                _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
            }
            writeln!(out)?;
            out.flush()?;
            continue;
        }

        match session.send(line).await {
            Ok(reply) => {
                let tag = match reply.kind {
                    ReplyKind::Generated => "[COMPANION]",
                    ReplyKind::SafetyIntercept => "[CRISIS]",
                    ReplyKind::ContentFiltered => "[FILTERED]",
                };
                writeln!(out, "{tag}")?;
                writeln!(out, "{}", reply.content)?;
            }
            Err(e) => {
                writeln!(out, "[ERROR] {}", e.user_message())?;
            }
        }
        writeln!(out)?;
        out.flush()?;
    }

    Ok(())
}

fn write_resources<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "[RESOURCES]")?;
    writeln!(out, "{EMERGENCY_NOTICE}")?;
    for hotline in HOTLINES {
        writeln!(out, "  {}: {}", hotline.name, hotline.contact)?;
    }
    writeln!(out, "  Find a Crisis Hotline: {HELPLINE_DIRECTORY}")
}
