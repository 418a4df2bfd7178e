//! tandem-ctl — command-line interface for the Tandem daemon.

use anyhow::{Context, Result};

mod cmd;

use cmd::{queue, sessions, status};

const DEFAULT_PORT: u16 = 9101;

fn print_usage() {
    println!("Usage: tandem-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                   Show connection counts and counters");
    println!("  sessions                 List active sessions");
    println!("  sessions inspect <id>    Show one session");
    println!("  sessions drop <id>       Tear down a session, notifying both members");
    println!("  queue                    List waiting connections, oldest first");
    println!();
    println!("Options:");
    println!("  --port <port>   Admin API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                 => status::cmd_status(port).await,
        ["sessions"]                    => sessions::cmd_session_list(port).await,
        ["sessions", "inspect", id]     => sessions::cmd_session_inspect(port, id).await,
        ["sessions", "drop", id]        => sessions::cmd_session_drop(port, id).await,
        ["queue"]                       => queue::cmd_queue(port).await,
        ["help"] | ["--help"] | ["-h"]  => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
