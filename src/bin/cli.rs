//! LineStore CLI
//!
//! Command-line interface for a local LineStore database.

use std::process;

use clap::{Parser, Subcommand};
use linestore::{Line, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// LineStore CLI
#[derive(Parser, Debug)]
#[command(name = "linestore-cli")]
#[command(about = "CLI for the LineStore append-only line store")]
#[command(version)]
struct Args {
    /// Data file path (the index lives at <db>.idx)
    #[arg(short, long, default_value = "linestore.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a value, printing its line number
    Set {
        /// The value to append
        value: String,
    },

    /// Get the value stored at a line
    Get {
        /// The line number
        line: u64,
    },

    /// List every line
    List {
        /// Newest first
        #[arg(short, long)]
        reverse: bool,
    },

    /// Print the last line number
    Last,

    /// Rewrite the store files in place
    Polish,

    /// Copy the store to another path
    Backup {
        /// Destination data file path
        dest: String,

        /// Request a polished copy
        #[arg(long)]
        polished: bool,
    },

    /// Append two lines and walk through every read operation
    Demo,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linestore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("LineStore CLI v{}", linestore::VERSION);

    let store = match Store::open(&args.db) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open store {}: {}", args.db, e);
            process::exit(1);
        }
    };

    let outcome = run(&store, args.command);
    let closed = store.close();

    if let Err(e) = outcome.and(closed) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(store: &Store, command: Commands) -> linestore::Result<()> {
    match command {
        Commands::Set { value } => {
            let line = store.set(value.as_bytes())?;
            println!("{}", line);
        }
        Commands::Get { line } => {
            let value = store.get(line)?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::List { reverse } => {
            let lines = if reverse {
                store.list_reverse()?
            } else {
                store.list()?
            };
            print_lines(&lines);
        }
        Commands::Last => {
            println!("{}", store.last_line()?);
        }
        Commands::Polish => {
            let report = store.polish()?;
            println!(
                "Polished {} lines ({} -> {} bytes), backup at {}",
                report.records,
                report.bytes_before,
                report.bytes_after,
                report.backup_path.display()
            );
        }
        Commands::Backup { dest, polished } => {
            let report = store.backup(&dest, polished)?;
            println!(
                "Backed up {} data bytes (crc {:08x}) and {} index bytes (crc {:08x}) to {}",
                report.data_bytes,
                report.data_crc,
                report.index_bytes,
                report.index_crc,
                report.data_path.display()
            );
        }
        Commands::Demo => demo(store)?,
    }
    Ok(())
}

fn demo(store: &Store) -> linestore::Result<()> {
    let first = store.set("Hello, Line Store! 👋".as_bytes())?;
    store.set(b"Goodbye!")?;

    println!("List from beginning:");
    print_lines(&store.list()?);

    println!("\nList from end!");
    print_lines(&store.list_reverse()?);

    println!("\nLast line number: {}", store.last_line()?);

    let value = store.get(first)?;
    println!("\nGet line {}: {}", first, String::from_utf8_lossy(&value));
    Ok(())
}

fn print_lines(lines: &[Line]) {
    for line in lines {
        println!("Line {}: {}", line.line, String::from_utf8_lossy(&line.value));
    }
}
