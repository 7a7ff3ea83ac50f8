use anyhow::{Context, Result};
use docindex::client;

const DEFAULT_SERVER: &str = "127.0.0.1:12345";

fn print_usage(program: &str) {
    eprintln!("Usage: {} [--server <addr:port>] <command>", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  add <dir>            Upload every regular file in <dir>");
    eprintln!("  delete <name>...     Delete documents by name");
    eprintln!("  search <term>        List documents containing <term>");
    eprintln!("  check                Print the indexed-files count");
    eprintln!("  stats                Print server diagnostics");
    eprintln!();
    eprintln!("Example: {} --server {} search program", program, DEFAULT_SERVER);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = if args.is_empty() {
        "docindex-client".to_string()
    } else {
        args.remove(0)
    };

    let mut server = std::env::var("DOCINDEX_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
    if args.first().map(String::as_str) == Some("--server") {
        if args.len() < 2 {
            print_usage(&program);
            std::process::exit(1);
        }
        server = args.remove(1);
        args.remove(0);
    }

    let Some(command) = args.first().cloned() else {
        print_usage(&program);
        std::process::exit(1);
    };
    let operands = &args[1..];

    match (command.as_str(), operands) {
        ("add", [dir]) => add_directory(&server, dir).await,
        ("delete", names) if !names.is_empty() => {
            for name in names {
                match client::delete_document(&server, name).await {
                    Ok(reply) => println!("DELETE {}: {}", name, reply.trim_end()),
                    Err(e) => tracing::error!("Error deleting {}: {:#}", name, e),
                }
            }
            Ok(())
        }
        ("search", [term]) => {
            let hits = client::search(&server, term).await?;
            println!("Search results for {:?} ({} hits):", term, hits.len());
            for hit in hits {
                println!("{}", hit);
            }
            Ok(())
        }
        ("check", []) => {
            println!("{}", client::check_index(&server).await?);
            Ok(())
        }
        ("stats", []) => {
            let stats = client::stats(&server).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        _ => {
            print_usage(&program);
            std::process::exit(1);
        }
    }
}

/// Sends one `ADD` per regular file in `dir`. Files that fail are reported and skipped.
async fn add_directory(server: &str, dir: &str) -> Result<()> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to open directory {}", dir))?;

    let mut sent = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();

        let content = match tokio::fs::read_to_string(entry.path()).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", entry.path().display(), e);
                continue;
            }
        };

        match client::add_document(server, &filename, &content).await {
            Ok(reply) => {
                println!("ADD {}: {}", filename, reply.trim_end());
                sent += 1;
            }
            Err(e) => tracing::error!("Failed to upload {}, skipped: {:#}", filename, e),
        }
    }

    tracing::info!("Uploaded {} documents from {}", sent, dir);
    Ok(())
}
