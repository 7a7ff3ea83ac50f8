//! Protocol Client
//!
//! Helpers that open one connection per request, send a single command line and read
//! the reply until the server closes the connection.

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Sends `line` (newline appended if missing) and returns the raw reply.
pub async fn send_command(addr: &str, line: &str) -> Result<String> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to {}", addr))?;

    stream.write_all(line.as_bytes()).await?;
    if !line.ends_with('\n') {
        stream.write_all(b"\n").await?;
    }

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .with_context(|| format!("Failed to read reply from {}", addr))?;
    Ok(response)
}

/// Uploads a document. Line breaks in `content` are sent as spaces so the request
/// stays on one line.
///
/// Filenames containing whitespace are rejected before connecting: the server would
/// split them into a shorter name plus content.
pub async fn add_document(addr: &str, filename: &str, content: &str) -> Result<String> {
    if filename.is_empty() || filename.contains(char::is_whitespace) {
        return Err(anyhow::anyhow!(
            "Filename {:?} cannot be sent: names must be non-empty and contain no whitespace",
            filename
        ));
    }
    let content = content.replace(['\r', '\n'], " ");
    send_command(addr, &format!("ADD {} {}", filename, content)).await
}

pub async fn delete_document(addr: &str, filename: &str) -> Result<String> {
    send_command(addr, &format!("DELETE {}", filename)).await
}

/// Returns the filenames posted under `term`, one entry per occurrence.
pub async fn search(addr: &str, term: &str) -> Result<Vec<String>> {
    let reply = send_command(addr, &format!("SEARCH {}", term)).await?;
    Ok(reply.lines().map(str::to_string).collect())
}

pub async fn check_index(addr: &str) -> Result<i64> {
    let reply = send_command(addr, "CHECK_INDEX").await?;
    reply
        .trim()
        .parse()
        .with_context(|| format!("Unexpected CHECK_INDEX reply: {:?}", reply))
}

pub async fn stats(addr: &str) -> Result<serde_json::Value> {
    let reply = send_command(addr, "STATS").await?;
    serde_json::from_str(reply.trim()).with_context(|| format!("Unexpected STATS reply: {:?}", reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_add_document_rejects_whitespace_filename_without_connecting() {
        // ARRANGE: A listener that must never see a connection
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        // ACT
        let spaced = add_document(&addr, "my file.txt", "hello").await.unwrap_err();
        let tabbed = add_document(&addr, "my\tfile.txt", "hello").await.unwrap_err();

        // ASSERT
        assert!(spaced.to_string().contains("no whitespace"));
        assert!(tabbed.to_string().contains("no whitespace"));
        let accepted =
            tokio::time::timeout(std::time::Duration::from_millis(100), listener.accept()).await;
        assert!(accepted.is_err(), "Client connected for an invalid filename");
    }
}
