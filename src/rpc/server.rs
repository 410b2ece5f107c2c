//! Line-delimited stdio transport.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::dispatch::Dispatcher;

/// Serve requests one at a time: read a line, run the handler to
/// completion (including any retry backoff or assertion polling it
/// sleeps through), write one response line, then read the next.
pub async fn serve(dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let response = dispatcher.handle_line(message).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
