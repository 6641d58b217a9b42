//! # Invocation Handler
//!
//! Serves invocations as JSON lines: one `Invocation` object per input line,
//! one `InvocationResponse` object per output line, in request order.
//! Blank lines are ignored. Lines that do not decode get a 400 response.
//! Shutdown is only observed between requests; an invocation that has
//! started always finishes and gets its response written.

use consent_contract::{ContractHost, Invocation, InvocationResponse};
use std::future::{self, Future};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};
use world_state::KeyValueStore;

/// Transport failures. Invocation failures are reported in-band.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invocation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Counters for one `serve` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    pub requests: u64,
    pub failures: u64,
}

/// Decode and run one request line. `None` for blank lines.
pub fn handle_line<B: KeyValueStore>(host: &ContractHost<B>, line: &str) -> Option<InvocationResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let response = match serde_json::from_str::<Invocation>(line) {
        Ok(invocation) => {
            debug!(function = %invocation.function, args = invocation.args.len(), "Invocation received");
            host.invoke(&invocation)
        }
        Err(e) => {
            warn!(error = %e, "Malformed invocation");
            InvocationResponse::bad_request(format!("malformed invocation: {e}"))
        }
    };
    Some(response)
}

/// Serve requests from `input` until it reaches EOF.
pub async fn serve<B, R, W>(
    host: Arc<ContractHost<B>>,
    input: R,
    output: W,
) -> Result<ServeSummary, ServeError>
where
    B: KeyValueStore + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_until(host, input, output, future::pending()).await
}

/// Serve requests from `input` until EOF or until `shutdown` completes.
pub async fn serve_until<B, R, W, S>(
    host: Arc<ContractHost<B>>,
    input: R,
    mut output: W,
    shutdown: S,
) -> Result<ServeSummary, ServeError>
where
    B: KeyValueStore + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut summary = ServeSummary::default();
    tokio::pin!(shutdown);

    loop {
        // `next_line` is cancel safe, so losing the race drops no input.
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, no further requests accepted");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        let worker = Arc::clone(&host);
        // Storage calls may block on disk.
        let response = tokio::task::spawn_blocking(move || handle_line(&worker, &line)).await?;
        let Some(response) = response else {
            continue;
        };

        summary.requests += 1;
        if !response.is_success() {
            summary.failures += 1;
        }

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
    }

    info!(
        requests = summary.requests,
        failures = summary.failures,
        "Invocation loop stopped"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_state::{InMemoryKVStore, Ledger};

    fn host() -> Arc<ContractHost<InMemoryKVStore>> {
        Arc::new(ContractHost::new(Arc::new(Ledger::in_memory()), "consent").unwrap())
    }

    fn responses(output: &[u8]) -> Vec<InvocationResponse> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_blank_and_malformed_lines() {
        let host = host();
        assert!(handle_line(&host, "   ").is_none());

        let response = handle_line(&host, "{not json").unwrap();
        assert_eq!(response.status, InvocationResponse::BAD_REQUEST);
        assert!(response.tx_id.is_none());

        let response = handle_line(&host, r#"{"args":["c1"]}"#).unwrap();
        assert_eq!(response.status, InvocationResponse::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_serve_answers_in_order() {
        let input = concat!(
            r#"{"function":"InitLedger"}"#,
            "\n",
            r#"{"function":"ReadConsent","args":["consent3"]}"#,
            "\n\n",
            r#"{"function":"DeleteConsent","args":["nope"]}"#,
            "\n",
            "garbage\n",
            r#"{"function":"GetConsentsByUser","args":["user1"]}"#,
            "\n",
        );
        let mut output = Vec::new();

        let summary = serve(host(), input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(summary, ServeSummary { requests: 5, failures: 2 });

        let responses = responses(&output);
        assert_eq!(responses.len(), 5);
        assert!(responses[0].is_success());
        assert_eq!(responses[1].payload["purpose"], "service-improvement");
        assert_eq!(responses[2].message, "the consent nope does not exist");
        assert_eq!(responses[3].status, InvocationResponse::BAD_REQUEST);
        assert_eq!(responses[4].payload.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_between_requests() {
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let (client_read, mut client_write) = tokio::io::split(client);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let worker = tokio::spawn(serve_until(
            host(),
            tokio::io::BufReader::new(server_read),
            server_write,
            async move {
                let _ = stop_rx.await;
            },
        ));

        client_write
            .write_all(b"{\"function\":\"InitLedger\"}\n")
            .await
            .unwrap();
        let mut replies = tokio::io::BufReader::new(client_read).lines();
        let first: InvocationResponse =
            serde_json::from_str(&replies.next_line().await.unwrap().unwrap()).unwrap();
        assert!(first.is_success());

        // The client never closes its side; only the signal ends the loop.
        stop_tx.send(()).unwrap();
        let summary = worker.await.unwrap().unwrap();
        assert_eq!(summary, ServeSummary { requests: 1, failures: 0 });
    }
}
