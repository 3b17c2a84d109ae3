//! Resilient download with ordered transport fallback.
//!
//! Four transports are tried in a fixed order: an external `curl` process,
//! a streaming HTTP client, a worker-thread fetch guarded by a stall
//! watchdog, and an external `wget` child polled for liveness and file
//! growth. Every transport writes to a fresh scratch file and renames it
//! into place only after a non-empty check, so a failed transfer never
//! leaves a partial file at the destination.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::acquire::first_success;
use crate::core::PipelineError;
use crate::util::config::NetConfig;
use crate::util::fs::{persist_nonempty, scratch_file_for};
use crate::util::process::{find_executable, ProcessBuilder};

/// Streaming read/write chunk size (1 MiB).
const CHUNK_SIZE: usize = 1024 * 1024;

/// Poll interval for the watchdog and child-polling transports.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A byte-progress snapshot handed to the caller's observer.
#[derive(Debug, Clone, Copy)]
pub struct TransferUpdate {
    pub downloaded: u64,
    pub total: Option<u64>,
}

/// Synchronous progress observer supplied by the caller.
pub type ProgressFn<'a> = &'a mut dyn FnMut(TransferUpdate);

/// One way to move bytes from a URL to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStrategy {
    /// External `curl` process with retries and timeouts.
    CurlProcess,
    /// Streaming HTTP client, 1 MiB chunks, progress per chunk.
    HttpStream,
    /// Worker-thread fetch with a no-progress stall watchdog.
    ThreadedFetch,
    /// External `wget` child polled for state and file growth.
    WgetProcess,
}

impl TransportStrategy {
    /// The fixed attempt order.
    pub const ORDER: [TransportStrategy; 4] = [
        TransportStrategy::CurlProcess,
        TransportStrategy::HttpStream,
        TransportStrategy::ThreadedFetch,
        TransportStrategy::WgetProcess,
    ];
}

impl fmt::Display for TransportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportStrategy::CurlProcess => "curl",
            TransportStrategy::HttpStream => "http-stream",
            TransportStrategy::ThreadedFetch => "threaded-fetch",
            TransportStrategy::WgetProcess => "wget",
        };
        f.write_str(name)
    }
}

/// Downloads one remote resource to a local path, falling through the
/// transport order until a strategy completes.
#[derive(Debug, Clone)]
pub struct Downloader {
    net: NetConfig,
}

impl Downloader {
    pub fn new(net: NetConfig) -> Self {
        Downloader { net }
    }

    /// Fetch `url` into `out`.
    ///
    /// On success `out` is complete and non-empty; on failure it does not
    /// exist (no transport persists a partial or empty payload).
    pub fn download(
        &self,
        url: &str,
        out: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<(), PipelineError> {
        info!("downloading {} -> {}", url, out.display());

        let result = first_success("download", &TransportStrategy::ORDER, |strategy| {
            self.attempt(*strategy, url, out, &mut *progress)
        });

        match result {
            Some(()) => Ok(()),
            None => Err(PipelineError::Download {
                url: url.to_string(),
            }),
        }
    }

    fn attempt(
        &self,
        strategy: TransportStrategy,
        url: &str,
        out: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<()> {
        match strategy {
            TransportStrategy::CurlProcess => self.via_curl(url, out, progress),
            TransportStrategy::HttpStream => self.via_http_stream(url, out, progress),
            TransportStrategy::ThreadedFetch => self.via_threaded(url, out, progress),
            TransportStrategy::WgetProcess => self.via_wget(url, out, progress),
        }
    }

    /// External command-line transfer utility.
    fn via_curl(&self, url: &str, out: &Path, progress: ProgressFn<'_>) -> Result<()> {
        let curl = find_executable("curl").context("curl not found on PATH")?;
        let scratch = scratch_file_for(out)?;

        ProcessBuilder::new(curl)
            .args(["-L", "--fail", "--silent", "--show-error"])
            .arg("--retry")
            .arg(self.net.retries.to_string())
            .arg("--connect-timeout")
            .arg(self.net.connect_timeout_secs.to_string())
            .arg("--max-time")
            .arg(self.net.timeout_secs.to_string())
            .arg("-o")
            .arg(scratch.path())
            .arg(url)
            .output_checked()?;

        let downloaded = scratch.as_file().metadata().map(|m| m.len()).unwrap_or(0);
        progress(TransferUpdate {
            downloaded,
            total: Some(downloaded),
        });
        persist_nonempty(scratch, out)
    }

    /// Streaming HTTP client: metadata probe for the content length, then
    /// the body in fixed-size chunks with progress after each chunk.
    fn via_http_stream(&self, url: &str, out: &Path, progress: ProgressFn<'_>) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(self.net.connect_timeout_secs))
            .timeout(Duration::from_secs(self.net.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let total = client
            .head(url)
            .send()
            .ok()
            .filter(|r| r.status().is_success())
            .and_then(|r| {
                r.headers()
                    .get(reqwest::header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
            });
        debug!("content length probe: {:?}", total);

        let mut response = client
            .get(url)
            .send()
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("server rejected {}", url))?;

        let mut scratch = scratch_file_for(out)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            let n = response.read(&mut buffer).context("read from body failed")?;
            if n == 0 {
                break;
            }
            scratch.write_all(&buffer[..n]).context("write to scratch failed")?;
            downloaded += n as u64;
            progress(TransferUpdate { downloaded, total });
        }

        persist_nonempty(scratch, out)
    }

    /// Worker-thread fetch with a stall watchdog.
    ///
    /// The worker streams the body into the scratch file and bumps a shared
    /// byte counter; this thread polls the counter and abandons the transfer
    /// after `stall_window_secs` without progress, letting the next strategy
    /// take over.
    fn via_threaded(&self, url: &str, out: &Path, progress: ProgressFn<'_>) -> Result<()> {
        let scratch = scratch_file_for(out)?;
        let scratch_path = scratch.path().to_path_buf();

        let bytes = Arc::new(AtomicU64::new(0));
        let total = Arc::new(AtomicU64::new(0));
        let (done_tx, done_rx) = mpsc::channel::<Result<()>>();

        let worker_bytes = Arc::clone(&bytes);
        let worker_total = Arc::clone(&total);
        let worker_url = url.to_string();
        let connect_timeout = Duration::from_secs(self.net.connect_timeout_secs);

        std::thread::Builder::new()
            .name("acfgen-fetch".to_string())
            .spawn(move || {
                let result = (|| -> Result<()> {
                    let client = reqwest::blocking::Client::builder()
                        .connect_timeout(connect_timeout)
                        .timeout(None)
                        .build()
                        .context("failed to build HTTP client")?;
                    let mut response = client
                        .get(&worker_url)
                        .send()
                        .with_context(|| format!("request to {} failed", worker_url))?
                        .error_for_status()?;
                    if let Some(len) = response.content_length() {
                        worker_total.store(len, Ordering::SeqCst);
                    }
                    let mut file = std::fs::File::create(&scratch_path)
                        .context("failed to open scratch file")?;
                    let mut buffer = vec![0u8; CHUNK_SIZE];
                    loop {
                        let n = response.read(&mut buffer).context("read from body failed")?;
                        if n == 0 {
                            break;
                        }
                        file.write_all(&buffer[..n]).context("write to scratch failed")?;
                        worker_bytes.fetch_add(n as u64, Ordering::SeqCst);
                    }
                    Ok(())
                })();
                let _ = done_tx.send(result);
            })
            .context("failed to spawn fetch worker")?;

        let started = Instant::now();
        let mut last_advance = Instant::now();
        let mut last_bytes: u64 = 0;
        let stall_window = Duration::from_secs(self.net.stall_window_secs);
        let deadline = Duration::from_secs(self.net.timeout_secs);

        loop {
            match done_rx.recv_timeout(POLL_INTERVAL) {
                Ok(result) => {
                    result?;
                    return persist_nonempty(scratch, out);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => bail!("fetch worker vanished"),
            }

            let current = bytes.load(Ordering::SeqCst);
            if current > last_bytes {
                last_bytes = current;
                last_advance = Instant::now();
                let t = total.load(Ordering::SeqCst);
                progress(TransferUpdate {
                    downloaded: current,
                    total: (t > 0).then_some(t),
                });
            }

            // Abandoning drops the scratch file; the orphaned worker writes
            // into an unlinked inode until its connection dies.
            if last_advance.elapsed() > stall_window {
                bail!(
                    "no byte progress for {}s, abandoning transfer",
                    stall_window.as_secs()
                );
            }
            if started.elapsed() > deadline {
                bail!("transfer exceeded {}s timeout", deadline.as_secs());
            }
        }
    }

    /// External managed transfer: a `wget` child polled for state and
    /// scratch-file growth until completion or timeout.
    fn via_wget(&self, url: &str, out: &Path, progress: ProgressFn<'_>) -> Result<()> {
        let wget = find_executable("wget").context("wget not found on PATH")?;
        let scratch = scratch_file_for(out)?;

        let mut child = ProcessBuilder::new(wget)
            .arg("-q")
            .arg("--tries")
            .arg((self.net.retries + 1).to_string())
            .arg("--timeout")
            .arg(self.net.connect_timeout_secs.to_string())
            .arg("-O")
            .arg(scratch.path())
            .arg(url)
            .spawn_quiet()?;

        let started = Instant::now();
        let deadline = Duration::from_secs(self.net.timeout_secs);

        loop {
            if let Some(status) = child.try_wait().context("failed to poll wget")? {
                if !status.success() {
                    bail!("wget exited with {:?}", status.code());
                }
                break;
            }
            let downloaded = scratch.as_file().metadata().map(|m| m.len()).unwrap_or(0);
            if downloaded > 0 {
                progress(TransferUpdate {
                    downloaded,
                    total: None,
                });
            }
            if started.elapsed() > deadline {
                let _ = child.kill();
                let _ = child.wait();
                bail!("wget exceeded {}s timeout", deadline.as_secs());
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        persist_nonempty(scratch, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_net() -> NetConfig {
        NetConfig {
            timeout_secs: 10,
            connect_timeout_secs: 2,
            retries: 0,
            stall_window_secs: 2,
        }
    }

    #[test]
    fn test_strategy_order_is_fixed() {
        assert_eq!(
            TransportStrategy::ORDER,
            [
                TransportStrategy::CurlProcess,
                TransportStrategy::HttpStream,
                TransportStrategy::ThreadedFetch,
                TransportStrategy::WgetProcess,
            ]
        );
    }

    #[test]
    fn test_failed_download_leaves_no_out_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("tool.zip");

        let downloader = Downloader::new(test_net());
        // Nothing listens on this port; every transport fails fast.
        let result = downloader.download("http://127.0.0.1:9/missing.zip", &out, &mut |_| {});

        assert!(matches!(result, Err(PipelineError::Download { .. })));
        assert!(!out.exists());
        // No scratch residue either.
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_http_stream_downloads_and_persists() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("payload.bin");

        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = wiremock::MockServer::start().await;
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .and(wiremock::matchers::path("/payload.bin"))
                .respond_with(
                    wiremock::ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]),
                )
                .mount(&server)
                .await;
            server
        });

        let downloader = Downloader::new(test_net());
        let url = format!("{}/payload.bin", server.uri());
        let mut seen = Vec::new();
        downloader
            .via_http_stream(&url, &out, &mut |u| seen.push(u.downloaded))
            .unwrap();

        assert_eq!(std::fs::read(&out).unwrap().len(), 4096);
        assert_eq!(seen.last().copied(), Some(4096));
    }

    #[test]
    fn test_http_stream_rejects_empty_body() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("empty.bin");

        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = wiremock::MockServer::start().await;
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .respond_with(wiremock::ResponseTemplate::new(200))
                .mount(&server)
                .await;
            server
        });

        let downloader = Downloader::new(test_net());
        let url = format!("{}/empty.bin", server.uri());
        let result = downloader.via_http_stream(&url, &out, &mut |_| {});

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_http_stream_surfaces_server_error() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nope.bin");

        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = wiremock::MockServer::start().await;
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .respond_with(wiremock::ResponseTemplate::new(500))
                .mount(&server)
                .await;
            server
        });

        let downloader = Downloader::new(test_net());
        let url = format!("{}/nope.bin", server.uri());
        let result = downloader.via_http_stream(&url, &out, &mut |_| {});

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_threaded_fetch_downloads() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("threaded.bin");

        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = wiremock::MockServer::start().await;
            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .respond_with(
                    wiremock::ResponseTemplate::new(200).set_body_bytes(vec![1u8; 1024]),
                )
                .mount(&server)
                .await;
            server
        });

        let downloader = Downloader::new(test_net());
        let url = format!("{}/threaded.bin", server.uri());
        downloader.via_threaded(&url, &out, &mut |_| {}).unwrap();

        assert_eq!(std::fs::read(&out).unwrap().len(), 1024);
    }
}
