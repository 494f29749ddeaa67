//! Shared utilities for integration testing: an in-memory fake analyzer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mystem_gateway::PipeChannel;
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// What the fake analyzer observed.
#[derive(Default)]
pub struct FakeStats {
    /// Lines read so far, in order.
    pub received: Mutex<Vec<String>>,
    /// Highest number of lines read but not yet answered.
    pub max_in_flight: AtomicUsize,
    in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl FakeStats {
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Start a fake analyzer and return the gateway's end of its pipes.
///
/// Lines are read as soon as they arrive (so a misbehaving caller that
/// writes twice is visible in `max_in_flight`), answered one at a time
/// after `delay_for(line)`, and rendered with `render(seq, line)`.
pub fn spawn_fake_analyzer<D, R>(delay_for: D, render: R) -> (PipeChannel, Arc<FakeStats>)
where
    D: Fn(&str) -> Duration + Send + 'static,
    R: Fn(u64, &str) -> String + Send + 'static,
{
    let (to_analyzer, analyzer_stdin) = duplex(64 * 1024);
    let (mut analyzer_stdout, from_analyzer) = duplex(64 * 1024);
    let stats = Arc::new(FakeStats::default());
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, String)>();

    let reader_stats = stats.clone();
    tokio::spawn(async move {
        let mut seq = 0u64;
        let mut lines = BufReader::new(analyzer_stdin).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let now = reader_stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            reader_stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
            reader_stats.received.lock().unwrap().push(line.clone());
            if tx.send((seq, line)).is_err() {
                break;
            }
            seq += 1;
        }
    });

    let writer_stats = stats.clone();
    tokio::spawn(async move {
        while let Some((seq, line)) = rx.recv().await {
            tokio::time::sleep(delay_for(&line)).await;
            writer_stats.in_flight.fetch_sub(1, Ordering::SeqCst);
            let reply = format!("{}\n", render(seq, &line));
            if analyzer_stdout.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    (PipeChannel::new(to_analyzer, from_analyzer), stats)
}

/// Answer tagged with the fake's sequence number.
#[allow(dead_code)]
pub fn tagged(seq: u64, line: &str) -> String {
    serde_json::json!({ "seq": seq, "text": line }).to_string()
}

/// mystem-style JSON: one analysis per whitespace-separated word.
#[allow(dead_code)]
pub fn mystem_json(_seq: u64, line: &str) -> String {
    let words: Vec<serde_json::Value> = line
        .split(' ')
        .map(|w| {
            serde_json::json!({
                "analysis": [{ "lex": w, "wt": 1, "gr": "" }],
                "text": w,
            })
        })
        .collect();
    serde_json::Value::Array(words).to_string()
}

/// Same delay for every line.
#[allow(dead_code)]
pub fn fixed(delay: Duration) -> impl Fn(&str) -> Duration + Send + 'static {
    move |_: &str| delay
}
