//! Replays a JSON-lines landmark recording in real time.
//!
//! Each line is one camera frame:
//!
//! ```json
//! {"t": 1033.4, "hands": [{"handedness": "Left", "landmarks": [{"x": 0.5, "y": 0.8, "z": 0.0}, ...]}]}
//! ```
//!
//! `t` is in milliseconds and only its differences matter. Frames without it
//! are spaced [`DEFAULT_FRAME_INTERVAL_MS`] apart.

use crate::events::{AppEvent, TrackingFrame};
use async_channel::Sender;
use handmark::{Handedness, Landmark};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 33.0;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Recording I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedHand {
    #[serde(alias = "label")]
    pub handedness: Handedness,
    pub landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub hands: Vec<RecordedHand>,
}

impl RecordedFrame {
    pub fn into_frame(self) -> TrackingFrame {
        let timestamp = self.t.unwrap_or_default();
        TrackingFrame::from_raw(
            self.hands.into_iter().map(|h| (h.handedness, h.landmarks)),
            timestamp,
        )
    }
}

/// Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str, number: usize) -> Result<Option<RecordedFrame>, ReplayError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| ReplayError::Parse {
            line: number,
            source,
        })
}

pub async fn run_replay(path: PathBuf, tx: Sender<AppEvent>) {
    match replay(&path, &tx).await {
        Ok(sent) => log::info!("Replayed {} frames from {}", sent, path.display()),
        Err(e) => log::error!("Replay of {} failed: {}", path.display(), e),
    }
    let _ = tx.send(AppEvent::ReplayFinished).await;
}

async fn replay(path: &Path, tx: &Sender<AppEvent>) -> Result<usize, ReplayError> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let start = Instant::now();
    let mut first_t = None;
    let mut offset = 0.0;
    let mut number = 0;
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        number += 1;
        let frame = match parse_line(&line, number) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping recording line: {}", e);
                continue;
            }
        };

        offset = match frame.t {
            Some(t) => t - *first_t.get_or_insert(t),
            None if sent == 0 => 0.0,
            None => offset + DEFAULT_FRAME_INTERVAL_MS,
        };
        tokio::time::sleep_until(start + Duration::from_secs_f64(offset.max(0.0) / 1000.0)).await;

        if tx.send(AppEvent::Frame(frame.into_frame())).await.is_err() {
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
