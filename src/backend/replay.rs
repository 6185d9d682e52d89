//! Trace Replay Backend
//!
//! Feeds the daemon from a recorded JSONL trace instead of a live window
//! system. One record per line:
//!
//! ```text
//! {"event":"layout","t":0.0,"x":960,"y":540,"monitors":[{"x":0,"y":0,"width":1920,"height":1080}]}
//! {"event":"motion","t":0.016,"x":964,"y":540,"dx":4.0,"dy":0.0}
//! ```
//!
//! `t` is seconds since the start of the trace, mapped onto a fixed base
//! instant taken when the trace is opened; a trace therefore produces the
//! same decisions on every run regardless of how fast it is consumed.
//! Blank lines and lines starting with `#` are skipped, which keeps
//! hand-written traces readable.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use super::{Backend, BackendError, BackendEvent, Result};
use crate::monitor::MonitorRect;

// Ceiling for trace timestamps. Far below the Duration and Instant
// overflow ranges; no real trace runs for decades.
const MAX_TRACE_SECONDS: f64 = 1e9;

/// One line of a trace file
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum TraceRecord {
    Motion {
        t: f64,
        x: i32,
        y: i32,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
    },
    Layout {
        t: f64,
        x: i32,
        y: i32,
        monitors: Vec<MonitorRect>,
    },
}

/// Backend that replays a recorded trace file
pub struct ReplayBackend {
    lines: Lines<BufReader<File>>,
    base: Instant,
    line: usize,
    held: Option<(i32, i32)>,
}

impl ReplayBackend {
    /// Open a trace file for replay
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .map_err(|source| BackendError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
            base: Instant::now(),
            line: 0,
            held: None,
        })
    }

    /// Clamp position of the last hold, while confinement is engaged
    pub fn held(&self) -> Option<(i32, i32)> {
        self.held
    }

    fn stamp(&self, t: f64) -> Result<Instant> {
        if !t.is_finite() || t < 0.0 || t > MAX_TRACE_SECONDS {
            return Err(BackendError::BadTimestamp {
                line: self.line,
                value: t,
            });
        }
        Ok(self.base + Duration::from_secs_f64(t))
    }
}

#[async_trait]
impl Backend for ReplayBackend {
    async fn next_event(&mut self) -> Result<Option<BackendEvent>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let record: TraceRecord =
                serde_json::from_str(trimmed).map_err(|source| BackendError::MalformedTrace {
                    line: self.line,
                    source,
                })?;

            let event = match record {
                TraceRecord::Motion { t, x, y, dx, dy } => BackendEvent::Motion {
                    timestamp: self.stamp(t)?,
                    x,
                    y,
                    dx,
                    dy,
                },
                TraceRecord::Layout { t, x, y, monitors } => BackendEvent::Layout {
                    timestamp: self.stamp(t)?,
                    monitors,
                    position: (x, y),
                },
            };
            return Ok(Some(event));
        }
    }

    async fn hold_pointer(&mut self, x: i32, y: i32) -> Result<()> {
        if self.held.is_none() {
            debug!(x, y, "confinement engaged");
        }
        self.held = Some((x, y));
        Ok(())
    }

    async fn release_pointer(&mut self) -> Result<()> {
        if self.held.take().is_some() {
            debug!("confinement released");
        }
        Ok(())
    }
}
