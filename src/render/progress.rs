//! FFmpeg output handling: record splitting, progress and log retention.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::time::Duration;

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("valid time regex")
});

/// Media timestamp in seconds from a status line such as
/// `frame=  150 fps= 30 time=00:00:05.00 speed=1.5x`.
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = TIME_REGEX.captures(line)?;
    let field = |i: usize| caps[i].parse::<f64>().ok();
    Some(field(1)? * 3600.0 + field(2)? * 60.0 + field(3)? + field(4)? / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub percent: u8,
    pub eta: Option<Duration>,
}

/// Turns timestamps into percentages that never go backwards.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: f64,
    last_percent: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: f64) -> Self {
        Self {
            total,
            last_percent: None,
        }
    }

    /// Progress for a status line, if it advances past the last report.
    pub fn observe(&mut self, line: &str, elapsed: Duration) -> Option<Progress> {
        self.update(parse_progress_time(line)?, elapsed)
    }

    pub fn update(&mut self, current: f64, elapsed: Duration) -> Option<Progress> {
        if self.total <= 0.0 || !current.is_finite() {
            return None;
        }
        let percent = (current / self.total * 100.0).clamp(0.0, 100.0) as u8;
        if self.last_percent.is_some_and(|last| percent <= last) {
            return None;
        }
        self.last_percent = Some(percent);

        let eta = (percent > 0).then(|| {
            let projected = elapsed.mul_f64(100.0 / f64::from(percent));
            projected.saturating_sub(elapsed)
        });
        Some(Progress { percent, eta })
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }
}

/// Splits a byte stream into records on both `\r` and `\n`.
///
/// FFmpeg rewrites its status line with carriage returns, so line-based
/// readers would only see progress once the run ends.
#[derive(Debug, Default)]
pub struct RecordSplitter {
    pending: Vec<u8>,
}

impl RecordSplitter {
    /// Complete, non-blank records found after appending `bytes`.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut records = Vec::new();
        for &byte in bytes {
            if byte == b'\r' || byte == b'\n' {
                if let Some(record) = self.take() {
                    records.push(record);
                }
            } else {
                self.pending.push(byte);
            }
        }
        records
    }

    /// Whatever trailing record remains at end of stream.
    pub fn finish(mut self) -> Option<String> {
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        let record = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        (!record.is_empty()).then_some(record)
    }
}

/// Keeps the last `capacity` lines of tool output.
#[derive(Debug, Clone)]
pub struct LogTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn joined(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}
