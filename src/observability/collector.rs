//! Pluggable sinks for [`HistoryEntry`](super::HistoryEntry)s (spec §4.8).

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::HistoryEntry;

const DEFAULT_RING_CAPACITY: usize = 100;

/// A sink for [`HistoryEntry`]s. Submission failures are swallowed by the
/// [`ObservabilityWrapper`](super::ObservabilityWrapper) — this is best-effort
/// observability, never a reason to fail the caller's `generate`/`stream` call.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn submit(&self, entry: HistoryEntry) -> anyhow::Result<()>;
}

/// In-memory ring buffer; oldest entries are evicted once `capacity` is exceeded.
pub struct RingBufferCollector {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for RingBufferCollector {
    fn default() -> Self {
        RingBufferCollector::new(DEFAULT_RING_CAPACITY)
    }
}

impl RingBufferCollector {
    pub fn new(capacity: usize) -> Self {
        RingBufferCollector {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get_all(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    pub fn get_last(&self, n: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().unwrap();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[async_trait]
impl Collector for RingBufferCollector {
    async fn submit(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }
}

/// Append-only JSON-lines sink. Opened once in append mode; each submission writes
/// one newline-terminated JSON object under an internal lock so lines never
/// interleave.
pub struct JsonlFileCollector {
    file: Mutex<std::fs::File>,
}

impl JsonlFileCollector {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(JsonlFileCollector {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl Collector for JsonlFileCollector {
    async fn submit(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let line = serde_json::to_string(&entry)?;
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }
}

/// Fans a single entry out to every child collector. Returns the first error
/// encountered, if any, but still submits to every child.
#[derive(Default)]
pub struct CompositeCollector {
    children: Vec<std::sync::Arc<dyn Collector>>,
}

impl CompositeCollector {
    pub fn new(children: Vec<std::sync::Arc<dyn Collector>>) -> Self {
        CompositeCollector { children }
    }
}

#[async_trait]
impl Collector for CompositeCollector {
    async fn submit(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let mut first_error = None;
        for child in &self.children {
            if let Err(e) = child.submit(entry.clone()).await {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
