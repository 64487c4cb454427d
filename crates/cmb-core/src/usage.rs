//! Command-usage sink: append-only JSON lines, one record per dispatched
//! command. Fire-and-forget from the pipeline's point of view.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::Serialize;

use crate::{domain::SenderId, ports::CommandUsageSink, Result};

#[derive(Clone, Debug, Serialize)]
struct UsageRecord<'a> {
    timestamp: &'a str,
    command: &'a str,
    sender: &'a str,
}

#[derive(Clone, Debug)]
pub struct JsonUsageLog {
    path: PathBuf,
}

impl JsonUsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &UsageRecord<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[async_trait]
impl CommandUsageSink for JsonUsageLog {
    async fn record(&self, command: &str, sender: &SenderId, timestamp: &str) -> Result<()> {
        self.append(&UsageRecord {
            timestamp,
            command,
            sender: sender.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.log"))
    }

    #[tokio::test]
    async fn records_are_one_json_line_each() {
        let log = JsonUsageLog::new(tmp_file("cmb-usage-test"));
        let sender = SenderId("a@c.us".to_string());

        log.record("ping", &sender, "2026-08-30T12:00:00Z")
            .await
            .unwrap();
        log.record("roll", &sender, "2026-08-30T12:00:01Z")
            .await
            .unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["command"], "ping");
        assert_eq!(first["sender"], "a@c.us");
    }
}
