//! Hotword history persistence.
//!
//! File shape: `{ "last_cycle": <rfc3339 | null>, "hotwords": [{term, clout_history, occurrence_count}] }`.
//! A bare array of records (older files) is still accepted on read.
//! Writes go to `<path>.tmp` first and are renamed into place.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::hotword::HotwordRecord;

/// Everything a restart needs to continue where the last cycle stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Keyword-feed cursor: content published at or before this was already ingested.
    #[serde(default)]
    pub last_cycle: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hotwords: Vec<HotwordRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Full(Snapshot),
    Records(Vec<HotwordRecord>),
}

impl From<StoredSnapshot> for Snapshot {
    fn from(s: StoredSnapshot) -> Self {
        match s {
            StoredSnapshot::Full(s) => s,
            StoredSnapshot::Records(hotwords) => Snapshot {
                last_cycle: None,
                hotwords,
            },
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Read the stored snapshot. A missing file is an empty snapshot.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot> {
    match fs::read_to_string(path).await {
        Ok(s) => serde_json::from_str::<StoredSnapshot>(&s)
            .map(Snapshot::from)
            .with_context(|| format!("parsing hotword snapshot {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::default()),
        Err(e) => Err(e).with_context(|| format!("reading hotword snapshot {}", path.display())),
    }
}

/// Like [`read_snapshot`], but an unparsable file is moved to `<path>.corrupt`
/// and an empty snapshot is returned, so the next write cannot destroy it.
/// I/O failures (including a failed move) stay errors.
pub async fn load_or_quarantine(path: &Path) -> Result<Snapshot> {
    let raw = match fs::read_to_string(path).await {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Snapshot::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading hotword snapshot {}", path.display()))
        }
    };

    match serde_json::from_str::<StoredSnapshot>(&raw) {
        Ok(s) => Ok(s.into()),
        Err(parse_err) => {
            let aside = sibling(path, ".corrupt");
            fs::rename(path, &aside)
                .await
                .with_context(|| format!("moving corrupt snapshot to {}", aside.display()))?;
            tracing::warn!(
                target: "cycle",
                error = %parse_err,
                moved_to = %aside.display(),
                "hotword snapshot unreadable; starting empty"
            );
            Ok(Snapshot::default())
        }
    }
}

/// Write `snap` atomically, creating parent dirs as needed.
pub async fn write_snapshot(path: &Path, snap: &Snapshot) -> Result<usize> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let body = serde_json::to_vec_pretty(snap).context("serializing hotwords")?;
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, body)
        .await
        .with_context(|| format!("writing hotword snapshot {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing hotword snapshot {}", path.display()))?;
    Ok(snap.hotwords.len())
}
