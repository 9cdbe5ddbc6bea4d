//! Claude Code log importer
//!
//! Scans JSONL session files under `~/.claude/projects/<project>/<uuid>.jsonl`
//! and writes them through the store. Re-runs are idempotent: a per-project
//! watermark skips already-seen time ranges, and the unique constraint on
//! message UUIDs catches anything that slips past it.

pub mod entry;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::{LogStore, MessageInsert};
use entry::parse_line;

/// A discovered session log file. The file stem is the session UUID.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub session_uuid: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct ImportStats {
    /// Session files processed.
    pub files: usize,
    /// Messages inserted this run.
    pub messages: usize,
    /// Entries skipped as already imported (watermark or duplicate UUID).
    pub skipped: usize,
    /// Entries dropped as malformed (missing type, invalid JSON).
    pub malformed: usize,
}

pub struct Importer<'a> {
    store: &'a LogStore,
    base_path: PathBuf,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a LogStore, custom_path: Option<PathBuf>) -> Self {
        let base_path = custom_path.unwrap_or_else(|| {
            let home = dirs::home_dir().unwrap_or_default();
            home.join(".claude/projects")
        });
        Self { store, base_path }
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Find session files: one directory level per project, one JSONL file
    /// per session. Files whose stem is not a UUID are not session logs.
    pub fn discover(&self) -> Result<Vec<SessionFile>> {
        let mut files = vec![];

        if !self.base_path.exists() {
            return Ok(files);
        }

        for project_entry in std::fs::read_dir(&self.base_path)? {
            let project_dir = project_entry?.path();
            if !project_dir.is_dir() {
                continue;
            }

            for file_entry in std::fs::read_dir(&project_dir)? {
                let path = file_entry?.path();
                if !path.extension().map(|e| e == "jsonl").unwrap_or(false) {
                    continue;
                }

                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                if Uuid::parse_str(stem).is_err() {
                    debug!("Skipping non-session file: {}", path.display());
                    continue;
                }

                files.push(SessionFile {
                    session_uuid: stem.to_string(),
                    path,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Import everything newer than the per-project watermarks, then
    /// advance the watermarks. A failed file aborts the run; its
    /// transaction rolls back and the watermark stays put, so the next run
    /// picks up where this one left off.
    pub fn run(&self) -> Result<ImportStats> {
        let mut stats = ImportStats::default();
        let mut watermarks: HashMap<String, DateTime<Utc>> = HashMap::new();

        for file in self.discover()? {
            self.import_file(&file, &mut watermarks, &mut stats)
                .with_context(|| format!("Failed to import {}", file.path.display()))?;
            stats.files += 1;
        }

        for (project_path, timestamp) in &watermarks {
            self.store
                .set_last_import_timestamp(project_path, *timestamp)?;
        }

        Ok(stats)
    }

    fn import_file(
        &self,
        file: &SessionFile,
        watermarks: &mut HashMap<String, DateTime<Utc>>,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let reader = BufReader::new(
            File::open(&file.path)
                .with_context(|| format!("Failed to open {}", file.path.display()))?,
        );

        let mut entries = vec![];
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_line(&line) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "Malformed entry at {}:{}: {}",
                        file.path.display(),
                        line_number + 1,
                        e
                    );
                    stats.malformed += 1;
                }
            }
        }

        if entries.is_empty() {
            debug!("No entries in {}", file.path.display());
            return Ok(());
        }

        // The project path comes from the entries themselves, not the
        // encoded directory name
        let project_path = entries.iter().find_map(|e| e.cwd.clone());
        let watermark = match &project_path {
            Some(p) => self.store.last_import_timestamp(p)?,
            None => None,
        };

        let mut inserted = 0usize;
        self.store.transaction(|| {
            let session_id = self
                .store
                .upsert_session(&file.session_uuid, project_path.as_deref())?;

            for entry in &entries {
                if let (Some(mark), Some(ts)) = (watermark, entry.timestamp) {
                    if ts <= mark {
                        stats.skipped += 1;
                        continue;
                    }
                }

                // Summary entries carry no UUID, so dedup them by content
                if let Some(text) = &entry.summary {
                    if self.store.session_summary(session_id)?.as_deref() == Some(text.as_str()) {
                        stats.skipped += 1;
                        continue;
                    }
                }

                match self.store.insert_message(session_id, entry)? {
                    MessageInsert::Inserted(_) => {
                        stats.messages += 1;
                        inserted += 1;
                        self.store.add_session_tokens(
                            session_id,
                            entry.input_tokens.unwrap_or(0),
                            entry.output_tokens.unwrap_or(0),
                        )?;
                        if let Some(text) = &entry.summary {
                            self.store.set_session_summary(session_id, text)?;
                        }
                    }
                    MessageInsert::DuplicateUuid => stats.skipped += 1,
                }
            }

            Ok(())
        })?;

        info!(
            "Imported {} ({} of {} entries new)",
            file.path.display(),
            inserted,
            entries.len()
        );

        // Track the newest entry timestamp per project for the watermark
        if let Some(project_path) = project_path {
            if let Some(max_ts) = entries.iter().filter_map(|e| e.timestamp).max() {
                watermarks
                    .entry(project_path)
                    .and_modify(|current| {
                        if max_ts > *current {
                            *current = max_ts;
                        }
                    })
                    .or_insert(max_ts);
            }
        }

        Ok(())
    }
}
