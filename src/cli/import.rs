//! Import command implementation

use anyhow::Result;
use std::path::PathBuf;

use crate::import::Importer;
use crate::store::LogStore;

pub fn run(store: &LogStore, logs_path: Option<PathBuf>) -> Result<()> {
    let importer = Importer::new(store, logs_path);
    println!(
        "Importing Claude Code logs from {}\n",
        importer.base_path().display()
    );

    let stats = importer.run()?;

    if stats.files == 0 {
        println!("No session files found.");
        return Ok(());
    }

    println!(
        "{} files: {} new messages, {} already imported",
        stats.files, stats.messages, stats.skipped
    );
    if stats.malformed > 0 {
        println!("{} malformed entries dropped (see warnings)", stats.malformed);
    }

    println!("\n✅ Import complete!");
    Ok(())
}
