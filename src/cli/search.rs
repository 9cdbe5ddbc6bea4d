//! Search command implementation

use anyhow::Result;

use crate::store::LogStore;

pub fn run(store: &LogStore, query: &str, limit: usize) -> Result<()> {
    let hits = store.search(query, limit)?;

    if hits.is_empty() {
        println!("No matches for '{}'.", query);
        return Ok(());
    }

    println!("Found {} matching blocks:\n", hits.len());

    for hit in hits {
        let short_uuid = &hit.session_uuid[..8.min(hit.session_uuid.len())];
        println!(
            "[{}] {} {} ({})",
            short_uuid,
            hit.role.as_deref().unwrap_or(&hit.message_kind),
            hit.timestamp.as_deref().unwrap_or("?"),
            hit.block_type,
        );

        if let Some(text) = &hit.text_content {
            let line = text.lines().next().unwrap_or(text);
            if line.len() > 100 {
                println!("    {}...", &line[..97]);
            } else {
                println!("    {}", line);
            }
        }
        println!();
    }

    Ok(())
}
