//! Stats command implementation

use anyhow::Result;

use crate::store::LogStore;

pub fn run(store: &LogStore) -> Result<()> {
    let stats = store.stats()?;

    println!("Sessions:       {}", stats.sessions);
    println!("Messages:       {}", stats.messages);
    println!("Content blocks: {}", stats.content_blocks);
    println!(
        "Tokens:         {} in / {} out",
        stats.total_input_tokens, stats.total_output_tokens
    );

    Ok(())
}
