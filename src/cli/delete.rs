//! Delete command implementation

use anyhow::Result;

use crate::store::LogStore;

pub fn run(store: &LogStore, session_query: &str) -> Result<()> {
    let session = match store.get_session(session_query)? {
        Some(s) => s,
        None => {
            println!("Session '{}' not found.", session_query);
            return Ok(());
        }
    };

    // Messages and content blocks cascade
    store.delete_session(&session.session_uuid)?;

    println!(
        "Deleted session {} ({} messages).",
        session.session_uuid, session.message_count
    );
    Ok(())
}
