//! List command implementation

use anyhow::Result;

use crate::store::LogStore;

pub fn run(store: &LogStore) -> Result<()> {
    let sessions = store.list_sessions()?;

    if sessions.is_empty() {
        println!("No sessions found. Run 'logbook import' first.");
        return Ok(());
    }

    println!(
        "{:<12} {:<10} {:>5} {:>14} {:<28} {}",
        "Updated", "Session", "Msgs", "Tokens", "Project", "Summary"
    );
    println!("{}", "-".repeat(100));

    for session in sessions {
        // Format timestamp
        let updated = session
            .updated_at
            .as_ref()
            .map(|ts| {
                if ts.len() >= 16 {
                    format!("{} {}", &ts[5..10], &ts[11..16])
                } else {
                    ts.clone()
                }
            })
            .unwrap_or_else(|| "-".to_string());

        let short_uuid = &session.session_uuid[..8.min(session.session_uuid.len())];

        let tokens = format!(
            "{}/{}",
            session.total_input_tokens, session.total_output_tokens
        );

        // Keep the tail of long project paths
        let project = session.project_path.as_deref().unwrap_or("-");
        let project = if project.len() > 28 {
            format!("...{}", &project[project.len() - 25..])
        } else {
            project.to_string()
        };

        let summary = session
            .summary
            .as_ref()
            .map(|s| {
                let s = s.lines().next().unwrap_or(s);
                if s.len() > 35 {
                    format!("{}...", &s[..32])
                } else {
                    s.to_string()
                }
            })
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<12} {:<10} {:>5} {:>14} {:<28} {}",
            updated, short_uuid, session.message_count, tokens, project, summary,
        );
    }

    Ok(())
}
