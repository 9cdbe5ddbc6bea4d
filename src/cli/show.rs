//! Show command implementation

use anyhow::Result;

use crate::store::LogStore;

pub fn run(store: &LogStore, session_query: &str, tools: bool) -> Result<()> {
    let session = match store.get_session(session_query)? {
        Some(s) => s,
        None => {
            println!("Session '{}' not found.", session_query);
            return Ok(());
        }
    };

    println!("\n{}", "=".repeat(80));
    println!("Session: {}", session.session_uuid);
    if let Some(path) = &session.project_path {
        println!("Project: {}", path);
    }
    if let Some(summary) = &session.summary {
        println!("Summary: {}", summary);
    }
    println!(
        "Tokens: {} in / {} out",
        session.total_input_tokens, session.total_output_tokens
    );
    println!("{}", "=".repeat(80));

    let messages = store.get_messages(session.id)?;

    if messages.is_empty() {
        println!("\nNo messages found (this may be an empty session).");
        return Ok(());
    }

    for msg in messages {
        let label = msg.role.as_deref().unwrap_or(&msg.kind);
        println!(
            "\n[{}] ({})",
            label.to_uppercase(),
            msg.timestamp.as_deref().unwrap_or("?")
        );

        for block in store.get_content_blocks(msg.id)? {
            match block.block_type.as_str() {
                "text" => {
                    if let Some(text) = &block.text_content {
                        println!("{}", text);
                    }
                }
                "thinking" => {
                    if let Some(text) = &block.text_content {
                        println!("  [thinking] {}", truncate(text, 80));
                    }
                }
                "tool_use" => {
                    let name = block.tool_name.as_deref().unwrap_or("?");
                    if tools {
                        let input = block.tool_input.as_deref().unwrap_or("{}");
                        println!("  → {} {}", name, truncate(input, 100));
                    } else {
                        println!("  → {}", name);
                    }
                }
                "tool_result" => {
                    if tools {
                        if let Some(text) = &block.text_content {
                            println!("  ← {}", truncate(text, 100));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    if first_line.len() > max {
        format!("{}...", &first_line[..max - 3])
    } else {
        first_line.to_string()
    }
}
