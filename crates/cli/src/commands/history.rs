//! `chatling history` — Print recent rows from the persisted transcript.

use chatling_config::AppConfig;

pub async fn run(n: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.require_secrets()?;

    let store = super::build_store(&config);
    let rows = store
        .load_recent(n)
        .await
        .map_err(|e| format!("Failed to read the transcript store: {e}"))?;

    if rows.is_empty() {
        println!("  (transcript is empty)");
        return Ok(());
    }

    for msg in &rows {
        println!("{}: {}", msg.role, msg.content);
    }

    Ok(())
}
