//! `chatling chat` — Interactive or single-message chat mode.

use chatling_config::AppConfig;
use chatling_session::{Session, SessionOptions};
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check secrets early — give a clear error before anything connects
    if let Err(e) = config.require_secrets() {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  Chatling needs these settings before chat can start:");
        eprintln!("    CHATLING_API_KEY      (or GEMINI_API_KEY)  — completion service key");
        eprintln!("    CHATLING_SHEET_ID                          — transcript sheet id");
        eprintln!("    CHATLING_SHEET_TOKEN                       — transcript sheet credential");
        eprintln!();
        eprintln!("  Or add them to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  For a purely local run, set CHATLING_STORE=file.");
        eprintln!();
        return Err("Missing configuration. See above for setup instructions.".into());
    }

    let store = super::build_store(&config);
    let client = super::build_completion(&config);
    let persona = config.persona();
    let persona_name = persona.name.clone();

    let options = SessionOptions {
        window_size: config.session.window_size,
        history_load: config.session.history_load,
        repair_budget: config.session.repair_budget,
    };

    // Loading history is fatal when it fails: a session never starts
    // detached from its log.
    let mut session = Session::start(
        client,
        store,
        persona,
        config.generation.clone(),
        options,
    )
    .await
    .map_err(|e| format!("Failed to connect to the transcript store: {e}"))?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  ...");
        let reply = session.turn(&msg).await;
        eprint!("\r     \r");
        println!("{reply}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Chatling — {persona_name}");
    println!();
    println!("  Model:   {} (fallback: {})", config.primary_model, config.fallback_model);
    println!("  Store:   {}", config.store.backend);
    println!();

    // Show the tail of the conversation loaded from the log
    if !session.transcript().is_empty() {
        for msg in &session.transcript().messages {
            println!("  {} > {}", session.persona().label_for(msg.role), msg.content);
        }
        println!();
    }

    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    print!("  You > ");
                    std::io::stdout().flush()?;
                    continue;
                }

                if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
                    break;
                }

                eprint!("  ...");
                let reply = session.turn(&line).await;
                eprint!("\r     \r");

                println!();
                for reply_line in reply.lines() {
                    println!("  {persona_name} > {reply_line}");
                }
                println!();

                print!("  You > ");
                std::io::stdout().flush()?;
            }
            Ok(None) => break, // EOF (Ctrl+D)
            Err(e) => {
                eprintln!("  [Input error] {e}");
                break;
            }
        }
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}
