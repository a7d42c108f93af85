//! `chatling doctor` — Diagnose configuration and connectivity.

use chatling_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Chatling Doctor — Diagnostics");
    println!("================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ⚠️  No config file at {} — using defaults + env", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!();
            println!("  ⚠️  1 issue found. Fix the config before going further.");
            return Ok(());
        }
    };

    // Check secrets
    match config.require_secrets() {
        Ok(()) => println!("  ✅ Required secrets present (store: {})", config.store.backend),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    // Check the transcript store
    if config.require_secrets().is_ok() {
        let store = super::build_store(&config);
        match store.load_recent(1).await {
            Ok(rows) => println!(
                "  ✅ Transcript store reachable ({}, {} recent row(s) read)",
                store.name(),
                rows.len()
            ),
            Err(e) => {
                println!("  ❌ Transcript store unreachable: {e}");
                issues += 1;
            }
        }

        // Check the completion service
        let client = super::build_completion(&config);
        match client.health_check().await {
            Ok(true) => println!("  ✅ Completion service reachable"),
            Ok(false) => {
                println!("  ❌ Completion service refused the health check");
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Completion service unreachable: {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
