//! Console login example.
//!
//! Reads a username and password from stdin, logs in, and prints the
//! account details the server sent back.
//!
//! # Running
//!
//! ```bash
//! cargo run --example console_login
//! ```
//!
//! # Note
//!
//! The identity below is compiled into the binary on purpose. Replace the
//! placeholders with the values from your licensing dashboard; until then
//! `setup()` reports a configuration error and nothing is sent.

use authlink::{AuthConfig, AuthManager, ClientIdentity, FailureKind, SystemClock};
use std::io::{self, BufRead, Write};

const API_URL: &str = "https://your-replit-url.replit.dev/api/v1";

const IDENTITY: ClientIdentity = ClientIdentity {
    name: "example-app",
    owner_key: "your-api-key-here",
    version: "1.0.0",
};

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    line.trim_end_matches(['\r', '\n']).to_string()
}

fn main() {
    let manager = match AuthManager::new(AuthConfig::json(API_URL, IDENTITY)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let init = manager.setup();
    if !init.success {
        eprintln!("Initialization error: {}", init.message);
        std::process::exit(1);
    }

    println!("API URL: {}", manager.api_url());
    println!("Version: {}", manager.version());
    println!("HWID:    {}", manager.hwid());
    println!();

    let username = prompt("Username");
    let password = prompt("Password");

    println!("\nAuthenticating...");
    let response = manager.login(&username, &password);

    if response.success {
        println!("✓ Login successful");
        println!("  User ID:  {}", response.user_id);
        println!("  Username: {}", response.username);
        if !response.email.is_empty() {
            println!("  Email:    {}", response.email);
        }
        println!("  Expires:  {}", response.formatted_expiry());
        if let Some(days) = response.days_remaining(&SystemClock) {
            println!("  Days left: {}", days);
        }
        if response.hwid_locked {
            println!("  HWID lock: enabled");
        }
        return;
    }

    println!("✗ Login failed: {}", response.message);
    match response.failure {
        Some(FailureKind::Rejected(_)) if response.is_version_mismatch() => {
            println!(
                "  Update required: this is {}, the server requires {}",
                response.current_version, response.required_version
            );
        }
        Some(FailureKind::Transport) => println!("  Check your internet connection."),
        _ => {}
    }
    std::process::exit(1);
}
