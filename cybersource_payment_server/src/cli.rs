use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help text and the current environment instead.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only variables that can never hold a secret are listed here
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "CPG_HOST",
        "CPG_PORT",
        "CPG_DATABASE_URL",
        "CPG_USE_X_FORWARDED_FOR",
        "CPG_USE_FORWARDED",
        "CPG_DEFAULT_COUNTRY",
        "CPG_LOG_GATEWAY_PAYLOADS",
        "CPG_ADMIN_HMAC_CHECKS",
        "CPG_CYBERSOURCE_MERCHANT_ID",
        "CPG_CYBERSOURCE_ENVIRONMENT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
