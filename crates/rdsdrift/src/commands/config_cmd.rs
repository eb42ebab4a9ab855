//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use rdsdrift_config::{Config, Connection, save_config, store_password};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Tone};

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Empty input means "not set".
fn optional_input(prompt: &str) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    Ok(Some(value.trim().to_owned()).filter(|v| !v.is_empty()))
}

fn prompt_password(label: &str) -> Result<SecretString, CliError> {
    let password = rpassword::prompt_password(label).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Ask for one named connection and where its password lives.
fn prompt_connection() -> Result<(String, Connection), CliError> {
    let name: String = Input::new()
        .with_prompt("Connection name")
        .default("prod-main".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("PostgreSQL URL (without password)")
        .validate_with(|v: &String| {
            if v.contains("://") { Ok(()) } else { Err("expected postgres://user@host:5432/db") }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let choices = &[
        "Store in system keyring (recommended)",
        "Read from an environment variable",
        "Embedded in the URL / none",
    ];
    let selection = Select::new()
        .with_prompt("Where does the password come from?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut conn = Connection {
        url,
        password_env: None,
        password: None,
    };
    match selection {
        0 => {
            let password = prompt_password("Password: ")?;
            store_password(&name, &password)?;
            eprintln!("   ✓ Password stored in system keyring");
        }
        1 => {
            let default_var = format!("{}_PGPASSWORD", name.to_uppercase().replace('-', "_"));
            let var: String = Input::new()
                .with_prompt("Environment variable")
                .default(default_var)
                .interact_text()
                .map_err(prompt_err)?;
            conn.password_env = Some(var);
        }
        _ => {}
    }
    Ok((name, conn))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &mut GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !Confirm::new()
                    .with_prompt(format!("{} exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }
            eprintln!("rdsdrift configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = Config::default();
            cfg.aws.region = optional_input("AWS region (empty: aws CLI default)")?;
            cfg.aws.profile = optional_input("AWS profile (empty: default)")?;
            cfg.defaults.cache_ttl = Input::new()
                .with_prompt("Cache lifetime")
                .default(cfg.defaults.cache_ttl.clone())
                .validate_with(|v: &String| humantime::parse_duration(v).map(|_| ()))
                .interact_text()
                .map_err(prompt_err)?;

            while Confirm::new()
                .with_prompt("Add a live connection?")
                .default(cfg.connections.is_empty())
                .interact()
                .map_err(prompt_err)?
            {
                let (name, conn) = prompt_connection()?;
                cfg.connections.insert(name, conn);
            }

            let written = save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", written.display());
            eprintln!("\n  Test it: rdsdrift instances");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?.redacted();
            let out = output::render_single(
                global.output(),
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unprintable: {e}")),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { connection } => {
            let cfg = config::load(global)?;
            if !cfg.connections.contains_key(&connection) {
                let available: Vec<_> = cfg.connections.keys().cloned().collect();
                return Err(CliError::UnknownConnection {
                    name: connection,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                    path: config::config_path().display().to_string(),
                });
            }

            let password = prompt_password(&format!("Password for '{connection}': "))?;
            store_password(&connection, &password)?;
            output::status(
                global,
                Tone::Good,
                format_args!("✓ Password stored in system keyring for connection '{connection}'"),
            );
            Ok(())
        }
    }
}
