// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use rolegate_config::{load_config, RolegateConfig, SecretValue};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Loads and validates the configuration file, then prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;
    let warnings = config.warnings();
    let shown = masked(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!(
                "  Server:        {}{}",
                config.server.socket_addr(),
                config.server.base_path
            );
            println!("  Algorithm:     {:?}", config.auth.algorithm);
            println!("  Store:         {}", config.store.backend);
            println!(
                "  Baseline role: {}",
                if config.rbac.baseline_role.is_empty() {
                    "(none)"
                } else {
                    config.rbac.baseline_role.as_str()
                }
            );
            println!("  Seeded roles:  {}", config.rbac.role_definitions()?.len());
            println!("  Bootstrap admins: {}", config.rbac.bootstrap_admins.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_pretty_json(&shown)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "bind_address": config.server.bind_address.to_string(),
                    "port": config.server.port,
                    "base_path": config.server.base_path,
                    "store_backend": config.store.backend.to_string(),
                    "baseline_role": config.rbac.baseline_role,
                    "bootstrap_admins": config.rbac.bootstrap_admins.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&shown) } else { None },
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns a copy safe to print: the signing secret is replaced.
fn masked(config: &RolegateConfig) -> RolegateConfig {
    let mut shown = config.clone();
    if shown.auth.jwt_secret.is_some() {
        shown.auth.jwt_secret = Some(SecretValue::new("***"));
    }
    shown
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render configuration: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn cli_for(file: &tempfile::NamedTempFile) -> Cli {
        Cli::parse_from(["rolegate", "-c", file.path().to_str().unwrap(), "validate"])
    }

    const VALID: &str = r#"
auth:
  jwt_secret: "validate-test-secret-0123456789abcdef"
store:
  backend: sqlite
rbac:
  bootstrap_admins: ["u1"]
"#;

    #[test]
    fn test_masked_hides_secret() {
        let mut config = RolegateConfig::default();
        config.auth.jwt_secret = Some(SecretValue::new("super-secret"));

        let json = serde_json::to_string(&masked(&config)).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("***"));
    }

    #[test]
    fn test_validate_valid_file() {
        let file = config_file(VALID);
        let args = ValidateArgs {
            strict: true,
            ..ValidateArgs::default()
        };
        assert!(validate(&cli_for(&file), args).is_ok());
    }

    #[test]
    fn test_strict_mode_fails_on_warnings() {
        let file = config_file(
            r#"
auth:
  jwt_secret: "validate-test-secret-0123456789abcdef"
store:
  backend: memory
"#,
        );
        let args = ValidateArgs {
            strict: true,
            ..ValidateArgs::default()
        };
        assert!(validate(&cli_for(&file), args).is_err());
    }

    #[test]
    fn test_missing_secret_is_invalid() {
        let file = config_file("store:\n  backend: memory\n");
        let err = validate(&cli_for(&file), ValidateArgs::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
