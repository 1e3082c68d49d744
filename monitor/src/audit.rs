//! One-shot Lighthouse page audit
//!
//! Thin wrapper around the external `lighthouse` binary, invoked from the
//! interactive command surface. Not part of the monitoring core; a missing
//! binary is a logged, non-fatal condition.

use std::io;

use tokio::process::Command;
use tracing::{error, info, warn};

use crate::config::AuditConfig;
use crate::error::Result;

/// Run one Lighthouse audit; returns whether the audit completed
pub async fn run_lighthouse(config: &AuditConfig) -> Result<bool> {
    info!("running Lighthouse audit against {}", config.page_url);

    let result = Command::new("lighthouse")
        .arg(&config.page_url)
        .arg("--output=json")
        .arg(format!("--output-path={}", config.output_path.display()))
        .arg("--chrome-flags=--headless")
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            info!("Lighthouse audit written to {}", config.output_path.display());
            Ok(true)
        }
        Ok(output) => {
            error!(
                "Lighthouse exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            );
            Ok(false)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("lighthouse binary not found; install with: npm install -g lighthouse");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
