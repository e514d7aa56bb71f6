use crate::config::KvsConfig;

use anyhow::{Context, Result, bail};
use std::fs;

pub const ACCESS_MARKER_NAME: &str = ".htaccess";
const ACCESS_MARKER_BODY: &str = "Order Deny,Allow\nDeny from All";

/// Creates the data directory and its deny-all marker if they are missing.
///
/// Safe to run on every start. Fails if the data path exists but is not a
/// directory.
pub fn prepare_storage_root(config: &KvsConfig) -> Result<()> {
    let root = &config.data_dir;

    if root.exists() && !root.is_dir() {
        bail!("data path {} exists but is not a directory", root.display());
    }
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("failed to create data directory {}", root.display()))?;
        tracing::info!("Created data directory {}", root.display());
    }

    if config.enable_access_marker {
        let marker = root.join(ACCESS_MARKER_NAME);
        if !marker.exists() {
            fs::write(&marker, ACCESS_MARKER_BODY)
                .with_context(|| format!("failed to write {}", marker.display()))?;
            tracing::info!("Wrote access marker {}", marker.display());
        }
    }

    Ok(())
}
