use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_CONFIG_FILE: &str = "/etc/myshows/config.yaml";

const STORE_FILE_NAME: &str = "mshows.cache";

pub fn store_file_path(data_dir: &Path) -> Result<PathBuf> {
    if !data_dir.as_os_str().is_empty() {
        return Ok(data_dir.join(STORE_FILE_NAME));
    }
    let base = dirs::cache_dir().context("unable to resolve cache directory")?;
    Ok(base.join("myshows-notify").join(STORE_FILE_NAME))
}
