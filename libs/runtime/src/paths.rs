use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory.
///
/// - `None` falls back to `<user home>/<default_subdir>`.
/// - A leading `~` is expanded to the user home.
/// - Relative paths are anchored at the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        Some(raw) => expand_user_path(raw.trim())?,
        None => user_home()?.join(default_subdir),
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home dir '{}'", absolute.display()))?;
    }

    Ok(absolute)
}

fn expand_user_path(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(home) => Ok(home),
        None => bail!("user home directory is not available on this platform"),
    }
}
