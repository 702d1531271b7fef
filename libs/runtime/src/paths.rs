use anyhow::{Context, Result};
use std::path::PathBuf;

/// Resolve the application home directory and make sure it exists.
///
/// - empty input: `$HOME/<default_subdir>` (falls back to the working directory
///   when no home is known)
/// - `~` or `~/...`: expanded against `$HOME`
/// - relative paths: joined with the current working directory
pub fn resolve_home_dir(raw: &str, default_subdir: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    let path = if raw.is_empty() {
        user_home()?.join(default_subdir)
    } else if raw == "~" {
        user_home()?
    } else if let Some(rest) = raw.strip_prefix("~/") {
        user_home()?.join(rest)
    } else {
        let p = PathBuf::from(raw);
        if p.is_absolute() {
            p
        } else {
            std::env::current_dir()
                .context("cannot read current directory")?
                .join(p)
        }
    };

    std::fs::create_dir_all(&path)
        .with_context(|| format!("cannot create home_dir {}", path.display()))?;
    Ok(path)
}

fn user_home() -> Result<PathBuf> {
    let var = if cfg!(windows) { "APPDATA" } else { "HOME" };
    match std::env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => std::env::current_dir().context("cannot read current directory"),
    }
}
