use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use common::Result;

/// Save raw upload bytes under `dir` as `<unix-seconds>-<name>`, with
/// whitespace in the name replaced by `_` and any directory part dropped.
pub fn archive_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let base = Path::new(original_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "upload.csv".to_string());
    let sanitized = base.split_whitespace().collect::<Vec<_>>().join("_");

    let path = dir.join(format!("{}-{sanitized}", Utc::now().timestamp()));
    std::fs::write(&path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Upload archived");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archives_with_sanitized_name() {
        let dir = std::env::temp_dir().join(format!("tradescope-archive-{}", std::process::id()));
        let path = archive_upload(&dir, "../daily trades  jan.csv", b"a,b\n").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-daily_trades_jan.csv"), "got {name}");
        assert_eq!(path.parent().unwrap(), dir.as_path());
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
