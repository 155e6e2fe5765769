use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::error::Error;

/// Persist decoded image bytes to `{dir}/generated-{unix_millis}.png`,
/// creating the directory if needed, and return the written path. A
/// counter suffix keeps the name unique when a file for the same
/// millisecond already exists.
///
/// The timestamp lives in the filename only; request payloads stay
/// deterministic.
pub fn save_image(dir: &Path, data: &[u8]) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dir)?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut path = dir.join(format!("generated-{millis}.png"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("generated-{millis}-{n}.png"));
        n += 1;
    }
    std::fs::write(&path, data)?;
    info!(path = %path.display(), bytes = data.len(), "wrote generated image");
    Ok(path)
}

/// Hand a file to the platform's default viewer. Best-effort: failures are
/// logged and swallowed.
pub fn open_in_viewer(path: &Path) {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(path);
        c
    };
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    if let Err(err) = command.spawn() {
        warn!(path = %path.display(), %err, "could not open viewer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join("bedrock-tasks-output-test");
        let path = save_image(&dir, b"not really a png").unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("generated-"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"not really a png");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_image_never_overwrites() {
        let dir = std::env::temp_dir().join("bedrock-tasks-output-collision-test");
        std::fs::remove_dir_all(&dir).ok();

        // Writes landing in the same millisecond get distinct names.
        let first = save_image(&dir, b"first").unwrap();
        let second = save_image(&dir, b"second").unwrap();
        let third = save_image(&dir, b"third").unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(std::fs::read(&first).unwrap(), b"first");
        assert_eq!(std::fs::read(&second).unwrap(), b"second");
        assert_eq!(std::fs::read(&third).unwrap(), b"third");

        std::fs::remove_dir_all(&dir).ok();
    }
}
