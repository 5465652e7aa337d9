//! Export - hand the rendered response body to an external editor

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::constants::DEFAULT_EDITOR;
use crate::error::ExportError;

/// Write the rendered body to a temp file that survives the handle.
/// Nothing on screen means nothing to export, which is not an error.
pub fn export_formatted(body: Option<&str>) -> Result<Option<PathBuf>, ExportError> {
    let Some(body) = body else {
        return Ok(None);
    };
    if body.is_empty() {
        return Ok(None);
    }

    let mut file = tempfile::Builder::new()
        .prefix("rester-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(body.as_bytes())?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| ExportError::Io(e.error))?;
    tracing::info!(path = %path.display(), "Exported response body");
    Ok(Some(path))
}

/// $EDITOR, or vi when unset
pub fn editor_command() -> String {
    std::env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string())
}

/// Run the editor on an exported file and wait for it to exit. The
/// caller owns suspending and restoring the terminal around this.
pub fn open_in_editor(path: &Path) -> Result<(), ExportError> {
    let editor = editor_command();
    let status = Command::new(&editor)
        .arg(path)
        .status()
        .map_err(|e| ExportError::EditorSpawn {
            editor: editor.clone(),
            reason: e.to_string(),
        })?;
    if !status.success() {
        tracing::warn!(editor, code = ?status.code(), "Editor exited non-zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_body_exports_nothing() {
        assert!(matches!(export_formatted(None), Ok(None)));
        assert!(matches!(export_formatted(Some("")), Ok(None)));
    }

    #[test]
    fn body_lands_in_a_persisted_json_file() {
        let path = export_formatted(Some("1  {\n2  }"))
            .unwrap()
            .expect("a path");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1  {\n2  }");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn editor_falls_back_to_vi() {
        std::env::remove_var("EDITOR");
        assert_eq!(editor_command(), "vi");
        std::env::set_var("EDITOR", "nano");
        assert_eq!(editor_command(), "nano");
        std::env::remove_var("EDITOR");
    }
}
