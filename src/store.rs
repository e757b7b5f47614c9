use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{SessionDocument, SplitterDoc};

fn state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paneview")
}

pub fn state_file_path() -> PathBuf {
    state_dir().join("session.json")
}

pub fn save(doc: &SessionDocument) -> Result<()> {
    save_to(doc, &state_file_path())
}

pub fn load() -> Option<SessionDocument> {
    load_from(&state_file_path())
}

// Path-parameterized variants for testability

pub fn save_to(doc: &SessionDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = doc.to_json()?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved session layout to {}", path.display());
    Ok(())
}

/// Read a session document. A missing or undecodable file yields `None`, in
/// which case the caller starts from a default session.
pub fn load_from(path: &Path) -> Option<SessionDocument> {
    let json = fs::read_to_string(path).ok()?;
    match SessionDocument::from_json(&json) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("ignoring unreadable layout {}: {}", path.display(), e);
            None
        }
    }
}

/// `path` with a `.json` extension appended when it does not end in one.
pub fn with_json_suffix(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "json") {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Write a single tab layout, returning the path actually written.
pub fn save_layout_file(doc: &SplitterDoc, path: &Path) -> Result<PathBuf> {
    let path = with_json_suffix(path);
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved tab layout to {}", path.display());
    Ok(path)
}

pub fn load_layout_file(path: &Path) -> Result<SplitterDoc> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{PaneDoc, TerminalDoc, WidgetDoc};
    use crate::layout::Orientation;

    fn make_test_doc() -> SessionDocument {
        let tab = SplitterDoc {
            orientation: Orientation::Horizontal,
            widgets: vec![WidgetDoc::Terminal(TerminalDoc {
                session_restore_id: 1,
                columns: 80,
                lines: 24,
                working_directory: "/tmp".to_string(),
                command: String::new(),
            })],
        };
        SessionDocument {
            panes: vec![PaneDoc {
                tabs: vec![tab.clone()],
                active: 0,
            }],
            tabs: vec![tab],
            ..SessionDocument::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let doc = make_test_doc();

        save_to(&doc, &path).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("session.json");
        save_to(&make_test_doc(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_reports_unusable_parent() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("session.json");
        let err = save_to(&make_test_doc(), &path).unwrap_err();
        assert!(format!("{err:#}").contains(&format!("creating {}", blocker.display())));
    }

    #[test]
    fn test_load_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.json");
        assert!(load_from(&path).is_none());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ invalid }").unwrap();
        assert!(load_from(&path).is_none());
    }

    #[test]
    fn test_json_suffix() {
        assert_eq!(with_json_suffix(Path::new("a/b")), PathBuf::from("a/b.json"));
        assert_eq!(with_json_suffix(Path::new("a/b.json")), PathBuf::from("a/b.json"));
        assert_eq!(with_json_suffix(Path::new("a/b.txt")), PathBuf::from("a/b.txt.json"));
    }

    #[test]
    fn test_layout_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let doc = make_test_doc().tabs.remove(0);
        let written = save_layout_file(&doc, &dir.path().join("dev")).unwrap();
        assert_eq!(written, dir.path().join("dev.json"));
        assert_eq!(load_layout_file(&written).unwrap(), doc);
        assert!(load_layout_file(&dir.path().join("missing.json")).is_err());
    }
}
