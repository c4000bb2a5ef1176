//! Project documents keyed by (user-id, project-id), one JSON file each.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::Config, execution::Language};

pub mod listeners;

pub use listeners::{ListenerRegistry, ProjectEvent, Session};

pub const MODIFIED_BY: &str = "desktop";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid project document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub language: Language,
    pub code: String,
    pub last_modified: DateTime<Utc>,
    pub last_modified_by: String,
    pub created_at: DateTime<Utc>,
}

/// Starter program for a freshly created project.
pub fn default_code(language: Language) -> &'static str {
    match language {
        Language::Python => "# Write your Python code here\n\nprint(\"Hello, World!\")",
        Language::Cpp => "#include <iostream>\nusing namespace std;\n\nint main() {\n    cout << \"Hello, World!\" << endl;\n    return 0;\n}",
    }
}

#[derive(Debug, Clone)]
pub struct FileProjectStore {
    root: PathBuf,
}

impl FileProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.projects_path())
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join(sanitize(user))
    }

    pub fn document_path(&self, user: &str, id: &str) -> PathBuf {
        self.user_dir(user).join(format!("{}.json", sanitize(id)))
    }

    /// Newest first.
    pub fn list(&self, user: &str) -> StoreResult<Vec<Project>> {
        let dir = self.user_dir(user);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut projects = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_document(&path) {
                Ok(p) => projects.push(p),
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
        projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(projects)
    }

    pub fn create(
        &self,
        user: &str,
        name: &str,
        language: Language,
        code: Option<&str>,
    ) -> StoreResult<Project> {
        let now = Utc::now();
        let code = code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_code(language));
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            language,
            code: code.to_string(),
            last_modified: now,
            last_modified_by: MODIFIED_BY.to_string(),
            created_at: now,
        };
        self.write(user, &project)?;
        log::info!("created project {} ({})", project.id, project.name);
        Ok(project)
    }

    pub fn get(&self, user: &str, id: &str) -> StoreResult<Project> {
        let path = self.document_path(user, id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        read_document(&path)
    }

    /// Replaces the code, leaving every other field as stored.
    pub fn update_code(&self, user: &str, id: &str, code: &str) -> StoreResult<Project> {
        let mut project = self.get(user, id)?;
        project.code = code.to_string();
        project.last_modified = Utc::now();
        project.last_modified_by = MODIFIED_BY.to_string();
        self.write(user, &project)?;
        Ok(project)
    }

    pub fn delete(&self, user: &str, id: &str) -> StoreResult<()> {
        match fs::remove_file(self.document_path(user, id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Modification time of the stored document, if it exists.
    pub fn modified_at(&self, user: &str, id: &str) -> Option<SystemTime> {
        fs::metadata(self.document_path(user, id))
            .and_then(|m| m.modified())
            .ok()
    }

    fn write(&self, user: &str, project: &Project) -> StoreResult<()> {
        let dir = self.user_dir(user);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", sanitize(&project.id)));
        // Write-then-rename so listeners never observe a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(project)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn read_document(path: &Path) -> StoreResult<Project> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Keeps keys usable as single path components.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud_round() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileProjectStore::new(dir.path());

        let p = store.create("alice", "hello", Language::Python, None)?;
        assert_eq!(p.code, default_code(Language::Python));
        assert_eq!(p.last_modified_by, "desktop");

        let updated = store.update_code("alice", &p.id, "print(2)")?;
        assert_eq!(updated.name, "hello");
        assert_eq!(updated.created_at, p.created_at);
        assert!(updated.last_modified >= p.last_modified);
        assert_eq!(store.get("alice", &p.id)?.code, "print(2)");

        store.delete("alice", &p.id)?;
        assert!(matches!(store.get("alice", &p.id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("alice", &p.id), Err(StoreError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn list_is_newest_first_and_per_user() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileProjectStore::new(dir.path());
        let first = store.create("bob", "one", Language::Cpp, Some("int main(){}"))?;
        let second = store.create("bob", "two", Language::Python, Some("pass"))?;
        store.create("carol", "other", Language::Python, None)?;
        store.update_code("bob", &first.id, "int main(){return 0;}")?;

        let ids: Vec<String> = store.list("bob")?.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(store.list("nobody")?.is_empty());
        Ok(())
    }

    #[test]
    fn keys_cannot_escape_root() {
        let store = FileProjectStore::new("/data");
        let path = store.document_path("../etc", "../../passwd");
        assert!(path.starts_with("/data"));
        assert_eq!(path.parent().and_then(|p| p.file_name()).unwrap(), "___etc");
    }

    #[test]
    fn wire_shape() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileProjectStore::new(dir.path());
        let p = store.create("u", "n", Language::Cpp, None)?;
        let v = serde_json::to_value(&p)?;
        assert_eq!(v["language"], "cpp");
        assert!(v.get("lastModified").is_some());
        assert!(v.get("createdAt").is_some());
        Ok(())
    }
}
