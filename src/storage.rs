use crate::constants::CONFIG_DIR;
use crate::models::{Call, CallBody, Collection, ContentType, Method, Row};
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

/// File storage for collections, one YAML file per collection
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR);
        Storage { dir }
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Storage { dir }
    }

    /// Load every collection file, sorted by filename. A file that does
    /// not parse is skipped, not fatal.
    pub fn load_collections(&self) -> Result<Vec<Collection>> {
        let mut collections = Vec::new();
        if !self.dir.exists() {
            return Ok(collections);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("yaml"))
            .collect();
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Collection>(&content) {
                Ok(collection) => collections.push(collection),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable collection: {e}");
                }
            }
        }

        Ok(collections)
    }

    /// Save a collection to file
    pub fn save_collection(&self, collection: &Collection) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(format!("{}.yaml", collection.name));
        let content = serde_yaml::to_string(collection)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Built-in collection shown on first run, before anything was saved
    pub fn starter_collection() -> Collection {
        let mut collection = Collection::new("starter");

        let mut list = Call::new(0, "List posts");
        list.url = String::from("https://jsonplaceholder.typicode.com/posts");
        list.params.push(Row::new("_limit", "5"));
        collection.calls.push(list);

        let mut create = Call::new(0, "Create post");
        create.method = Method::POST;
        create.url = String::from("https://jsonplaceholder.typicode.com/posts");
        create.body = Some(CallBody {
            content: String::from("{\n  \"title\": \"hello\",\n  \"body\": \"world\",\n  \"userId\": 1\n}"),
            content_type: ContentType::Json,
        });
        collection.calls.push(create);

        let mut echo = Call::new(0, "Echo headers");
        echo.url = String::from("https://httpbin.org/headers");
        echo.headers.push(Row::new("X-Demo", "rester"));
        collection.calls.push(echo);

        collection
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Auth;

    #[test]
    fn missing_dir_loads_as_no_collections() {
        let temp = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(temp.path().join("never-created"));
        assert!(storage.load_collections().unwrap().is_empty());
    }

    #[test]
    fn collections_survive_a_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(temp.path().to_path_buf());

        let mut collection = Collection::new("api");
        let mut call = Call::new(7, "Whoami");
        call.url = String::from("https://api.example.com/me");
        call.method = Method::POST;
        call.headers.push(Row::new("Accept", "application/json"));
        call.headers[0].enabled = false;
        call.auth = Auth::Bearer(String::from("tok123"));
        collection.calls.push(call);

        storage.save_collection(&collection).unwrap();
        let loaded = storage.load_collections().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "api");
        let call = &loaded[0].calls[0];
        assert_eq!(call.name, "Whoami");
        assert_eq!(call.url, "https://api.example.com/me");
        assert_eq!(call.method, Method::POST);
        assert!(!call.headers[0].enabled);
        assert_eq!(call.auth, Auth::Bearer(String::from("tok123")));
        // Runtime-only fields never round-trip
        assert_eq!(call.id, 0);
    }

    #[test]
    fn load_order_follows_filenames() {
        let temp = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(temp.path().to_path_buf());

        storage.save_collection(&Collection::new("zeta")).unwrap();
        storage.save_collection(&Collection::new("alpha")).unwrap();

        let names: Vec<String> = storage
            .load_collections()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
