//! Directory-backed content store.
//!
//! Layout of a storybook directory:
//!
//! ```text
//! world.toml
//! characters/{code}-{name}.toml   keyed by the record's `id`
//! pages/{record}.toml             keyed by file stem
//! nodes/{kind}-{NN}.toml          keyed by file stem
//! ```
//!
//! Everything is loaded in one bulk pass when the store is opened.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use story_rules::WORLD_RECORD;
use tracing::{debug, info};

use super::{ContentStore, InMemoryStore, RawRecord, RecordKind};
use crate::error::StoreError;

pub const WORLD_FILE: &str = "world.toml";
pub const CHARACTERS_DIR: &str = "characters";
pub const PAGES_DIR: &str = "pages";
pub const NODES_DIR: &str = "nodes";

/// Character files with these markers in their name are scaffolding, not cast.
const SKIPPED_CHARACTER_MARKERS: [&str; 2] = ["template", "example"];

/// A content store loaded from a storybook directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    store: InMemoryStore,
    sources: BTreeMap<(RecordKind, String), PathBuf>,
}

impl DirectoryStore {
    /// Load every record under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        let mut loaded = Self {
            root: root.clone(),
            store: InMemoryStore::new(),
            sources: BTreeMap::new(),
        };

        let world = root.join(WORLD_FILE);
        if world.is_file() {
            let value = read_record(&world)?;
            loaded.add(RecordKind::World, WORLD_RECORD.to_string(), value, world)?;
        }

        for (kind, dir) in [
            (RecordKind::Character, CHARACTERS_DIR),
            (RecordKind::Page, PAGES_DIR),
            (RecordKind::Node, NODES_DIR),
        ] {
            for path in record_files(&root.join(dir))? {
                let stem = file_stem(&path);
                if kind == RecordKind::Character
                    && SKIPPED_CHARACTER_MARKERS.iter().any(|m| stem.contains(m))
                {
                    debug!(path = %path.display(), "skipping character scaffolding file");
                    continue;
                }
                let value = read_record(&path)?;
                let name = record_name(kind, &stem, &value);
                loaded.add(kind, name, value, path)?;
            }
        }

        info!(
            root = %loaded.root.display(),
            characters = loaded.store.count(RecordKind::Character),
            pages = loaded.store.count(RecordKind::Page),
            nodes = loaded.store.count(RecordKind::Node),
            "loaded storybook directory"
        );
        Ok(loaded)
    }

    /// The directory this store was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a record was loaded from.
    pub fn source(&self, kind: RecordKind, name: &str) -> Option<&Path> {
        self.sources
            .get(&(kind, name.to_string()))
            .map(PathBuf::as_path)
    }

    fn add(
        &mut self,
        kind: RecordKind,
        name: String,
        value: RawRecord,
        path: PathBuf,
    ) -> Result<(), StoreError> {
        if let Some(first) = self.sources.get(&(kind, name.clone())) {
            return Err(StoreError::DuplicateRecord {
                kind,
                name,
                first: first.clone(),
                second: path,
            });
        }
        self.store.insert(kind, name.clone(), value);
        self.sources.insert((kind, name), path);
        Ok(())
    }
}

impl ContentStore for DirectoryStore {
    fn get(&self, kind: RecordKind, name: &str) -> Option<&RawRecord> {
        self.store.get(kind, name)
    }

    fn names(&self, kind: RecordKind) -> Vec<&str> {
        self.store.names(kind)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Character records are keyed by their `id`, falling back to the code
/// prefix of the file name.
fn record_name(kind: RecordKind, stem: &str, value: &RawRecord) -> String {
    if kind == RecordKind::Character {
        if let Some(id) = value.get("id").and_then(|v| v.as_str()) {
            return id.to_string();
        }
        return stem.split('-').next().unwrap_or(stem).to_string();
    }
    stem.to_string()
}

fn record_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_record(path: &Path) -> Result<RawRecord, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_value(value).map_err(|source| StoreError::Convert {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::World;
    use crate::validator::Validator;
    use story_rules::NodeKind;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn page_toml(spread: u8, node_type: Option<&str>) -> String {
        let mut page = format!(
            "spread = {spread}\nbeat = \"beat {spread}\"\ndescription = \"Spread {spread}.\"\n"
        );
        if let Some(node_type) = node_type {
            page.push_str(&format!("node_type = \"{}\"\n", node_type));
        }
        for (side, number) in [("left", spread * 2 - 1), ("right", spread * 2)] {
            page.push_str(&format!(
                "\n[[scenes]]\npage = \"{side}\"\npage_number = {number}\n\
                 visual = \"A paper boat on the pond.\"\n\
                 text = \"The wind was soft. The grass bent low. Someone was waiting.\"\n"
            ));
        }
        page
    }

    /// A two-character set linked by a resonant node at spread 8.
    fn write_storybook(root: &Path) {
        write(
            root,
            "world.toml",
            "title = \"Pond Stories\"\ncharacters = [\"ma\", \"le\"]\n\n\
             [[symbols]]\nname = \"Paper boat\"\nmeaning = \"letting go\"\n",
        );
        for (code, name, extension) in [("ma", "Mara", ".toml"), ("le", "Leif", "")] {
            let story = (1..=12u8)
                .map(|n| format!("\"{}-{:02}{}\"", code, n, extension))
                .collect::<Vec<_>>()
                .join(", ");
            write(
                root,
                &format!("characters/{}-{}.toml", code, name.to_lowercase()),
                &format!("id = \"{}\"\nname = \"{}\"\nstory = [{}]\n", code, name, story),
            );
            for n in 1..=12u8 {
                let node_type = (n == 8).then_some("resonant");
                write(
                    root,
                    &format!("pages/{}-{:02}.toml", code, n),
                    &page_toml(n, node_type),
                );
            }
        }
        write(
            root,
            "nodes/resonant-08.toml",
            "kind = \"resonant\"\nspread = 8\nparticipants = [\"ma\", \"le\"]\n\
             motif = \"paper boat\"\n\n\
             [ripples]\nma = \"Mara lets the boat go.\"\nle = \"Leif finds it downstream.\"\n\n\
             [growth_moments]\nma = 4\nle = 6\n",
        );
    }

    #[test]
    fn test_toml_storybook_builds_and_validates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_storybook(temp_dir.path());

        let store = DirectoryStore::open(temp_dir.path()).expect("open should succeed");
        assert_eq!(store.root(), temp_dir.path());
        assert_eq!(store.names(RecordKind::Page).len(), 24);

        let world = World::build(&store).expect("storybook should build");
        assert_eq!(world.config().title, "Pond Stories");
        assert_eq!(world.nodes().len(), 1);
        let node = &world.nodes()[0];
        assert_eq!(node.name, "resonant-08");
        assert_eq!(node.kind(), NodeKind::Resonant);
        assert_eq!(node.variant.motif(), Some("paper boat"));

        let ma = world.character("ma").unwrap();
        let page = world.page(ma.page_at(story_rules::SpreadNumber::new(8).unwrap()));
        assert_eq!(page.name, "ma-08");
        assert_eq!(page.scenes.len(), 2);
        assert_eq!(page.scenes[1].page_number, Some(16));

        let report = Validator::with_defaults(&world).validate();
        assert!(report.findings.is_empty(), "{}", report.to_text());
    }

    #[test]
    fn test_toml_storybook_reports_broken_precedence() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_storybook(temp_dir.path());
        write(
            temp_dir.path(),
            "nodes/resonant-08.toml",
            "kind = \"resonant\"\nspread = 8\nparticipants = [\"ma\", \"le\"]\n\
             motif = \"Paper boat\"\n\n\
             [ripples]\nma = \"a\"\nle = \"b\"\n\n\
             [growth_moments]\nma = 9\nle = 6\n",
        );

        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        let world = World::build(&store).unwrap();
        let report = Validator::with_defaults(&world).validate();

        assert!(!report.is_success());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.findings[0].record, "resonant-08");
    }

    #[test]
    fn test_open_keys_records_by_kind() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        write(root, "world.toml", "title = \"Set\"\ncharacters = [\"el\"]\n");
        write(
            root,
            "characters/el-elowen.toml",
            "id = \"el\"\nname = \"Elowen\"\nstory = [\"el-01.yaml\"]\n",
        );
        write(root, "characters/xx-template.toml", "id = \"xx\"\n");
        write(root, "pages/el-01.toml", "spread = 1\n");
        write(root, "pages/notes.txt", "ignored");
        write(
            root,
            "nodes/mirrored-05.toml",
            "kind = \"mirrored\"\nspread = 5\n",
        );

        let store = DirectoryStore::open(root).expect("open should succeed");

        assert_eq!(store.names(RecordKind::World), vec!["world"]);
        assert_eq!(store.names(RecordKind::Character), vec!["el"]);
        assert_eq!(store.names(RecordKind::Page), vec!["el-01"]);
        assert_eq!(store.names(RecordKind::Node), vec!["mirrored-05"]);
        assert_eq!(
            store.get(RecordKind::Character, "el").unwrap()["name"],
            "Elowen"
        );
        assert!(store
            .source(RecordKind::Page, "el-01")
            .unwrap()
            .ends_with("pages/el-01.toml"));
    }

    #[test]
    fn test_character_without_id_uses_file_prefix() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(
            temp_dir.path(),
            "characters/no-noor.toml",
            "name = \"Noor\"\nstory = []\n",
        );

        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        assert!(store.contains(RecordKind::Character, "no"));
    }

    #[test]
    fn test_duplicate_character_ids_are_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(temp_dir.path(), "characters/el-a.toml", "id = \"el\"\n");
        write(temp_dir.path(), "characters/el-b.toml", "id = \"el\"\n");

        let err = DirectoryStore::open(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRecord { kind: RecordKind::Character, .. }));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(temp_dir.path(), "pages/el-01.toml", "spread = = 1");

        let err = DirectoryStore::open(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_missing_directories_yield_empty_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DirectoryStore::open(temp_dir.path()).unwrap();
        assert!(store.names(RecordKind::Page).is_empty());
        assert!(!store.contains(RecordKind::World, WORLD_RECORD));
    }
}
