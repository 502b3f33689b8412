//! Actor persistence as versioned JSON files.
//!
//! Saves carry a format version and a small metadata block so a roster
//! screen can list characters without deserializing whole actors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::fs;

use crate::actor::Actor;
use crate::creation::CREATION_COMPLETE_FLAG;

/// Errors that can occur when saving or loading.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Roster-level facts about a saved actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorMetadata {
    pub name: String,
    pub level: i32,
    pub ancestry: String,
    pub class: String,
    pub complete: bool,
}

/// A complete actor save file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedActor {
    pub version: u32,
    /// Unix timestamp in seconds.
    pub saved_at: u64,
    pub metadata: ActorMetadata,
    pub actor: Actor,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn metadata_for(actor: &Actor) -> ActorMetadata {
    ActorMetadata {
        name: actor.name.clone(),
        level: actor.level,
        ancestry: actor.details.ancestry.clone(),
        class: actor.details.class.clone(),
        complete: actor.get_flag(CREATION_COMPLETE_FLAG).unwrap_or(false),
    }
}

/// The save path for an actor under a root directory. The file name is
/// the actor name with anything non-alphanumeric squashed to `_`.
pub fn actor_save_path(root: &Path, name: &str) -> PathBuf {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    root.join(format!("{safe}.json"))
}

/// Save an actor to a JSON file, creating parent directories as needed.
pub async fn save_json(actor: &Actor, path: &Path) -> Result<(), PersistError> {
    let saved = SavedActor {
        version: SAVE_VERSION,
        saved_at: unix_now(),
        metadata: metadata_for(actor),
        actor: actor.clone(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&saved)?;
    fs::write(path, json).await?;
    Ok(())
}

/// Load an actor from a JSON save file.
pub async fn load_json(path: &Path) -> Result<Actor, PersistError> {
    let json = fs::read_to_string(path).await?;
    let saved: SavedActor = serde_json::from_str(&json)?;
    if saved.version != SAVE_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SAVE_VERSION,
            found: saved.version,
        });
    }
    Ok(saved.actor)
}

/// Read only the metadata block of a save file.
pub async fn peek_metadata(path: &Path) -> Result<ActorMetadata, PersistError> {
    let json = fs::read_to_string(path).await?;
    let saved: SavedActor = serde_json::from_str(&json)?;
    Ok(saved.metadata)
}

/// List the save files under a roster directory.
pub async fn list_actor_saves(root: &Path) -> Result<Vec<PathBuf>, PersistError> {
    let mut saves = Vec::new();
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(saves),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            saves.push(path);
        }
    }
    saves.sort();
    Ok(saves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_path_sanitizes_name() {
        let path = actor_save_path(Path::new("/tmp/saves"), "Brakka of the Vale!");
        assert_eq!(
            path,
            PathBuf::from("/tmp/saves/Brakka_of_the_Vale_.json")
        );
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut actor = Actor::new("Rounder");
        actor.level = 3;
        actor.details.class = "Warden".to_string();

        let path = actor_save_path(dir.path(), &actor.name);
        save_json(&actor, &path).await.unwrap();

        let loaded = load_json(&path).await.unwrap();
        assert_eq!(loaded, actor);
    }

    #[tokio::test]
    async fn test_peek_metadata() {
        let dir = TempDir::new().unwrap();
        let mut actor = Actor::new("Peeked");
        actor.details.ancestry = "Stonekin".to_string();
        actor.set_flag(CREATION_COMPLETE_FLAG, true);

        let path = actor_save_path(dir.path(), &actor.name);
        save_json(&actor, &path).await.unwrap();

        let meta = peek_metadata(&path).await.unwrap();
        assert_eq!(meta.name, "Peeked");
        assert_eq!(meta.ancestry, "Stonekin");
        assert!(meta.complete);
    }

    #[tokio::test]
    async fn test_version_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let actor = Actor::new("Versioned");
        let path = actor_save_path(dir.path(), &actor.name);
        save_json(&actor, &path).await.unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let mut saved: serde_json::Value = serde_json::from_str(&json).unwrap();
        saved["version"] = serde_json::json!(99);
        std::fs::write(&path, saved.to_string()).unwrap();

        let err = load_json(&path).await.unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: 99
            }
        ));
    }

    #[tokio::test]
    async fn test_list_saves_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_actor_saves(&missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_saves_filters_json() {
        let dir = TempDir::new().unwrap();
        let actor = Actor::new("Listed");
        save_json(&actor, &actor_save_path(dir.path(), "Listed"))
            .await
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let saves = list_actor_saves(dir.path()).await.unwrap();
        assert_eq!(saves.len(), 1);
    }
}
