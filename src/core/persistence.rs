//! Save snapshots and the stores that hold them.
//!
//! A snapshot is the whole `GameSession` as one JSON object. There is no
//! version field; anything that does not decode into a valid session is a
//! `LoadError`.

use rustc_hash::FxHashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::session::GameSession;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("save is not a valid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save breaks a session invariant: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a session as snapshot bytes.
pub fn encode_snapshot(session: &GameSession) -> Result<Vec<u8>, SaveError> {
    Ok(serde_json::to_vec(session)?)
}

/// Decode and validate snapshot bytes. Bytes that are not UTF-8 JSON are a
/// `LoadError` like any other malformed save.
pub fn decode_snapshot(snapshot: &[u8]) -> Result<GameSession, LoadError> {
    let session: GameSession = serde_json::from_slice(snapshot)?;
    if session.hp > session.max_hp {
        return Err(LoadError::Invalid(format!(
            "hp {} exceeds max hp {}",
            session.hp, session.max_hp
        )));
    }
    if session.level == 0 {
        return Err(LoadError::Invalid("level must be at least 1".to_string()));
    }
    Ok(session)
}

/// Key-value storage for snapshots. The medium is up to the implementor.
pub trait SaveStore {
    fn save(&mut self, key: &str, snapshot: &[u8]) -> Result<(), SaveError>;

    /// `Ok(None)` means nothing has been saved under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError>;
}

/// Snapshots kept in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn save(&mut self, key: &str, snapshot: &[u8]) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), snapshot.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }
}

/// One `<key>.json` file per snapshot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SaveStore for FileStore {
    fn save(&mut self, key: &str, snapshot: &[u8]) -> Result<(), SaveError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), snapshot)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        match std::fs::read(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::alignment::Alignment;
    use crate::schema::scene::SceneId;

    fn played_session() -> GameSession {
        let mut session = GameSession::default();
        session.hp = 7;
        session.level = 3;
        session.gold = 40;
        session.alignment = Alignment::Genocide;
        session.inventory.push("Stick".to_string());
        session.choice_history = vec!["I will carve my way by force".to_string()];
        session.current_scene_id = SceneId(6);
        session
    }

    #[test]
    fn snapshot_round_trip() {
        let session = played_session();
        let snapshot = encode_snapshot(&session).unwrap();
        assert_eq!(decode_snapshot(&snapshot).unwrap(), session);
    }

    #[test]
    fn missing_field_is_load_error() {
        let err = decode_snapshot(br#"{"playerName":"Hero","hp":20}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn wrong_type_is_load_error() {
        let mut value = serde_json::to_value(played_session()).unwrap();
        value["gold"] = serde_json::json!("lots");
        assert!(decode_snapshot(value.to_string().as_bytes()).is_err());

        value["gold"] = serde_json::json!(-5);
        assert!(decode_snapshot(value.to_string().as_bytes()).is_err());
    }

    #[test]
    fn unknown_alignment_is_load_error() {
        let mut value = serde_json::to_value(played_session()).unwrap();
        value["alignment"] = serde_json::json!("chaotic");
        assert!(decode_snapshot(value.to_string().as_bytes()).is_err());
    }

    #[test]
    fn invariant_violations_rejected() {
        let mut session = played_session();
        session.hp = session.max_hp + 1;
        let snapshot = encode_snapshot(&session).unwrap();
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(LoadError::Invalid(_))
        ));

        let mut session = played_session();
        session.level = 0;
        let snapshot = encode_snapshot(&session).unwrap();
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_load_error() {
        assert!(decode_snapshot(b"not json").is_err());
        assert!(decode_snapshot(b"").is_err());
    }

    #[test]
    fn non_utf8_is_load_error() {
        let err = decode_snapshot(b"\xff\xfe\x00").unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("rpg-save").unwrap(), None);
        store.save("rpg-save", b"{}").unwrap();
        assert_eq!(store.load("rpg-save").unwrap().as_deref(), Some(&b"{}"[..]));
        store.save("rpg-save", b"[]").unwrap();
        assert_eq!(store.load("rpg-save").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("saves"));
        assert_eq!(store.load("rpg-save").unwrap(), None);

        let snapshot = encode_snapshot(&played_session()).unwrap();
        store.save("rpg-save", &snapshot).unwrap();
        assert!(dir.path().join("saves/rpg-save.json").exists());
        assert_eq!(store.load("rpg-save").unwrap(), Some(snapshot));
    }

    #[test]
    fn file_store_hands_back_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rpg-save.json"), b"\xff\xfe\x00").unwrap();

        let store = FileStore::new(dir.path());
        let bytes = store.load("rpg-save").unwrap().unwrap();
        assert_eq!(bytes, b"\xff\xfe\x00");
        assert!(decode_snapshot(&bytes).is_err());
    }
}
