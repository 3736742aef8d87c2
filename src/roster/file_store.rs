use log::{debug, info};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use roster_core::store::MemoryStore;

use crate::roster::*;

/// Reads the roster from a JSON file. A missing file is an empty roster.
pub fn load_store(path: &str) -> AppResult<MemoryStore> {
    if !Path::new(path).exists() {
        info!("load_store: {} does not exist, starting an empty roster", path);
        return Ok(MemoryStore::default());
    }
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let store: MemoryStore = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("load_store: {} voters from {}", store.voter_count(), path);
    Ok(store)
}

/// Writes the roster next to its final location, then renames it into
/// place. Readers never see a partially written file.
pub fn save_store(path: &str, store: &MemoryStore) -> AppResult<()> {
    let dir = match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).context(WritingFileSnafu { path })?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, store).context(SerializingJsonSnafu {})?;
        writer.flush().context(WritingFileSnafu { path })?;
    }
    tmp.persist(path).context(PersistingStoreSnafu { path })?;
    debug!("save_store: {} voters to {}", store.voter_count(), path);
    Ok(())
}
