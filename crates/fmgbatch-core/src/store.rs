// ── Record store ──
//
// One JSON object per file, `policy_<id>.json`. Files are written with
// 4-space indentation and key order preserved so a round trip through the
// store is byte-stable for hand-edited records.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use crate::error::FileError;
use crate::model::{Generation, PolicyId, PolicyRecord};

const RECORD_EXTENSION: &str = "json";

/// `<directory>/policy_<id>.json`
pub fn record_path(directory: &Path, id: PolicyId) -> PathBuf {
    directory.join(format!("policy_{id}.{RECORD_EXTENSION}"))
}

/// Load every `*.json` record in `directory`.
///
/// Files are read in name order. Records without an integer `policyid` are
/// skipped; a later file with an already-seen id replaces the earlier one.
pub fn load_generation(directory: &Path) -> Result<Generation, FileError> {
    if !directory.is_dir() {
        return Err(FileError::NotFound {
            path: directory.to_path_buf(),
        });
    }

    let mut generation = Generation::new();
    for path in record_files(directory)? {
        let record = read_record(&path)?;
        let Some(id) = record.policy_id() else {
            debug!(file = %path.display(), "skipping record without policyid");
            continue;
        };
        if generation.insert(id, record).is_some() {
            warn!(policy_id = %id, file = %path.display(), "duplicate policyid, later file wins");
        }
    }

    debug!(
        directory = %directory.display(),
        records = generation.len(),
        "loaded generation"
    );
    Ok(generation)
}

/// Parse one record file. Anything but a JSON object is malformed.
pub fn read_record(path: &Path) -> Result<PolicyRecord, FileError> {
    let text = fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| FileError::Malformed {
        file: path.to_path_buf(),
        reason,
    };
    match serde_json::from_str::<Value>(&text).map_err(|e| malformed(e.to_string()))? {
        Value::Object(fields) => Ok(PolicyRecord::new(fields)),
        _ => Err(malformed("expected a JSON object".into())),
    }
}

/// Write a record to `path`, creating parent directories as needed.
pub fn save_record(record: &PolicyRecord, path: &Path) -> Result<(), FileError> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record
        .serialize(&mut ser)
        .expect("serializing a JSON map cannot fail");
    buf.push(b'\n');

    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(&buf).map_err(write_err)?;
    debug!(file = %path.display(), "saved record");
    Ok(())
}

fn record_files(directory: &Path) -> Result<Vec<PathBuf>, FileError> {
    let read_err = |source| FileError::Read {
        path: directory.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
