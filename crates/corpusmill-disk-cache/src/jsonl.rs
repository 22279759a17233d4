//! # JSON-Lines Checkpoint IO
//!
//! One JSON object per line; blank lines are permitted and skipped on read.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read a JSON-lines file into a vector of `T`.
///
/// Blank lines are skipped.
///
/// # Arguments
/// * `path` - the file to read.
pub fn read_jsonl<T, P>(path: P) -> anyhow::Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut items = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        items.push(serde_json::from_str(&line)?);
    }
    Ok(items)
}

/// Write items to a JSON-lines file, one object per line.
///
/// The file is created (or replaced) at `path`. The write goes to a
/// sibling `.tmp` file and is renamed into place, so a failed write never
/// leaves a partial file at `path`.
///
/// # Arguments
/// * `path` - the file to write.
/// * `items` - the items to serialize.
pub fn write_jsonl<'a, T, P, I>(
    path: P,
    items: I,
) -> anyhow::Result<()>
where
    T: Serialize + 'a,
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a T>,
{
    let path = path.as_ref();
    let tmp_path = tmp_sibling(path)?;
    let file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;

    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to move {} into place", tmp_path.display()))?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> anyhow::Result<std::path::PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let mut name = name.to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}
