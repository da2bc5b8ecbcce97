use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};

pub fn read_json_file<T>(file_kind: &str, path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open {file_kind} file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse {file_kind} file: {}", path.display()))?;
    Ok(value)
}

pub fn write_json_file<T>(file_kind: &str, path: impl AsRef<Path>, value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create {file_kind} file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {file_kind} file: {}", path.display()))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
