use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Ordered list of item names backed by a JSON array on disk.
///
/// Every mutation rewrites the whole file. The in-memory sequence only changes
/// once the new contents were written, so memory and disk never diverge.
#[derive(Clone, Debug)]
pub struct CatalogStore {
    path: PathBuf,
    items: Vec<String>,
}

impl CatalogStore {
    /// Load the catalog from `path`. A missing file is an empty catalog.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(txt) if txt.trim().is_empty() => Vec::new(),
            Ok(txt) => serde_json::from_str::<Vec<String>>(&txt)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Persist the current sequence.
    pub fn save(&self) -> Result<()> {
        write_items(&self.path, &self.items)
    }

    pub fn append(&mut self, name: impl Into<String>) -> Result<()> {
        let mut next = self.items.clone();
        next.push(name.into());
        self.commit(next)
    }

    /// Remove the item at 0-based `index` and return it.
    pub fn remove_at(&mut self, index: usize) -> Result<String> {
        if index >= self.items.len() {
            return Err(Error::Validation(format!(
                "index {index} is out of range for a catalog of {} items",
                self.items.len()
            )));
        }
        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// `1. first\n2. second` listing used in replies.
    pub fn numbered_listing(&self) -> String {
        self.items
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {name}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn commit(&mut self, next: Vec<String>) -> Result<()> {
        write_items(&self.path, &next)?;
        self.items = next;
        Ok(())
    }
}

fn write_items(path: &Path, items: &[String]) -> Result<()> {
    let txt = serde_json::to_string_pretty(items)?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog.json".into());
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, txt)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
