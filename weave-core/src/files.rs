//! In-memory workspace file map.
//!
//! Written by the parser when assistant output carries file blocks, by the
//! merge editor for its virtual files, and by the user through merges. Reads
//! come from the UI and from Builder-mode context injection. Last write wins.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone)]
pub struct FileStore {
    files: BTreeMap<String, String>,
    /// Previous generation of each file, used as the diff/merge baseline.
    old_files: BTreeMap<String, String>,
    /// Files the assistant has not seen yet (loaded from history or disk).
    first_send: BTreeSet<String>,
    /// Files changed locally since the last turn was finalized.
    update_send: BTreeSet<String>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file without marking it for sending.
    pub fn add_file(&mut self, path: &str, content: &str) {
        self.files.insert(path.to_owned(), content.to_owned());
    }

    /// Upserts `path`. `mark_update` flags the file for the next Builder-mode sync.
    pub fn update_content(&mut self, path: &str, content: &str, mark_update: bool) {
        self.files.insert(path.to_owned(), content.to_owned());
        if mark_update {
            self.update_send.insert(path.to_owned());
        }
    }

    /// Overwrites an existing entry, returning `false` if `path` is unknown.
    pub fn write_existing(&mut self, path: &str, content: &str) -> bool {
        match self.files.get_mut(path) {
            Some(slot) => {
                content.clone_into(slot);
                true
            }
            None => false,
        }
    }

    pub fn get_content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn remove_file(&mut self, path: &str) -> Option<String> {
        self.first_send.remove(path);
        self.update_send.remove(path);
        self.files.remove(path)
    }

    /// Replaces the whole map; every file becomes pending first-send.
    pub fn set_files(&mut self, files: BTreeMap<String, String>) {
        self.first_send = files.keys().cloned().collect();
        self.update_send.clear();
        self.files = files;
    }

    pub fn set_old_files(&mut self, files: BTreeMap<String, String>) {
        self.old_files = files;
    }

    pub fn old_content(&self, path: &str) -> Option<&str> {
        self.old_files.get(path).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.old_files.clear();
        self.first_send.clear();
        self.update_send.clear();
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    /// Snapshot of files still pending their first send.
    pub fn first_send_files(&self) -> BTreeMap<String, String> {
        self.collect(&self.first_send)
    }

    /// Snapshot of files changed since the last finalized turn.
    pub fn update_send_files(&self) -> BTreeMap<String, String> {
        self.collect(&self.update_send)
    }

    pub fn clear_send_flags(&mut self) {
        self.first_send.clear();
        self.update_send.clear();
    }

    fn collect(&self, keys: &BTreeSet<String>) -> BTreeMap<String, String> {
        keys.iter()
            .filter_map(|k| self.files.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }
}
