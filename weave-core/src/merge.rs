//! Three-panel merge editor.
//!
//! Mounting registers three virtual files (original, modified, result) in the
//! file store and derives conflict blocks by wrapping the two inputs in a
//! synthetic SEARCH/REPLACE document. The whole original is the search side and
//! the whole modified text is the replace side, so exactly one block spanning
//! both documents is produced. Per-hunk choices are therefore not possible yet.
//!
//! The user builds the result by picking blocks: the first pick replaces a
//! blank buffer, later picks append after a newline.

use crate::diff::{parse_diff_blocks, DiffBlock, LineSpan, REPLACE_MARKER, SEARCH_MARKER, SEPARATOR_MARKER};
use crate::error::MergeError;
use crate::files::FileStore;

pub const ORIGINAL_FILE: &str = "merge-editor-original.js";
pub const MODIFIED_FILE: &str = "merge-editor-modified.js";
pub const RESULT_FILE: &str = "merge-editor-result.js";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeState {
    #[default]
    Uninitialized,
    /// Mounted, no block applied yet.
    Ready,
    /// At least one block applied to the result buffer.
    Editing,
}

/// A paired span of original/modified text offered for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictBlock {
    pub search: LineSpan,
    pub replace: LineSpan,
    pub original_text: String,
    pub modified_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Modified,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Original => "original",
            Side::Modified => "modified",
        }
    }
}

/// Outcome of an apply call, turned into a toast by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { side: Side, block: usize },
    /// The index did not name a block; nothing changed.
    NoSuchBlock(usize),
}

impl ApplyOutcome {
    pub fn message(&self) -> String {
        match self {
            ApplyOutcome::Applied { side, .. } => format!("Applied {} content", side.label()),
            ApplyOutcome::NoSuchBlock(idx) => format!("No conflict block #{idx}"),
        }
    }
}

type CompleteFn = Box<dyn FnMut(String) + Send>;
type CancelFn = Box<dyn FnMut() + Send>;

#[derive(Default)]
pub struct MergeEditor {
    state: MergeState,
    blocks: Vec<ConflictBlock>,
    result: String,
    on_complete: Option<CompleteFn>,
    on_cancel: Option<CancelFn>,
}

impl std::fmt::Debug for MergeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEditor")
            .field("state", &self.state)
            .field("blocks", &self.blocks)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Builds the synthetic conflict document fed to [`parse_diff_blocks`].
pub fn conflict_document(original: &str, modified: &str) -> String {
    [SEARCH_MARKER, original, SEPARATOR_MARKER, modified, REPLACE_MARKER].join("\n")
}

impl MergeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> MergeState {
        self.state
    }

    pub fn blocks(&self) -> &[ConflictBlock] {
        &self.blocks
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// Registers the virtual files and computes the conflict blocks.
    ///
    /// Re-mounting resets the result buffer.
    pub fn mount(&mut self, files: &mut FileStore, original: &str, modified: &str) {
        files.add_file(ORIGINAL_FILE, original);
        files.add_file(MODIFIED_FILE, modified);
        files.add_file(RESULT_FILE, "");

        // The document is synthetic, so the block layout is known up front.
        // Inputs that contain marker lines of their own would mislead a
        // re-scan, so the parsed blocks are only checked against it.
        let orig_lines = original.split('\n').count();
        let mod_lines = modified.split('\n').count();
        let block = DiffBlock {
            search: LineSpan { start: 0, end: orig_lines + 1 },
            replace: LineSpan { start: orig_lines + 1, end: orig_lines + mod_lines + 2 },
        };
        if parse_diff_blocks(&conflict_document(original, modified)) != [block] {
            tracing::debug!("merge inputs contain conflict markers; using known block layout");
        }
        self.blocks = vec![ConflictBlock {
            search: block.search,
            replace: block.replace,
            original_text: original.to_owned(),
            modified_text: modified.to_owned(),
        }];
        self.result.clear();
        self.state = MergeState::Ready;
        tracing::debug!(blocks = self.blocks.len(), "merge editor mounted");
    }

    pub fn apply_original(
        &mut self,
        files: &mut FileStore,
        block: usize,
    ) -> Result<ApplyOutcome, MergeError> {
        self.apply(files, block, Side::Original)
    }

    pub fn apply_modified(
        &mut self,
        files: &mut FileStore,
        block: usize,
    ) -> Result<ApplyOutcome, MergeError> {
        self.apply(files, block, Side::Modified)
    }

    fn apply(
        &mut self,
        files: &mut FileStore,
        index: usize,
        side: Side,
    ) -> Result<ApplyOutcome, MergeError> {
        if self.state == MergeState::Uninitialized {
            return Err(MergeError::NotMounted);
        }
        let Some(block) = self.blocks.get(index) else {
            return Ok(ApplyOutcome::NoSuchBlock(index));
        };
        let text = match side {
            Side::Original => &block.original_text,
            Side::Modified => &block.modified_text,
        };

        let next = if self.result.trim().is_empty() {
            text.clone()
        } else {
            format!("{}\n{}", self.result, text)
        };

        if !files.write_existing(RESULT_FILE, &next) {
            tracing::error!(file = RESULT_FILE, "merge result file vanished");
            return Err(MergeError::ResultFileMissing(RESULT_FILE.to_owned()));
        }
        self.result = next;
        self.state = MergeState::Editing;
        Ok(ApplyOutcome::Applied { side, block: index })
    }

    /// Hands the final result to the completion callback and returns it.
    ///
    /// The stored result file wins; the local buffer is used when the file is
    /// missing or empty.
    pub fn complete(&mut self, files: &FileStore) -> String {
        let result = files
            .get_content(RESULT_FILE)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.result.as_str())
            .to_owned();
        if let Some(cb) = self.on_complete.as_mut() {
            cb(result.clone());
        }
        result
    }

    /// Invokes the cancel callback. Stored files are left untouched.
    pub fn cancel(&mut self) {
        if let Some(cb) = self.on_cancel.as_mut() {
            cb();
        }
    }

    /// Drops the virtual files and returns to `Uninitialized`.
    pub fn unmount(&mut self, files: &mut FileStore) {
        for path in [ORIGINAL_FILE, MODIFIED_FILE, RESULT_FILE] {
            files.remove_file(path);
        }
        self.blocks.clear();
        self.result.clear();
        self.state = MergeState::Uninitialized;
    }
}
