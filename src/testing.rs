/*
 * Test Fixtures
 *
 * A regular file mapped MAP_SHARED behaves like device memory for plain
 * loads and stores, so register tests run against scratch files in the
 * system temp directory.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Temporary file of a fixed size, removed on drop
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create a zero-filled scratch file of `len` bytes
    pub fn new(tag: &str, len: u64) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "uioctl-{}-{}-{}",
            tag,
            std::process::id(),
            id
        ));
        let file = fs::File::create(&path).expect("create scratch file");
        file.set_len(len).expect("size scratch file");
        Self { path }
    }

    /// Create a scratch file holding exactly `bytes`
    pub fn with_contents(tag: &str, bytes: &[u8]) -> Self {
        let scratch = Self::new(tag, 0);
        fs::write(&scratch.path, bytes).expect("fill scratch file");
        scratch
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current on-disk contents
    pub fn contents(&self) -> Vec<u8> {
        fs::read(&self.path).expect("read scratch file")
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
