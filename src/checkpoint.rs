//! Artifact manager.
//!
//! The polluter file is overwritten many times during search; the checkpoint
//! guard captures its original bytes up front and puts them back on every
//! exit path. `restore` is the normal path, `Drop` covers error unwinds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

pub struct CheckpointGuard {
    path: PathBuf,
    original: String,
    restored: bool,
}

impl CheckpointGuard {
    pub fn capture(path: &Path) -> io::Result<Self> {
        let original = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            original,
            restored: false,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Overwrite the artifact with a candidate. Must be followed by oracle
    /// verification before the next write.
    pub fn write_candidate(&self, text: &str) -> io::Result<()> {
        fs::write(&self.path, text)
    }

    /// Put the original bytes back. Consumes the guard so restoration
    /// happens at most once on the success path.
    pub fn restore(mut self) -> io::Result<()> {
        fs::write(&self.path, &self.original)?;
        self.restored = true;
        Ok(())
    }
}

impl Drop for CheckpointGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = fs::write(&self.path, &self.original);
        }
    }
}

/// Polluter-specific output directory: `<base>/minimized/<sha8>` where the
/// discriminator hashes the full polluter node id.
pub fn output_dir(base: &Path, polluter_id: &str) -> PathBuf {
    let digest = Sha256::digest(polluter_id.as_bytes());
    base.join("minimized").join(&hex::encode(digest)[..8])
}

/// Write the final minimized function to `<out_dir>/<function>_minimized.py`.
/// Written exactly once, after the original artifact has been restored.
pub fn emit_minimized(out_dir: &Path, function_name: &str, rendered: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}_minimized.py", function_name));
    fs::write(&path, rendered)?;
    Ok(path)
}
