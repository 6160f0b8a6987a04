use std::fs;
use std::path::Path;

use rusty_signer_core::KeyfileError;

/// Reads user-selected keyfiles, refusing anything above the size limit.
#[derive(Debug, Clone, Copy)]
pub struct KeyfileReader {
    max_bytes: usize,
}

impl KeyfileReader {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn read(&self, path: &Path) -> Result<String, KeyfileError> {
        let metadata = fs::metadata(path).map_err(|e| KeyfileError::Read(e.to_string()))?;
        if metadata.len() > self.max_bytes as u64 {
            return Err(KeyfileError::TooLarge {
                limit: self.max_bytes,
            });
        }
        let bytes = fs::read(path).map_err(|e| KeyfileError::Read(e.to_string()))?;
        if bytes.len() > self.max_bytes {
            return Err(KeyfileError::TooLarge {
                limit: self.max_bytes,
            });
        }
        String::from_utf8(bytes).map_err(|_| KeyfileError::Invalid)
    }
}
