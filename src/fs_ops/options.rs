//! Per-write permission options.
//!
//! Precedence when choosing the final mode, highest first:
//!  1) `file_mode` (explicit override)
//!  2) the existing target's mode, when `keep_file_mode` is set and a target exists
//!  3) `default_file_mode` (only meaningful when no target exists)
//!  4) whatever mode the temp file was created with
//!
//! A mode of zero at any level is "no opinion" and falls through to the next.

/// Permission bits we are willing to set (rwx for u/g/o plus setuid/setgid/sticky).
pub const MODE_MASK: u32 = 0o7777;

/// Options controlling the permission bits of the replaced file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    file_mode: Option<u32>,
    default_file_mode: Option<u32>,
    keep_file_mode: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            file_mode: None,
            default_file_mode: None,
            keep_file_mode: true,
        }
    }
}

/// Zero (after masking) means unset.
#[inline]
fn non_zero(mode: u32) -> Option<u32> {
    match mode & MODE_MASK {
        0 => None,
        m => Some(m),
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force these permission bits on the final file, whatever existed before.
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = non_zero(mode);
        self
    }

    /// Permission bits used only when nothing exists at the target yet.
    pub fn default_file_mode(mut self, mode: u32) -> Self {
        self.default_file_mode = non_zero(mode);
        self
    }

    /// Preserve an existing target's permission bits (default: true).
    pub fn keep_file_mode(mut self, keep: bool) -> Self {
        self.keep_file_mode = keep;
        self
    }

    pub fn get_file_mode(&self) -> Option<u32> {
        self.file_mode
    }

    pub fn get_default_file_mode(&self) -> Option<u32> {
        self.default_file_mode
    }

    pub fn get_keep_file_mode(&self) -> bool {
        self.keep_file_mode
    }

    /// Merge the options with what is on disk.
    ///
    /// `existing` is the target's current mode (`None` if there is no target or the
    /// platform has no mode bits); `temp_mode` is the temp file's creation mode.
    /// Returns `None` only when no level has an opinion.
    pub fn resolve_mode(&self, existing: Option<u32>, temp_mode: Option<u32>) -> Option<u32> {
        let keep = if self.keep_file_mode {
            existing.and_then(non_zero)
        } else {
            None
        };
        // default_file_mode only applies to brand new targets.
        let default = if existing.is_none() {
            self.default_file_mode
        } else {
            None
        };
        self.file_mode
            .or(keep)
            .or(default)
            .or_else(|| temp_mode.and_then(non_zero))
    }
}

/// Parse an octal mode string: `644`, `0644` or `0o644`.
pub fn parse_mode(s: &str) -> Result<u32, String> {
    let t = s.trim();
    let digits = t
        .strip_prefix("0o")
        .or_else(|| t.strip_prefix("0O"))
        .unwrap_or(t);
    if digits.is_empty() {
        return Err(format!("invalid file mode: '{s}' (expected octal such as 0644)"));
    }
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("invalid file mode: '{s}' (expected octal such as 0644)"))?;
    if mode & !MODE_MASK != 0 {
        return Err(format!("file mode out of range: '{s}' (max 7777)"));
    }
    Ok(mode)
}
