//! Command guard for restricted local execution
//!
//! A regex deny-list applied to code blocks before they run. Used by the
//! local executor when the restriction level asks for it; Docker-backed
//! execution relies on container isolation instead.

use regex::Regex;

use crate::{block::CodeBlock, error::ExecError, Result};

/// Deny-list guard over generated shell and python code
pub struct CommandGuard {
    patterns: Vec<(Regex, &'static str)>,
    extra: Vec<Regex>,
}

// Patterns that end machines, not tasks.
const SHELL_DENY: &[(&str, &str)] = &[
    (r"\brm\s+(-\w+\s+)*-\w*[rf]\w*[rf]?\b", "recursive/forced rm"),
    (r"\bsudo\b", "privilege escalation"),
    (r"\bmkfs\b", "filesystem format"),
    (r"\b(shutdown|reboot|halt|poweroff)\b", "host shutdown"),
    (r"\bdd\s+if=", "raw disk write"),
    (r">\s*/dev/sd[a-z]", "raw device write"),
    (r":\(\)\s*\{.*\};\s*:", "fork bomb"),
    (r"\bchown\s+(-\w+\s+)*root\b", "ownership change to root"),
];

const PYTHON_DENY: &[(&str, &str)] = &[
    (r"os\.system\s*\(", "shell escape via os.system"),
    (r"shutil\.rmtree\s*\(\s*['\x22]/", "recursive delete from filesystem root"),
    (r"os\.remove\s*\(\s*['\x22]/etc/", "system file removal"),
    (r"subprocess\.\w+\s*\(\s*['\x22]\s*(sudo|rm\s+-rf)", "dangerous subprocess"),
    (r"ctypes\.\w*dll", "native library loading"),
];

impl CommandGuard {
    /// Create the default guard used at restriction level 2 and above
    pub fn strict() -> Self {
        let patterns = SHELL_DENY
            .iter()
            .chain(PYTHON_DENY.iter())
            .map(|(pattern, reason)| {
                (
                    Regex::new(pattern).expect("valid deny pattern"),
                    *reason,
                )
            })
            .collect();

        Self {
            patterns,
            extra: Vec::new(),
        }
    }

    /// Add a caller-supplied deny pattern
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| ExecError::Pattern(format!("{}: {}", pattern, e)))?;
        self.extra.push(regex);
        Ok(self)
    }

    /// Check a block; returns the rejection reason if it must not run
    pub fn check(&self, block: &CodeBlock) -> Option<String> {
        for (pattern, reason) in &self.patterns {
            if pattern.is_match(&block.code) {
                return Some(format!(
                    "code matched restricted pattern ({}): {}",
                    reason,
                    pattern.as_str()
                ));
            }
        }
        for pattern in &self.extra {
            if pattern.is_match(&block.code) {
                return Some(format!(
                    "code matched restricted pattern: {}",
                    pattern.as_str()
                ));
            }
        }
        None
    }
}
