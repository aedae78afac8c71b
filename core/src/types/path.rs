use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Messages;
use crate::error::{ErrorReason, InputError, SchemaError};
use crate::value::{RawValue, Value};

/// Which filesystem entries a [`PathType`] accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    #[default]
    Any,
    File,
    Dir,
}

/// Filesystem paths, resolved and filtered.
///
/// A raw value resolves to absolute paths (`canonicalize`, or glob expansion
/// when [`glob`](PathType::glob) is enabled), then is filtered in order by
/// pattern, kind and writability; each filter that empties the set is an
/// error with its own reason. Finally the count must lie within
/// `[min, max]` (min defaults to 1). The result is a single
/// [`Value::Path`], or a [`Value::List`] of paths when
/// [`multiple`](PathType::multiple) is set.
#[derive(Debug, Clone)]
pub struct PathType {
    min: usize,
    max: Option<usize>,
    multiple: bool,
    glob: bool,
    kind: PathKind,
    writable: bool,
    pattern: Option<Regex>,
    default: Option<Value>,
    messages: Messages,
}

impl Default for PathType {
    fn default() -> Self {
        Self {
            min: 1,
            max: None,
            multiple: false,
            glob: false,
            kind: PathKind::Any,
            writable: false,
            pattern: None,
            default: None,
            messages: Messages::default(),
        }
    }
}

impl PathType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum number of resolved paths (at least 1).
    pub fn min(mut self, value: usize) -> Result<Self, SchemaError> {
        if value < 1 {
            return Err(SchemaError::InvalidLimit(value));
        }
        if let Some(max) = self.max.filter(|&max| value > max) {
            return Err(SchemaError::InvalidBounds {
                min: value.to_string(),
                max: max.to_string(),
            });
        }
        self.min = value;
        Ok(self)
    }

    /// Maximum number of resolved paths.
    pub fn max(mut self, value: usize) -> Result<Self, SchemaError> {
        if value < 1 {
            return Err(SchemaError::InvalidLimit(value));
        }
        if value < self.min {
            return Err(SchemaError::InvalidBounds {
                min: self.min.to_string(),
                max: value.to_string(),
            });
        }
        self.max = Some(value);
        Ok(self)
    }

    /// Regular expression each resolved path must match.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Return every resolved path instead of the first one.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Expand the raw value as a glob pattern.
    pub fn glob(mut self) -> Self {
        self.glob = true;
        self
    }

    pub fn file(mut self) -> Self {
        self.kind = PathKind::File;
        self
    }

    pub fn dir(mut self) -> Self {
        self.kind = PathKind::Dir;
        self
    }

    pub fn kind(mut self, kind: PathKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<PathBuf>) -> Self {
        self.default = Some(Value::Path(value.into()));
        self
    }

    /// Overrides the message template used for `reason`.
    pub fn message(mut self, reason: ErrorReason, message: impl Into<String>) -> Self {
        self.messages.set(reason, message);
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn validate(&self, option: &str, raw: &RawValue) -> Result<Value, InputError> {
        let (shown, mut paths) = match raw {
            RawValue::Text(text) => (text.clone(), self.resolve(text)),
            RawValue::List(items) => {
                let mut paths = Vec::new();
                for item in items {
                    for path in self.resolve(item) {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                }
                (items.join(" "), paths)
            }
            RawValue::Flag => (String::new(), Vec::new()),
        };
        let err = |reason: ErrorReason, extra: &[(&'static str, usize)]| {
            let mut params = vec![("option", option.to_string()), ("value", shown.clone())];
            params.extend(extra.iter().map(|&(key, n)| (key, n.to_string())));
            self.messages.error(reason, &params)
        };

        if paths.is_empty() {
            return Err(err(ErrorReason::InvalidPath, &[]));
        }

        if let Some(regex) = &self.pattern {
            paths.retain(|p| regex.is_match(&p.to_string_lossy()));
            if paths.is_empty() {
                return Err(err(ErrorReason::PatternMismatch, &[]));
            }
        }

        match self.kind {
            PathKind::Any => {}
            PathKind::Dir => {
                paths.retain(|p| p.is_dir());
                if paths.is_empty() {
                    return Err(err(ErrorReason::RequireDir, &[]));
                }
            }
            PathKind::File => {
                paths.retain(|p| p.is_file());
                if paths.is_empty() {
                    return Err(err(ErrorReason::RequireFile, &[]));
                }
            }
        }

        if self.writable {
            paths.retain(|p| is_writable(p));
            if paths.is_empty() {
                return Err(err(ErrorReason::RequireWritable, &[]));
            }
        }

        let count = paths.len();
        if count < self.min {
            return Err(err(
                ErrorReason::PathCountBelowMin,
                &[("min", self.min), ("count", count)],
            ));
        }
        if let Some(max) = self.max.filter(|&max| count > max) {
            return Err(err(
                ErrorReason::PathCountAboveMax,
                &[("max", max), ("count", count)],
            ));
        }

        if self.multiple {
            Ok(Value::List(paths.into_iter().map(Value::Path).collect()))
        } else {
            Ok(Value::Path(paths.swap_remove(0)))
        }
    }

    fn resolve(&self, raw: &str) -> Vec<PathBuf> {
        if raw.is_empty() {
            return Vec::new();
        }
        if !self.glob {
            return fs::canonicalize(raw).into_iter().collect();
        }
        match glob::glob(raw) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|p| fs::canonicalize(&p).unwrap_or(p))
                .collect(),
            Err(e) => {
                debug!(pattern = raw, error = %e, "Invalid glob pattern");
                Vec::new()
            }
        }
    }
}

fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| !meta.permissions().readonly())
        .unwrap_or(false)
}
