//! Image list file parsing

use crate::error::{ReplikaError, Result};
use std::path::Path;

/// Image names read from a list file, one per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageList {
    names: Vec<String>,
}

impl ImageList {
    /// Blank lines are skipped and surrounding whitespace is trimmed.
    pub fn parse(content: &str) -> Self {
        let names = content
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReplikaError::ImageList {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
