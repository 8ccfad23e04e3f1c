//! A design host backed by a JSON snapshot file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kleplate_board::{
    Component, ComponentMove, DesignHost, DesignSnapshot, HostError, Primitive, PrimitiveSource,
};

#[derive(Debug, Clone, Default)]
pub struct FileHost {
    path: Option<PathBuf>,
    snapshot: DesignSnapshot,
}

impl FileHost {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read design snapshot {}", path.display()))?;
        let snapshot: DesignSnapshot = serde_json::from_str(&text)
            .with_context(|| format!("invalid design snapshot {}", path.display()))?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            snapshot,
        })
    }

    /// Write the snapshot to `target`, or back to where it was loaded from.
    pub fn save(&self, target: Option<&Path>) -> Result<PathBuf> {
        let path = target
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .context("no path to write the design snapshot to")?;
        let text = serde_json::to_string_pretty(&self.snapshot)
            .context("failed to serialize design snapshot")?;
        std::fs::write(&path, text + "\n")
            .with_context(|| format!("failed to write design snapshot {}", path.display()))?;
        Ok(path)
    }
}

impl DesignHost for FileHost {
    fn components(&self) -> Result<Vec<Component>, HostError> {
        self.snapshot.components()
    }

    fn primitives(&self, source: PrimitiveSource) -> Result<Vec<Primitive>, HostError> {
        self.snapshot.primitives(source)
    }

    fn move_component(&mut self, id: &str, target: &ComponentMove) -> Result<(), HostError> {
        self.snapshot.move_component(id, target)
    }
}
