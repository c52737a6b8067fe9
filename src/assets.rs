//! Access to the downloadable model files

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::error::{MemoryError, Result};
use crate::matching::TagIndex;

pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of an indexed asset inside the store
    pub fn resolve(&self, index: &TagIndex, asset_id: &str) -> Result<PathBuf> {
        let mut components = Path::new(asset_id).components();
        let plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain_name {
            return Err(MemoryError::InvalidAssetId(asset_id.to_string()));
        }
        if !index.contains(asset_id) {
            return Err(MemoryError::UnknownAsset(asset_id.to_string()));
        }
        Ok(self.root.join(asset_id))
    }

    /// Copy an asset into `dest_dir` under its own file name
    pub fn download(&self, index: &TagIndex, asset_id: &str, dest_dir: &Path) -> Result<PathBuf> {
        let source = self.resolve(index, asset_id)?;
        fs::create_dir_all(dest_dir)?;
        let target = dest_dir.join(asset_id);
        let bytes = fs::copy(&source, &target)?;
        info!("Downloaded {} ({} bytes) to {:?}", asset_id, bytes, target);
        Ok(target)
    }
}
