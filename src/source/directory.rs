//! Directory-backed tile source.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CodecError;

use super::{decode::decode_tiff, DecodedTile, TileSource};

/// `true` for names ending in `.tif` or `.tiff`, case-insensitive.
pub fn is_tiff_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".tif") || lower.ends_with(".tiff")
}

/// Tiles read from the TIFF files of one directory.
///
/// The listing is taken once at construction. Only regular files (after
/// following symlinks) with a TIFF extension are kept; subdirectories are
/// not traversed.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
    names: Vec<String>,
}

impl DirectoryTileSource {
    /// List the TIFF files of `root` in directory order.
    ///
    /// With `sort`, names are ordered lexicographically instead, which makes
    /// overlap resolution reproducible across machines.
    pub fn open(root: impl AsRef<Path>, sort: bool) -> Result<Self, CodecError> {
        let root = root.as_ref().to_path_buf();
        let io_err = |e: std::io::Error| CodecError::Io {
            path: root.display().to_string(),
            message: e.to_string(),
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_tiff_name(&name) {
                continue;
            }
            if !entry.path().is_file() {
                debug!("Skipping non-file entry {}", name);
                continue;
            }
            names.push(name);
        }

        if sort {
            names.sort();
        }

        debug!("Listed {} TIFF file(s) in {}", names.len(), root.display());
        Ok(Self { root, names })
    }

    /// Directory the tiles are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the tile at `index`.
    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.names.get(index).map(|name| self.root.join(name))
    }
}

impl TileSource for DirectoryTileSource {
    fn identifiers(&self) -> &[String] {
        &self.names
    }

    fn decode(&self, index: usize) -> Result<DecodedTile, CodecError> {
        let name = self.names.get(index).ok_or_else(|| CodecError::Io {
            path: self.root.display().to_string(),
            message: format!("no tile at index {}", index),
        })?;
        let path = self.root.join(name);

        let file = File::open(&path).map_err(|e| CodecError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        decode_tiff(name, BufReader::new(file))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
