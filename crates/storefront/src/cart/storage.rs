//! Cart persistence.
//!
//! The cart survives restarts via a small JSON document. Loading never
//! fails: a missing file is an empty cart, and a corrupt one is logged and
//! discarded rather than wedging the shop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::cart::CartLine;

/// Versioned key naming the persisted cart document. Bump the suffix when
/// the line format changes incompatibly.
pub const CART_STORAGE_KEY: &str = "spc_cart_v1";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write cart: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait CartStorage: Send + Sync {
    /// Loads the persisted cart. Infallible by contract: anything
    /// unreadable comes back as an empty cart.
    fn load(&self) -> Vec<CartLine>;

    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError>;
}

/// JSON-file storage used in production.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional file under `dir`, named after [`CART_STORAGE_KEY`].
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{CART_STORAGE_KEY}.json")))
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Vec<CartLine> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read cart, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cart file corrupt, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string(lines)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral kiosk sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    lines: Mutex<Vec<CartLine>>,
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Vec<CartLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.lines.lock() {
            *guard = lines.to_vec();
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use sugarplum_core::ProductId;

    use super::*;

    fn line(name: &str, qty: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(name),
            product_name: name.to_owned(),
            kind: "T-Shirts".to_owned(),
            color: "Red".to_owned(),
            size: "M".to_owned(),
            print_location: None,
            unit_price: Decimal::new(1800, 2),
            quantity: qty,
            external_variant_id: None,
            sku: None,
            image: None,
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        storage.save(&[line("Tee", 2)]).unwrap();
        let loaded = storage.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].quantity, 2);
    }

    #[test]
    fn test_missing_file_is_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonFileStorage::in_dir(dir.path()).load().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        std::fs::write(dir.path().join(format!("{CART_STORAGE_KEY}.json")), "{nope").unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::default();
        storage.save(&[line("Tee", 1)]).unwrap();
        assert_eq!(storage.load().len(), 1);
    }
}
