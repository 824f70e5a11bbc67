//! Static route table.
//!
//! # Responsibilities
//! - Store `(path, asset)` entries in configuration order
//! - Resolve asset files against the static directory
//! - Hand the entries to the application server, which answers exact paths only
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan; the table holds a handful of pages
//! - Duplicate paths rejected at construction

use std::path::{Path, PathBuf};

use crate::config::RouteConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("route path {0:?} appears more than once")]
    Duplicate(String),
}

/// A single page mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    path: String,
    asset: PathBuf,
}

impl RouteEntry {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Asset location on disk.
    pub fn asset(&self) -> &Path {
        &self.asset
    }
}

/// Exact-path mapping from URL path to asset file.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build the table, resolving every file under `static_dir`.
    pub fn from_config(routes: &[RouteConfig], static_dir: &Path) -> Result<Self, RouteTableError> {
        let mut entries: Vec<RouteEntry> = Vec::with_capacity(routes.len());
        for route in routes {
            if entries.iter().any(|e| e.path == route.path) {
                return Err(RouteTableError::Duplicate(route.path.clone()));
            }
            entries.push(RouteEntry {
                path: route.path.clone(),
                asset: static_dir.join(&route.file),
            });
        }
        Ok(Self { entries })
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}
