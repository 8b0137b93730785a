//! Locating the live configuration files
//!
//! The AmneziaWG server keeps its state in two files inside its container.
//! They are reached through the container's merged overlay directory on the
//! host. Looking that directory up is delegated to a [`ContainerPathResolver`];
//! the rest of the crate only ever sees the resolved [`LivePaths`].

mod docker;

use std::fmt;
use std::path::{Path, PathBuf};

pub use docker::DockerResolver;

use crate::config::ContainerSource;

/// One of the two configuration files managed by awg-backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedFile {
    /// WireGuard-style interface and peer configuration
    WgConf,
    /// JSON array of client records
    ClientsTable,
}

impl TrackedFile {
    /// Every tracked file, in backup order
    pub const ALL: [TrackedFile; 2] = [TrackedFile::WgConf, TrackedFile::ClientsTable];

    /// Base name of the file, both live and inside a backup set
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::WgConf => "wg0.conf",
            Self::ClientsTable => "clientsTable",
        }
    }

    /// Location of the file relative to the container's filesystem root
    pub fn container_path(&self) -> &'static str {
        match self {
            Self::WgConf => "opt/amnezia/awg/wg0.conf",
            Self::ClientsTable => "opt/amnezia/awg/clientsTable",
        }
    }
}

impl fmt::Display for TrackedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Outcome of looking up the container's filesystem root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerResolution {
    /// The container is running and its root is at this path
    Found(PathBuf),
    /// The lookup failed; the reason is meant for the operator
    NotFound(String),
}

/// Finds the host directory holding a container's filesystem
pub trait ContainerPathResolver {
    fn resolve_root(&self) -> ContainerResolution;
}

/// Resolver that always answers with a fixed directory
#[derive(Debug, Clone)]
pub struct FixedRootResolver {
    root: PathBuf,
}

impl FixedRootResolver {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ContainerPathResolver for FixedRootResolver {
    fn resolve_root(&self) -> ContainerResolution {
        ContainerResolution::Found(self.root.clone())
    }
}

/// Build the resolver configured for this run
pub fn resolver_for(source: &ContainerSource) -> Box<dyn ContainerPathResolver> {
    match source {
        ContainerSource::Docker { name } => Box::new(DockerResolver::new(name.clone())),
        ContainerSource::FixedRoot(root) => Box::new(FixedRootResolver::new(root.clone())),
    }
}

/// Absolute host paths of the live tracked files
///
/// A path is `None` when the container could not be resolved; operations
/// then report that file as not found instead of failing outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivePaths {
    wg_conf: Option<PathBuf>,
    clients_table: Option<PathBuf>,
    unresolved_reason: Option<String>,
}

impl LivePaths {
    /// Live paths below a known container root
    pub fn under_root(root: &Path) -> Self {
        Self {
            wg_conf: Some(root.join(TrackedFile::WgConf.container_path())),
            clients_table: Some(root.join(TrackedFile::ClientsTable.container_path())),
            unresolved_reason: None,
        }
    }

    /// Live paths for a container that could not be found
    pub fn unresolved(reason: impl Into<String>) -> Self {
        Self {
            wg_conf: None,
            clients_table: None,
            unresolved_reason: Some(reason.into()),
        }
    }

    /// Resolve the live paths through the given resolver
    pub fn resolve(resolver: &dyn ContainerPathResolver) -> Self {
        match resolver.resolve_root() {
            ContainerResolution::Found(root) => {
                tracing::debug!(root = %root.display(), "Resolved container root");
                Self::under_root(&root)
            }
            ContainerResolution::NotFound(reason) => {
                tracing::warn!(%reason, "Container root not resolved");
                Self::unresolved(reason)
            }
        }
    }

    /// Path of a tracked file, if resolved
    pub fn path(&self, file: TrackedFile) -> Option<&Path> {
        match file {
            TrackedFile::WgConf => self.wg_conf.as_deref(),
            TrackedFile::ClientsTable => self.clients_table.as_deref(),
        }
    }

    /// Why the paths are missing, if they are
    pub fn unresolved_reason(&self) -> Option<&str> {
        self.unresolved_reason.as_deref()
    }
}
