// Non-fatal anomalies found while reading a volume

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingKind {
    /// Sector 0 does not end in 0xAA55.
    InvalidBootSignature(u16),
    /// The FAT could not be loaded; only the root region is listable.
    FatUnavailable,
    BadCluster(u16),
    CorruptChainLink { cluster: u16, value: u16 },
    ClusterOutOfRange(u16),
    ClusterBeyondImage(u16),
    ChainCycle(u16),
    DirectoryCycle(u16),
    InvalidDirectoryCluster(u16),
    DepthLimitReached(u16),
}

/// An anomaly attached to the directory path where it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: String,
    pub kind: FindingKind,
}

impl Finding {
    pub fn new(path: impl Into<String>, kind: FindingKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FindingKind::InvalidBootSignature(sig) => {
                write!(f, "invalid boot signature {:#06x} (expected 0xaa55)", sig)
            }
            FindingKind::FatUnavailable => {
                write!(f, "FAT is truncated, subdirectories are unreachable")
            }
            FindingKind::BadCluster(c) => {
                write!(f, "chain reaches bad cluster marker after cluster {}", c)
            }
            FindingKind::CorruptChainLink { cluster, value } => {
                write!(f, "cluster {} links to reserved value {}", cluster, value)
            }
            FindingKind::ClusterOutOfRange(c) => write!(f, "cluster {} is outside the FAT", c),
            FindingKind::ClusterBeyondImage(c) => {
                write!(f, "cluster {} lies beyond the end of the image", c)
            }
            FindingKind::ChainCycle(c) => write!(f, "cluster chain loops back to cluster {}", c),
            FindingKind::DirectoryCycle(c) => {
                write!(f, "directory at cluster {} is its own ancestor, not descending", c)
            }
            FindingKind::InvalidDirectoryCluster(c) => {
                write!(f, "directory entry points at reserved cluster {}", c)
            }
            FindingKind::DepthLimitReached(c) => {
                write!(f, "directory at cluster {} exceeds the depth limit", c)
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}
