// Depth-first directory tree walker
//
// Runs on an explicit stack of directory frames. Each frame owns the records
// of the directory region it is enumerating (the whole root region, or the
// current cluster of a chain). The stack is exactly the current recursion
// path, so it doubles as the ancestor set for cycle detection.

use super::boot_sector::VolumeGeometry;
use super::directory_entry::{decode_entry, DirEntry, EntryOutcome};
use super::fat_table::{ClusterLink, FatTable};
use super::findings::{Finding, FindingKind};
use crate::fat_common::constants::{DIR_ENTRY_SIZE, FAT16_FIRST_DATA_CLUSTER};
use fatwalk_core::{ByteSource, CancelFlag, FatwalkError, Result, ScanOptions};
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::HashSet;

/// Where a directory's records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryLocation {
    /// The fixed-size region between the FATs and the data area.
    Root,
    /// A cluster chain through the FAT.
    Cluster(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    EnumeratingRootRegion,
    EnumeratingClusterChain(u16),
    Done,
}

/// A file (or, on request, a directory) found by the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalNode {
    pub path: Vec<String>,
    pub entry: DirEntry,
}

impl TraversalNode {
    pub fn display_path(&self) -> String {
        display_path(&self.path)
    }

    /// Number of directories between the root and this node.
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

pub fn display_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

struct Frame {
    location: DirectoryLocation,
    path: Vec<String>,
    state: WalkState,
    records: Vec<u8>,
    cursor: usize,
    chain_seen: HashSet<u16>,
}

impl Frame {
    fn has_record(&self) -> bool {
        self.cursor + DIR_ENTRY_SIZE <= self.records.len()
    }

    fn take_record(&mut self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw.copy_from_slice(&self.records[self.cursor..self.cursor + DIR_ENTRY_SIZE]);
        self.cursor += DIR_ENTRY_SIZE;
        raw
    }
}

/// Lazy, depth-first sequence of [`TraversalNode`]s.
///
/// Anomalies local to one directory are recorded as [`Finding`]s and the walk
/// carries on with the siblings. Fatal errors are yielded once, after which
/// the iterator is exhausted.
pub struct DirectoryWalker<'a, S: ByteSource + ?Sized> {
    source: &'a S,
    geometry: &'a VolumeGeometry,
    fat: Option<&'a FatTable>,
    options: ScanOptions,
    cancel: Option<CancelFlag>,
    start: Option<(DirectoryLocation, Vec<String>)>,
    stack: Vec<Frame>,
    findings: Vec<Finding>,
    finished: bool,
}

impl<'a, S: ByteSource + ?Sized> DirectoryWalker<'a, S> {
    /// Walk from the root directory.
    pub fn new(
        source: &'a S,
        geometry: &'a VolumeGeometry,
        fat: Option<&'a FatTable>,
        options: ScanOptions,
    ) -> Self {
        Self::starting_at(source, geometry, fat, options, DirectoryLocation::Root, Vec::new())
    }

    /// Walk the subtree of the directory at `location`, prefixing node paths with `path`.
    pub fn starting_at(
        source: &'a S,
        geometry: &'a VolumeGeometry,
        fat: Option<&'a FatTable>,
        options: ScanOptions,
        location: DirectoryLocation,
        path: Vec<String>,
    ) -> Self {
        Self {
            source,
            geometry,
            fat,
            options,
            cancel: None,
            start: Some((location, path)),
            stack: Vec::new(),
            findings: Vec::new(),
            finished: false,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    /// State of the directory currently being enumerated, or about to be.
    pub fn state(&self) -> WalkState {
        match &self.start {
            Some((DirectoryLocation::Root, _)) => WalkState::EnumeratingRootRegion,
            Some((DirectoryLocation::Cluster(cluster), _)) => {
                WalkState::EnumeratingClusterChain(*cluster)
            }
            None => self.stack.last().map_or(WalkState::Done, |frame| frame.state),
        }
    }

    fn record(&mut self, path: String, kind: FindingKind) {
        warn!("{}: {}", path, kind);
        self.findings.push(Finding::new(path, kind));
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }

    fn require_fat(&self) -> Result<&'a FatTable> {
        self.fat.ok_or_else(|| FatwalkError::TruncatedFat {
            expected: self.geometry.fat_size_bytes() as u64,
            available: self.source.len().saturating_sub(self.geometry.fat_offset()),
        })
    }

    /// Read one data cluster, or record why it cannot be read.
    fn load_cluster(&mut self, cluster: u16, path: &str) -> Result<Option<Vec<u8>>> {
        let fat = self.require_fat()?;
        if !fat.contains(cluster) {
            self.record(path.to_string(), FindingKind::ClusterOutOfRange(cluster));
            return Ok(None);
        }
        let offset = match self.geometry.cluster_offset(cluster) {
            Some(offset) => offset,
            None => {
                self.record(path.to_string(), FindingKind::InvalidDirectoryCluster(cluster));
                return Ok(None);
            }
        };
        let len = self.geometry.bytes_per_cluster() as usize;
        if !self.source.contains_range(offset, len as u64) {
            self.record(path.to_string(), FindingKind::ClusterBeyondImage(cluster));
            return Ok(None);
        }
        trace!("Reading cluster {} at offset {:#x}", cluster, offset);
        self.source.read_vec(offset, len).map(Some)
    }

    fn open_frame(
        &mut self,
        location: DirectoryLocation,
        path: Vec<String>,
    ) -> Result<Option<Frame>> {
        let shown = display_path(&path);
        let (state, records) = match location {
            DirectoryLocation::Root => {
                let records = self.source.read_vec(
                    self.geometry.root_dir_offset(),
                    self.geometry.root_dir_byte_size() as usize,
                )?;
                (WalkState::EnumeratingRootRegion, records)
            }
            DirectoryLocation::Cluster(cluster) => match self.load_cluster(cluster, &shown)? {
                Some(records) => (WalkState::EnumeratingClusterChain(cluster), records),
                None => return Ok(None),
            },
        };
        debug!("Entering directory {} ({:?})", shown, location);

        let mut chain_seen = HashSet::new();
        if let DirectoryLocation::Cluster(cluster) = location {
            chain_seen.insert(cluster);
        }
        Ok(Some(Frame {
            location,
            path,
            state,
            records,
            cursor: 0,
            chain_seen,
        }))
    }

    /// Move the top frame to the next cluster of its chain, or finish it.
    fn advance_top(&mut self) -> Result<()> {
        let (current, shown) = match self.stack.last_mut() {
            Some(frame) => match frame.state {
                WalkState::EnumeratingClusterChain(cluster) => (cluster, display_path(&frame.path)),
                _ => {
                    frame.state = WalkState::Done;
                    return Ok(());
                }
            },
            None => return Ok(()),
        };

        let next = match self.require_fat()?.link(current) {
            Ok(ClusterLink::Next(next)) => Some(next),
            Ok(ClusterLink::EndOfChain) => None,
            Ok(ClusterLink::Bad) => {
                self.record(shown.clone(), FindingKind::BadCluster(current));
                None
            }
            Ok(ClusterLink::Corrupt(value)) => {
                let kind = FindingKind::CorruptChainLink {
                    cluster: current,
                    value,
                };
                self.record(shown.clone(), kind);
                None
            }
            Err(FatwalkError::ClusterOutOfRange { cluster, .. }) => {
                self.record(shown.clone(), FindingKind::ClusterOutOfRange(cluster));
                None
            }
            Err(e) => return Err(e),
        };

        let revisits = match (next, self.stack.last()) {
            (Some(next), Some(frame)) => frame.chain_seen.contains(&next),
            _ => false,
        };
        let loaded = match next {
            Some(next) if revisits => {
                self.record(shown, FindingKind::ChainCycle(next));
                None
            }
            Some(next) => self.load_cluster(next, &shown)?.map(|records| (next, records)),
            None => None,
        };

        if let Some(frame) = self.stack.last_mut() {
            match loaded {
                Some((next, records)) => {
                    frame.records = records;
                    frame.cursor = 0;
                    frame.state = WalkState::EnumeratingClusterChain(next);
                    frame.chain_seen.insert(next);
                }
                None => frame.state = WalkState::Done,
            }
        }
        Ok(())
    }

    /// Push a frame for a subdirectory unless it is unsafe or too deep to enter.
    fn descend(&mut self, cluster: u16, path: Vec<String>) -> Result<()> {
        let shown = display_path(&path);
        if cluster < FAT16_FIRST_DATA_CLUSTER {
            self.record(shown, FindingKind::InvalidDirectoryCluster(cluster));
            return Ok(());
        }
        let location = DirectoryLocation::Cluster(cluster);
        if self.stack.iter().any(|frame| frame.location == location) {
            self.record(shown, FindingKind::DirectoryCycle(cluster));
            return Ok(());
        }
        if !self.options.allows_depth(path.len()) {
            self.record(shown, FindingKind::DepthLimitReached(cluster));
            return Ok(());
        }
        if let Some(frame) = self.open_frame(location, path)? {
            self.stack.push(frame);
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<TraversalNode>> {
        if let Some((location, path)) = self.start.take() {
            if let Some(frame) = self.open_frame(location, path)? {
                self.stack.push(frame);
            }
        }

        loop {
            if self.is_cancelled() {
                return Err(FatwalkError::UserCancelled);
            }
            let frame = match self.stack.last_mut() {
                Some(frame) => frame,
                None => return Ok(None),
            };
            if frame.state == WalkState::Done {
                self.stack.pop();
                continue;
            }
            if !frame.has_record() {
                self.advance_top()?;
                continue;
            }

            let raw = frame.take_record();
            let entry = match decode_entry(&raw) {
                EntryOutcome::EndOfDirectory => {
                    // 0x00 ends the directory, not just the current cluster.
                    frame.state = WalkState::Done;
                    continue;
                }
                EntryOutcome::Deleted | EntryOutcome::VolumeLabel => continue,
                EntryOutcome::Rejected { raw_name } => {
                    debug!(
                        "Skipping entry with invalid name {} in {}",
                        hex::encode(raw_name),
                        display_path(&frame.path)
                    );
                    continue;
                }
                EntryOutcome::Valid(entry) => entry,
            };

            if entry.is_directory() && entry.is_dot_entry() {
                continue;
            }
            let mut path = frame.path.clone();
            path.push(entry.name.clone());

            if !entry.is_directory() {
                return Ok(Some(TraversalNode { path, entry }));
            }

            let node = if self.options.include_directories {
                Some(TraversalNode {
                    path: path.clone(),
                    entry: entry.clone(),
                })
            } else {
                None
            };
            self.descend(entry.first_cluster, path)?;
            if node.is_some() {
                return Ok(node);
            }
        }
    }
}

impl<S: ByteSource + ?Sized> Iterator for DirectoryWalker<'_, S> {
    type Item = Result<TraversalNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(node)) => Some(Ok(node)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                self.stack.clear();
                Some(Err(e))
            }
        }
    }
}

impl<S: ByteSource + ?Sized> std::iter::FusedIterator for DirectoryWalker<'_, S> {}
