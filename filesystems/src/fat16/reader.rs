// FAT16 volume session: owns the image, its geometry and the loaded FAT

use super::boot_sector::VolumeGeometry;
use super::directory_entry::DirEntry;
use super::fat_table::FatTable;
use super::findings::{Finding, FindingKind};
use super::walker::{DirectoryWalker, TraversalNode};
use fatwalk_core::{ByteSource, CancelFlag, FatwalkError, FileSource, Result, ScanOptions};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

/// Summary used by the info report.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeInfo {
    pub fs_type: String,
    pub label: Option<String>,
    pub geometry: VolumeGeometry,
    pub fat_size_bytes: u32,
    pub root_dir_size_bytes: u32,
    pub cluster_size: u32,
    pub fat_entries: Option<usize>,
    pub valid_boot_signature: bool,
}

/// Everything one full walk produced, collected before rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub nodes: Vec<TraversalNode>,
    pub findings: Vec<Finding>,
}

pub struct Fat16Reader<S: ByteSource> {
    source: S,
    geometry: VolumeGeometry,
    fat: Option<FatTable>,
    findings: Vec<Finding>,
}

impl Fat16Reader<FileSource> {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening FAT16 image: {}", path.display());
        Self::open(FileSource::open(path)?)
    }
}

impl<S: ByteSource> Fat16Reader<S> {
    /// Parse the boot sector and load the FAT.
    ///
    /// A truncated FAT is recorded as a finding rather than an error so the
    /// root region can still be listed.
    pub fn open(source: S) -> Result<Self> {
        let geometry = VolumeGeometry::read_from(&source)?;
        let mut findings = Vec::new();

        info!("FAT16 filesystem details:");
        info!("  Bytes per sector: {}", geometry.bytes_per_sector());
        info!("  Sectors per cluster: {}", geometry.sectors_per_cluster());
        info!("  Root entries: {}", geometry.root_entry_count());
        info!("  Root directory sector: {}", geometry.root_dir_start_sector());
        info!("  First data sector: {}", geometry.data_region_start_sector());

        if !geometry.has_valid_signature() {
            let kind = FindingKind::InvalidBootSignature(geometry.boot_signature());
            warn!("/: {}", kind);
            findings.push(Finding::new("/", kind));
        }

        let fat = match FatTable::load(&source, &geometry) {
            Ok(fat) => Some(fat),
            Err(FatwalkError::TruncatedFat { expected, available }) => {
                warn!(
                    "FAT truncated: expected {} bytes, {} available",
                    expected, available
                );
                findings.push(Finding::new("/", FindingKind::FatUnavailable));
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            source,
            geometry,
            fat,
            findings,
        })
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn fat(&self) -> Option<&FatTable> {
        self.fat.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Findings recorded while opening the volume.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn walk(&self) -> DirectoryWalker<'_, S> {
        self.walk_with(ScanOptions::default())
    }

    /// Start a fresh walk from the root; walks never share a cursor.
    pub fn walk_with(&self, options: ScanOptions) -> DirectoryWalker<'_, S> {
        DirectoryWalker::new(&self.source, &self.geometry, self.fat.as_ref(), options)
    }

    /// Valid entries of the root region, directories included. Never needs the FAT.
    pub fn list_root(&self) -> Result<Vec<DirEntry>> {
        self.walk_with(ScanOptions::root_only())
            .map(|node| node.map(|node| node.entry))
            .collect()
    }

    /// Run a complete walk and collect its nodes and findings.
    pub fn scan(&self, options: ScanOptions) -> Result<ScanReport> {
        self.collect_walk(self.walk_with(options))
    }

    pub fn scan_with_cancel(&self, options: ScanOptions, cancel: CancelFlag) -> Result<ScanReport> {
        self.collect_walk(self.walk_with(options).with_cancel(cancel))
    }

    fn collect_walk(&self, mut walker: DirectoryWalker<'_, S>) -> Result<ScanReport> {
        let mut nodes = Vec::new();
        for node in walker.by_ref() {
            nodes.push(node?);
        }
        let mut findings = self.findings.clone();
        findings.extend(walker.into_findings());
        Ok(ScanReport { nodes, findings })
    }

    pub fn info(&self) -> VolumeInfo {
        VolumeInfo {
            fs_type: self.geometry.fs_type().unwrap_or("FAT16").to_string(),
            label: self.geometry.volume_label().map(str::to_string),
            geometry: self.geometry.clone(),
            fat_size_bytes: self.geometry.fat_size_bytes(),
            root_dir_size_bytes: self.geometry.root_dir_byte_size(),
            cluster_size: self.geometry.bytes_per_cluster(),
            fat_entries: self.fat.as_ref().map(FatTable::len),
            valid_boot_signature: self.geometry.has_valid_signature(),
        }
    }

    /// First sector of an entry's data, `None` for empty files and dot links.
    pub fn first_sector(&self, entry: &DirEntry) -> Option<u32> {
        self.geometry.cluster_to_sector(entry.first_cluster)
    }
}
