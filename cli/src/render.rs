// Console and JSON rendering of scan results

use fatwalk_filesystems::{Finding, ScanReport, TraversalNode, VolumeGeometry, VolumeInfo};
use serde::Serialize;
use std::io::{self, Write};

const RULE: &str = "----------------------------------";

pub fn write_info<W: Write>(out: &mut W, info: &VolumeInfo) -> io::Result<()> {
    let g = &info.geometry;
    writeln!(out, "{} File System Information:", info.fs_type)?;
    if let Some(label) = &info.label {
        writeln!(out, "Volume label: {}", label)?;
    }
    writeln!(out, "OEM name: {}", g.oem_name())?;
    writeln!(out, "Total sectors: {}", g.total_sectors())?;
    writeln!(out, "Media descriptor: {:#04x}", g.media_descriptor())?;
    writeln!(out, "Sector size: {} bytes", g.bytes_per_sector())?;
    writeln!(out, "Sectors per cluster: {}", g.sectors_per_cluster())?;
    writeln!(out, "Cluster size: {} bytes", info.cluster_size)?;
    writeln!(out, "Number of FAT copies: {}", g.fat_count())?;
    writeln!(out, "FAT size (in sectors): {}", g.fat_size_sectors())?;
    writeln!(out, "FAT size (in bytes): {}", info.fat_size_bytes)?;
    writeln!(out, "Root directory entries: {}", g.root_entry_count())?;
    writeln!(out, "Root directory size: {} bytes", info.root_dir_size_bytes)?;
    writeln!(out, "Reserved sectors: {}", g.reserved_sectors())?;
    writeln!(out, "Root directory sector: {}", g.root_dir_start_sector())?;
    writeln!(out, "First data sector: {}", g.data_region_start_sector())?;
    writeln!(
        out,
        "Valid boot signature: {}",
        if info.valid_boot_signature { "Yes" } else { "No" }
    )?;
    writeln!(out, "{}", RULE)
}

pub fn write_paths<W: Write>(out: &mut W, nodes: &[TraversalNode]) -> io::Result<()> {
    writeln!(out, "File Paths:")?;
    for node in nodes {
        if node.entry.is_directory() {
            writeln!(out, "{}/", node.display_path())?;
        } else {
            writeln!(out, "{}", node.display_path())?;
        }
    }
    Ok(())
}

/// One detail block per entry.
pub fn write_long<W: Write>(
    out: &mut W,
    nodes: &[TraversalNode],
    geometry: &VolumeGeometry,
) -> io::Result<()> {
    for node in nodes {
        let entry = &node.entry;
        let kind = if entry.is_directory() { "Directory" } else { "File" };
        writeln!(out, "{}: {}", kind, node.display_path())?;
        writeln!(out, "Size: {} bytes", entry.size_bytes)?;
        match &entry.modified {
            Some(ts) => writeln!(out, "Last Modified: {}", ts)?,
            None => writeln!(out, "Last Modified: unknown")?,
        }
        writeln!(out, "Attributes: {}", entry.attributes)?;
        writeln!(out, "First Cluster: {}", entry.first_cluster)?;
        match geometry.cluster_to_sector(entry.first_cluster) {
            Some(sector) => writeln!(out, "First Sector: {}", sector)?,
            None => writeln!(out, "First Sector: none")?,
        }
        writeln!(out, "{}", RULE)?;
    }
    Ok(())
}

pub fn write_findings<W: Write>(out: &mut W, findings: &[Finding]) -> io::Result<()> {
    for finding in findings {
        writeln!(out, "warning: {}", finding)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    volume: &'a VolumeInfo,
    nodes: &'a [TraversalNode],
    findings: &'a [Finding],
}

pub fn write_json<W: Write>(out: &mut W, info: &VolumeInfo, report: &ScanReport) -> io::Result<()> {
    let json = JsonReport {
        volume: info,
        nodes: &report.nodes,
        findings: &report.findings,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)
}
