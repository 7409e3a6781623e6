//! Block device discovery
//!
//! Reads disk sizes from sysfs (`/sys/block/<name>/size`, in 512-byte
//! sectors).

use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const SECTOR_SIZE: u64 = 512;
const GIB: u64 = 1024 * 1024 * 1024;

/// Name prefixes of virtual devices that are never install targets
const SKIPPED_PREFIXES: [&str; 4] = ["loop", "ram", "sr", "zram"];

/// A candidate installation disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    /// Kernel name, e.g. `sda`
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl Disk {
    /// Device node path
    pub fn device(&self) -> String {
        format!("/dev/{}", self.name)
    }

    /// Size in whole GiB
    pub fn size_gib(&self) -> u64 {
        self.size / GIB
    }

    /// Menu label, e.g. `/dev/sda: 120 GiB`
    pub fn label(&self) -> String {
        format!("{}: {} GiB", self.device(), self.size_gib())
    }
}

fn read_size(dir: &Path) -> Option<u64> {
    let text = fs::read_to_string(dir.join("size")).ok()?;
    text.trim().parse::<u64>().ok().map(|sectors| sectors * SECTOR_SIZE)
}

/// List installable disks under `sys_block`, sorted by name
pub fn probe(sys_block: &Path) -> Result<Vec<Disk>> {
    let mut disks = Vec::new();
    for entry in fs::read_dir(sys_block)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable block device entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if SKIPPED_PREFIXES.iter().any(|p| name.starts_with(p)) {
            continue;
        }
        match read_size(&entry.path()) {
            Some(size) if size >= GIB => disks.push(Disk { name, size }),
            Some(size) => debug!(disk = %name, size, "Skipping small disk"),
            None => debug!(disk = %name, "No size reported"),
        }
    }
    disks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(disks)
}
