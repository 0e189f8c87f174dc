// ==============================================================================
// secure_delete.rs - Secure Removal of Genotype Uploads
// ==============================================================================
// Description: Multi-pass overwrite and unlink of raw genotype files
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use rand::RngCore;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

/// Overwrite passes performed before unlinking
pub const OVERWRITE_PASSES: usize = 3;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassPattern {
    Fixed(u8),
    Random,
}

fn pass_pattern(pass: usize) -> PassPattern {
    match pass {
        0 => PassPattern::Fixed(0x00),
        p if p + 1 == OVERWRITE_PASSES => PassPattern::Fixed(0x00),
        _ => PassPattern::Random,
    }
}

/// Securely delete an uploaded genotype file
///
/// Pass pattern: zeros, random data, zeros. Each pass is synced to disk, then
/// the file is unlinked.
pub fn secure_delete_file(path: &Path) -> Result<()> {
    info!("Securely deleting input file: {:?}", path);

    let size = std::fs::metadata(path)
        .context("Failed to get file metadata")?
        .len();

    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .context("Failed to open file for writing")?;

    let mut rng = rand::thread_rng();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    for pass in 0..OVERWRITE_PASSES {
        let pattern = pass_pattern(pass);
        debug!("Pass {}/{}: {:?}", pass + 1, OVERWRITE_PASSES, pattern);

        file.seek(SeekFrom::Start(0))
            .context("Failed to seek to file start")?;

        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(CHUNK_SIZE as u64) as usize;
            match pattern {
                PassPattern::Fixed(byte) => buffer[..n].fill(byte),
                PassPattern::Random => rng.fill_bytes(&mut buffer[..n]),
            }
            file.write_all(&buffer[..n])
                .context("Failed to write overwrite pattern")?;
            remaining -= n as u64;
        }

        file.sync_all().context("Failed to sync file to disk")?;
    }

    drop(file);

    std::fs::remove_file(path).context("Failed to remove file after secure overwrite")?;

    info!("Input file securely deleted: {:?}", path);
    Ok(())
}
