use crate::utils::error::{ConverterError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

/// Extracts `archive` into `outdir`, overwriting existing files.
///
/// Zip is tried first; anything else is read as a tar stream, gzip-compressed
/// when it starts with the gzip magic bytes. This does blocking IO.
pub fn extract(archive: &Path, outdir: &Path) -> Result<ArchiveFormat> {
    tracing::info!("📦 Extracting {} -> {}", archive.display(), outdir.display());
    fs::create_dir_all(outdir)?;

    let file = File::open(archive)?;
    if let Ok(mut zip) = zip::ZipArchive::new(file) {
        tracing::debug!("Detected zip archive with {} entries", zip.len());
        zip.extract(outdir)?;
        return Ok(ArchiveFormat::Zip);
    }

    let mut file = File::open(archive)?;
    let mut magic = [0u8; 2];
    let is_gzip = file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let unpacked = if is_gzip {
        unpack_tar(GzDecoder::new(file), outdir)
    } else {
        unpack_tar(file, outdir)
    };

    match unpacked {
        Ok(0) | Err(_) => Err(ConverterError::ExtractionError {
            message: format!("Unknown archive format: {}", archive.display()),
        }),
        Ok(entries) => {
            tracing::debug!("Unpacked {} tar entries", entries);
            Ok(if is_gzip {
                ArchiveFormat::TarGz
            } else {
                ArchiveFormat::Tar
            })
        }
    }
}

fn unpack_tar<R: Read>(reader: R, outdir: &Path) -> Result<usize> {
    let mut archive = tar::Archive::new(reader);
    archive.set_overwrite(true);
    archive.set_preserve_permissions(true);

    let mut count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        entry.unpack_in(outdir)?;
        count += 1;
    }
    Ok(count)
}

/// Every file and directory below `root`, relative to it, in sorted order.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect(root, root, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect(root: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Ok(relative) = path.strip_prefix(root) {
            found.push(relative.to_path_buf());
        }
        if path.is_dir() {
            collect(root, &path, found)?;
        }
    }
    Ok(())
}
