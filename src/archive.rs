use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry escapes the target folder: {0}")]
    UnsafeEntry(String),
}

/// Result of unpacking an uploaded archive
#[derive(Debug, Clone)]
pub struct ExtractedArchive {
    pub target_folder: PathBuf,
    pub files: Vec<String>,
}

/// Unzip `archive` into `<output_folder>/<archive stem>_unzipped/`
pub fn unzip_file(archive: &Path, output_folder: &Path) -> Result<ExtractedArchive, ArchiveError> {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());
    let target_folder = output_folder.join(format!("{}_unzipped", stem));
    fs::create_dir_all(&target_folder)?;

    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut files = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = target_folder.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;

        debug!("Extracted {}", out_path.display());
        files.push(entry.name().to_string());
    }

    info!(
        "Unzipping completed into {}: {:?}",
        target_folder.display(),
        files
    );

    Ok(ExtractedArchive {
        target_folder,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default())?;
            zip.write_all(contents.as_bytes())?;
        }
        zip.finish()?;
        Ok(())
    }

    #[test]
    fn test_unzip_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = dir.path().join("litter.zip");
        write_zip(
            &archive,
            &[
                ("pup.tped", "1 m1 0 100 A C\n"),
                ("parents/dam.tped", "1 m1 0 100 A A\n"),
            ],
        )?;

        let extracted = unzip_file(&archive, &dir.path().join("uploads"))?;

        assert_eq!(
            extracted.target_folder,
            dir.path().join("uploads").join("litter_unzipped")
        );
        assert_eq!(extracted.files.len(), 2);
        let dam = fs::read_to_string(extracted.target_folder.join("parents/dam.tped"))?;
        assert_eq!(dam, "1 m1 0 100 A A\n");
        Ok(())
    }

    #[test]
    fn test_rejects_path_traversal() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../escape.tped", "1 m1 0 100 A C\n")])?;

        let result = unzip_file(&archive, &dir.path().join("uploads"));
        assert!(matches!(result, Err(ArchiveError::UnsafeEntry(_))));
        assert!(!dir.path().join("uploads").join("escape.tped").exists());
        Ok(())
    }

    #[test]
    fn test_not_a_zip() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = dir.path().join("plain.zip");
        fs::write(&archive, "not a zip")?;

        let result = unzip_file(&archive, dir.path());
        assert!(matches!(result, Err(ArchiveError::Zip(_))));
        Ok(())
    }
}
