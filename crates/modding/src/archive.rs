use crate::loader::{is_safe_relative_path, ModError};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use sylladex_core::{CandidateSource, ConfigError};
use tar::Archive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Tar,
    TarGz,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Lists the regular-file entries of a `.tar`, `.tar.gz` or `.tgz` archive.
#[derive(Debug, Clone)]
pub struct ArchiveListing {
    path: PathBuf,
}

impl ArchiveListing {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn recognizes(path: &Path) -> bool {
        ArchiveKind::from_path(path).is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<String>, ModError> {
        let kind = ArchiveKind::from_path(&self.path)
            .ok_or_else(|| ModError::Unsupported(self.path.clone()))?;
        let file = File::open(&self.path)?;
        let mut names = match kind {
            ArchiveKind::Tar => entry_names(Archive::new(file))?,
            ArchiveKind::TarGz => entry_names(Archive::new(GzDecoder::new(file)))?,
        };
        names.sort();
        tracing::debug!(path = %self.path.display(), entries = names.len(), "listed archive");
        Ok(names)
    }
}

fn entry_names<R: Read>(mut archive: Archive<R>) -> Result<Vec<String>, ModError> {
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?;
        if !is_safe_relative_path(&path) {
            return Err(ModError::InvalidEntry(path.display().to_string()));
        }
        names.push(path.to_string_lossy().into_owned());
    }
    Ok(names)
}

impl CandidateSource for ArchiveListing {
    fn entries(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.list()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamespaceListing;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};
    use sylladex_core::ModusRegistry;

    fn temp_file(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "sylladex_modding_archive_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn tar_bytes(entries: &[&str]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for entry in entries {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(0);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, entry, std::io::empty())
                .expect("append");
        }
        builder.into_inner().expect("finish")
    }

    macro_rules! kind_case {
        ($name:ident, $path:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(ArchiveKind::from_path(Path::new($path)), $expected);
            }
        };
    }

    kind_case!(kind_tar, "modi.tar", Some(ArchiveKind::Tar));
    kind_case!(kind_tar_gz, "modi.tar.gz", Some(ArchiveKind::TarGz));
    kind_case!(kind_tgz, "MODI.TGZ", Some(ArchiveKind::TarGz));
    kind_case!(kind_zip, "modi.zip", None);

    #[test]
    fn lists_plain_tar_entries() {
        let path = temp_file("modi.tar");
        fs::write(&path, tar_bytes(&["modi/TarotDeck.modus", "modi/PentaFile.modus"]))
            .expect("write");
        let listing = ArchiveListing::new(&path);
        assert_eq!(
            listing.list().expect("list"),
            vec![
                "modi/PentaFile.modus".to_string(),
                "modi/TarotDeck.modus".to_string()
            ]
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn lists_gzipped_entries_through_the_registry() {
        let path = temp_file("modi.tar.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(
            &mut encoder,
            &tar_bytes(&["PentaFile.modus", "README", "TarotDeck.modus"]),
        )
        .expect("encode");
        fs::write(&path, encoder.finish().expect("finish")).expect("write");

        let listing = NamespaceListing::locate(&path).expect("locate");
        assert!(matches!(listing, NamespaceListing::Archive(_)));
        let ids = ModusRegistry::new()
            .discover_from(&listing)
            .expect("discover");
        assert_eq!(ids, vec!["PentaFile".to_string(), "TarotDeck".to_string()]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn garbage_archive_is_an_error() {
        let path = temp_file("broken.tar.gz");
        fs::write(&path, b"definitely not gzip").expect("write");
        assert!(ArchiveListing::new(&path).list().is_err());
        let _ = fs::remove_file(&path);
    }
}
