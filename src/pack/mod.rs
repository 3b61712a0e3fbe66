//! Installed content packs.
//!
//! A pack is a directory or a `.tar.gz` archive carrying a `pack.toml`
//! manifest. Packs contribute a namespace to the item-id space and may embed
//! their own price catalog, either at the default `prices.json` path or at a
//! path declared by the manifest's `prices` key. The loader pipeline only
//! reads packs; installation and lifecycle belong to the host.

use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::price::PriceError;

/// Manifest file name inside every pack.
pub const MANIFEST_NAME: &str = "pack.toml";

/// Where a pack's embedded catalog lives unless the manifest says otherwise.
pub const DEFAULT_PRICES_PATH: &str = "prices.json";

/// Parsed `[pack]` table of a `pack.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackManifest {
    /// Pack id; doubles as the item-id namespace.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Path of an embedded price catalog, relative to the pack root.
    #[serde(default)]
    pub prices: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    pack: PackManifest,
}

/// Physical location of a pack's contents.
#[derive(Debug, Clone)]
enum PackSource {
    Dir(PathBuf),
    Archive(PathBuf),
}

/// One installed pack: manifest plus a handle to its contents.
#[derive(Debug, Clone)]
pub struct InstalledPack {
    manifest: PackManifest,
    source: PackSource,
}

impl InstalledPack {
    /// Open a pack rooted at `path`: a directory containing `pack.toml`, or
    /// a `.tar.gz` archive with `pack.toml` among its entries.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PriceError> {
        let path = path.as_ref();
        let source = if path.is_dir() {
            PackSource::Dir(path.to_path_buf())
        } else if is_archive(path) {
            PackSource::Archive(path.to_path_buf())
        } else {
            return Err(PriceError::BadManifest {
                path: path.display().to_string(),
                reason: "not a pack directory or .tar.gz archive".to_string(),
            });
        };

        let raw = read_source_file(&source, MANIFEST_NAME)?.ok_or_else(|| {
            PriceError::BadManifest {
                path: path.display().to_string(),
                reason: format!("{MANIFEST_NAME} missing"),
            }
        })?;
        let manifest: ManifestFile =
            toml::from_str(&raw).map_err(|e| PriceError::BadManifest {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            manifest: manifest.pack,
            source,
        })
    }

    pub fn manifest(&self) -> &PackManifest {
        &self.manifest
    }

    pub fn namespace(&self) -> &str {
        &self.manifest.id
    }

    /// Pack-relative path of the embedded catalog this pack would use.
    pub fn catalog_path(&self) -> &str {
        self.manifest.prices.as_deref().unwrap_or(DEFAULT_PRICES_PATH)
    }

    /// Read the embedded price catalog, if the pack carries one at its
    /// default location. A manifest-declared path that is missing is an
    /// error (the pack promised a catalog); an absent default path is not.
    pub fn read_catalog(&self) -> Result<Option<String>, PriceError> {
        let declared = self.manifest.prices.is_some();
        let rel = self.catalog_path();
        match read_source_file(&self.source, rel)? {
            Some(contents) => Ok(Some(contents)),
            None if declared => Err(PriceError::MissingPackCatalog {
                pack: self.manifest.id.clone(),
                path: rel.to_string(),
            }),
            None => Ok(None),
        }
    }
}

fn is_archive(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

/// Read one file out of a pack source. `Ok(None)` when the file is absent.
fn read_source_file(source: &PackSource, rel: &str) -> Result<Option<String>, PriceError> {
    match source {
        PackSource::Dir(root) => {
            let path = root.join(rel);
            if !path.is_file() {
                return Ok(None);
            }
            Ok(Some(fs::read_to_string(path)?))
        }
        PackSource::Archive(path) => {
            let file = File::open(path)?;
            let mut archive = Archive::new(GzDecoder::new(file));
            for entry in archive.entries()? {
                let mut entry = entry?;
                let entry_path = entry.path()?;
                // Archives commonly prefix entries with "./"
                let matches = entry_path
                    .strip_prefix("./")
                    .unwrap_or(&entry_path)
                    .to_str()
                    .map(|p| p == rel)
                    .unwrap_or(false);
                if matches {
                    let mut contents = String::new();
                    entry.read_to_string(&mut contents)?;
                    return Ok(Some(contents));
                }
            }
            Ok(None)
        }
    }
}

/// The set of installed packs plus the always-present host namespace.
#[derive(Debug, Clone)]
pub struct PackSet {
    host: String,
    packs: Vec<InstalledPack>,
}

impl PackSet {
    /// An empty set. `host` is the namespace the base game itself owns; it
    /// counts as installed without any pack backing it.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            packs: Vec::new(),
        }
    }

    /// Scan `dir` for packs. Entries that fail to open are logged and
    /// skipped; a missing directory yields an empty set.
    pub fn discover(host: impl Into<String>, dir: &Path) -> Self {
        let mut set = Self::new(host);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("no pack directory at {}: {}", dir.display(), e);
                return set;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() && !is_archive(&path) {
                continue;
            }
            match InstalledPack::open(&path) {
                Ok(pack) => {
                    log::debug!("installed pack {} from {}", pack.namespace(), path.display());
                    set.register(pack);
                }
                Err(e) => log::warn!("skipping pack at {}: {}", path.display(), e),
            }
        }
        set
    }

    pub fn register(&mut self, pack: InstalledPack) {
        self.packs.push(pack);
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn packs(&self) -> &[InstalledPack] {
        &self.packs
    }

    /// Whether a namespace belongs to the host or an installed pack.
    pub fn is_installed(&self, namespace: &str) -> bool {
        namespace == self.host || self.packs.iter().any(|p| p.namespace() == namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_dir_pack(root: &Path, id: &str, prices: Option<&str>) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        let prices_line = prices
            .map(|p| format!("prices = \"{p}\"\n"))
            .unwrap_or_default();
        fs::write(
            dir.join(MANIFEST_NAME),
            format!("[pack]\nid = \"{id}\"\nname = \"{id} pack\"\nversion = \"1.0\"\n{prices_line}"),
        )
        .unwrap();
        dir
    }

    fn write_archive_pack(root: &Path, id: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = root.join(format!("{id}.tar.gz"));
        let file = File::create(&path).unwrap();
        let enc = GzEncoder::new(file, Compression::default());
        let mut tar = tar::Builder::new(enc);
        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap().flush().unwrap();
        path
    }

    #[test]
    fn dir_pack_reads_default_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_dir_pack(tmp.path(), "farmcraft", None);
        fs::write(dir.join(DEFAULT_PRICES_PATH), r#"{"farmcraft": {"wheat": 2}}"#).unwrap();

        let pack = InstalledPack::open(&dir).unwrap();
        assert_eq!(pack.namespace(), "farmcraft");
        let catalog = pack.read_catalog().unwrap().unwrap();
        assert!(catalog.contains("wheat"));
    }

    #[test]
    fn dir_pack_without_catalog_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_dir_pack(tmp.path(), "plainpack", None);
        let pack = InstalledPack::open(&dir).unwrap();
        assert!(pack.read_catalog().unwrap().is_none());
    }

    #[test]
    fn declared_but_missing_catalog_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_dir_pack(tmp.path(), "brokenpack", Some("data/prices.json"));
        let pack = InstalledPack::open(&dir).unwrap();
        assert!(pack.read_catalog().is_err());
    }

    #[test]
    fn archive_pack_reads_manifest_and_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_archive_pack(
            tmp.path(),
            "orecraft",
            &[
                (
                    MANIFEST_NAME,
                    "[pack]\nid = \"orecraft\"\nname = \"Orecraft\"\nprices = \"data/prices.json\"\n",
                ),
                ("data/prices.json", r#"{"orecraft": {"tin": 4}}"#),
            ],
        );

        let pack = InstalledPack::open(&path).unwrap();
        assert_eq!(pack.namespace(), "orecraft");
        assert_eq!(pack.catalog_path(), "data/prices.json");
        let catalog = pack.read_catalog().unwrap().unwrap();
        assert!(catalog.contains("tin"));
    }

    #[test]
    fn discover_skips_broken_packs() {
        let tmp = tempfile::tempdir().unwrap();
        write_dir_pack(tmp.path(), "goodpack", None);
        // a directory without a manifest
        fs::create_dir_all(tmp.path().join("junk")).unwrap();

        let set = PackSet::discover("core", tmp.path());
        assert_eq!(set.packs().len(), 1);
        assert!(set.is_installed("core"));
        assert!(set.is_installed("goodpack"));
        assert!(!set.is_installed("junk"));
    }
}
