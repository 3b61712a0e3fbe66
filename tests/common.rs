//! Test utilities & fixtures.
//! Builds throwaway catalog workspaces (external price dirs, content packs)
//! inside tempdirs. Tests own the tempdir and drop it when done.

use std::fs;
use std::path::{Path, PathBuf};

/// Write one external catalog file into `dir`, returning its path.
pub fn write_catalog(dir: &Path, name: &str, body: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("catalog dir");
    let path = dir.join(name);
    fs::write(&path, body).expect("catalog file");
    path
}

/// Lay out a directory-form content pack with a manifest and extra files.
#[allow(dead_code)] // not every integration test builds packs
pub fn write_pack(root: &Path, id: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).expect("pack dir");
    fs::write(
        dir.join("pack.toml"),
        format!("[pack]\nid = \"{id}\"\nname = \"{id} pack\"\nversion = \"1.0\"\n"),
    )
    .expect("pack manifest");
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("pack subdir");
        }
        fs::write(path, contents).expect("pack file");
    }
    dir
}
