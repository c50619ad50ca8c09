//! Capability-based filesystem helpers shared by the Meteorfall crates.
//!
//! Paths are UTF-8 (`camino`) and every access goes through a `cap-std`
//! directory handle opened with ambient authority at the nearest anchor
//! (the filesystem root, a Windows drive prefix, or the working directory).
#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read the whole file at `path` into memory.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened or read.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Whether `path` names an existing regular file.
///
/// Directories and other non-file entries report `false`.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when nothing exists at `path`, and any
/// other I/O error raised while opening the containing directory.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = split_anchor(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// Paths without a parent, or whose parent is the working directory or the
/// filesystem root, need nothing created.
///
/// # Errors
/// Returns an I/O error when a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, relative) = anchor_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(&relative)
}

/// Open the directory holding `path` and return it with the file name.
fn split_anchor(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `dir` into an ambient anchor directory and the path below it.
fn anchor_and_relative(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut components = dir.as_std_path().components();
    let anchor = match components.next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            // Drive-relative prefixes carry no root component.
            if matches!(components.clone().next(), Some(Component::RootDir)) {
                components.next();
            }
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR_STR)
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        _ => {
            components = dir.as_std_path().components();
            Utf8PathBuf::from(".")
        }
    };
    let relative = Utf8PathBuf::from_path_buf(components.as_path().to_path_buf())
        .map_err(|_| io::Error::other("non-UTF-8 directory path"))?;
    let handle = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((handle, relative))
}
