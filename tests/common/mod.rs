// Shared helpers for integration tests: scratch trees and stand-in converters.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wpd_convert::converter::Converter;

/// Writes `<outdir>/<stem>.docx` unless the input name contains "broken".
const CONVERTING_SCRIPT: &str = r#"#!/bin/sh
outdir="$5"
input="$6"
name=$(basename "$input")
stem="${name%.*}"
case "$name" in
  *broken*)
    echo "Error: source file could not be loaded" >&2
    exit 1
    ;;
esac
printf 'PK fake docx' > "$outdir/$stem.docx"
echo "convert $input -> $outdir/$stem.docx using filter : MS Word 2007 XML"
"#;

/// Exits cleanly without writing anything, like soffice on an unloadable file.
const SILENT_SCRIPT: &str = r#"#!/bin/sh
echo "Error: source file could not be loaded"
exit 0
"#;

const HANGING_SCRIPT: &str = r#"#!/bin/sh
exec sleep 30
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn converting(dir: &Path) -> Converter {
    Converter::new(converting_script(dir))
}

/// Path of the converting stand-in, for driving the binary with `--soffice`.
pub fn converting_script(dir: &Path) -> PathBuf {
    write_script(dir, "fake-soffice", CONVERTING_SCRIPT)
}

pub fn silent(dir: &Path) -> Converter {
    Converter::new(write_script(dir, "silent-soffice", SILENT_SCRIPT))
}

pub fn hanging(dir: &Path) -> Converter {
    Converter::new(write_script(dir, "hanging-soffice", HANGING_SCRIPT))
        .with_timeout(Duration::from_secs(1))
}

/// Create `root/<rel>` with some bytes in it, making parent folders.
pub fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"\xffWPC fake wordperfect").unwrap();
    path
}
