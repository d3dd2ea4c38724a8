//! Reading and writing trace group documents.
//!
//! A document is the JSON form of one [`TraceGroup`] or of an array of them.
//! Paths ending in `.br` are Brotli compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use brotli::enc::BrotliEncoderParams;
use brotli::{CompressorWriter, Decompressor};
use serde::Deserialize;
use thiserror::Error;

use crate::trace::TraceGroup;

#[derive(Debug, Error)]
pub enum TraceIoError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("trace document {0} contains no groups")]
    Empty(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<TraceGroup>),
    One(Box<TraceGroup>),
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "br")
}

/// Reads every group stored in `path`.
///
/// Groups with an empty name are named after the file stem.
pub fn read_groups(path: &Path) -> Result<Vec<TraceGroup>, TraceIoError> {
    let io_err = |source| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;

    let mut bytes = Vec::new();
    if is_compressed(path) {
        Decompressor::new(file, 4096)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
    } else {
        BufReader::new(file).read_to_end(&mut bytes).map_err(io_err)?;
    }

    parse_groups(&bytes, path)
}

/// Parses a document already in memory. `origin` names it in errors.
pub fn parse_groups(bytes: &[u8], origin: &Path) -> Result<Vec<TraceGroup>, TraceIoError> {
    let document: Document =
        serde_json::from_slice(bytes).map_err(|source| TraceIoError::Json {
            path: origin.to_path_buf(),
            source,
        })?;

    let mut groups = match document {
        Document::Many(groups) => groups,
        Document::One(group) => vec![*group],
    };
    if groups.is_empty() {
        return Err(TraceIoError::Empty(origin.to_path_buf()));
    }

    let stem = origin
        .file_stem()
        .map(|s| s.to_string_lossy().trim_end_matches(".json").to_string())
        .unwrap_or_else(|| "trace".to_string());
    let unnamed = groups.iter().filter(|g| g.name.is_empty()).count();
    let mut counter = 0;
    for group in groups.iter_mut().filter(|g| g.name.is_empty()) {
        counter += 1;
        group.name = if unnamed == 1 {
            stem.clone()
        } else {
            format!("{} #{}", stem, counter)
        };
    }
    Ok(groups)
}

/// Writes `groups` to `path` as a JSON array, compressed for `.br` paths.
pub fn write_groups(path: &Path, groups: &[&TraceGroup]) -> Result<(), TraceIoError> {
    let io_err = |source| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let buf_writer = BufWriter::new(file);

    let mut writer: Box<dyn Write> = if is_compressed(path) {
        let params = BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        };
        Box::new(CompressorWriter::with_params(buf_writer, 4096, &params))
    } else {
        Box::new(buf_writer)
    };

    serde_json::to_writer(&mut writer, groups).map_err(|source| TraceIoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    log::info!("Wrote {} group(s) to {}", groups.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object_document() {
        let json = br#"{"name": "run1", "cpu_load": [{"ts": 0.0, "load": 12.5}]}"#;
        let groups = parse_groups(json, Path::new("x.json")).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "run1");
        assert_eq!(groups[0].cpu_load[0].cpu, 0);
    }

    #[test]
    fn test_unnamed_groups_take_file_stem() {
        let json = br#"[{"name": ""}, {"name": ""}]"#;
        let groups = parse_groups(json, Path::new("/tmp/board.json")).unwrap();
        assert_eq!(groups[0].name, "board #1");
        assert_eq!(groups[1].name, "board #2");
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let err = parse_groups(b"[]", Path::new("e.json")).unwrap_err();
        assert!(matches!(err, TraceIoError::Empty(_)));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = parse_groups(b"{not json", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, TraceIoError::Json { .. }));
    }
}
