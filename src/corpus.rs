//! Corpus file loading
//!
//! A `.json` file holds a JSON array of strings. Any other file holds one
//! string per line; empty lines are skipped.

use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::algorithm::{SearchError, StringCorpus};

/// Errors from reading or validating a corpus file
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON corpus: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid corpus: {0}")]
    Invalid(#[from] SearchError),
}

/// Load a corpus from `path`, choosing the format by extension
pub fn load(path: impl AsRef<Path>) -> Result<StringCorpus, CorpusError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let corpus = if is_json {
        parse_json(&bytes)?
    } else {
        parse_line_bytes(&bytes)?
    };

    debug!("Loaded {} strings from {}", corpus.len(), path.display());
    Ok(corpus)
}

/// One string per line, ignoring empty lines
pub fn parse_lines(text: &str) -> Result<StringCorpus, CorpusError> {
    parse_line_bytes(text.as_bytes())
}

/// Byte lines split on `\n`, with a trailing `\r` removed; any encoding
pub fn parse_line_bytes(bytes: &[u8]) -> Result<StringCorpus, CorpusError> {
    let entries = bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty());
    Ok(StringCorpus::new(entries)?)
}

/// A JSON array of strings
pub fn parse_json(bytes: &[u8]) -> Result<StringCorpus, CorpusError> {
    let entries: Vec<String> = serde_json::from_slice(bytes)?;
    Ok(StringCorpus::new(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn strings(corpus: &StringCorpus) -> Vec<&[u8]> {
        corpus.iter().collect()
    }

    #[test]
    fn test_parse_lines_skips_empty_and_crlf() {
        let corpus = parse_lines("GET\r\nPUT\n\n  \nPOST\r\n").unwrap();
        assert_eq!(
            strings(&corpus),
            vec![&b"GET"[..], &b"PUT"[..], &b"  "[..], &b"POST"[..]]
        );
    }

    #[test]
    fn test_parse_lines_rejects_duplicates() {
        let err = parse_lines("a\nb\na\n").unwrap_err();
        assert!(matches!(
            err,
            CorpusError::Invalid(SearchError::DuplicateString { index: 2, first: 0 })
        ));
    }

    #[test]
    fn test_parse_lines_rejects_blank_file() {
        let err = parse_lines("\n\r\n").unwrap_err();
        assert!(matches!(err, CorpusError::Invalid(SearchError::EmptyCorpus)));
    }

    #[test]
    fn test_parse_json_array() {
        let corpus = parse_json(br#"["alpha", "", "beta"]"#).unwrap();
        assert_eq!(strings(&corpus), vec![&b"alpha"[..], &b""[..], &b"beta"[..]]);
    }

    #[test]
    fn test_parse_json_rejects_non_strings() {
        assert!(matches!(
            parse_json(br#"["alpha", 3]"#),
            Err(CorpusError::Json(_))
        ));
        assert!(matches!(
            parse_json(br#"{"alpha": 1}"#),
            Err(CorpusError::Json(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("methods.json");
        std::fs::write(&json_path, r#"["GET", "PUT"]"#).unwrap();
        assert_eq!(load(&json_path).unwrap().len(), 2);

        // Same content without the extension is read line by line
        let text_path = dir.path().join("methods.txt");
        std::fs::write(&text_path, r#"["GET", "PUT"]"#).unwrap();
        assert_eq!(load(&text_path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_line_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha").unwrap();
        writeln!(file, "beta").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "gamma").unwrap();

        let corpus = load(file.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.get(2), Some(&b"gamma"[..]));
    }

    #[test]
    fn test_load_non_utf8_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9\r\n\xff\xfe\nplain\n").unwrap();

        let corpus = load(&path).unwrap();
        assert_eq!(
            strings(&corpus),
            vec![&b"caf\xe9"[..], &b"\xff\xfe"[..], &b"plain"[..]]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, CorpusError::Io(_)));
    }
}
