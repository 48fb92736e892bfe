//! Tab-separated source reader.  Columns are located by header name; extra
//! columns are ignored.  Any unreadable file, missing column, or malformed
//! row aborts the run.

use std::path::Path;

use csv::ReaderBuilder;
use log::debug;

use crate::error::Error;
use crate::schema::InputRecord;

pub const DOC_ID_COLUMN: &str = "doc_id";
pub const TEXT_COLUMN: &str = "text";

/// Reads every row of the source file.  Fails on the first malformed row;
/// there is no row-skipping policy.
pub fn read_rows(path: &Path) -> Result<Vec<InputRecord>, Error> {
    let source_err = |e| Error::Source {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(source_err)?;

    let headers = reader.headers().map_err(source_err)?;
    for column in [DOC_ID_COLUMN, TEXT_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: InputRecord = record.map_err(|e| Error::MalformedRow {
            path: path.to_path_buf(),
            source: e,
        })?;
        rows.push(row);
    }
    debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod source_test {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn write_source(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        let mut fd = std::fs::File::create(&path).unwrap();
        fd.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let (_dir, path) = write_source("doc_id\ttext\n1\tcat dog\n2\tdog\n");
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].doc_id, "1");
        assert_eq!(rows[0].text, "cat dog");
        assert_eq!(rows[1].doc_id, "2");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let (_dir, path) = write_source("doc_id\tlang\ttext\n1\ten\tcat\n");
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0].text, "cat");
    }

    #[test]
    fn test_header_only_file_is_empty_not_an_error() {
        let (_dir, path) = write_source("doc_id\ttext\n");
        assert!(read_rows(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let (_dir, path) = write_source("doc_id\tbody\n1\tcat\n");
        match read_rows(&path) {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, TEXT_COLUMN),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let (_dir, path) = write_source("doc_id\ttext\n1\tcat\nlonely\n");
        assert!(matches!(
            read_rows(&path),
            Err(Error::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        assert!(matches!(
            read_rows(Path::new("/nonexistent/in.txt")),
            Err(Error::Source { .. })
        ));
    }
}
