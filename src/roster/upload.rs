use log::debug;
use std::io::{self, Read, Write};
use tempfile::NamedTempFile;

use crate::roster::io_common::{check_extension, simplify_file_name};
use crate::roster::*;

/// A spreadsheet ready to be read from disk.
///
/// Data coming from the standard input is staged in a temporary file that
/// carries the right extension, so the reader can pick the format. The
/// temporary file is removed when the upload is dropped.
pub struct Upload {
    path: String,
    name: String,
    _staged: Option<NamedTempFile>,
}

impl Upload {
    /// `-` reads the standard input, anything else is a path.
    ///
    /// `extension` names the format of the standard input. A path carries its
    /// own extension, so giving one for a path is an error.
    pub fn open(input: &str, extension: Option<&str>) -> AppResult<Upload> {
        if input == "-" {
            let stdin = io::stdin();
            let mut lock = stdin.lock();
            Upload::from_reader(&mut lock, extension.unwrap_or("xlsx"))
        } else {
            if let Some(ext) = extension {
                whatever!(
                    "--extension {} only applies to data read from the standard input, not to {}",
                    ext,
                    input
                );
            }
            check_extension(input)?;
            Ok(Upload {
                path: input.to_string(),
                name: simplify_file_name(input),
                _staged: None,
            })
        }
    }

    pub fn from_reader<R: Read>(reader: &mut R, extension: &str) -> AppResult<Upload> {
        let ext = check_extension(extension)?;
        let mut staged = tempfile::Builder::new()
            .prefix("roster-upload-")
            .suffix(&format!(".{}", ext))
            .tempfile()
            .context(StagingUploadSnafu {})?;
        let bytes = io::copy(reader, &mut staged).context(StagingUploadSnafu {})?;
        staged.flush().context(StagingUploadSnafu {})?;
        let path = staged.path().to_string_lossy().to_string();
        debug!("from_reader: staged {} bytes in {}", bytes, path);
        Ok(Upload {
            path,
            name: format!("stdin.{}", ext),
            _staged: Some(staged),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn staged_file_is_removed_on_drop() {
        let mut data = Cursor::new(b"not really a workbook".to_vec());
        let upload = Upload::from_reader(&mut data, "XLSX").unwrap();
        let p = PathBuf::from(upload.path());
        assert!(p.exists());
        assert!(upload.path().ends_with(".xlsx"));
        assert_eq!(upload.display_name(), "stdin.xlsx");
        drop(upload);
        assert!(!p.exists());
    }

    #[test]
    fn refuses_other_formats() {
        let mut data = Cursor::new(Vec::new());
        assert!(Upload::from_reader(&mut data, "csv").is_err());
        assert!(Upload::open("voters.csv", None).is_err());
    }

    #[test]
    fn paths_are_kept_as_is() {
        let upload = Upload::open("data/Booth5.XLSX", None).unwrap();
        assert_eq!(upload.path(), "data/Booth5.XLSX");
        assert_eq!(upload.display_name(), "Booth5.XLSX");
    }

    #[test]
    fn extension_is_for_stdin_only() {
        let res = Upload::open("data/Booth5.xlsx", Some("xls"));
        assert!(matches!(res, Err(AppError::Whatever { .. })));
    }
}
