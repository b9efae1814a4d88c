//! Per-file work item and its derived output locations.
//!
//! Every output path is derived here from the input path and the dataset
//! configuration; no other code computes them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::DatasetConfig;
use crate::error::{ModelError, Result};

/// Extension of convertible source files.
pub const MARKUP_EXTENSION: &str = "xml";
/// Extension of the final round-tripped shorthand output.
pub const PRIMARY_EXTENSION: &str = "txt";
/// Extension of the intermediate round-tripped markup output.
pub const INTERMEDIATE_EXTENSION: &str = "roundtrip.xml";
/// Extension of the failure marker.
pub const FAILURE_EXTENSION: &str = "txt.fail";

/// Returns true when `path` names a markup source file.
pub fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == MARKUP_EXTENSION)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input_path: PathBuf,
    pub primary_output_path: PathBuf,
    pub intermediate_output_path: PathBuf,
    pub failure_marker_path: PathBuf,
}

impl FileTask {
    /// Derive the task for `input_path`, which must be an `.xml` file under
    /// the dataset's source root.
    pub fn new(input_path: &Path, dataset: &DatasetConfig) -> Result<Self> {
        if !is_markup_file(input_path) {
            return Err(ModelError::NotMarkup {
                path: input_path.to_path_buf(),
            });
        }
        let relative =
            input_path
                .strip_prefix(&dataset.source_root)
                .map_err(|_| ModelError::OutsideSourceRoot {
                    path: input_path.to_path_buf(),
                    root: dataset.source_root.clone(),
                })?;
        let mirrored = dataset.output_root.join(relative);

        Ok(Self {
            input_path: input_path.to_path_buf(),
            primary_output_path: replace_extension(&mirrored, PRIMARY_EXTENSION),
            intermediate_output_path: replace_extension(&mirrored, INTERMEDIATE_EXTENSION),
            failure_marker_path: replace_extension(&mirrored, FAILURE_EXTENSION),
        })
    }

    /// Output paths in the order they are written.
    pub fn outputs(&self) -> [&Path; 2] {
        [&self.intermediate_output_path, &self.primary_output_path]
    }
}

/// Swap the trailing `.xml` for `extension`, which may itself contain dots.
fn replace_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    fn dataset() -> DatasetConfig {
        DatasetConfig {
            source_root: PathBuf::from("idp.data/DDB_EpiDoc_XML"),
            output_root: PathBuf::from("roundtrips/DDB_EpiDoc_XML"),
            selector: Selector::parse("body").unwrap(),
            grammar: "epidoc".to_string(),
        }
    }

    #[test]
    fn derives_all_outputs_under_output_root() {
        let task = FileTask::new(
            Path::new("idp.data/DDB_EpiDoc_XML/bgu/bgu.1/bgu.1.2.xml"),
            &dataset(),
        )
        .unwrap();
        assert_eq!(
            task.primary_output_path,
            PathBuf::from("roundtrips/DDB_EpiDoc_XML/bgu/bgu.1/bgu.1.2.txt")
        );
        assert_eq!(
            task.intermediate_output_path,
            PathBuf::from("roundtrips/DDB_EpiDoc_XML/bgu/bgu.1/bgu.1.2.roundtrip.xml")
        );
        assert_eq!(
            task.failure_marker_path,
            PathBuf::from("roundtrips/DDB_EpiDoc_XML/bgu/bgu.1/bgu.1.2.txt.fail")
        );
    }

    #[test]
    fn only_the_trailing_extension_is_replaced() {
        let task = FileTask::new(
            Path::new("idp.data/DDB_EpiDoc_XML/p.xml.test/p.xml.test.1.xml"),
            &dataset(),
        )
        .unwrap();
        assert_eq!(
            task.primary_output_path,
            PathBuf::from("roundtrips/DDB_EpiDoc_XML/p.xml.test/p.xml.test.1.txt")
        );
    }

    #[test]
    fn rejects_paths_outside_source_root() {
        let err = FileTask::new(Path::new("elsewhere/a.xml"), &dataset()).unwrap_err();
        assert!(matches!(err, ModelError::OutsideSourceRoot { .. }));
    }

    #[test]
    fn rejects_non_markup_files() {
        let err =
            FileTask::new(Path::new("idp.data/DDB_EpiDoc_XML/README.md"), &dataset()).unwrap_err();
        assert!(matches!(err, ModelError::NotMarkup { .. }));
    }
}
