//! Corpus access: source discovery, fragment extraction and history queries.

pub mod discovery;
pub mod error;
pub mod fragment;
pub mod git;

pub use discovery::list_markup_files;
pub use error::{IngestError, Result};
pub use fragment::{
    TEI_NAMESPACE_DECLARATION, extract_fragment, read_fragment, strip_namespace_declaration,
};
pub use git::{ChangeSet, GitError, GitRepository, GitResult, VersionControl, parse_name_status};
