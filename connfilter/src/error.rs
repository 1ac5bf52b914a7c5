use std::{io, path::PathBuf};

use connfilter_common::RuleTableError;
use thiserror::Error;

use crate::ImageError;

/// Rule engine errors.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// Index out of range or a field too long for the table.
    #[error(transparent)]
    Table(#[from] RuleTableError),
    /// Backing file couldn't be opened or created.
    #[error("couldn't open rule file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// IO error while reading or writing the backing file.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The backing file doesn't hold a table image this build can load.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// Pattern is not a valid regular expression.
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}
