mod image;

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use connfilter_common::RuleTable;
use tracing::{debug, warn};

use crate::{Error, Result};

pub use image::ImageError;

/// How [`RuleStore::open`] treats the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read the table image from an existing file.
    Load,
    /// Create or truncate the file and start from an empty table.
    Create,
}

/// A [`RuleTable`] together with the file it is persisted to.
///
/// The file stays open until [`close`](RuleStore::close), which writes the table back. A store
/// dropped without `close` discards every change made since it was opened.
pub struct RuleStore {
    path: PathBuf,
    file: Option<File>,
    table: Box<RuleTable>,
}

impl RuleStore {
    /// Opens the rule file at `path`.
    ///
    /// Loading fails if the file doesn't exist or doesn't hold a table image matching this
    /// build's capacity and field width. Both modes open the file for reading and writing,
    /// since [`close`](RuleStore::close) writes back through the same handle, so a read-only
    /// rule file fails with [`Error::Open`].
    ///
    /// # Example
    /// ```no_run
    /// # use connfilter::{OpenMode, RuleStore, Verdict};
    /// let mut store = RuleStore::open("rules.bin", OpenMode::Create).unwrap();
    /// store
    ///     .table_mut()
    ///     .set_rule(0, "any", "any", 22, "any", "SSH", Verdict::Deny)
    ///     .unwrap();
    /// store.close().unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let (file, table) = match mode {
            OpenMode::Create => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| open_error(path, e))?;
                (file, Box::new(RuleTable::new()))
            }
            OpenMode::Load => {
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(path)
                    .map_err(|e| open_error(path, e))?;
                // one byte past the image is enough to reject an oversized file
                let mut buf = Vec::with_capacity(image::IMAGE_LEN + 1);
                (&mut file)
                    .take(image::IMAGE_LEN as u64 + 1)
                    .read_to_end(&mut buf)?;
                (file, image::decode(&buf)?)
            }
        };

        debug!(path = %path.display(), ?mode, active = table.active_count(), "opened rule store");
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut RuleTable {
        &mut self.table
    }

    /// Writes the table back to the file and releases it.
    pub fn close(mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            write_image(file, &self.table)?;
            debug!(
                path = %self.path.display(),
                active = self.table.active_count(),
                "closed rule store"
            );
        }
        Ok(())
    }
}

impl Drop for RuleStore {
    fn drop(&mut self) {
        if self.file.is_some() {
            warn!(
                path = %self.path.display(),
                "rule store dropped without close, changes are lost"
            );
        }
    }
}

fn open_error(path: &Path, source: io::Error) -> Error {
    Error::Open {
        path: path.to_path_buf(),
        source,
    }
}

fn write_image(mut file: File, table: &RuleTable) -> io::Result<()> {
    let image = image::encode(table);
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&image)?;
    file.set_len(image.len() as u64)?;
    file.sync_all()
}
