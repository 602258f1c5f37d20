//! Round-trip driver between remote files and [`ConfigDocument`]s.

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::server::User;
use crate::transport::FileTransfer;

use super::document::ConfigDocument;
use super::errors::{ConfigError, ConfigResult};

/// Fetches remote configuration files into documents and ships documents
/// back, staging through a local scratch file. The scratch file is removed
/// when the operation completes — including when it fails partway.
pub struct ConfigTransport<'a> {
    transfer: &'a dyn FileTransfer,
}

impl<'a> ConfigTransport<'a> {
    /// Create a transport over a file-transfer capability.
    pub fn new(transfer: &'a dyn FileTransfer) -> Self {
        Self { transfer }
    }

    /// Copy the remote file locally and parse it, scoped to `section`.
    pub fn fetch(
        &self,
        host: &str,
        principal: &User,
        path: &Path,
        section: &str,
    ) -> ConfigResult<ConfigDocument> {
        let scratch = NamedTempFile::new()?;
        self.transfer
            .copy_from_remote(host, principal, path, scratch.path())?;
        let bytes = fs::read(scratch.path())?;
        let text = String::from_utf8(bytes).map_err(|err| ConfigError::Parse {
            message: format!("configuration is not valid UTF-8: {err}"),
        })?;
        Ok(ConfigDocument::parse(&text, section))
    }

    /// Render the document and ship it to the remote path.
    pub fn write(
        &self,
        config: &ConfigDocument,
        host: &str,
        principal: &User,
        path: &Path,
    ) -> ConfigResult<()> {
        let scratch = NamedTempFile::new()?;
        fs::write(scratch.path(), config.render())?;
        self.transfer
            .copy_to_remote(scratch.path(), host, principal, path)?;
        Ok(())
    }
}
