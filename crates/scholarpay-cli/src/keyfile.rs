/*
[INPUT]:  Key file path
[OUTPUT]: Persistent local wallet keypair
[POS]:    CLI layer - storage for the local signing key
[UPDATE]: When key storage format changes
*/

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use scholarpay_core::StellarKeypair;

/// Secret seed file for the CLI's local wallet
#[derive(Debug, Clone)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored keypair, if any
    pub fn load(&self) -> Result<Option<StellarKeypair>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read key file {}", self.path.display()));
            }
        };
        let keypair = StellarKeypair::from_secret_seed(&content)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("parse key file {}", self.path.display()))?;
        Ok(Some(keypair))
    }

    /// Generate and store a new keypair; refuses to overwrite unless `force`
    pub fn create(&self, force: bool) -> Result<StellarKeypair> {
        if self.exists() && !force {
            return Err(anyhow!(
                "key file {} already exists; pass --force to replace it",
                self.path.display()
            ));
        }
        let keypair = StellarKeypair::generate();
        self.save(&keypair)?;
        Ok(keypair)
    }

    fn save(&self, keypair: &StellarKeypair) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("create key directory")?;
        }

        // The seed never sits in a file with looser permissions than 0600
        let temp_path = self.path.with_extension("tmp");
        match fs::remove_file(&temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("remove stale key temp file"),
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&temp_path).context("create key file")?;
        file.write_all(keypair.secret_seed().as_bytes())
            .context("write key file")?;
        file.sync_all().context("flush key file")?;
        fs::rename(&temp_path, &self.path).context("move key file into place")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_key_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("scholarpay-key-{}", uuid::Uuid::new_v4()))
            .join("wallet.key")
    }

    #[test]
    fn test_create_then_load() {
        let path = temp_key_path();
        let key_file = KeyFile::new(&path);
        assert!(key_file.load().unwrap().is_none());

        let created = key_file.create(false).unwrap();
        let loaded = key_file.load().unwrap().expect("stored key");
        assert_eq!(created.public_key(), loaded.public_key());

        assert!(key_file.create(false).is_err());
        let replaced = key_file.create(true).unwrap();
        assert_ne!(replaced.public_key(), created.public_key());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_key_path();
        KeyFile::new(&path).create(false).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_forced_replace_of_loose_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_key_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(path.with_extension("tmp"), "leftover").unwrap();

        KeyFile::new(&path).create(true).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!path.with_extension("tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_key_file() {
        let path = temp_key_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "garbage").unwrap();
        assert!(KeyFile::new(&path).load().is_err());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
