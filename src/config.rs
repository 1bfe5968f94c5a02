//! Configuration for a replication run and docker credential setup

use crate::concurrency::DEFAULT_CONCURRENCY;
use crate::error::{ReplikaError, Result};
use crate::logging::Logger;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

/// Environment variable holding a base64 encoded docker `config.json`
pub const DOCKER_CONFIG_ENV: &str = "DOCKERCONFIG_BASE64";

/// Settings of one replication run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationConfig {
    pub image_file: String,
    pub source_registry: String,
    pub destination_registries: Vec<String>,
    pub pull: bool,
    pub push: bool,
    /// Requested concurrency; the scheduler maps values below 1 to the default
    pub concurrency: i64,
    pub docker_config: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            image_file: "IMAGES.txt".to_string(),
            source_registry: String::new(),
            destination_registries: Vec::new(),
            pull: false,
            push: false,
            concurrency: DEFAULT_CONCURRENCY as i64,
            docker_config: None,
            dry_run: false,
        }
    }
}

impl ReplicationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.image_file.trim().is_empty() {
            return Err(ReplikaError::Config(
                "Image list file cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Docker config directory used for registry credentials.
///
/// A directory generated from [`DOCKER_CONFIG_ENV`] is removed when the value
/// is dropped; a user supplied directory is left alone.
#[derive(Debug)]
pub struct DockerConfigDir {
    path: PathBuf,
    generated: bool,
}

impl DockerConfigDir {
    /// Pick the docker config directory for this run.
    ///
    /// An explicit directory wins. Otherwise a non-blank [`DOCKER_CONFIG_ENV`]
    /// is decoded into a temporary directory. Returns `None` when neither is
    /// available, leaving docker on its default configuration.
    pub fn resolve(explicit: Option<&Path>, logger: &Logger) -> Result<Option<Self>> {
        let encoded = std::env::var(DOCKER_CONFIG_ENV).ok();
        Self::resolve_from(explicit, encoded.as_deref(), &std::env::temp_dir(), logger)
    }

    /// [`resolve`](Self::resolve) with the encoded config passed in and the
    /// generated directory placed under `parent`
    pub fn resolve_from(
        explicit: Option<&Path>,
        encoded: Option<&str>,
        parent: &Path,
        logger: &Logger,
    ) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Ok(Some(Self {
                path: path.to_path_buf(),
                generated: false,
            }));
        }

        let Some(encoded) = encoded.filter(|value| !value.trim().is_empty()) else {
            return Ok(None);
        };

        logger.info(&format!(
            "Generating docker config.json from environment variable ${}",
            DOCKER_CONFIG_ENV
        ));
        Self::from_base64(encoded, parent).map(Some)
    }

    /// Decode `encoded` into `<parent>/replika-<uuid>/config.json`
    pub fn from_base64(encoded: &str, parent: &Path) -> Result<Self> {
        let content = STANDARD.decode(encoded.trim())?;

        let path = parent.join(format!("replika-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        // Dropping `dir` removes the directory if a later step fails.
        let dir = Self {
            path,
            generated: true,
        };
        set_mode(&dir.path, 0o750)?;

        let config_file = dir.path.join("config.json");
        std::fs::write(&config_file, content)?;
        set_mode(&config_file, 0o640)?;

        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

impl Drop for DockerConfigDir {
    fn drop(&mut self) {
        if self.generated {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplicationConfig::default();
        assert_eq!(config.image_file, "IMAGES.txt");
        assert_eq!(config.concurrency, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_image_file_is_rejected() {
        let config = ReplicationConfig {
            image_file: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ReplikaError::Config(_))));
    }

    #[test]
    fn test_push_without_destinations_is_accepted() {
        let config = ReplicationConfig {
            pull: true,
            push: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_decodes_encoded_config() {
        let parent = std::env::temp_dir();
        let encoded = STANDARD.encode(r#"{"auths":{}}"#);

        let dir = DockerConfigDir::resolve_from(None, Some(&encoded), &parent, &Logger::new_quiet())
            .unwrap()
            .unwrap();
        let path = dir.path().to_path_buf();

        assert!(dir.is_generated());
        assert!(path.starts_with(&parent));
        assert_eq!(
            std::fs::read_to_string(path.join("config.json")).unwrap(),
            r#"{"auths":{}}"#
        );
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_without_config_uses_docker_default() {
        let parent = std::env::temp_dir();
        let logger = Logger::new_quiet();

        assert!(DockerConfigDir::resolve_from(None, None, &parent, &logger)
            .unwrap()
            .is_none());
        assert!(DockerConfigDir::resolve_from(None, Some("  \n"), &parent, &logger)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_explicit_dir_wins_over_encoded_config() {
        let explicit = Path::new("/etc/replika/docker");
        let dir = DockerConfigDir::resolve_from(
            Some(explicit),
            Some("bm90IHVzZWQ="),
            &std::env::temp_dir(),
            &Logger::new_quiet(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(dir.path(), explicit);
        assert!(!dir.is_generated());
    }

    #[test]
    fn test_resolve_rejects_invalid_encoded_config() {
        let err = DockerConfigDir::resolve_from(
            None,
            Some("not base64!"),
            &std::env::temp_dir(),
            &Logger::new_quiet(),
        )
        .unwrap_err();
        assert!(matches!(err, ReplikaError::Decode(_)));
    }

    #[test]
    fn test_explicit_dir_is_not_removed() {
        let parent =
            std::env::temp_dir().join(format!("replika-explicit-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&parent).unwrap();

        let dir = DockerConfigDir::resolve(Some(&parent), &Logger::new_quiet())
            .unwrap()
            .unwrap();
        assert!(!dir.is_generated());
        drop(dir);

        assert!(parent.exists());
        std::fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn test_from_base64_writes_config_and_cleans_up() {
        let parent = std::env::temp_dir();
        let encoded =
            STANDARD.encode(r#"{"auths":{"registry.example.com":{"auth":"dXNlcjpwYXNz"}}}"#);

        let dir = DockerConfigDir::from_base64(&encoded, &parent).unwrap();
        let path = dir.path().to_path_buf();
        let content = std::fs::read_to_string(path.join("config.json")).unwrap();
        assert!(content.contains("registry.example.com"));
        assert!(dir.is_generated());

        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_from_base64_rejects_invalid_input() {
        let err = DockerConfigDir::from_base64("not base64!", &std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, ReplikaError::Decode(_)));
    }
}
