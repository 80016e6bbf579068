use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OWNER: &str = "tukui-org";
pub const DEFAULT_REPO: &str = "ElvUI";
pub const DEST_DIR_NAME: &str = "dest";
pub const GITHUB_API_URL: &str = "https://api.github.com";

const SPINNER_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub work_dir: PathBuf,
    pub spinner_interval: Duration,
    pub user_agent: String,
    pub github_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            api_url: GITHUB_API_URL.to_string(),
            work_dir: PathBuf::from("."),
            spinner_interval: Duration::from_millis(SPINNER_INTERVAL_MS),
            user_agent: format!("elvup/{}", env!("CARGO_PKG_VERSION")),
            github_token: None,
        }
    }
}

impl Config {
    /// Builds the run configuration, picking up `GITHUB_TOKEN` when set.
    pub fn load() -> Self {
        Config {
            github_token: std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_work_dir<P: AsRef<Path>>(work_dir: P) -> Self {
        Config {
            work_dir: work_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn get_dest_dir(&self) -> PathBuf {
        self.work_dir.join(DEST_DIR_NAME)
    }

    /// Where the downloaded archive for `tag_name` is written.
    pub fn get_archive_path(&self, tag_name: &str) -> PathBuf {
        let file_name: String = tag_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        self.work_dir.join(format!("{file_name}.zip"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.owner, "tukui-org");
        assert_eq!(config.repo, "ElvUI");
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.get_dest_dir(), PathBuf::from("./dest"));
        assert_eq!(config.spinner_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_archive_path_is_named_after_tag() {
        let config = Config::with_work_dir("/tmp/run");
        assert_eq!(
            config.get_archive_path("v13.74"),
            PathBuf::from("/tmp/run/v13.74.zip")
        );
        assert_eq!(
            config.get_archive_path("release/v1"),
            PathBuf::from("/tmp/run/release-v1.zip")
        );
    }
}
