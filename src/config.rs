use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid repository slug (expected owner/name): {0}")]
    InvalidRepository(String),

    #[error("Invalid minimum line count: {0}")]
    InvalidMinLines(String),

    #[error("Repository not configured (set GITHUB_REPOSITORY or the config file)")]
    MissingRepository,

    #[error("GitHub token not configured (set INPUT_GITHUB_TOKEN or GITHUB_TOKEN)")]
    MissingToken,
}

/// Repository coordinate, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        match slug.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Repository {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidRepository(slug.to_string())),
        }
    }
}

/// Resolved configuration, built once at process start and passed into the
/// pipeline. No other module reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: Repository,
    pub token: String,
    /// Minimum changed-line count; 0 disables the change-size gate.
    pub min_lines: u64,
    /// Author logins whose events are never processed (exact match).
    pub skip_authors: Vec<String>,
}

/// On-disk shape of .review-collector.toml. All fields optional; the
/// environment fills whatever the file leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    repository: Option<String>,
    min_lines: Option<u64>,
    #[serde(default)]
    skip_authors: Vec<String>,
    #[serde(default)]
    github: GitHubSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GitHubSection {
    token: Option<String>,
}

/// Environment values captured once so `resolve` stays a pure function.
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    repository: Option<String>,
    token: Option<String>,
    min_lines: Option<String>,
    skip_authors: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        Self {
            repository: std::env::var("GITHUB_REPOSITORY").ok(),
            token: std::env::var("INPUT_GITHUB_TOKEN")
                .or_else(|_| std::env::var("GITHUB_TOKEN"))
                .ok(),
            min_lines: std::env::var("INPUT_MIN_LINES").ok(),
            skip_authors: std::env::var("INPUT_SKIP_AUTHORS").ok(),
        }
    }
}

impl Config {
    /// Load configuration from .review-collector.toml in the current
    /// directory (if present), then apply environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".review-collector.toml");
        let raw = if path.exists() {
            read_raw(path)?
        } else {
            RawConfig::default()
        };
        resolve(raw, EnvOverrides::capture())
    }

    /// Load from a specific path (useful for testing), still applying
    /// environment overrides.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        resolve(read_raw(path)?, EnvOverrides::capture())
    }
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Merge file values and environment overrides into a resolved Config.
/// Environment wins, matching the action-style contract the job runs under.
fn resolve(raw: RawConfig, env: EnvOverrides) -> Result<Config, ConfigError> {
    let slug = env
        .repository
        .or(raw.repository)
        .ok_or(ConfigError::MissingRepository)?;
    let repository = Repository::from_str(&slug)?;

    let token = env
        .token
        .or(raw.github.token)
        .ok_or(ConfigError::MissingToken)?;

    let min_lines = match env.min_lines {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidMinLines(value))?,
        None => raw.min_lines.unwrap_or(0),
    };

    let skip_authors = match env.skip_authors {
        Some(value) => parse_skip_authors(&value),
        None => raw.skip_authors,
    };

    Ok(Config {
        repository,
        token,
        min_lines,
        skip_authors,
    })
}

/// Parse a comma- or newline-separated skip-list into logins.
fn parse_skip_authors(value: &str) -> Vec<String> {
    value
        .split(['\n', ','])
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> EnvOverrides {
        EnvOverrides::default()
    }

    #[test]
    fn test_repository_slug_parsing() {
        let repo = Repository::from_str("tracehubpm/test").unwrap();
        assert_eq!(repo.owner, "tracehubpm");
        assert_eq!(repo.name, "test");

        assert!(Repository::from_str("no-slash").is_err());
        assert!(Repository::from_str("/name").is_err());
        assert!(Repository::from_str("owner/").is_err());
        assert!(Repository::from_str("a/b/c").is_err());
    }

    #[test]
    fn test_resolve_from_file_values() {
        let raw: RawConfig = toml::from_str(
            r#"
repository = "org/repo"
min_lines = 50
skip_authors = ["renovate[bot]"]

[github]
token = "file-token"
"#,
        )
        .unwrap();
        let config = resolve(raw, no_env()).unwrap();
        assert_eq!(config.repository.owner, "org");
        assert_eq!(config.token, "file-token");
        assert_eq!(config.min_lines, 50);
        assert_eq!(config.skip_authors, vec!["renovate[bot]".to_string()]);
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let raw: RawConfig = toml::from_str(
            r#"
repository = "org/repo"
min_lines = 50

[github]
token = "file-token"
"#,
        )
        .unwrap();
        let env = EnvOverrides {
            repository: Some("other/project".to_string()),
            token: Some("env-token".to_string()),
            min_lines: Some("10".to_string()),
            skip_authors: Some("jeff,not-jeff".to_string()),
        };
        let config = resolve(raw, env).unwrap();
        assert_eq!(config.repository.name, "project");
        assert_eq!(config.token, "env-token");
        assert_eq!(config.min_lines, 10);
        assert_eq!(
            config.skip_authors,
            vec!["jeff".to_string(), "not-jeff".to_string()]
        );
    }

    #[test]
    fn test_missing_repository_is_an_error() {
        let result = resolve(RawConfig::default(), no_env());
        assert!(matches!(result, Err(ConfigError::MissingRepository)));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let raw: RawConfig = toml::from_str(r#"repository = "org/repo""#).unwrap();
        let result = resolve(raw, no_env());
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_malformed_min_lines_is_an_error() {
        let raw: RawConfig = toml::from_str(r#"repository = "org/repo""#).unwrap();
        let env = EnvOverrides {
            token: Some("t".to_string()),
            min_lines: Some("not-a-number".to_string()),
            ..EnvOverrides::default()
        };
        assert!(matches!(
            resolve(raw, env),
            Err(ConfigError::InvalidMinLines(_))
        ));
    }

    #[test]
    fn test_load_from_reads_a_config_file() {
        let path = std::env::temp_dir().join("review-collector-config-test.toml");
        std::fs::write(
            &path,
            r#"
repository = "org/repo"
min_lines = 25
skip_authors = ["dependabot[bot]"]

[github]
token = "file-token"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.min_lines, 25);
        assert_eq!(config.skip_authors, vec!["dependabot[bot]".to_string()]);
    }

    #[test]
    fn test_parse_skip_authors_separators() {
        assert_eq!(
            parse_skip_authors("jeff, not-jeff\nbot[ci]\n\n"),
            vec![
                "jeff".to_string(),
                "not-jeff".to_string(),
                "bot[ci]".to_string()
            ]
        );
        assert!(parse_skip_authors("").is_empty());
    }
}
