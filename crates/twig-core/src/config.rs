use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::store::WritePolicy;

/// Store file used when nothing else is configured, relative to the
/// working directory.
pub const DEFAULT_STORE_FILE: &str = "projects.json";

/// Environment variable overriding the store path.
pub const STORE_ENV: &str = "TWIG_STORE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub write_policy: Option<WritePolicy>,
}

/// `.twig/config.toml` in the working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

/// `<config dir>/twig/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub store_path: PathBuf,
    pub write_policy: WritePolicy,
    /// Preferred output mode from the user config, if any. The CLI decides
    /// how it ranks against flags and the environment.
    pub output: Option<String>,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".twig/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("twig/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge flag, environment, project and user settings.
///
/// Store path precedence: `cli_store` > `TWIG_STORE` > project config
/// (relative to `project_root`) > user config > [`DEFAULT_STORE_FILE`].
/// Write policy: project config > user config > immediate.
pub fn resolve_config(project_root: &Path, cli_store: Option<&Path>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;
    let env_store = env::var_os(STORE_ENV).map(PathBuf::from);

    let store_path = resolve_store_path(
        project_root,
        cli_store,
        env_store.as_deref(),
        &project,
        &user,
    );
    let write_policy = project
        .store
        .write_policy
        .or(user.store.write_policy)
        .unwrap_or_default();

    tracing::debug!(
        store = %store_path.display(),
        policy = %write_policy,
        "resolved configuration"
    );

    Ok(EffectiveConfig {
        store_path,
        write_policy,
        output: user.output,
    })
}

fn resolve_store_path(
    project_root: &Path,
    cli_store: Option<&Path>,
    env_store: Option<&Path>,
    project: &ProjectConfig,
    user: &UserConfig,
) -> PathBuf {
    if let Some(path) = cli_store.or(env_store).filter(|p| !p.as_os_str().is_empty()) {
        return path.to_path_buf();
    }

    if let Some(path) = project.store.path.as_deref() {
        return project_root.join(path);
    }

    if let Some(path) = user.store.path.as_deref() {
        return path.to_path_buf();
    }

    project_root.join(DEFAULT_STORE_FILE)
}
