use crate::analyzer::progress::{Goals, STEP_GOAL, STUDY_GOAL_MINUTES, TODO_GOAL};
use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".lifelog";
const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub records_path: PathBuf,
    pub photos_path: PathBuf,
    pub storage_quota_bytes: usize,
    pub step_goal: u32,
    pub study_goal_minutes: u32,
    pub todo_goal: u32,
}

impl Default for Config {
    fn default() -> Self {
        let root = default_root_dir();

        Self {
            records_path: root.join("db").join("records.db"),
            photos_path: root.join("db").join("photos.db"),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            step_goal: STEP_GOAL,
            study_goal_minutes: STUDY_GOAL_MINUTES,
            todo_goal: TODO_GOAL,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(config_path)?;

        Ok(())
    }

    pub fn goals(&self) -> Goals {
        Goals {
            steps: self.step_goal,
            study_minutes: self.study_goal_minutes,
            todos: self.todo_goal,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_goal == 0 || self.study_goal_minutes == 0 || self.todo_goal == 0 {
            bail!("Goals must be at least 1");
        }
        if self.storage_quota_bytes == 0 {
            bail!("storage_quota_bytes must be positive");
        }

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "records_path" => {
                self.records_path = expand_home(value.trim());
            }
            "photos_path" => {
                self.photos_path = expand_home(value.trim());
            }
            "storage_quota_bytes" => {
                self.storage_quota_bytes = value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|bytes| *bytes > 0)
                    .ok_or_else(|| anyhow!("storage_quota_bytes must be a positive number"))?;
            }
            "step_goal" => {
                self.step_goal = parse_goal("step_goal", value)?;
            }
            "study_goal_minutes" => {
                self.study_goal_minutes = parse_goal("study_goal_minutes", value)?;
            }
            "todo_goal" => {
                self.todo_goal = parse_goal("todo_goal", value)?;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: records_path|records.path, photos_path|photos.path, storage_quota_bytes|storage.quota_bytes, step_goal|goal.steps, study_goal_minutes|goal.study_minutes, todo_goal|goal.todos"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "records_path" => Some(self.records_path.display().to_string()),
            "photos_path" => Some(self.photos_path.display().to_string()),
            "storage_quota_bytes" => Some(self.storage_quota_bytes.to_string()),
            "step_goal" => Some(self.step_goal.to_string()),
            "study_goal_minutes" => Some(self.study_goal_minutes.to_string()),
            "todo_goal" => Some(self.todo_goal.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "records_path" | "records.path" => "records_path",
        "photos_path" | "photos.path" => "photos_path",
        "storage_quota_bytes" | "storage.quota_bytes" => "storage_quota_bytes",
        "step_goal" | "goal.steps" => "step_goal",
        "study_goal_minutes" | "goal.study_minutes" => "study_goal_minutes",
        "todo_goal" | "goal.todos" => "todo_goal",
        _ => key,
    }
}

fn parse_goal(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|goal| *goal > 0)
        .ok_or_else(|| anyhow!("{name} must be a number of at least 1"))
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}
