//! Converter configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::input::SkillInfo;

/// Top-level quizforge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Prefix for ids of individually converted questions.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    /// Prefix for positional batch ids.
    #[serde(default = "default_batch_prefix")]
    pub batch_prefix: String,
    /// Default skill context when a batch file carries none.
    #[serde(default)]
    pub skill: SkillInfo,
    /// Pretty-print JSON output.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_id_prefix() -> String {
    "q".to_string()
}
fn default_batch_prefix() -> String {
    "item".to_string()
}
fn default_pretty() -> bool {
    true
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            batch_prefix: default_batch_prefix(),
            skill: SkillInfo::default(),
            pretty: default_pretty(),
        }
    }
}

impl QuizforgeConfig {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            id_prefix: self.id_prefix.clone(),
            batch_prefix: self.batch_prefix.clone(),
        }
    }

    fn resolve_env(&mut self) {
        for field in [
            &mut self.id_prefix,
            &mut self.batch_prefix,
            &mut self.skill.subject,
            &mut self.skill.grade,
            &mut self.skill.skill_name,
            &mut self.skill.skill_number,
        ] {
            *field = resolve_env_vars(field);
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_ID_PREFIX`, `QUIZFORGE_SUBJECT`,
/// `QUIZFORGE_GRADE`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizforge.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => QuizforgeConfig::default(),
    };

    apply_env_overrides(&mut config);
    config.resolve_env();

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<QuizforgeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env_overrides(config: &mut QuizforgeConfig) {
    if let Ok(prefix) = std::env::var("QUIZFORGE_ID_PREFIX") {
        config.id_prefix = prefix;
    }
    if let Ok(subject) = std::env::var("QUIZFORGE_SUBJECT") {
        config.skill.subject = subject;
    }
    if let Ok(grade) = std::env::var("QUIZFORGE_GRADE") {
        config.skill.grade = grade;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}
