//! Engine configuration file (TOML).
//!
//! ```toml
//! [engine]
//! name = "ShogiLLM"
//! author = "ShogiLLM"
//!
//! [policy]
//! mate_horizon = 5
//!
//! [oracle]
//! command = "python3"
//! args = ["serve_model.py", "--checkpoint", "checkpoints/v1"]
//! n_think = 0
//! max_new_tokens = 10
//!
//! [rules]
//! command = "python3"
//! args = ["rules_helper.py"]
//! timeout_ms = 2000
//! ```

use anyhow::{bail, Context, Result};
use bridge::ProcessConfig;
use llm_engine::{LlmConfig, DEFAULT_MAX_NEW_TOKENS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use usi_core::{
    default_options, PolicyConfig, SessionConfig, DEFAULT_MATE_HORIZON, MATE_PLY_RANGE,
    MAX_NEW_TOKENS_RANGE,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: IdentityConfig,
    #[serde(default)]
    pub policy: PolicySection,
    pub oracle: OracleSection,
    pub rules: ProcessConfig,
}

/// Names announced in the `usi` handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub author: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "ShogiLLM".to_string(),
            author: "ShogiLLM".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// Forced-mate search horizon in plies
    pub mate_horizon: u32,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            mate_horizon: DEFAULT_MATE_HORIZON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSection {
    /// How to launch the model server
    #[serde(flatten)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub n_think: usize,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

fn default_max_new_tokens() -> u32 {
    DEFAULT_MAX_NEW_TOKENS
}

impl EngineConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !MATE_PLY_RANGE.contains(&self.policy.mate_horizon) {
            bail!(
                "policy.mate_horizon must be within {}..={}, got {}",
                MATE_PLY_RANGE.start(),
                MATE_PLY_RANGE.end(),
                self.policy.mate_horizon
            );
        }
        if !MAX_NEW_TOKENS_RANGE.contains(&self.oracle.max_new_tokens) {
            bail!(
                "oracle.max_new_tokens must be within {}..={}, got {}",
                MAX_NEW_TOKENS_RANGE.start(),
                MAX_NEW_TOKENS_RANGE.end(),
                self.oracle.max_new_tokens
            );
        }
        if self.oracle.process.command.trim().is_empty() {
            bail!("oracle.command must not be empty");
        }
        if self.rules.command.trim().is_empty() {
            bail!("rules.command must not be empty");
        }
        Ok(())
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            n_think: self.oracle.n_think,
            max_new_tokens: self.oracle.max_new_tokens,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            engine_name: self.engine.name.clone(),
            engine_author: self.engine.author.clone(),
            policy: PolicyConfig {
                mate_horizon: self.policy.mate_horizon,
            },
            options: default_options(self.policy.mate_horizon, self.oracle.max_new_tokens),
        }
    }
}
