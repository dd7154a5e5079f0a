//! Text generation backends.

use bridge::{BridgeError, JsonLineProcess, ProcessConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output of one greedy generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Decoded new text, special tokens stripped
    pub text: String,
    /// Number of tokens generated
    pub new_tokens: usize,
    /// logit(" B") - logit(" W") at the winner position.
    /// Positive: the model expects the first player (sente) to win.
    pub logit_diff: f32,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("generator backend failure: {0}")]
    Backend(String),
}

/// Anything that can complete a prompt (greedy decoding, no sampling).
pub trait Generator {
    fn generate(
        &mut self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<Generation, GeneratorError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_new_tokens: u32,
}

/// Generator running in a helper process (the model server).
///
/// Request: `{"prompt": "...", "max_new_tokens": 10}`
/// Reply: `{"text": "7g7f B", "new_tokens": 4, "logit_diff": 1.25}`
pub struct ProcessGenerator {
    process: JsonLineProcess,
}

impl ProcessGenerator {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            process: JsonLineProcess::new(config),
        }
    }

    /// Spawn the model server now, so the first `go` does not pay for
    /// loading the model.
    pub fn start(&mut self) -> Result<(), GeneratorError> {
        Ok(self.process.start()?)
    }
}

impl Generator for ProcessGenerator {
    fn generate(
        &mut self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<Generation, GeneratorError> {
        let request = GenerateRequest {
            prompt,
            max_new_tokens,
        };
        Ok(self.process.request(&request)?)
    }
}
