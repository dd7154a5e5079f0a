//! Language Model Move Oracle
//!
//! This crate turns a fine-tuned causal language model into a
//! [`usi_core::MoveOracle`].
//!
//! # Architecture
//!
//! 1. The position's SFEN is formatted into a prompt (see [`format_prompt`])
//! 2. A [`Generator`] completes it greedily, reporting the generated text and
//!    the logit difference between the ` B` and ` W` winner tokens
//! 3. The text must read `<usi move> <B|W>`; anything else is a malformed
//!    answer, which the decision policy turns into a fallback move
//!
//! The model itself runs outside this process; [`ProcessGenerator`] talks to
//! it over the JSON-lines bridge.

mod generation;
mod generator;

pub use generation::*;
pub use generator::*;

use bridge::BridgeError;
use tracing::{debug, info, warn};
use usi_core::{
    parse_spin, MoveOracle, OracleError, OraclePrediction, MAX_NEW_TOKENS_RANGE,
    OPTION_MAX_NEW_TOKENS,
};

pub use usi_core::DEFAULT_MAX_NEW_TOKENS;

/// Prompt and decoding settings the model was trained with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Number of ` think` padding tokens in the prompt
    pub n_think: usize,
    /// Generation budget per prediction
    pub max_new_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            n_think: 0,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }
}

/// Move oracle backed by a text generator.
pub struct LlmOracle<G: Generator> {
    generator: G,
    config: LlmConfig,
    /// Predictions requested so far (for logging)
    predictions: u64,
}

impl<G: Generator> LlmOracle<G> {
    pub fn new(generator: G, config: LlmConfig) -> Self {
        Self {
            generator,
            config,
            predictions: 0,
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

impl<G: Generator> MoveOracle for LlmOracle<G> {
    fn predict(&mut self, sfen: &str) -> Result<Option<OraclePrediction>, OracleError> {
        self.predictions += 1;
        let prompt = format_prompt(sfen, self.config.n_think);

        let generation = self
            .generator
            .generate(&prompt, self.config.max_new_tokens)
            .map_err(|e| match e {
                GeneratorError::Bridge(BridgeError::Timeout(ms)) => OracleError::Timeout(ms),
                other => OracleError::Unavailable(other.to_string()),
            })?;

        debug!(
            n = self.predictions,
            text = %generation.text,
            new_tokens = generation.new_tokens,
            logit_diff = generation.logit_diff,
            "Generated"
        );

        if generation.new_tokens == 0 {
            return Ok(None);
        }
        let Some((candidate, winner)) = parse_answer(&generation.text) else {
            return Ok(None);
        };
        Ok(Some(OraclePrediction {
            candidate,
            winner,
            confidence: generation.logit_diff,
        }))
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        if !name.eq_ignore_ascii_case(OPTION_MAX_NEW_TOKENS) {
            return false;
        }
        match parse_spin(value, &MAX_NEW_TOKENS_RANGE) {
            Some(tokens) => {
                info!(tokens, "Generation budget changed");
                self.config.max_new_tokens = tokens;
            }
            None => warn!(%value, "Invalid {OPTION_MAX_NEW_TOKENS}, keeping current budget"),
        }
        true
    }
}
