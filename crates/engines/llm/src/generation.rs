//! Prompt formatting and generation output parsing.
//!
//! The model was fine-tuned on prompts of the form
//! `<sfen>( think)*<|im_start|>` and answers `<usi move> <B|W>`, where the
//! letter is the side it expects to win.

use usi_core::Side;

/// Marks the end of the prompt and the start of the model's answer.
pub const ANSWER_START: &str = "<|im_start|>";

/// Padding token repeated between the position and the answer.
pub const THINK_TOKEN: &str = " think";

pub fn format_prompt(sfen: &str, n_think: usize) -> String {
    let mut prompt =
        String::with_capacity(sfen.len() + THINK_TOKEN.len() * n_think + ANSWER_START.len());
    prompt.push_str(sfen);
    for _ in 0..n_think {
        prompt.push_str(THINK_TOKEN);
    }
    prompt.push_str(ANSWER_START);
    prompt
}

/// Parse `<move> <B|W>` from the generated text.
///
/// Returns None on any deviation from that exact shape: extra tokens,
/// lowercase winner, missing separator, or a move that isn't USI-shaped.
pub fn parse_answer(text: &str) -> Option<(String, Side)> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    let (mv, winner) = text.split_once(' ')?;
    if !is_usi_move(mv) {
        return None;
    }
    let winner = Side::from_winner_symbol(winner)?;
    Some((mv.to_string(), winner))
}

/// Whether `mv` looks like a USI move.
///
/// - board move: 4 chars from `[1-9a-z]`, optionally followed by `+`
/// - drop: an uppercase piece letter, `*`, then 2 chars from `[1-9a-z]`
///
/// Shape only. Legality is the rules backend's job.
pub fn is_usi_move(mv: &str) -> bool {
    let coord = |&b: &u8| matches!(b, b'1'..=b'9' | b'a'..=b'z');
    match mv.as_bytes() {
        [piece, b'*', rest @ ..] => {
            piece.is_ascii_uppercase() && rest.len() == 2 && rest.iter().all(coord)
        }
        [squares @ .., b'+'] => squares.len() == 4 && squares.iter().all(coord),
        squares => squares.len() == 4 && squares.iter().all(coord),
    }
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod generation_tests;
