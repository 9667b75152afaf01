//! Long-text segmentation for the async TTS subsystem (§4.6) — splits text the same way
//! for both the streaming layer's multi-turn `RunSynthesis` calls and the background
//! worker's segmented synthesis path.
//!
//! Also carries the punctuation-cascade and clone-prompt helpers consumed by the ASR/TTS
//! session FSMs. Real punctuation restoration and ITN are models, out of scope per the
//! spec's Non-goals; these are deterministic stand-ins that keep the cascade's shape
//! (two distinct passes, raw text preserved alongside punctuated text) testable without a
//! real model present, mirroring the stub engine in `engine::stub`.

use serving_core::settings::CloneModelVersion;

/// Sentence-ending punctuation, Chinese and Western.
const SENTENCE_END: &[char] = &['。', '！', '？', '.', '!', '?', '\n'];

/// Split `text` into sentence-sized segments suitable for one `RunSynthesis`/synth call
/// each. Runs of whitespace-only or empty segments are dropped.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if SENTENCE_END.contains(&c) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Offline/realtime punctuation restoration stand-in (§4.3 punctuation cascade): leaves
/// already-terminated text untouched, otherwise appends a Chinese full stop. Deterministic
/// so the cascade's ordering/dedup invariants (§8) hold under test.
#[must_use]
pub fn restore_punctuation(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(SENTENCE_END) {
        trimmed.to_string()
    } else {
        format!("{trimmed}。")
    }
}

/// Inverse text normalization stand-in. No ITN model is in scope (§1 Non-goals); this is
/// the identity transform, kept as a distinct call site so the cascade's ITN step is
/// independently toggleable and testable even though it has nothing to rewrite yet.
#[must_use]
pub fn apply_itn(text: &str) -> String {
    text.trim().to_string()
}

/// CosyVoice3 assistant preface, immediately followed by the terminator.
const CLONE_PROMPT_PREFACE: &str = "You are a helpful assistant.<|endofprompt|>";

/// Builds the instruction text passed to the clone engine (§4.4 prompt handling), per
/// the `CLONE_MODEL_VERSION` setting. CosyVoice3 requires the assistant preface and
/// terminator ahead of the prompt text (or alone, if no prompt was given); CosyVoice2
/// passes the prompt through unformatted and is dropped entirely when absent.
#[must_use]
pub fn build_clone_prompt(prompt: Option<&str>, version: CloneModelVersion) -> Option<String> {
    let text = prompt.map(str::trim).unwrap_or_default();
    match version {
        CloneModelVersion::CosyVoice3 if text.is_empty() => Some(CLONE_PROMPT_PREFACE.to_string()),
        CloneModelVersion::CosyVoice3 => Some(format!("{CLONE_PROMPT_PREFACE}{text}")),
        CloneModelVersion::CosyVoice2 if text.is_empty() => None,
        CloneModelVersion::CosyVoice2 => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_chinese_and_western_terminators() {
        let sentences = split_sentences("你好。今天天气不错！Is that right? Yes.");
        assert_eq!(
            sentences,
            vec![
                "你好。".to_string(),
                "今天天气不错！".to_string(),
                "Is that right?".to_string(),
                "Yes.".to_string(),
            ]
        );
    }

    #[test]
    fn trailing_text_without_terminator_is_kept() {
        let sentences = split_sentences("Hello there");
        assert_eq!(sentences, vec!["Hello there".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn punctuation_restoration_leaves_terminated_text_alone() {
        assert_eq!(restore_punctuation("打开空调。"), "打开空调。");
    }

    #[test]
    fn punctuation_restoration_appends_a_full_stop() {
        assert_eq!(restore_punctuation("打开空调"), "打开空调。");
    }

    #[test]
    fn itn_is_currently_the_identity_transform() {
        assert_eq!(apply_itn("  100 个 "), "100 个");
    }

    #[test]
    fn cosyvoice2_drops_missing_or_blank_prompt() {
        assert!(build_clone_prompt(None, CloneModelVersion::CosyVoice2).is_none());
        assert!(build_clone_prompt(Some("   "), CloneModelVersion::CosyVoice2).is_none());
    }

    #[test]
    fn cosyvoice2_passes_the_prompt_through_unformatted() {
        let prompt = build_clone_prompt(Some("用温柔的语气"), CloneModelVersion::CosyVoice2).unwrap();
        assert_eq!(prompt, "用温柔的语气");
    }

    #[test]
    fn cosyvoice3_prefaces_a_given_prompt() {
        let prompt = build_clone_prompt(Some("用温柔的语气"), CloneModelVersion::CosyVoice3).unwrap();
        assert_eq!(prompt, "You are a helpful assistant.<|endofprompt|>用温柔的语气");
    }

    #[test]
    fn cosyvoice3_yields_the_bare_preface_without_a_prompt() {
        let prompt = build_clone_prompt(None, CloneModelVersion::CosyVoice3).unwrap();
        assert_eq!(prompt, "You are a helpful assistant.<|endofprompt|>");
        let blank = build_clone_prompt(Some("   "), CloneModelVersion::CosyVoice3).unwrap();
        assert_eq!(blank, "You are a helpful assistant.<|endofprompt|>");
    }
}
