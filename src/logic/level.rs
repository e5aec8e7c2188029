// src/logic/level.rs
//! レベルデータ (JSON) の読み込みと、1ゲームぶんの出題文の選択。

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::layout::MAX_ROUNDS;

/// レベルデータの単語エントリ。
/// 元データは word 単位で、その単語を含む例文 (textExample) がぶら下がっている。
/// 例文 ID (`id`) が同じエントリは同じ文を指すよ。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub id: u32,
    pub word: String,
    #[serde(default)]
    pub word_translate: Option<String>,
    pub text_example: String,
    #[serde(default)]
    pub text_example_translate: Option<String>,
    #[serde(default)]
    pub audio_example: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundData {
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelCollection {
    pub rounds: Vec<RoundData>,
}

/// クレートに埋め込んであるデモ用レベルデータ。
const LEVEL_1_JSON: &str = include_str!("../../levels/word_collection_level1.json");

/// JSON 文字列をレベルデータとしてパースする。
pub fn parse_level(json: &str) -> Result<LevelCollection, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid level data format: {}", e))
}

/// 埋め込みのレベル1を読み込む。
pub fn load_embedded_level() -> Result<LevelCollection, String> {
    parse_level(LEVEL_1_JSON)
}

/// 例文 ID で重複を除いた (id, 文) の一覧を集める。
/// 空白だけの例文や id の無い文は出題に使わない。
fn unique_sentences(level: &LevelCollection) -> Vec<(u32, String)> {
    let mut seen = std::collections::HashSet::new();
    let mut sentences = Vec::new();

    for round in &level.rounds {
        for word in &round.words {
            let text = word.text_example.trim();
            if text.is_empty() {
                continue;
            }
            if seen.insert(word.id) {
                sentences.push((word.id, text.to_string()));
            }
        }
    }
    sentences
}

/// 1ゲームぶんの出題文を選ぶ: 重複除去 → シャッフル → 先頭 MAX_ROUNDS 文。
pub fn select_round_sentences(level: &LevelCollection) -> Result<Vec<String>, String> {
    let mut sentences = unique_sentences(level);
    if sentences.is_empty() {
        return Err("No sentences found in level data".to_string());
    }

    shuffle_cards(&mut sentences);
    sentences.truncate(MAX_ROUNDS);
    Ok(sentences.into_iter().map(|(_, text)| text).collect())
}

/// 文を単語に分割する。連続した空白は1つの区切り扱い。
pub fn get_sentence_words(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// その場シャッフル。カード列にも出題文リストにも使う。
pub fn shuffle_cards<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, word: &str, example: &str) -> WordEntry {
        WordEntry {
            id,
            word: word.to_string(),
            word_translate: None,
            text_example: example.to_string(),
            text_example_translate: None,
            audio_example: None,
        }
    }

    #[test]
    fn embedded_level_parses() {
        let level = load_embedded_level().expect("embedded level should parse");
        assert!(!level.rounds.is_empty());
        let sentences = select_round_sentences(&level).expect("sentences");
        assert!(!sentences.is_empty());
        assert!(sentences.len() <= MAX_ROUNDS);
    }

    #[test]
    fn unique_sentences_dedup_by_id() {
        let level = LevelCollection {
            rounds: vec![RoundData {
                words: vec![
                    entry(1, "cat", "The cat sat"),
                    entry(1, "sat", "The cat sat"),
                    entry(2, "dog", "  Dogs bark loudly  "),
                    entry(3, "empty", "   "),
                ],
            }],
        };

        let sentences = unique_sentences(&level);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], (1, "The cat sat".to_string()));
        // 前後の空白はトリムされる。
        assert_eq!(sentences[1], (2, "Dogs bark loudly".to_string()));
    }

    #[test]
    fn select_round_sentences_rejects_empty_level() {
        let level = LevelCollection { rounds: vec![] };
        assert!(select_round_sentences(&level).is_err());
    }

    #[test]
    fn sentence_words_split_on_whitespace() {
        assert_eq!(
            get_sentence_words("The  cat\tsat "),
            vec!["The", "cat", "sat"]
        );
        assert!(get_sentence_words("   ").is_empty());
    }

    #[test]
    fn shuffle_keeps_all_items() {
        let mut items: Vec<usize> = (0..20).collect();
        shuffle_cards(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
