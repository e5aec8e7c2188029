// src/logic/sentence.rs
//! 行に並んだ単語列と正解文の照合。ドラッグエンジン自体は正誤を知らないので、
//! ここが唯一の「正解を知っている」場所だよ。

use itertools::Itertools;

use crate::logic::level::get_sentence_words;

/// 1単語ぶんのチェック結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCheck {
    pub index: usize,
    pub word: String,
    pub is_correct: bool,
}

/// 行のカードの単語列を正解文と位置ごとに比較する。
/// 行のほうが長い場合、はみ出した単語は不正解扱い。
pub fn validate_row_words(sentence: &str, row_words: &[String]) -> Vec<WordCheck> {
    let correct_words = get_sentence_words(sentence);

    row_words
        .iter()
        .enumerate()
        .map(|(index, word)| WordCheck {
            index,
            word: word.clone(),
            is_correct: correct_words.get(index).map_or(false, |c| c == word),
        })
        .collect()
}

/// 行のカード数が正解文の単語数と一致しているか (= 文が完成しているか)。
pub fn is_sentence_complete(sentence: &str, row_word_count: usize) -> bool {
    get_sentence_words(sentence).len() == row_word_count
}

/// 行の単語列を1本の文字列に組み立てる。ログや結果表示用。
pub fn assemble_sentence(row_words: &[String]) -> String {
    row_words.iter().join(" ")
}
