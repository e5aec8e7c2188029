// src/components/game_state.rs

/// ラウンド進行を管理する状態だよ！
/// ラウンド N はゲームボードの行 N を使う。だから行数 = 最大ラウンド数。
///
/// - `sentences`: このゲームで出題する文 (ラウンド順)。
/// - `current_round`: いま遊んでいるラウンド (0 始まり)。
/// - `results`: ラウンドごとのチェック結果。未チェックは None。
#[derive(Debug, Clone)]
pub struct GameState {
    sentences: Vec<String>,
    current_round: usize,
    results: Vec<Option<bool>>,
}

impl GameState {
    pub fn new(sentences: Vec<String>) -> Self {
        let count = sentences.len();
        Self {
            sentences,
            current_round: 0,
            results: vec![None; count],
        }
    }

    pub fn round_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// いまのラウンドの正解文。全ラウンド終了後は None。
    pub fn current_sentence(&self) -> Option<&str> {
        self.sentences.get(self.current_round).map(|s| s.as_str())
    }

    pub fn record_result(&mut self, is_correct: bool) {
        if let Some(slot) = self.results.get_mut(self.current_round) {
            *slot = Some(is_correct);
        }
    }

    pub fn result_for(&self, round: usize) -> Option<bool> {
        self.results.get(round).copied().flatten()
    }

    /// 次のラウンドへ。進めたら true、もう最後なら false。
    pub fn advance(&mut self) -> bool {
        if self.current_round + 1 < self.sentences.len() {
            self.current_round += 1;
            true
        } else {
            false
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_round + 1 >= self.sentences.len()
            && self.result_for(self.current_round).is_some()
    }
}
