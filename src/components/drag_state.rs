// src/components/drag_state.rs

use web_sys::HtmlElement;

use crate::components::card::CardData;

/// ドラッグ中のカードに関する一時状態だよ！🖱️➡️🃏
/// プロセス全体でアクティブなインスタンスは常に最大1つ。
/// `dragged_element` が Some ならセッションが生きている、という約束。
///
/// 要素の所有権はあくまで今ホストしているコンテナ側にあって、
/// ここは参照を持っているだけ。ドロップかキャンセルで必ず `reset` する。
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// ドラッグ中のカード要素。None なら何もドラッグしていない。
    pub dragged_element: Option<HtmlElement>,
    /// ドラッグ開始時に撮ったカードデータのスナップショット。
    pub card_snapshot: Option<CardData>,
    /// ドラッグ元のコンテナ (カードの親要素)。
    pub source_container: Option<HtmlElement>,
    /// いまポインタが乗っているドロップ先コンテナ (無ければ None)。
    pub hovered_container: Option<HtmlElement>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// セッションが生きているか。
    pub fn is_active(&self) -> bool {
        self.dragged_element.is_some()
    }

    /// 全フィールドを空に戻す。何度呼んでも安全。
    pub fn reset(&mut self) {
        self.dragged_element = None;
        self.card_snapshot = None;
        self.source_container = None;
        self.hovered_container = None;
    }
}
