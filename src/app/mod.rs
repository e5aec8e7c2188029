// src/app/mod.rs
//! GameApp の内部ロジックを役割ごとに分割して置くモジュールだよ！

pub mod card_moves;         // プール⇔行のカード移動 (ドメイン操作)
pub mod container;          // ドロップ先コンテナの列挙・挿入
pub mod drag_event_handler; // ネイティブ drag イベントのアダプタ
pub mod drop_apply_handler; // ドロップ確定処理 (インデックス補正 + コールバック)
pub mod game_app;           // wasm に公開するファサード
pub mod geometry;           // 挿入位置の計算
pub mod layout_calculator;  // カード幅の計算と遅延再計算
pub mod row_click_handler;  // アクティブ行のクリック処理
pub mod session;            // ドラッグセッションの状態機械
pub mod touch_handler;      // タッチ入力 (長押し) のアダプタ
pub mod visual_feedback;    // ドラッグ中の見た目 (クラス・インジケータ)

use std::sync::{Arc, Mutex};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::{Document, Event};

/// イベントリスナーのクロージャ置き場。GameApp が生きている間は解放しない。
/// (`Closure::forget` でリークさせないための置き場。)
pub type SharedEventClosures = Arc<Mutex<Vec<Closure<dyn FnMut(Event)>>>>;

/// window.document を取るヘルパー。ブラウザ外では当然失敗する。
pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("Failed to get window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("Failed to get document"))
}
