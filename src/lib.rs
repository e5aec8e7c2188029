// src/lib.rs

// WASM と JavaScript を繋ぐための基本！
use wasm_bindgen::prelude::*;

// 自分で作ったモジュールたち！ これでコードを整理してるんだ。
pub mod app;        // GameApp 本体とドラッグ&ドロップ関連のハンドラ
pub mod components; // カードやドラッグ状態などのデータ型
pub mod config;     // レイアウトやタイミングの定数
pub mod logic;      // レベルデータと文章チェックの純粋ロジック
pub mod storage;    // localStorage へのプレイヤー情報の保存

// ページ側 (JS) からは GameApp だけ見えれば十分！
pub use crate::app::game_app::GameApp;

// JavaScript の console.log を Rust から呼び出すための準備 (extern ブロック)。
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn error(s: &str);
}

// main 関数の代わりに、Wasm がロードされた時に最初に実行される関数だよ。
#[wasm_bindgen(start)]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
    log("Panic hook set!");
}
