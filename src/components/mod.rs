// src/components/mod.rs

// この components モジュールに属するサブモジュールを宣言するよ！
pub mod card;       // 単語カードそのもの
pub mod drag_state; // ドラッグ中だけ生きる一時状態
pub mod game_state; // ラウンド進行の管理
pub mod registry;   // カードの論理モデル (ID で引く台帳)

pub use card::{Card, CardData};
pub use drag_state::DragState;
pub use game_state::GameState;
pub use registry::CardRegistry;
