// src/config/layout.rs
//! ゲーム画面のレイアウトと操作感に関する定数を定義するよ！
//! カードの余白、ドラッグ判定のしきい値など。

/// ゲームボードの行数。1ラウンドにつき1行使う。
pub const ROWS_COUNT: usize = 10;

/// 1ゲームで遊ぶ最大ラウンド数 (レベルデータから選ぶ文の数)。
pub const MAX_ROUNDS: usize = 10;

/// タッチ操作で「ドラッグ開始」とみなすまでの長押し時間 (ミリ秒)。
/// タップ (クリック選択) と区別するためのしきい値。チューニング値。
pub const LONG_PRESS_DURATION_MS: i32 = 300;

/// 長押し待ちの間に指がこれ以上 (px) 動いたら、ドラッグ意図なしとみなして
/// タイマーを破棄する。スクロール開始との誤判定を避けるためのあそび。
pub const TOUCH_SLOP_PX: f64 = 10.0;

/// 最後のカードの右端から何割の範囲を「末尾に追加」扱いにするか。
/// 細いカードの中心を正確に越えなくても末尾ドロップできるようにする。チューニング値。
pub const APPEND_ZONE_RATIO: f64 = 0.3;

/// DOM 変更後に行のカード幅を再計算するまでの遅延 (ミリ秒)。
/// 挿入直後はレイアウトが古いことがあるので、次のティックまで待つ。
pub const WIDTH_RECALC_DELAY_MS: i32 = 0;

/// カードの枠線の太さ (px)。幅計算で左右 2 本ぶん差し引く。
pub const CARD_BORDER_WIDTH: f64 = 2.0;

// --- カードの左右パディング (px) ---
// 文頭・文末のカードは外側が狭く、内側が広い。

pub const CARD_PADDING_NARROW: f64 = 12.0; // 文頭の左 / 文末の右
pub const CARD_PADDING_WIDE: f64 = 24.0;   // それ以外の側
pub const CARD_PADDING_DEFAULT: f64 = 20.0; // 位置クラスが無いカード用
