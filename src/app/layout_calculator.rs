// src/app/layout_calculator.rs
//! Calculates card widths from word-length ratios.
//! プールのカードは単語の長さ比で幅を決め、行のカードは行の実幅から
//! パディングと枠線を差し引いて配分し直す。
//!
//! 行の再計算は DOM 変更の直後ではなく次のティックに遅延させる。
//! 挿入直後の計測は古いレイアウトを読むことがあるため。遅延実行は
//! 冪等で、発火時に行が空になっていたら黙って何もしない。

use std::sync::{Arc, Mutex};

use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::app::container;
use crate::components::card::{self, ATTR_WIDTH_RATIO};
use crate::config::layout::{
    CARD_BORDER_WIDTH, CARD_PADDING_DEFAULT, CARD_PADDING_NARROW, CARD_PADDING_WIDE,
    WIDTH_RECALC_DELAY_MS,
};

pub const ATTR_SENTENCE_RATIOS: &str = "data-sentence-ratios";
pub const ATTR_TOTAL_PADDING: &str = "data-total-padding-borders";

/// 文中の位置からカードの左右パディングを引く。
pub fn get_card_padding_by_index(index: usize, total: usize) -> (f64, f64) {
    if index == 0 {
        (CARD_PADDING_NARROW, CARD_PADDING_WIDE)
    } else if index + 1 == total {
        (CARD_PADDING_WIDE, CARD_PADDING_NARROW)
    } else {
        (CARD_PADDING_WIDE, CARD_PADDING_WIDE)
    }
}

/// カード要素の位置クラスからパディングを引く。クラスが無ければ既定値。
pub fn get_card_padding(card_element: &Element) -> (f64, f64) {
    let classes = card_element.class_list();
    if classes.contains(card::CLASS_WORD_CARD_START) {
        (CARD_PADDING_NARROW, CARD_PADDING_WIDE)
    } else if classes.contains(card::CLASS_WORD_CARD_END) {
        (CARD_PADDING_WIDE, CARD_PADDING_NARROW)
    } else if classes.contains(card::CLASS_WORD_CARD_MIDDLE) {
        (CARD_PADDING_WIDE, CARD_PADDING_WIDE)
    } else {
        (CARD_PADDING_DEFAULT, CARD_PADDING_DEFAULT)
    }
}

/// 行幅に対するカード1枚の幅 (%) を計算する純粋関数。
/// コンテンツ幅は比率で配分し、パディングと枠線2本ぶんを上乗せする。
pub(crate) fn card_width_percentage(
    ratio: f64,
    total_ratio: f64,
    available_width: f64,
    padding: (f64, f64),
    row_width: f64,
) -> f64 {
    let content_width = (ratio / total_ratio) * available_width;
    let total_width = content_width + padding.0 + padding.1 + CARD_BORDER_WIDTH * 2.0;
    (total_width / row_width) * 100.0
}

/// プールのカードに単語の長さ比から幅を与える。
pub fn apply_source_card_width(
    card_element: &HtmlElement,
    word_len: usize,
    total_len: usize,
) -> Result<(), JsValue> {
    if total_len == 0 {
        return Ok(());
    }
    let ratio = word_len as f64 / total_len as f64;
    card_element
        .style()
        .set_property("--card-width", &format!("{}%", ratio * 100.0))?;
    card_element.set_attribute(ATTR_WIDTH_RATIO, &ratio.to_string())
}

/// 行に、その行が受け持つ文の幅計算用データを焼き込む。
/// ラウンド開始時に1回呼ぶ。
pub fn prepare_row_for_sentence(row: &HtmlElement, words: &[String]) -> Result<(), JsValue> {
    let total_len: usize = words.iter().map(|w| w.chars().count()).sum();
    if total_len == 0 {
        return Ok(());
    }

    let ratios: Vec<f64> = words
        .iter()
        .map(|w| w.chars().count() as f64 / total_len as f64)
        .collect();
    let ratios_json = serde_json::to_string(&ratios)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize ratios: {}", e)))?;

    let total_padding: f64 = (0..words.len())
        .map(|i| {
            let (left, right) = get_card_padding_by_index(i, words.len());
            left + right + CARD_BORDER_WIDTH * 2.0
        })
        .sum();

    row.set_attribute(ATTR_SENTENCE_RATIOS, &ratios_json)?;
    row.set_attribute(ATTR_TOTAL_PADDING, &total_padding.to_string())
}

/// 行のカード幅を現在のレイアウト実測から計算し直す。
/// 行が空・属性が無い・幅が取れない、のどれでも黙って no-op。
/// ラウンドが切り替わった後に遅延発火しても安全なように。
pub fn calculate_row_card_widths(row: &HtmlElement) -> Result<(), JsValue> {
    let row_cards = container::visible_children(row, None);
    if row_cards.is_empty() {
        return Ok(());
    }

    let (Some(ratios_attr), Some(padding_attr)) = (
        row.get_attribute(ATTR_SENTENCE_RATIOS),
        row.get_attribute(ATTR_TOTAL_PADDING),
    ) else {
        return Ok(());
    };

    let ratios: Vec<f64> = match serde_json::from_str(&ratios_attr) {
        Ok(r) => r,
        Err(e) => {
            warn!("Row has unparseable sentence ratios: {}", e);
            return Ok(());
        }
    };
    let total_ratio: f64 = ratios.iter().sum();
    let total_padding: f64 = padding_attr.parse().unwrap_or(0.0);
    if total_ratio <= 0.0 {
        return Ok(());
    }

    let mut row_width = row.get_bounding_client_rect().width();
    if row_width <= 0.0 {
        row_width = row.offset_width() as f64;
    }
    let available_width = row_width - total_padding;
    if available_width <= 0.0 {
        return Ok(());
    }

    for card_element in &row_cards {
        let ratio: f64 = card_element
            .get_attribute(ATTR_WIDTH_RATIO)
            .and_then(|a| a.parse().ok())
            .unwrap_or(0.0);
        if ratio <= 0.0 {
            continue;
        }
        let padding = get_card_padding(card_element);
        let percentage =
            card_width_percentage(ratio, total_ratio, available_width, padding, row_width);
        card_element
            .style()
            .set_property("--card-width", &format!("{}%", percentage))?;
    }
    Ok(())
}

/// 遅延再計算のタイマー。1行ぶんの予約を1つだけ持つ。
/// 発火済みクロージャは次の予約まで保持する (実行中の自分を drop しない)。
#[derive(Default)]
pub struct RecalcTimer {
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

pub type SharedRecalcTimer = Arc<Mutex<RecalcTimer>>;

pub fn new_shared_recalc_timer() -> SharedRecalcTimer {
    Arc::new(Mutex::new(RecalcTimer::default()))
}

/// 次のティックで行のカード幅を計算し直す。既存の予約は置き換える。
pub fn schedule_row_width_recalc(
    row: &HtmlElement,
    timer: &SharedRecalcTimer,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Failed to get window"))?;

    // 古い予約が残っていたら破棄。走るのは常に最新の1本だけ。
    {
        let mut guard = timer.lock().expect("Failed to lock recalc timer");
        if let Some(handle) = guard.handle.take() {
            window.clear_timeout_with_handle(handle);
        }
    }

    let row = row.clone();
    let timer_arc = Arc::clone(timer);
    let closure = Closure::wrap(Box::new(move || {
        timer_arc
            .lock()
            .expect("Failed to lock recalc timer")
            .handle = None;
        if let Err(e) = calculate_row_card_widths(&row) {
            warn!("Deferred width recalculation failed: {:?}", e);
        }
    }) as Box<dyn FnMut()>);

    let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        WIDTH_RECALC_DELAY_MS,
    )?;

    let mut guard = timer.lock().expect("Failed to lock recalc timer");
    guard.handle = Some(handle);
    guard.closure = Some(closure);
    Ok(())
}

// --- テスト ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_depends_on_sentence_position() {
        // 文頭: 外 (左) が狭い。
        assert_eq!(get_card_padding_by_index(0, 5), (12.0, 24.0));
        // 文中: 両側広い。
        assert_eq!(get_card_padding_by_index(2, 5), (24.0, 24.0));
        // 文末: 外 (右) が狭い。
        assert_eq!(get_card_padding_by_index(4, 5), (24.0, 12.0));
        // 1語だけなら文頭扱い。
        assert_eq!(get_card_padding_by_index(0, 1), (12.0, 24.0));
    }

    #[test]
    fn width_percentage_distributes_available_width() {
        // 行幅 400px、パディング控除後 300px を比率 0.5 で配る。
        // コンテンツ 150 + パディング 48 + 枠線 4 = 202 → 50.5%。
        let pct = card_width_percentage(0.5, 1.0, 300.0, (24.0, 24.0), 400.0);
        assert!((pct - 50.5).abs() < 1e-9);
    }

    #[test]
    fn width_percentage_normalizes_by_total_ratio() {
        // 比率の合計が 1 でなくても正しく配分される。
        let a = card_width_percentage(2.0, 4.0, 300.0, (24.0, 24.0), 400.0);
        let b = card_width_percentage(0.5, 1.0, 300.0, (24.0, 24.0), 400.0);
        assert!((a - b).abs() < 1e-9);
    }
}
