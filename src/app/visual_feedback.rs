// src/app/visual_feedback.rs
//! Applies and clears the transient CSS affordances that accompany a drag:
//! drag-over highlight, dragging opacity, and the single drop indicator.
//! どの関数も冪等で、2回呼んでも1回と同じ結果になる。

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

pub const CLASS_DRAG_OVER: &str = "drag-over";
pub const CLASS_DRAGGING: &str = "dragging";
pub const CLASS_DROP_INDICATOR: &str = "drop-indicator";
pub const ATTR_DROP_INDICATOR: &str = "data-drop-indicator";

pub const CLASS_CARD_CORRECT: &str = "word-card-correct";
pub const CLASS_CARD_INCORRECT: &str = "word-card-incorrect";

pub fn add_drag_over_class(element: &Element) -> Result<(), JsValue> {
    element.class_list().add_1(CLASS_DRAG_OVER)
}

pub fn remove_drag_over_class(element: &Element) -> Result<(), JsValue> {
    element.class_list().remove_1(CLASS_DRAG_OVER)
}

pub fn add_dragging_class(element: &Element) -> Result<(), JsValue> {
    element.class_list().add_1(CLASS_DRAGGING)
}

pub fn remove_dragging_class(element: &Element) -> Result<(), JsValue> {
    element.class_list().remove_1(CLASS_DRAGGING)
}

/// ドラッグ中に付いたインライン style (opacity / transform) を取り除く。
/// キャンセル経路でカードが半透明のまま残らないように。
pub fn clear_drag_inline_styles(element: &HtmlElement) {
    let style = element.style();
    let _ = style.remove_property("opacity");
    let _ = style.remove_property("transform");
}

/// コンテナに挿入インジケータを置く。`before` の直前、None なら末尾。
/// 同じコンテナの古いインジケータは必ず先に消すので、1コンテナにつき常に最大1個！
pub fn add_drop_indicator(
    document: &Document,
    drop_target: &Element,
    before: Option<&Element>,
) -> Result<(), JsValue> {
    remove_drop_indicator(drop_target)?;

    let indicator = document.create_element("div")?;
    indicator.set_class_name(CLASS_DROP_INDICATOR);
    indicator.set_attribute(ATTR_DROP_INDICATOR, "true")?;

    match before {
        Some(reference) if reference.parent_element().as_ref() == Some(drop_target) => {
            drop_target.insert_before(&indicator, Some(reference))?;
        }
        _ => {
            drop_target.append_child(&indicator)?;
        }
    }
    Ok(())
}

/// コンテナ内のインジケータを消す。無ければ何もしない。
pub fn remove_drop_indicator(drop_target: &Element) -> Result<(), JsValue> {
    if let Some(indicator) = drop_target.query_selector(&format!(".{}", CLASS_DROP_INDICATOR))? {
        indicator.remove();
    }
    Ok(())
}

/// ページ上の全インジケータを掃除する。セッションの終わり (コミットでも
/// キャンセルでも) に必ず通る経路。
pub fn remove_all_drop_indicators(document: &Document) -> Result<(), JsValue> {
    let indicators = document.query_selector_all(&format!(".{}", CLASS_DROP_INDICATOR))?;
    for i in 0..indicators.length() {
        if let Some(node) = indicators.item(i) {
            if let Some(element) = node.dyn_ref::<Element>() {
                element.remove();
            }
        }
    }
    Ok(())
}

/// 全ドロップ先から drag-over ハイライトを外す。
/// `except` を渡すと、いまホバー中のコンテナだけ残せる。
pub fn clear_drag_over_highlights(document: &Document, except: Option<&Element>) -> Result<(), JsValue> {
    let targets = document.query_selector_all(&format!(".{}", CLASS_DRAG_OVER))?;
    for i in 0..targets.length() {
        if let Some(node) = targets.item(i) {
            if let Some(element) = node.dyn_ref::<Element>() {
                if except.map_or(false, |keep| element == keep) {
                    continue;
                }
                remove_drag_over_class(element)?;
            }
        }
    }
    Ok(())
}

/// dragging クラスが残っているカードを全て掃除する。
/// dragend がドロップより後に来るブラウザ差への保険として、終了経路で呼ぶ。
pub fn clear_all_dragging(document: &Document) -> Result<(), JsValue> {
    let dragging = document.query_selector_all(&format!(".{}", CLASS_DRAGGING))?;
    for i in 0..dragging.length() {
        if let Some(node) = dragging.item(i) {
            if let Some(element) = node.dyn_ref::<HtmlElement>() {
                remove_dragging_class(element)?;
                clear_drag_inline_styles(element);
            }
        }
    }
    Ok(())
}

/// チェック結果のハイライト。正解・不正解クラスを付け直す。
pub fn highlight_card(card: &Element, is_correct: bool) -> Result<(), JsValue> {
    card.class_list().remove_2(CLASS_CARD_CORRECT, CLASS_CARD_INCORRECT)?;
    if is_correct {
        card.class_list().add_1(CLASS_CARD_CORRECT)
    } else {
        card.class_list().add_1(CLASS_CARD_INCORRECT)
    }
}

/// 行のカードからチェック結果のハイライトを全部外す。
pub fn clear_check_highlights(row: &Element) -> Result<(), JsValue> {
    let highlighted = row.query_selector_all(&format!(
        ".{}, .{}",
        CLASS_CARD_CORRECT, CLASS_CARD_INCORRECT
    ))?;
    for i in 0..highlighted.length() {
        if let Some(node) = highlighted.item(i) {
            if let Some(element) = node.dyn_ref::<Element>() {
                element
                    .class_list()
                    .remove_2(CLASS_CARD_CORRECT, CLASS_CARD_INCORRECT)?;
            }
        }
    }
    Ok(())
}

// --- テスト ---
#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().expect("window").document().expect("document")
    }

    fn make_container() -> Element {
        let el = document().create_element("div").expect("element");
        el.set_class_name("source-cards-area");
        document().body().expect("body").append_child(&el).expect("append");
        el
    }

    fn indicator_count(container: &Element) -> u32 {
        container
            .query_selector_all(&format!(".{}", CLASS_DROP_INDICATOR))
            .expect("query")
            .length()
    }

    #[wasm_bindgen_test]
    fn at_most_one_indicator_per_container() {
        let container = make_container();
        let card = document().create_element("div").expect("el");
        container.append_child(&card).expect("append");

        // 同じコンテナに何度置いても1個のまま。
        add_drop_indicator(&document(), &container, Some(&card)).expect("add");
        add_drop_indicator(&document(), &container, None).expect("add");
        add_drop_indicator(&document(), &container, Some(&card)).expect("add");
        assert_eq!(indicator_count(&container), 1);

        // 別のコンテナに移したら、移した先で1個・元のコンテナに作らない。
        let other = make_container();
        add_drop_indicator(&document(), &other, None).expect("add");
        assert_eq!(indicator_count(&other), 1);
        assert_eq!(indicator_count(&container), 1);

        remove_all_drop_indicators(&document()).expect("sweep");
        assert_eq!(indicator_count(&container), 0);
        assert_eq!(indicator_count(&other), 0);

        container.remove();
        other.remove();
    }

    #[wasm_bindgen_test]
    fn cleanup_is_idempotent() {
        let container = make_container();
        add_drop_indicator(&document(), &container, None).expect("add");
        add_drag_over_class(&container).expect("class");

        // 2回連続で呼んでも結果は1回と同じで、エラーにもならない。
        remove_all_drop_indicators(&document()).expect("first sweep");
        remove_all_drop_indicators(&document()).expect("second sweep");
        assert_eq!(indicator_count(&container), 0);

        clear_drag_over_highlights(&document(), None).expect("first clear");
        clear_drag_over_highlights(&document(), None).expect("second clear");
        assert!(!container.class_list().contains(CLASS_DRAG_OVER));

        container.remove();
    }

    #[wasm_bindgen_test]
    fn dragging_class_and_inline_styles_are_stripped() {
        let container = make_container();
        let card: HtmlElement = document()
            .create_element("div")
            .expect("el")
            .dyn_into()
            .expect("html");
        container.append_child(&card).expect("append");

        add_dragging_class(&card).expect("class");
        card.style().set_property("opacity", "0.5").expect("style");
        card.style().set_property("transform", "scale(1.1)").expect("style");

        clear_all_dragging(&document()).expect("clear");
        assert!(!card.class_list().contains(CLASS_DRAGGING));
        assert_eq!(card.style().get_property_value("opacity").expect("get"), "");
        assert_eq!(card.style().get_property_value("transform").expect("get"), "");

        container.remove();
    }

    #[wasm_bindgen_test]
    fn check_highlights_toggle() {
        let container = make_container();
        let card = document().create_element("div").expect("el");
        container.append_child(&card).expect("append");

        highlight_card(&card, false).expect("highlight");
        assert!(card.class_list().contains(CLASS_CARD_INCORRECT));
        highlight_card(&card, true).expect("highlight");
        assert!(card.class_list().contains(CLASS_CARD_CORRECT));
        assert!(!card.class_list().contains(CLASS_CARD_INCORRECT));

        clear_check_highlights(&container).expect("clear");
        assert!(!card.class_list().contains(CLASS_CARD_CORRECT));

        container.remove();
    }
}
