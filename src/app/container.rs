// src/app/container.rs
//! Enumerates and mutates the two droppable surfaces (source pool, board rows).
//! ここでは DOM の子要素の並びだけを扱う。レジストリには一切触らない！

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlElement};

use crate::app::visual_feedback::CLASS_DROP_INDICATOR;

pub const CLASS_SOURCE_AREA: &str = "source-cards-area";
pub const CLASS_BOARD: &str = "game-board";
pub const CLASS_BOARD_ROW: &str = "game-board-row";
pub const CLASS_ACTIVE_ROW: &str = "active-row";
pub const ATTR_ROW_INDEX: &str = "data-row-index";

/// 要素自身または祖先からドロップ先コンテナを探す。
/// プールが先、行が後。どちらでもなければ None。
pub fn find_drop_target(element: &Element) -> Option<HtmlElement> {
    if let Ok(Some(area)) = element.closest(&format!(".{}", CLASS_SOURCE_AREA)) {
        return area.dyn_into::<HtmlElement>().ok();
    }
    if let Ok(Some(row)) = element.closest(&format!(".{}", CLASS_BOARD_ROW)) {
        return row.dyn_into::<HtmlElement>().ok();
    }
    None
}

pub fn is_drop_target(element: &Element) -> bool {
    find_drop_target(element).is_some()
}

pub fn is_source_area(element: &Element) -> bool {
    element.class_list().contains(CLASS_SOURCE_AREA)
}

pub fn is_board_row(element: &Element) -> bool {
    element.class_list().contains(CLASS_BOARD_ROW)
}

/// コンテナの「見えている」子要素を並び順で返す。
/// インジケータ (transient marker) は常に除外。`ignore` にはドラッグ中の
/// 要素を渡す。元のコンテナにまだ物理的に残っていても位置計算から外すため。
pub fn visible_children(container: &Element, ignore: Option<&Element>) -> Vec<HtmlElement> {
    let children = container.children();
    let mut result = Vec::with_capacity(children.length() as usize);

    for i in 0..children.length() {
        let Some(child) = children.item(i) else { continue };
        if child.class_list().contains(CLASS_DROP_INDICATOR) {
            continue;
        }
        if ignore.map_or(false, |ig| &child == ig) {
            continue;
        }
        if let Ok(html) = child.dyn_into::<HtmlElement>() {
            result.push(html);
        }
    }
    result
}

/// 見えている子要素の中での位置を返す。見つからなければ None。
pub fn element_index(container: &Element, element: &Element, ignore: Option<&Element>) -> Option<usize> {
    visible_children(container, ignore)
        .iter()
        .position(|c| &**c == element)
}

/// `before` の直前に挿入する。None なら末尾に追加。
/// `before` がもうコンテナの子でなくなっていた場合も末尾に落とす。
/// 他の子要素の相対順序はそのまま。
pub fn insert_at(
    container: &Element,
    element: &Element,
    before: Option<&Element>,
) -> Result<(), JsValue> {
    match before {
        Some(reference) if reference.parent_element().as_ref() == Some(container) => {
            container.insert_before(element, Some(reference))?;
        }
        _ => {
            container.append_child(element)?;
        }
    }
    Ok(())
}

/// コンテナから要素を取り外す。既に外れていたら何もしない。
pub fn remove_from(container: &Element, element: &Element) -> Result<(), JsValue> {
    if element.parent_element().as_ref() == Some(container) {
        container.remove_child(element)?;
    }
    Ok(())
}

// --- テスト ---
#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> web_sys::Document {
        web_sys::window().expect("window").document().expect("document")
    }

    fn make_container(class: &str) -> HtmlElement {
        let el: HtmlElement = document()
            .create_element("div")
            .expect("element")
            .dyn_into()
            .expect("html element");
        el.set_class_name(class);
        el
    }

    fn make_child(label: &str) -> HtmlElement {
        let el: HtmlElement = document()
            .create_element("div")
            .expect("element")
            .dyn_into()
            .expect("html element");
        el.set_text_content(Some(label));
        el
    }

    #[wasm_bindgen_test]
    fn visible_children_skip_indicator_and_ignored() {
        let container = make_container(CLASS_SOURCE_AREA);
        let a = make_child("a");
        let b = make_child("b");
        let indicator = make_child("");
        indicator.set_class_name(CLASS_DROP_INDICATOR);

        container.append_child(&a).unwrap();
        container.append_child(&indicator).unwrap();
        container.append_child(&b).unwrap();

        let all = visible_children(&container, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text_content().unwrap(), "a");
        assert_eq!(all[1].text_content().unwrap(), "b");

        let without_a = visible_children(&container, Some(&*a));
        assert_eq!(without_a.len(), 1);
        assert_eq!(without_a[0].text_content().unwrap(), "b");
    }

    #[wasm_bindgen_test]
    fn insert_at_preserves_sibling_order() {
        let container = make_container(CLASS_BOARD_ROW);
        let a = make_child("a");
        let b = make_child("b");
        let c = make_child("c");
        container.append_child(&a).unwrap();
        container.append_child(&b).unwrap();

        // b の前に挿入。
        insert_at(&container, &c, Some(&*b)).unwrap();
        let order: Vec<String> = visible_children(&container, None)
            .iter()
            .map(|e| e.text_content().unwrap())
            .collect();
        assert_eq!(order, vec!["a", "c", "b"]);

        // None は末尾。
        let d = make_child("d");
        insert_at(&container, &d, None).unwrap();
        assert_eq!(element_index(&container, &d, None), Some(3));
    }

    #[wasm_bindgen_test]
    fn drop_target_resolution_walks_ancestors() {
        let area = make_container(CLASS_SOURCE_AREA);
        let card = make_child("word");
        area.append_child(&card).unwrap();
        document().body().unwrap().append_child(&area).unwrap();

        let target = find_drop_target(&card).expect("should find the pool");
        assert!(is_source_area(&target));
        assert!(is_drop_target(&card));

        let stray = make_child("x");
        assert!(find_drop_target(&stray).is_none());

        area.remove();
    }
}
