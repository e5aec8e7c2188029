// src/app/card_moves.rs
//! プール⇔行のカード移動 (ドメイン操作)。
//! DOM の子要素の並びとレジストリの `is_used` を、1回の操作の中で両方更新する。
//! ドラッグエンジン側はここを on_drop コールバック越しに呼ぶだけ。

use log::info;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::app::container;
use crate::components::card::CLASS_WORD_CARD_PLACED;
use crate::components::registry::CardRegistry;

/// カードを行に置く (プールから、または同じ行の中の並べ替え)。
/// `insert_index` は「ドラッグ中の要素を除いた」見えている子要素列での挿入位置。
pub fn move_card_to_row(
    registry: &mut CardRegistry,
    row: &HtmlElement,
    card_element: &HtmlElement,
    insert_index: usize,
) -> Result<(), JsValue> {
    // レジストリに居ないカードは黙って無視 (ラウンド切り替え直後の残骸など)。
    let Some(card) = registry.find_by_element(card_element) else {
        info!("Dropped element is not a registered card. Ignoring.");
        return Ok(());
    };
    let card_id = card.data.id.clone();

    let siblings = container::visible_children(row, Some(card_element));
    let before = siblings.get(insert_index).cloned();
    // insert_before は要素を元の親から自動で抜いてくれるので、移動はこれ1回。
    container::insert_at(row, card_element, before.as_deref())?;

    card_element.class_list().add_1(CLASS_WORD_CARD_PLACED)?;
    registry.mark_used(&card_id)?;
    registry.refresh_available_card_styles()?;
    info!("Card '{}' placed into row at index {}", card_id, insert_index);
    Ok(())
}

/// カードをプールに戻す。ポインタ位置は使わず、シャッフル順の自分の席に戻る。
pub fn return_card_to_pool(
    registry: &mut CardRegistry,
    pool: &HtmlElement,
    card_element: &HtmlElement,
) -> Result<(), JsValue> {
    let Some(card) = registry.find_by_element(card_element) else {
        info!("Returned element is not a registered card. Ignoring.");
        return Ok(());
    };
    let card_id = card.data.id.clone();
    let shuffled_index = card.data.shuffled_index;

    registry.mark_available(&card_id)?;

    // プールに既にいる (= available でプールの子の) カードのうち、
    // 自分よりシャッフル順が後の最初のカードの前に入る。いなければ末尾。
    let next_card = registry
        .available_in_shuffled_order()
        .into_iter()
        .find(|c| {
            c.data.shuffled_index > shuffled_index
                && c.element.parent_element().as_deref() == Some(&**pool)
        })
        .map(|c| c.element.clone());

    container::insert_at(pool, card_element, next_card.as_deref())?;

    card_element.class_list().remove_1(CLASS_WORD_CARD_PLACED)?;
    registry.refresh_available_card_styles()?;
    info!("Card '{}' returned to pool (shuffled slot {})", card_id, shuffled_index);
    Ok(())
}

// --- テスト ---
// DOM とレジストリの同期を確認する統合寄りのテスト。
#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::app::container::{CLASS_BOARD_ROW, CLASS_SOURCE_AREA};
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::Document;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().expect("window").document().expect("document")
    }

    fn make_container(class: &str) -> HtmlElement {
        let el: HtmlElement = document()
            .create_element("div")
            .expect("element")
            .dyn_into()
            .expect("html");
        el.set_class_name(class);
        document().body().expect("body").append_child(&el).expect("append");
        el
    }

    fn build_pool(registry: &CardRegistry, pool: &HtmlElement) {
        for card in registry.cards() {
            pool.append_child(&card.element).expect("append");
        }
    }

    fn texts(container: &HtmlElement) -> Vec<String> {
        container::visible_children(container, None)
            .iter()
            .map(|e| e.text_content().unwrap_or_default())
            .collect()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[wasm_bindgen_test]
    fn pool_to_empty_row_end_to_end() {
        let pool = make_container(CLASS_SOURCE_AREA);
        let row = make_container(CLASS_BOARD_ROW);
        let mut registry = CardRegistry::new();
        registry
            .rebuild(&document(), &words(&["The", "cat", "sat"]))
            .expect("rebuild");
        build_pool(&registry, &pool);

        let cat = registry.find_by_id("cat-1").expect("cat").element.clone();
        move_card_to_row(&mut registry, &row, &cat, 0).expect("move");

        // 行には cat だけ、プールには残り2枚。
        assert_eq!(texts(&row), vec!["cat"]);
        assert_eq!(texts(&pool).len(), 2);
        assert!(!texts(&pool).contains(&"cat".to_string()));
        // is_used が立っている。
        assert!(registry.find_by_id("cat-1").expect("cat").data.is_used);
        assert!(cat.class_list().contains(CLASS_WORD_CARD_PLACED));

        pool.remove();
        row.remove();
    }

    #[wasm_bindgen_test]
    fn return_to_pool_restores_shuffled_slot_and_flag() {
        let pool = make_container(CLASS_SOURCE_AREA);
        let row = make_container(CLASS_BOARD_ROW);
        let mut registry = CardRegistry::new();
        registry
            .rebuild(&document(), &words(&["a", "b", "c", "d"]))
            .expect("rebuild");
        build_pool(&registry, &pool);

        // シャッフル順で2番目のカードを行に出してから戻す。
        let second = registry.cards()[1].clone();
        move_card_to_row(&mut registry, &row, &second.element, 0).expect("move");
        assert_eq!(texts(&pool).len(), 3);

        return_card_to_pool(&mut registry, &pool, &second.element).expect("return");

        // 元のシャッフル順に戻っている。
        let expected: Vec<String> = registry
            .cards()
            .iter()
            .map(|c| c.data.word.clone())
            .collect();
        assert_eq!(texts(&pool), expected);
        assert!(!registry.find_by_id(&second.data.id).expect("card").data.is_used);
        assert!(!second.element.class_list().contains(CLASS_WORD_CARD_PLACED));
        assert!(texts(&row).is_empty());

        pool.remove();
        row.remove();
    }

    #[wasm_bindgen_test]
    fn unknown_element_is_silently_ignored() {
        let pool = make_container(CLASS_SOURCE_AREA);
        let row = make_container(CLASS_BOARD_ROW);
        let mut registry = CardRegistry::new();
        registry
            .rebuild(&document(), &words(&["x", "y"]))
            .expect("rebuild");
        build_pool(&registry, &pool);

        let stray: HtmlElement = document()
            .create_element("div")
            .expect("el")
            .dyn_into()
            .expect("html");

        // 登録されていない要素は no-op。DOM もフラグも変わらない。
        move_card_to_row(&mut registry, &row, &stray, 0).expect("no-op");
        assert!(texts(&row).is_empty());
        assert_eq!(texts(&pool).len(), 2);
        assert!(registry.cards().iter().all(|c| !c.data.is_used));

        pool.remove();
        row.remove();
    }
}
