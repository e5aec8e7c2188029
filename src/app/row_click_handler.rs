// src/app/row_click_handler.rs
//! アクティブ行の管理と、行に置いたカードのクリック処理。
//! クリックしたカードをプールに返す、ドラッグとは別の簡単な操作経路だよ。
//!
//! リスナーの登録は冪等: 登録し直す前に必ず全行から外す。
//! 「最後に setup した行のハンドラしか生き残らない」事故を構造的に防ぐ。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement};

use crate::app::container::CLASS_ACTIVE_ROW;
use crate::components::card::CLASS_WORD_CARD_PLACED;

/// 行ごとのクリッククロージャ置き場。デタッチにも同じインスタンスが要るので
/// ここで持ち続ける。
pub type SharedRowClosures = Arc<Mutex<HashMap<usize, Closure<dyn FnMut(Event)>>>>;

pub fn new_shared_row_closures() -> SharedRowClosures {
    Arc::new(Mutex::new(HashMap::new()))
}

/// `index` の行だけに active-row クラスを付ける。範囲外なら何もしない。
pub fn set_active_row(rows: &[HtmlElement], index: usize) -> Result<(), JsValue> {
    if index >= rows.len() {
        return Ok(());
    }
    for (i, row) in rows.iter().enumerate() {
        if i == index {
            row.class_list().add_1(CLASS_ACTIVE_ROW)?;
        } else {
            row.class_list().remove_1(CLASS_ACTIVE_ROW)?;
        }
    }
    Ok(())
}

/// 全行からクリックリスナーを外す。
fn detach_all(rows: &[HtmlElement], closures: &SharedRowClosures) -> Result<(), JsValue> {
    let mut map = closures.lock().expect("Failed to lock row click closures");
    for (index, closure) in map.drain() {
        if let Some(row) = rows.get(index) {
            row.remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        }
        // closure はここで drop される。リスナーはもう外れているので安全。
    }
    Ok(())
}

/// `row_index` の行にクリックハンドラを付ける。
/// ハンドラには「クリックされた、行直下の placed カード」だけが渡る。
pub fn setup_row_click_handler(
    rows: &[HtmlElement],
    row_index: usize,
    closures: &SharedRowClosures,
    handler: Box<dyn Fn(HtmlElement)>,
) -> Result<(), JsValue> {
    // まず全部外す。二重登録はここで起こらなくなる。
    detach_all(rows, closures)?;

    let Some(row) = rows.get(row_index) else {
        return Ok(());
    };

    let row_for_closure = row.clone();
    let closure = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };

        // ターゲットから上へ、placed カードを探して登る。
        let mut current: Option<Element> = Some(target);
        let mut card_element: Option<Element> = None;
        while let Some(el) = current {
            if el.class_list().contains(CLASS_WORD_CARD_PLACED) {
                card_element = Some(el);
                break;
            }
            current = el.parent_element();
        }

        // この行の直接の子であるカードだけ処理する。
        if let Some(card) = card_element {
            if card.parent_element().as_deref() == Some(&*row_for_closure) {
                if let Ok(card) = card.dyn_into::<HtmlElement>() {
                    handler(card);
                }
            }
        }
    }) as Box<dyn FnMut(Event)>);

    row.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closures
        .lock()
        .expect("Failed to lock row click closures")
        .insert(row_index, closure);
    Ok(())
}
