// src/app/drag_event_handler.rs
//! Attaches the native HTML5 drag listeners (dragstart / dragover / dragleave /
//! drop / dragend) and translates them into session events.
//! マウス入力はブラウザがドラッグ判定までやってくれるので、
//! dragstart の瞬間に arm → promote を一気に通す。

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Element, Event, HtmlElement, Node};

use crate::app::{container, session, visual_feedback, SharedEventClosures};
use crate::app::session::{SharedCallbacks, SharedSession};
use crate::components::card::{ATTR_CARD_DATA, CLASS_WORD_CARD, CLASS_WORD_CARD_PLACED};
use crate::components::card::CardData;
use crate::log;

/// イベントターゲットから Element を取り出す。取れなければ None。
fn event_target_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// ターゲットの祖先からカード要素を探す。
fn closest_card(target: &Element) -> Option<HtmlElement> {
    let selector = format!(".{}, .{}", CLASS_WORD_CARD, CLASS_WORD_CARD_PLACED);
    target
        .closest(&selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// クロージャを作って両方のコンテナに登録し、置き場に保存する。
fn attach_to_both(
    source_area: &HtmlElement,
    game_board: &HtmlElement,
    event_name: &str,
    closures: &SharedEventClosures,
    handler: Box<dyn FnMut(Event)>,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(handler);
    source_area
        .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
    game_board
        .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
    closures
        .lock()
        .expect("Failed to lock event closures")
        .push(closure);
    Ok(())
}

/// プールとボードにドラッグ&ドロップのリスナー一式を付ける。
/// セッションとコールバックはクロージャに閉じ込めて共有する。
/// モジュールレベルの可変状態は持たない。
pub fn setup_drag_listeners(
    source_area: &HtmlElement,
    game_board: &HtmlElement,
    session: SharedSession,
    callbacks: SharedCallbacks,
    closures: &SharedEventClosures,
) -> Result<(), JsValue> {
    // --- dragstart ---
    {
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_to_both(
            source_area,
            game_board,
            "dragstart",
            closures,
            Box::new(move |event: Event| {
                let Some(drag_event) = event.dyn_ref::<DragEvent>().cloned() else {
                    return;
                };
                let Some(target) = event_target_element(&event) else {
                    return;
                };
                let Some(card_element) = closest_card(&target) else {
                    return;
                };

                // data-card-data が無い・壊れている → このドラッグは黙って中止。
                // 見た目にも論理状態にも触らない。
                let Some(attr) = card_element.get_attribute(ATTR_CARD_DATA) else {
                    event.prevent_default();
                    return;
                };
                let snapshot: CardData = match serde_json::from_str(&attr) {
                    Ok(data) => data,
                    Err(e) => {
                        log(&format!("Malformed card payload, aborting drag: {}", e));
                        event.prevent_default();
                        return;
                    }
                };

                // ネイティブドラッグは arm → promote を連続で通す。
                // 既に別セッションが走っていたらどちらかが false を返す。
                if !session::arm(&session) {
                    event.prevent_default();
                    return;
                }
                if !session::promote(&session, &card_element, snapshot, &callbacks) {
                    session::disarm(&session);
                    event.prevent_default();
                    return;
                }

                if let Some(data_transfer) = drag_event.data_transfer() {
                    data_transfer.set_effect_allowed("move");
                    let _ = data_transfer.set_data("text/plain", "");
                }
            }),
        )?;
    }

    // --- dragover ---
    {
        let session = Arc::clone(&session);
        attach_to_both(
            source_area,
            game_board,
            "dragover",
            closures,
            Box::new(move |event: Event| {
                // preventDefault しないとブラウザがドロップを許可しない。
                event.prevent_default();
                let Some(drag_event) = event.dyn_ref::<DragEvent>().cloned() else {
                    return;
                };
                if let Some(data_transfer) = drag_event.data_transfer() {
                    data_transfer.set_drop_effect("move");
                }
                if let Some(target) = event_target_element(&event) {
                    session::update_move(&session, drag_event.client_x() as f64, &target);
                }
            }),
        )?;
    }

    // --- dragleave ---
    {
        attach_to_both(
            source_area,
            game_board,
            "dragleave",
            closures,
            Box::new(move |event: Event| {
                let Some(drag_event) = event.dyn_ref::<DragEvent>().cloned() else {
                    return;
                };
                let Some(target) = event_target_element(&event) else {
                    return;
                };
                let Some(drop_target) = container::find_drop_target(&target) else {
                    return;
                };

                // コンテナ内の子から子への移動では leave 扱いにしない。
                if let Some(related) = drag_event
                    .related_target()
                    .and_then(|t| t.dyn_into::<Node>().ok())
                {
                    if drop_target.contains(Some(&related)) {
                        return;
                    }
                }

                let _ = visual_feedback::remove_drag_over_class(&drop_target);
                let _ = visual_feedback::remove_drop_indicator(&drop_target);
            }),
        )?;
    }

    // --- drop ---
    {
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_to_both(
            source_area,
            game_board,
            "drop",
            closures,
            Box::new(move |event: Event| {
                event.prevent_default();
                let Some(drag_event) = event.dyn_ref::<DragEvent>().cloned() else {
                    return;
                };
                let point_target = event_target_element(&event);
                session::complete_drop(
                    &session,
                    drag_event.client_x() as f64,
                    point_target.as_ref(),
                    &callbacks,
                );
            }),
        )?;
    }

    // --- dragend ---
    // ドロップ成立後にも、不成立 (キャンセル) でも必ず来る。
    // end_session は冪等なので二重掃除になっても問題ない。
    {
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_to_both(
            source_area,
            game_board,
            "dragend",
            closures,
            Box::new(move |_event: Event| {
                session::end_session(&session);
                (callbacks.on_drag_end)();
            }),
        )?;
    }

    Ok(())
}
