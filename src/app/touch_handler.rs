// src/app/touch_handler.rs
//! タッチ入力をドラッグセッションに変換するアダプタだよ！📱
//! タップとドラッグを区別するため、touch-start 後 300ms の長押しで初めて
//! Dragging に昇格する。タイマーは早期の touch-end / touch-cancel /
//! しきい値超えの touch-move で必ず破棄する。指を離した後に遅れて
//! 昇格が発火する事故を防ぐため。

use std::sync::{Arc, Mutex};

use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, Event, HtmlElement, TouchEvent};

use crate::app::{document, session, SharedEventClosures};
use crate::app::session::{SessionPhase, SharedCallbacks, SharedSession};
use crate::components::card::{ATTR_CARD_DATA, CLASS_WORD_CARD, CLASS_WORD_CARD_PLACED};
use crate::components::card::CardData;
use crate::config::layout::{LONG_PRESS_DURATION_MS, TOUCH_SLOP_PX};
use crate::log;

/// 長押しタイマーの置き場。
/// クロージャは発火後も次のスケジュールまで保持する (実行中の自分自身を
/// drop しないため)。
#[derive(Default)]
struct LongPressTimer {
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

/// タッチアダプタがリスナー間で共有する状態。
#[derive(Clone)]
pub struct TouchContext {
    timer: Arc<Mutex<LongPressTimer>>,
    /// touch-start の座標。スロップ判定に使う。
    start_point: Arc<Mutex<Option<(f64, f64)>>>,
    /// touch-start の時刻 (ms)。ジェスチャの長さのログ用。
    started_at: Arc<Mutex<f64>>,
}

impl TouchContext {
    pub fn new() -> Self {
        Self {
            timer: Arc::new(Mutex::new(LongPressTimer::default())),
            start_point: Arc::new(Mutex::new(None)),
            started_at: Arc::new(Mutex::new(0.0)),
        }
    }
}

impl Default for TouchContext {
    fn default() -> Self {
        Self::new()
    }
}

fn event_target_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn closest_card(target: &Element) -> Option<HtmlElement> {
    let selector = format!(".{}, .{}", CLASS_WORD_CARD, CLASS_WORD_CARD_PLACED);
    target
        .closest(&selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// 保留中の長押しタイマーを破棄する。保留が無ければ何もしない。
fn clear_long_press(context: &TouchContext) {
    let mut timer = context.timer.lock().expect("Failed to lock long-press timer");
    if let Some(handle) = timer.handle.take() {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle);
        }
    }
}

/// 300ms 後にセッションを Dragging へ昇格させるタイマーを仕掛ける。
fn schedule_long_press(
    context: &TouchContext,
    session: &SharedSession,
    callbacks: &SharedCallbacks,
    card_element: HtmlElement,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Failed to get window"))?;

    let timer_arc = Arc::clone(&context.timer);
    let session = Arc::clone(session);
    let callbacks = Arc::clone(callbacks);

    let closure = Closure::wrap(Box::new(move || {
        // 自分が発火したのでハンドルは用済み。クロージャ自体はまだ触らない。
        timer_arc
            .lock()
            .expect("Failed to lock long-press timer")
            .handle = None;

        // スナップショットは発火時点の属性から取る。
        // 無い・壊れている → このドラッグ試行は黙って終わり。
        let Some(attr) = card_element.get_attribute(ATTR_CARD_DATA) else {
            session::disarm(&session);
            return;
        };
        let snapshot: CardData = match serde_json::from_str(&attr) {
            Ok(data) => data,
            Err(e) => {
                log(&format!("Malformed card payload on long-press: {}", e));
                session::disarm(&session);
                return;
            }
        };

        if !session::promote(&session, &card_element, snapshot, &callbacks) {
            session::disarm(&session);
        }
    }) as Box<dyn FnMut()>);

    let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        LONG_PRESS_DURATION_MS,
    )?;

    let mut timer = context.timer.lock().expect("Failed to lock long-press timer");
    timer.handle = Some(handle);
    timer.closure = Some(closure);
    Ok(())
}

fn attach_with_passive_false(
    target: &HtmlElement,
    event_name: &str,
    closures: &SharedEventClosures,
    handler: Box<dyn FnMut(Event)>,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event_name,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closures
        .lock()
        .expect("Failed to lock event closures")
        .push(closure);
    Ok(())
}

/// コンテナにタッチ用リスナー一式を付ける。
pub fn setup_touch_listeners(
    element: &HtmlElement,
    context: TouchContext,
    session: SharedSession,
    callbacks: SharedCallbacks,
    closures: &SharedEventClosures,
) -> Result<(), JsValue> {
    // --- touchstart ---
    {
        let context = context.clone();
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_with_passive_false(
            element,
            "touchstart",
            closures,
            Box::new(move |event: Event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>().cloned() else {
                    return;
                };
                let Some(target) = event_target_element(&event) else {
                    return;
                };
                let Some(card_element) = closest_card(&target) else {
                    return;
                };
                let Some(touch) = touch_event.touches().item(0) else {
                    return;
                };

                // 別のセッションが生きている間は新しい指を無視。
                if !session::arm(&session) {
                    return;
                }

                *context.start_point.lock().expect("Failed to lock start point") =
                    Some((touch.client_x() as f64, touch.client_y() as f64));
                *context.started_at.lock().expect("Failed to lock started_at") =
                    js_sys::Date::now();

                if let Err(e) = schedule_long_press(&context, &session, &callbacks, card_element) {
                    log(&format!("Failed to schedule long-press timer: {:?}", e));
                    session::disarm(&session);
                }
            }),
        )?;
    }

    // --- touchmove ---
    {
        let context = context.clone();
        let session = Arc::clone(&session);
        attach_with_passive_false(
            element,
            "touchmove",
            closures,
            Box::new(move |event: Event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>().cloned() else {
                    return;
                };

                match session::current_phase(&session) {
                    SessionPhase::Armed => {
                        // 昇格前に指が滑った → ドラッグ意図なし。タイマー破棄。
                        let start = *context.start_point.lock().expect("Failed to lock start point");
                        if let (Some(touch), Some((sx, sy))) = (touch_event.touches().item(0), start) {
                            let dx = touch.client_x() as f64 - sx;
                            let dy = touch.client_y() as f64 - sy;
                            if dx * dx + dy * dy > TOUCH_SLOP_PX * TOUCH_SLOP_PX {
                                clear_long_press(&context);
                                session::disarm(&session);
                            }
                        }
                    }
                    SessionPhase::Dragging => {
                        // ドラッグ中はスクロールさせない。
                        event.prevent_default();
                        let Some(touch) = touch_event.touches().item(0) else {
                            return;
                        };
                        let x = touch.client_x() as f64;
                        let y = touch.client_y() as f64;
                        let under_finger = document()
                            .ok()
                            .and_then(|d| d.element_from_point(x as f32, y as f32));
                        match under_finger {
                            Some(point_target) => session::update_move(&session, x, &point_target),
                            None => session::clear_hover(&session),
                        }
                    }
                    SessionPhase::Idle => {}
                }
            }),
        )?;
    }

    // --- touchend ---
    {
        let context = context.clone();
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_with_passive_false(
            element,
            "touchend",
            closures,
            Box::new(move |event: Event| {
                // どの相であれ、保留中の昇格はもう無効。
                clear_long_press(&context);

                match session::current_phase(&session) {
                    SessionPhase::Armed => {
                        // 300ms 未満で離れた → ただのタップ。ドラッグは始まらない。
                        let held = js_sys::Date::now()
                            - *context.started_at.lock().expect("Failed to lock started_at");
                        info!("Touch released after {:.0}ms without promoting. Treating as tap.", held);
                        session::disarm(&session);
                    }
                    SessionPhase::Dragging => {
                        let point = event
                            .dyn_ref::<TouchEvent>()
                            .and_then(|te| te.changed_touches().item(0));
                        match point {
                            Some(touch) => {
                                let x = touch.client_x() as f64;
                                let y = touch.client_y() as f64;
                                let under_finger = document()
                                    .ok()
                                    .and_then(|d| d.element_from_point(x as f32, y as f32));
                                session::complete_drop(
                                    &session,
                                    x,
                                    under_finger.as_ref(),
                                    &callbacks,
                                );
                            }
                            None => session::end_session(&session),
                        }
                        (callbacks.on_drag_end)();
                    }
                    SessionPhase::Idle => {}
                }
            }),
        )?;
    }

    // --- touchcancel ---
    {
        let context = context.clone();
        let session = Arc::clone(&session);
        let callbacks = Arc::clone(&callbacks);
        attach_with_passive_false(
            element,
            "touchcancel",
            closures,
            Box::new(move |_event: Event| {
                clear_long_press(&context);
                match session::current_phase(&session) {
                    SessionPhase::Armed => session::disarm(&session),
                    SessionPhase::Dragging => {
                        session::end_session(&session);
                        (callbacks.on_drag_end)();
                    }
                    SessionPhase::Idle => {}
                }
            }),
        )?;
    }

    Ok(())
}
