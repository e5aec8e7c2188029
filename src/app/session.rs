// src/app/session.rs
//! ドラッグセッションの状態機械だよ！🎯
//! マウスのネイティブドラッグも、タッチの長押しドラッグも、
//! アダプタ側で {arm, promote, move, drop, cancel} に正規化してここに流し込む。
//! 状態機械自体は入力がどっちから来たかを知らない。
//!
//! 同時に生きるセッションはプロセス全体で最大1つ。新しい pointer-down は
//! セッションがアクティブな間は無視される。

use std::sync::{Arc, Mutex};

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use crate::app::{container, document, drop_apply_handler, geometry, visual_feedback};
use crate::components::card::CardData;
use crate::components::drag_state::DragState;
use crate::log;

/// セッションの相。遷移は `SessionPhase::next` だけが決める。
///
/// `Idle → Armed → Dragging → Idle`
///
/// Armed はタッチの長押し待ちに対応する。マウスドラッグでは dragstart の
/// 瞬間に Armed と Promote を連続で通るので、外からは一瞬で Dragging に見える。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Armed,
    Dragging,
}

/// 状態機械に入ってくるイベントの種類 (入力源は問わない)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventKind {
    /// カードの上で pointer-down / touch-start した。
    PointerDown,
    /// ドラッグ開始が確定した (dragstart / 長押しタイマー発火)。
    Promote,
    /// ポインタが動いた。
    Move,
    /// ドロップ (成功・失敗を問わず指やボタンが離れた)。
    Drop,
    /// 中断 (対象外へのドロップ、touchcancel、エラー)。
    Cancel,
}

impl SessionPhase {
    /// 純粋な遷移関数。ここに無い組み合わせは「現状維持 = 無視」。
    pub fn next(self, event: SessionEventKind) -> SessionPhase {
        use SessionEventKind::*;
        use SessionPhase::*;

        match (self, event) {
            (Idle, PointerDown) => Armed,
            (Armed, Promote) => Dragging,
            // 昇格前に指が離れた / 中断された → タップ扱いで終わり。
            (Armed, Drop) | (Armed, Cancel) => Idle,
            (Dragging, Drop) | (Dragging, Cancel) => Idle,
            // アクティブ中の新たな pointer-down は無視 (同時セッション禁止)。
            (Armed, PointerDown) | (Dragging, PointerDown) => self,
            // 遅れて発火した長押しタイマーなど、場違いな昇格も無視。
            (Idle, Promote) | (Idle, Move) | (Idle, Drop) | (Idle, Cancel) => Idle,
            (Armed, Move) => Armed,
            (Dragging, Move) => Dragging,
            (Dragging, Promote) => Dragging,
        }
    }
}

/// 1回のドラッグ操作ぶんの状態。`Arc<Mutex<…>>` でハンドラ間に共有される。
/// (Wasm は基本シングルスレッドだけど、作法として Mutex で包んでおく。)
#[derive(Debug, Default)]
pub struct DragSession {
    pub phase: SessionPhase,
    pub state: DragState,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self { phase: SessionPhase::Idle, state: DragState::new() }
    }

    pub fn is_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }
}

pub type SharedSession = Arc<Mutex<DragSession>>;

/// セッション終了時に呼ばれるコールバック束。ページ側 (GameApp) が実装する。
/// `on_drop` が Err を返したらコミットはキャンセル扱いになり、見た目の掃除は必ず走る。
pub struct DragCallbacks {
    pub on_drag_start: Box<dyn Fn(&CardData)>,
    pub on_drag_end: Box<dyn Fn()>,
    pub on_drop: Box<dyn Fn(&HtmlElement, &HtmlElement, &CardData, usize) -> Result<(), JsValue>>,
}

pub type SharedCallbacks = Arc<DragCallbacks>;

pub fn new_shared_session() -> SharedSession {
    Arc::new(Mutex::new(DragSession::new()))
}

/// ロック取得。毒化していたら回復して続行する (ドラッグ経路で panic しても
/// 次のセッションを始められるように)。
fn lock_session(session: &SharedSession) -> std::sync::MutexGuard<'_, DragSession> {
    match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Drag session mutex poisoned. Recovering...");
            poisoned.into_inner()
        }
    }
}

/// Idle → Armed。武装できたら true。
/// アクティブなセッションがいる間の pointer-down はここで弾かれる。
pub fn arm(session: &SharedSession) -> bool {
    let mut guard = lock_session(session);
    let next = guard.phase.next(SessionEventKind::PointerDown);
    let armed = guard.phase == SessionPhase::Idle && next == SessionPhase::Armed;
    guard.phase = next;
    armed
}

/// Armed → Idle。昇格しないまま終わった (タップだった) とき用。
pub fn disarm(session: &SharedSession) {
    let mut guard = lock_session(session);
    if guard.phase == SessionPhase::Armed {
        guard.phase = SessionPhase::Idle;
    }
}

/// Armed → Dragging。ドラッグ状態を確定し、見た目を付け、on_drag_start を呼ぶ。
/// 昇格できなかったら false (すでに別セッションが走っている等)。
pub fn promote(
    session: &SharedSession,
    card_element: &HtmlElement,
    snapshot: CardData,
    callbacks: &SharedCallbacks,
) -> bool {
    {
        let mut guard = lock_session(session);
        // Armed からしか昇格できない。Idle からの遅発タイマーも、
        // Dragging 中の二重昇格もここで弾く。
        if guard.phase != SessionPhase::Armed {
            return false;
        }
        guard.phase = guard.phase.next(SessionEventKind::Promote);
        guard.state.dragged_element = Some(card_element.clone());
        guard.state.source_container = card_element
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok());
        guard.state.card_snapshot = Some(snapshot.clone());
        guard.state.hovered_container = None;
    }

    if let Err(e) = visual_feedback::add_dragging_class(card_element) {
        warn!("Failed to mark dragged element: {:?}", e);
    }
    info!("Drag session started for card '{}'", snapshot.id);
    (callbacks.on_drag_start)(&snapshot);
    true
}

/// いまの相を覗く。アダプタが分岐に使う。
pub fn current_phase(session: &SharedSession) -> SessionPhase {
    lock_session(session).phase
}

/// ポインタが有効なドロップ先の外に出た。インジケータとハイライトを
/// 全部消して、ホバー中コンテナの記録も無しに戻す。
pub fn clear_hover(session: &SharedSession) {
    let Ok(mut guard) = session.try_lock() else {
        return;
    };
    guard.state.hovered_container = None;
    drop(guard);

    if let Ok(document) = document() {
        let _ = visual_feedback::remove_all_drop_indicators(&document);
        let _ = visual_feedback::clear_drag_over_highlights(&document, None);
    }
}

/// Dragging 中の move。ポインタ直下の要素からホバー中のコンテナを解決して、
/// ハイライトとインジケータを付け替える。対象外の上なら全部消す。
/// move は高頻度なので try_lock。取れなければこのイベントはスキップ。
pub fn update_move(session: &SharedSession, x: f64, point_target: &Element) {
    let Ok(mut guard) = session.try_lock() else {
        return;
    };
    if guard.phase != SessionPhase::Dragging {
        return;
    }

    let document = match document() {
        Ok(d) => d,
        Err(_) => return,
    };
    let dragged = guard.state.dragged_element.clone();
    let hovered = container::find_drop_target(point_target);

    match hovered {
        Some(target) => {
            let _ = visual_feedback::add_drag_over_class(&target);
            // ホバー先が変わったら前のコンテナのハイライトを落とす。
            let _ = visual_feedback::clear_drag_over_highlights(&document, Some(&target));

            let position = geometry::resolve_insert_position(
                &target,
                x,
                dragged.as_deref(),
            );
            let _ = visual_feedback::add_drop_indicator(
                &document,
                &target,
                position.before_element.as_deref(),
            );
            guard.state.hovered_container = Some(target);
        }
        None => {
            let _ = visual_feedback::remove_all_drop_indicators(&document);
            let _ = visual_feedback::clear_drag_over_highlights(&document, None);
            guard.state.hovered_container = None;
        }
    }
}

/// ドロップの確定。有効なドロップ先と有効なカードが揃っていればコミット、
/// そうでなければキャンセルと同じ後始末だけして終わる。
/// コミットの失敗 (ドメインコールバックの Err) もキャンセル扱い。
pub fn complete_drop(
    session: &SharedSession,
    x: f64,
    point_target: Option<&Element>,
    callbacks: &SharedCallbacks,
) {
    // 必要な情報だけ取り出して、コールバック実行前にロックは手放す。
    let (dragged, snapshot) = {
        let guard = lock_session(session);
        if guard.phase != SessionPhase::Dragging {
            drop(guard);
            end_session(session);
            return;
        }
        (guard.state.dragged_element.clone(), guard.state.card_snapshot.clone())
    };

    let target = point_target.and_then(container::find_drop_target);

    match (target, dragged, snapshot) {
        (Some(target), Some(dragged), Some(snapshot)) => {
            if let Err(e) =
                drop_apply_handler::commit_drop(&target, &dragged, &snapshot, x, callbacks)
            {
                // ドメイン側の失敗。視覚状態の掃除は end_session に任せて、
                // 例外はイベントハンドラへ伝播させない。
                log(&format!("Drop commit failed, treating as cancel: {:?}", e));
            }
        }
        _ => {
            info!("Drop outside any recognized container. Cancelling.");
        }
    }

    end_session(session);
}

/// セッションの終了処理。コミット後・キャンセル後のどちらでも必ず通る。
/// 何度呼んでも安全 (冪等)。ここを通ったら必ず Idle。
pub fn end_session(session: &SharedSession) {
    let mut guard = lock_session(session);

    if let Some(dragged) = guard.state.dragged_element.take() {
        let _ = visual_feedback::remove_dragging_class(&dragged);
        visual_feedback::clear_drag_inline_styles(&dragged);
    }
    guard.state.reset();
    guard.phase = SessionPhase::Idle;
    drop(guard);

    if let Ok(document) = document() {
        let _ = visual_feedback::remove_all_drop_indicators(&document);
        let _ = visual_feedback::clear_drag_over_highlights(&document, None);
        let _ = visual_feedback::clear_all_dragging(&document);
    }
}

// --- テスト ---
// 遷移関数は純粋なのでネイティブでテストできるよ。
#[cfg(test)]
mod tests {
    use super::SessionEventKind::*;
    use super::SessionPhase::*;
    use super::*;

    #[test]
    fn mouse_drag_lifecycle() {
        let mut phase = Idle;
        phase = phase.next(PointerDown);
        assert_eq!(phase, Armed);
        phase = phase.next(Promote);
        assert_eq!(phase, Dragging);
        phase = phase.next(Move);
        assert_eq!(phase, Dragging);
        phase = phase.next(Drop);
        assert_eq!(phase, Idle);
    }

    #[test]
    fn touch_released_before_long_press_never_drags() {
        // touch-start → (300ms 経過前に) touch-end。Dragging には一度もならない。
        let mut phase = Idle;
        phase = phase.next(PointerDown);
        assert_eq!(phase, Armed);
        phase = phase.next(Drop);
        assert_eq!(phase, Idle);

        // その後に遅れてタイマーが発火しても昇格しない。
        phase = phase.next(Promote);
        assert_eq!(phase, Idle);
    }

    #[test]
    fn concurrent_pointer_down_is_ignored() {
        let dragging = Idle.next(PointerDown).next(Promote);
        assert_eq!(dragging, Dragging);
        // ドラッグ中の新たな pointer-down は状態を変えない。
        assert_eq!(dragging.next(PointerDown), Dragging);
        assert_eq!(Armed.next(PointerDown), Armed);
    }

    #[test]
    fn cancel_returns_to_idle_from_any_active_phase() {
        assert_eq!(Armed.next(Cancel), Idle);
        assert_eq!(Dragging.next(Cancel), Idle);
        assert_eq!(Idle.next(Cancel), Idle);
    }

    #[test]
    fn stray_events_on_idle_are_noops() {
        assert_eq!(Idle.next(Move), Idle);
        assert_eq!(Idle.next(Drop), Idle);
        assert_eq!(Idle.next(Promote), Idle);
    }
}
