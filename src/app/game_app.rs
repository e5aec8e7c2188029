// src/app/game_app.rs

// --- 必要なものをインポート ---
use std::sync::{Arc, Mutex};

use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::app::session::{DragCallbacks, SharedCallbacks, SharedSession};
use crate::app::{
    card_moves, container, document, drag_event_handler, layout_calculator, row_click_handler,
    session, touch_handler, visual_feedback, SharedEventClosures,
};
use crate::components::card::CardData;
use crate::components::{CardRegistry, GameState};
use crate::config::layout::ROWS_COUNT;
use crate::logic::{level, sentence};
use crate::storage;
use crate::{error, log};

// --- ゲーム全体のアプリケーション状態を管理する構造体 ---
// ページ側 (JS) にはこのファサードだけを見せる。内部状態は全部
// Arc<Mutex<…>> でイベントクロージャと共有している。
#[wasm_bindgen]
pub struct GameApp {
    registry: Arc<Mutex<CardRegistry>>,
    game_state: Arc<Mutex<GameState>>,
    session: SharedSession,
    source_area: HtmlElement,
    board: HtmlElement,
    rows: Vec<HtmlElement>,
    // イベントリスナーのクロージャを GameApp の寿命に合わせて保持する。
    event_closures: SharedEventClosures,
    row_click_closures: row_click_handler::SharedRowClosures,
    recalc_timer: layout_calculator::SharedRecalcTimer,
}

#[wasm_bindgen]
impl GameApp {
    /// ルート要素の中にゲーム盤を組み立てて、最初のラウンドを始める。
    #[wasm_bindgen(constructor)]
    pub fn new(root_id: &str) -> Result<GameApp, JsValue> {
        log("GameApp: Initializing...");
        let document = document()?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| JsValue::from_str(&format!("Root element '#{}' not found", root_id)))?;

        // 出題文はレベルデータから。埋め込みのレベル1で始める。
        let level = level::load_embedded_level().map_err(|e| JsValue::from_str(&e))?;
        let sentences = level::select_round_sentences(&level).map_err(|e| JsValue::from_str(&e))?;

        let (board, rows, source_area) = build_game_dom(&document, &root)?;

        let app = GameApp {
            registry: Arc::new(Mutex::new(CardRegistry::new())),
            game_state: Arc::new(Mutex::new(GameState::new(sentences))),
            session: session::new_shared_session(),
            source_area,
            board,
            rows,
            event_closures: Arc::new(Mutex::new(Vec::new())),
            row_click_closures: row_click_handler::new_shared_row_closures(),
            recalc_timer: layout_calculator::new_shared_recalc_timer(),
        };

        // ドラッグ (マウス) とタッチの両アダプタを同じセッションに繋ぐ。
        let callbacks = app.build_drag_callbacks();
        drag_event_handler::setup_drag_listeners(
            &app.source_area,
            &app.board,
            Arc::clone(&app.session),
            Arc::clone(&callbacks),
            &app.event_closures,
        )?;
        // タッチのタイマー状態は両コンテナで共有する。プールで始まった
        // 長押しがボードの上で終わっても1つのジェスチャとして扱うため。
        let touch_context = touch_handler::TouchContext::new();
        touch_handler::setup_touch_listeners(
            &app.source_area,
            touch_context.clone(),
            Arc::clone(&app.session),
            Arc::clone(&callbacks),
            &app.event_closures,
        )?;
        touch_handler::setup_touch_listeners(
            &app.board,
            touch_context,
            Arc::clone(&app.session),
            Arc::clone(&callbacks),
            &app.event_closures,
        )?;

        app.start_current_round()?;
        log("GameApp: Initialization complete.");
        Ok(app)
    }

    /// いまの行を正解文と突き合わせて、カードに正誤ハイライトを付ける。
    /// 「全部のカードが正しい位置にあって、かつ文が完成している」とき true。
    pub fn check_current_row(&self) -> Result<bool, JsValue> {
        let (round, sentence_text) = self.round_and_sentence();
        let Some(sentence_text) = sentence_text else {
            return Ok(false);
        };
        let Some(row) = self.rows.get(round) else {
            return Ok(false);
        };

        let cards = container::visible_children(row, None);
        let words: Vec<String> = cards
            .iter()
            .map(|c| c.text_content().unwrap_or_default().trim().to_string())
            .collect();

        let checks = sentence::validate_row_words(&sentence_text, &words);
        for (card, check) in cards.iter().zip(&checks) {
            visual_feedback::highlight_card(card, check.is_correct)?;
        }

        let is_correct = sentence::is_sentence_complete(&sentence_text, words.len())
            && checks.iter().all(|c| c.is_correct);
        self.game_state
            .lock()
            .expect("Failed to lock game state")
            .record_result(is_correct);
        info!(
            "Round {} checked: \"{}\" -> {}",
            round,
            sentence::assemble_sentence(&words),
            is_correct
        );
        Ok(is_correct)
    }

    /// 次のラウンドへ進む。進めたら true (最終ラウンドなら false)。
    pub fn next_round(&self) -> Result<bool, JsValue> {
        let advanced = self
            .game_state
            .lock()
            .expect("Failed to lock game state")
            .advance();
        if advanced {
            self.start_current_round()?;
        }
        Ok(advanced)
    }

    /// いまのラウンドをやり直す。プールもアクティブ行も組み立て直し。
    pub fn reset_current_round(&self) -> Result<(), JsValue> {
        self.start_current_round()
    }

    /// 別のレベルデータ (JSON 文字列) で最初からやり直す。
    pub fn load_level_json(&self, json: &str) -> Result<(), JsValue> {
        let level = level::parse_level(json).map_err(|e| JsValue::from_str(&e))?;
        let sentences = level::select_round_sentences(&level).map_err(|e| JsValue::from_str(&e))?;

        // 前のゲームの行を全部空にしてから入れ替える。
        for row in &self.rows {
            clear_children(row)?;
            row.remove_attribute(layout_calculator::ATTR_SENTENCE_RATIOS)?;
            row.remove_attribute(layout_calculator::ATTR_TOTAL_PADDING)?;
        }
        *self
            .game_state
            .lock()
            .expect("Failed to lock game state") = GameState::new(sentences);
        self.start_current_round()
    }

    pub fn current_round(&self) -> usize {
        self.game_state
            .lock()
            .expect("Failed to lock game state")
            .current_round()
    }

    pub fn round_count(&self) -> usize {
        self.game_state
            .lock()
            .expect("Failed to lock game state")
            .round_count()
    }

    /// ヒント表示用。いまのラウンドの正解文。
    pub fn current_sentence(&self) -> Option<String> {
        self.game_state
            .lock()
            .expect("Failed to lock game state")
            .current_sentence()
            .map(String::from)
    }

    pub fn is_finished(&self) -> bool {
        self.game_state
            .lock()
            .expect("Failed to lock game state")
            .is_finished()
    }
}

// --- 内部実装 (wasm には公開しない) ---
impl GameApp {
    fn round_and_sentence(&self) -> (usize, Option<String>) {
        let state = self.game_state.lock().expect("Failed to lock game state");
        (state.current_round(), state.current_sentence().map(String::from))
    }

    /// いまのラウンドを組み立てる: プールを作り直し、アクティブ行を切り替える。
    fn start_current_round(&self) -> Result<(), JsValue> {
        let document = document()?;
        let (round, sentence_text) = self.round_and_sentence();
        let Some(sentence_text) = sentence_text else {
            info!("All rounds finished. Nothing to start.");
            return Ok(());
        };

        let words = level::get_sentence_words(&sentence_text);
        let total_len: usize = words.iter().map(|w| w.chars().count()).sum();

        clear_children(&self.source_area)?;
        if let Some(row) = self.rows.get(round) {
            clear_children(row)?;
            layout_calculator::prepare_row_for_sentence(row, &words)?;
        }

        {
            let mut registry = self.registry.lock().expect("Failed to lock registry");
            registry.rebuild(&document, &words)?;
            for card in registry.cards() {
                layout_calculator::apply_source_card_width(
                    &card.element,
                    card.data.word.chars().count(),
                    total_len,
                )?;
                self.source_area.append_child(&card.element)?;
            }
        }

        row_click_handler::set_active_row(&self.rows, round)?;
        self.register_active_row_click(round)?;
        info!("Round {} started ({} words)", round, words.len());
        Ok(())
    }

    /// アクティブ行のクリックハンドラを付け替える。
    /// クリックされた placed カードはプールに帰る。
    fn register_active_row_click(&self, round: usize) -> Result<(), JsValue> {
        let registry = Arc::clone(&self.registry);
        let source_area = self.source_area.clone();
        let rows = self.rows.clone();
        let recalc_timer = Arc::clone(&self.recalc_timer);

        let handler = Box::new(move |card_element: HtmlElement| {
            {
                let mut registry = registry.lock().expect("Failed to lock registry");
                if let Err(e) =
                    card_moves::return_card_to_pool(&mut registry, &source_area, &card_element)
                {
                    error(&format!("Failed to return card to pool: {:?}", e));
                    return;
                }
            }
            if let Some(row) = rows.get(round) {
                let _ = visual_feedback::clear_check_highlights(row);
                let _ = layout_calculator::schedule_row_width_recalc(row, &recalc_timer);
            }
        });

        row_click_handler::setup_row_click_handler(
            &self.rows,
            round,
            &self.row_click_closures,
            handler,
        )
    }

    /// ドラッグエンジンに渡すドメインコールバック束を作る。
    fn build_drag_callbacks(&self) -> SharedCallbacks {
        let on_drag_start = Box::new(move |card: &CardData| {
            info!("Drag started for card '{}'", card.id);
        });

        let game_state_end = Arc::clone(&self.game_state);
        let rows_end = self.rows.clone();
        let recalc_end = Arc::clone(&self.recalc_timer);
        let on_drag_end = Box::new(move || {
            // ドラッグで行の構成が変わったかもしれないので幅を取り直す。
            let round = game_state_end
                .lock()
                .expect("Failed to lock game state")
                .current_round();
            if let Some(row) = rows_end.get(round) {
                let _ = layout_calculator::schedule_row_width_recalc(row, &recalc_end);
            }
        });

        let registry = Arc::clone(&self.registry);
        let game_state = Arc::clone(&self.game_state);
        let rows = self.rows.clone();
        let source_area = self.source_area.clone();
        let recalc_timer = Arc::clone(&self.recalc_timer);
        let on_drop = Box::new(
            move |target: &HtmlElement,
                  card_element: &HtmlElement,
                  _snapshot: &CardData,
                  insert_index: usize|
                  -> Result<(), JsValue> {
                let round = game_state
                    .lock()
                    .expect("Failed to lock game state")
                    .current_round();

                {
                    let mut registry = registry.lock().expect("Failed to lock registry");
                    if container::is_source_area(target) {
                        // プールへのドロップは並べ替えではなく「返却」。
                        // ポインタ位置は無視して、シャッフル順の席に戻す。
                        card_moves::return_card_to_pool(&mut registry, &source_area, card_element)?;
                    } else if container::is_board_row(target) {
                        if rows.get(round).map_or(false, |row| row == target) {
                            card_moves::move_card_to_row(
                                &mut registry,
                                target,
                                card_element,
                                insert_index,
                            )?;
                        } else {
                            info!("Drop on an inactive row. Ignoring.");
                            return Ok(());
                        }
                    }
                }

                // 行の構成が変わったら前回のチェック結果はもう古い。
                if let Some(row) = rows.get(round) {
                    let _ = visual_feedback::clear_check_highlights(row);
                    let _ = layout_calculator::schedule_row_width_recalc(row, &recalc_timer);
                }
                Ok(())
            },
        );

        Arc::new(DragCallbacks {
            on_drag_start,
            on_drag_end,
            on_drop,
        })
    }
}

/// ゲーム盤の DOM を組み立てる。行 (ROWS_COUNT 本) のボードとカードプール。
fn build_game_dom(
    document: &Document,
    root: &Element,
) -> Result<(HtmlElement, Vec<HtmlElement>, HtmlElement), JsValue> {
    clear_children(root)?;

    let content: HtmlElement = document.create_element("div")?.dyn_into()?;
    content.set_class_name("game-content");

    let board: HtmlElement = document.create_element("div")?.dyn_into()?;
    board.set_class_name(container::CLASS_BOARD);

    let mut rows = Vec::with_capacity(ROWS_COUNT);
    for i in 0..ROWS_COUNT {
        let row: HtmlElement = document.create_element("div")?.dyn_into()?;
        row.set_class_name(container::CLASS_BOARD_ROW);
        row.set_attribute(container::ATTR_ROW_INDEX, &i.to_string())?;
        board.append_child(&row)?;
        rows.push(row);
    }

    let source_area: HtmlElement = document.create_element("div")?.dyn_into()?;
    source_area.set_class_name(container::CLASS_SOURCE_AREA);

    content.append_child(&board)?;
    content.append_child(&source_area)?;
    root.append_child(&content)?;

    Ok((board, rows, source_area))
}

/// コンテナの子を全部取り除く。
fn clear_children(container_el: &Element) -> Result<(), JsValue> {
    while let Some(child) = container_el.first_child() {
        container_el.remove_child(&child)?;
    }
    Ok(())
}

// --- プレイヤー情報 (localStorage) ---
// ログインページ側から呼ぶ薄いラッパー。

#[wasm_bindgen]
pub fn save_player(first_name: &str, surname: &str) -> Result<(), JsValue> {
    storage::save_user_data(&storage::UserData {
        first_name: first_name.to_string(),
        surname: surname.to_string(),
    })
}

#[wasm_bindgen]
pub fn load_player() -> Option<String> {
    storage::get_user_data().map(|u| format!("{} {}", u.first_name, u.surname))
}

#[wasm_bindgen]
pub fn clear_player() -> Result<(), JsValue> {
    storage::clear_user_data()
}
