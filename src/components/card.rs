// src/components/card.rs

// serde を使う宣言！カード情報を data 属性 (JSON) に埋め込むときに使うよ！
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};
use wasm_bindgen::JsCast;

// --- カード要素に付ける CSS クラスと data 属性 ---

pub const CLASS_WORD_CARD: &str = "word-card";
pub const CLASS_WORD_CARD_PLACED: &str = "word-card-placed";
pub const CLASS_WORD_CARD_START: &str = "word-card-start";
pub const CLASS_WORD_CARD_MIDDLE: &str = "word-card-middle";
pub const CLASS_WORD_CARD_END: &str = "word-card-end";

pub const ATTR_CARD_ID: &str = "data-card-id";
pub const ATTR_CARD_DATA: &str = "data-card-data";
pub const ATTR_WORD_LENGTH: &str = "data-word-length";
pub const ATTR_WIDTH_RATIO: &str = "data-width-ratio";

/// カードの安定 ID を作る。単語 + 元の位置から決まるので、
/// 同じ単語が文中に2回出てきても別カードとして区別できるよ。
/// 一度作った ID はラウンド中ずっと変わらない！
pub fn card_id(word: &str, original_index: usize) -> String {
    format!("{}-{}", word, original_index)
}

/// 文中の位置 (先頭・途中・末尾) に応じたクラス名を返すヘルパー。
pub fn position_class(original_index: usize, total: usize) -> &'static str {
    if original_index == 0 {
        CLASS_WORD_CARD_START
    } else if original_index + 1 == total {
        CLASS_WORD_CARD_END
    } else {
        CLASS_WORD_CARD_MIDDLE
    }
}

/// ドラッグ中に data 属性で持ち運ぶカードのスナップショットだよ！📸
/// DOM 要素は含まない、純粋なデータ部分。
///
/// - `id`: 安定 ID (`card_id` で生成)。レジストリを引くキー。
/// - `word`: 表示している単語。
/// - `original_index`: 正解の文の中での位置 (0 始まり)。
/// - `shuffled_index`: シャッフル後の表示順。プールに戻すときの並び順に使う。
/// - `is_used`: 行に置かれているあいだ true。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub id: String,
    pub word: String,
    pub original_index: usize,
    pub shuffled_index: usize,
    pub is_used: bool,
}

impl CardData {
    pub fn new(word: &str, original_index: usize) -> Self {
        Self {
            id: card_id(word, original_index),
            word: word.to_string(),
            original_index,
            shuffled_index: 0,
            is_used: false,
        }
    }
}

/// 単語カードそのもの！ データ (`CardData`) と DOM 要素のペアだよ。🃏
/// 要素はカードを今ホストしているコンテナ (プール or 行) が所有していて、
/// ここからは参照しているだけ。
#[derive(Debug, Clone)]
pub struct Card {
    pub data: CardData,
    pub element: HtmlElement,
}

impl Card {
    /// 単語カードの DOM 要素を作って `Card` を返す。
    /// クラス・data 属性・draggable をここでまとめて設定するよ。
    pub fn create(document: &Document, word: &str, original_index: usize, total: usize) -> Result<Self, JsValue> {
        let element: HtmlElement = document.create_element("div")?.dyn_into()?;
        element.set_class_name(CLASS_WORD_CARD);
        element.class_list().add_1(position_class(original_index, total))?;
        element.set_text_content(Some(word));
        element.set_attribute(ATTR_WORD_LENGTH, &word.chars().count().to_string())?;

        let data = CardData::new(word, original_index);
        element.set_attribute(ATTR_CARD_ID, &data.id)?;
        element.set_draggable(true);
        let card = Self { data, element };
        card.sync_data_attribute()?;
        Ok(card)
    }

    /// `data-card-data` 属性を現在の `CardData` で書き直す。
    /// `is_used` や `shuffled_index` を変えたら呼ぶこと。
    pub fn sync_data_attribute(&self) -> Result<(), JsValue> {
        let json = serde_json::to_string(&self.data)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize card data: {}", e)))?;
        self.element.set_attribute(ATTR_CARD_DATA, &json)
    }
}
