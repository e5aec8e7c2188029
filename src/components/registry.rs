// src/components/registry.rs
//! カードの論理モデル (台帳) だよ！📒
//! DOM の並び順とは独立に、安定 ID をキーにカードを管理する。
//! 「どのカードがどっちの面 (プール or 行) にあるか」は `is_used` が唯一の真実！

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::components::card::{self, Card};
use crate::logic::level::shuffle_cards;

/// ラウンド内の全カードを保持するレジストリ。
/// `cards` の並びはシャッフル後の表示順と一致させている。
///
/// 見つからない検索は None を返すだけ。panic はしない！
#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: Vec<Card>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// 新しいラウンドの単語リストからカードを作り直す。
    /// 作成 → シャッフル → shuffled_index の割り当て、まで一気にやるよ。
    /// 古いカードはここで丸ごと破棄 (要素の取り外しは呼び出し側の仕事)。
    pub fn rebuild(&mut self, document: &Document, words: &[String]) -> Result<(), JsValue> {
        let total = words.len();
        let mut cards = Vec::with_capacity(total);
        for (index, word) in words.iter().enumerate() {
            cards.push(Card::create(document, word, index, total)?);
        }

        shuffle_cards(&mut cards);
        for (shuffled_index, card) in cards.iter_mut().enumerate() {
            card.data.shuffled_index = shuffled_index;
            card.sync_data_attribute()?;
        }

        self.cards = cards;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// シャッフル順のカード一覧。
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.data.id == id)
    }

    /// DOM 要素からカードを逆引きする。位置からは推測せず、要素の同一性だけで引く。
    pub fn find_by_element(&self, element: &Element) -> Option<&Card> {
        self.cards.iter().find(|c| &*c.element == element)
    }

    /// カードを「行に置かれた」状態にする。`is_used` を立てるだけ。
    pub fn mark_used(&mut self, id: &str) -> Result<(), JsValue> {
        self.set_used(id, true)
    }

    /// カードを「プールに戻った」状態にする。
    pub fn mark_available(&mut self, id: &str) -> Result<(), JsValue> {
        self.set_used(id, false)
    }

    fn set_used(&mut self, id: &str, used: bool) -> Result<(), JsValue> {
        if let Some(card) = self.cards.iter_mut().find(|c| c.data.id == id) {
            card.data.is_used = used;
            card.sync_data_attribute()?;
        }
        // 見つからないカードは黙って無視。ラウンド切り替え直後の遅延イベント対策。
        Ok(())
    }

    /// プールに残っているカードをシャッフル順で返す。
    /// プールへ戻すカードの挿入位置決めに使うよ。
    pub fn available_in_shuffled_order(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| !c.data.is_used).collect()
    }

    /// プール側にあるカードの位置クラス (先頭/途中/末尾) を付け直す。
    /// 行から戻ってきたカードの `word-card-placed` やハイライトもここで落ちる。
    pub fn refresh_available_card_styles(&self) -> Result<(), JsValue> {
        let total = self.cards.len();
        for card in self.cards.iter().filter(|c| !c.data.is_used) {
            card.element.set_class_name(card::CLASS_WORD_CARD);
            card.element
                .class_list()
                .add_1(card::position_class(card.data.original_index, total))?;
        }
        Ok(())
    }
}
