// src/storage.rs

// このファイルは、プレイヤー情報を localStorage に保存するモジュールだよ！💾
// ブラウザの Storage API を使うために `web_sys` の機能を使う。
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::log;

/// localStorage に使うキー。
const STORAGE_KEY: &str = "puzzle_user_data";

/// 保存するプレイヤー情報。JSON のキー名は元データ互換の camelCase。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub first_name: String,
    pub surname: String,
}

impl UserData {
    /// 空の名前は保存しない、という最低限のチェック。
    pub fn is_valid(&self) -> bool {
        !self.first_name.is_empty() && !self.surname.is_empty()
    }
}

fn local_storage() -> Result<Storage, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("Failed to get window"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage is not available"))
}

/// プレイヤー情報を保存する。
pub fn save_user_data(user_data: &UserData) -> Result<(), JsValue> {
    if !user_data.is_valid() {
        return Err(JsValue::from_str("Cannot save empty user data"));
    }
    let json = serde_json::to_string(user_data)
        .map_err(|e| JsValue::from_str(&format!("Failed to save user data: {}", e)))?;
    local_storage()?.set_item(STORAGE_KEY, &json)
}

/// 保存済みのプレイヤー情報を読む。
/// 無い・壊れている・ストレージ不可、のどれでも None を返すだけ。エラーにはしない。
pub fn get_user_data() -> Option<UserData> {
    let storage = match local_storage() {
        Ok(s) => s,
        Err(_) => return None,
    };
    let stored = storage.get_item(STORAGE_KEY).ok().flatten()?;

    match serde_json::from_str::<UserData>(&stored) {
        Ok(data) if data.is_valid() => Some(data),
        Ok(_) => None,
        Err(e) => {
            log(&format!("Stored user data is corrupt, ignoring: {}", e));
            None
        }
    }
}

/// 保存済みのプレイヤー情報を消す。
pub fn clear_user_data() -> Result<(), JsValue> {
    local_storage()?.remove_item(STORAGE_KEY)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn save_load_clear_roundtrip() {
        let data = UserData {
            first_name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
        };
        save_user_data(&data).expect("save");
        assert_eq!(get_user_data(), Some(data));

        clear_user_data().expect("clear");
        assert_eq!(get_user_data(), None);
    }

    #[wasm_bindgen_test]
    fn corrupt_data_reads_as_none() {
        let storage = local_storage().expect("storage");
        storage.set_item(STORAGE_KEY, "{not json").expect("set");
        assert_eq!(get_user_data(), None);
        clear_user_data().expect("clear");
    }

    #[wasm_bindgen_test]
    fn empty_names_are_rejected() {
        let data = UserData {
            first_name: String::new(),
            surname: "X".to_string(),
        };
        assert!(save_user_data(&data).is_err());
    }
}
