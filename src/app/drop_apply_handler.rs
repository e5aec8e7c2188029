// src/app/drop_apply_handler.rs
//! Handles applying the consequences of a successful drop.
//! 最終的な挿入位置を確定して、ドメイン側のコールバックに引き渡すところ。

use log::info;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::app::{container, geometry};
use crate::app::session::SharedCallbacks;
use crate::components::card::CardData;

/// 同一コンテナ内での並べ替え用のインデックス補正。
///
/// `target_index` は「ドラッグ中の要素を取り除く前」の子要素列に対する位置。
/// 要素を元の位置から抜くと、それより後ろの要素が1つ左に詰まるので、
/// 元の位置が挿入先より前なら挿入先を1つ戻す。
pub fn adjust_for_same_container_move(original_index: usize, target_index: usize) -> usize {
    if original_index < target_index {
        target_index - 1
    } else {
        target_index
    }
}

/// ドロップを確定してドメインコールバックを呼ぶ。
///
/// - ドロップ座標でもう一度だけ挿入位置を解決する (move 中の値は使い回さない)。
/// - 同一コンテナ内の移動なら、取り除きで詰まるぶんをここで補正する。
/// - コールバックの Err はそのまま返す。呼び出し側 (セッション) が
///   キャンセルとして後始末する。
pub fn commit_drop(
    target: &HtmlElement,
    dragged: &HtmlElement,
    snapshot: &CardData,
    x: f64,
    callbacks: &SharedCallbacks,
) -> Result<(), JsValue> {
    let resolved = geometry::resolve_insert_position(target, x, Some(dragged));

    let same_container = dragged.parent_element().as_deref() == Some(&**target);
    let insert_index = if same_container {
        // ドラッグ中の要素もまだこのコンテナの子にいる。
        // 「抜く前」の並びでの位置に直してから補正をかける。
        let original_index =
            container::element_index(target, dragged, None).unwrap_or(0);
        let raw_target = match resolved.before_element.as_deref() {
            Some(before) => container::element_index(target, before, None)
                .unwrap_or_else(|| container::visible_children(target, None).len()),
            None => container::visible_children(target, None).len(),
        };
        adjust_for_same_container_move(original_index, raw_target)
    } else {
        resolved.index
    };

    info!(
        "Committing drop of '{}' at index {} (same container: {})",
        snapshot.id, insert_index, same_container
    );
    (callbacks.on_drop)(target, dragged, snapshot, insert_index)
}

// --- テスト ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_container_index_is_decremented_when_moving_right() {
        // 5要素のコンテナで、見た目の位置1のカードを位置3の前へ。
        // 位置1を抜くと後ろが詰まるので、挿入は2になる。
        assert_eq!(adjust_for_same_container_move(1, 3), 2);
    }

    #[test]
    fn same_container_index_is_kept_when_moving_left() {
        // 後ろから前へ動かす場合は詰まりの影響を受けない。
        assert_eq!(adjust_for_same_container_move(3, 1), 1);
        assert_eq!(adjust_for_same_container_move(4, 0), 0);
    }

    #[test]
    fn dropping_onto_own_position_is_stable() {
        // 自分の位置にそのまま落としても位置は変わらない。
        assert_eq!(adjust_for_same_container_move(2, 2), 2);
        // 自分の直後 (= 抜いた後は自分の位置) も同じ場所に戻る。
        assert_eq!(adjust_for_same_container_move(2, 3), 2);
    }

    #[test]
    fn append_at_end_of_five_elements() {
        // 末尾 (抜く前の並びでは 5) へ。抜いた後の列では 4。
        assert_eq!(adjust_for_same_container_move(1, 5), 4);
    }
}
