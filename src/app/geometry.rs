// src/app/geometry.rs
//! ポインタ座標から挿入位置を計算するモジュールだよ！📐
//! 読み取り専用。move イベントのたびに呼ばれるので、副作用ゼロで何回でも安全。

use web_sys::{Element, HtmlElement};

use crate::app::container;
use crate::config::layout::APPEND_ZONE_RATIO;

/// 挿入位置の解決結果。
/// `index` は「見えている子要素の中で何番目に入るか」(0..=N)。
/// `before_element` はその位置の直前要素。末尾なら None。
#[derive(Debug, Clone)]
pub struct InsertPosition {
    pub index: usize,
    pub before_element: Option<HtmlElement>,
}

/// 子要素1つぶんの水平方向の占有範囲。計測値のスナップショット。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChildSpan {
    pub left: f64,
    pub width: f64,
}

impl ChildSpan {
    fn center(&self) -> f64 {
        self.left + self.width / 2.0
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// 計測済みの子要素列に対する挿入インデックスの計算 (純粋関数)。
///
/// 1. 子が無ければ 0。
/// 2. 末尾の子の右端から幅の APPEND_ZONE_RATIO 以内なら、
///    中心の比較を待たずに「末尾に追加」。細いカードの救済ルール。
/// 3. それ以外は左から走査して、中心がポインタより右にある最初の子の前。
///    比較は厳密な `<` なので、ちょうど中心に重なったときの結果も一意。
/// 4. 該当なしなら末尾。
pub(crate) fn resolve_index(x: f64, spans: &[ChildSpan]) -> usize {
    let Some(last) = spans.last() else {
        return 0;
    };

    if x >= last.right() - last.width * APPEND_ZONE_RATIO {
        return spans.len();
    }

    for (i, span) in spans.iter().enumerate() {
        if x < span.center() {
            return i;
        }
    }

    spans.len()
}

/// コンテナの現在の子要素を計測して挿入位置を解決する。
/// `dragged` はドラッグ中の要素。まだ元のコンテナに残っていても計算から外す。
pub fn resolve_insert_position(
    container_el: &Element,
    x: f64,
    dragged: Option<&Element>,
) -> InsertPosition {
    let children = container::visible_children(container_el, dragged);
    let spans: Vec<ChildSpan> = children
        .iter()
        .map(|child| {
            let rect = child.get_bounding_client_rect();
            ChildSpan { left: rect.left(), width: rect.width() }
        })
        .collect();

    let index = resolve_index(x, &spans);
    InsertPosition {
        index,
        before_element: children.get(index).cloned(),
    }
}

// --- テスト ---
// 幾何の算術は純粋なのでネイティブで回せるよ。
#[cfg(test)]
mod tests {
    use super::*;

    /// 幅 `width` のカードを x=0 から隙間なく `count` 枚並べる。
    fn contiguous(count: usize, width: f64) -> Vec<ChildSpan> {
        (0..count)
            .map(|i| ChildSpan { left: i as f64 * width, width })
            .collect()
    }

    #[test]
    fn empty_container_resolves_to_zero() {
        assert_eq!(resolve_index(123.0, &[]), 0);
    }

    #[test]
    fn sweep_is_monotonic_and_bounded() {
        let spans = contiguous(5, 40.0);
        let mut previous = 0;
        let mut x = -10.0;
        while x <= 210.0 {
            let index = resolve_index(x, &spans);
            assert!(index <= 5, "index out of range at x={}", x);
            assert!(index >= previous, "index decreased at x={}", x);
            previous = index;
            x += 0.5;
        }
        // 左端の手前では 0、右端の先では N。
        assert_eq!(resolve_index(-10.0, &spans), 0);
        assert_eq!(resolve_index(210.0, &spans), 5);
    }

    #[test]
    fn right_edge_zone_appends_instead_of_inserting_before_last() {
        // 合計幅 W のカード列で、最後のカードの右端から 0.1 幅ぶん内側。
        let spans = contiguous(3, 50.0);
        let x = 150.0 - 0.1 * 50.0;
        // 最後のカードの中心 (125.0) より右だが、救済ルールが先に効いて末尾。
        assert_eq!(resolve_index(x, &spans), 3);

        // 救済ゾーンの外で、最後のカードの中心より左なら「最後のカードの前」。
        let before_last_center = 120.0;
        assert_eq!(resolve_index(before_last_center, &spans), 2);
    }

    #[test]
    fn append_zone_wins_when_row_wraps() {
        // 行が折り返して、最後のカードが2行目の左端にいるケース。
        // 中心比較だけだと1行目のカードの間に割り込んでしまうが、
        // 末尾カードの右端 30% 以内なので「末尾に追加」が勝つ。
        let spans = vec![
            ChildSpan { left: 0.0, width: 50.0 },
            ChildSpan { left: 50.0, width: 50.0 },
            ChildSpan { left: 0.0, width: 40.0 }, // 2行目
        ];
        let x = 30.0; // 末尾カードの右端 40 から 10 内側 (= 25% < 30%)
        assert_eq!(resolve_index(x, &spans), 3);
    }

    #[test]
    fn insertion_lands_before_first_child_whose_center_exceeds_x() {
        let spans = contiguous(4, 30.0); // centers: 15, 45, 75, 105
        assert_eq!(resolve_index(0.0, &spans), 0);
        assert_eq!(resolve_index(14.9, &spans), 0);
        assert_eq!(resolve_index(16.0, &spans), 1);
        assert_eq!(resolve_index(74.0, &spans), 2);
        assert_eq!(resolve_index(76.0, &spans), 3);
    }

    #[test]
    fn exact_center_tie_is_deterministic() {
        let spans = contiguous(3, 40.0); // centers: 20, 60, 100
        // ちょうど中心に重なったら `<` は成立しない → 次の子の前に落ちる。
        // 毎回同じ答えになることが大事。
        assert_eq!(resolve_index(20.0, &spans), 1);
        assert_eq!(resolve_index(20.0, &spans), 1);
    }
}
