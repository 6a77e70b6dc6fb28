//! FEN 生成
//!
//! 两种棋盘序列化：
//! - 隐藏 FEN：真实布局，始终是具体棋子字母
//! - 表面 FEN：引擎所见布局，暗子显示为 X（红）/ x（黑）
//!
//! 棋盘符号：
//! - 红方：K R N B A C P（大写）
//! - 黑方：k r n b a c p（小写）
//! - 空格：数字（连续空格合并）
//!
//! 10 行从 row 0（黑方底线）到 row 9（红方底线），以 `/` 分隔。

use crate::board::Board;
use crate::types::Square;

/// 生成隐藏棋盘 FEN（真实布局）
pub fn hidden_fen(board: &Board) -> String {
    render_rows(|sq| board.hidden_piece(sq).map(|p| p.to_letter()))
}

/// 生成表面棋盘 FEN（暗子显示为 X/x）
pub fn surface_fen(board: &Board) -> String {
    render_rows(|sq| board.surface_piece(sq).map(|p| p.to_letter()))
}

fn render_rows<F>(piece_letter: F) -> String
where
    F: Fn(Square) -> Option<char>,
{
    let mut rows = Vec::with_capacity(10);

    for row in 0..10 {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for col in 0..9 {
            match piece_letter(Square::new(row, col)) {
                Some(ch) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(ch);
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    rows.join("/")
}
