//! 引擎走法记号编解码
//!
//! 走法 token 格式（列 a-i 从左到右，行坐标与内部棋盘翻转）：
//! - 明子走法：4 字符，如 `a0a1`
//! - 暗子走法：5 字符，追加揭示出的棋子字母，红方大写黑方小写，如 `b2e2N`
//!
//! 解码只取前 4 个字符：揭示字母是给协议对端的信息，
//! 本地的揭示由棋盘模型根据隐藏棋盘自行推导。

use std::fmt;

use crate::board::Board;
use crate::types::{Piece, PieceKind, Square};

/// 走法记号错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    MalformedToken(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MalformedToken(token) => {
                write!(f, "malformed move token: {:?}", token)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// 编码一步走法
///
/// `moved_before` 是走前的表面棋子；如果它是暗子，
/// 从走后的隐藏棋盘取终点处的真实类型作为揭示后缀。
pub fn encode(from: Square, to: Square, moved_before: Piece, board_after: &Board) -> String {
    let mut token = format!("{}{}", from.to_protocol_str(), to.to_protocol_str());

    if moved_before.kind == PieceKind::Concealed {
        if let Some(actual) = board_after.hidden_piece(to) {
            token.push(actual.to_letter());
        }
    }

    token
}

/// 解码走法 token 为棋盘坐标
///
/// 只解析前 4 个字符，第 5 个揭示字母（如果有）被忽略。
pub fn decode(token: &str) -> Result<(Square, Square), CodecError> {
    let bytes = token.as_bytes();
    if bytes.len() < 4 {
        return Err(CodecError::MalformedToken(token.to_string()));
    }

    let col = |b: u8| -> Result<i8, CodecError> {
        match b {
            b'a'..=b'i' => Ok((b - b'a') as i8),
            _ => Err(CodecError::MalformedToken(token.to_string())),
        }
    };
    let row = |b: u8| -> Result<i8, CodecError> {
        match b {
            // 协议行坐标翻转回内部行坐标
            b'0'..=b'9' => Ok(9 - (b - b'0') as i8),
            _ => Err(CodecError::MalformedToken(token.to_string())),
        }
    };

    let from = Square::new(row(bytes[1])?, col(bytes[0])?);
    let to = Square::new(row(bytes[3])?, col(bytes[2])?);
    Ok((from, to))
}

/// 按走法历史生成 position 命令
pub fn render_history(tokens: &[String]) -> String {
    if tokens.is_empty() {
        "position startpos".to_string()
    } else {
        format!("position startpos moves {}", tokens.join(" "))
    }
}
