//! 揭棋对战核心类型定义
//!
//! 定义棋盘、引擎会话与统计所共用的基础数据类型

use std::fmt;

/// 棋子颜色/阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opposite(&self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// 棋子类型
///
/// `Concealed` 仅出现在表面棋盘上，表示身份未揭示的暗子；
/// 隐藏棋盘上的棋子始终是具体类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// 将/帅
    King,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马
    Horse,
    /// 车
    Rook,
    /// 炮
    Cannon,
    /// 卒/兵
    Pawn,
    /// 暗子（仅表面棋盘）
    Concealed,
}

impl PieceKind {
    /// 棋子字母（大写基准形式）
    ///
    /// 引擎协议与 FEN 使用同一套字母：R N B A K C P，暗子为 X。
    pub fn to_letter(&self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Advisor => 'A',
            PieceKind::Elephant => 'B',
            PieceKind::Horse => 'N',
            PieceKind::Rook => 'R',
            PieceKind::Cannon => 'C',
            PieceKind::Pawn => 'P',
            PieceKind::Concealed => 'X',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::King => "King",
            PieceKind::Advisor => "Advisor",
            PieceKind::Elephant => "Elephant",
            PieceKind::Horse => "Horse",
            PieceKind::Rook => "Rook",
            PieceKind::Cannon => "Cannon",
            PieceKind::Pawn => "Pawn",
            PieceKind::Concealed => "Concealed",
        };
        write!(f, "{}", name)
    }
}

/// 棋子：阵营 + 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// FEN/协议字母：红方大写，黑方小写
    pub fn to_letter(&self) -> char {
        let ch = self.kind.to_letter();
        match self.color {
            Color::Red => ch,
            Color::Black => ch.to_ascii_lowercase(),
        }
    }
}

/// 棋盘位置 (row, col)
///
/// row: 0-9（0 是黑方底线，9 是红方底线）
/// col: 0-8（从左到右）
///
/// 引擎协议的行坐标是翻转的：protocol_row = 9 - row。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Self {
        Square { row, col }
    }

    /// 检查位置是否在棋盘范围内
    pub fn is_valid(&self) -> bool {
        (0..=9).contains(&self.row) && (0..=8).contains(&self.col)
    }

    /// 转换为 90 格数组下标
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.row as usize) * 9 + (self.col as usize)
    }

    /// 从 90 格数组下标还原
    #[inline]
    pub fn from_index(idx: usize) -> Square {
        Square {
            row: (idx / 9) as i8,
            col: (idx % 9) as i8,
        }
    }

    /// 转换为协议坐标（如 "a0"，行坐标翻转）
    pub fn to_protocol_str(&self) -> String {
        let col_char = (b'a' + self.col as u8) as char;
        format!("{}{}", col_char, 9 - self.row)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_protocol_str())
    }
}

/// 单局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    RedWin,
    BlackWin,
    Draw,
}

impl GameOutcome {
    /// 某阵营获胜对应的结果
    pub fn win_for(color: Color) -> GameOutcome {
        match color {
            Color::Red => GameOutcome::RedWin,
            Color::Black => GameOutcome::BlackWin,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::RedWin => write!(f, "RedWin"),
            GameOutcome::BlackWin => write!(f, "BlackWin"),
            GameOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// 参赛引擎编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineId {
    One,
    Two,
}

impl EngineId {
    pub fn other(&self) -> EngineId {
        match self {
            EngineId::One => EngineId::Two,
            EngineId::Two => EngineId::One,
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineId::One => write!(f, "engine1"),
            EngineId::Two => write!(f, "engine2"),
        }
    }
}

/// 引擎的一次评估读数（引擎自身视角，正分对走棋方有利）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSample {
    pub depth: u32,
    pub centipawns: i32,
    pub is_mate: bool,
    pub mate_distance: i32,
}

/// 开局标准布局：返回某位置的初始棋子
///
/// 洗牌前的基准布局，也决定了哪些格子属于"非将帅起始格"。
pub fn starting_piece_at(sq: Square) -> Option<Piece> {
    let back_rank = |col: i8| -> Option<PieceKind> {
        match col {
            0 | 8 => Some(PieceKind::Rook),
            1 | 7 => Some(PieceKind::Horse),
            2 | 6 => Some(PieceKind::Elephant),
            3 | 5 => Some(PieceKind::Advisor),
            4 => Some(PieceKind::King),
            _ => None,
        }
    };

    // 黑方底线 (row 0)
    if sq.row == 0 {
        return back_rank(sq.col).map(|k| Piece::new(Color::Black, k));
    }
    // 黑方炮位 (row 2)
    if sq.row == 2 && (sq.col == 1 || sq.col == 7) {
        return Some(Piece::new(Color::Black, PieceKind::Cannon));
    }
    // 黑方卒位 (row 3)
    if sq.row == 3 && sq.col % 2 == 0 {
        return Some(Piece::new(Color::Black, PieceKind::Pawn));
    }
    // 红方兵位 (row 6)
    if sq.row == 6 && sq.col % 2 == 0 {
        return Some(Piece::new(Color::Red, PieceKind::Pawn));
    }
    // 红方炮位 (row 7)
    if sq.row == 7 && (sq.col == 1 || sq.col == 7) {
        return Some(Piece::new(Color::Red, PieceKind::Cannon));
    }
    // 红方底线 (row 9)
    if sq.row == 9 {
        return back_rank(sq.col).map(|k| Piece::new(Color::Red, k));
    }
    None
}
