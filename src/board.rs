//! 揭棋双棋盘模型
//!
//! 隐藏棋盘保存洗牌后的真实布局，表面棋盘是引擎实际行棋的布局。
//! 两个棋盘的占用始终同步，只有棋子身份在揭示前不同。

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::types::{starting_piece_at, Color, Piece, PieceKind, Square};

/// 90 格棋盘数组 (10行 x 9列)
pub type Grid = [Option<Piece>; 90];

/// 棋盘操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// 起点为空或终点不在可达集合内
    IllegalMove { from: Square, to: Square },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::IllegalMove { from, to } => {
                write!(f, "illegal move: {} -> {}", from, to)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// 一轮比赛固定的隐藏布局
///
/// 同一轮的两局使用完全相同的布局，只交换引擎执方。
#[derive(Clone)]
pub struct Layout {
    squares: Grid,
}

impl Layout {
    /// 生成新一轮的隐藏布局
    ///
    /// 从标准开局出发，将除将帅外的棋子按阵营分别洗牌，
    /// 再按行扫描顺序放回该阵营的非将帅起始格。将帅位置不变。
    pub fn shuffled<R: Rng>(rng: &mut R) -> Layout {
        let mut squares: Grid = [None; 90];
        for (idx, sq) in squares.iter_mut().enumerate() {
            *sq = starting_piece_at(Square::from_index(idx));
        }

        // 收集除将帅外的所有棋子
        let mut red_pieces: Vec<Piece> = Vec::with_capacity(15);
        let mut black_pieces: Vec<Piece> = Vec::with_capacity(15);
        for piece in squares.iter().flatten() {
            if piece.kind != PieceKind::King {
                match piece.color {
                    Color::Red => red_pieces.push(*piece),
                    Color::Black => black_pieces.push(*piece),
                }
            }
        }

        red_pieces.shuffle(rng);
        black_pieces.shuffle(rng);

        // 按扫描顺序放回各阵营的非将帅起始格
        let mut red_iter = red_pieces.into_iter();
        let mut black_iter = black_pieces.into_iter();
        for sq in squares.iter_mut() {
            if let Some(piece) = sq {
                if piece.kind != PieceKind::King {
                    *sq = match piece.color {
                        Color::Red => red_iter.next(),
                        Color::Black => black_iter.next(),
                    };
                }
            }
        }

        Layout { squares }
    }
}

/// 一步棋的走前记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    /// 走前的表面棋子（可能是暗子）
    pub moved_before: Piece,
    /// 走前占据终点的表面棋子（可能是暗子）
    pub captured: Option<Piece>,
}

/// 双棋盘：隐藏布局 + 表面布局
#[derive(Clone)]
pub struct Board {
    hidden: Grid,
    surface: Grid,
}

impl Board {
    /// 从一轮的布局创建新棋盘
    ///
    /// 表面棋盘按占用复制隐藏棋盘，除将帅外所有棋子转为暗子。
    pub fn from_layout(layout: &Layout) -> Board {
        let hidden = layout.squares;
        let mut surface = hidden;
        for sq in surface.iter_mut().flatten() {
            if sq.kind != PieceKind::King {
                sq.kind = PieceKind::Concealed;
            }
        }
        Board { hidden, surface }
    }

    /// 获取隐藏棋盘某位置的棋子
    #[inline]
    pub fn hidden_piece(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.hidden[sq.to_index()]
    }

    /// 获取表面棋盘某位置的棋子
    #[inline]
    pub fn surface_piece(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.surface[sq.to_index()]
    }

    /// 获取起点棋子的所有可达位置
    ///
    /// 唯一的行棋规则：任何棋子都可以走到没有己方棋子的任意格子。
    /// 不做路径阻挡、将军或子力走法检查。
    pub fn valid_destinations(&self, from: Square) -> Vec<Square> {
        let mover = match self.surface_piece(from) {
            Some(p) => p,
            None => return Vec::new(),
        };

        let mut moves = Vec::with_capacity(89);
        for idx in 0..90 {
            let to = Square::from_index(idx);
            match self.surface[idx] {
                Some(target) if target.color == mover.color => {}
                _ => moves.push(to),
            }
        }
        moves
    }

    /// 执行走棋
    ///
    /// 同时移动表面与隐藏棋盘上的棋子；如果走的是暗子，
    /// 到达终点后用隐藏棋盘的真实类型揭示它。
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, BoardError> {
        let illegal = BoardError::IllegalMove { from, to };

        if !from.is_valid() || !to.is_valid() || from == to {
            return Err(illegal);
        }
        let moved_before = self.surface_piece(from).ok_or(illegal)?;
        let captured = self.surface_piece(to);
        if let Some(target) = captured {
            if target.color == moved_before.color {
                return Err(illegal);
            }
        }

        let from_idx = from.to_index();
        let to_idx = to.to_index();

        // 两个棋盘同步移动
        self.hidden[to_idx] = self.hidden[from_idx].take();
        self.surface[to_idx] = self.surface[from_idx].take();

        // 揭子：用隐藏棋盘的真实类型替换暗子
        if moved_before.kind == PieceKind::Concealed {
            if let (Some(surface_piece), Some(hidden_piece)) =
                (self.surface[to_idx].as_mut(), self.hidden[to_idx])
            {
                surface_piece.kind = hidden_piece.kind;
            }
        }

        Ok(MoveRecord {
            from,
            to,
            moved_before,
            captured,
        })
    }

    /// 将帅吃掉检测：某方将帅从隐藏棋盘上消失即判负
    pub fn winner_by_king_capture(&self) -> Option<Color> {
        let mut red_king = false;
        let mut black_king = false;
        for piece in self.hidden.iter().flatten() {
            if piece.kind == PieceKind::King {
                match piece.color {
                    Color::Red => red_king = true,
                    Color::Black => black_king = true,
                }
            }
        }
        if !red_king {
            Some(Color::Black)
        } else if !black_king {
            Some(Color::Red)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn kind_counts(layout_board: &Board, color: Color) -> Vec<(PieceKind, usize)> {
        let kinds = [
            PieceKind::Rook,
            PieceKind::Horse,
            PieceKind::Elephant,
            PieceKind::Advisor,
            PieceKind::Cannon,
            PieceKind::Pawn,
        ];
        kinds
            .iter()
            .map(|&k| {
                let n = (0..90)
                    .filter_map(|i| layout_board.hidden_piece(Square::from_index(i)))
                    .filter(|p| p.color == color && p.kind == k)
                    .count();
                (k, n)
            })
            .collect()
    }

    #[test]
    fn test_shuffled_layout_multiset() {
        // 洗牌后每方非将帅棋子的多重集合不变：2车2马2象2士2炮5兵
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = Layout::shuffled(&mut rng);
            let board = Board::from_layout(&layout);

            for color in [Color::Red, Color::Black] {
                for (kind, n) in kind_counts(&board, color) {
                    let expected = if kind == PieceKind::Pawn { 5 } else { 2 };
                    assert_eq!(n, expected, "{} {} count", color, kind);
                }
            }

            // 将帅位置固定
            assert_eq!(
                board.hidden_piece(Square::new(0, 4)),
                Some(Piece::new(Color::Black, PieceKind::King))
            );
            assert_eq!(
                board.hidden_piece(Square::new(9, 4)),
                Some(Piece::new(Color::Red, PieceKind::King))
            );
        }
    }

    #[test]
    fn test_surface_conceals_all_but_kings() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::from_layout(&Layout::shuffled(&mut rng));

        for idx in 0..90 {
            let sq = Square::from_index(idx);
            let hidden = board.hidden_piece(sq);
            let surface = board.surface_piece(sq);
            // 占用同步
            assert_eq!(hidden.is_some(), surface.is_some());
            if let (Some(h), Some(s)) = (hidden, surface) {
                assert_eq!(h.color, s.color);
                if h.kind == PieceKind::King {
                    assert_eq!(s.kind, PieceKind::King);
                } else {
                    assert_eq!(s.kind, PieceKind::Concealed);
                    // 隐藏棋盘上永远不出现暗子
                    assert_ne!(h.kind, PieceKind::Concealed);
                }
            }
        }
    }

    #[test]
    fn test_valid_destinations_excludes_friendly() {
        let mut rng = StdRng::seed_from_u64(2);
        let board = Board::from_layout(&Layout::shuffled(&mut rng));

        // 红方底线棋子：90 格减去 16 个red 占用格
        let from = Square::new(9, 0);
        let moves = board.valid_destinations(from);
        assert_eq!(moves.len(), 90 - 16);
        assert!(!moves.contains(&from));
        // 黑方棋子所在格可达（吃子）
        assert!(moves.contains(&Square::new(0, 0)));

        // 空格没有可达集合
        assert!(board.valid_destinations(Square::new(4, 4)).is_empty());
    }

    #[test]
    fn test_apply_move_reveals_and_syncs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = Board::from_layout(&Layout::shuffled(&mut rng));

        let from = Square::new(6, 0);
        let to = Square::new(5, 0);
        let hidden_kind = board.hidden_piece(from).unwrap().kind;

        let record = board.apply_move(from, to).unwrap();
        assert_eq!(record.moved_before.kind, PieceKind::Concealed);
        assert!(record.captured.is_none());

        // 揭示后表面类型等于隐藏类型
        let revealed = board.surface_piece(to).unwrap();
        assert_eq!(revealed.kind, hidden_kind);
        assert_eq!(revealed.color, Color::Red);
        assert!(board.surface_piece(from).is_none());
        assert!(board.hidden_piece(from).is_none());

        // 每步之后占用仍然同步
        for idx in 0..90 {
            let sq = Square::from_index(idx);
            assert_eq!(
                board.hidden_piece(sq).is_some(),
                board.surface_piece(sq).is_some()
            );
        }
    }

    #[test]
    fn test_apply_move_rejects_illegal() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut board = Board::from_layout(&Layout::shuffled(&mut rng));

        // 起点为空
        assert!(board
            .apply_move(Square::new(4, 4), Square::new(5, 4))
            .is_err());
        // 终点是己方棋子
        assert!(board
            .apply_move(Square::new(9, 0), Square::new(9, 1))
            .is_err());
        // 原地不动
        assert!(board
            .apply_move(Square::new(9, 0), Square::new(9, 0))
            .is_err());
    }

    #[test]
    fn test_king_capture_ends_game() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut board = Board::from_layout(&Layout::shuffled(&mut rng));
        assert_eq!(board.winner_by_king_capture(), None);

        // 模型不阻止吃将：红车（任意红子）直接走到黑将位置
        board.apply_move(Square::new(9, 0), Square::new(0, 4)).unwrap();
        assert_eq!(board.winner_by_king_capture(), Some(Color::Red));
    }

    #[test]
    fn test_same_layout_two_games() {
        // 同一轮的两局：从同一 Layout 重建的棋盘隐藏布局一致
        let mut rng = StdRng::seed_from_u64(6);
        let layout = Layout::shuffled(&mut rng);
        let a = Board::from_layout(&layout);
        let b = Board::from_layout(&layout);
        for idx in 0..90 {
            let sq = Square::from_index(idx);
            assert_eq!(a.hidden_piece(sq), b.hidden_piece(sq));
        }
    }
}
