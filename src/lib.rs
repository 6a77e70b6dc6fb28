//! Jieqi 引擎对战框架
//!
//! 揭棋（暗子翻出制象棋）的引擎对引擎比赛调度：双层棋盘模型、
//! UCI 引擎会话、走法编解码、判决规则与 Elo 统计。

pub mod adjudicate;
pub mod board;
pub mod codec;
pub mod engine;
pub mod fen;
pub mod match_runner;
pub mod stats;
pub mod types;

pub use adjudicate::adjudicate;
pub use board::{Board, BoardError, Layout, MoveRecord};
pub use engine::{EngineError, MoveReply, Session};
pub use match_runner::{MatchConfig, MatchError, MatchRunner};
pub use stats::{MatchStats, RoundResult};
pub use types::{Color, EngineId, EvalSample, GameOutcome, Piece, PieceKind, Square};
