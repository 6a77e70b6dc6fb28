//! 比赛调度
//!
//! 每轮两局，同一隐藏布局、交换执方：第一局 engine2 执红、
//! engine1 执黑，第二局反过来。对局循环是 `GameState` 的唯一写者；
//! 引擎会话各自独立，互不共享任何状态。
//!
//! 非致命的引擎故障（超时、无法解析的走法）使当前轮整轮作废：
//! 本轮已记录的结果被丢弃，轮次号照常前进，不产生统计贡献。

use std::fmt;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adjudicate::adjudicate;
use crate::board::{Board, BoardError, Layout};
use crate::codec::{self, CodecError};
use crate::engine::{EngineError, Session};
use crate::fen;
use crate::stats::{MatchStats, RoundResult};
use crate::types::{Color, EngineId, GameOutcome};

/// 比赛配置
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub engine1_path: String,
    pub engine2_path: String,
    /// 握手时发给两个引擎的 UCI 选项
    pub options: Vec<(String, String)>,
    pub max_rounds: u32,
    pub think_time_ms: u64,
    /// 布局洗牌种子，None 时使用系统熵
    pub seed: Option<u64>,
}

/// 致命错误：缺少可用的引擎会话，比赛无法进行
#[derive(Debug)]
pub enum MatchError {
    Engine(EngineId, EngineError),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Engine(id, e) => write!(f, "{}: {}", id, e),
        }
    }
}

impl std::error::Error for MatchError {}

/// 单局作废原因（非致命，整轮作废重开）
#[derive(Debug)]
enum RoundAbort {
    Engine(EngineError),
    Codec(CodecError),
    Board(BoardError),
}

impl fmt::Display for RoundAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundAbort::Engine(e) => write!(f, "engine error: {}", e),
            RoundAbort::Codec(e) => write!(f, "{}", e),
            RoundAbort::Board(e) => write!(f, "{}", e),
        }
    }
}

impl From<EngineError> for RoundAbort {
    fn from(e: EngineError) -> Self {
        RoundAbort::Engine(e)
    }
}

impl From<CodecError> for RoundAbort {
    fn from(e: CodecError) -> Self {
        RoundAbort::Codec(e)
    }
}

impl From<BoardError> for RoundAbort {
    fn from(e: BoardError) -> Self {
        RoundAbort::Board(e)
    }
}

/// 单局游戏状态
///
/// 每局开始时整体重建；对局循环之外没有任何写者。
struct GameState {
    board: Board,
    side_to_move: Color,
    /// 协议走法 token 的时间序历史
    history: Vec<String>,
    low_eval_streak: u32,
}

impl GameState {
    fn new(layout: &Layout) -> GameState {
        GameState {
            board: Board::from_layout(layout),
            side_to_move: Color::Red,
            history: Vec::new(),
            low_eval_streak: 0,
        }
    }
}

/// 比赛调度器：持有两个引擎会话与累计结果
pub struct MatchRunner {
    config: MatchConfig,
    session1: Session,
    session2: Session,
    results: Vec<RoundResult>,
}

impl MatchRunner {
    /// 启动两个引擎会话并完成握手
    ///
    /// 任一引擎启动或握手失败都是致命错误。
    pub fn new(config: MatchConfig) -> Result<MatchRunner, MatchError> {
        let mut session1 = Session::start(EngineId::One, &config.engine1_path)
            .map_err(|e| MatchError::Engine(EngineId::One, e))?;
        session1
            .handshake(&config.options)
            .map_err(|e| MatchError::Engine(EngineId::One, e))?;

        let mut session2 = Session::start(EngineId::Two, &config.engine2_path)
            .map_err(|e| MatchError::Engine(EngineId::Two, e))?;
        session2
            .handshake(&config.options)
            .map_err(|e| MatchError::Engine(EngineId::Two, e))?;

        Ok(MatchRunner {
            config,
            session1,
            session2,
            results: Vec::new(),
        })
    }

    /// 运行全部轮次并返回统计
    pub fn run(&mut self) -> MatchStats {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for round in 1..=self.config.max_rounds {
            self.play_round(round, &mut rng);
        }

        let stats = MatchStats::from_results(&self.results);
        info!(
            "final: engine1 VS engine2 {}-{}-{}, elo {:+.2} +/- {:.2}",
            stats.wins1, stats.wins2, stats.draws, stats.elo_diff, stats.std_error
        );
        stats
    }

    /// 已记录的全部局结果
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    /// 关闭两个引擎会话
    pub fn shutdown(&mut self) {
        self.session1.stop();
        self.session2.stop();
    }

    /// 一轮两局：同一布局，第二局交换执方
    fn play_round(&mut self, round: u32, rng: &mut StdRng) {
        let layout = Layout::shuffled(rng);
        let recorded_before = self.results.len();

        info!(
            "round {}/{}: hidden FEN {}",
            round,
            self.config.max_rounds,
            fen::hidden_fen(&Board::from_layout(&layout))
        );

        for (game, red) in [(1, EngineId::Two), (2, EngineId::One)] {
            info!("round {} game {}: {} plays Red", round, game, red);
            match self.play_game(&layout, red) {
                Ok(outcome) => {
                    info!("round {} game {}: {}", round, game, outcome);
                    self.results.push(RoundResult {
                        red_engine: red,
                        black_engine: red.other(),
                        outcome,
                    });
                }
                Err(abort) => {
                    // 整轮作废，丢弃本轮已记录的结果
                    warn!("round {} invalidated: {}", round, abort);
                    self.results.truncate(recorded_before);
                    return;
                }
            }
        }
    }

    /// 打完一整局
    fn play_game(&mut self, layout: &Layout, red: EngineId) -> Result<GameOutcome, RoundAbort> {
        let mut state = GameState::new(layout);
        let think_time_ms = self.config.think_time_ms;

        loop {
            let mover = state.side_to_move;
            let engine_id = if mover == Color::Red { red } else { red.other() };
            let position_cmd = codec::render_history(&state.history);

            let reply = self
                .session_mut(engine_id)
                .request_move(&position_cmd, think_time_ms)?;

            let (from, to) = codec::decode(&reply.token)?;
            let record = state.board.apply_move(from, to)?;
            // 重新编码入历史：揭子走法由棋盘模型补上揭示后缀
            let token = codec::encode(from, to, record.moved_before, &state.board);
            info!("{} ({}) plays {}", engine_id, mover, token);
            state.history.push(token);
            state.side_to_move = mover.opposite();

            // 将帅被吃优先于启发式判决
            if let Some(winner) = state.board.winner_by_king_capture() {
                return Ok(GameOutcome::win_for(winner));
            }
            if let Some(outcome) = adjudicate(
                mover,
                reply.eval,
                state.history.len(),
                &mut state.low_eval_streak,
            ) {
                return Ok(outcome);
            }
        }
    }

    fn session_mut(&mut self, id: EngineId) -> &mut Session {
        match id {
            EngineId::One => &mut self.session1,
            EngineId::Two => &mut self.session2,
        }
    }
}
