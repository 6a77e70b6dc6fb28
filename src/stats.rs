//! 比赛统计
//!
//! 按局结果归属胜负、计算 engine1 的得分率，
//! 并换算成 Elo 差距与标准误差。

use serde::Serialize;

use crate::types::{EngineId, GameOutcome};

/// 得分率到达 0 或 1 时 Elo 差距的饱和值
const ELO_CLAMP: f64 = 800.0;

/// 一局的结果记录：哪个引擎执哪方、结果如何
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub red_engine: EngineId,
    pub black_engine: EngineId,
    pub outcome: GameOutcome,
}

/// 全场统计，轮次预算耗尽后计算一次
#[derive(Debug, Clone, Serialize)]
pub struct MatchStats {
    pub wins1: usize,
    pub wins2: usize,
    pub draws: usize,
    /// engine1 的得分率（胜 1 分，和 0.5 分）
    pub score_rate: f64,
    /// engine1 相对 engine2 的 Elo 差距
    pub elo_diff: f64,
    pub std_error: f64,
}

impl MatchStats {
    /// 从全部局结果计算统计
    pub fn from_results(results: &[RoundResult]) -> MatchStats {
        let mut wins1 = 0;
        let mut wins2 = 0;
        let mut draws = 0;

        for result in results {
            let winner = match result.outcome {
                GameOutcome::RedWin => Some(result.red_engine),
                GameOutcome::BlackWin => Some(result.black_engine),
                GameOutcome::Draw => None,
            };
            match winner {
                Some(EngineId::One) => wins1 += 1,
                Some(EngineId::Two) => wins2 += 1,
                None => draws += 1,
            }
        }

        let total = results.len();
        let score_rate = if total > 0 {
            (wins1 as f64 + 0.5 * draws as f64) / total as f64
        } else {
            0.5
        };

        let elo_diff = if score_rate <= 0.0 {
            -ELO_CLAMP
        } else if score_rate >= 1.0 {
            ELO_CLAMP
        } else {
            -400.0 * (1.0 / score_rate - 1.0).log10()
        };

        let std_error = if total > 0 {
            let variance = score_rate * (1.0 - score_rate);
            ELO_CLAMP * variance.sqrt() / (total as f64).sqrt()
        } else {
            0.0
        };

        MatchStats {
            wins1,
            wins2,
            draws,
            score_rate,
            elo_diff,
            std_error,
        }
    }
}
