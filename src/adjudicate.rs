//! 自动判决
//!
//! 每步棋之后根据走棋方引擎的评估读数裁决是否提前终局。
//! 将帅被吃的终局判定独立于这里的启发式规则，由棋盘模型负责。

use log::info;

use crate::types::{Color, EvalSample, GameOutcome};

/// 认输阈值：引擎自评低于此值判负
const RESIGN_THRESHOLD: i32 = -1500;
/// 低评分阈值（判和用）
const LOW_EVAL_THRESHOLD: i32 = 20;
/// 低评分计数从此总步数起才累计
const STALL_MIN_PLIES: usize = 60;
/// 连续低评分读数次数：双方各三次
const STALL_STREAK: u32 = 6;
/// 强制判和的总步数上限
const MOVE_CAP: usize = 400;

/// 裁决一步棋之后的局面
///
/// `sample` 是刚走棋一方引擎的评估（引擎自身视角），
/// `ply_count` 是整局累计步数，`low_eval_streak` 是跨调用携带的
/// 连续低评分计数。规则按序评估，先命中者生效；
/// 计数无论哪条规则命中都会更新。
pub fn adjudicate(
    side_just_moved: Color,
    sample: EvalSample,
    ply_count: usize,
    low_eval_streak: &mut u32,
) -> Option<GameOutcome> {
    // 计数更新先于裁决
    if ply_count >= STALL_MIN_PLIES && sample.centipawns.abs() < LOW_EVAL_THRESHOLD {
        *low_eval_streak += 1;
    } else {
        *low_eval_streak = 0;
    }

    // 1. 认输：引擎对自身局面评分过低，走棋方输
    if sample.centipawns < RESIGN_THRESHOLD {
        info!(
            "adjudication: {} resigns by score {} at ply {}",
            side_just_moved, sample.centipawns, ply_count
        );
        return Some(GameOutcome::win_for(side_just_moved.opposite()));
    }

    // 2. 将杀分数：正距离是走棋方将死对手，非正距离是走棋方被将死
    if sample.is_mate {
        let winner = if sample.mate_distance > 0 {
            side_just_moved
        } else {
            side_just_moved.opposite()
        };
        info!(
            "adjudication: mate {} reported by {} at ply {}, {} wins",
            sample.mate_distance, side_just_moved, ply_count, winner
        );
        return Some(GameOutcome::win_for(winner));
    }

    // 3. 评估停滞判和
    if *low_eval_streak >= STALL_STREAK {
        info!(
            "adjudication: draw after {} consecutive low evals at ply {}",
            low_eval_streak, ply_count
        );
        return Some(GameOutcome::Draw);
    }

    // 4. 步数上限强制判和
    if ply_count >= MOVE_CAP {
        info!("adjudication: draw at move cap ({} plies)", ply_count);
        return Some(GameOutcome::Draw);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(centipawns: i32) -> EvalSample {
        EvalSample {
            depth: 16,
            centipawns,
            is_mate: false,
            mate_distance: 0,
        }
    }

    fn mate(distance: i32) -> EvalSample {
        EvalSample {
            depth: 16,
            centipawns: if distance > 0 { 10000 } else { -10000 },
            is_mate: true,
            mate_distance: distance,
        }
    }

    #[test]
    fn test_resign_by_score() {
        // 红方走后自评 -1600 → 黑方胜
        let mut streak = 0;
        assert_eq!(
            adjudicate(Color::Red, cp(-1600), 30, &mut streak),
            Some(GameOutcome::BlackWin)
        );
    }

    #[test]
    fn test_mate_scores() {
        let mut streak = 0;
        // 黑方走后报 mate 3 → 黑方胜
        assert_eq!(
            adjudicate(Color::Black, mate(3), 40, &mut streak),
            Some(GameOutcome::BlackWin)
        );
        // 红方走后报 mate 0（红方已被将死）→ 黑方胜
        assert_eq!(
            adjudicate(Color::Red, mate(0), 40, &mut streak),
            Some(GameOutcome::BlackWin)
        );
        // 红方走后报 mate -2 → 黑方胜
        assert_eq!(
            adjudicate(Color::Red, mate(-2), 40, &mut streak),
            Some(GameOutcome::BlackWin)
        );
    }

    #[test]
    fn test_stalled_draw_sequence() {
        // 从 ply 60 起连续 6 个 |cp| < 20 的读数，第 6 次判和
        let seq = [
            (60usize, 10),
            (62, -15),
            (64, 5),
            (66, 18),
            (68, -10),
            (70, 12),
        ];
        let mut streak = 0;
        let mut sides = [Color::Red, Color::Black].iter().cycle();
        for (i, &(ply, eval)) in seq.iter().enumerate() {
            let verdict = adjudicate(*sides.next().unwrap(), cp(eval), ply, &mut streak);
            if i < 5 {
                assert_eq!(verdict, None, "ply {}", ply);
                assert_eq!(streak, (i + 1) as u32);
            } else {
                assert_eq!(streak, 6);
                assert_eq!(verdict, Some(GameOutcome::Draw));
            }
        }
    }

    #[test]
    fn test_streak_resets() {
        let mut streak = 0;
        assert_eq!(adjudicate(Color::Red, cp(5), 60, &mut streak), None);
        assert_eq!(streak, 1);
        // 高评分打断连续计数
        assert_eq!(adjudicate(Color::Black, cp(120), 61, &mut streak), None);
        assert_eq!(streak, 0);
    }

    #[test]
    fn test_no_stall_before_min_plies() {
        let mut streak = 0;
        for ply in 0..59 {
            assert_eq!(adjudicate(Color::Red, cp(0), ply, &mut streak), None);
        }
        assert_eq!(streak, 0);
    }

    #[test]
    fn test_move_cap_draw() {
        let mut streak = 0;
        assert_eq!(
            adjudicate(Color::Red, cp(300), 400, &mut streak),
            Some(GameOutcome::Draw)
        );
    }
}
