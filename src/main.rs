//! Jieqi 引擎对战 CLI
//!
//! 驱动两个 UCI 引擎互相对弈：每轮同一隐藏布局打两局、交换执方，
//! 结束后输出总比分与 Elo 差估计。

use clap::Parser;
use serde::Serialize;

use jieqi_arena::{MatchConfig, MatchRunner, MatchStats};

#[derive(Parser)]
#[command(name = "jieqi-arena")]
#[command(about = "Jieqi engine-vs-engine match runner", long_about = None)]
struct Cli {
    /// 引擎一的可执行文件路径
    engine1: String,

    /// 引擎二的可执行文件路径
    engine2: String,

    /// 轮数（每轮两局）
    #[arg(long, default_value = "50")]
    rounds: u32,

    /// 每步思考时间（毫秒）
    #[arg(long, default_value = "1000")]
    movetime: u64,

    /// 引擎搜索线程数
    #[arg(long, default_value = "16")]
    threads: u32,

    /// 引擎置换表大小（MB）
    #[arg(long, default_value = "512")]
    hash: u32,

    /// 布局洗牌种子（默认使用系统熵）
    #[arg(long)]
    seed: Option<u64>,

    /// JSON 输出
    #[arg(long)]
    json: bool,
}

/// JSON 输出的比赛报告
#[derive(Serialize)]
struct MatchReport {
    engine1: String,
    engine2: String,
    rounds: u32,
    #[serde(flatten)]
    stats: MatchStats,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let config = MatchConfig {
        engine1_path: cli.engine1.clone(),
        engine2_path: cli.engine2.clone(),
        options: vec![
            ("Threads".to_string(), cli.threads.to_string()),
            ("Hash".to_string(), cli.hash.to_string()),
        ],
        max_rounds: cli.rounds,
        think_time_ms: cli.movetime,
        seed: cli.seed,
    };

    let mut runner = match MatchRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stats = runner.run();
    runner.shutdown();

    if cli.json {
        let report = MatchReport {
            engine1: cli.engine1,
            engine2: cli.engine2,
            rounds: cli.rounds,
            stats,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!(
            "engine1 VS engine2：{}-{}-{}",
            stats.wins1, stats.wins2, stats.draws
        );
        println!("得分率: {:.4}", stats.score_rate);
        println!("Elo 差 (engine1 - engine2): {:+.2} +/- {:.2}", stats.elo_diff, stats.std_error);
    }
}
