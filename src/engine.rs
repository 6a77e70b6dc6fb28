//! 引擎会话
//!
//! 每个会话独占一个引擎子进程，通过标准输入输出按行通信。
//! 会话状态机：Handshaking → Ready → Thinking → Ready（循环）→ Terminated。
//!
//! 子进程输出由一个专用读取线程逐行送入通道，
//! 所有等待都是带截止时间的通道接收，不存在无限阻塞的读。

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::types::{EngineId, EvalSample};

/// 握手等待 readyok 的上限
const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(30);
/// 思考截止时间 = movetime + 固定宽限
const THINK_SLACK: Duration = Duration::from_secs(12);
/// quit 之后等待进程自行退出的宽限
const QUIT_GRACE: Duration = Duration::from_secs(2);

/// 引擎会话错误
#[derive(Debug)]
pub enum EngineError {
    /// 引擎进程无法启动
    Spawn(io::Error),
    /// 握手期间未收到 readyok
    HandshakeTimeout,
    /// 思考截止前未收到 bestmove
    Timeout,
    /// bestmove 行无法解析
    MalformedReply(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Spawn(e) => write!(f, "failed to spawn engine: {}", e),
            EngineError::HandshakeTimeout => write!(f, "engine handshake timed out"),
            EngineError::Timeout => write!(f, "no bestmove before deadline"),
            EngineError::MalformedReply(line) => {
                write!(f, "malformed engine reply: {:?}", line)
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Handshaking,
    Ready,
    Terminated,
}

/// 一次思考请求的结果
#[derive(Debug, Clone)]
pub struct MoveReply {
    /// 引擎返回的走法 token（未解码）
    pub token: String,
    /// 本次思考的评估读数（引擎自身视角）
    pub eval: EvalSample,
}

/// 引擎子进程会话
pub struct Session {
    id: EngineId,
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    /// 最后一次成功解析的评估，未收到新评估时沿用
    last_eval: EvalSample,
    state: SessionState,
}

impl Session {
    /// 启动引擎子进程
    ///
    /// 子进程的 stdout 由后台读取线程转发到通道；
    /// 启动成功后会话处于 Handshaking 状态，需调用 [`Session::handshake`]。
    pub fn start(id: EngineId, path: &str) -> Result<Session, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            EngineError::Spawn(io::Error::new(io::ErrorKind::BrokenPipe, "no stdin pipe"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::Spawn(io::Error::new(io::ErrorKind::BrokenPipe, "no stdout pipe"))
        })?;

        // 后台读取线程：进程退出或通道关闭时自然结束
        let (tx, rx) = mpsc::channel();
        let reader = BufReader::new(stdout);
        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(l) => {
                        if tx.send(l).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        info!("{}: spawned {}", id, path);
        Ok(Session {
            id,
            child,
            stdin,
            lines: rx,
            last_eval: EvalSample::default(),
            state: SessionState::Handshaking,
        })
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    fn send(&mut self, cmd: &str) -> io::Result<()> {
        debug!("{} -> {}", self.id, cmd);
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()
    }

    /// UCI 握手：发送 uci、配置选项、isready，等待 readyok
    ///
    /// 超时是致命错误：该会话不可再用。
    pub fn handshake(&mut self, options: &[(String, String)]) -> Result<(), EngineError> {
        self.send("uci").map_err(|_| EngineError::HandshakeTimeout)?;
        for (name, value) in options {
            self.send(&format!("setoption name {} value {}", name, value))
                .map_err(|_| EngineError::HandshakeTimeout)?;
        }
        self.send("isready")
            .map_err(|_| EngineError::HandshakeTimeout)?;

        let deadline = Instant::now() + HANDSHAKE_DEADLINE;
        loop {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) => d,
                None => return Err(EngineError::HandshakeTimeout),
            };
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    debug!("{} <- {}", self.id, line);
                    if line.trim() == "readyok" {
                        self.state = SessionState::Ready;
                        info!("{}: handshake complete", self.id);
                        return Ok(());
                    }
                }
                Err(_) => return Err(EngineError::HandshakeTimeout),
            }
        }
    }

    /// 发送局面并请求思考，等待 bestmove
    ///
    /// 截止时间为 movetime 加固定宽限；期间解析 info 行更新评估读数。
    /// 没有收到新评估时沿用上一次的评估值。
    pub fn request_move(
        &mut self,
        position_cmd: &str,
        think_time_ms: u64,
    ) -> Result<MoveReply, EngineError> {
        if self.state != SessionState::Ready {
            return Err(EngineError::Timeout);
        }

        self.send(position_cmd).map_err(|_| EngineError::Timeout)?;
        self.send(&format!("go movetime {}", think_time_ms))
            .map_err(|_| EngineError::Timeout)?;

        let deadline = Instant::now() + Duration::from_millis(think_time_ms) + THINK_SLACK;
        let mut current = EvalSample::default();
        let mut eval_received = false;

        loop {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) => d,
                None => return Err(EngineError::Timeout),
            };
            let line = match self.lines.recv_timeout(remaining) {
                Ok(line) => line,
                // 超时或输出流中断：bestmove 不会再来了
                Err(_) => return Err(EngineError::Timeout),
            };
            debug!("{} <- {}", self.id, line);

            if line.starts_with("info") {
                if parse_info(&line, &mut current) {
                    eval_received = true;
                }
            } else if line.starts_with("bestmove") {
                let token = match line.split_whitespace().nth(1) {
                    Some(t) => t.to_string(),
                    None => return Err(EngineError::MalformedReply(line)),
                };
                if !eval_received {
                    // 原样沿用上一次的评估值
                    current.centipawns = self.last_eval.centipawns;
                }
                self.last_eval = current;
                return Ok(MoveReply {
                    token,
                    eval: current,
                });
            }
        }
    }

    /// 发送 quit 并在宽限后强制终止进程
    pub fn stop(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        let _ = self.send("quit");

        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) | Err(_) => break,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        break;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            }
        }
        self.state = SessionState::Terminated;
        info!("{}: terminated", self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 解析一行 info 输出，更新评估读数
///
/// 返回是否更新了分数。`lowerbound`/`upperbound` 行的分数是临时值，
/// 跳过不计（深度仍然采纳）。将杀分数饱和映射为 ±10000，
/// `mate 0` 表示走棋方已被将死，计 -10000。
fn parse_info(line: &str, sample: &mut EvalSample) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if let Some(idx) = parts.iter().position(|&p| p == "depth") {
        if let Some(depth) = parts.get(idx + 1).and_then(|s| s.parse().ok()) {
            sample.depth = depth;
        }
    }

    if parts.contains(&"lowerbound") || parts.contains(&"upperbound") {
        return false;
    }

    if let Some(idx) = parts.iter().position(|&p| p == "cp") {
        if let Some(cp) = parts.get(idx + 1).and_then(|s| s.parse().ok()) {
            sample.centipawns = cp;
            sample.is_mate = false;
            sample.mate_distance = 0;
            return true;
        }
    }

    if let Some(idx) = parts.iter().position(|&p| p == "mate") {
        if let Some(mate) = parts.get(idx + 1).and_then(|s| s.parse::<i32>().ok()) {
            sample.is_mate = true;
            sample.mate_distance = mate;
            sample.centipawns = if mate > 0 { 10000 } else { -10000 };
            return true;
        }
    }

    false
}
