//! 对局会话
//!
//! 保存当前走子结果和重走栈，处理悔棋、升变选择，并在后台线程运行 AI。
//! 每次状态变化都会递增版本号，AI 结果按计算时的版本号校验，过期即丢弃。

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chess_ai::AiEngine;
use chess_engine::{Board, ChessError, Game, GameState, Move, MoveResult, PieceType, Position};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// 后台 AI 计算任务
pub struct AiTask {
    /// 开始计算时的会话版本
    version: u64,
    handle: JoinHandle<Option<Move>>,
    started_at: Instant,
}

impl AiTask {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 已思考的时长
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// 等待计算结果
    pub async fn join(self) -> Result<Option<Move>> {
        let mv = self
            .handle
            .await
            .map_err(|e| SessionError::AiTaskFailed(e.to_string()))?;
        debug!(
            version = self.version,
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "AI task finished"
        );
        Ok(mv)
    }
}

/// 对局会话
pub struct Session {
    config: SessionConfig,
    engine: Arc<Mutex<AiEngine>>,
    /// 对局的起始棋盘，悔棋时从这里重放
    start: Board,
    current: MoveResult,
    /// 被悔掉的走法，最近悔掉的在末尾
    forward: Vec<Move>,
    version: u64,
}

impl Session {
    /// 从标准初始局面开始
    pub fn new(config: SessionConfig) -> Self {
        Self::with_game(config, Game::default())
    }

    /// 从指定对局开始
    pub fn with_game(config: SessionConfig, game: Game) -> Self {
        // 已有历史的对局视为从标准初始局面开始
        let start = if game.history().is_empty() {
            game.board().clone()
        } else {
            Board::initial()
        };
        Self {
            engine: Arc::new(Mutex::new(config.engine())),
            config,
            start,
            current: MoveResult::Success(game),
            forward: Vec::new(),
            version: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 当前走子结果（可能正在等待升变选择）
    pub fn current(&self) -> &MoveResult {
        &self.current
    }

    /// 当前对局，等待升变时为 None
    pub fn game(&self) -> Option<&Game> {
        self.current.game()
    }

    /// 状态版本号，每次状态变化递增
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_ai_enabled(&mut self, enabled: bool) {
        self.config.ai_enabled = enabled;
    }

    /// 开始新对局
    pub fn new_game(&mut self, ai_enabled: bool) {
        self.config.ai_enabled = ai_enabled;
        self.start = Board::initial();
        self.forward.clear();
        self.update(MoveResult::Success(Game::default()));
        info!(ai_enabled, "新对局开始");
    }

    /// 玩家走子，成功后清空重走栈
    pub fn try_move(&mut self, from: Position, to: Position) -> Result<&MoveResult> {
        let game = self.settled_game()?;
        let piece = game.piece_at(from).ok_or(ChessError::NoPiece { at: from })?;
        if piece.color != game.turn() {
            return Err(ChessError::NotYourTurn.into());
        }
        if !game.can_move(from, to) {
            return Err(ChessError::IllegalMove { from, to }.into());
        }

        let result = game.do_move(from, to);
        debug!(%from, %to, promotion = result.is_promotion(), "玩家走子");
        self.forward.clear();
        self.update(result);
        Ok(&self.current)
    }

    /// 为等待中的升变选择棋子
    pub fn choose_promotion(&mut self, piece_type: PieceType) -> Result<&MoveResult> {
        let MoveResult::Promotion(pending) = &self.current else {
            return Err(SessionError::NoPromotionPending);
        };
        if !piece_type.is_promotion_choice() {
            return Err(SessionError::InvalidPromotion(piece_type));
        }

        let result = pending.select(piece_type);
        debug!(at = %pending.position(), ?piece_type, "升变");
        self.update(result);
        Ok(&self.current)
    }

    pub fn can_undo(&self) -> bool {
        self.game().is_some_and(|game| !game.history().is_empty())
    }

    pub fn can_redo(&self) -> bool {
        !self.forward.is_empty()
    }

    /// 悔一步棋
    ///
    /// 去掉最后一步后从起始棋盘机械重放，易位和吃过路兵之后的重建局面
    /// 与真实局面不一致（见 [`Board::replay`]）。
    pub fn undo(&mut self) -> Result<Move> {
        let game = self.settled_game()?;
        let (&last, rest) = game
            .history()
            .split_last()
            .ok_or(SessionError::NothingToUndo)?;

        let board = self.start.clone().replay(rest);
        let previous = Game::new(board, rest.to_vec());
        self.forward.push(last);
        self.update(MoveResult::Success(previous));
        info!(mv = %last, "悔棋");
        Ok(last)
    }

    /// 重走最近悔掉的一步，走法经过正常的走子流程
    pub fn redo(&mut self) -> Result<Move> {
        let game = self.settled_game()?;
        let mv = *self.forward.last().ok_or(SessionError::NothingToRedo)?;

        let result = game.do_move(mv.from, mv.to);
        self.forward.pop();
        self.update(result);
        info!(%mv, "重走");
        Ok(mv)
    }

    /// 是否轮到 AI 走子
    pub fn should_ai_move(&self) -> bool {
        self.config.ai_enabled
            && self.game().is_some_and(|game| {
                game.turn() == self.config.ai_color
                    && matches!(game.game_state(), GameState::Idle | GameState::Check)
            })
    }

    /// 同步计算 AI 走法，不是 AI 一方走子时返回 None
    pub fn compute_ai_move(&self) -> Result<Option<Move>> {
        let game = self.settled_game()?;
        if game.turn() != self.config.ai_color {
            return Ok(None);
        }
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(engine.calculate_next_move(game, self.config.ai_color))
    }

    /// 在阻塞线程池中计算 AI 走法，只能在 AI 一方走子时调用
    pub fn spawn_ai_move(&self) -> Result<AiTask> {
        let player = self.config.ai_color;
        let game = self.settled_game()?;
        if game.turn() != player {
            return Err(SessionError::NotAiTurn);
        }
        let game = game.clone();
        let engine = Arc::clone(&self.engine);

        let handle = tokio::task::spawn_blocking(move || {
            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine.calculate_next_move(&game, player)
        });

        Ok(AiTask {
            version: self.version,
            handle,
            started_at: Instant::now(),
        })
    }

    /// 应用 AI 走法
    ///
    /// 计算期间状态已改变时丢弃结果并返回 `Ok(false)`。AI 的升变总是选择后，
    /// 走子后清空重走栈。
    pub fn apply_ai_move(&mut self, mv: Move, version: u64) -> Result<bool> {
        if version != self.version {
            warn!(
                %mv,
                computed_at = version,
                current = self.version,
                "AI 计算期间对局状态已改变，丢弃 AI 走法"
            );
            return Ok(false);
        }

        let game = self.settled_game()?;
        let piece = game
            .piece_at(mv.from)
            .ok_or(ChessError::NoPiece { at: mv.from })?;
        if piece.color != self.config.ai_color {
            return Err(SessionError::NotAiTurn);
        }
        if !game.can_move(mv.from, mv.to) {
            return Err(ChessError::IllegalMove {
                from: mv.from,
                to: mv.to,
            }
            .into());
        }

        let result = match game.do_move(mv.from, mv.to) {
            MoveResult::Promotion(pending) => pending.select(PieceType::Queen),
            result => result,
        };
        self.forward.clear();
        self.update(result);
        info!(%mv, color = ?self.config.ai_color, "AI 走子");
        Ok(true)
    }

    /// 在后台计算并应用一步 AI 走法，不该 AI 走或 AI 无子可动时返回 None
    pub async fn run_ai_turn(&mut self) -> Result<Option<Move>> {
        if !self.should_ai_move() {
            return Ok(None);
        }

        let task = self.spawn_ai_move()?;
        let version = task.version();
        let Some(mv) = task.join().await? else {
            warn!("AI 无法找到合法走法");
            return Ok(None);
        };

        let applied = self.apply_ai_move(mv, version)?;
        Ok(applied.then_some(mv))
    }

    /// 对局结束时返回结束状态
    pub fn game_over(&self) -> Option<GameState> {
        self.game()
            .map(Game::game_state)
            .filter(GameState::is_over)
    }

    fn settled_game(&self) -> Result<&Game> {
        self.current.game().ok_or(SessionError::PromotionPending)
    }

    fn update(&mut self, result: MoveResult) {
        self.current = result;
        self.version += 1;
    }
}
