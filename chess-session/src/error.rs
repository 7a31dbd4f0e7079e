//! 错误类型定义

use chess_engine::{ChessError, PieceType};
use thiserror::Error;

/// 对局会话错误
#[derive(Error, Debug)]
pub enum SessionError {
    /// 没有可悔的棋
    #[error("Nothing to undo")]
    NothingToUndo,

    /// 没有可重走的棋
    #[error("Nothing to redo")]
    NothingToRedo,

    /// 正在等待升变选择
    #[error("A promotion choice is pending")]
    PromotionPending,

    /// 当前没有等待中的升变
    #[error("No promotion is pending")]
    NoPromotionPending,

    /// 不能升变为该棋子
    #[error("Cannot promote to {0:?}")]
    InvalidPromotion(PieceType),

    /// 当前不是 AI 一方走子
    #[error("Not the AI's turn")]
    NotAiTurn,

    /// AI 后台任务失败
    #[error("AI task failed: {0}")]
    AiTaskFailed(String),

    /// 象棋规则错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),

    /// 配置格式错误
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 会话操作结果类型
pub type Result<T> = std::result::Result<T, SessionError>;
