//! 错误类型定义

use thiserror::Error;

use crate::piece::Position;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 无效的棋子标识（例如 "WP0"）
    #[error("Invalid piece id {id:?}: {reason}")]
    InvalidPieceId { id: String, reason: &'static str },

    /// 无效的坐标记法（例如 "e2"）
    #[error("Invalid square: {notation:?}")]
    InvalidSquare { notation: String },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的走法
    #[error("Illegal move: from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// 没有棋子
    #[error("No piece at {at}")]
    NoPiece { at: Position },

    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
