//! 国际象棋规则引擎
//!
//! 包含:
//! - 棋子、棋盘、坐标等不可变值类型
//! - 走法几何与攻击检测
//! - 对局状态机（易位、吃过路兵、升变、将军/将死/逼和判定）
//! - FEN 棋子布局

mod board;
mod constants;
mod error;
mod fen;
mod game;
mod moves;
mod piece;

pub use board::{Board, Layout, INITIAL_LAYOUT};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_PLACEMENT};
pub use game::{Game, GameState};
pub use moves::{Move, MoveResult, MoveRules, PendingPromotion};
pub use piece::{Delta, Piece, PieceColor, PieceId, PieceType, Position};
