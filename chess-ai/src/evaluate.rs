//! 局面评估
//!
//! 只计算子力差，不考虑位置因素。

use chess_engine::{Game, PieceColor};

/// 评估器
pub struct Evaluator;

impl Evaluator {
    /// 子力差（`player` 视角，正值对 `player` 有利）
    pub fn material_balance(game: &Game, player: PieceColor) -> i32 {
        game.value_for(player) - game.value_for(player.other())
    }
}
