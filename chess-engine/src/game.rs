//! 对局状态机
//!
//! [`Game`] 由棋盘和走子历史组成，是不可变值：每次走子都产生新的对局，
//! 旧的对局仍然有效，悔棋只需保留旧值。
//!
//! 走子方不单独存储，而是由历史推导：历史为空时白方先走，否则为最后一步
//! 目标格上棋子的对方。因此每一步只追加一条走法，且必须是走子方自己的
//! 棋子落在 `to` 上（易位只记录王的走法，吃过路兵只记录吃子兵的走法）。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::constants::{
    KINGSIDE_CASTLE_FILE, KINGSIDE_ROOK_FILE, KING_HOME_FILE, QUEENSIDE_CASTLE_FILE,
    QUEENSIDE_ROOK_FILE,
};
use crate::moves::{Move, MoveResult, MoveRules, PendingPromotion};
use crate::piece::{Delta, Piece, PieceColor, PieceType, Position};

/// 对局状态（按当前走子方计算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// 正常进行
    Idle,
    /// 被将军，但有应将的走法
    Check,
    /// 被将死
    Checkmate,
    /// 无子可动且未被将军
    Stalemate,
}

impl GameState {
    /// 对局是否已结束
    pub fn is_over(&self) -> bool {
        matches!(self, GameState::Checkmate | GameState::Stalemate)
    }
}

/// 对局
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Game {
    board: Board,
    history: Vec<Move>,
}

impl Game {
    /// 从棋盘和历史创建对局（调用方负责两者一致）
    pub fn new(board: Board, history: Vec<Move>) -> Self {
        Self { board, history }
    }

    /// 从任意棋盘开始，白方先走
    pub fn from_board(board: Board) -> Self {
        Self::new(board, Vec::new())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 走子历史（最早的在前）
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    /// 获取指定位置的棋子
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.board.piece_at(pos)
    }

    /// 当前走子方
    pub fn turn(&self) -> PieceColor {
        self.history
            .last()
            .and_then(|mv| self.board.piece_at(mv.to))
            .map(|piece| piece.color.other())
            .unwrap_or(PieceColor::White)
    }

    /// 是否可以选中该位置的棋子（属于当前走子方）
    pub fn can_select(&self, pos: Position) -> bool {
        self.board
            .piece_at(pos)
            .is_some_and(|piece| piece.color == self.turn())
    }

    /// 判断走法是否合法（包括自将检查）
    pub fn can_move(&self, from: Position, to: Position) -> bool {
        self.is_pseudo_legal(from, to) && !self.leaves_king_in_check(from, to)
    }

    /// 选中棋子的所有合法目标格
    pub fn moves_for_piece_at(&self, pos: Position) -> Vec<Position> {
        self.board
            .all_positions()
            .filter(|&to| self.can_move(pos, to))
            .collect()
    }

    /// 指定阵营的所有合法走法（非走子方为空）
    pub fn all_moves_for(&self, color: PieceColor) -> Vec<Move> {
        self.board
            .pieces(color)
            .into_iter()
            .flat_map(|(from, _)| {
                self.moves_for_piece_at(from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// 当前对局状态
    pub fn game_state(&self) -> GameState {
        let color = self.turn();
        let in_check = self.king_is_in_check(color);
        let has_move = self.has_legal_move(color);

        match (in_check, has_move) {
            (true, false) => GameState::Checkmate,
            (false, false) => GameState::Stalemate,
            (true, true) => GameState::Check,
            (false, true) => GameState::Idle,
        }
    }

    /// 指定阵营的王是否被将军
    pub fn king_is_in_check(&self, color: PieceColor) -> bool {
        MoveRules::is_in_check(&self.board, color)
    }

    /// 目标位置是否被指定阵营攻击
    pub fn is_attacked(&self, pos: Position, by: PieceColor) -> bool {
        MoveRules::is_attacked(&self.board, pos, by)
    }

    /// 指定阵营场上棋子的子力总分
    pub fn value_for(&self, color: PieceColor) -> i32 {
        self.board
            .pieces(color)
            .iter()
            .map(|(_, piece)| piece.value())
            .sum()
    }

    /// 指定阵营被吃掉的棋子（初始棋子中标识已不在棋盘上的）
    ///
    /// 升变后的兵保留标识，不算被吃。
    pub fn captured_pieces_for(&self, color: PieceColor) -> Vec<Piece> {
        let on_board = self.board.all_pieces();
        Board::initial()
            .pieces(color)
            .into_iter()
            .map(|(_, piece)| piece)
            .filter(|piece| !on_board.iter().any(|(_, p)| p.id == piece.id))
            .collect()
    }

    /// 执行走子
    ///
    /// 调用方应先用 [`Game::can_move`] 检查。走子后若己方王被将军，
    /// 视为无效走法，返回未改变的对局。
    pub fn do_move(&self, from: Position, to: Position) -> MoveResult {
        if !to.is_valid() {
            debug!(%from, %to, "target off the board, ignoring");
            return MoveResult::Success(self.clone());
        }
        let Some(piece) = self.board.piece_at(from) else {
            debug!(%from, %to, "no piece to move, ignoring");
            return MoveResult::Success(self.clone());
        };

        let board = self.apply_move(from, to);
        if MoveRules::is_in_check(&board, piece.color) {
            debug!(%from, %to, "move leaves own king in check, ignoring");
            return MoveResult::Success(self.clone());
        }

        let mut history = self.history.clone();
        history.push(Move::new(from, to));
        let game = Game::new(board, history);

        if piece.piece_type == PieceType::Pawn && to.y == piece.color.promotion_rank() {
            MoveResult::Promotion(PendingPromotion::new(game, to))
        } else {
            MoveResult::Success(game)
        }
    }

    /// 易位条件
    ///
    /// 王和车是否"走过"只看历史中是否有从其初始格出发的走法，
    /// 之后其他棋子占据该格并不会恢复易位权。
    pub fn castling_permitted(&self, from: Position, to: Position) -> bool {
        let Some(king) = self.board.piece_at(from) else {
            return false;
        };
        let rank = king.color.back_rank();
        if king.piece_type != PieceType::King
            || from != Position::new_unchecked(KING_HOME_FILE, rank)
            || to.y != rank
        {
            return false;
        }

        let rook_file = match to.x {
            QUEENSIDE_CASTLE_FILE => QUEENSIDE_ROOK_FILE,
            KINGSIDE_CASTLE_FILE => KINGSIDE_ROOK_FILE,
            _ => return false,
        };
        let rook_home = Position::new_unchecked(rook_file, rank);
        let rook_in_place = self
            .board
            .piece_at(rook_home)
            .is_some_and(|rook| rook.is(PieceType::Rook, king.color));

        if !rook_in_place
            || self.has_moved_from(from)
            || self.has_moved_from(rook_home)
            || !MoveRules::path_is_clear(&self.board, from, rook_home)
        {
            return false;
        }

        // 起点、途经格和终点都不能被攻击
        let step = (to - from).step();
        let opponent = king.color.other();
        let mut square = from;
        loop {
            if MoveRules::is_attacked(&self.board, square, opponent) {
                return false;
            }
            if square == to {
                return true;
            }
            square = square + step;
        }
    }

    /// 吃过路兵条件：只在对方兵刚走两步后的下一步有效
    pub fn en_passant_take_permitted(&self, from: Position, to: Position) -> bool {
        if !to.is_valid() {
            return false;
        }
        let Some(pawn) = self.board.piece_at(from) else {
            return false;
        };
        if pawn.piece_type != PieceType::Pawn
            || !MoveRules::is_pawn_capture(pawn.color, to - from)
            || self.board.piece_at(to).is_some()
        {
            return false;
        }

        let Some(last) = self.history.last() else {
            return false;
        };
        let last_was_enemy_pawn = self
            .board
            .piece_at(last.to)
            .is_some_and(|piece| piece.is(PieceType::Pawn, pawn.color.other()));
        let double_advance = last.from.x == last.to.x && (last.to.y - last.from.y).abs() == 2;

        last_was_enemy_pawn
            && double_advance
            && last.to.x == to.x
            && last.to.y == to.y - pawn.color.forward()
    }

    /// 不考虑自将的合法性判断
    fn is_pseudo_legal(&self, from: Position, to: Position) -> bool {
        let Some(piece) = self.board.piece_at(from) else {
            return false;
        };
        if piece.color != self.turn() || !to.is_valid() {
            return false;
        }

        match self.board.piece_at(to) {
            Some(target) if target.color == piece.color => return false,
            // 兵吃子只能斜进一格
            Some(_) if piece.piece_type == PieceType::Pawn => {
                return MoveRules::is_pawn_capture(piece.color, to - from);
            }
            _ => {}
        }

        if self.en_passant_take_permitted(from, to) {
            return true;
        }

        match piece.piece_type {
            PieceType::King => {
                MoveRules::is_reachable(&self.board, from, to, piece)
                    || self.castling_permitted(from, to)
            }
            _ => MoveRules::is_reachable(&self.board, from, to, piece),
        }
    }

    /// 模拟走子后己方王是否被将军
    fn leaves_king_in_check(&self, from: Position, to: Position) -> bool {
        let Some(piece) = self.board.piece_at(from) else {
            return true;
        };
        MoveRules::is_in_check(&self.apply_move(from, to), piece.color)
    }

    /// 执行棋盘变换：普通走子、易位时联动的车、吃过路兵时清除被吃的兵
    fn apply_move(&self, from: Position, to: Position) -> Board {
        let Some(piece) = self.board.piece_at(from) else {
            return self.board.clone();
        };
        let delta = to - from;
        let moved = self.board.move_piece(from, to);

        match piece.piece_type {
            PieceType::King if delta.x.abs() == 2 && delta.y == 0 => {
                let (rook_from, rook_to) = if delta.x > 0 {
                    (
                        Position::new_unchecked(KINGSIDE_ROOK_FILE, from.y),
                        to + Delta::new(-1, 0),
                    )
                } else {
                    (
                        Position::new_unchecked(QUEENSIDE_ROOK_FILE, from.y),
                        to + Delta::new(1, 0),
                    )
                };
                moved.move_piece(rook_from, rook_to)
            }
            PieceType::Pawn if delta.x != 0 && self.board.piece_at(to).is_none() => {
                moved.remove_piece(Position::new_unchecked(to.x, from.y))
            }
            _ => moved,
        }
    }

    fn has_moved_from(&self, square: Position) -> bool {
        self.history.iter().any(|mv| mv.from == square)
    }

    fn has_legal_move(&self, color: PieceColor) -> bool {
        self.board.pieces(color).into_iter().any(|(from, _)| {
            self.board
                .all_positions()
                .any(|to| self.can_move(from, to))
        })
    }
}
