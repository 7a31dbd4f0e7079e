//! 走法、走子结果与走法几何

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::Game;
use crate::piece::{Delta, Piece, PieceColor, PieceType, Position};

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Position,
    /// 目标位置
    pub to: Position,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// 走子结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// 走子完成
    Success(Game),
    /// 兵到达底线，等待选择升变棋子
    Promotion(PendingPromotion),
}

impl MoveResult {
    /// 已完成的对局（升变等待中返回 None）
    pub fn game(&self) -> Option<&Game> {
        match self {
            MoveResult::Success(game) => Some(game),
            MoveResult::Promotion(_) => None,
        }
    }

    pub fn into_game(self) -> Option<Game> {
        match self {
            MoveResult::Success(game) => Some(game),
            MoveResult::Promotion(_) => None,
        }
    }

    pub fn is_promotion(&self) -> bool {
        matches!(self, MoveResult::Promotion(_))
    }
}

/// 等待升变选择的走子
///
/// 内部对局已经记录了兵的走法，兵停在升变格上，类型尚未改变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPromotion {
    game: Game,
    position: Position,
}

impl PendingPromotion {
    pub(crate) fn new(game: Game, position: Position) -> Self {
        Self { game, position }
    }

    /// 兵走到底线后、升变前的对局
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// 升变格
    pub fn position(&self) -> Position {
        self.position
    }

    /// 选择升变棋子，完成走子
    pub fn select(&self, piece_type: PieceType) -> MoveResult {
        let board = self.game.board().promote_piece(self.position, piece_type);
        MoveResult::Success(Game::new(board, self.game.history().to_vec()))
    }
}

/// 马的 8 个跳跃方向
const KNIGHT_OFFSETS: [Delta; 8] = [
    Delta::new(1, 2),
    Delta::new(2, 1),
    Delta::new(2, -1),
    Delta::new(1, -2),
    Delta::new(-1, -2),
    Delta::new(-2, -1),
    Delta::new(-2, 1),
    Delta::new(-1, 2),
];

/// 走法几何规则
///
/// 只依赖棋盘，不涉及走子历史：易位和吃过路兵由 [`Game`] 处理。
pub struct MoveRules;

impl MoveRules {
    /// 按棋子类型判断能否从 `from` 走到 `to`（不含易位、吃过路兵和自将检查）
    pub fn is_reachable(board: &Board, from: Position, to: Position, piece: Piece) -> bool {
        let delta = to - from;
        match piece.piece_type {
            PieceType::Pawn => Self::is_pawn_advance(board, from, to, piece.color),
            PieceType::Rook => delta.is_straight() && Self::path_is_clear(board, from, to),
            PieceType::Bishop => delta.is_diagonal() && Self::path_is_clear(board, from, to),
            PieceType::Queen => {
                (delta.is_straight() || delta.is_diagonal()) && Self::path_is_clear(board, from, to)
            }
            PieceType::King => delta.distance() == 1,
            PieceType::Knight => KNIGHT_OFFSETS.contains(&delta),
        }
    }

    /// 兵直进：一格，或从起始行两格（中间格和目标格都为空）
    pub fn is_pawn_advance(board: &Board, from: Position, to: Position, color: PieceColor) -> bool {
        let delta = to - from;
        let forward = color.forward();
        if delta.x != 0 || board.piece_at(to).is_some() {
            return false;
        }

        if delta.y == forward {
            true
        } else if delta.y == 2 * forward && from.y == color.pawn_rank() {
            board.piece_at(from + Delta::new(0, forward)).is_none()
        } else {
            false
        }
    }

    /// 兵的斜向吃子步
    pub fn is_pawn_capture(color: PieceColor, delta: Delta) -> bool {
        delta.y == color.forward() && delta.x.abs() == 1
    }

    /// `from` 和 `to` 之间（不含两端）的格子是否都为空
    pub fn path_is_clear(board: &Board, from: Position, to: Position) -> bool {
        let step = (to - from).step();
        let mut current = from + step;
        while current != to && current.is_valid() {
            if board.piece_at(current).is_some() {
                return false;
            }
            current = current + step;
        }
        true
    }

    /// 检查棋子是否能攻击到目标位置
    pub fn attacks(board: &Board, from: Position, piece: Piece, target: Position) -> bool {
        match piece.piece_type {
            // 兵只能斜向攻击
            PieceType::Pawn => Self::is_pawn_capture(piece.color, target - from),
            _ => Self::is_reachable(board, from, target, piece),
        }
    }

    /// 检查目标位置是否被指定阵营攻击
    pub fn is_attacked(board: &Board, target: Position, by: PieceColor) -> bool {
        board
            .pieces(by)
            .into_iter()
            .any(|(pos, piece)| Self::attacks(board, pos, piece, target))
    }

    /// 检查指定阵营的王是否被将军
    pub fn is_in_check(board: &Board, color: PieceColor) -> bool {
        match board.find_king(color) {
            Some(king) => Self::is_attacked(board, king, color.other()),
            // 没有王，视为不被将军
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn piece(id: &str) -> Piece {
        Piece::from_id(id).unwrap()
    }

    #[test]
    fn test_rook_moves() {
        let rook = piece("WR0");
        let board = Board::empty().with_piece(pos("d4"), rook);

        assert!(MoveRules::is_reachable(&board, pos("d4"), pos("d8"), rook));
        assert!(MoveRules::is_reachable(&board, pos("d4"), pos("a4"), rook));
        assert!(!MoveRules::is_reachable(&board, pos("d4"), pos("e5"), rook));

        let blocked = board.with_piece(pos("d6"), piece("BP0"));
        assert!(MoveRules::is_reachable(&blocked, pos("d4"), pos("d6"), rook));
        assert!(!MoveRules::is_reachable(&blocked, pos("d4"), pos("d7"), rook));
    }

    #[test]
    fn test_bishop_and_queen_moves() {
        let bishop = piece("WB2");
        let queen = piece("WQ3");
        let board = Board::empty().with_piece(pos("c1"), bishop);

        assert!(MoveRules::is_reachable(&board, pos("c1"), pos("h6"), bishop));
        assert!(!MoveRules::is_reachable(&board, pos("c1"), pos("c4"), bishop));
        assert!(MoveRules::is_reachable(&board, pos("c1"), pos("c8"), queen));
        assert!(MoveRules::is_reachable(&board, pos("c1"), pos("a3"), queen));
        assert!(!MoveRules::is_reachable(&board, pos("c1"), pos("d3"), queen));
    }

    #[test]
    fn test_knight_ignores_blockers() {
        let board = Board::initial();
        let knight = board.piece_at(pos("b1")).unwrap();

        assert!(MoveRules::is_reachable(&board, pos("b1"), pos("c3"), knight));
        assert!(MoveRules::is_reachable(&board, pos("b1"), pos("a3"), knight));
        assert!(!MoveRules::is_reachable(&board, pos("b1"), pos("b3"), knight));
    }

    #[test]
    fn test_pawn_advance() {
        let board = Board::initial();
        let white = PieceColor::White;
        let black = PieceColor::Black;

        assert!(MoveRules::is_pawn_advance(&board, pos("e2"), pos("e3"), white));
        assert!(MoveRules::is_pawn_advance(&board, pos("e2"), pos("e4"), white));
        assert!(!MoveRules::is_pawn_advance(&board, pos("e2"), pos("e5"), white));
        assert!(!MoveRules::is_pawn_advance(&board, pos("e2"), pos("e1"), white));
        assert!(MoveRules::is_pawn_advance(&board, pos("d7"), pos("d5"), black));

        // 两步时中间格被挡
        let blocked = board.clone().with_piece(pos("e3"), piece("BN1"));
        assert!(!MoveRules::is_pawn_advance(&blocked, pos("e2"), pos("e4"), white));

        // 不在起始行不能走两步
        let advanced = board.move_piece(pos("e2"), pos("e3"));
        assert!(!MoveRules::is_pawn_advance(&advanced, pos("e3"), pos("e5"), white));
    }

    #[test]
    fn test_pawn_attacks_diagonally() {
        let pawn = piece("WP4");
        let board = Board::empty().with_piece(pos("e4"), pawn);

        assert!(MoveRules::attacks(&board, pos("e4"), pawn, pos("d5")));
        assert!(MoveRules::attacks(&board, pos("e4"), pawn, pos("f5")));
        assert!(!MoveRules::attacks(&board, pos("e4"), pawn, pos("e5")));
        assert!(!MoveRules::attacks(&board, pos("e4"), pawn, pos("d3")));
    }

    #[test]
    fn test_check_detection() {
        let board = Board::empty()
            .with_piece(pos("e1"), piece("WK4"))
            .with_piece(pos("e8"), piece("BK4"))
            .with_piece(pos("e5"), piece("BR0"));

        assert!(MoveRules::is_in_check(&board, PieceColor::White));
        assert!(!MoveRules::is_in_check(&board, PieceColor::Black));

        let shielded = board.with_piece(pos("e3"), piece("WB2"));
        assert!(!MoveRules::is_in_check(&shielded, PieceColor::White));
    }

    #[test]
    fn test_move_display_and_json() {
        let mv = Move::new(pos("e2"), pos("e4"));
        assert_eq!(mv.to_string(), "e2e4");

        let json = serde_json::to_value(mv).unwrap();
        assert_eq!(json["from"]["x"], 4);
        assert_eq!(json["to"]["y"], 4);
    }

    #[test]
    fn test_is_attacked_by_king() {
        let board = Board::empty().with_piece(pos("e8"), piece("BK4"));
        assert!(MoveRules::is_attacked(&board, pos("d7"), PieceColor::Black));
        assert!(!MoveRules::is_attacked(&board, pos("e6"), PieceColor::Black));
        assert!(!MoveRules::is_attacked(&board, pos("d7"), PieceColor::White));
    }
}
