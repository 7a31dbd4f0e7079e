//! 棋盘状态
//!
//! 棋盘是不可变值：所有修改操作都返回新棋盘，原棋盘保持不变。

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, SQUARE_COUNT};
use crate::error::Result;
use crate::moves::Move;
use crate::piece::{Piece, PieceColor, PieceType, Position};

/// 棋盘布局表，按 `[y][x]` 排列的棋子标识
pub type Layout<'a> = [[Option<&'a str>; BOARD_SIZE as usize]; BOARD_SIZE as usize];

/// 标准初始局面：黑方在 y=0..1，白方在 y=6..7
pub const INITIAL_LAYOUT: Layout<'static> = [
    [Some("BR0"), Some("BN1"), Some("BB2"), Some("BQ3"), Some("BK4"), Some("BB5"), Some("BN6"), Some("BR7")],
    [Some("BP0"), Some("BP1"), Some("BP2"), Some("BP3"), Some("BP4"), Some("BP5"), Some("BP6"), Some("BP7")],
    [None; 8],
    [None; 8],
    [None; 8],
    [None; 8],
    [Some("WP0"), Some("WP1"), Some("WP2"), Some("WP3"), Some("WP4"), Some("WP5"), Some("WP6"), Some("WP7")],
    [Some("WR0"), Some("WN1"), Some("WB2"), Some("WQ3"), Some("WK4"), Some("WB5"), Some("WN6"), Some("WR7")],
];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，索引为 y * 8 + x，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; SQUARE_COUNT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        Self::from_layout(&INITIAL_LAYOUT).expect("Initial layout should be valid")
    }

    /// 从布局表创建棋盘，任何一个标识格式错误都会导致失败
    pub fn from_layout(layout: &Layout<'_>) -> Result<Self> {
        let mut board = Self::empty();
        for (y, row) in layout.iter().enumerate() {
            for (x, id) in row.iter().enumerate() {
                if let Some(id) = id {
                    let pos = Position::new_unchecked(x as i8, y as i8);
                    board.set(pos, Some(Piece::from_id(id)?));
                }
            }
        }
        Ok(board)
    }

    /// 从初始局面依次机械地重放走法
    ///
    /// 只执行 [`Board::move_piece`]：易位时的车和吃过路兵时被吃的兵不会被还原，
    /// 经过这两种走法后重建出的棋盘与真实局面不一致。
    pub fn from_history(history: &[Move]) -> Self {
        Self::initial().replay(history)
    }

    /// 在当前棋盘上依次机械地重放走法，限制同 [`Board::from_history`]
    pub fn replay(self, history: &[Move]) -> Self {
        history
            .iter()
            .fold(self, |board, mv| board.move_piece(mv.from, mv.to))
    }

    /// 获取指定位置的棋子，棋盘外的位置返回 None
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.to_index()]
        } else {
            None
        }
    }

    /// 返回在指定位置放置棋子后的棋盘
    pub fn with_piece(mut self, pos: Position, piece: Piece) -> Self {
        self.set(pos, Some(piece));
        self
    }

    /// 移动棋子（不检查规则），目标位置原有棋子被覆盖
    pub fn move_piece(&self, from: Position, to: Position) -> Board {
        let mut board = self.clone();
        let piece = board.piece_at(from);
        board.set(to, piece);
        board.set(from, None);
        board
    }

    /// 清空指定位置
    pub fn remove_piece(&self, at: Position) -> Board {
        let mut board = self.clone();
        board.set(at, None);
        board
    }

    /// 将指定位置的棋子替换为同标识、同阵营的新类型棋子
    pub fn promote_piece(&self, at: Position, piece_type: PieceType) -> Board {
        let mut board = self.clone();
        if let Some(piece) = board.piece_at(at) {
            board.set(at, Some(piece.promoted(piece_type)));
        }
        board
    }

    /// 按行优先（从 y=0 开始）查找第一个满足条件的棋子位置
    pub fn first_position(&self, predicate: impl Fn(&Piece) -> bool) -> Option<Position> {
        self.all_positions()
            .find(|&pos| self.piece_at(pos).is_some_and(|piece| predicate(&piece)))
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: PieceColor) -> Option<Position> {
        self.first_position(|piece| piece.is(PieceType::King, color))
    }

    /// 全部 64 个位置，按行优先排列
    pub fn all_positions(&self) -> impl Iterator<Item = Position> {
        (0..SQUARE_COUNT).filter_map(Position::from_index)
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        self.all_positions()
            .filter_map(|pos| self.piece_at(pos).map(|piece| (pos, piece)))
            .collect()
    }

    /// 获取指定阵营的所有棋子
    pub fn pieces(&self, color: PieceColor) -> Vec<(Position, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.to_index()] = piece;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        let king = board.piece_at(pos("e1")).unwrap();
        assert!(king.is(PieceType::King, PieceColor::White));
        assert_eq!(king.id.to_string(), "WK4");

        let queen = board.piece_at(pos("d8")).unwrap();
        assert!(queen.is(PieceType::Queen, PieceColor::Black));

        let knight = board.piece_at(pos("g1")).unwrap();
        assert_eq!(knight.id.to_string(), "WN6");

        assert_eq!(board.all_pieces().len(), 32);
        assert_eq!(board.pieces(PieceColor::White).len(), 16);
        assert!(board.piece_at(pos("e4")).is_none());
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let board = Board::initial();
        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8), (100, -100)] {
            assert!(board.piece_at(Position::new_unchecked(x, y)).is_none());
        }
    }

    #[test]
    fn test_move_piece() {
        let board = Board::initial();
        let knight = board.piece_at(pos("g1"));

        let moved = board.move_piece(pos("g1"), pos("f3"));
        assert_eq!(moved.piece_at(pos("f3")), knight);
        assert!(moved.piece_at(pos("g1")).is_none());

        // 原棋盘不变
        assert_eq!(board.piece_at(pos("g1")), knight);
        assert!(board.piece_at(pos("f3")).is_none());
    }

    #[test]
    fn test_move_piece_overwrites_target() {
        let board = Board::initial().move_piece(pos("d1"), pos("d7"));
        let piece = board.piece_at(pos("d7")).unwrap();
        assert!(piece.is(PieceType::Queen, PieceColor::White));
        assert_eq!(board.all_pieces().len(), 31);
    }

    #[test]
    fn test_remove_and_promote() {
        let board = Board::initial();
        let removed = board.remove_piece(pos("a2"));
        assert!(removed.piece_at(pos("a2")).is_none());
        assert_eq!(removed.all_pieces().len(), 31);

        let pawn = board.piece_at(pos("b2")).unwrap();
        let promoted = board.promote_piece(pos("b2"), PieceType::Knight);
        let knight = promoted.piece_at(pos("b2")).unwrap();
        assert_eq!(knight.id, pawn.id);
        assert_eq!(knight.color, pawn.color);
        assert_eq!(knight.piece_type, PieceType::Knight);

        // 空位升变无效果
        assert_eq!(board.promote_piece(pos("e4"), PieceType::Queen), board);
    }

    #[test]
    fn test_first_position_scan_order() {
        let board = Board::initial();
        // 行优先从 y=0 开始：黑方的车 a8 先于白方的车 a1
        let first_rook = board.first_position(|p| p.piece_type == PieceType::Rook);
        assert_eq!(first_rook, Some(pos("a8")));

        assert_eq!(board.find_king(PieceColor::White), Some(pos("e1")));
        assert_eq!(board.find_king(PieceColor::Black), Some(pos("e8")));
        assert_eq!(Board::empty().find_king(PieceColor::White), None);
    }

    #[test]
    fn test_all_positions() {
        let board = Board::empty();
        let positions: Vec<_> = board.all_positions().collect();
        assert_eq!(positions.len(), 64);
        assert_eq!(positions[0], Position::new_unchecked(0, 0));
        assert_eq!(positions[1], Position::new_unchecked(1, 0));
        assert_eq!(positions[63], Position::new_unchecked(7, 7));
    }

    #[test]
    fn test_from_layout_rejects_bad_id() {
        let mut layout = INITIAL_LAYOUT;
        layout[3][3] = Some("WX9");
        assert!(Board::from_layout(&layout).is_err());
    }

    #[test]
    fn test_from_history_replays_moves() {
        let history = [
            Move::new(pos("e2"), pos("e4")),
            Move::new(pos("e7"), pos("e5")),
        ];
        let board = Board::from_history(&history);
        assert!(board.piece_at(pos("e2")).is_none());
        assert!(board.piece_at(pos("e4")).is_some());
        assert!(board.piece_at(pos("e5")).is_some());
        assert_eq!(Board::from_history(&[]), Board::initial());
    }

    #[test]
    fn test_replay_from_custom_board() {
        let start = Board::empty()
            .with_piece(pos("e1"), Piece::from_id("WK4").unwrap())
            .with_piece(pos("a2"), Piece::from_id("WP0").unwrap());
        let board = start.clone().replay(&[Move::new(pos("a2"), pos("a4"))]);
        assert!(board.piece_at(pos("a4")).is_some());
        assert!(board.piece_at(pos("a2")).is_none());
        assert_eq!(start.clone().replay(&[]), start);
    }

    #[test]
    fn test_from_history_does_not_move_castling_rook() {
        // 只记录王的走法，重放时车留在原位
        let history = [
            Move::new(pos("e2"), pos("e4")),
            Move::new(pos("e7"), pos("e5")),
            Move::new(pos("g1"), pos("f3")),
            Move::new(pos("b8"), pos("c6")),
            Move::new(pos("f1"), pos("c4")),
            Move::new(pos("g8"), pos("f6")),
            Move::new(pos("e1"), pos("g1")),
        ];
        let board = Board::from_history(&history);
        assert!(board.piece_at(pos("g1")).unwrap().is(PieceType::King, PieceColor::White));
        assert!(board.piece_at(pos("h1")).unwrap().is(PieceType::Rook, PieceColor::White));
        assert!(board.piece_at(pos("f1")).is_none());
    }
}
