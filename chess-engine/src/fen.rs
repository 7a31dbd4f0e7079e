//! FEN 棋子布局解析和生成
//!
//! 只处理 FEN 的第一段（棋子布局），例如：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`
//!
//! 走子方由对局历史推导，因此其余字段不参与解析。

use std::collections::HashMap;

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::{ChessError, Result};
use crate::piece::{Piece, PieceColor, PieceId, PieceType, Position};

/// 初始局面布局
pub const INITIAL_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析棋子布局，第一行对应 y=0（第 8 横线）
    ///
    /// 棋子标识按阵营和类型依扫描顺序编号，如 `WP0`、`WP1`。
    pub fn parse_board(placement: &str) -> Result<Board> {
        // 只取第一段，允许传入完整 FEN
        let placement = placement.split_whitespace().next().ok_or_else(|| {
            ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            }
        })?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected 8 rows, got {}", rows.len()),
            });
        }

        let mut board = Board::empty();
        let mut counters: HashMap<(PieceColor, PieceType), u8> = HashMap::new();

        for (y, row) in rows.iter().enumerate() {
            let mut x = 0i8;

            for c in row.chars() {
                if x >= BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", y),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    x += empty_count as i8;
                } else if let Some(piece_type) = PieceType::from_id_char(c) {
                    let color = if c.is_ascii_uppercase() {
                        PieceColor::White
                    } else {
                        PieceColor::Black
                    };
                    let index = counters.entry((color, piece_type)).or_insert(0);
                    let piece = Piece {
                        id: PieceId::generate(color, piece_type, *index),
                        piece_type,
                        color,
                    };
                    *index += 1;
                    board = board.with_piece(Position::new_unchecked(x, y as i8), piece);
                    x += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if x != BOARD_SIZE {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected 8", y, x),
                });
            }
        }

        Ok(board)
    }

    /// 将棋盘转换为 FEN 布局
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE as usize);

        for y in 0..BOARD_SIZE {
            let mut row = String::new();
            let mut empty_count = 0;

            for x in 0..BOARD_SIZE {
                if let Some(piece) = board.piece_at(Position::new_unchecked(x, y)) {
                    if empty_count > 0 {
                        row.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            rows.push(row);
        }

        rows.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial_placement() {
        let board = Fen::parse_board(INITIAL_PLACEMENT).unwrap();

        // 自动编号与标准初始棋盘的标识不同，只比较类型和阵营
        for (pos, piece) in Board::initial().all_pieces() {
            let parsed = board.piece_at(pos).unwrap();
            assert_eq!(parsed.piece_type, piece.piece_type);
            assert_eq!(parsed.color, piece.color);
        }
        assert_eq!(board.all_pieces().len(), 32);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let board = Fen::parse_board(INITIAL_PLACEMENT).unwrap();
        let mut ids: Vec<_> = board.all_pieces().iter().map(|(_, p)| p.id).collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 32);

        let a2 = board.piece_at("a2".parse().unwrap()).unwrap();
        assert_eq!(a2.id.to_string(), "WP0");
    }

    #[test]
    fn test_board_to_string() {
        assert_eq!(Fen::board_to_string(&Board::initial()), INITIAL_PLACEMENT);

        let board = Board::initial().move_piece("e2".parse().unwrap(), "e4".parse().unwrap());
        assert_eq!(
            Fen::board_to_string(&board),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_accepts_full_fen() {
        let board = Fen::parse_board("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        assert_eq!(board.all_pieces().len(), 2);
        assert_eq!(
            board.find_king(PieceColor::White),
            Some("a1".parse().unwrap())
        );
    }

    #[test]
    fn test_invalid_fen() {
        // 行数不对
        assert!(Fen::parse_board("8/8/8").is_err());

        // 列数不对
        assert!(Fen::parse_board("9/8/8/8/8/8/8/8").is_err());
        assert!(Fen::parse_board("7/8/8/8/8/8/8/8").is_err());

        // 无效字符
        assert!(Fen::parse_board("x7/8/8/8/8/8/8/8").is_err());

        assert!(Fen::parse_board("").is_err());
    }
}
