//! 棋盘常量定义

/// 棋盘边长（行列数相同）
pub const BOARD_SIZE: i8 = 8;

/// 棋盘格子总数
pub const SQUARE_COUNT: usize = 64;

/// 白方底线（y 坐标）
pub const WHITE_BACK_RANK: i8 = 7;

/// 黑方底线（y 坐标）
pub const BLACK_BACK_RANK: i8 = 0;

/// 白兵起始行
pub const WHITE_PAWN_RANK: i8 = 6;

/// 黑兵起始行
pub const BLACK_PAWN_RANK: i8 = 1;

/// 王的初始列（e 线）
pub const KING_HOME_FILE: i8 = 4;

/// 后翼车的初始列（a 线）
pub const QUEENSIDE_ROOK_FILE: i8 = 0;

/// 王翼车的初始列（h 线）
pub const KINGSIDE_ROOK_FILE: i8 = 7;

/// 后翼易位后王所在列（c 线）
pub const QUEENSIDE_CASTLE_FILE: i8 = 2;

/// 王翼易位后王所在列（g 线）
pub const KINGSIDE_CASTLE_FILE: i8 = 6;
