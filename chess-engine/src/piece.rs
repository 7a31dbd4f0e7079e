//! 棋子、阵营与坐标定义

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLACK_BACK_RANK, BLACK_PAWN_RANK, BOARD_SIZE, SQUARE_COUNT, WHITE_BACK_RANK, WHITE_PAWN_RANK,
};
use crate::error::{ChessError, Result};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// 兵升变时可选择的棋子
    pub const PROMOTION_CHOICES: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// 子力分值（用于 AI 评估，王不计分）
    pub fn value(&self) -> i32 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight => 3,
            PieceType::Bishop => 3,
            PieceType::Rook => 5,
            PieceType::Queen => 8,
            PieceType::King => 0,
        }
    }

    /// 是否可以作为升变目标
    pub fn is_promotion_choice(&self) -> bool {
        Self::PROMOTION_CHOICES.contains(self)
    }

    /// 棋子标识中的类型字符
    pub fn id_char(&self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// 从类型字符解析（大小写不敏感）
    pub fn from_id_char(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, color: PieceColor) -> char {
        match color {
            PieceColor::White => self.id_char(),
            PieceColor::Black => self.id_char().to_ascii_lowercase(),
        }
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    /// 白方（先手，在下方 y=6..7）
    White,
    /// 黑方（后手，在上方 y=0..1）
    Black,
}

impl PieceColor {
    /// 获取对方阵营
    pub fn other(&self) -> PieceColor {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// 兵前进方向（y 增量）
    pub fn forward(&self) -> i8 {
        match self {
            PieceColor::White => -1,
            PieceColor::Black => 1,
        }
    }

    /// 己方底线
    pub fn back_rank(&self) -> i8 {
        match self {
            PieceColor::White => WHITE_BACK_RANK,
            PieceColor::Black => BLACK_BACK_RANK,
        }
    }

    /// 兵的起始行
    pub fn pawn_rank(&self) -> i8 {
        match self {
            PieceColor::White => WHITE_PAWN_RANK,
            PieceColor::Black => BLACK_PAWN_RANK,
        }
    }

    /// 兵的升变行（对方底线）
    pub fn promotion_rank(&self) -> i8 {
        self.other().back_rank()
    }

    /// 棋子标识中的阵营字符
    pub fn id_char(&self) -> char {
        match self {
            PieceColor::White => 'W',
            PieceColor::Black => 'B',
        }
    }
}

/// 棋子标识
///
/// 三个 ASCII 字符：阵营、初始类型、序号，例如 `WN1`。
/// 升变只改变 [`Piece::piece_type`]，标识保持不变。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceId([u8; 3]);

impl PieceId {
    /// 解析棋子标识，返回标识、类型和阵营
    pub fn parse(id: &str) -> Result<(PieceId, PieceType, PieceColor)> {
        let invalid = |reason| ChessError::InvalidPieceId {
            id: id.to_string(),
            reason,
        };

        let bytes: [u8; 3] = id
            .as_bytes()
            .try_into()
            .map_err(|_| invalid("piece id should be 3 characters"))?;
        if !bytes.is_ascii() {
            return Err(invalid("piece id should be ASCII"));
        }

        let color = match bytes[0] {
            b'W' => PieceColor::White,
            b'B' => PieceColor::Black,
            _ => return Err(invalid("first character should be W or B")),
        };
        let piece_type = Some(bytes[1])
            .filter(u8::is_ascii_uppercase)
            .and_then(|c| PieceType::from_id_char(c as char))
            .ok_or_else(|| invalid("second character should be a piece type"))?;

        Ok((PieceId(bytes), piece_type, color))
    }

    /// 按阵营、类型和序号生成标识（序号超过 9 时使用后续 ASCII 字符）
    pub(crate) fn generate(color: PieceColor, piece_type: PieceType, index: u8) -> PieceId {
        PieceId([
            color.id_char() as u8,
            piece_type.id_char() as u8,
            b'0'.saturating_add(index).min(b'~'),
        ])
    }

    pub fn as_str(&self) -> &str {
        // 构造时已保证为 ASCII
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceId({})", self.as_str())
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub piece_type: PieceType,
    pub color: PieceColor,
}

impl Piece {
    /// 从标识字符串创建棋子（类型和阵营由标识决定）
    pub fn from_id(id: &str) -> Result<Piece> {
        let (id, piece_type, color) = PieceId::parse(id)?;
        Ok(Piece {
            id,
            piece_type,
            color,
        })
    }

    /// 返回更换类型后的同一枚棋子
    pub fn promoted(self, piece_type: PieceType) -> Piece {
        Piece { piece_type, ..self }
    }

    /// 获取棋子分值
    pub fn value(&self) -> i32 {
        self.piece_type.value()
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.piece_type.to_fen_char(self.color)
    }

    /// 是否为指定阵营的指定类型
    pub fn is(&self, piece_type: PieceType, color: PieceColor) -> bool {
        self.piece_type == piece_type && self.color == color
    }
}

/// 坐标差
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    pub x: i8,
    pub y: i8,
}

impl Delta {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// 沿横线或直线
    pub fn is_straight(&self) -> bool {
        (self.x == 0) != (self.y == 0)
    }

    /// 沿斜线
    pub fn is_diagonal(&self) -> bool {
        self.x != 0 && self.x.abs() == self.y.abs()
    }

    /// 单位步长（各分量取符号）
    pub fn step(&self) -> Delta {
        Delta::new(self.x.signum(), self.y.signum())
    }

    /// 切比雪夫距离（王步数）
    pub fn distance(&self) -> i8 {
        self.x.abs().max(self.y.abs())
    }
}

/// 棋盘位置
///
/// `x` 为列（0 = a 线），`y` 为行（0 = 第 8 横线，黑方底线）。
/// 允许构造棋盘外的坐标，查询时按空格处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 列 (0-7)
    pub x: i8,
    /// 行 (0-7)
    pub y: i8,
}

impl Position {
    /// 创建新位置
    pub fn new(x: i8, y: i8) -> Option<Self> {
        let pos = Self { x, y };
        pos.is_valid().then_some(pos)
    }

    /// 创建新位置（不检查边界）
    pub const fn new_unchecked(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.x) && (0..BOARD_SIZE).contains(&self.y)
    }

    /// 获取偏移后的位置
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Position> {
        Position::new(self.x + dx, self.y + dy)
    }

    /// 转换为数组索引（按行优先，从 y=0 开始）
    pub fn to_index(&self) -> usize {
        self.y as usize * BOARD_SIZE as usize + self.x as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < SQUARE_COUNT {
            Some(Position {
                x: (index % BOARD_SIZE as usize) as i8,
                y: (index / BOARD_SIZE as usize) as i8,
            })
        } else {
            None
        }
    }
}

impl Sub for Position {
    type Output = Delta;

    fn sub(self, other: Position) -> Delta {
        Delta::new(axis_diff(self.x, other.x), axis_diff(self.y, other.y))
    }
}

/// 坐标分量之差，限制在 ±127 内，棋盘外的坐标也不会溢出
fn axis_diff(a: i8, b: i8) -> i8 {
    (i16::from(a) - i16::from(b)).clamp(-127, 127) as i8
}

impl Add<Delta> for Position {
    type Output = Position;

    fn add(self, delta: Delta) -> Position {
        Position::new_unchecked(self.x.saturating_add(delta.x), self.y.saturating_add(delta.y))
    }
}

impl FromStr for Position {
    type Err = ChessError;

    /// 解析代数记法，如 `e2`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ChessError::InvalidSquare {
            notation: s.to_string(),
        };
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(invalid());
        }
        let x = file as i8 - b'a' as i8;
        let y = BOARD_SIZE - (rank as i8 - b'0' as i8);
        Ok(Position::new_unchecked(x, y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            let file = (b'a' + self.x as u8) as char;
            write!(f, "{}{}", file, BOARD_SIZE - self.y)
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}
