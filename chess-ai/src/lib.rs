//! 国际象棋 AI 引擎
//!
//! 包含:
//! - 子力评估
//! - 带一层可选前瞻的贪心选着（非对抗搜索）

mod evaluate;
mod search;

pub use evaluate::Evaluator;
pub use search::{AiConfig, AiEngine, Difficulty};
