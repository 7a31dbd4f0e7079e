//! 国际象棋对局会话
//!
//! 包含:
//! - 会话配置（JSON）
//! - 当前局面、悔棋/重走栈、升变选择
//! - 后台 AI 走子与过期结果丢弃

mod config;
mod error;
mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::{AiTask, Session};
