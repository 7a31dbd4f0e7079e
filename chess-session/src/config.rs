//! 会话配置

use std::path::Path;

use chess_ai::{AiConfig, AiEngine};
use chess_engine::PieceColor;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// 会话配置（JSON 格式，缺省字段使用默认值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 是否启用 AI 对手
    pub ai_enabled: bool,
    /// AI 执哪一方
    pub ai_color: PieceColor,
    /// AI 搜索配置
    pub ai: AiConfig,
    /// 固定随机种子（用于复现对局）
    pub ai_seed: Option<u64>,
    /// 自对弈的最大步数
    pub max_plies: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            ai_color: PieceColor::Black,
            ai: AiConfig::default(),
            ai_seed: None,
            max_plies: 200,
        }
    }
}

impl SessionConfig {
    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("已加载配置: {:?}", path);
        Ok(config)
    }

    /// 按配置创建 AI 引擎
    pub fn engine(&self) -> AiEngine {
        match self.ai_seed {
            Some(seed) => AiEngine::with_seed(self.ai.clone(), seed),
            None => AiEngine::new(self.ai.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_ai::Difficulty;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert!(config.ai_enabled);
        assert_eq!(config.ai_color, PieceColor::Black);
        assert_eq!(config.ai.difficulty, Difficulty::Easy);
        assert_eq!(config.max_plies, 200);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json(r#"{"ai_color": "White", "ai_seed": 9}"#).unwrap();
        assert_eq!(config.ai_color, PieceColor::White);
        assert_eq!(config.ai_seed, Some(9));
        assert!(config.ai_enabled);
        assert_eq!(config.ai, AiConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(SessionConfig::from_json("{ai_enabled: yes}").is_err());
        assert!(SessionConfig::from_json(r#"{"ai_color": "Green"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ai_enabled": false, "ai": {{"difficulty": "Medium", "lookahead": true}}}}"#
        )
        .unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert!(!config.ai_enabled);
        assert_eq!(config.ai.difficulty, Difficulty::Medium);
        assert!(config.ai.lookahead);

        assert!(SessionConfig::load("/nonexistent/session.json").is_err());
    }
}
