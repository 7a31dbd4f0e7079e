//! 搜索引擎
//!
//! 贪心的子力评估加可选的一层前瞻，不是对抗搜索：前瞻时取对方所有应着中
//! 对己方最有利的结果，而不是对方的最佳应着。棋力很弱，只作为陪练对手。

use std::cmp::Reverse;

use chess_engine::{Game, Move, MoveResult, PieceColor, PieceType};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluate::Evaluator;

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
}

/// AI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// 是否向前看对方的应着，关闭时只评估走子后的局面
    ///
    /// 前瞻只在己方走子的一层展开，对方那一层直接评估，所以更深的前瞻
    /// 与一层相同，不提供层数配置。
    pub lookahead: bool,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            lookahead: difficulty == Difficulty::Medium,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Easy)
    }
}

/// AI 引擎
pub struct AiEngine {
    config: AiConfig,
    rng: ChaCha8Rng,
    nodes_searched: u64,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
            nodes_searched: 0,
        }
    }

    /// 使用固定种子创建（同分走法的选择可复现）
    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            nodes_searched: 0,
        }
    }

    /// 从难度创建
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(AiConfig::from_difficulty(difficulty))
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 为当前走子方搜索走法
    pub fn search(&mut self, game: &Game) -> Option<Move> {
        let player = game.turn();
        self.calculate_next_move(game, player)
    }

    /// 以 `player` 的子力差为目标选择走法，没有合法走法时返回 None
    pub fn calculate_next_move(&mut self, game: &Game, player: PieceColor) -> Option<Move> {
        self.nodes_searched = 0;

        let ranked = self.rank_moves(game, self.config.lookahead, player);
        let best = ranked.first().copied();

        debug!(
            ?player,
            distinct_scores = ranked.len(),
            nodes = self.nodes_searched,
            best = ?best.map(|(mv, score)| (mv.to_string(), score)),
            "AI move selected"
        );

        best.map(|(mv, _)| mv)
    }

    /// 获取上次搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// 为走子方的所有合法走法打分
    ///
    /// 返回按分数降序排列、每个分数只保留一个走法的列表。同分走法先随机打乱，
    /// 保留哪一个是随机的。
    fn rank_moves(&mut self, game: &Game, lookahead: bool, player: PieceColor) -> Vec<(Move, i32)> {
        let mover = game.turn();
        let mut scored = Vec::new();

        for mv in game.all_moves_for(mover) {
            self.nodes_searched += 1;
            let Some(next) = Self::complete(game.do_move(mv.from, mv.to)) else {
                continue;
            };

            let score = if lookahead && mover == player {
                // 取对方应着后对己方最有利的分数；对方无子可动时直接评估
                match self.rank_moves(&next, false, player).first() {
                    Some(&(_, best)) => best,
                    None => Evaluator::material_balance(&next, player),
                }
            } else {
                Evaluator::material_balance(&next, player)
            };

            scored.push((mv, score));
        }

        scored.shuffle(&mut self.rng);
        scored.sort_by_key(|&(_, score)| Reverse(score));
        scored.dedup_by_key(|(_, score)| *score);
        scored
    }

    /// AI 的升变总是选择后
    fn complete(result: MoveResult) -> Option<Game> {
        match result {
            MoveResult::Success(game) => Some(game),
            MoveResult::Promotion(pending) => pending.select(PieceType::Queen).into_game(),
        }
    }
}
