use anyhow::{Context, Result};
use chess_engine::{Fen, MoveResult, PieceColor, PieceType};
use chess_session::{Session, SessionConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AI 自对弈：会话中的 AI 执一方，另一个 AI 引擎代替玩家执另一方
/// （会话 AI 关闭时由它执双方）
#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_session=debug".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::load(&path)
            .with_context(|| format!("无法加载配置文件 {path}"))?,
        None => SessionConfig::default(),
    };
    info!(?config, "国际象棋自对弈启动");

    let mut opponent = config.engine();
    let max_plies = config.max_plies;
    let mut session = Session::new(config);

    for _ in 0..max_plies {
        if session.game_over().is_some() {
            break;
        }

        if session.should_ai_move() {
            session.run_ai_turn().await?;
            continue;
        }

        let Some(game) = session.game() else {
            break;
        };
        let Some(mv) = opponent.search(game) else {
            warn!("对手无法找到合法走法");
            break;
        };
        info!(%mv, color = ?game.turn(), "对手走子");
        if let MoveResult::Promotion(_) = session.try_move(mv.from, mv.to)? {
            session.choose_promotion(PieceType::Queen)?;
        }
    }

    let game = session.game().context("对局停在升变选择上")?;
    info!(
        state = ?game.game_state(),
        plies = game.history().len(),
        "对局结束"
    );
    for color in [PieceColor::White, PieceColor::Black] {
        let captured: Vec<_> = game
            .captured_pieces_for(color)
            .iter()
            .map(|piece| piece.id.to_string())
            .collect();
        info!(?color, value = game.value_for(color), ?captured, "子力");
    }
    info!(fen = %Fen::board_to_string(game.board()), "最终局面");

    Ok(())
}
