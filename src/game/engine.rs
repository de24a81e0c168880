//! 手番の状態遷移を担うゲームエンジン
//! 着手とスキル使用を検証・適用し、勝敗判定とターン進行を行う。
//! 不正な操作はすべてNoneで返し、エラーにはしない。

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::board::Board;
use super::rules::GomokuRules;
use super::state::{GameState, PlayerState, Players};
use super::types::{HistoryMove, Outcome, Phase, Position, Stone};
use super::zones::{clean_expired_blocks, is_position_blocked};
use crate::skills::{Actor, EffectKind, SkillContext, SkillOutcome, SkillRegistry};

/// 記録・リプレイ用の操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    Place {
        position: Position,
    },
    Skill {
        player: Stone,
        card_id: String,
        target: Option<Position>,
        /// 反転効果で実際に反転したマス（記録済みなら乱数を使わない）
        #[serde(default)]
        flipped: Option<Vec<Position>>,
    },
    Resign {
        player: Stone,
    },
}

/// ゲームエンジン
/// スキル登録簿をインスタンスとして保持する（ルームごとに共有・注入する）
#[derive(Debug, Clone)]
pub struct GameEngine {
    registry: Arc<SkillRegistry>,
}

impl GameEngine {
    pub fn new(registry: Arc<SkillRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// 対局開始済み（playing）の初期状態を作成する
    pub fn create_initial_state(board_size: usize, black: PlayerState, white: PlayerState) -> GameState {
        let mut state = GameState::new_waiting(board_size);
        state.players = Players {
            black: PlayerState { color: Stone::Black, ..black },
            white: PlayerState { color: Stone::White, ..white },
        };
        state.phase = Phase::Playing;
        state
    }

    /// waiting状態の対局を開始する
    /// 盤面を空に戻し、黒番・1ターン目・残り手数1から始める
    pub fn start_game(state: &GameState, black: PlayerState, white: PlayerState) -> Option<GameState> {
        if state.phase != Phase::Waiting {
            debug!(phase = ?state.phase, "start rejected: game is not waiting");
            return None;
        }

        let mut next = Self::create_initial_state(state.board.size(), black, white);
        next.id = state.id;
        info!(game_id = %next.id, "game started");
        Some(next)
    }

    /// 直前の着手で5連ができたか
    pub fn check_winner(board: &Board, last_position: Position, color: Stone) -> Option<Stone> {
        GomokuRules::check_winner(board, last_position, color)
    }

    /// 手番プレイヤーの石を置く
    #[instrument(level = "debug", skip(state), fields(turn = state.turn, player = ?state.current_player))]
    pub fn place_stone(state: &GameState, position: Position) -> Option<GameState> {
        if state.phase != Phase::Playing {
            debug!("placement rejected: game is not playing");
            return None;
        }
        if !state.board.contains(position) || !state.board.is_empty(position) {
            debug!("placement rejected: position unavailable");
            return None;
        }
        if is_position_blocked(position, &state.blocked_zones, state.turn) {
            debug!("placement rejected: position blocked");
            return None;
        }

        let mover = state.current_player;
        let mut next = state.clone();
        next.board = state.board.with_stone(position, mover);
        next.history.push(HistoryMove::place(mover, position));
        // 期限判定は着手前のターン番号で行う
        next.blocked_zones = clean_expired_blocks(&state.blocked_zones, state.turn);

        if let Some(winner) = GomokuRules::check_winner(&next.board, position, mover) {
            next.phase = Phase::Ended;
            next.winner = Some(Outcome::Win(winner));
            info!(game_id = %next.id, winner = ?winner, "game won");
            return Some(next);
        }

        let remaining = state.remaining_moves.saturating_sub(1);
        if remaining == 0 {
            next.current_player = mover.opposite();
            next.turn = state.turn + 1;
            next.remaining_moves = 1;
        } else {
            next.remaining_moves = remaining;
        }

        Self::finish_if_full(&mut next);
        Some(next)
    }

    /// スキルカードを使う（乱数はスレッドローカルRNG）
    pub fn use_skill(
        &self,
        state: &GameState,
        acting: Stone,
        card_id: &str,
        target: Option<Position>,
    ) -> Option<GameState> {
        self.use_skill_with_rng(state, acting, card_id, target, &mut rand::thread_rng())
    }

    /// 乱数源を指定してスキルカードを使う
    pub fn use_skill_with_rng<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        acting: Stone,
        card_id: &str,
        target: Option<Position>,
        rng: &mut R,
    ) -> Option<GameState> {
        self.resolve_skill(state, acting, card_id, target, None, rng)
    }

    #[instrument(level = "debug", skip(self, state, recorded_flips, rng), fields(turn = state.turn))]
    fn resolve_skill<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        acting: Stone,
        card_id: &str,
        target: Option<Position>,
        recorded_flips: Option<&[Position]>,
        rng: &mut R,
    ) -> Option<GameState> {
        if state.phase != Phase::Playing {
            debug!("skill rejected: game is not playing");
            return None;
        }
        if acting != state.current_player {
            debug!("skill rejected: not the acting player's turn");
            return None;
        }

        let player = state.players.get(acting);
        let card = match player.find_card(card_id) {
            Some(card) if !card.used => card,
            Some(_) => {
                debug!("skill rejected: card already used");
                return None;
            }
            None => {
                debug!("skill rejected: card not held by player");
                return None;
            }
        };

        let context = SkillContext::new(state, Actor { id: &player.id, color: acting }, target)
            .with_recorded_flips(recorded_flips);
        if !self.registry.can_use(&card.skill_id, &context) {
            debug!(skill_id = %card.skill_id, "skill rejected: conditions not met");
            return None;
        }

        let Some(outcome) = self.registry.execute(&card.skill_id, &context, rng) else {
            debug!(skill_id = %card.skill_id, "skill rejected: effect could not be applied");
            return None;
        };

        let skill_id = card.skill_id.clone();
        let SkillOutcome { effect, state: mut next, affected } = outcome;

        if let Some(used) = next
            .players
            .get_mut(acting)
            .skill_cards
            .iter_mut()
            .find(|c| c.id == card_id)
        {
            used.used = true;
        }
        next.history
            .push(HistoryMove::skill(acting, skill_id.as_str(), card_id, target, affected.clone()));

        if effect.changes_lines() {
            if let Some(winner) = Self::winner_after_effect(&next.board, &affected, acting) {
                next.phase = Phase::Ended;
                next.winner = Some(Outcome::Win(winner));
                next.current_player = state.current_player;
                next.turn = state.turn;
                info!(game_id = %next.id, winner = ?winner, skill_id = %skill_id, "game won by skill");
                return Some(next);
            }
            if effect == EffectKind::PlaceStone {
                Self::finish_if_full(&mut next);
            }
        }

        debug!(skill_id = %skill_id, effect = %effect, "skill applied");
        Some(next)
    }

    /// 効果で変化したマスを起点に勝利判定をやり直す（使用者の色を優先）
    fn winner_after_effect(board: &Board, affected: &[Position], acting: Stone) -> Option<Stone> {
        [acting, acting.opposite()].into_iter().find(|&color| {
            affected.iter().any(|&pos| {
                board.stone_at(pos) == Some(color) && GomokuRules::check_winner(board, pos, color).is_some()
            })
        })
    }

    fn finish_if_full(state: &mut GameState) {
        if state.phase == Phase::Playing && state.board.is_full() {
            state.phase = Phase::Ended;
            state.winner = Some(Outcome::Draw);
            info!(game_id = %state.id, "game drawn: board full");
        }
    }

    /// 投了（時間切れ・退出も同じ経路）
    pub fn resign(state: &GameState, player: Stone) -> Option<GameState> {
        if state.phase != Phase::Playing {
            return None;
        }

        let mut next = state.clone();
        next.phase = Phase::Ended;
        next.winner = Some(Outcome::Win(player.opposite()));
        info!(game_id = %next.id, loser = ?player, "player resigned");
        Some(next)
    }

    /// 記録された操作を1つ適用する
    pub fn apply<R: Rng + ?Sized>(&self, state: &GameState, action: &GameAction, rng: &mut R) -> Option<GameState> {
        match action {
            GameAction::Place { position } => Self::place_stone(state, *position),
            GameAction::Skill {
                player,
                card_id,
                target,
                flipped,
            } => self.resolve_skill(state, *player, card_id, *target, flipped.as_deref(), rng),
            GameAction::Resign { player } => Self::resign(state, *player),
        }
    }

    /// 初期状態から操作列を順に適用する
    /// 途中で1つでも拒否されたらNone
    pub fn replay(&self, initial: &GameState, actions: &[GameAction]) -> Option<GameState> {
        let mut rng = rand::thread_rng();
        actions
            .iter()
            .try_fold(initial.clone(), |state, action| self.apply(&state, action, &mut rng))
    }
}
