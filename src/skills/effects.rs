//! スキル効果の実装
//! 各効果は入力の状態を書き換えず、新しい状態を返す純粋な遷移。適用できない場合はNone。

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use super::definition::{EffectKind, SkillParams};
use crate::game::zones::clean_expired_blocks;
use crate::game::{BlockedZone, GameState, HistoryMove, Phase, Position, Stone};

/// 反転率の既定値（%）
pub const DEFAULT_FLIP_PERCENT: u32 = 30;
/// 封鎖ゾーンの一辺の既定値
pub const DEFAULT_ZONE_SIZE: usize = 3;
/// 封鎖ゾーンの持続ターン数
pub const ZONE_DURATION_TURNS: u32 = 2;

/// スキルを使うプレイヤー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor<'a> {
    pub id: &'a str,
    pub color: Stone,
}

/// 効果の実行に渡される入力
#[derive(Debug, Clone, Copy)]
pub struct SkillContext<'a> {
    pub game_state: &'a GameState,
    pub actor: Actor<'a>,
    pub target_position: Option<Position>,
    /// リプレイ時に記録済みの反転マスを指定する（乱数を引き直さない）
    pub recorded_flips: Option<&'a [Position]>,
}

impl<'a> SkillContext<'a> {
    pub fn new(game_state: &'a GameState, actor: Actor<'a>, target_position: Option<Position>) -> Self {
        Self {
            game_state,
            actor,
            target_position,
            recorded_flips: None,
        }
    }

    pub fn with_recorded_flips(mut self, flips: Option<&'a [Position]>) -> Self {
        self.recorded_flips = flips;
        self
    }
}

/// 効果の実行結果
/// `affected`は効果が触れたマス（反転、配置、取り消し、ゾーン中心）で、履歴とリプレイに使う
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOutcome {
    pub effect: EffectKind,
    pub state: GameState,
    pub affected: Vec<Position>,
}

impl EffectKind {
    /// 効果を適用する
    pub fn apply<R: Rng + ?Sized>(
        self,
        context: &SkillContext<'_>,
        params: &SkillParams,
        rng: &mut R,
    ) -> Option<SkillOutcome> {
        let (state, affected) = match self {
            EffectKind::FlipStones => flip_stones(context, params, rng)?,
            EffectKind::UndoMove => undo_move(context)?,
            EffectKind::PlaceStone => place_stone(context)?,
            EffectKind::BlockZone => block_zone(context, params)?,
            EffectKind::DoubleMove => double_move(context)?,
        };

        Some(SkillOutcome {
            effect: self,
            state,
            affected,
        })
    }
}

/// 盤上の石の一部をランダムに選んで色を反転する
/// 反転数は `max(1, floor(石数 * flipPercent / 100))`
fn flip_stones<R: Rng + ?Sized>(
    context: &SkillContext<'_>,
    params: &SkillParams,
    rng: &mut R,
) -> Option<(GameState, Vec<Position>)> {
    let state = context.game_state;
    let occupied = state.board.occupied_positions();
    if occupied.is_empty() {
        return None;
    }

    let to_flip: Vec<Position> = match context.recorded_flips {
        Some(recorded) => {
            // 記録が空・重複・空きマスを含む場合は壊れた記録として拒否する
            let mut seen = HashSet::with_capacity(recorded.len());
            if recorded.is_empty()
                || recorded
                    .iter()
                    .any(|&pos| state.board.stone_at(pos).is_none() || !seen.insert(pos))
            {
                return None;
            }
            recorded.to_vec()
        }
        None => {
            let percent = params
                .flip_percent
                .filter(|&p| p > 0)
                .unwrap_or(DEFAULT_FLIP_PERCENT)
                .min(100) as usize;
            let count = (occupied.len() * percent / 100).max(1);
            occupied.choose_multiple(rng, count).copied().collect()
        }
    };

    let mut next = state.clone();
    next.board = state.board.flip_positions(&to_flip);
    Some((next, to_flip))
}

/// 直近の着手を取り消す
/// 後ろからskillエントリを飛ばしてplaceエントリを探し、それ以降の履歴を切り捨てる
fn undo_move(context: &SkillContext<'_>) -> Option<(GameState, Vec<Position>)> {
    let state = context.game_state;
    let index = state.history.iter().rposition(HistoryMove::is_place)?;
    let undone = &state.history[index];
    let position = undone.position?;

    let mut next = state.clone();
    next.board = state.board.with_cleared(position);
    next.history.truncate(index);
    next.current_player = undone.player;
    next.turn = state.turn.saturating_sub(1).max(1);
    Some((next, vec![position]))
}

/// 指定マスに自分の石を置く（クローン）
/// 封鎖ゾーンは参照しない。勝利判定はエンジン側で行う
fn place_stone(context: &SkillContext<'_>) -> Option<(GameState, Vec<Position>)> {
    let state = context.game_state;
    let target = context.target_position?;
    if !state.board.is_empty(target) {
        return None;
    }

    let mut next = state.clone();
    next.board = state.board.with_stone(target, context.actor.color);
    next.history.push(HistoryMove::place(context.actor.color, target));
    next.blocked_zones = clean_expired_blocks(&state.blocked_zones, state.turn);
    next.current_player = state.current_player.opposite();
    next.turn = state.turn + 1;
    next.remaining_moves = 1;
    Some((next, vec![target]))
}

/// 指定マス（省略時は盤面中央）を中心に封鎖ゾーンを作る
fn block_zone(context: &SkillContext<'_>, params: &SkillParams) -> Option<(GameState, Vec<Position>)> {
    let state = context.game_state;
    let center = context.target_position.unwrap_or_else(|| state.board.center());
    if !state.board.contains(center) {
        return None;
    }

    let size = params.size.unwrap_or(DEFAULT_ZONE_SIZE);
    let zone = BlockedZone::new(center, state.turn + ZONE_DURATION_TURNS, context.actor.color).with_size(size);

    let mut next = state.clone();
    next.blocked_zones.push(zone);
    Some((next, vec![center]))
}

/// この手番で2手打てるようにする
fn double_move(context: &SkillContext<'_>) -> Option<(GameState, Vec<Position>)> {
    let state = context.game_state;
    if state.phase != Phase::Playing || state.remaining_moves != 1 {
        return None;
    }

    let mut next = state.clone();
    next.remaining_moves = 2;
    Some((next, Vec::new()))
}
