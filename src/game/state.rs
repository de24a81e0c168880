//! ゲーム状態管理モジュール
//! 盤面、手番、フェーズ、プレイヤー、履歴、封鎖ゾーンをまとめた値型を定義する。

use super::board::Board;
use super::types::{BlockedZone, HistoryMove, MoveKind, MoveRecord, Outcome, Phase, Stone};
use crate::skills::SkillCard;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 1人分のプレイヤー状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub username: String,
    pub color: Stone,
    pub skill_cards: Vec<SkillCard>,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, username: impl Into<String>, color: Stone) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            color,
            skill_cards: Vec::new(),
        }
    }

    pub fn with_cards(mut self, cards: Vec<SkillCard>) -> Self {
        self.skill_cards = cards;
        self
    }

    pub fn find_card(&self, card_id: &str) -> Option<&SkillCard> {
        self.skill_cards.iter().find(|card| card.id == card_id)
    }

    /// 未使用のカード
    pub fn available_cards(&self) -> impl Iterator<Item = &SkillCard> {
        self.skill_cards.iter().filter(|card| !card.used)
    }
}

/// 黒白両プレイヤー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub black: PlayerState,
    pub white: PlayerState,
}

impl Players {
    pub fn get(&self, color: Stone) -> &PlayerState {
        match color {
            Stone::Black => &self.black,
            Stone::White => &self.white,
        }
    }

    pub fn get_mut(&mut self, color: Stone) -> &mut PlayerState {
        match color {
            Stone::Black => &mut self.black,
            Stone::White => &mut self.white,
        }
    }
}

/// ゲーム全体の状態
/// 遷移は常に新しい`GameState`を返し、既存の値は書き換えない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: Uuid,
    pub board: Board,
    pub current_player: Stone,
    pub phase: Phase,
    pub winner: Option<Outcome>,
    pub players: Players,
    pub history: Vec<HistoryMove>,
    pub turn: u32,
    pub remaining_moves: u32,
    pub blocked_zones: Vec<BlockedZone>,
}

impl GameState {
    /// 対局開始前（waiting）の状態を作成する
    pub fn new_waiting(board_size: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            board: Board::new(board_size),
            current_player: Stone::Black,
            phase: Phase::Waiting,
            winner: None,
            players: Players {
                black: PlayerState::new("", "Black", Stone::Black),
                white: PlayerState::new("", "White", Stone::White),
            },
            history: Vec::new(),
            turn: 1,
            remaining_moves: 1,
            blocked_zones: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// 手番プレイヤーの状態
    pub fn current_player_state(&self) -> &PlayerState {
        self.players.get(self.current_player)
    }

    /// プレイヤーIDから色を引く
    pub fn color_of(&self, player_id: &str) -> Option<Stone> {
        [Stone::Black, Stone::White]
            .into_iter()
            .find(|&color| self.players.get(color).id == player_id)
    }

    /// 直前の着手位置
    pub fn last_placement(&self) -> Option<&HistoryMove> {
        self.history.iter().rev().find(|entry| entry.is_place())
    }

    /// 永続化用の手の記録に変換する
    pub fn move_records(&self) -> Vec<MoveRecord> {
        self.history
            .iter()
            .enumerate()
            .map(|(index, entry)| MoveRecord {
                move_number: index + 1,
                player: entry.player,
                row: entry.position.map(|p| p.row),
                col: entry.position.map(|p| p.col),
                skill_used: match entry.kind {
                    MoveKind::Skill => entry.skill_id.clone(),
                    MoveKind::Place => None,
                },
            })
            .collect()
    }
}
