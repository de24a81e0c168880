//! ゲームの基本型定義モジュール
//! スキル五目並べで使用される石、座標、フェーズ、履歴などの型を定義する。

use serde::{Deserialize, Serialize};

/// 盤面の各マスの状態を表現するenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// マスに置かれている石を返す（空ならNone）
    pub fn stone(self) -> Option<Stone> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Stone::Black),
            Cell::White => Some(Stone::White),
        }
    }
}

/// 石の色（＝プレイヤー）を表すenum
/// 先手は黒、後手は白
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    /// 相手の色を返す
    pub fn opposite(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    /// 石の色を対応するセル状態に変換する
    pub fn to_cell(self) -> Cell {
        match self {
            Stone::Black => Cell::Black,
            Stone::White => Cell::White,
        }
    }
}

/// 盤面上の座標
/// 有効範囲は盤面サイズに依存するため、範囲チェックは`is_valid`で行う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 座標が`size x size`の盤面内にあるかチェックする
    pub fn is_valid(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// 指定方向へ`distance`マス進んだ座標を返す
    /// 盤面外（負の座標や`size`以上）になる場合はNone
    pub fn offset(&self, dr: isize, dc: isize, distance: isize, size: usize) -> Option<Position> {
        let row = self.row.checked_add_signed(dr * distance)?;
        let col = self.col.checked_add_signed(dc * distance)?;
        let next = Position { row, col };
        next.is_valid(size).then_some(next)
    }

    /// チェビシェフ距離（縦横斜めの最大差）
    pub fn chebyshev_distance(&self, other: Position) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

/// ゲームの進行フェーズ
/// waiting → playing → ended の一方向にのみ遷移する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Playing,
    Ended,
}

/// 終局結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win(Stone),
    Draw,
}

impl Outcome {
    /// 勝者の色（引き分けならNone）
    pub fn winner(self) -> Option<Stone> {
        match self {
            Outcome::Win(stone) => Some(stone),
            Outcome::Draw => None,
        }
    }
}

/// 履歴エントリの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Place,
    Skill,
}

/// 履歴の1エントリ
/// 着手（place）とスキル使用（skill）の両方を記録する。
/// スキルの場合は乱数で決まった結果（反転したマスなど）も`resolved`に残し、リプレイで再現できるようにする
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMove {
    pub kind: MoveKind,
    pub player: Stone,
    pub position: Option<Position>,
    pub skill_id: Option<String>,
    pub card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved: Vec<Position>,
}

impl HistoryMove {
    /// 着手エントリを作成する
    pub fn place(player: Stone, position: Position) -> Self {
        Self {
            kind: MoveKind::Place,
            player,
            position: Some(position),
            skill_id: None,
            card_id: None,
            resolved: Vec::new(),
        }
    }

    /// スキル使用エントリを作成する
    pub fn skill(
        player: Stone,
        skill_id: impl Into<String>,
        card_id: impl Into<String>,
        target: Option<Position>,
        resolved: Vec<Position>,
    ) -> Self {
        Self {
            kind: MoveKind::Skill,
            player,
            position: target,
            skill_id: Some(skill_id.into()),
            card_id: Some(card_id.into()),
            resolved,
        }
    }

    pub fn is_place(&self) -> bool {
        self.kind == MoveKind::Place
    }
}

/// 封鎖ゾーン
/// `center`からチェビシェフ距離`radius`以内のマスは`expires_after_turn`ターンまで着手禁止
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedZone {
    pub center: Position,
    pub expires_after_turn: u32,
    pub blocked_by: Stone,
    #[serde(default = "default_zone_radius")]
    pub radius: usize,
}

fn default_zone_radius() -> usize {
    1
}

/// 永続化用の手の記録 `(手数, プレイヤー, 行, 列, 使用スキル)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub move_number: usize,
    pub player: Stone,
    pub row: Option<usize>,
    pub col: Option<usize>,
    pub skill_used: Option<String>,
}
