//! 封鎖ゾーンの判定と期限切れの掃除
//! 期限はターン番号で管理し、タイマーは持たない。

use super::types::{BlockedZone, Position, Stone};

impl BlockedZone {
    /// 半径1（3x3）の封鎖ゾーンを作成する
    pub fn new(center: Position, expires_after_turn: u32, blocked_by: Stone) -> Self {
        Self {
            center,
            expires_after_turn,
            blocked_by,
            radius: 1,
        }
    }

    /// 一辺`size`マスの正方形に対応する半径を設定する（3 → 1, 5 → 2）
    /// 半径は`size / 2`の切り捨てなので、偶数は1大きい奇数と同じ範囲（4なら5x5）になり、0と1は中心のみを塞ぐ。
    /// プール読み込み時に1以上の奇数以外は拒否している。
    pub fn with_size(mut self, size: usize) -> Self {
        self.radius = size / 2;
        self
    }

    /// `current_turn`時点で有効か（期限のターン当日も有効）
    pub fn is_active(&self, current_turn: u32) -> bool {
        current_turn <= self.expires_after_turn
    }

    /// 有効なゾーンが指定マスを覆っているか
    pub fn covers(&self, position: Position, current_turn: u32) -> bool {
        self.is_active(current_turn) && self.center.chebyshev_distance(position) <= self.radius
    }
}

/// いずれかの有効なゾーンが指定マスを覆っていればtrue
pub fn is_position_blocked(position: Position, zones: &[BlockedZone], current_turn: u32) -> bool {
    zones.iter().any(|zone| zone.covers(position, current_turn))
}

/// 期限切れのゾーンを取り除いた新しいリストを返す
pub fn clean_expired_blocks(zones: &[BlockedZone], current_turn: u32) -> Vec<BlockedZone> {
    zones
        .iter()
        .filter(|zone| zone.is_active(current_turn))
        .copied()
        .collect()
}
