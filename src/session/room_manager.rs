//! 対局ルーム管理モジュール
//! ルームの作成・参加・退出と、ルーム単位で直列化された着手・スキル操作を担当する。
//! 操作はDashMapのエントリをロックしている間に行うため、同じルームへの操作は1つずつ処理される。

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{GameConfig, SystemLimits, BOARD_SIZE_RANGE};
use crate::error::{GameError, Result};
use crate::game::{GameEngine, GameState, Phase, PlayerState, Position, Stone};
use crate::skills::{SkillPoolManager, SkillRegistry};

/// ルーム作成時の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOptions {
    pub board_size: usize,
    pub skill_count_per_player: usize,
    pub skill_pool_id: String,
    pub enable_skills: bool,
}

impl RoomOptions {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            board_size: config.default_board_size,
            skill_count_per_player: config.default_skill_count_per_player,
            skill_pool_id: config.default_skill_pool_id.clone(),
            enable_skills: config.enable_skills,
        }
    }

    /// 外部から渡された設定の検査
    pub fn validate(&self) -> Result<()> {
        if !BOARD_SIZE_RANGE.contains(&self.board_size) {
            return Err(GameError::InvalidRoomOptions {
                field: "board_size".to_string(),
                value: self.board_size.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

/// 着席中のプレイヤー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: String,
    pub username: String,
    pub color: Stone,
}

/// 1つの対局ルーム
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub options: RoomOptions,
    pub seats: Vec<Seat>,
    pub state: GameState,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Room {
    fn new(options: RoomOptions) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            state: GameState::new_waiting(options.board_size),
            options,
            seats: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn seat_of(&self, player_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.player_id == player_id)
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= 2
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// ルームの管理を行うメイン構造体
#[derive(Debug, Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<Uuid, Room>>,
    /// プレイヤーID → 参加中のルームID
    player_rooms: Arc<DashMap<String, Uuid>>,
    /// 作成予約を含むルーム数（上限判定を原子的に行う）
    room_slots: Arc<AtomicUsize>,
    pools: Arc<SkillPoolManager>,
    /// プールID → そのプールの定義だけを持つエンジン
    engines: Arc<HashMap<String, GameEngine>>,
    /// スキル無効のルーム用
    plain_engine: GameEngine,
    max_rooms: usize,
    room_timeout_minutes: i64,
}

impl RoomManager {
    /// プールごとにスキル登録簿を組み立ててルームマネージャーを作成
    /// プール間で同じスキルIDが別の内容で定義されていても、各ルームは自分のプールの定義を使う
    pub fn new(pools: Arc<SkillPoolManager>, limits: &SystemLimits) -> Self {
        let engines = pools
            .all_pools()
            .into_iter()
            .map(|pool| (pool.id.clone(), GameEngine::new(Arc::new(pool.build_registry()))))
            .collect();
        Self {
            rooms: Arc::new(DashMap::new()),
            player_rooms: Arc::new(DashMap::new()),
            room_slots: Arc::new(AtomicUsize::new(0)),
            pools,
            engines: Arc::new(engines),
            plain_engine: GameEngine::new(Arc::new(SkillRegistry::with_default_effects())),
            max_rooms: limits.max_rooms,
            room_timeout_minutes: limits.room_timeout_minutes,
        }
    }

    /// ルームの設定に対応するエンジン
    pub fn engine_for(&self, options: &RoomOptions) -> &GameEngine {
        if !options.enable_skills {
            return &self.plain_engine;
        }
        self.engines.get(&options.skill_pool_id).unwrap_or(&self.plain_engine)
    }

    /// 新しいルームを作成する
    /// 盤面サイズが範囲外、ルーム数の上限、またはスキル有効時に未知のプールを指定した場合はエラー
    pub fn create_room(&self, options: RoomOptions) -> Result<Uuid> {
        options.validate()?;
        if options.enable_skills {
            self.pools.load_pool(&options.skill_pool_id)?;
        }
        self.room_slots
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                (count < self.max_rooms).then_some(count + 1)
            })
            .map_err(|_| GameError::RoomLimitExceeded { max: self.max_rooms })?;

        let room = Room::new(options);
        let room_id = room.id;
        info!(room_id = %room_id, pool_id = %room.options.skill_pool_id, "room created");
        self.rooms.insert(room_id, room);
        Ok(room_id)
    }

    /// ルームに参加する
    /// 1人目は黒、2人目は白。2人揃った時点でカードを配って対局を開始する
    /// 別のルームに参加中のプレイヤーはエラー
    pub fn join_room(&self, room_id: Uuid, player_id: &str, username: &str) -> Result<Stone> {
        let mut room = self.rooms.get_mut(&room_id).ok_or(GameError::RoomNotFound { room_id })?;

        if let Some(seat) = room.seat_of(player_id) {
            return Ok(seat.color);
        }
        if room.is_full() || room.state.phase != Phase::Waiting {
            return Err(GameError::RoomFull { room_id });
        }

        match self.player_rooms.entry(player_id.to_string()) {
            Entry::Occupied(entry) if *entry.get() != room_id => {
                return Err(GameError::AlreadyInRoom {
                    player_id: player_id.to_string(),
                    room_id: *entry.get(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(room_id);
            }
        }

        let color = match room.seats.first() {
            Some(seat) => seat.color.opposite(),
            None => Stone::Black,
        };
        room.seats.push(Seat {
            player_id: player_id.to_string(),
            username: username.to_string(),
            color,
        });
        room.touch();
        info!(room_id = %room_id, player_id, color = ?color, "player joined");

        if room.is_full() {
            let started = self.start_game(&room)?;
            room.state = started;
        }

        Ok(color)
    }

    fn start_game(&self, room: &Room) -> Result<GameState> {
        let mut rng = rand::thread_rng();
        let mut deal = |color: Stone| -> Result<PlayerState> {
            let cards = if room.options.enable_skills {
                self.pools.draw_cards(
                    &room.options.skill_pool_id,
                    Some(room.options.skill_count_per_player),
                    &mut rng,
                )?
            } else {
                Vec::new()
            };
            let player = match room.seats.iter().find(|seat| seat.color == color) {
                Some(seat) => PlayerState::new(seat.player_id.as_str(), seat.username.as_str(), color),
                None => PlayerState::new("", "", color),
            };
            Ok(player.with_cards(cards))
        };

        let black = deal(Stone::Black)?;
        let white = deal(Stone::White)?;
        GameEngine::start_game(&room.state, black, white).ok_or(GameError::RoomFull { room_id: room.id })
    }

    /// ルームから退出する
    /// 対局中なら投了扱いにし、誰もいなくなったルームは破棄する
    /// 戻り値は退出後の状態（どのルームにもいなければNone）
    pub fn leave_room(&self, player_id: &str) -> Result<Option<GameState>> {
        let Some((_, room_id)) = self.player_rooms.remove(player_id) else {
            return Ok(None);
        };

        let (state, empty) = {
            let mut room = self.rooms.get_mut(&room_id).ok_or(GameError::RoomNotFound { room_id })?;
            if let Some(color) = room.seat_of(player_id).map(|seat| seat.color) {
                if let Some(resigned) = GameEngine::resign(&room.state, color) {
                    room.state = resigned;
                }
            }
            room.seats.retain(|seat| seat.player_id != player_id);
            room.touch();
            (room.state.clone(), room.seats.is_empty())
        };

        info!(room_id = %room_id, player_id, "player left");
        if empty {
            self.remove_room(room_id);
            info!(room_id = %room_id, "room closed");
        }
        Ok(Some(state))
    }

    /// 着手する。手番でないプレイヤーやルール違反はOk(None)
    pub fn place_stone(&self, room_id: Uuid, player_id: &str, position: Position) -> Result<Option<GameState>> {
        self.act(room_id, player_id, |_, state, color| {
            if color != state.current_player {
                return None;
            }
            GameEngine::place_stone(state, position)
        })
    }

    /// スキルカードを使う
    pub fn use_skill(
        &self,
        room_id: Uuid,
        player_id: &str,
        card_id: &str,
        target: Option<Position>,
    ) -> Result<Option<GameState>> {
        self.act(room_id, player_id, |engine, state, color| {
            engine.use_skill(state, color, card_id, target)
        })
    }

    /// 投了する
    pub fn resign(&self, room_id: Uuid, player_id: &str) -> Result<Option<GameState>> {
        self.act(room_id, player_id, |_, state, color| GameEngine::resign(state, color))
    }

    /// ルームをロックしたまま操作を適用し、成功した場合のみ状態を差し替える
    fn act<F>(&self, room_id: Uuid, player_id: &str, action: F) -> Result<Option<GameState>>
    where
        F: FnOnce(&GameEngine, &GameState, Stone) -> Option<GameState>,
    {
        let mut room = self.rooms.get_mut(&room_id).ok_or(GameError::RoomNotFound { room_id })?;
        let Some(color) = room.seat_of(player_id).map(|seat| seat.color) else {
            debug!(room_id = %room_id, player_id, "action rejected: player not seated");
            return Ok(None);
        };

        let next = action(self.engine_for(&room.options), &room.state, color);
        if let Some(next) = &next {
            room.state = next.clone();
            room.touch();
        }
        Ok(next)
    }

    pub fn get_state(&self, room_id: Uuid) -> Result<GameState> {
        self.rooms
            .get(&room_id)
            .map(|room| room.state.clone())
            .ok_or(GameError::RoomNotFound { room_id })
    }

    pub fn get_room(&self, room_id: Uuid) -> Option<Room> {
        self.rooms.get(&room_id).map(|room| room.clone())
    }

    pub fn player_room(&self, player_id: &str) -> Option<Uuid> {
        self.player_rooms.get(player_id).map(|entry| *entry.value())
    }

    /// 参加者待ちのルーム（開始前で空席があるもの）
    pub fn waiting_rooms(&self) -> Vec<Uuid> {
        self.rooms
            .iter()
            .filter(|entry| entry.value().state.phase == Phase::Waiting && !entry.value().is_full())
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_room(&self, room_id: Uuid) -> Option<Room> {
        let (_, room) = self.rooms.remove(&room_id)?;
        self.room_slots.fetch_sub(1, Ordering::SeqCst);
        Some(room)
    }

    /// 一定時間操作のないルームを破棄する
    pub fn cleanup_inactive_rooms(&self) -> usize {
        let cutoff_time = Utc::now() - Duration::minutes(self.room_timeout_minutes);

        let expired_ids: Vec<Uuid> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().last_activity < cutoff_time)
            .map(|entry| *entry.key())
            .collect();

        let mut removed_count = 0;
        for room_id in expired_ids {
            if let Some(room) = self.remove_room(room_id) {
                for seat in &room.seats {
                    self.player_rooms.remove(&seat.player_id);
                }
                removed_count += 1;
            }
        }

        if removed_count > 0 {
            info!(removed_count, "inactive rooms cleaned up");
        }
        removed_count
    }
}
