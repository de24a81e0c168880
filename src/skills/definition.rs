//! スキル定義（テンプレート）とスキルカード（インスタンス）の型
//! 定義は設定から読み込まれる宣言的データで、効果は`EffectKind`で閉じた集合として扱う。

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::Phase;

/// スキルのレアリティ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// スキル使用の前提条件
/// 設定JSONでは `{"type": "min_stones", "value": 3}` の形で表す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SkillCondition {
    /// 盤上の石の総数が指定数以上
    MinStones(usize),
    /// 履歴が1件以上ある
    HistoryNotEmpty,
    /// ゲームフェーズが一致する
    Phase(Phase),
}

/// 効果の種類
/// 設定上は文字列ID（`flipStones`など）で参照される
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    FlipStones,
    UndoMove,
    PlaceStone,
    BlockZone,
    DoubleMove,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::FlipStones,
        EffectKind::UndoMove,
        EffectKind::PlaceStone,
        EffectKind::BlockZone,
        EffectKind::DoubleMove,
    ];

    /// 設定で使われる効果ID
    pub fn id(self) -> &'static str {
        match self {
            EffectKind::FlipStones => "flipStones",
            EffectKind::UndoMove => "undoMove",
            EffectKind::PlaceStone => "placeStone",
            EffectKind::BlockZone => "blockZone",
            EffectKind::DoubleMove => "doubleMove",
        }
    }

    /// 石を置く、または色を変える効果か（勝利判定のやり直しが必要）
    pub fn changes_lines(self) -> bool {
        matches!(self, EffectKind::FlipStones | EffectKind::PlaceStone)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 効果のパラメータ
/// 未指定の項目は各効果のデフォルト値が使われる
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_percent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

/// スキル定義
/// 複数のスキルカードが1つの定義を参照する。プロセスの生存中は読み取り専用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub conditions: Vec<SkillCondition>,
    pub effect_id: String,
    #[serde(default)]
    pub params: SkillParams,
}

impl SkillDefinition {
    pub fn new(id: &str, name: &str, rarity: Rarity, effect: EffectKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            rarity,
            conditions: Vec::new(),
            effect_id: effect.id().to_string(),
            params: SkillParams::default(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_condition(mut self, condition: SkillCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_params(mut self, params: SkillParams) -> Self {
        self.params = params;
        self
    }
}

/// プレイヤーが持つスキルカード
/// `used`は効果の実行に成功したときに一度だけtrueになる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCard {
    pub id: String,
    pub skill_id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub used: bool,
}

impl SkillCard {
    /// 定義からカードを生成する
    /// IDは「定義ID-ミリ秒タイムスタンプ-ランダム英数字9文字」
    pub fn from_definition<R: Rng + ?Sized>(definition: &SkillDefinition, rng: &mut R) -> Self {
        let suffix: String = rng
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();

        Self {
            id: format!("{}-{}-{}", definition.id, Utc::now().timestamp_millis(), suffix),
            skill_id: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            rarity: definition.rarity,
            used: false,
        }
    }
}
