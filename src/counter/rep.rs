use std::time::{Duration, Instant};

use crate::config::CounterConfig;

/// カウンタの状態。Downは収縮待ち、Upは伸展待ち
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

/// 受理された状態遷移の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Down→Up。サイクルのカウント対象側
    Contraction,
    /// Up→Down。サイクルのリセット側、カウントしない
    Extension,
}

/// 1ジョイント分のレップカウンタ。
/// min/maxの2閾値によるヒステリシスで単一境界での発振を防ぎ、
/// クールダウンでジッタによる連続トリガをデバウンスする。
/// インスタンス間で状態は共有しない
pub struct RepCounter {
    direction: Direction,
    count: u32,
    /// 最後に受理した遷移の時刻。構築直後とリセット後はNoneで、
    /// その場合クールダウンによる抑制は働かない
    last_transition: Option<Instant>,
    min_threshold: f32,
    max_threshold: f32,
    cooldown: Duration,
}

impl RepCounter {
    pub fn new(min_threshold: f32, max_threshold: f32, cooldown_secs: f32) -> Self {
        Self {
            direction: Direction::Down,
            count: 0,
            last_transition: None,
            min_threshold,
            max_threshold,
            cooldown: Duration::from_secs_f32(cooldown_secs),
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(
            config.min_threshold,
            config.max_threshold,
            config.cooldown_secs,
        )
    }

    /// 新しい角度サンプルを1つ評価する
    pub fn observe(&mut self, angle: f32) -> Option<Transition> {
        self.observe_at(angle, Instant::now())
    }

    /// 時刻注入版。クールダウン中の遷移は状態変化もイベントもなく
    /// 完全に抑制される。閾値を跨がない角度は何もしない
    pub fn observe_at(&mut self, angle: f32, now: Instant) -> Option<Transition> {
        if let Some(last) = self.last_transition {
            if now.duration_since(last) < self.cooldown {
                return None;
            }
        }

        match self.direction {
            Direction::Down if angle <= self.min_threshold => {
                self.direction = Direction::Up;
                self.count += 1;
                self.last_transition = Some(now);
                Some(Transition::Contraction)
            }
            Direction::Up if angle >= self.max_threshold => {
                self.direction = Direction::Down;
                self.last_transition = Some(now);
                Some(Transition::Extension)
            }
            _ => None,
        }
    }

    /// カウント0・Down・クールダウン解除に戻す。
    /// クールダウン中でも常に即座に有効
    pub fn reset(&mut self) {
        self.direction = Direction::Down;
        self.count = 0;
        self.last_transition = None;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.min_threshold, self.max_threshold)
    }

    /// キャリブレーション・コマンド層から閾値を差し替える。
    /// min < maxの検証は呼び出し側の責務
    pub fn set_thresholds(&mut self, min: f32, max: f32) {
        self.min_threshold = min;
        self.max_threshold = max;
    }

    pub fn set_cooldown(&mut self, cooldown_secs: f32) {
        self.cooldown = Duration::from_secs_f32(cooldown_secs);
    }
}
