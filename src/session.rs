use anyhow::{bail, Result};
use std::time::Instant;

use crate::config::Config;
use crate::counter::{Calibrator, Direction, JointBand, RepCounter, Transition};
use crate::pose::{AngleJoint, Landmark, LandmarkIndex, LandmarkSmoother, PoseFrame};

/// フレーム取り込み中に発生したイベント
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// 受理された遷移による方向の変化 (収縮・伸展の両方で発火)
    DirectionChanged {
        joint: AngleJoint,
        direction: Direction,
    },
    /// レップがカウントされた。countは当該ジョイント、totalは合計
    RepCounted {
        joint: AngleJoint,
        count: u32,
        total: u32,
    },
    /// 合計カウントが規定の倍数に達した
    MilestoneReached { total: u32 },
    /// キャリブレーション完了。導出された閾値バンド付き
    CalibrationFinished { thresholds: Vec<JointBand> },
}

/// ポーリング側のセッション。メールボックスから取り出したフレームを
/// 平滑化→ (キャリブレーション中ならサンプリング、通常時はカウント) の
/// 順で処理し、UI・レンダラ・音声が読むクエリ面とコマンド面を提供する。
/// 1回の取り込みで処理するフレームは最大1枚、ブロックしない
pub struct Session {
    smoother: LandmarkSmoother,
    counters: [RepCounter; AngleJoint::COUNT],
    enabled: [bool; AngleJoint::COUNT],
    calibrator: Calibrator,
    milestone_every: u32,
    current: Option<PoseFrame>,
    display: [Option<[f32; 3]>; LandmarkIndex::COUNT],
    last_ingest: Option<Instant>,
}

impl Session {
    /// 設定を検証してセッションを構築する。
    /// 負のクールダウンや逆転した閾値バンドは実行時コマンドと同じ基準で
    /// 起動時エラーとして呼び出し側へ返す (パニックさせない)
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.counter.cooldown_secs < 0.0 {
            bail!(
                "cooldown must not be negative, got {}",
                config.counter.cooldown_secs
            );
        }
        if config.counter.min_threshold >= config.counter.max_threshold {
            bail!(
                "min threshold {} must be below max threshold {}",
                config.counter.min_threshold,
                config.counter.max_threshold
            );
        }

        let mut enabled = [false; AngleJoint::COUNT];
        // 既定の監視対象は左右の肘 (上腕カール)
        enabled[AngleJoint::LeftElbow as usize] = true;
        enabled[AngleJoint::RightElbow as usize] = true;

        Ok(Self {
            smoother: LandmarkSmoother::from_config(&config.smooth),
            counters: std::array::from_fn(|_| RepCounter::from_config(&config.counter)),
            enabled,
            calibrator: Calibrator::from_config(&config.calibration),
            milestone_every: config.counter.milestone_every,
            current: None,
            display: [None; LandmarkIndex::COUNT],
            last_ingest: None,
        })
    }

    /// フレームを1枚取り込む
    pub fn ingest(&mut self, frame: PoseFrame) -> Vec<SessionEvent> {
        self.ingest_at(frame, Instant::now())
    }

    /// 時刻注入版。キャリブレーションの経過時間は取り込み間の
    /// 実時間で進み、非検出フレームでは進まない (タイマーは体を
    /// 見失っている間は止まる)
    pub fn ingest_at(&mut self, frame: PoseFrame, now: Instant) -> Vec<SessionEvent> {
        let dt = self
            .last_ingest
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_ingest = Some(now);

        let mut events = Vec::new();

        if !frame.detected {
            // 非検出フレーム: 平滑化もカウントもサンプリングも行わない
            self.current = Some(frame);
            return events;
        }

        // 1. 平滑化。フレームに現れなかったランドマークは前回の表示位置を保つ
        for index in LandmarkIndex::ALL {
            if let Some(landmark) = frame.landmark(index) {
                self.display[index as usize] = Some(self.smoother.apply(index, landmark));
            }
        }

        // 2. キャリブレーション中は角度をサンプルに回し、カウントしない
        if self.calibrator.is_active() {
            for joint in AngleJoint::ALL {
                if !self.enabled[joint as usize] {
                    continue;
                }
                if let Some(angle) = frame.angle(joint) {
                    self.calibrator.record(joint, angle);
                }
            }
            if let Some(bands) = self.calibrator.advance(dt) {
                for band in &bands {
                    self.counters[band.joint as usize].set_thresholds(band.min, band.max);
                }
                events.push(SessionEvent::CalibrationFinished { thresholds: bands });
            }
        } else {
            for joint in AngleJoint::ALL {
                if !self.enabled[joint as usize] {
                    continue;
                }
                let Some(angle) = frame.angle(joint) else {
                    continue;
                };
                if let Some(transition) = self.counters[joint as usize].observe_at(angle, now) {
                    events.push(SessionEvent::DirectionChanged {
                        joint,
                        direction: self.counters[joint as usize].direction(),
                    });
                    if transition == Transition::Contraction {
                        let count = self.counters[joint as usize].count();
                        let total = self.total_count();
                        events.push(SessionEvent::RepCounted { joint, count, total });
                        if self.milestone_every > 0 && total % self.milestone_every == 0 {
                            events.push(SessionEvent::MilestoneReached { total });
                        }
                    }
                }
            }
        }

        self.current = Some(frame);
        events
    }

    // --- クエリ面 ---

    /// 現在の角度。非検出・欠損時は0.0に丸める簡易クエリ。
    /// 欠損を区別したい場合はtry_angleを使う
    pub fn angle(&self, joint: AngleJoint) -> f32 {
        self.try_angle(joint).unwrap_or(0.0)
    }

    pub fn try_angle(&self, joint: AngleJoint) -> Option<f32> {
        let frame = self.current.as_ref()?;
        if !frame.detected {
            return None;
        }
        frame.angle(joint)
    }

    /// 現在フレームの生ランドマーク
    pub fn landmark(&self, index: LandmarkIndex) -> Option<Landmark> {
        let frame = self.current.as_ref()?;
        if !frame.detected {
            return None;
        }
        frame.landmark(index)
    }

    /// 平滑化済みの表示位置。ランドマークが一時的に欠けても
    /// 最後の出力値が残る
    pub fn display_position(&self, index: LandmarkIndex) -> Option<[f32; 3]> {
        self.display[index as usize]
    }

    pub fn detected(&self) -> bool {
        self.current.as_ref().map(|f| f.detected).unwrap_or(false)
    }

    /// 検出品質。欠損時は0.0に丸める
    pub fn confidence(&self) -> f32 {
        self.current
            .as_ref()
            .and_then(|f| f.confidence)
            .unwrap_or(0.0)
    }

    pub fn count(&self, joint: AngleJoint) -> u32 {
        self.counters[joint as usize].count()
    }

    /// 合計カウント。ジョイントごとのカウントの純粋な和
    pub fn total_count(&self) -> u32 {
        self.counters.iter().map(|c| c.count()).sum()
    }

    pub fn direction(&self, joint: AngleJoint) -> Direction {
        self.counters[joint as usize].direction()
    }

    pub fn thresholds(&self, joint: AngleJoint) -> (f32, f32) {
        self.counters[joint as usize].thresholds()
    }

    pub fn is_joint_enabled(&self, joint: AngleJoint) -> bool {
        self.enabled[joint as usize]
    }

    pub fn enabled_joints(&self) -> impl Iterator<Item = AngleJoint> + '_ {
        AngleJoint::ALL
            .into_iter()
            .filter(move |j| self.enabled[*j as usize])
    }

    pub fn calibrating(&self) -> bool {
        self.calibrator.is_active()
    }

    pub fn calibration_progress(&self) -> f32 {
        self.calibrator.progress()
    }

    // --- コマンド面 ---

    /// 全ジョイントをカウント0・Downへ戻す。無効化中のジョイントも対象で、
    /// クールダウン中でも常に即座に効く
    pub fn reset_counters(&mut self) {
        for counter in self.counters.iter_mut() {
            counter.reset();
        }
    }

    pub fn start_calibration(&mut self) {
        self.calibrator.start();
    }

    pub fn set_joint_enabled(&mut self, joint: AngleJoint, enabled: bool) {
        self.enabled[joint as usize] = enabled;
    }

    /// 全ジョイントの閾値を差し替える
    pub fn set_thresholds(&mut self, min: f32, max: f32) -> Result<()> {
        if min >= max {
            bail!("min threshold {} must be below max threshold {}", min, max);
        }
        for counter in self.counters.iter_mut() {
            counter.set_thresholds(min, max);
        }
        Ok(())
    }

    pub fn set_cooldown(&mut self, secs: f32) -> Result<()> {
        if secs < 0.0 {
            bail!("cooldown must not be negative, got {}", secs);
        }
        for counter in self.counters.iter_mut() {
            counter.set_cooldown(secs);
        }
        Ok(())
    }
}
