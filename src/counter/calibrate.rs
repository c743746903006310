use crate::config::CalibrationConfig;
use crate::pose::AngleJoint;

/// 観測レンジが1度未満のジョイントは閾値を導出しない。
/// つぶれたバンドは常時トリガか永久無反応のどちらかにしかならない
const MIN_RANGE_DEG: f32 = 1.0;

/// キャリブレーションで導出した1ジョイント分の閾値バンド
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointBand {
    pub joint: AngleJoint,
    pub min: f32,
    pub max: f32,
}

/// 時間制のキャリブレーションセッション。
/// 起動中は生の角度サンプルを貯め、規定時間に達したら
/// 観測レンジの両端から余白分だけ内側に寄せた閾値を導出する。
/// サンプルは導出後に破棄される
pub struct Calibrator {
    active: bool,
    elapsed: f32,
    duration: f32,
    margin: f32,
    samples: [Vec<f32>; AngleJoint::COUNT],
}

impl Calibrator {
    pub fn new(duration_secs: f32, margin: f32) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            duration: duration_secs,
            margin,
            samples: Default::default(),
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(config.duration_secs, config.margin)
    }

    /// セッションを開始する。起動中の再スタートは新しいセッションになる
    pub fn start(&mut self) {
        self.active = true;
        self.elapsed = 0.0;
        for buffer in self.samples.iter_mut() {
            buffer.clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 観測した角度を記録する。停止中は何もしない
    pub fn record(&mut self, joint: AngleJoint, angle: f32) {
        if self.active {
            self.samples[joint as usize].push(angle);
        }
    }

    /// 経過時間を観測間の実時間で進める。
    /// 規定時間に達したらIdleへ戻り、導出した閾値を返す。
    /// サンプルのないジョイントは結果に含まれない (既存の閾値を維持)
    pub fn advance(&mut self, dt: f32) -> Option<Vec<JointBand>> {
        if !self.active {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed < self.duration {
            return None;
        }

        self.active = false;
        let mut bands = Vec::new();
        for joint in AngleJoint::ALL {
            let samples = &self.samples[joint as usize];
            if samples.is_empty() {
                continue;
            }
            let observed_min = samples.iter().copied().fold(f32::INFINITY, f32::min);
            let observed_max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let range = observed_max - observed_min;
            if range < MIN_RANGE_DEG {
                continue;
            }
            bands.push(JointBand {
                joint,
                min: observed_min + range * self.margin,
                max: observed_max - range * self.margin,
            });
            self.samples[joint as usize].clear();
        }
        Some(bands)
    }

    /// 進捗 (0.0〜1.0)。停止中は0.0
    pub fn progress(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }
}
