use crate::config::SmoothConfig;
use crate::pose::landmark::{Landmark, LandmarkIndex};

/// ランドマーク位置の指数平滑化フィルタ。
/// 正規化座標を表示座標系 (0.5中心、軸ごとの倍率) に変換し、
/// 前回の出力値とブレンドする。角度のカウント処理はこのフィルタを通らない
pub struct LandmarkSmoother {
    /// 0.0で平滑化なし、1.0に近いほど前回出力に引きずられる
    factor: f32,
    scale: [f32; 3],
    prev: [Option<[f32; 3]>; LandmarkIndex::COUNT],
}

impl LandmarkSmoother {
    pub fn new(factor: f32, scale: [f32; 3]) -> Self {
        Self {
            factor,
            scale,
            prev: [None; LandmarkIndex::COUNT],
        }
    }

    pub fn from_config(config: &SmoothConfig) -> Self {
        Self::new(
            config.factor,
            [config.scale_x, config.scale_y, config.scale_z],
        )
    }

    /// 新しい観測を取り込み、平滑化後の表示座標を返す。
    /// そのランドマークの初回観測はブレンド履歴がないのでそのまま出力する。
    /// フレームに現れなかったランドマークの履歴は保持され、
    /// 再出現時は最後の出力値からブレンドされる
    pub fn apply(&mut self, index: LandmarkIndex, landmark: Landmark) -> [f32; 3] {
        let target = self.to_display(landmark);
        let emitted = match self.prev[index as usize] {
            None => target,
            Some(prev) => {
                let t = 1.0 - self.factor;
                [
                    lerp(prev[0], target[0], t),
                    lerp(prev[1], target[1], t),
                    lerp(prev[2], target[2], t),
                ]
            }
        };
        self.prev[index as usize] = Some(emitted);
        emitted
    }

    // X/Yは0.5を原点に平行移動してから倍率、Zは倍率のみ
    fn to_display(&self, landmark: Landmark) -> [f32; 3] {
        [
            (landmark.x - 0.5) * self.scale[0],
            (landmark.y - 0.5) * self.scale[1],
            landmark.z * self.scale[2],
        ]
    }

    /// 全ランドマークのブレンド履歴を破棄する
    pub fn reset(&mut self) {
        self.prev = [None; LandmarkIndex::COUNT];
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
