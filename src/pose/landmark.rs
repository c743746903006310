use serde::Deserialize;

/// ポーズランドマークのインデックス。
/// 順序は送信側のランドマーク表に合わせて固定 (0〜32)。
/// 下流は位置で参照するため、この対応は変更しないこと。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    LeftIndex = 18,
    LeftThumb = 19,
    RightPinky = 20,
    RightIndex = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    LeftFootIndex = 30,
    RightHeel = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    /// インデックス順の全ランドマーク
    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        LandmarkIndex::Nose,
        LandmarkIndex::LeftEyeInner,
        LandmarkIndex::LeftEye,
        LandmarkIndex::LeftEyeOuter,
        LandmarkIndex::RightEyeInner,
        LandmarkIndex::RightEye,
        LandmarkIndex::RightEyeOuter,
        LandmarkIndex::LeftEar,
        LandmarkIndex::RightEar,
        LandmarkIndex::MouthLeft,
        LandmarkIndex::MouthRight,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::LeftElbow,
        LandmarkIndex::RightElbow,
        LandmarkIndex::LeftWrist,
        LandmarkIndex::RightWrist,
        LandmarkIndex::LeftPinky,
        LandmarkIndex::LeftIndex,
        LandmarkIndex::LeftThumb,
        LandmarkIndex::RightPinky,
        LandmarkIndex::RightIndex,
        LandmarkIndex::RightThumb,
        LandmarkIndex::LeftHip,
        LandmarkIndex::RightHip,
        LandmarkIndex::LeftKnee,
        LandmarkIndex::RightKnee,
        LandmarkIndex::LeftAnkle,
        LandmarkIndex::RightAnkle,
        LandmarkIndex::LeftHeel,
        LandmarkIndex::LeftFootIndex,
        LandmarkIndex::RightHeel,
        LandmarkIndex::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<LandmarkIndex> {
        Self::ALL.get(index).copied()
    }

    /// ワイヤーフォーマット上の名前
    pub fn name(&self) -> &'static str {
        match self {
            LandmarkIndex::Nose => "nose",
            LandmarkIndex::LeftEyeInner => "left_eye_inner",
            LandmarkIndex::LeftEye => "left_eye",
            LandmarkIndex::LeftEyeOuter => "left_eye_outer",
            LandmarkIndex::RightEyeInner => "right_eye_inner",
            LandmarkIndex::RightEye => "right_eye",
            LandmarkIndex::RightEyeOuter => "right_eye_outer",
            LandmarkIndex::LeftEar => "left_ear",
            LandmarkIndex::RightEar => "right_ear",
            LandmarkIndex::MouthLeft => "mouth_left",
            LandmarkIndex::MouthRight => "mouth_right",
            LandmarkIndex::LeftShoulder => "left_shoulder",
            LandmarkIndex::RightShoulder => "right_shoulder",
            LandmarkIndex::LeftElbow => "left_elbow",
            LandmarkIndex::RightElbow => "right_elbow",
            LandmarkIndex::LeftWrist => "left_wrist",
            LandmarkIndex::RightWrist => "right_wrist",
            LandmarkIndex::LeftPinky => "left_pinky",
            LandmarkIndex::LeftIndex => "left_index",
            LandmarkIndex::LeftThumb => "left_thumb",
            LandmarkIndex::RightPinky => "right_pinky",
            LandmarkIndex::RightIndex => "right_index",
            LandmarkIndex::RightThumb => "right_thumb",
            LandmarkIndex::LeftHip => "left_hip",
            LandmarkIndex::RightHip => "right_hip",
            LandmarkIndex::LeftKnee => "left_knee",
            LandmarkIndex::RightKnee => "right_knee",
            LandmarkIndex::LeftAnkle => "left_ankle",
            LandmarkIndex::RightAnkle => "right_ankle",
            LandmarkIndex::LeftHeel => "left_heel",
            LandmarkIndex::LeftFootIndex => "left_foot_index",
            LandmarkIndex::RightHeel => "right_heel",
            LandmarkIndex::RightFootIndex => "right_foot_index",
        }
    }

    pub fn from_name(name: &str) -> Option<LandmarkIndex> {
        Self::ALL.iter().copied().find(|i| i.name() == name)
    }
}

/// 1つのランドマーク。座標は正規化値、可視度は0.0〜1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// 省略されたら0.0 (不可視扱い)
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

/// 可視度を表示スケールに写像する。可視度0で0.3、1で1.0
pub const VISIBILITY_SCALE_MIN: f32 = 0.3;
pub const VISIBILITY_SCALE_MAX: f32 = 1.0;

pub fn visibility_scale(visibility: f32) -> f32 {
    let v = visibility.clamp(0.0, 1.0);
    VISIBILITY_SCALE_MIN + (VISIBILITY_SCALE_MAX - VISIBILITY_SCALE_MIN) * v
}
