/// 角度チャンネルの対象ジョイント。
/// 送信側は肩・肘・腰・膝の左右8チャンネルを計算して送ってくる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum AngleJoint {
    LeftShoulder = 0,
    RightShoulder = 1,
    LeftElbow = 2,
    RightElbow = 3,
    LeftHip = 4,
    RightHip = 5,
    LeftKnee = 6,
    RightKnee = 7,
}

impl AngleJoint {
    pub const COUNT: usize = 8;

    pub const ALL: [AngleJoint; Self::COUNT] = [
        AngleJoint::LeftShoulder,
        AngleJoint::RightShoulder,
        AngleJoint::LeftElbow,
        AngleJoint::RightElbow,
        AngleJoint::LeftHip,
        AngleJoint::RightHip,
        AngleJoint::LeftKnee,
        AngleJoint::RightKnee,
    ];

    pub fn from_index(index: usize) -> Option<AngleJoint> {
        Self::ALL.get(index).copied()
    }

    /// ワイヤーフォーマット上の名前
    pub fn name(&self) -> &'static str {
        match self {
            AngleJoint::LeftShoulder => "left_shoulder",
            AngleJoint::RightShoulder => "right_shoulder",
            AngleJoint::LeftElbow => "left_elbow",
            AngleJoint::RightElbow => "right_elbow",
            AngleJoint::LeftHip => "left_hip",
            AngleJoint::RightHip => "right_hip",
            AngleJoint::LeftKnee => "left_knee",
            AngleJoint::RightKnee => "right_knee",
        }
    }

    pub fn from_name(name: &str) -> Option<AngleJoint> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }
}
