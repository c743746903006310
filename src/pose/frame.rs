use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::pose::angle::AngleJoint;
use crate::pose::landmark::{Landmark, LandmarkIndex};

/// ソース画像のサイズ。コアロジックでは使わないメタデータ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// 1データグラムからデコードされたポーズフレーム。
/// 全フィールドは同一時点のもので、フレームをまたいだ合成はしない。
/// 欠けている値は明示的にNoneで表す (0で代用しない)。
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    /// 送信側が付けたタイムスタンプ。受信順に単調とは限らない
    pub timestamp: i64,
    pub frame_size: Option<FrameSize>,
    /// falseのとき他のボディ関連フィールドはすべて欠損
    pub detected: bool,
    pub landmarks: [Option<Landmark>; LandmarkIndex::COUNT],
    /// 角度 (度)。この層ではレンジを制限しない
    pub angles: [Option<f32>; AngleJoint::COUNT],
    pub landmark_count: Option<u32>,
    pub confidence: Option<f32>,
}

// --- ワイヤーフォーマット ---
// 1パケットにつきUTF-8 JSONを1フレーム。省略可能なサブオブジェクトは
// Option / defaultで受け、body_trackingごと無ければ非検出フレーム扱い。

#[derive(Deserialize)]
struct WireFrame {
    #[serde(default)]
    timestamp: i64,
    frame_size: Option<FrameSize>,
    body_tracking: Option<WireBody>,
}

#[derive(Deserialize)]
struct WireBody {
    #[serde(default)]
    detected: bool,
    #[serde(default)]
    landmarks: HashMap<String, Landmark>,
    #[serde(default)]
    angles: HashMap<String, f32>,
    body_metrics: Option<WireMetrics>,
}

#[derive(Deserialize)]
struct WireMetrics {
    landmark_count: Option<u32>,
    confidence: Option<f32>,
}

impl PoseFrame {
    /// データグラムのバイト列をデコードする。
    /// 失敗時は部分的なフレームを作らず全体をエラーにする
    pub fn decode(data: &[u8]) -> Result<PoseFrame> {
        let wire: WireFrame =
            serde_json::from_slice(data).context("Failed to parse pose frame payload")?;
        Ok(PoseFrame::from_wire(wire))
    }

    fn from_wire(wire: WireFrame) -> PoseFrame {
        let mut frame = PoseFrame {
            timestamp: wire.timestamp,
            frame_size: wire.frame_size,
            ..PoseFrame::default()
        };

        if let Some(body) = wire.body_tracking {
            frame.detected = body.detected;
            // 既知の名前だけ拾い、知らない名前は無視する
            for index in LandmarkIndex::ALL {
                frame.landmarks[index as usize] = body.landmarks.get(index.name()).copied();
            }
            for joint in AngleJoint::ALL {
                frame.angles[joint as usize] = body.angles.get(joint.name()).copied();
            }
            if let Some(metrics) = body.body_metrics {
                frame.landmark_count = metrics.landmark_count;
                frame.confidence = metrics.confidence;
            }
        }

        frame
    }

    pub fn landmark(&self, index: LandmarkIndex) -> Option<Landmark> {
        self.landmarks[index as usize]
    }

    pub fn angle(&self, joint: AngleJoint) -> Option<f32> {
        self.angles[joint as usize]
    }
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self {
            timestamp: 0,
            frame_size: None,
            detected: false,
            landmarks: [None; LandmarkIndex::COUNT],
            angles: [None; AngleJoint::COUNT],
            landmark_count: None,
            confidence: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_frame() {
        let payload = r#"{
            "timestamp": 1234567890,
            "frame_size": {"width": 640, "height": 480},
            "body_tracking": {
                "detected": true,
                "landmarks": {
                    "nose": {"x": 0.5, "y": 0.8, "z": -0.1, "visibility": 0.99},
                    "left_elbow": {"x": 0.4, "y": 0.5, "z": -0.05, "visibility": 0.97}
                },
                "angles": {"left_elbow": 42.5, "right_elbow": 155.0},
                "body_metrics": {"landmark_count": 33, "confidence": 0.8}
            }
        }"#;
        let frame = PoseFrame::decode(payload.as_bytes()).unwrap();

        assert_eq!(frame.timestamp, 1234567890);
        assert_eq!(frame.frame_size, Some(FrameSize { width: 640, height: 480 }));
        assert!(frame.detected);

        let nose = frame.landmark(LandmarkIndex::Nose).unwrap();
        assert_eq!(nose.x, 0.5);
        assert_eq!(nose.y, 0.8);
        assert_eq!(nose.visibility, 0.99);

        assert_eq!(frame.angle(AngleJoint::LeftElbow), Some(42.5));
        assert_eq!(frame.angle(AngleJoint::RightElbow), Some(155.0));
        assert_eq!(frame.angle(AngleJoint::LeftKnee), None);
        assert_eq!(frame.landmark_count, Some(33));
        assert_eq!(frame.confidence, Some(0.8));
    }

    #[test]
    fn test_decode_undetected_frame() {
        // 非検出時の送信側はtimestampとdetectedしか載せない
        let payload = r#"{"timestamp": 42, "body_tracking": {"detected": false}}"#;
        let frame = PoseFrame::decode(payload.as_bytes()).unwrap();

        assert_eq!(frame.timestamp, 42);
        assert!(!frame.detected);
        assert_eq!(frame.frame_size, None);
        assert_eq!(frame.landmark(LandmarkIndex::Nose), None);
        assert_eq!(frame.angle(AngleJoint::LeftElbow), None);
        assert_eq!(frame.confidence, None);
    }

    #[test]
    fn test_decode_missing_body_tracking() {
        let frame = PoseFrame::decode(br#"{"timestamp": 7}"#).unwrap();
        assert!(!frame.detected);
        assert_eq!(frame.timestamp, 7);
    }

    #[test]
    fn test_decode_missing_landmarks_keeps_detected() {
        let payload = r#"{"timestamp": 1, "body_tracking": {"detected": true}}"#;
        let frame = PoseFrame::decode(payload.as_bytes()).unwrap();

        assert!(frame.detected, "detected flag must survive missing landmarks");
        for index in LandmarkIndex::ALL {
            assert_eq!(frame.landmark(index), None);
        }
        for joint in AngleJoint::ALL {
            assert_eq!(frame.angle(joint), None);
        }
    }

    #[test]
    fn test_decode_ignores_unknown_names() {
        let payload = r#"{
            "timestamp": 1,
            "body_tracking": {
                "detected": true,
                "landmarks": {"tail": {"x": 0.0, "y": 0.0, "z": 0.0}},
                "angles": {"left_wing": 90.0, "left_elbow": 60.0}
            }
        }"#;
        let frame = PoseFrame::decode(payload.as_bytes()).unwrap();
        assert_eq!(frame.angle(AngleJoint::LeftElbow), Some(60.0));
        for index in LandmarkIndex::ALL {
            assert_eq!(frame.landmark(index), None);
        }
    }

    #[test]
    fn test_decode_missing_visibility_defaults_to_zero() {
        let payload = r#"{
            "timestamp": 1,
            "body_tracking": {
                "detected": true,
                "landmarks": {"nose": {"x": 0.1, "y": 0.2, "z": 0.3}}
            }
        }"#;
        let frame = PoseFrame::decode(payload.as_bytes()).unwrap();
        let nose = frame.landmark(LandmarkIndex::Nose).unwrap();
        assert_eq!(nose.visibility, 0.0, "absent visibility must not read as visible");
        assert!(!nose.is_visible(0.5));
    }

    #[test]
    fn test_decode_malformed_payload_fails() {
        assert!(PoseFrame::decode(b"not json at all").is_err());
        assert!(PoseFrame::decode(b"").is_err());
    }

    #[test]
    fn test_decode_incomplete_landmark_fails() {
        // 座標が欠けたランドマークは部分的に受理せずフレームごと弾く
        let payload = r#"{
            "timestamp": 1,
            "body_tracking": {
                "detected": true,
                "landmarks": {"nose": {"y": 0.2, "z": 0.3}}
            }
        }"#;
        assert!(PoseFrame::decode(payload.as_bytes()).is_err());
    }
}
