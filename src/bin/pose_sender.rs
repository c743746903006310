use anyhow::Result;
use serde_json::json;
use std::net::UdpSocket;
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_TARGET: &str = "127.0.0.1:5052";
const SEND_RATE_HZ: f64 = 30.0;
/// 両肘の角度を18度〜170度で往復させる (既定バンド38/150を確実に跨ぐ)
const ANGLE_CENTER: f32 = 94.0;
const ANGLE_AMPLITUDE: f32 = 76.0;
/// 1レップあたり約3秒
const REP_PERIOD_SECS: f32 = 3.0;

fn main() -> Result<()> {
    let target = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_TARGET.to_string());

    println!("=== Pose Sender (合成データ) ===");
    println!("送信先: {}", target);
    println!("レート: {} Hz, 周期: {}s/rep", SEND_RATE_HZ, REP_PERIOD_SECS);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let interval = Duration::from_secs_f64(1.0 / SEND_RATE_HZ);
    let started = Instant::now();

    let mut sent = 0u64;
    let mut stats_timer = Instant::now();
    let mut stats_sent = 0u64;

    loop {
        let t = started.elapsed().as_secs_f32();
        let phase = t * std::f32::consts::TAU / REP_PERIOD_SECS;
        let angle = ANGLE_CENTER + ANGLE_AMPLITUDE * phase.cos();
        // 曲げるほど手首が肩に近づく
        let curl = (ANGLE_CENTER + ANGLE_AMPLITUDE - angle) / (2.0 * ANGLE_AMPLITUDE);
        let wrist_y = 0.62 - 0.25 * curl;

        let payload = json!({
            "timestamp": started.elapsed().as_millis() as i64,
            "frame_size": {"width": 640, "height": 480},
            "body_tracking": {
                "detected": true,
                "landmarks": {
                    "nose":           {"x": 0.50, "y": 0.20, "z": -0.05, "visibility": 0.99},
                    "left_shoulder":  {"x": 0.42, "y": 0.35, "z": -0.02, "visibility": 0.98},
                    "right_shoulder": {"x": 0.58, "y": 0.35, "z": -0.02, "visibility": 0.98},
                    "left_elbow":     {"x": 0.38, "y": 0.50, "z": -0.01, "visibility": 0.97},
                    "right_elbow":    {"x": 0.62, "y": 0.50, "z": -0.01, "visibility": 0.97},
                    "left_wrist":     {"x": 0.36, "y": wrist_y, "z": 0.0, "visibility": 0.95},
                    "right_wrist":    {"x": 0.64, "y": wrist_y, "z": 0.0, "visibility": 0.95},
                    "left_hip":       {"x": 0.44, "y": 0.65, "z": 0.0,  "visibility": 0.96},
                    "right_hip":      {"x": 0.56, "y": 0.65, "z": 0.0,  "visibility": 0.96}
                },
                "angles": {
                    "left_elbow": angle,
                    "right_elbow": angle,
                    "left_shoulder": 15.0 + 5.0 * phase.sin(),
                    "right_shoulder": 15.0 + 5.0 * phase.sin()
                },
                "body_metrics": {"landmark_count": 33, "confidence": 0.85}
            }
        });

        socket.send_to(payload.to_string().as_bytes(), &target)?;
        sent += 1;
        stats_sent += 1;

        if stats_timer.elapsed() >= Duration::from_secs(1) {
            println!("送信 {} パケット ({}/s)  肘角度 {:.0}deg", sent, stats_sent, angle);
            stats_sent = 0;
            stats_timer = Instant::now();
        }

        thread::sleep(interval);
    }
}
