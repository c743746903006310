use anyhow::Result;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rep_tracker::config::Config;
use rep_tracker::pose::AngleJoint;
use rep_tracker::receiver::FrameReceiver;
use rep_tracker::session::{Session, SessionEvent};

const CONFIG_PATH: &str = "config.toml";
const GIT_VERSION: &str = env!("GIT_VERSION");
const POLL_INTERVAL: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== Rep Tracker Monitor ({}) ===", GIT_VERSION);
    println!("受信: {}:{}", config.network.bind_addr, config.network.port);
    println!(
        "閾値: min={} max={}  クールダウン: {}s",
        config.counter.min_threshold, config.counter.max_threshold, config.counter.cooldown_secs
    );
    println!(
        "キャリブレーション: {}s (余白 {})",
        config.calibration.duration_secs, config.calibration.margin
    );
    println!();
    println!("コマンド:");
    println!("  c             - キャリブレーション開始");
    println!("  r             - カウンタをリセット");
    println!("  t min max     - 閾値を設定 (例: t 40 140)");
    println!("  d secs        - クールダウンを設定 (例: d 0.5)");
    println!("  on <joint>    - ジョイントを有効化 (例: on left_knee)");
    println!("  off <joint>   - ジョイントを無効化");
    println!("  q             - 終了");
    println!();

    let mut receiver = FrameReceiver::start(&config.network)?;
    println!("ポート {} で受信中", receiver.local_addr().port());

    let mut session = Session::from_config(&config)?;

    // stdinは専用スレッドで読み、ポーリングループからtry_recvで拾う
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut status_timer = Instant::now();
    let mut last_received = 0u64;

    loop {
        if let Some(frame) = receiver.take_frame() {
            for event in session.ingest(frame) {
                print_event(&event);
            }
        }

        match rx.try_recv() {
            Ok(line) => {
                if !handle_command(&line, &mut session) {
                    break;
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }

        // 1秒に1回のステータス行
        if status_timer.elapsed() >= Duration::from_secs(1) {
            let received = receiver.received_count();
            print_status(&session, &receiver, received - last_received);
            last_received = received;
            status_timer = Instant::now();
        }

        thread::sleep(POLL_INTERVAL);
    }

    println!("終了します");
    receiver.stop();
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::DirectionChanged { joint, direction } => {
            println!("[{}] 方向: {}", joint.name(), direction.name());
        }
        SessionEvent::RepCounted { joint, count, total } => {
            println!("[{}] レップ {} (合計 {})", joint.name(), count, total);
        }
        SessionEvent::MilestoneReached { total } => {
            println!("*** {} レップ達成! ***", total);
        }
        SessionEvent::CalibrationFinished { thresholds } => {
            println!("キャリブレーション完了:");
            for band in thresholds {
                println!("  {}: min={:.1} max={:.1}", band.joint.name(), band.min, band.max);
            }
            if thresholds.is_empty() {
                println!("  有効なレンジが観測できず、閾値は変更されませんでした");
            }
        }
    }
}

fn print_status(session: &Session, receiver: &FrameReceiver, received_delta: u64) {
    let mut line = format!(
        "{}fps err={} detected={}",
        received_delta,
        receiver.decode_error_count(),
        if session.detected() { "yes" } else { "no" }
    );
    for joint in session.enabled_joints() {
        line.push_str(&format!(
            " | {}: {:.0}deg {} x{}",
            joint.name(),
            session.angle(joint),
            session.direction(joint).name(),
            session.count(joint)
        ));
    }
    line.push_str(&format!(" | total={}", session.total_count()));
    if session.calibrating() {
        line.push_str(&format!(
            " | calibrating {:.0}%",
            session.calibration_progress() * 100.0
        ));
    }
    println!("{}", line);
}

/// コマンド1行を処理する。qでfalseを返す。
/// 不正なコマンド・引数はエラー行を出して継続する
fn handle_command(line: &str, session: &mut Session) -> bool {
    let parts: Vec<&str> = line.trim().split_whitespace().collect();
    if parts.is_empty() {
        return true;
    }

    match parts[0] {
        "c" => {
            session.start_calibration();
            println!("キャリブレーション開始。腕を自然に動かしてください");
        }
        "r" => {
            session.reset_counters();
            println!("カウンタをリセットしました");
        }
        "t" if parts.len() == 3 => {
            match (parts[1].parse::<f32>(), parts[2].parse::<f32>()) {
                (Ok(min), Ok(max)) => match session.set_thresholds(min, max) {
                    Ok(()) => println!("閾値: min={} max={}", min, max),
                    Err(e) => println!("閾値を設定できません: {}", e),
                },
                _ => println!("数値を指定してください: t min max"),
            }
        }
        "d" if parts.len() == 2 => match parts[1].parse::<f32>() {
            Ok(secs) => match session.set_cooldown(secs) {
                Ok(()) => println!("クールダウン: {}s", secs),
                Err(e) => println!("クールダウンを設定できません: {}", e),
            },
            Err(_) => println!("数値を指定してください: d secs"),
        },
        "on" | "off" if parts.len() == 2 => match AngleJoint::from_name(parts[1]) {
            Some(joint) => {
                let enable = parts[0] == "on";
                session.set_joint_enabled(joint, enable);
                println!(
                    "{}: {}",
                    joint.name(),
                    if enable { "有効" } else { "無効" }
                );
            }
            None => println!("不明なジョイント: {}", parts[1]),
        },
        "q" => return false,
        _ => println!("不明なコマンド: {}", parts[0]),
    }
    true
}
