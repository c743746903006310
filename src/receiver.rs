use anyhow::{Context, Result};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::NetworkConfig;
use crate::mailbox::Mailbox;
use crate::pose::PoseFrame;

/// UDPポーズフレームの受信サービス。
/// 専用スレッドで受信ループを回し、デコードしたフレームを
/// メールボックスへ無条件上書きで発行する (ネットワーク側への背圧なし)。
/// 受信タイムアウトは停止フラグの確認間隔を兼ねる設計上のウェイクアップで、
/// stopは1タイムアウトサイクル以内にループを抜けさせる
pub struct FrameReceiver {
    mailbox: Arc<Mailbox<PoseFrame>>,
    running: Arc<AtomicBool>,
    received: Arc<AtomicU64>,
    decode_errors: Arc<AtomicU64>,
    local_addr: SocketAddr,
    handle: Option<thread::JoinHandle<()>>,
}

impl FrameReceiver {
    /// ソケットをバインドして受信スレッドを起動する。
    /// バインド失敗は起動時の致命エラーとして呼び出し側へ返す (再試行しない)
    pub fn start(config: &NetworkConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.bind_addr, config.port);
        let socket = UdpSocket::bind(&addr).with_context(|| format!("Failed to bind UDP {}", addr))?;
        socket
            .set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms.max(1))))
            .context("Failed to set read timeout")?;
        let local_addr = socket.local_addr().context("Failed to get local address")?;

        let mailbox = Arc::new(Mailbox::new());
        let running = Arc::new(AtomicBool::new(true));
        let received = Arc::new(AtomicU64::new(0));
        let decode_errors = Arc::new(AtomicU64::new(0));

        let mailbox_ref = mailbox.clone();
        let running_ref = running.clone();
        let received_ref = received.clone();
        let decode_errors_ref = decode_errors.clone();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 65536];
            while running_ref.load(Ordering::Acquire) {
                match socket.recv_from(&mut buf) {
                    Ok((len, _)) => {
                        received_ref.fetch_add(1, Ordering::Relaxed);
                        match PoseFrame::decode(&buf[..len]) {
                            // 発行済みフレームは壊さず、新しいフレームだけで上書きする
                            Ok(frame) => mailbox_ref.publish(frame),
                            Err(e) => {
                                decode_errors_ref.fetch_add(1, Ordering::Relaxed);
                                eprintln!("フレームのデコードに失敗しました: {:#}", e);
                            }
                        }
                    }
                    Err(e)
                        if e.kind() == io::ErrorKind::WouldBlock
                            || e.kind() == io::ErrorKind::TimedOut =>
                    {
                        // タイムアウト: 停止フラグを見に戻るだけ。エラーではない
                    }
                    Err(e) => {
                        // 停止要求後のソケットエラーはシャットダウンの一部
                        if running_ref.load(Ordering::Acquire) {
                            eprintln!("ソケット受信エラー: {}", e);
                        }
                    }
                }
            }
        });

        Ok(Self {
            mailbox,
            running,
            received,
            decode_errors,
            local_addr,
            handle: Some(handle),
        })
    }

    /// 受信ループを停止してスレッドを回収する。何度呼んでもよい
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// 未読フレームがあれば取り出す (消費は1回限り)
    pub fn take_frame(&self) -> Option<PoseFrame> {
        self.mailbox.take()
    }

    /// 既読・未読を問わず最新フレームを覗く
    pub fn latest_frame(&self) -> Option<PoseFrame> {
        self.mailbox.peek()
    }

    /// メールボックスへの発行総数
    pub fn frame_seq(&self) -> u64 {
        self.mailbox.seq()
    }

    /// 実際にバインドされたアドレス (ポート0指定時のテスト用)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn decode_error_count(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}
