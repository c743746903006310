use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// 最新値だけを保持する1スロットのメールボックス。
/// 未読値への上書きは意図した取りこぼし (latest-wins) であり、キューではない。
/// 受信スレッドがpublishし、ポーリング側がtakeで消費する。
/// シーケンス番号はpublishごとに増えるので、消費側は番号の変化だけで
/// 新着の有無を判定できる
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    seq: AtomicU64,
}

struct Slot<T> {
    value: Option<T>,
    unread: bool,
}

impl<T: Clone> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                unread: false,
            }),
            seq: AtomicU64::new(0),
        }
    }

    /// 値を無条件に上書きする。未読値は黙って捨てる
    pub fn publish(&self, value: T) {
        {
            let mut slot = self.slot.lock().unwrap();
            slot.value = Some(value);
            slot.unread = true;
        }
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// 未読値があれば取り出す。取り出した値は既読になるが
    /// スロットには残り、peekからは引き続き見える
    pub fn take(&self) -> Option<T> {
        let mut slot = self.slot.lock().unwrap();
        if slot.unread {
            slot.unread = false;
            slot.value.clone()
        } else {
            None
        }
    }

    /// 既読・未読に関係なく最新値を覗く
    pub fn peek(&self) -> Option<T> {
        self.slot.lock().unwrap().value.clone()
    }

    /// これまでのpublish総数
    pub fn seq(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }
}

impl<T: Clone> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
