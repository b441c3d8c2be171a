//! # 预览句柄
//!
//! ## 设计思路
//!
//! 预览句柄是一段可撤销的临时引用（浏览器里对应 object URL），必须显式释放。
//! 控制器只通过 `PreviewStore` 创建与撤销句柄，不关心句柄背后的实际存储，
//! 因此同一套状态机既能驱动真实界面，也能在测试中被完整观察。
//!
//! ## 实现思路
//!
//! - `PreviewStore` 方法取 `&self`，实现方自行做内部可变，便于测试持有同一账本的克隆。
//! - `MemoryPreviewStore` 把所有句柄记在一本账上：存活集合、撤销顺序、重复撤销次数。
//! - 创建 / 撤销历史只保留最近 `HISTORY_LIMIT` 条，长时间运行时内存不随句柄数增长。

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

/// 创建 / 撤销历史各自保留的条数上限。
pub const HISTORY_LIMIT: usize = 256;

/// 预览句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:frame-editor/{}", self.0)
    }
}

/// 预览句柄的创建与撤销。
pub trait PreviewStore {
    /// 为二进制数据创建新的预览句柄，每次调用都返回不同句柄。
    fn create(&self, data: &Bytes, mime: &str) -> PreviewHandle;

    /// 撤销句柄；撤销后句柄不可再用于显示。
    fn revoke(&self, handle: PreviewHandle);
}

#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub mime: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
struct PreviewLedger {
    next_id: u64,
    live: HashMap<PreviewHandle, PreviewEntry>,
    created: VecDeque<PreviewHandle>,
    revoked: VecDeque<PreviewHandle>,
    double_revokes: usize,
}

fn push_bounded(history: &mut VecDeque<PreviewHandle>, handle: PreviewHandle) {
    if history.len() == HISTORY_LIMIT {
        history.pop_front();
    }
    history.push_back(handle);
}

/// 内存实现：克隆后共享同一本账。
#[derive(Debug, Clone, Default)]
pub struct MemoryPreviewStore {
    ledger: Arc<Mutex<PreviewLedger>>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, PreviewLedger> {
        // 账本只做计数，锁中毒时继续使用内部数据
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.ledger().live.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.ledger().live.len()
    }

    /// 句柄对应的数据（已撤销则为 `None`）。
    pub fn resolve(&self, handle: PreviewHandle) -> Option<PreviewEntry> {
        self.ledger().live.get(&handle).cloned()
    }

    /// 按创建顺序列出最近的句柄。
    pub fn created(&self) -> Vec<PreviewHandle> {
        self.ledger().created.iter().copied().collect()
    }

    /// 按撤销顺序列出最近的句柄（含重复撤销）。
    pub fn revoked(&self) -> Vec<PreviewHandle> {
        self.ledger().revoked.iter().copied().collect()
    }

    pub fn double_revokes(&self) -> usize {
        self.ledger().double_revokes
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, data: &Bytes, mime: &str) -> PreviewHandle {
        let mut ledger = self.ledger();
        ledger.next_id += 1;
        let handle = PreviewHandle(ledger.next_id);
        ledger.live.insert(
            handle,
            PreviewEntry {
                mime: mime.to_string(),
                data: data.clone(),
            },
        );
        push_bounded(&mut ledger.created, handle);
        log::debug!("🔗 创建预览句柄 {} ({} bytes, {})", handle, data.len(), mime);
        handle
    }

    fn revoke(&self, handle: PreviewHandle) {
        let mut ledger = self.ledger();
        if ledger.live.remove(&handle).is_none() {
            ledger.double_revokes += 1;
            log::warn!("⚠️ 重复撤销预览句柄 {}", handle);
        }
        push_bounded(&mut ledger.revoked, handle);
        log::debug!("✂️ 撤销预览句柄 {}", handle);
    }
}
