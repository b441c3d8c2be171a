//! 页面访问统计模块
//!
//! # 设计思路
//!
//! 统计与编辑器状态机完全解耦：控制器不知道统计的存在，
//! 入口处做一次进程级初始化，之后每次导航调用 `track_navigation` 即可。
//! 上报后端通过 `PageViewReporter` 抽象，默认实现只写日志。
//!
//! # 实现思路
//!
//! - 全局实例放在 `once_cell::sync::OnceCell`，重复初始化保留第一次的上报器。
//! - 连续导航到同一路径只记一次。
//! - 未初始化时导航调用静默忽略。

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

static ANALYTICS: OnceCell<Analytics> = OnceCell::new();

/// 一次页面访问。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub path: String,
    pub visited_at: DateTime<Utc>,
}

/// 页面访问上报后端。
pub trait PageViewReporter: Send + Sync {
    fn report(&self, view: &PageView);
}

/// 仅写日志的上报器。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPageViewReporter;

impl PageViewReporter for LogPageViewReporter {
    fn report(&self, view: &PageView) {
        log::info!("📈 页面访问: {} @ {}", view.path, view.visited_at.to_rfc3339());
    }
}

/// 导航跟踪器。
pub struct Analytics {
    reporter: Box<dyn PageViewReporter>,
    last_path: Mutex<Option<String>>,
}

impl Analytics {
    pub fn new(reporter: Box<dyn PageViewReporter>) -> Self {
        Self {
            reporter,
            last_path: Mutex::new(None),
        }
    }

    /// 记录一次导航，返回是否实际上报。
    pub fn on_navigate(&self, path: &str) -> bool {
        let mut last = self
            .last_path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_deref() == Some(path) {
            return false;
        }
        *last = Some(path.to_string());
        drop(last);

        self.reporter.report(&PageView {
            path: path.to_string(),
            visited_at: Utc::now(),
        });
        true
    }
}

/// 进程级初始化。返回 `false` 表示已初始化过，本次上报器被丢弃。
pub fn init(reporter: Box<dyn PageViewReporter>) -> bool {
    let mut fresh = false;
    ANALYTICS.get_or_init(|| {
        fresh = true;
        Analytics::new(reporter)
    });
    if !fresh {
        log::debug!("页面统计已初始化，忽略重复初始化");
    }
    fresh
}

pub fn is_initialized() -> bool {
    ANALYTICS.get().is_some()
}

/// 导航钩子。
pub fn track_navigation(path: &str) -> bool {
    match ANALYTICS.get() {
        Some(analytics) => analytics.on_navigate(path),
        None => false,
    }
}
