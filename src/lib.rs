//! # 在线相框编辑器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  客户端 (client)                          │
//! │                                                          │
//! │  EditorController ── PreviewStore ── ColorPickerPopover  │
//! │       │  (状态机 + 预览句柄生命周期 + 代次令牌)           │
//! │  FrameClient (reqwest, 超时来自 AppConfig)               │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ POST /api/frame?paperWidth&paperHeight&color
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            网关 (gateway, axum)                  │
//! │                                                          │
//! │  routes ─ 请求解析 (multipart / 原始 body)               │
//! │  handler ─ 校验 → 暂存(RAII) → 合成 → 读回               │
//! │  compositor ─ FrameCompositor (image)                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，两个入口的返回类型 |
//! | [`config`] | 显式应用配置 `AppConfig`（基础地址、版本号、网关参数） |
//! | [`protocol`] | 客户端与网关共享的线路类型 |
//! | [`gateway`] | `POST /api/frame` 处理链路与相框合成 |
//! | [`client`] | 上传/编辑控制器、HTTP 客户端、外部点击检测 |
//! | [`analytics`] | 页面访问统计，一次性初始化 + 导航钩子 |

pub mod analytics;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod protocol;
