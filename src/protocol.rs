//! # 线路协议模块
//!
//! ## 设计思路
//!
//! 客户端与网关共享同一组线路类型，避免两侧各自维护字段名：
//! - `EditParameters`：编辑参数，序列化为查询参数 `paperWidth / paperHeight / color`
//! - `FrameEnvelope`：成功响应 `{ "data": [base64, ...] }`
//! - `ErrorBody`：失败响应 `{ code, stage, message }`，不包含 `data` 字段
//!
//! 参数在这里只是自由字符串，不做任何校验；校验由网关的合成阶段负责。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 上传接口路径（相对于服务基础地址）。
pub const FRAME_ROUTE: &str = "api/frame";

/// 应用信息接口路径（页脚版本号来源）。
pub const INFO_ROUTE: &str = "api/info";

/// multipart 中承载图片字节的字段名。
pub const FILE_FIELD: &str = "file";

pub const DEFAULT_PAPER_WIDTH: &str = "6";
pub const DEFAULT_PAPER_HEIGHT: &str = "4";
pub const DEFAULT_BORDER_COLOR: &str = "#ffffff";

/// 编辑参数。
///
/// 缺省字段在反序列化时回退为默认值，因此三个查询参数都是可选的。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditParameters {
    #[serde(rename = "paperWidth")]
    pub paper_width: String,
    #[serde(rename = "paperHeight")]
    pub paper_height: String,
    #[serde(rename = "color")]
    pub border_color: String,
}

impl Default for EditParameters {
    fn default() -> Self {
        Self {
            paper_width: DEFAULT_PAPER_WIDTH.to_string(),
            paper_height: DEFAULT_PAPER_HEIGHT.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
        }
    }
}

impl EditParameters {
    /// 按字段合并单个值，其余字段保持不变。
    pub fn merge(&mut self, field: EditParameter, value: impl Into<String>) {
        let value = value.into();
        match field {
            EditParameter::PaperWidth => self.paper_width = value,
            EditParameter::PaperHeight => self.paper_height = value,
            EditParameter::BorderColor => self.border_color = value,
        }
    }

    /// 以 `(线路名, 值)` 形式输出，供客户端拼接查询串。
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            (EditParameter::PaperWidth.wire_name(), self.paper_width.as_str()),
            (EditParameter::PaperHeight.wire_name(), self.paper_height.as_str()),
            (EditParameter::BorderColor.wire_name(), self.border_color.as_str()),
        ]
    }
}

/// 可编辑的参数字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditParameter {
    PaperWidth,
    PaperHeight,
    BorderColor,
}

impl EditParameter {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::PaperWidth => "paperWidth",
            Self::PaperHeight => "paperHeight",
            Self::BorderColor => "color",
        }
    }
}

impl fmt::Display for EditParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知参数名：{0}（可选：paperWidth / paperHeight / color）")]
pub struct UnknownParameter(pub String);

impl FromStr for EditParameter {
    type Err = UnknownParameter;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim() {
            "paperWidth" => Ok(Self::PaperWidth),
            "paperHeight" => Ok(Self::PaperHeight),
            "color" | "borderColor" => Ok(Self::BorderColor),
            other => Err(UnknownParameter(other.to_string())),
        }
    }
}

/// 成功响应信封。
///
/// `data` 中每一项都是一个合成产物的 Base64 编码，客户端只使用第一项。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEnvelope {
    pub data: Vec<String>,
}

/// 失败响应体。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub stage: String,
    pub message: String,
}

/// `GET /api/info` 的响应体。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_fields_fall_back_to_defaults() {
        let params: EditParameters =
            serde_json::from_str(r#"{"paperWidth":"8"}"#).expect("partial params should parse");

        assert_eq!(params.paper_width, "8");
        assert_eq!(params.paper_height, DEFAULT_PAPER_HEIGHT);
        assert_eq!(params.border_color, DEFAULT_BORDER_COLOR);
    }

    #[test]
    fn merge_touches_only_one_field() {
        let mut params = EditParameters::default();
        params.merge(EditParameter::BorderColor, "#000");

        assert_eq!(params.border_color, "#000");
        assert_eq!(params.paper_width, DEFAULT_PAPER_WIDTH);
        assert_eq!(params.paper_height, DEFAULT_PAPER_HEIGHT);
    }

    #[test]
    fn parameter_names_parse_from_wire_names() {
        assert_eq!("paperWidth".parse::<EditParameter>(), Ok(EditParameter::PaperWidth));
        assert_eq!("color".parse::<EditParameter>(), Ok(EditParameter::BorderColor));
        assert!("paper".parse::<EditParameter>().is_err());
    }

    #[test]
    fn error_body_has_no_data_field() {
        let body = ErrorBody {
            code: "E_INVALID_PAYLOAD".to_string(),
            stage: "validate".to_string(),
            message: "x".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize error body");

        assert!(json.get("data").is_none());
    }
}
