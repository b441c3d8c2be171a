//! # 边框合成模块
//!
//! ## 设计思路
//!
//! 合成能力对网关而言是外部协作方，仅通过 `FrameCompositor::add_frame(paths, params)`
//! 一个入口调用：输入文件路径，输出产物文件描述。网关只依赖 trait，
//! 测试与部署可以替换为任意实现。
//!
//! `ImageFrameCompositor` 是随仓库提供的默认实现：
//! 1. 解析参数（纸张宽高必须为正数，颜色必须是 3/6 位十六进制）
//! 2. 读取 header 尺寸并按像素上限快速拒绝
//! 3. 完整解码
//! 4. 按纸张宽高比计算画布：图片四周至少保留 `margin`，多余空间均分到两侧
//! 5. 用边框颜色填充画布，居中叠加原图，编码为 PNG 写到输入文件旁

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use once_cell::sync::Lazy;
use regex::Regex;

use super::source::FrameArtifact;
use super::{GatewayConfig, GatewayError};
use crate::protocol::EditParameters;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
});

/// 外部合成能力。
///
/// 实现方需保证：成功时至少返回一个产物，且产物文件在返回时已写完。
pub trait FrameCompositor: Send + Sync {
    fn add_frame(
        &self,
        inputs: &[PathBuf],
        params: &EditParameters,
    ) -> Result<Vec<FrameArtifact>, GatewayError>;
}

/// 已校验的合成参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpec {
    pub paper_width: f64,
    pub paper_height: f64,
    pub color: Rgba<u8>,
}

impl FrameSpec {
    pub fn parse(params: &EditParameters) -> Result<Self, GatewayError> {
        Ok(Self {
            paper_width: parse_paper_dimension("paperWidth", &params.paper_width)?,
            paper_height: parse_paper_dimension("paperHeight", &params.paper_height)?,
            color: parse_hex_color(&params.border_color)?,
        })
    }

    /// 纸张宽高比（宽 / 高）。
    pub fn aspect_ratio(&self) -> f64 {
        self.paper_width / self.paper_height
    }
}

fn parse_paper_dimension(name: &str, value: &str) -> Result<f64, GatewayError> {
    let parsed: f64 = value.trim().parse().map_err(|_| {
        GatewayError::ProcessingFailed(format!("{} 不是有效数字：{:?}", name, value))
    })?;

    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(GatewayError::ProcessingFailed(format!(
            "{} 必须为正数：{}",
            name, value
        )));
    }

    Ok(parsed)
}

/// 解析 `#rgb` / `#rrggbb`（`#` 可省略）。
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, GatewayError> {
    let trimmed = value.trim();
    if !HEX_COLOR.is_match(trimmed) {
        return Err(GatewayError::ProcessingFailed(format!(
            "颜色必须是十六进制值：{:?}",
            value
        )));
    }

    let digits = trimmed.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|e| GatewayError::ProcessingFailed(format!("颜色解析失败：{}", e)))
    };

    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

/// 画布布局：画布尺寸与原图左上角偏移。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// 按纸张宽高比计算画布。
///
/// 画布同时满足：宽高比等于纸张比例（取整误差内），且图片四周至少留 `margin` 像素。
pub fn compute_layout(width: u32, height: u32, aspect_ratio: f64, margin: u32) -> FrameLayout {
    let needed_width = width as f64 + 2.0 * margin as f64;
    let needed_height = height as f64 + 2.0 * margin as f64;

    let (canvas_width, canvas_height) = if needed_width / needed_height >= aspect_ratio {
        (needed_width, ceil_px(needed_width / aspect_ratio).max(needed_height))
    } else {
        (ceil_px(needed_height * aspect_ratio).max(needed_width), needed_height)
    };

    let canvas_width = canvas_width as u32;
    let canvas_height = canvas_height as u32;

    FrameLayout {
        canvas_width,
        canvas_height,
        offset_x: (canvas_width - width) / 2,
        offset_y: (canvas_height - height) / 2,
    }
}

// 浮点比例（如 4/6）的舍入误差不应多出一整行像素
fn ceil_px(value: f64) -> f64 {
    (value - 1e-6).ceil()
}

/// 基于 `image` crate 的默认合成实现。
#[derive(Debug, Clone)]
pub struct ImageFrameCompositor {
    max_decoded_pixels: u64,
    margin_ratio: f64,
    min_margin_px: u32,
}

impl ImageFrameCompositor {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            max_decoded_pixels: config.max_decoded_pixels,
            margin_ratio: config.frame_margin_ratio,
            min_margin_px: config.min_frame_margin_px,
        }
    }

    fn frame_one(&self, input: &Path, spec: &FrameSpec) -> Result<FrameArtifact, GatewayError> {
        let bytes = std::fs::read(input)
            .map_err(|e| GatewayError::ProcessingFailed(format!("无法读取输入文件：{}", e)))?;

        let (header_width, header_height) = inspect_dimensions_from_memory(&bytes)?;
        self.validate_pixel_limits(header_width, header_height)?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| GatewayError::ProcessingFailed(format!("图片解码失败：{}", e)))?;
        let (width, height) = decoded.dimensions();

        let margin = self.margin_for(width, height);
        let layout = compute_layout(width, height, spec.aspect_ratio(), margin);
        self.validate_canvas(&layout, spec)?;

        let framed = paint_frame(&decoded, &layout, spec.color);

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(framed)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| GatewayError::ProcessingFailed(format!("PNG 编码失败：{}", e)))?;

        let output = framed_output_path(input);
        std::fs::write(&output, cursor.into_inner())
            .map_err(|e| GatewayError::ProcessingFailed(format!("写入合成产物失败：{}", e)))?;

        log::info!(
            "🖼️ 边框合成完成 - 原始尺寸: {}x{} 画布: {}x{} 留白: {}px",
            width,
            height,
            layout.canvas_width,
            layout.canvas_height,
            margin
        );

        Ok(FrameArtifact {
            path: output,
            mime: "image/png",
        })
    }

    fn margin_for(&self, width: u32, height: u32) -> u32 {
        let short_side = width.min(height) as f64;
        ((short_side * self.margin_ratio).round() as u32).max(self.min_margin_px)
    }

    /// 画布尺寸由纸张比例决定，超限说明参数不合理，而不是上传过大。
    fn validate_canvas(&self, layout: &FrameLayout, spec: &FrameSpec) -> Result<(), GatewayError> {
        let pixels = (layout.canvas_width as u64).saturating_mul(layout.canvas_height as u64);
        if pixels > self.max_decoded_pixels {
            return Err(GatewayError::ProcessingFailed(format!(
                "纸张比例 {}:{} 导致画布过大：{}x{}（限制：{} 像素）",
                spec.paper_width,
                spec.paper_height,
                layout.canvas_width,
                layout.canvas_height,
                self.max_decoded_pixels
            )));
        }
        Ok(())
    }

    fn validate_pixel_limits(&self, width: u32, height: u32) -> Result<(), GatewayError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| GatewayError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(GatewayError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_decoded_pixels
            )));
        }

        Ok(())
    }
}

impl FrameCompositor for ImageFrameCompositor {
    fn add_frame(
        &self,
        inputs: &[PathBuf],
        params: &EditParameters,
    ) -> Result<Vec<FrameArtifact>, GatewayError> {
        if inputs.is_empty() {
            return Err(GatewayError::ProcessingFailed("没有输入文件".to_string()));
        }

        let spec = FrameSpec::parse(params)?;
        inputs.iter().map(|input| self.frame_one(input, &spec)).collect()
    }
}

/// 仅通过图片头信息读取宽高，用于在完整解码前做像素限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), GatewayError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| GatewayError::ProcessingFailed(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| GatewayError::ProcessingFailed(format!("无法读取图片尺寸：{}", e)))
}

fn paint_frame(source: &DynamicImage, layout: &FrameLayout, color: Rgba<u8>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(layout.canvas_width, layout.canvas_height, color);
    image::imageops::overlay(
        &mut canvas,
        &source.to_rgba8(),
        layout.offset_x as i64,
        layout.offset_y as i64,
    );
    canvas
}

fn framed_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    input.with_file_name(format!("{}-framed.png", stem))
}
