//! # 在线相框编辑器 — 命令行客户端
//!
//! 读取本地图片，经由控制器把图片与编辑参数发送到网关，
//! 再把带相框的结果写回磁盘。

use std::path::PathBuf;

use clap::Parser;

use frame_editor::analytics::{self, LogPageViewReporter};
use frame_editor::client::{ClientError, EditorController, FrameClient, MemoryPreviewStore, PickedFile};
use frame_editor::config::AppConfig;
use frame_editor::error::AppError;
use frame_editor::protocol::{DEFAULT_BORDER_COLOR, DEFAULT_PAPER_HEIGHT, DEFAULT_PAPER_WIDTH, EditParameter};

#[derive(Debug, Parser)]
#[command(name = "frame-client", version, about = "给图片加上相框")]
struct Args {
    /// 待处理的图片
    image: PathBuf,

    /// 纸张宽度
    #[arg(long, default_value = DEFAULT_PAPER_WIDTH)]
    paper_width: String,

    /// 纸张高度
    #[arg(long, default_value = DEFAULT_PAPER_HEIGHT)]
    paper_height: String,

    /// 边框颜色（#rgb / #rrggbb）
    #[arg(long, default_value = DEFAULT_BORDER_COLOR)]
    color: String,

    /// 输出路径，缺省为 `<原文件名>-framed.png`
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// 覆盖配置中的网关地址
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        config.server_base_url = base_url;
    }
    config.validate()?;

    analytics::init(Box::new(LogPageViewReporter));
    analytics::track_navigation("/");

    let client = FrameClient::new(&config)?;
    match client.fetch_info().await {
        Ok(info) => log::info!("{} · version {}", info.name, info.version),
        Err(err) => log::warn!("读取网关版本失败: {err}"),
    }

    let mut controller = EditorController::new(MemoryPreviewStore::new());
    controller.update_parameter(EditParameter::PaperWidth, args.paper_width);
    controller.update_parameter(EditParameter::PaperHeight, args.paper_height);
    controller.update_parameter(EditParameter::BorderColor, args.color);

    let picked = PickedFile::from_path(&args.image)?;
    controller.select_file(picked);

    controller.process(&client).await?;

    let Some(result) = controller.result() else {
        return Err(ClientError::InvalidResponse("网关未返回结果".to_string()).into());
    };
    if let Ok(size) = read_dimensions(&result.data) {
        controller.on_result_image_decoded(size.0, size.1);
    }

    let out = args.out.unwrap_or_else(|| default_output_path(&args.image));
    if let Some(result) = controller.result() {
        std::fs::write(&out, &result.data)?;
        log::info!(
            "💾 已保存 {} ({} bytes, {}x{})",
            out.display(),
            result.size_bytes,
            result.width.unwrap_or_default(),
            result.height.unwrap_or_default()
        );
    }

    controller.teardown();
    println!("{}", config.footer_line());
    Ok(())
}

fn read_dimensions(data: &[u8]) -> Result<(u32, u32), image::ImageError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(data)).with_guessed_format()?;
    reader.into_dimensions()
}

fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}-framed.png"))
}
