//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 操作的高级业务逻辑。
//! 本模块负责参数校验、调用编码/解码流水线以及向用户报告结果。

use crate::capacity::max_payload_bytes;
use crate::cli::{DecodeArgs, EncodeArgs};
use crate::constants::MAGIC;
use crate::decoder::decode_file;
use crate::encoder::encode_file;
use crate::error::StegoError;
use crate::naming::{ensure_bitmap_path, output_base, payload_extension, stego_path};
use anyhow::{Context, Result};
use colored::Colorize;

/// 处理 'Encode' 操作的执行逻辑。
///
/// 在进行任何 I/O 之前校验载荷扩展名和图像路径，
/// 然后运行编码流水线，把结果写入目标图像。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载荷扩展名不在白名单中，或图像路径不是 `.bmp`。
/// * 无法打开任一文件。
/// * 图像没有足够的空间来隐藏载荷。
/// * 编码流水线的任一步骤失败。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let extension = payload_extension(&args.payload).with_context(|| {
        format!(
            "Unsupported payload file: {}",
            args.payload.to_string_lossy().red().bold()
        )
    })?;

    let dest = stego_path(args.output);
    ensure_bitmap_path(&args.source).with_context(|| {
        format!(
            "Source image must be a BMP file: {}",
            args.source.to_string_lossy().red().bold()
        )
    })?;
    ensure_bitmap_path(&dest).with_context(|| {
        format!(
            "Output image must be a BMP file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    let report = match encode_file(&args.source, &args.payload, &dest, extension) {
        Err(StegoError::CapacityExceeded {
            required,
            available,
        }) => {
            let max = max_payload_bytes(available, MAGIC.len() as u64, extension.len() as u64);
            anyhow::bail!(
                "Not enough space in the image to hide the payload. \nRequired: {}, Available: {}, Largest payload that fits: {} bytes",
                required.to_string().red().bold(),
                available.to_string().green().bold(),
                max.to_string().green()
            );
        }
        result => result.with_context(|| {
            format!(
                "Failed to hide '{}' in '{}'",
                args.payload.to_string_lossy().red().bold(),
                args.source.to_string_lossy().red().bold()
            )
        })?,
    };

    println!(
        "The payload ({} bytes, {}) has been successfully hidden and saved: {}",
        report.payload_len,
        report.extension,
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 操作的执行逻辑。
///
/// 负责校验图像路径、推导输出基础名称、运行解码流水线，
/// 并把恢复出的载荷写入 `<base><扩展名>`。
///
/// # Arguments
///
/// * `args` - 包含输入路径和可选输出基础名称的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 图像路径不是 `.bmp` 或无法打开。
/// * 图像中没有隐藏数据。
/// * 无法创建或写入输出文件。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    ensure_bitmap_path(&args.stego).with_context(|| {
        format!(
            "Stego image must be a BMP file: {}",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    let base = output_base(args.output.as_deref());
    let report = decode_file(&args.stego, &base).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nThe image may not contain hidden data or is corrupted.",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The payload ({} bytes) has been successfully recovered and saved: {}",
        report.payload_len,
        report.output.to_string_lossy().green().bold()
    );
    Ok(())
}
