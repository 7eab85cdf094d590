//! # 文件命名模块
//!
//! 负责载荷扩展名白名单、`.bmp` 路径检查以及输出文件名的推导。

use crate::constants::{ALLOWED_EXTENSIONS, DEFAULT_DECODED_BASE, DEFAULT_STEGO_NAME, MAX_EXTENSION_LEN};
use crate::error::{Result, StegoError};
use image::ImageFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn invalid(extension: impl Into<String>, reason: impl Into<String>) -> StegoError {
    StegoError::InvalidExtension {
        extension: extension.into(),
        reason: reason.into(),
    }
}

/// 返回载荷文件在白名单中的扩展名。
///
/// 文件名必须比扩展名本身更长，因此单独的 `.txt` 不会被接受。
///
/// # Errors
///
/// 扩展名不在白名单中时返回 `InvalidExtension`。
pub fn payload_extension(path: &Path) -> Result<&'static str> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    ALLOWED_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| name.len() > ext.len() && name.ends_with(ext))
        .ok_or_else(|| {
            invalid(
                path.to_string_lossy(),
                format!("payload file must end with one of {}", ALLOWED_EXTENSIONS.join(", ")),
            )
        })
}

/// 检查图像路径使用 `.bmp` 扩展名。
///
/// # Errors
///
/// 扩展名不是 BMP 时返回 `InvalidExtension`。
pub fn ensure_bitmap_path(path: &Path) -> Result<()> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Bmp) => Ok(()),
        _ => Err(invalid(path.to_string_lossy(), "image file must end with .bmp")),
    }
}

/// 检查写入或读出的扩展名格式：`.` 加上 ASCII 字母或数字，总长不超过上限。
pub fn check_extension_policy(extension: &str) -> Result<()> {
    if extension.len() > MAX_EXTENSION_LEN {
        return Err(invalid(
            extension,
            format!("extension is longer than {MAX_EXTENSION_LEN} bytes"),
        ));
    }

    match extension.strip_prefix('.') {
        Some(rest) if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric()) => Ok(()),
        _ => Err(invalid(
            extension,
            "extension must be '.' followed by ASCII letters or digits",
        )),
    }
}

/// 编码结果的输出路径，未指定时为 `stego.bmp`。
pub fn stego_path(user: Option<PathBuf>) -> PathBuf {
    user.unwrap_or_else(|| PathBuf::from(DEFAULT_STEGO_NAME))
}

/// 解码输出的基础路径。
///
/// 未指定时为 `decoded`；否则去掉用户输入的文件名中第一个 `.` 及之后的部分，
/// 目录部分保持不变。去掉之后为空时回退到 `decoded`。
pub fn output_base(user: Option<&Path>) -> PathBuf {
    let Some(path) = user else {
        return PathBuf::from(DEFAULT_DECODED_BASE);
    };

    let stem = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_owned))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_DECODED_BASE.to_string());

    path.with_file_name(stem)
}

/// 拼接输出文件路径：`<base><extension>`。
pub fn output_path(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}
