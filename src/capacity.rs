//! # 容量模型模块
//!
//! 根据 BMP 头部中的宽高计算可用的载体字节数，并与帧所需的字节数比较。

use crate::constants::{
    BYTE_CARRIER_LEN, BYTES_PER_PIXEL, HEIGHT_OFFSET, LENGTH_CARRIER_LEN, WIDTH_OFFSET,
};
use crate::error::{Result, StegoError};
use std::io::{Read, Seek, SeekFrom};

/// 图像像素区域可用的载体字节数：`|width| * |height| * 3`。
///
/// 高度为负表示自上而下存储的位图，取其绝对值。
pub fn image_capacity_bytes(width: i32, height: i32) -> u64 {
    width.unsigned_abs() as u64 * height.unsigned_abs() as u64 * BYTES_PER_PIXEL
}

/// 隐藏整个帧所需的载体字节数。
pub fn required_bytes(magic_len: u64, extension_len: u64, payload_len: u64) -> u64 {
    let per_byte = BYTE_CARRIER_LEN as u64;
    let per_length = LENGTH_CARRIER_LEN as u64;
    magic_len * per_byte + per_length + extension_len * per_byte + per_length + payload_len * per_byte
}

pub fn has_capacity(capacity: u64, required: u64) -> bool {
    capacity >= required
}

/// 在给定容量和扩展名长度下，最多还能隐藏多少字节的载荷。
pub fn max_payload_bytes(capacity: u64, magic_len: u64, extension_len: u64) -> u64 {
    capacity.saturating_sub(required_bytes(magic_len, extension_len, 0)) / BYTE_CARRIER_LEN as u64
}

/// 从 BMP 头部读取宽度和高度 (偏移 18 和 22 处的小端 `i32`)。
///
/// 读取完成后把读取位置重置到文件开头。
///
/// # Errors
///
/// 头部太短或无法定位时返回 `HeaderCopyError`。
pub fn read_dimensions<R: Read + Seek>(reader: &mut R) -> Result<(i32, i32)> {
    let header_error = |e: std::io::Error| StegoError::HeaderCopyError {
        reason: format!("unable to read image dimensions: {e}"),
    };

    reader.seek(SeekFrom::Start(WIDTH_OFFSET)).map_err(header_error)?;
    let mut fields = [0u8; 8];
    reader.read_exact(&mut fields).map_err(header_error)?;
    reader.seek(SeekFrom::Start(0)).map_err(header_error)?;

    let split = (HEIGHT_OFFSET - WIDTH_OFFSET) as usize;
    let width = i32::from_le_bytes([fields[0], fields[1], fields[2], fields[3]]);
    let height = i32::from_le_bytes([
        fields[split],
        fields[split + 1],
        fields[split + 2],
        fields[split + 3],
    ]);

    Ok((width, height))
}
