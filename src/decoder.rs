//! # 解码流水线模块
//!
//! 按顺序执行：打开隐写图像 → 跳过头部 → 校验魔数 → 读取扩展名长度
//! → 读取扩展名并创建输出文件 → 读取载荷长度 → 读取并写出载荷。
//! 帧严格按长度前缀解析，每一步恰好消费上一个长度字段所对应的载体字节。

use crate::codec::{decode_byte, decode_length};
use crate::constants::{BMP_HEADER_SIZE, BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN, MAGIC, MAX_EXTENSION_LEN};
use crate::cursor::CarrierReader;
use crate::error::{Result, StegoError};
use crate::frame::{Stage, carrier_len};
use crate::naming::{check_extension_policy, output_path};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// 从图像中恢复出的隐藏文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFile {
    /// 带开头 `.` 的扩展名，例如 `.txt`。
    pub extension: String,
    pub payload: Vec<u8>,
}

/// 一次成功解码的摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub output: PathBuf,
    pub extension: String,
    pub payload_len: u64,
}

/// 每次为载荷缓冲区预留的字节数，缓冲区只随实际读到的载体数据增长。
const DATA_CHUNK: usize = 4096;

/// 解码上下文：持有隐写图像的读取游标。
pub struct FrameReader<R> {
    stego: CarrierReader<R>,
    /// 隐写图像的总字节数 (已知时)，用于在分配缓冲区前拒绝不可能的长度。
    total_len: Option<u64>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            stego: CarrierReader::new(reader),
            total_len: None,
        }
    }

    pub fn with_len(reader: R, total_len: u64) -> Self {
        Self {
            stego: CarrierReader::new(reader),
            total_len: Some(total_len),
        }
    }

    /// 已经消费的字节数。
    pub fn offset(&self) -> u64 {
        self.stego.offset()
    }

    /// 跳过 54 字节的 BMP 头部，不校验其内容。
    ///
    /// 图像短于头部时视为不含隐藏数据。
    pub fn skip_header(&mut self) -> Result<()> {
        let mut header = [0u8; BMP_HEADER_SIZE];
        self.stego
            .read_block(&mut header, Stage::SkipHeader)
            .map_err(|_| StegoError::MagicMismatch)?;
        debug!("skipped bitmap header, offset = {}", self.offset());
        Ok(())
    }

    /// 解码并校验魔数标记。
    pub fn decode_magic(&mut self) -> Result<()> {
        let mut carriers = [0u8; BYTE_CARRIER_LEN];
        let mut found = Vec::with_capacity(MAGIC.len());
        for _ in 0..MAGIC.len() {
            self.stego
                .read_block(&mut carriers, Stage::DecodeMagic)
                .map_err(|_| StegoError::MagicMismatch)?;
            found.push(decode_byte(&carriers));
        }

        if found != MAGIC {
            return Err(StegoError::MagicMismatch);
        }
        debug!("magic marker verified, offset = {}", self.offset());
        Ok(())
    }

    /// 解码扩展名的字节数。
    ///
    /// # Errors
    ///
    /// 长度超过 `MAX_EXTENSION_LEN` 时返回 `InvalidExtension`。
    pub fn decode_extension_len(&mut self) -> Result<u32> {
        let len = self.decode_value_length(Stage::DecodeExtnLength)?;
        if len as usize > MAX_EXTENSION_LEN {
            return Err(StegoError::InvalidExtension {
                extension: format!("<{len} bytes>"),
                reason: format!("decoded extension is longer than {MAX_EXTENSION_LEN} bytes"),
            });
        }
        debug!("decoded extension length {len}, offset = {}", self.offset());
        Ok(len)
    }

    /// 解码 `len` 个字节的扩展名并校验其格式。
    pub fn decode_extension(&mut self, len: u32) -> Result<String> {
        let bytes = self.decode_value_bytes(len as u64, Stage::DecodeExtn)?;
        let extension = String::from_utf8(bytes).map_err(|e| StegoError::InvalidExtension {
            extension: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            reason: "decoded extension is not valid UTF-8".to_string(),
        })?;
        check_extension_policy(&extension)?;
        debug!("decoded extension '{extension}', offset = {}", self.offset());
        Ok(extension)
    }

    /// 解码载荷的字节数。
    pub fn decode_size(&mut self) -> Result<u32> {
        let size = self.decode_value_length(Stage::DecodeSize)?;
        debug!("decoded payload size {size}, offset = {}", self.offset());
        Ok(size)
    }

    /// 解码 `len` 个字节的载荷。
    pub fn decode_data(&mut self, len: u32) -> Result<Vec<u8>> {
        let data = self.decode_value_bytes(len as u64, Stage::DecodeData)?;
        debug!("decoded {} payload bytes, offset = {}", data.len(), self.offset());
        Ok(data)
    }

    fn decode_value_length(&mut self, stage: Stage) -> Result<u32> {
        let mut carriers = [0u8; LENGTH_CARRIER_LEN];
        self.stego.read_block(&mut carriers, stage)?;
        Ok(decode_length(&carriers))
    }

    fn decode_value_bytes(&mut self, len: u64, stage: Stage) -> Result<Vec<u8>> {
        let needed = carrier_len(len);
        if let Some(total) = self.total_len {
            let remaining = total.saturating_sub(self.offset());
            if needed > remaining {
                return Err(StegoError::ShortReadError {
                    stage,
                    expected: needed,
                    actual: remaining,
                });
            }
        }

        let start = self.offset();
        let mut data: Vec<u8> = Vec::new();
        let mut carriers = [0u8; BYTE_CARRIER_LEN];
        for decoded in 0..len {
            if decoded % DATA_CHUNK as u64 == 0 {
                let chunk = (len - decoded).min(DATA_CHUNK as u64);
                data.try_reserve_exact(chunk as usize)
                    .map_err(|_| StegoError::AllocationError { requested: len })?;
            }
            if self.stego.read_block(&mut carriers, stage).is_err() {
                return Err(StegoError::ShortReadError {
                    stage,
                    expected: needed,
                    actual: self.offset() - start,
                });
            }
            data.push(decode_byte(&carriers));
        }
        Ok(data)
    }
}

/// 从内存中的隐写图像读取完整的帧。
///
/// # Errors
///
/// 图像不含隐藏数据时返回 `MagicMismatch`，其余错误见各步骤。
pub fn extract<R: Read>(reader: R) -> Result<HiddenFile> {
    let mut frame = FrameReader::new(reader);
    frame.skip_header()?;
    frame.decode_magic()?;
    let extension_len = frame.decode_extension_len()?;
    let extension = frame.decode_extension(extension_len)?;
    let size = frame.decode_size()?;
    let payload = frame.decode_data(size)?;
    Ok(HiddenFile { extension, payload })
}

/// 把恢复出的载荷完整写出并刷新。
///
/// # Errors
///
/// 未能写出全部字节时返回 `ShortWriteError`。
pub fn write_payload<W: Write>(mut writer: W, payload: &[u8]) -> Result<()> {
    writer
        .write_all(payload)
        .and_then(|_| writer.flush())
        .map_err(|source| StegoError::ShortWriteError {
            stage: Stage::DecodeData,
            source,
        })
}

/// 从 `stego` 图像中恢复隐藏文件，写入 `<base><扩展名>`。
///
/// 输出文件只会在扩展名被成功解码之后才创建。
///
/// # Errors
///
/// * 无法打开隐写图像时返回 `FileOpenError`。
/// * 图像不含隐藏数据时返回 `MagicMismatch`，此时不会创建任何文件。
/// * 无法创建输出文件时返回 `FileCreateError`。
pub fn decode_file(stego: &Path, base: &Path) -> Result<DecodeReport> {
    let open_error = |source: std::io::Error| StegoError::FileOpenError {
        path: stego.to_path_buf(),
        source,
    };
    let file = File::open(stego).map_err(open_error)?;
    let total_len = file.metadata().map_err(open_error)?.len();
    debug!("opened stego image {} ({total_len} bytes)", stego.display());

    let mut frame = FrameReader::with_len(BufReader::new(file), total_len);
    frame.skip_header()?;
    frame.decode_magic()?;
    let extension_len = frame.decode_extension_len()?;
    let extension = frame.decode_extension(extension_len)?;

    let output = output_path(base, &extension);
    let output_file = File::create(&output).map_err(|source| StegoError::FileCreateError {
        path: output.clone(),
        source,
    })?;
    info!("created output file {}", output.display());

    let size = frame.decode_size()?;
    let payload = frame.decode_data(size)?;

    write_payload(BufWriter::new(output_file), &payload)?;

    Ok(DecodeReport {
        output,
        extension,
        payload_len: payload.len() as u64,
    })
}
