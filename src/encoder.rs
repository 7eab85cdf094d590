//! # 编码流水线模块
//!
//! 按顺序执行：打开文件 → 校验容量 → 复制头部 → 写入魔数 → 写入扩展名长度
//! → 写入扩展名 → 写入载荷长度 → 写入载荷 → 复制剩余数据。
//! 任一步骤失败即中止。每一步之后都校验源读偏移与目标写偏移相等，
//! 并且等于帧布局给出的期望偏移。

use crate::capacity::{has_capacity, image_capacity_bytes, read_dimensions, required_bytes};
use crate::codec::{encode_byte, encode_length};
use crate::constants::{BMP_HEADER_SIZE, BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN, MAGIC};
use crate::cursor::{CarrierReader, CarrierWriter};
use crate::error::{Result, StegoError};
use crate::frame::{FrameLayout, Stage};
use crate::naming::check_extension_policy;
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, Write};
use std::path::Path;

/// 一次成功编码的摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    pub extension: String,
    pub payload_len: u64,
    pub capacity: u64,
    pub required: u64,
    pub layout: FrameLayout,
    /// 写入目标图像的总字节数 (头部、帧以及剩余数据)。
    pub bytes_written: u64,
}

/// 编码上下文：持有源图像、载荷和目标图像。
pub struct FrameWriter<S, P, D> {
    source: CarrierReader<S>,
    payload: P,
    dest: CarrierWriter<D>,
    extension: String,
    payload_len: u64,
    layout: FrameLayout,
}

impl<S, P, D> FrameWriter<S, P, D>
where
    S: Read + Seek,
    P: Read,
    D: Write,
{
    /// `payload_len` 是载荷的总字节数，由调用方提供 (例如文件元数据中的长度)。
    pub fn new(source: S, payload: P, payload_len: u64, dest: D, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let layout = FrameLayout::new(extension.len() as u64, payload_len);
        Self {
            source: CarrierReader::new(source),
            payload,
            dest: CarrierWriter::new(dest),
            extension,
            payload_len,
            layout,
        }
    }

    /// 执行完整的编码流水线，返回编码摘要和目标写入器。
    ///
    /// # Errors
    ///
    /// 返回第一个失败步骤的错误，之后的步骤不会执行。
    pub fn run(mut self) -> Result<(EncodeReport, D)> {
        check_extension_policy(&self.extension)?;

        let (capacity, required) = self.validate_capacity()?;
        self.copy_header()?;
        self.encode_magic()?;
        self.encode_extension_len()?;
        self.encode_extension()?;
        self.encode_size()?;
        self.encode_data()?;
        self.copy_tail()?;
        self.dest.flush(Stage::CopyTail)?;

        let report = EncodeReport {
            extension: self.extension,
            payload_len: self.payload_len,
            capacity,
            required,
            layout: self.layout,
            bytes_written: self.dest.offset(),
        };
        Ok((report, self.dest.into_inner()))
    }

    fn validate_capacity(&mut self) -> Result<(u64, u64)> {
        // 源图像尚未被消费，可以直接在底层句柄上定位
        let (width, height) = read_dimensions(self.source.get_mut())?;
        info!("image dimensions: width = {width}, height = {height}");

        let capacity = image_capacity_bytes(width, height);
        let required = required_bytes(
            MAGIC.len() as u64,
            self.extension.len() as u64,
            self.payload_len,
        );
        if self.payload_len > u32::MAX as u64 || !has_capacity(capacity, required) {
            return Err(StegoError::CapacityExceeded {
                required,
                available: capacity,
            });
        }

        info!(
            "capacity validated: required = {required}, available = {capacity}, frame ends at {}",
            self.layout.header_end() + self.layout.frame_len()
        );
        Ok((capacity, required))
    }

    fn copy_header(&mut self) -> Result<()> {
        let mut header = [0u8; BMP_HEADER_SIZE];
        self.source
            .read_block(&mut header, Stage::CopyHeader)
            .map_err(|e| StegoError::HeaderCopyError {
                reason: e.to_string(),
            })?;
        self.dest.write_block(&header, Stage::CopyHeader)?;

        let expected = self.layout.header_end();
        let (src, dest) = (self.source.offset(), self.dest.offset());
        if src != expected || dest != expected {
            return Err(StegoError::HeaderCopyError {
                reason: format!("offsets diverged: source = {src}, dest = {dest}"),
            });
        }
        debug!("offset validation passed after {}: src = {src}, dest = {dest}", Stage::CopyHeader);
        Ok(())
    }

    fn encode_magic(&mut self) -> Result<()> {
        for &byte in MAGIC {
            self.encode_value_byte(byte, Stage::EncodeMagic)?;
        }
        self.ensure_aligned(Stage::EncodeMagic, self.layout.magic_end())
    }

    fn encode_extension_len(&mut self) -> Result<()> {
        self.encode_value_length(self.extension.len() as u32, Stage::EncodeExtnLength)?;
        self.ensure_aligned(Stage::EncodeExtnLength, self.layout.extension_len_end())
    }

    fn encode_extension(&mut self) -> Result<()> {
        let extension = self.extension.clone().into_bytes();
        for byte in extension {
            self.encode_value_byte(byte, Stage::EncodeExtn)?;
        }
        self.ensure_aligned(Stage::EncodeExtn, self.layout.extension_end())
    }

    fn encode_size(&mut self) -> Result<()> {
        self.encode_value_length(self.payload_len as u32, Stage::EncodeSize)?;
        self.ensure_aligned(Stage::EncodeSize, self.layout.size_end())
    }

    fn encode_data(&mut self) -> Result<()> {
        let stage = Stage::EncodeData;
        let data = self.read_payload()?;

        for &byte in &data {
            self.encode_value_byte(byte, stage)?;
        }

        self.ensure_aligned(stage, self.layout.data_end())
    }

    fn copy_tail(&mut self) -> Result<()> {
        let copied = self.source.copy_to(&mut self.dest, Stage::CopyTail)?;
        debug!("copied {copied} trailing bytes");
        self.ensure_aligned(Stage::CopyTail, self.layout.data_end() + copied)
    }

    /// 把整个载荷读入内存。
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        let stage = Stage::EncodeData;
        let expected = self.payload_len;

        let mut data = Vec::new();
        data.try_reserve_exact(expected as usize)
            .map_err(|_| StegoError::AllocationError {
                requested: expected,
            })?;

        let short = |actual: u64| StegoError::ShortReadError {
            stage,
            expected,
            actual,
        };
        let actual = (&mut self.payload)
            .take(expected)
            .read_to_end(&mut data)
            .map_err(|_| short(data.len() as u64))? as u64;
        if actual != expected {
            return Err(short(actual));
        }
        Ok(data)
    }

    fn encode_value_byte(&mut self, value: u8, stage: Stage) -> Result<()> {
        let mut carriers = [0u8; BYTE_CARRIER_LEN];
        self.source.read_block(&mut carriers, stage)?;
        encode_byte(value, &mut carriers);
        self.dest.write_block(&carriers, stage)
    }

    fn encode_value_length(&mut self, value: u32, stage: Stage) -> Result<()> {
        let mut carriers = [0u8; LENGTH_CARRIER_LEN];
        self.source.read_block(&mut carriers, stage)?;
        encode_length(value, &mut carriers);
        self.dest.write_block(&carriers, stage)
    }

    fn ensure_aligned(&self, stage: Stage, expected: u64) -> Result<()> {
        ensure_offsets(stage, self.source.offset(), self.dest.offset(), expected)
    }
}

/// 校验源偏移和目标偏移都等于期望值。
pub fn ensure_offsets(stage: Stage, source_offset: u64, dest_offset: u64, expected: u64) -> Result<()> {
    if source_offset != expected || dest_offset != expected {
        return Err(StegoError::OffsetMismatch {
            stage,
            source_offset,
            dest_offset,
            expected,
        });
    }
    debug!("offset validation passed after {stage}: src = {source_offset}, dest = {dest_offset}");
    Ok(())
}

/// 两个路径是否指向同一个已存在的文件。
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| StegoError::FileOpenError {
        path: path.to_path_buf(),
        source,
    })
}

/// 将 `payload` 文件隐藏进 `source` 图像，结果写入 `dest`。
///
/// `extension` 会被写入帧中，解码时用于还原文件名。
///
/// # Errors
///
/// 任一文件无法打开、无法读取载荷长度，或者 `dest` 与 `source` 是同一个文件时，
/// 返回 `FileOpenError`，其余错误见 [`FrameWriter::run`]。
pub fn encode_file(source: &Path, payload: &Path, dest: &Path, extension: &str) -> Result<EncodeReport> {
    let source_file = open(source)?;
    let payload_file = open(payload)?;
    let payload_len = payload_file
        .metadata()
        .map_err(|source| StegoError::FileOpenError {
            path: payload.to_path_buf(),
            source,
        })?
        .len();

    // 截断目标文件之前确认它不是源图像本身
    if same_file(source, dest) {
        return Err(StegoError::FileOpenError {
            path: dest.to_path_buf(),
            source: io::Error::new(
                ErrorKind::InvalidInput,
                "destination is the source image and would be truncated",
            ),
        });
    }
    let dest_file = File::create(dest).map_err(|source| StegoError::FileOpenError {
        path: dest.to_path_buf(),
        source,
    })?;
    debug!(
        "opened files: source = {}, payload = {}, dest = {}",
        source.display(),
        payload.display(),
        dest.display()
    );

    let writer = FrameWriter::new(
        BufReader::new(source_file),
        BufReader::new(payload_file),
        payload_len,
        BufWriter::new(dest_file),
        extension,
    );
    let (report, _dest) = writer.run()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::extract;
    use std::io::Cursor;

    /// 构造一个只包含头部宽高字段的 BMP 字节串，像素数据为递增序列。
    fn fake_bitmap(width: i32, height: i32) -> Vec<u8> {
        let pixels = (width.unsigned_abs() * height.unsigned_abs() * 3) as usize;
        let mut bytes = vec![0u8; BMP_HEADER_SIZE + pixels];
        bytes[0] = b'B';
        bytes[1] = b'M';
        bytes[18..22].copy_from_slice(&width.to_le_bytes());
        bytes[22..26].copy_from_slice(&height.to_le_bytes());
        for (i, byte) in bytes[BMP_HEADER_SIZE..].iter_mut().enumerate() {
            *byte = (i % 256) as u8;
        }
        bytes
    }

    fn encode(source: &[u8], payload: &[u8], extension: &str) -> Result<(EncodeReport, Vec<u8>)> {
        FrameWriter::new(
            Cursor::new(source.to_vec()),
            payload,
            payload.len() as u64,
            Vec::new(),
            extension,
        )
        .run()
    }

    #[test]
    fn hi_txt_scenario() {
        let source = fake_bitmap(100, 100);
        let (report, stego) = encode(&source, b"hi", ".txt").unwrap();

        assert_eq!(report.required, 128);
        assert_eq!(report.capacity, 30_000);
        assert_eq!(report.layout.data_end(), 182);
        assert_eq!(stego.len(), source.len());
        assert_eq!(report.bytes_written, source.len() as u64);

        let hidden = extract(Cursor::new(stego)).unwrap();
        assert_eq!(hidden.extension, ".txt");
        assert_eq!(hidden.payload, b"hi");
    }

    #[test]
    fn header_and_tail_are_preserved() {
        let source = fake_bitmap(40, 30);
        let payload: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();
        let (report, stego) = encode(&source, &payload, ".pdf").unwrap();

        let end = report.layout.data_end() as usize;
        assert_eq!(&stego[..BMP_HEADER_SIZE], &source[..BMP_HEADER_SIZE]);
        assert_eq!(&stego[end..], &source[end..]);
        for (s, d) in source[BMP_HEADER_SIZE..end].iter().zip(&stego[BMP_HEADER_SIZE..end]) {
            assert_eq!(s & 0xFE, d & 0xFE);
        }
    }

    #[test]
    fn capacity_rejection_writes_nothing() {
        let source = fake_bitmap(1, 1);
        match encode(&source, b"x", ".txt") {
            Err(StegoError::CapacityExceeded {
                required,
                available,
            }) => {
                assert_eq!(available, 3);
                assert_eq!(required, required_bytes(2, 4, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut dest = Vec::new();
        let failed = FrameWriter::new(
            Cursor::new(source),
            &b"x"[..],
            1,
            &mut dest,
            ".txt",
        )
        .run()
        .is_err();
        assert!(failed);
        assert!(dest.is_empty());
    }

    #[test]
    fn empty_payload_round_trips() {
        let source = fake_bitmap(10, 10);
        let (_, stego) = encode(&source, b"", ".sh").unwrap();
        let hidden = extract(Cursor::new(stego)).unwrap();
        assert_eq!(hidden.extension, ".sh");
        assert!(hidden.payload.is_empty());
    }

    #[test]
    fn truncated_source_is_a_short_read() {
        // 头部声称 100x100，但实际像素数据只有 100 字节
        let mut source = fake_bitmap(100, 100);
        source.truncate(BMP_HEADER_SIZE + 100);
        assert!(matches!(
            encode(&source, b"hello world", ".txt"),
            Err(StegoError::ShortReadError { .. })
        ));
    }

    #[test]
    fn short_header_fails_copy() {
        let mut source = fake_bitmap(100, 100);
        source.truncate(30);
        assert!(matches!(
            encode(&source, b"hi", ".txt"),
            Err(StegoError::HeaderCopyError { .. })
        ));
    }

    #[test]
    fn rejects_extension_outside_policy() {
        let source = fake_bitmap(100, 100);
        assert!(matches!(
            encode(&source, b"hi", "../../etc"),
            Err(StegoError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn payload_shorter_than_declared_is_a_short_read() {
        let source = fake_bitmap(100, 100);
        let result = FrameWriter::new(Cursor::new(source), &b"abc"[..], 10, Vec::new(), ".txt").run();
        assert!(matches!(
            result,
            Err(StegoError::ShortReadError {
                stage: Stage::EncodeData,
                expected: 10,
                actual: 3,
            })
        ));
    }

    #[test]
    fn offset_check_requires_both_offsets_to_match() {
        assert!(ensure_offsets(Stage::EncodeMagic, 70, 70, 70).is_ok());
        assert!(matches!(
            ensure_offsets(Stage::EncodeMagic, 70, 69, 70),
            Err(StegoError::OffsetMismatch {
                stage: Stage::EncodeMagic,
                source_offset: 70,
                dest_offset: 69,
                expected: 70,
            })
        ));
        assert!(ensure_offsets(Stage::EncodeMagic, 71, 71, 70).is_err());
    }
}
