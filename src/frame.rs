//! # 隐写帧布局模块
//!
//! 描述嵌入图像中的帧结构：
//! `[魔数][扩展名长度: u32][扩展名][载荷长度: u32][载荷]`，
//! 以及编码/解码流水线的各个阶段。

use crate::constants::{BMP_HEADER_SIZE, BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN, MAGIC};
use std::fmt;

/// 编码与解码流水线中的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenFiles,
    ValidateCapacity,
    CopyHeader,
    EncodeMagic,
    EncodeExtnLength,
    EncodeExtn,
    EncodeSize,
    EncodeData,
    CopyTail,
    OpenStego,
    SkipHeader,
    DecodeMagic,
    DecodeExtnLength,
    DecodeExtn,
    DecodeSize,
    DecodeData,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::OpenFiles => "open files",
            Stage::ValidateCapacity => "validate capacity",
            Stage::CopyHeader => "copy header",
            Stage::EncodeMagic => "encode magic",
            Stage::EncodeExtnLength => "encode extension length",
            Stage::EncodeExtn => "encode extension",
            Stage::EncodeSize => "encode size",
            Stage::EncodeData => "encode data",
            Stage::CopyTail => "copy tail",
            Stage::OpenStego => "open stego image",
            Stage::SkipHeader => "skip header",
            Stage::DecodeMagic => "decode magic",
            Stage::DecodeExtnLength => "decode extension length",
            Stage::DecodeExtn => "decode extension",
            Stage::DecodeSize => "decode size",
            Stage::DecodeData => "decode data",
        };
        f.write_str(name)
    }
}

/// 帧中各部分结束位置的绝对文件偏移。
///
/// 所有偏移都相对于文件开头，帧从第 54 字节开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    extension_len: u64,
    payload_len: u64,
}

impl FrameLayout {
    pub fn new(extension_len: u64, payload_len: u64) -> Self {
        Self {
            extension_len,
            payload_len,
        }
    }

    pub fn header_end(&self) -> u64 {
        BMP_HEADER_SIZE as u64
    }

    pub fn magic_end(&self) -> u64 {
        self.header_end() + carrier_len(MAGIC.len() as u64)
    }

    pub fn extension_len_end(&self) -> u64 {
        self.magic_end() + LENGTH_CARRIER_LEN as u64
    }

    pub fn extension_end(&self) -> u64 {
        self.extension_len_end() + carrier_len(self.extension_len)
    }

    pub fn size_end(&self) -> u64 {
        self.extension_end() + LENGTH_CARRIER_LEN as u64
    }

    /// 整个帧的结束偏移，此后为原样复制的图像数据。
    pub fn data_end(&self) -> u64 {
        self.size_end() + carrier_len(self.payload_len)
    }

    /// 帧占用的载体字节数 (不含头部)。
    pub fn frame_len(&self) -> u64 {
        self.data_end() - self.header_end()
    }
}

/// `len` 个数据字节需要的载体字节数。
pub fn carrier_len(len: u64) -> u64 {
    len * BYTE_CARRIER_LEN as u64
}
