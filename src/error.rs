//! # 错误类型模块
//!
//! 定义编码与解码流水线中可能出现的全部错误。
//! 每个流水线步骤都返回 `Result<_, StegoError>`，遇到第一个错误即中止。

use crate::frame::Stage;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 本库的 `Result` 类型别名。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 隐写流水线的错误分类。
#[derive(Error, Debug)]
pub enum StegoError {
    /// 无法打开输入或输出文件。
    #[error("unable to open file '{}'", .path.display())]
    FileOpenError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 无法创建解码后的载荷文件。
    #[error("unable to create output file '{}'", .path.display())]
    FileCreateError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 扩展名不被支持或解码出的扩展名不合法。
    #[error("invalid extension '{extension}': {reason}")]
    InvalidExtension { extension: String, reason: String },

    /// 图像容量不足以容纳整个隐写帧。
    #[error("capacity exceeded: frame requires {required} carrier bytes but only {available} available")]
    CapacityExceeded { required: u64, available: u64 },

    /// 无法完整复制 54 字节的 BMP 头部。
    #[error("unable to copy bitmap header: {reason}")]
    HeaderCopyError { reason: String },

    /// 图像中没有本工具的隐写数据。
    #[error("magic marker mismatch, no hidden data found")]
    MagicMismatch,

    /// 源文件读偏移与目标文件写偏移不一致。
    #[error("offset mismatch after {stage}: source = {source_offset}, dest = {dest_offset}, expected = {expected}")]
    OffsetMismatch {
        stage: Stage,
        source_offset: u64,
        dest_offset: u64,
        expected: u64,
    },

    /// 读取到的字节数少于请求的字节数。
    #[error("short read during {stage}: expected {expected} bytes, got {actual}")]
    ShortReadError {
        stage: Stage,
        expected: u64,
        actual: u64,
    },

    /// 未能写入全部字节。
    #[error("short write during {stage}")]
    ShortWriteError {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// 无法为载荷分配缓冲区。
    #[error("unable to allocate {requested} bytes for the payload buffer")]
    AllocationError { requested: u64 },
}
