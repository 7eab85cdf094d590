//! # bmp_stego 库
//!
//! 本库包含 BMP 图像 LSB 隐写工具的核心逻辑：
//! 位编解码、容量模型、自描述的帧格式以及编码/解码流水线。

// 声明库包含的所有模块。

pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod handler;
pub mod naming;

pub use decoder::{DecodeReport, FrameReader, HiddenFile, decode_file, extract};
pub use encoder::{EncodeReport, FrameWriter, encode_file};
pub use error::{Result, StegoError};
