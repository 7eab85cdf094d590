//! # 载体游标模块
//!
//! 对读写句柄进行包装，显式记录已经消费或写出的字节偏移，
//! 使“源偏移 == 目标偏移”这一不变式可以在每一步之后单独校验。

use crate::error::{Result, StegoError};
use crate::frame::Stage;
use std::io::{ErrorKind, Read, Write};

const COPY_CHUNK: usize = 8 * 1024;

/// 记录读取偏移的读取器。
#[derive(Debug)]
pub struct CarrierReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> CarrierReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// 当前已经消费的字节数。
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 访问底层读取器。
    ///
    /// 只应在尚未读取任何字节时使用，并且调用方需要把读取位置恢复到开头，
    /// 否则记录的偏移将失去意义。
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// 尽可能填满 `buf`，返回实际读取的字节数 (遇到 EOF 时可能少于 `buf.len()`)。
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.offset += filled as u64;
                    return Err(e);
                }
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }

    /// 读取恰好 `buf.len()` 个字节。
    ///
    /// # Errors
    ///
    /// 读取的字节不足或底层读取失败时返回 `ShortReadError`。
    pub fn read_block(&mut self, buf: &mut [u8], stage: Stage) -> Result<()> {
        let start = self.offset;
        let expected = buf.len() as u64;
        let short = |actual: u64| StegoError::ShortReadError {
            stage,
            expected,
            actual,
        };

        match self.fill(buf) {
            Ok(n) if n as u64 == expected => Ok(()),
            Ok(n) => Err(short(n as u64)),
            Err(_) => Err(short(self.offset - start)),
        }
    }

    /// 把剩余的全部字节原样复制到 `writer`，返回复制的字节数。
    pub fn copy_to<W: Write>(&mut self, writer: &mut CarrierWriter<W>, stage: Stage) -> Result<u64> {
        let mut chunk = vec![0u8; COPY_CHUNK];
        let mut copied = 0u64;
        loop {
            let start = self.offset;
            let n = match self.fill(&mut chunk) {
                Ok(n) => n,
                Err(_) => {
                    return Err(StegoError::ShortReadError {
                        stage,
                        expected: COPY_CHUNK as u64,
                        actual: self.offset - start,
                    });
                }
            };
            if n == 0 {
                break;
            }
            writer.write_block(&chunk[..n], stage)?;
            copied += n as u64;
        }
        Ok(copied)
    }
}

/// 记录写入偏移的写入器。
#[derive(Debug)]
pub struct CarrierWriter<W> {
    inner: W,
    offset: u64,
}

impl<W: Write> CarrierWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    /// 当前已经写出的字节数。
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// 写出整个 `buf`。
    ///
    /// # Errors
    ///
    /// 未能写出全部字节时返回 `ShortWriteError`。
    pub fn write_block(&mut self, buf: &[u8], stage: Stage) -> Result<()> {
        self.inner
            .write_all(buf)
            .map_err(|source| StegoError::ShortWriteError { stage, source })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self, stage: Stage) -> Result<()> {
        self.inner
            .flush()
            .map_err(|source| StegoError::ShortWriteError { stage, source })
    }
}
