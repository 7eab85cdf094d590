//! # 位编解码模块
//!
//! 在载体字节的最低有效位 (LSB) 中写入或读出数据，高位在前 (MSB-first)。
//! 载体字节的其余 7 位保持不变。

use crate::constants::{BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN};

/// 把 `value` 的 `bits` 个低位依次写入 `carriers` 的最低位，高位在前。
fn embed_bits(value: u32, bits: usize, carriers: &mut [u8]) {
    for (i, byte) in carriers.iter_mut().take(bits).enumerate() {
        let bit = ((value >> (bits - 1 - i)) & 1) as u8;
        *byte = (*byte & 0xFE) | bit;
    }
}

fn extract_bits(carriers: &[u8]) -> u32 {
    carriers
        .iter()
        .fold(0u32, |acc, &byte| (acc << 1) | (byte & 1) as u32)
}

/// 将一个字节编码进 8 个载体字节。
pub fn encode_byte(value: u8, carriers: &mut [u8; BYTE_CARRIER_LEN]) {
    embed_bits(value as u32, BYTE_CARRIER_LEN, carriers);
}

/// 从 8 个载体字节中解码出一个字节，是 [`encode_byte`] 的逆运算。
pub fn decode_byte(carriers: &[u8; BYTE_CARRIER_LEN]) -> u8 {
    extract_bits(carriers) as u8
}

/// 将一个 32 位长度编码进 32 个载体字节。
pub fn encode_length(value: u32, carriers: &mut [u8; LENGTH_CARRIER_LEN]) {
    embed_bits(value, LENGTH_CARRIER_LEN, carriers);
}

/// 从 32 个载体字节中解码出一个 32 位长度。
pub fn decode_length(carriers: &[u8; LENGTH_CARRIER_LEN]) -> u32 {
    extract_bits(carriers)
}
