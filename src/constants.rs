/// BMP 文件的标准头部大小 (字节)。
/// 隐写帧紧跟在这个头部之后，从像素数据开始。
pub const BMP_HEADER_SIZE: usize = 54;

/// 头部中图像宽度字段 (小端 `i32`) 的偏移量。
pub const WIDTH_OFFSET: u64 = 18;

/// 头部中图像高度字段 (小端 `i32`) 的偏移量，紧跟在宽度之后。
pub const HEIGHT_OFFSET: u64 = 22;

/// 每个像素占用的字节数 (24 位 RGB)。
pub const BYTES_PER_PIXEL: u64 = 3;

/// 用于识别本工具隐写数据的魔数标记。
pub const MAGIC: &[u8; 2] = b"#*";

/// 隐藏一个字节所需的载体字节数。
/// 每个载体字节只使用最低 1 位，因此 8 bits 需要 8 个载体字节。
pub const BYTE_CARRIER_LEN: usize = 8;

/// 隐藏一个 `u32` 长度字段所需的载体字节数 (32 bits)。
pub const LENGTH_CARRIER_LEN: usize = 32;

/// 解码时允许的扩展名最大字节数 (包含开头的 `.`)。
pub const MAX_EXTENSION_LEN: usize = 16;

/// 允许被隐藏的载荷文件扩展名白名单。
pub const ALLOWED_EXTENSIONS: [&str; 5] = [".txt", ".c", ".sh", ".pdf", ".cpp"];

/// 未指定输出路径时，编码结果的默认文件名。
pub const DEFAULT_STEGO_NAME: &str = "stego.bmp";

/// 未指定输出名称时，解码结果的默认基础文件名。
pub const DEFAULT_DECODED_BASE: &str = "decoded";
