//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构：
//! `-e <source.bmp> <payload-file> [output.bmp]` 或 `-d <stego.bmp> [output-base-name]`。
//! 两种操作互斥，且必须指定其中之一。

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 图像中隐藏或恢复文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 图像中隐藏或恢复文件。\n支持的载荷类型：.txt, .c, .sh, .pdf, .cpp",
    group(ArgGroup::new("operation").required(true).args(["encode", "decode"]))
)]
pub struct Cli {
    /// 编码：<source.bmp> <payload-file> [output.bmp]，输出默认为 stego.bmp。
    #[arg(
        short = 'e',
        long = "encode",
        num_args = 2..=3,
        value_names = ["SOURCE_BMP", "PAYLOAD", "OUTPUT_BMP"]
    )]
    pub encode: Option<Vec<PathBuf>>,

    /// 解码：<stego.bmp> [output-base-name]，输出基础名默认为 decoded。
    #[arg(
        short = 'd',
        long = "decode",
        num_args = 1..=2,
        value_names = ["STEGO_BMP", "OUTPUT_BASE"]
    )]
    pub decode: Option<Vec<PathBuf>>,

    /// 输出每个步骤的调试日志。
    #[arg(short, long)]
    pub verbose: bool,
}

/// 解析后的操作：encode (隐藏) 或 decode (恢复)。
#[derive(Debug)]
pub enum Commands {
    Encode(EncodeArgs),
    Decode(DecodeArgs),
}

/// 'encode' 操作所需的参数。
#[derive(Debug, Clone)]
pub struct EncodeArgs {
    /// 用于隐写的 BMP 源图像。
    pub source: PathBuf,

    /// 要隐藏的载荷文件。
    pub payload: PathBuf,

    /// 隐写结果的输出路径。
    pub output: Option<PathBuf>,
}

/// 'decode' 操作所需的参数。
#[derive(Debug, Clone)]
pub struct DecodeArgs {
    /// 含有隐藏数据的 BMP 图像。
    pub stego: PathBuf,

    /// 恢复文件的基础名称，扩展名取自图像中记录的扩展名。
    pub output: Option<PathBuf>,
}

impl Cli {
    /// 把命令行参数转换为具体的操作。
    ///
    /// # Errors
    ///
    /// 参数数量不符合要求时返回 `clap` 的用法错误。
    pub fn into_command(self) -> Result<Commands, clap::Error> {
        match (self.encode, self.decode) {
            (Some(values), None) => {
                let mut values = values.into_iter();
                match (values.next(), values.next(), values.next(), values.next()) {
                    (Some(source), Some(payload), output, None) => Ok(Commands::Encode(EncodeArgs {
                        source,
                        payload,
                        output,
                    })),
                    _ => Err(usage_error("-e requires <source.bmp> <payload-file> [output.bmp]")),
                }
            }
            (None, Some(values)) => {
                let mut values = values.into_iter();
                match (values.next(), values.next(), values.next()) {
                    (Some(stego), output, None) => Ok(Commands::Decode(DecodeArgs { stego, output })),
                    _ => Err(usage_error("-d requires <stego.bmp> [output-base-name]")),
                }
            }
            _ => Err(usage_error("use -e for encoding or -d for decoding")),
        }
    }
}

fn usage_error(message: &str) -> clap::Error {
    Cli::command().error(ErrorKind::WrongNumberOfValues, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(args)?.into_command()
    }

    #[test]
    fn encode_with_default_output() {
        match parse(&["bmp_stego", "-e", "cover.bmp", "note.txt"]).unwrap() {
            Commands::Encode(args) => {
                assert_eq!(args.source, PathBuf::from("cover.bmp"));
                assert_eq!(args.payload, PathBuf::from("note.txt"));
                assert_eq!(args.output, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn encode_with_output() {
        match parse(&["bmp_stego", "-e", "cover.bmp", "note.txt", "out.bmp"]).unwrap() {
            Commands::Encode(args) => assert_eq!(args.output, Some(PathBuf::from("out.bmp"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn decode_with_and_without_base() {
        match parse(&["bmp_stego", "-d", "stego.bmp"]).unwrap() {
            Commands::Decode(args) => {
                assert_eq!(args.stego, PathBuf::from("stego.bmp"));
                assert_eq!(args.output, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match parse(&["bmp_stego", "-d", "stego.bmp", "secret.txt"]).unwrap() {
            Commands::Decode(args) => assert_eq!(args.output, Some(PathBuf::from("secret.txt"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn argument_count_violations_are_rejected() {
        assert!(parse(&["bmp_stego"]).is_err());
        assert!(parse(&["bmp_stego", "-e", "cover.bmp"]).is_err());
        assert!(parse(&["bmp_stego", "-e", "a.bmp", "b.txt", "c.bmp", "d"]).is_err());
        assert!(parse(&["bmp_stego", "-d"]).is_err());
        assert!(parse(&["bmp_stego", "-d", "a.bmp", "b", "c"]).is_err());
        assert!(parse(&["bmp_stego", "-x", "a.bmp"]).is_err());
        assert!(parse(&["bmp_stego", "-e", "a.bmp", "b.txt", "-d", "c.bmp"]).is_err());
        assert!(parse(&["bmp_stego", "-e", "a.bmp", "b.txt", "-e", "c.bmp", "d.bmp"]).is_err());
    }
}
