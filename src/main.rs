use clap::Parser;
use env_logger::Env;

use bmp_stego::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode},
};

/// 程序的主入口点
///
/// 负责解析命令行参数、初始化日志，并根据指定的操作（`-e` 或 `-d`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数，参数错误时打印用法并以非零状态退出
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let command = cli.into_command().unwrap_or_else(|e| e.exit());

    // 根据操作调用相应的处理函数
    match command {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
    }
}
