use std::path::PathBuf;

use anyhow::Result;
use tracing::error;

use lecture_quiz::utils::logging;
use lecture_quiz::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("用法: lecture_quiz <讲义文件>...");
        return Ok(());
    }

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    if let Err(e) = app.run(&paths).await {
        error!("❌ 运行失败: {:#}", e);
        return Err(e);
    }

    Ok(())
}
