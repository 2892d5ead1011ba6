use anyhow::Result;
use page2zip::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置，配置中的错误值会在这里给出警告
    let mut config = logger::bootstrap(Config::load)?;

    // 命令行参数优先于配置中的页面地址
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        config.target_urls = args;
    }

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
