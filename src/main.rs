use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use question_ingest::utils::logging;
use question_ingest::{Config, IngestRunner};

/// 上传题目图片到 S3（按 sha256 去重）并把题目导入后端
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// 抽取结果 JSON 路径
    #[arg(long = "json")]
    pub json: PathBuf,

    /// S3 存储桶
    #[arg(long)]
    pub bucket: String,

    /// 存储键前缀
    #[arg(long, default_value = "question-images")]
    pub prefix: String,

    /// AWS region（也用于推导默认公开地址）
    #[arg(long)]
    pub region: Option<String>,

    /// 公开访问地址，如 https://dxxxx.cloudfront.net；
    /// 省略时为 https://{bucket}.s3.{region}.amazonaws.com
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// 后端地址
    #[arg(long, default_value = "http://localhost:8080")]
    pub backend_url: String,

    /// 作为 X-API-KEY 发送（也可用 OPENFERMI_API_KEY / API_KEY 环境变量）
    #[arg(long)]
    pub api_key: Option<String>,

    /// 考试类型覆盖值（JEE_ADVANCED|JEE_MAIN|NEET），无法推断时必填
    #[arg(long)]
    pub exam_type: Option<String>,

    /// 题目缺少学科时的默认值（PHYSICS|CHEMISTRY|MATHEMATICS|BIOLOGY）
    #[arg(long)]
    pub default_subject: Option<String>,

    /// 年份覆盖值
    #[arg(long)]
    pub year: Option<i32>,

    /// 不上传、不提交，只计算键与地址并写报告
    #[arg(long)]
    pub dry_run: bool,

    /// 输出 <json>.s3.json，图片路径替换为公开地址
    #[arg(long)]
    pub write_updated_json: bool,

    /// HTTP 超时（秒）
    #[arg(long = "timeout", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        Config {
            json_path: args.json,
            bucket: args.bucket,
            prefix: args.prefix,
            region: args.region,
            public_base_url: args.public_base_url,
            backend_url: args.backend_url,
            api_key: args.api_key,
            exam_type: args.exam_type,
            default_subject: args.default_subject,
            year: args.year,
            dry_run: args.dry_run,
            write_updated_json: args.write_updated_json,
            timeout_secs: args.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    // 初始化日志
    logging::init();

    let config = Config::from(cli_args);

    // 致命错误（输入、配置、客户端初始化）退出码为 2
    let runner = match IngestRunner::initialize(config).await {
        Ok(runner) => runner,
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    match runner.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ 运行失败: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
