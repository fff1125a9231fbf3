use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
///
/// 只有配置与文件错误会让整次运行失败；存储、API、映射错误
/// 都在单题范围内被捕获并写入报告。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（致命，运行前终止）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 输入 JSON 文件不存在
    #[error("JSON 文件不存在: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// 输入 JSON 无法解析
    #[error("无法解析 JSON ({}): {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 顶层缺少 questions 数组
    #[error("输入 JSON 无效: 顶层需要 'questions' 数组")]
    MissingQuestions,

    /// --exam-type 取值非法
    #[error("无效的 --exam-type: {value}，可选值: JEE_ADVANCED | JEE_MAIN | NEET")]
    InvalidExamType { value: String },

    /// --default-subject 取值非法
    #[error("无效的 --default-subject: {value}，可选值: BIOLOGY | CHEMISTRY | MATHEMATICS | PHYSICS")]
    InvalidSubject { value: String },

    /// 无法从来源推断考试类型
    #[error("无法从 metadata.source ({source_label:?}) 推断考试类型，请传入 --exam-type (JEE_ADVANCED|JEE_MAIN|NEET)")]
    ExamTypeUnresolved { source_label: String },

    /// 无法推导公开访问地址
    #[error("推导默认公开地址需要 region（请传入 --region 或 --public-base-url）")]
    MissingRegion,

    /// HTTP 客户端初始化失败
    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 序列化失败
    #[error("序列化 JSON 失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 对象存储错误
///
/// 文本会原样写入报告，因此保持英文。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("existence check failed for key '{key}': {message}")]
    Head { key: String, message: String },

    #[error("upload failed for key '{key}': {message}")]
    Put { key: String, message: String },

    #[error("failed to open '{}' for upload: {message}", path.display())]
    Body { path: PathBuf, message: String },
}

/// 后端 API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络层失败（连接、超时），重试耗尽
    #[error("request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 后端返回 4xx/5xx
    #[error("HTTP {status} for POST {endpoint}: {body}")]
    BadResponse {
        status: u16,
        endpoint: String,
        body: String,
    },
}

/// 题目映射错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Invalid question entry (expected object)")]
    NotAnObject,

    #[error("Missing question text")]
    MissingText,

    #[error("Missing/unmappable subject (value={raw:?}). Pass --default-subject or fix extraction.")]
    UnmappableSubject { raw: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
