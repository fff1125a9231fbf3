use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::infrastructure::StaticCredentials;
use crate::models::exam::{extract_year, ExamType};
use crate::models::subject::Subject;
use crate::services::storage_key::{default_public_base_url, strip_trailing_slash};

/// 程序配置（命令行原始取值）
#[derive(Clone, Debug)]
pub struct Config {
    /// 抽取结果 JSON 路径
    pub json_path: PathBuf,
    /// S3 存储桶
    pub bucket: String,
    /// 存储键前缀
    pub prefix: String,
    pub region: Option<String>,
    /// 公开访问地址（如 CDN 域名）
    pub public_base_url: Option<String>,
    /// 后端地址
    pub backend_url: String,
    pub api_key: Option<String>,
    /// 考试类型覆盖值
    pub exam_type: Option<String>,
    /// 题目缺少学科时的默认值
    pub default_subject: Option<String>,
    /// 年份覆盖值
    pub year: Option<i32>,
    /// 演练模式：不上传、不提交
    pub dry_run: bool,
    /// 是否输出改写图片地址后的 JSON
    pub write_updated_json: bool,
    /// HTTP 超时（秒）
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json_path: PathBuf::new(),
            bucket: String::new(),
            prefix: "question-images".to_string(),
            region: None,
            public_base_url: None,
            backend_url: "http://localhost:8080".to_string(),
            api_key: None,
            exam_type: None,
            default_subject: None,
            year: None,
            dry_run: false,
            write_updated_json: false,
            timeout_secs: 30,
        }
    }
}

/// 环境变量来源
pub trait EnvSource {
    /// 读取变量；未设置或为空时返回 None
    fn var(&self, key: &str) -> Option<String>;

    /// 依次读取，返回第一个有值的
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.var(k))
    }
}

/// 进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// 解析完成、可直接使用的配置
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// 输入文件绝对路径
    pub input_path: PathBuf,
    /// 来源标签
    pub source: String,
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    /// 已去掉结尾 `/`
    pub public_base_url: String,
    /// 已去掉结尾 `/`
    pub backend_url: String,
    pub api_key: Option<String>,
    pub exam_type: ExamType,
    pub default_subject: Option<Subject>,
    pub year: Option<i32>,
    pub dry_run: bool,
    pub write_updated_json: bool,
    pub timeout: Duration,
    /// 仅在 AWS_* 凭证缺失时由 S3_* 变量补上
    pub s3_credentials: Option<StaticCredentials>,
}

impl Config {
    /// 解析配置
    ///
    /// 顺序：公开地址 → API Key → 覆盖值校验 → 考试类型推断 → 年份。
    ///
    /// # 参数
    /// - `input_path`: 已规范化的输入路径
    /// - `source`: 输入文档的来源标签
    /// - `env`: 环境变量来源
    ///
    /// # 返回
    /// 解析后的配置，或致命的 `ConfigError`
    pub fn resolve(
        &self,
        input_path: PathBuf,
        source: &str,
        env: &dyn EnvSource,
    ) -> Result<ResolvedConfig, ConfigError> {
        let region = self
            .region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| env.first_of(&["AWS_REGION", "AWS_DEFAULT_REGION"]));

        let public_base_url = match self.public_base_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => strip_trailing_slash(url).to_string(),
            None => {
                let region = region.as_deref().ok_or(ConfigError::MissingRegion)?;
                default_public_base_url(&self.bucket, region)
            }
        };

        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| env.first_of(&["OPENFERMI_API_KEY", "API_KEY", "X_API_KEY"]));

        let exam_override = self
            .exam_type
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.parse::<ExamType>()
                    .map_err(|value| ConfigError::InvalidExamType { value })
            })
            .transpose()?;

        let default_subject = self
            .default_subject
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.parse::<Subject>()
                    .map_err(|value| ConfigError::InvalidSubject { value })
            })
            .transpose()?;

        let exam_type = exam_override
            .or_else(|| ExamType::infer(source))
            .ok_or_else(|| ConfigError::ExamTypeUnresolved {
                source_label: source.to_string(),
            })?;

        let year = self.year.or_else(|| extract_year(source));

        Ok(ResolvedConfig {
            input_path,
            source: source.to_string(),
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
            region,
            public_base_url,
            backend_url: strip_trailing_slash(&self.backend_url).to_string(),
            api_key,
            exam_type,
            default_subject,
            year,
            dry_run: self.dry_run,
            write_updated_json: self.write_updated_json,
            timeout: Duration::from_secs(self.timeout_secs),
            s3_credentials: static_credentials(env),
        })
    }
}

/// 复用后端风格的 S3_* 凭证变量
fn static_credentials(env: &dyn EnvSource) -> Option<StaticCredentials> {
    if env.var("AWS_ACCESS_KEY_ID").is_some() {
        return None;
    }
    let access_key_id = env.var("S3_ACCESS_KEY_ID")?;
    let secret_access_key = env.first_of(&["AWS_SECRET_ACCESS_KEY", "S3_SECRET_ACCESS_KEY"])?;
    Some(StaticCredentials {
        access_key_id,
        secret_access_key,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    impl EnvSource for HashMap<&'static str, &'static str> {
        fn var(&self, key: &str) -> Option<String> {
            self.get(key).map(|v| v.to_string()).filter(|v| !v.is_empty())
        }
    }

    /// 供其他模块测试使用的固定配置
    pub fn resolved_config() -> ResolvedConfig {
        ResolvedConfig {
            input_path: PathBuf::from("/data/paper.json"),
            source: "JEE Main 2023".to_string(),
            bucket: "bank".to_string(),
            prefix: "question-images".to_string(),
            region: Some("ap-south-1".to_string()),
            public_base_url: "https://cdn.example.com".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            api_key: None,
            exam_type: ExamType::JeeMain,
            default_subject: None,
            year: Some(2023),
            dry_run: false,
            write_updated_json: false,
            timeout: Duration::from_secs(30),
            s3_credentials: None,
        }
    }

    fn config() -> Config {
        Config {
            json_path: PathBuf::from("paper.json"),
            bucket: "bank".to_string(),
            ..Default::default()
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.prefix, "question-images");
        assert_eq!(c.backend_url, "http://localhost:8080");
        assert_eq!(c.timeout_secs, 30);
        assert!(!c.dry_run);
    }

    #[test]
    fn test_region_from_env_builds_public_url() {
        let e = env(&[("AWS_DEFAULT_REGION", "eu-west-1")]);
        let r = config().resolve(PathBuf::from("/p.json"), "JEE Main 2023", &e).unwrap();
        assert_eq!(r.region.as_deref(), Some("eu-west-1"));
        assert_eq!(r.public_base_url, "https://bank.s3.eu-west-1.amazonaws.com");
        assert_eq!(r.exam_type, ExamType::JeeMain);
        assert_eq!(r.year, Some(2023));
    }

    #[test]
    fn test_cli_region_beats_env() {
        let e = env(&[("AWS_REGION", "eu-west-1")]);
        let mut c = config();
        c.region = Some("us-east-1".to_string());
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &e).unwrap();
        assert_eq!(r.public_base_url, "https://bank.s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_missing_region_without_public_url_is_fatal() {
        let err = config()
            .resolve(PathBuf::from("/p.json"), "NEET 2020", &env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRegion));
    }

    #[test]
    fn test_explicit_urls_strip_one_trailing_slash() {
        let mut c = config();
        c.public_base_url = Some("https://cdn.example.com/".to_string());
        c.backend_url = "http://api.local:9000/".to_string();
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &env(&[])).unwrap();
        assert_eq!(r.public_base_url, "https://cdn.example.com");
        assert_eq!(r.backend_url, "http://api.local:9000");
        assert_eq!(r.region, None);
    }

    #[test]
    fn test_api_key_env_precedence() {
        let mut c = config();
        c.public_base_url = Some("https://cdn".to_string());
        let e = env(&[("API_KEY", "second"), ("X_API_KEY", "third")]);
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &e).unwrap();
        assert_eq!(r.api_key.as_deref(), Some("second"));

        c.api_key = Some("cli".to_string());
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &e).unwrap();
        assert_eq!(r.api_key.as_deref(), Some("cli"));
    }

    #[test]
    fn test_overrides_validated_before_inference() {
        let mut c = config();
        c.public_base_url = Some("https://cdn".to_string());
        c.exam_type = Some("gate".to_string());
        let err = c.resolve(PathBuf::from("/p.json"), "Unknown", &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExamType { ref value } if value == "GATE"));

        c.exam_type = None;
        c.default_subject = Some("history".to_string());
        let err = c.resolve(PathBuf::from("/p.json"), "Unknown", &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubject { .. }));
    }

    #[test]
    fn test_exam_type_override_and_unresolved() {
        let mut c = config();
        c.public_base_url = Some("https://cdn".to_string());
        let err = c.resolve(PathBuf::from("/p.json"), "Unknown", &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ExamTypeUnresolved { .. }));

        c.exam_type = Some(" jee_advanced ".to_string());
        c.default_subject = Some("physics".to_string());
        c.year = Some(2019);
        let r = c.resolve(PathBuf::from("/p.json"), "NEET 2020", &env(&[])).unwrap();
        assert_eq!(r.exam_type, ExamType::JeeAdvanced);
        assert_eq!(r.default_subject, Some(Subject::Physics));
        assert_eq!(r.year, Some(2019));
    }

    #[test]
    fn test_static_credentials_only_when_aws_keys_absent() {
        let mut c = config();
        c.public_base_url = Some("https://cdn".to_string());

        let e = env(&[("S3_ACCESS_KEY_ID", "AKIA"), ("S3_SECRET_ACCESS_KEY", "secret")]);
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &e).unwrap();
        let creds = r.s3_credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKIA");
        assert!(!format!("{:?}", creds).contains("\"secret\""));

        let e = env(&[
            ("AWS_ACCESS_KEY_ID", "AWS"),
            ("S3_ACCESS_KEY_ID", "AKIA"),
            ("S3_SECRET_ACCESS_KEY", "secret"),
        ]);
        let r = c.resolve(PathBuf::from("/p.json"), "NEET", &e).unwrap();
        assert!(r.s3_credentials.is_none());
    }
}
