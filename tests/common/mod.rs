#![allow(dead_code)]

use async_trait::async_trait;
use question_ingest::clients::{BackendClient, RetryPolicy};
use question_ingest::config::{Config, EnvSource, ResolvedConfig};
use question_ingest::error::StorageError;
use question_ingest::models::loaders::{load_input_document, InputDocument};
use question_ingest::ObjectStore;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 没有任何环境变量
pub struct NoEnv;

impl EnvSource for NoEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }
}

/// 内存对象存储，记录每次调用
#[derive(Default)]
pub struct FakeStore {
    pub existing: Mutex<Vec<String>>,
    pub heads: Mutex<Vec<String>>,
    pub puts: Mutex<Vec<(String, String, usize)>>,
}

impl FakeStore {
    pub fn with_existing(keys: &[&str]) -> Self {
        let store = Self::default();
        *store.existing.lock().unwrap() = keys.iter().map(|k| k.to_string()).collect();
        store
    }

    pub fn head_count(&self) -> usize {
        self.heads.lock().unwrap().len()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.heads.lock().unwrap().push(key.to_string());
        Ok(self.existing.lock().unwrap().iter().any(|k| k == key))
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError> {
        let data = tokio::fs::read(path).await.map_err(|e| StorageError::Body {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.put_bytes(key, data, content_type, cache_control).await
    }

    async fn put_bytes(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        _cache_control: &str,
    ) -> Result<(), StorageError> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), data.len()));
        self.existing.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// 按脚本依次返回响应的本地 HTTP 服务；脚本用完后重复最后一条
pub struct ScriptedServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedServer {
    pub async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        Self::start_raw(
            responses
                .into_iter()
                .map(|(status, body)| http_response(status, body))
                .collect(),
        )
        .await
    }

    /// 原样写回的响应报文，写完即关闭连接
    pub async fn start_raw(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let task_hits = hits.clone();
        let task_requests = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let n = task_hits.fetch_add(1, Ordering::SeqCst);
                let response = responses[n.min(responses.len() - 1)].clone();

                let request = read_request(&mut stream).await;
                task_requests.lock().unwrap().push(request);

                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            requests,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// 收到的原始请求（请求头 + 请求体）
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn http_response(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// 声明 100 字节却只发 7 字节就断开
pub fn truncated_response() -> String {
    "HTTP/1.1 200 Scripted\r\nContent-Type: application/json\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"data\"".to_string()
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// 一个立刻被关闭的端口，连接必然失败
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// 在临时目录写入输入 JSON 与图片文件并加载
pub async fn setup(payload: Value, files: &[(&str, &[u8])]) -> (TempDir, InputDocument) {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes) in files {
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }
    let json_path = dir.path().join("paper.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&payload).unwrap()).unwrap();

    let document = load_input_document(&json_path).await.unwrap();
    (dir, document)
}

pub fn resolve(document: &InputDocument, dry_run: bool, backend_url: &str) -> ResolvedConfig {
    let config = Config {
        json_path: document.path.clone(),
        bucket: "bank".to_string(),
        public_base_url: Some("https://cdn.example.com/".to_string()),
        backend_url: backend_url.to_string(),
        api_key: Some("secret-key".to_string()),
        dry_run,
        ..Default::default()
    };
    config
        .resolve(document.path.clone(), &document.source_label(), &NoEnv)
        .unwrap()
}

/// 毫秒级退避，测试不必等待
pub fn fast_backend(config: &ResolvedConfig) -> BackendClient {
    BackendClient::new(config).unwrap().with_policy(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_jitter: Duration::from_millis(2),
    })
}
