//! 内容哈希
//!
//! 同样的字节永远得到同样的摘要，与文件名和路径无关。

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// 分块读取大小（8 MiB）
pub const HASH_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// 分块计算文件的 SHA-256（十六进制）
pub async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// 计算字节缓冲区的 SHA-256（十六进制）
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_sha256_bytes_known_vector() {
        assert_eq!(sha256_bytes(b"hello"), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_file_and_bytes_agree_regardless_of_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("figure-1.png");
        let b = dir.path().join("copy_of_figure.jpg");
        std::fs::write(&a, b"hello").unwrap();
        std::fs::write(&b, b"hello").unwrap();

        assert_eq!(sha256_file(&a).await.unwrap(), HELLO_SHA256);
        assert_eq!(sha256_file(&b).await.unwrap(), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_file_larger_than_one_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data: Vec<u8> = (0..HASH_CHUNK_SIZE + 1234).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(sha256_file(&path).await.unwrap(), sha256_bytes(&data));
    }

    #[test]
    fn test_empty_file_blocking() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let digest = tokio_test::block_on(sha256_file(file.path())).unwrap();
        assert_eq!(digest, sha256_bytes(b""));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = sha256_file(Path::new("/no/such/image.png")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
