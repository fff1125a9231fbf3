//! 存储键与公开地址

/// 长期缓存（内容寻址，永不变化）
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// 默认扩展名
pub const DEFAULT_EXT: &str = ".png";

/// 构建存储键：`{prefix}/{hash 前两位}/{hash}{ext}`
///
/// 两位分片避免单个目录下对象过多。
pub fn build_key(prefix: &str, hash_hex: &str, ext: &str) -> String {
    let safe_prefix = prefix.trim_matches('/');
    let safe_ext = normalize_ext(ext);
    let shard = hash_hex.get(..2).unwrap_or(hash_hex);
    format!("{}/{}/{}{}", safe_prefix, shard, hash_hex, safe_ext)
}

/// 公开地址：`{base}/{key}`
pub fn public_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{}", strip_trailing_slash(public_base_url), key)
}

/// 默认公开地址（S3 虚拟主机风格）
pub fn default_public_base_url(bucket: &str, region: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com", bucket, region)
}

/// 去掉一个结尾的 `/`
pub fn strip_trailing_slash(value: &str) -> &str {
    value.strip_suffix('/').unwrap_or(value)
}

/// 扩展名补全前导 `.`，空值回落到 `.png`
pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return DEFAULT_EXT.to_string();
    }
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// 根据扩展名推断 Content-Type
pub fn content_type_for_ext(ext: &str) -> &'static str {
    match normalize_ext(ext).to_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// 根据 MIME 推断扩展名（内联图片使用）
pub fn ext_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => ".jpg",
        "image/webp" => ".webp",
        _ => DEFAULT_EXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "ab12cd34ef";

    #[test]
    fn test_build_key_shards_by_hash_prefix() {
        assert_eq!(
            build_key("question-images", HASH, ".png"),
            "question-images/ab/ab12cd34ef.png"
        );
    }

    #[test]
    fn test_build_key_strips_prefix_slashes_and_fixes_ext() {
        assert_eq!(build_key("/imgs/", HASH, "jpg"), "imgs/ab/ab12cd34ef.jpg");
        assert_eq!(build_key("imgs", HASH, ""), "imgs/ab/ab12cd34ef.png");
        assert_eq!(build_key("imgs", HASH, "."), "imgs/ab/ab12cd34ef.png");
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("https://cdn.example.com/", "imgs/ab/x.png"),
            "https://cdn.example.com/imgs/ab/x.png"
        );
        assert_eq!(
            default_public_base_url("bank", "ap-south-1"),
            "https://bank.s3.ap-south-1.amazonaws.com"
        );
    }

    #[test]
    fn test_content_type_for_ext() {
        assert_eq!(content_type_for_ext(".PNG"), "image/png");
        assert_eq!(content_type_for_ext(".jpeg"), "image/jpeg");
        assert_eq!(content_type_for_ext("webp"), "image/webp");
        assert_eq!(content_type_for_ext(".gif"), "application/octet-stream");
    }

    #[test]
    fn test_ext_for_mime() {
        assert_eq!(ext_for_mime("image/jpeg"), ".jpg");
        assert_eq!(ext_for_mime("image/webp"), ".webp");
        assert_eq!(ext_for_mime("image/png"), ".png");
        assert_eq!(ext_for_mime("image/svg+xml"), ".png");
    }
}
