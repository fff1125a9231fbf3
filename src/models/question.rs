use serde_json::{Map, Value};
use tracing::debug;

/// 选项标签（固定顺序）
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// 抽取器产出的原始题目
///
/// 只读视图，字段形态不统一，所以直接包装 JSON 对象并提供取值方法；
/// 改写输入文档时未知字段因此得以原样保留。
#[derive(Debug, Clone, Copy)]
pub struct RawQuestion<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawQuestion<'a> {
    /// 非对象条目返回 None
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// 抽取器分配的题目 ID（可能为空）
    pub fn id(&self) -> String {
        self.fields.get("id").map(loose_string).unwrap_or_default()
    }

    /// 纯文本题干，`question` 优先，其次 `questionText`
    pub fn question_text(&self) -> String {
        first_non_empty(self.fields, &["question", "questionText"])
            .trim()
            .to_string()
    }

    /// LaTeX 题干（可能为空）
    pub fn latex_question_text(&self) -> String {
        first_non_empty(self.fields, &["latexQuestion", "latexQuestionText"])
    }

    pub fn difficulty(&self) -> Option<&'a str> {
        self.fields.get("difficulty").and_then(Value::as_str)
    }

    pub fn options(&self) -> Option<&'a Map<String, Value>> {
        self.fields.get("options").and_then(Value::as_object)
    }

    pub fn latex_options(&self) -> Option<&'a Map<String, Value>> {
        self.fields.get("latexOptions").and_then(Value::as_object)
    }

    fn metadata(&self) -> Option<&'a Map<String, Value>> {
        self.fields.get("metadata").and_then(Value::as_object)
    }

    fn meta(&self, key: &str) -> Option<&'a Value> {
        self.metadata().and_then(|m| m.get(key))
    }

    /// 原始科目文本
    pub fn subject(&self) -> String {
        self.meta("subject").map(loose_string).unwrap_or_default()
    }

    pub fn page(&self) -> Option<i64> {
        self.meta_int("page")
    }

    pub fn question_number(&self) -> Option<i64> {
        self.meta_int("questionNumber")
    }

    /// 整数元数据；无法转换的非空值记 debug 后丢弃
    fn meta_int(&self, key: &str) -> Option<i64> {
        let value = self.meta(key).filter(|v| !v.is_null())?;
        let parsed = loose_int(value);
        if parsed.is_none() {
            debug!("metadata.{} 不是整数，已忽略: {}", key, value);
        }
        parsed
    }

    pub fn topic(&self) -> Option<String> {
        self.meta("topic")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// 只有布尔值才算数
    pub fn is_multi_part(&self) -> Option<bool> {
        self.meta("isMultiPart").and_then(Value::as_bool)
    }

    pub fn source(&self) -> Option<String> {
        self.meta("source").map(loose_string).filter(|s| !s.is_empty())
    }

    /// 图片引用（保持原始顺序）
    pub fn images(&self) -> Vec<ImageRef> {
        self.fields
            .get("images")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ImageRef::from_value).collect())
            .unwrap_or_default()
    }
}

/// 图片引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// 文件路径（相对路径以输入 JSON 所在目录为基准）
    Path(String),
    /// `data:<mime>;base64,...` 内联数据
    DataUri(String),
    /// 既没有 path 也没有 data
    Missing,
    /// 条目不是对象
    Invalid,
}

impl ImageRef {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ImageRef::Invalid;
        };

        if let Some(path) = obj.get("path").and_then(Value::as_str) {
            let path = path.trim();
            if !path.is_empty() {
                return ImageRef::Path(path.to_string());
            }
        }

        if let Some(data) = obj.get("data").and_then(Value::as_str) {
            let data = data.trim();
            if data.starts_with("data:") {
                return ImageRef::DataUri(data.to_string());
            }
        }

        ImageRef::Missing
    }

    /// 报告中记录的路径
    pub fn path(&self) -> Option<&str> {
        match self {
            ImageRef::Path(p) => Some(p),
            _ => None,
        }
    }
}

/// 按 A-D 顺序取出四个选项，缺失项为空字符串
pub fn options_to_list(options: Option<&Map<String, Value>>) -> Vec<String> {
    OPTION_LABELS
        .iter()
        .map(|label| {
            options
                .and_then(|o| o.get(*label))
                .map(loose_string)
                .unwrap_or_default()
        })
        .collect()
}

/// 是否至少有一个非空选项
pub fn has_any_non_empty_option(options: Option<&Map<String, Value>>) -> bool {
    let Some(options) = options else {
        return false;
    };
    OPTION_LABELS.iter().any(|label| {
        options
            .get(*label)
            .and_then(Value::as_str)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    })
}

fn first_non_empty(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .map(loose_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// 宽松地把 JSON 值转成字符串：null / false 视为空
fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

fn loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
