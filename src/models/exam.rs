//! 考试类型、难度与年份推断

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// 考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamType {
    JeeAdvanced,
    JeeMain,
    Neet,
}

impl ExamType {
    pub const ALL: [ExamType; 3] = [ExamType::JeeAdvanced, ExamType::JeeMain, ExamType::Neet];

    pub fn name(self) -> &'static str {
        match self {
            ExamType::JeeAdvanced => "JEE_ADVANCED",
            ExamType::JeeMain => "JEE_MAIN",
            ExamType::Neet => "NEET",
        }
    }

    /// 从来源标签推断考试类型
    ///
    /// 最后的 "main" 子串匹配很宽松，含糊时应通过 `--exam-type` 覆盖。
    pub fn infer(source: &str) -> Option<Self> {
        let s = source.to_lowercase();
        if s.contains("neet") {
            return Some(ExamType::Neet);
        }
        if s.contains("advanced") {
            return Some(ExamType::JeeAdvanced);
        }
        if jee_main_regex().is_match(&s) || s.contains("main") {
            return Some(ExamType::JeeMain);
        }
        None
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        ExamType::ALL
            .into_iter()
            .find(|exam| exam.name() == upper)
            .ok_or(upper)
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// 未识别（包括缺失）一律映射为 MEDIUM
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|d| d.trim().to_lowercase()).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("hard") => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

/// 从来源标签中提取第一个年份（1900-2099）
pub fn extract_year(text: &str) -> Option<i32> {
    year_regex()
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

fn jee_main_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bjee\s*main\b").expect("static regex"))
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("static regex"))
}
