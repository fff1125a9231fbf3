use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 科目枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    /// 物理
    Physics,
    /// 化学
    Chemistry,
    /// 数学
    Mathematics,
    /// 生物
    Biology,
}

impl Subject {
    /// 全部科目
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Mathematics,
        Subject::Biology,
    ];

    /// 获取后端使用的标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Physics => "PHYSICS",
            Subject::Chemistry => "CHEMISTRY",
            Subject::Mathematics => "MATHEMATICS",
            Subject::Biology => "BIOLOGY",
        }
    }

    /// 智能查找科目（支持模糊匹配）
    ///
    /// 抽取结果里的科目是自由文本，先精确匹配，再按子串兜底。
    pub fn find(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }

        // 先尝试精确匹配
        match s.as_str() {
            "math" | "maths" | "mathematics" => return Some(Subject::Mathematics),
            "physics" => return Some(Subject::Physics),
            "chemistry" => return Some(Subject::Chemistry),
            "biology" => return Some(Subject::Biology),
            _ => {}
        }

        // 模糊匹配
        if s.contains("math") {
            return Some(Subject::Mathematics);
        }
        if s.contains("phys") {
            return Some(Subject::Physics);
        }
        if s.contains("chem") {
            return Some(Subject::Chemistry);
        }
        if s.contains("bio") {
            return Some(Subject::Biology);
        }

        None
    }
}

/// 解析命令行覆盖值（大小写不敏感，只接受标准名称）
impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.name() == upper)
            .ok_or(upper)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_exact_names() {
        assert_eq!(Subject::find("Physics"), Some(Subject::Physics));
        assert_eq!(Subject::find("  CHEMISTRY "), Some(Subject::Chemistry));
        assert_eq!(Subject::find("maths"), Some(Subject::Mathematics));
        assert_eq!(Subject::find("biology"), Some(Subject::Biology));
    }

    #[test]
    fn test_find_substring_variants() {
        assert_eq!(Subject::find("phys"), Some(Subject::Physics));
        assert_eq!(Subject::find("Applied Mathematics II"), Some(Subject::Mathematics));
        assert_eq!(Subject::find("Organic Chem"), Some(Subject::Chemistry));
        assert_eq!(Subject::find("zoology/bio"), Some(Subject::Biology));
    }

    #[test]
    fn test_find_unmapped() {
        assert_eq!(Subject::find(""), None);
        assert_eq!(Subject::find("   "), None);
        assert_eq!(Subject::find("history"), None);
    }

    #[test]
    fn test_from_str_override() {
        assert_eq!("physics".parse::<Subject>(), Ok(Subject::Physics));
        assert_eq!(" Mathematics ".parse::<Subject>(), Ok(Subject::Mathematics));
        assert_eq!("MATH".parse::<Subject>(), Err("MATH".to_string()));
    }

    #[test]
    fn test_serializes_screaming_case() {
        let json = serde_json::to_string(&Subject::Mathematics).unwrap();
        assert_eq!(json, "\"MATHEMATICS\"");
    }
}
