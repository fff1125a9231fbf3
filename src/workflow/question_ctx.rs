//! 题目处理上下文
//!
//! 封装"我正在处理输入文件里的第几题"这一信息

use std::fmt::Display;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 题目在 `questions` 数组中的下标（从0开始，写入报告）
    pub index: usize,

    /// 题目总数（仅用于日志显示）
    pub total: usize,
}

impl QuestionCtx {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    /// 日志中显示的序号（从1开始）
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 {}/{}]", self.number(), self.total)
    }
}
