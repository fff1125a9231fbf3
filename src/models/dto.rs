use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::exam::{Difficulty, ExamType};
use crate::models::subject::Subject;

/// 提交给后端的题目数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub question_text: String,
    pub latex_question_text: String,
    pub subject: Subject,
    pub exam_type: ExamType,
    pub difficulty: Difficulty,
    /// 固定四项，顺序 A-D
    pub options: Vec<String>,
    pub image_urls: Vec<String>,
    pub year: Option<i32>,
    /// 抽取器记录的页码
    pub paper_number: Option<i64>,
    pub question_number: Option<i64>,
    pub topic: Option<String>,
    pub is_active: bool,
    /// 溯源信息：source、scriptQuestionId、isMultiPart、imageHash{i}
    pub metadata: BTreeMap<String, String>,
}
