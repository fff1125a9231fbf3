//! 题目映射 - 业务能力层
//!
//! 把抽取器产出的松散 JSON 规范化为后端需要的 `QuestionDto`。
//! 不访问网络，不处理图片上传。

use std::collections::BTreeMap;

use crate::config::ResolvedConfig;
use crate::error::MappingError;
use crate::models::dto::QuestionDto;
use crate::models::exam::{Difficulty, ExamType};
use crate::models::image::UploadedImage;
use crate::models::question::{has_any_non_empty_option, options_to_list, RawQuestion};
use crate::models::subject::Subject;

/// 通过校验、等待图片地址的题目
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub script_question_id: String,
    pub question_text: String,
    pub latex_question_text: String,
    pub subject: Subject,
    pub difficulty: Difficulty,
    pub options: Vec<String>,
    pub paper_number: Option<i64>,
    pub question_number: Option<i64>,
    pub topic: Option<String>,
    pub is_multi_part: Option<bool>,
}

/// 题目映射服务
///
/// 职责：
/// - 校验题干与学科
/// - 规范化难度、选项
/// - 组装 DTO 与溯源 metadata
#[derive(Debug, Clone)]
pub struct QuestionMapper {
    source: String,
    exam_type: ExamType,
    default_subject: Option<Subject>,
    year: Option<i32>,
}

impl QuestionMapper {
    pub fn new(
        source: impl Into<String>,
        exam_type: ExamType,
        default_subject: Option<Subject>,
        year: Option<i32>,
    ) -> Self {
        Self {
            source: source.into(),
            exam_type,
            default_subject,
            year,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.source.clone(),
            config.exam_type,
            config.default_subject,
            config.year,
        )
    }

    /// 校验并规范化一道题（不含图片）
    ///
    /// # 返回
    /// 题干为空或学科无法确定时返回 `MappingError`
    pub fn map(&self, raw: &RawQuestion<'_>) -> Result<QuestionDraft, MappingError> {
        let question_text = raw.question_text();
        if question_text.is_empty() {
            return Err(MappingError::MissingText);
        }

        let latex_question_text = match raw.latex_question_text() {
            latex if latex.is_empty() => question_text.clone(),
            latex => latex,
        };

        let subject_raw = raw.subject();
        let subject = Subject::find(&subject_raw)
            .or(self.default_subject)
            .ok_or(MappingError::UnmappableSubject { raw: subject_raw })?;

        let chosen_options = if has_any_non_empty_option(raw.latex_options()) {
            raw.latex_options()
        } else {
            raw.options()
        };

        Ok(QuestionDraft {
            script_question_id: raw.id(),
            question_text,
            latex_question_text,
            subject,
            difficulty: Difficulty::from_raw(raw.difficulty()),
            options: options_to_list(chosen_options),
            paper_number: raw.page(),
            question_number: raw.question_number(),
            topic: raw.topic(),
            is_multi_part: raw.is_multi_part(),
        })
    }

    /// 用已解析的图片组装最终 DTO
    pub fn build_dto(&self, draft: QuestionDraft, images: &[UploadedImage]) -> QuestionDto {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), self.source.clone());
        if !draft.script_question_id.is_empty() {
            metadata.insert(
                "scriptQuestionId".to_string(),
                draft.script_question_id.clone(),
            );
        }
        if let Some(multi) = draft.is_multi_part {
            metadata.insert("isMultiPart".to_string(), multi.to_string());
        }
        for (i, img) in images.iter().enumerate() {
            if !img.hash.is_empty() {
                metadata.insert(format!("imageHash{}", i), img.hash.clone());
            }
        }

        QuestionDto {
            question_text: draft.question_text,
            latex_question_text: draft.latex_question_text,
            subject: draft.subject,
            exam_type: self.exam_type,
            difficulty: draft.difficulty,
            options: draft.options,
            image_urls: images.iter().map(|img| img.url.clone()).collect(),
            year: self.year,
            paper_number: draft.paper_number,
            question_number: draft.question_number,
            topic: draft.topic,
            is_active: true,
            metadata,
        }
    }
}
