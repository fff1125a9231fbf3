pub mod hasher;
pub mod image_uploader;
pub mod question_mapper;
pub mod report_writer;
pub mod storage_key;

pub use image_uploader::{ImageUploader, UploadMode};
pub use question_mapper::{QuestionDraft, QuestionMapper};
pub use report_writer::UpdatedDocument;
