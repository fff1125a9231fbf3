pub mod dto;
pub mod exam;
pub mod image;
pub mod loaders;
pub mod question;
pub mod report;
pub mod subject;

pub use dto::QuestionDto;
pub use exam::{Difficulty, ExamType};
pub use image::{ImageStatus, UploadedImage};
pub use loaders::{load_input_document, InputDocument};
pub use question::{ImageRef, RawQuestion};
pub use report::{ImageDetail, QuestionEntry, QuestionStatus, RunReport, Totals};
pub use subject::Subject;
