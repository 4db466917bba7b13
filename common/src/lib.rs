//! Evidence AI Common Library
//!
//! CLIとHTTPサーバで共有される型と検証ロジック（I/Oなし）

pub mod error;
pub mod evaluation;
pub mod identity;
pub mod normalize;
pub mod parser;
pub mod period;
pub mod prompts;
pub mod similarity;
pub mod types;

pub use error::{Error, Result};
pub use evaluation::evaluate;
pub use identity::{forward_fill, split_employee, split_project, split_subproject};
pub use normalize::{names_match, normalize_name};
pub use parser::{parse_extraction_response, strip_code_fence};
pub use period::extract_period;
pub use prompts::{build_extraction_prompt, NAME_NOT_FOUND};
pub use types::{
    EmployeeRecord, ExpectedValues, ExtractionReply, TaskList, ValidationResult, ERROR_PREFIX,
    PERIOD_YEAR,
};
