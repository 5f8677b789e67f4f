mod catalog_vm;
mod results_vm;
mod session_vm;
mod time_fmt;

pub use catalog_vm::{
    CatalogCardVm, CatalogPageVm, difficulty_option_value, map_catalog_page,
    parse_difficulty_filter,
};
pub use results_vm::{ResultOptionVm, ResultQuestionVm, ResultsVm, map_results};
pub use session_vm::{
    OptionVm, QuestionVm, SessionHeaderVm, map_questions, map_session_header, paragraphs,
};
pub use time_fmt::{format_clock, format_datetime, format_duration};
