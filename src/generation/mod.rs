//! Synthesis: format inference, budgeting, prompting, generation, citations

pub mod attribution;
pub mod budget;
pub mod citation;
pub mod format;
pub mod generate;
pub mod prompt;

pub use attribution::{browsable_url, format_page_range, AttributionBuilder};
pub use budget::{apply_budget, estimate_tokens, BudgetConfig};
pub use citation::{extract_and_normalize, extract_citations, MAX_CITATION_CHARS};
pub use format::{classify, FormatDecision, FormatType, LengthClass, StructureStyle};
pub use generate::{fallback_answer, AnswerGenerator, GeneratedAnswer, FALLBACK_MODEL_SENTINEL};
pub use prompt::PromptAssembler;
