//! Prompt assembly from format decision, budgeted context, and history

use crate::types::{ChatTurn, ExcerptItem, SummaryItem};

use super::format::{FormatDecision, FormatType};

/// Builds the generation prompt
///
/// Assembly is deterministic for identical inputs. Context items are labeled
/// `Document N` (summaries) and `Chunk N` (excerpts), 1-based, matching the
/// placeholder labels the citation normalizer rewrites.
pub struct PromptAssembler {
    domain_context: String,
}

impl PromptAssembler {
    /// Create an assembler with the configured domain context block
    pub fn new(domain_context: String) -> Self {
        Self { domain_context }
    }

    /// Assemble the full generation prompt
    pub fn assemble(
        &self,
        question: &str,
        history: &[ChatTurn],
        decision: &FormatDecision,
        summaries: &[SummaryItem],
        excerpts: &[ExcerptItem],
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.domain_context);
        prompt.push_str("\n\n");

        if !history.is_empty() {
            prompt.push_str("## Conversation So Far\n\n");
            for turn in history {
                prompt.push_str(&format!("{}: {}\n", turn.role.label(), turn.content));
            }
            prompt.push('\n');
        }

        prompt.push_str("## Response Format\n\n");
        prompt.push_str(format_instructions(decision));
        prompt.push('\n');
        prompt.push_str(decision.structure.guidance());
        prompt.push('\n');
        prompt.push_str(decision.length.guidance());
        prompt.push('\n');
        prompt.push_str(&format!(
            "Write in a {} style grounded strictly in the provided material.\n\n",
            decision.prose_style
        ));

        prompt.push_str("## Citation Requirements\n\n");
        prompt.push_str(&format!(
            "Cite at least {} distinct sources inline using bracketed references, \
e.g. [Title, Page 3] or [Title, 12:30 - 14:05]. Only cite material that appears \
below; every factual claim needs a citation.\n\n",
            decision.length.min_citations()
        ));

        prompt.push_str("## Question\n\n");
        prompt.push_str(question);
        prompt.push_str("\n\n");

        if !summaries.is_empty() {
            prompt.push_str("## Document Summaries\n\n");
            for (i, summary) in summaries.iter().enumerate() {
                prompt.push_str(&summary_block(i + 1, summary));
            }
        }

        if !excerpts.is_empty() {
            prompt.push_str("## Document Excerpts\n\n");
            for (i, excerpt) in excerpts.iter().enumerate() {
                prompt.push_str(&excerpt_block(i + 1, excerpt));
            }
        }

        prompt.push_str("## Grounded Answer\n\n");
        prompt
    }
}

/// Format-specific instruction line
fn format_instructions(decision: &FormatDecision) -> &'static str {
    match decision.format_type {
        FormatType::BriefSummary => "Produce a brief summary of the key points.",
        FormatType::SocialMedia => {
            "Produce a social-media-ready post; keep it self-contained and compact."
        }
        FormatType::BlogPost => "Produce a blog-post-style piece with a headline and sections.",
        FormatType::Newsletter => "Produce a newsletter-style update with short titled sections.",
        FormatType::Outline => "Produce an outline suitable for a presentation.",
        FormatType::Protocol => {
            "Produce a procedure: numbered steps in execution order, one action per step."
        }
        FormatType::ComprehensiveAnalysis => {
            "Produce a comprehensive analysis covering every relevant aspect in the material."
        }
        FormatType::Report => "Produce a formal report with an opening summary and sections.",
        FormatType::FactualAnswer => "Answer the factual question directly, then add brief context.",
        FormatType::GeneralAnswer => "Answer the question clearly and completely.",
    }
}

/// One summary entry: label, title, descriptive metadata header, body
fn summary_block(index: usize, summary: &SummaryItem) -> String {
    let title = summary
        .title
        .as_deref()
        .or(summary.filename.as_deref())
        .unwrap_or(&summary.source_id);

    let mut header = Vec::new();
    if let Some(author) = &summary.author {
        header.push(format!("Author: {}", author));
    }
    if let Some(organization) = &summary.organization {
        header.push(format!("Organization: {}", organization));
    }
    if let Some(date) = &summary.date {
        header.push(format!("Date: {}", date));
    }
    if !summary.tags.is_empty() {
        header.push(format!("Tags: {}", summary.tags.join(", ")));
    }

    let mut block = format!("[Document {}] {}\n", index, title);
    if !header.is_empty() {
        block.push_str(&header.join(" | "));
        block.push('\n');
    }
    block.push_str(&summary.summary);
    block.push_str("\n\n---\n\n");
    block
}

/// One excerpt entry: label, title, location, body
fn excerpt_block(index: usize, excerpt: &ExcerptItem) -> String {
    let title = excerpt
        .title
        .as_deref()
        .or(excerpt.filename.as_deref())
        .unwrap_or(&excerpt.source_id);

    let location = excerpt
        .anchor
        .as_ref()
        .map(|anchor| format!(" ({})", anchor.display()))
        .unwrap_or_default();

    format!(
        "[Chunk {}] {}{}\n{}\n\n---\n\n",
        index, title, location, excerpt.content
    )
}
