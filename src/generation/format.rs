//! Output format inference from query text
//!
//! An ordered set of keyword rules maps the query to an answer shape; the
//! first matching rule wins, so rule order is part of the contract. The
//! classifier is a pure function of the query text.

use serde::{Deserialize, Serialize};

/// Inferred answer shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    BriefSummary,
    SocialMedia,
    BlogPost,
    Newsletter,
    Outline,
    Protocol,
    ComprehensiveAnalysis,
    Report,
    FactualAnswer,
    GeneralAnswer,
}

/// Target answer length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthClass {
    Short,
    Medium,
    Long,
}

impl LengthClass {
    /// Minimum inline citations requested from the model, scaled by length
    pub fn min_citations(&self) -> usize {
        match self {
            Self::Short => 2,
            Self::Medium => 3,
            Self::Long => 5,
        }
    }

    /// Length guidance used in the prompt
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Short => "Keep the answer short: a few sentences or a handful of bullets.",
            Self::Medium => "Aim for a medium-length answer of several paragraphs.",
            Self::Long => "Produce a thorough, long-form answer covering all relevant aspects.",
        }
    }
}

/// Structural style of the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureStyle {
    Bullets,
    Paragraphs,
    Sections,
    NumberedSteps,
    Hierarchical,
}

impl StructureStyle {
    /// Structure guidance used in the prompt
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Bullets => "Structure the answer as concise bullet points.",
            Self::Paragraphs => "Structure the answer as flowing paragraphs.",
            Self::Sections => "Structure the answer into titled sections.",
            Self::NumberedSteps => "Structure the answer as numbered steps in order.",
            Self::Hierarchical => {
                "Structure the answer as a hierarchical outline with nested points."
            }
        }
    }
}

/// One classification per query, consumed by the prompt assembler and the
/// answer generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDecision {
    pub format_type: FormatType,
    pub length: LengthClass,
    pub structure: StructureStyle,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub prose_style: &'static str,
}

const BRIEF_TERMS: &[&str] = &[
    "brief",
    "briefly",
    "tl;dr",
    "tldr",
    "in a nutshell",
    "quick summary",
    "short summary",
    "summarize",
    "summarise",
    "concise",
];

const SOCIAL_TERMS: &[&str] = &[
    "tweet",
    "twitter",
    "social media",
    "linkedin post",
    "instagram",
    "x post",
];

const BLOG_TERMS: &[&str] = &["blog", "article", "write-up", "writeup"];

const NEWSLETTER_TERMS: &[&str] = &["newsletter", "bulletin", "digest"];

const OUTLINE_TERMS: &[&str] = &[
    "outline",
    "presentation",
    "slide",
    "talking points",
    "agenda",
];

const PROTOCOL_TERMS: &[&str] = &[
    "protocol",
    "procedure",
    "how do i",
    "how to",
    "step by step",
    "step-by-step",
    "steps to",
    "instructions",
    "workflow",
];

const COMPREHENSIVE_TERMS: &[&str] = &[
    "comprehensive",
    "in-depth",
    "in depth",
    "detailed analysis",
    "deep dive",
    "thorough",
    "exhaustive",
];

const REPORT_TERMS: &[&str] = &["report", "memo", "briefing"];

const FACTUAL_STARTERS: &[&str] = &[
    "what is",
    "what are",
    "what was",
    "who is",
    "who was",
    "when did",
    "when was",
    "where is",
    "where was",
    "how many",
    "how much",
    "which",
    "define",
];

/// Classify a query into a format decision
///
/// Identical input always yields an identical decision.
pub fn classify(query: &str) -> FormatDecision {
    let lower = query.to_lowercase();

    let format_type = if contains_any(&lower, BRIEF_TERMS) {
        FormatType::BriefSummary
    } else if contains_any(&lower, SOCIAL_TERMS) {
        FormatType::SocialMedia
    } else if contains_any(&lower, BLOG_TERMS) {
        FormatType::BlogPost
    } else if contains_any(&lower, NEWSLETTER_TERMS) {
        FormatType::Newsletter
    } else if contains_any(&lower, OUTLINE_TERMS) {
        FormatType::Outline
    } else if contains_any(&lower, PROTOCOL_TERMS) {
        FormatType::Protocol
    } else if contains_any(&lower, COMPREHENSIVE_TERMS) {
        FormatType::ComprehensiveAnalysis
    } else if contains_any(&lower, REPORT_TERMS) {
        FormatType::Report
    } else if starts_with_any(&lower, FACTUAL_STARTERS) {
        FormatType::FactualAnswer
    } else {
        FormatType::GeneralAnswer
    };

    decision_for(format_type)
}

/// The fixed decision each format type carries
pub fn decision_for(format_type: FormatType) -> FormatDecision {
    match format_type {
        FormatType::BriefSummary => FormatDecision {
            format_type,
            length: LengthClass::Short,
            structure: StructureStyle::Bullets,
            temperature: 0.3,
            max_output_tokens: 512,
            prose_style: "crisp",
        },
        FormatType::SocialMedia => FormatDecision {
            format_type,
            length: LengthClass::Short,
            structure: StructureStyle::Paragraphs,
            temperature: 0.7,
            max_output_tokens: 256,
            prose_style: "punchy",
        },
        FormatType::BlogPost => FormatDecision {
            format_type,
            length: LengthClass::Long,
            structure: StructureStyle::Sections,
            temperature: 0.7,
            max_output_tokens: 2048,
            prose_style: "engaging",
        },
        FormatType::Newsletter => FormatDecision {
            format_type,
            length: LengthClass::Medium,
            structure: StructureStyle::Sections,
            temperature: 0.6,
            max_output_tokens: 1536,
            prose_style: "conversational",
        },
        FormatType::Outline => FormatDecision {
            format_type,
            length: LengthClass::Medium,
            structure: StructureStyle::Hierarchical,
            temperature: 0.4,
            max_output_tokens: 1024,
            prose_style: "telegraphic",
        },
        FormatType::Protocol => FormatDecision {
            format_type,
            length: LengthClass::Medium,
            structure: StructureStyle::NumberedSteps,
            temperature: 0.2,
            max_output_tokens: 1536,
            prose_style: "imperative",
        },
        FormatType::ComprehensiveAnalysis => FormatDecision {
            format_type,
            length: LengthClass::Long,
            structure: StructureStyle::Sections,
            temperature: 0.4,
            max_output_tokens: 4096,
            prose_style: "analytical",
        },
        FormatType::Report => FormatDecision {
            format_type,
            length: LengthClass::Long,
            structure: StructureStyle::Sections,
            temperature: 0.3,
            max_output_tokens: 3072,
            prose_style: "formal",
        },
        FormatType::FactualAnswer => FormatDecision {
            format_type,
            length: LengthClass::Short,
            structure: StructureStyle::Paragraphs,
            temperature: 0.1,
            max_output_tokens: 768,
            prose_style: "direct",
        },
        FormatType::GeneralAnswer => FormatDecision {
            format_type,
            length: LengthClass::Medium,
            structure: StructureStyle::Paragraphs,
            temperature: 0.3,
            max_output_tokens: 1536,
            prose_style: "clear",
        },
    }
}

fn contains_any(query: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| query.contains(term))
}

fn starts_with_any(query: &str, starters: &[&str]) -> bool {
    starters.iter().any(|starter| query.starts_with(starter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_function() {
        let q = "Give me a comprehensive analysis of AML controls";
        assert_eq!(classify(q), classify(q));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "brief" is checked before "tweet", so brief wins.
        let decision = classify("Write a brief tweet about sanctions");
        assert_eq!(decision.format_type, FormatType::BriefSummary);
    }

    #[test]
    fn test_factual_starter() {
        let decision = classify("What is the filing threshold?");
        assert_eq!(decision.format_type, FormatType::FactualAnswer);
        assert_eq!(decision.length, LengthClass::Short);
        assert!(decision.temperature <= 0.2);
    }

    #[test]
    fn test_protocol_terms() {
        let decision = classify("How to file a suspicious activity notice");
        assert_eq!(decision.format_type, FormatType::Protocol);
        assert_eq!(decision.structure, StructureStyle::NumberedSteps);
    }

    #[test]
    fn test_default_rule() {
        let decision = classify("Tell me about the onboarding requirements");
        assert_eq!(decision.format_type, FormatType::GeneralAnswer);
    }

    #[test]
    fn test_min_citations_scale_with_length() {
        assert!(LengthClass::Short.min_citations() < LengthClass::Long.min_citations());
    }

    #[test]
    fn test_comprehensive_has_largest_output_budget() {
        let comprehensive = decision_for(FormatType::ComprehensiveAnalysis);
        let brief = decision_for(FormatType::BriefSummary);
        assert!(comprehensive.max_output_tokens > brief.max_output_tokens);
    }
}
