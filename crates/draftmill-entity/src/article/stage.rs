//! Article production pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One stage of the article production pipeline.
///
/// A pipeline is a chain of independently retryable jobs rather than one
/// long-lived process: each stage's handler persists its output onto the
/// article and enqueues the next stage on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStage {
    /// Gather and synthesize source research.
    Research,
    /// Produce the article outline from the research.
    Outline,
    /// Produce each outlined section. May partially fail and resume.
    SectionProduction,
    /// Assemble produced sections into a full draft.
    Assembly,
    /// Score the draft for SEO/GEO quality.
    SeoGeoCheck,
    /// Rewrite the draft against the score report.
    Optimization,
    /// Insert internal links.
    Interlinking,
    /// Produce title/description/slug metadata.
    Metadata,
}

impl ArticleStage {
    /// All stages in pipeline order.
    pub const ALL: [Self; 8] = [
        Self::Research,
        Self::Outline,
        Self::SectionProduction,
        Self::Assembly,
        Self::SeoGeoCheck,
        Self::Optimization,
        Self::Interlinking,
        Self::Metadata,
    ];

    /// The first stage of the pipeline.
    pub fn first() -> Self {
        Self::Research
    }

    /// The stage that follows this one, or `None` for the final stage.
    pub fn next(&self) -> Option<Self> {
        let pos = Self::ALL.iter().position(|s| s == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    /// The job type string dispatching to this stage's handler.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::Research => "article_research",
            Self::Outline => "article_outline",
            Self::SectionProduction => "article_section_production",
            Self::Assembly => "article_assembly",
            Self::SeoGeoCheck => "article_seo_geo_check",
            Self::Optimization => "article_optimization",
            Self::Interlinking => "article_interlinking",
            Self::Metadata => "article_metadata",
        }
    }

    /// The field under `stage_outputs` where this stage persists its output.
    pub fn output_field(&self) -> &'static str {
        match self {
            Self::Research => "synthesized_research",
            Self::Outline => "outline",
            Self::SectionProduction => "sections",
            Self::Assembly => "assembled_draft",
            Self::SeoGeoCheck => "seo_geo_report",
            Self::Optimization => "optimized_draft",
            Self::Interlinking => "interlinks",
            Self::Metadata => "metadata",
        }
    }

    /// Return the stage as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Outline => "outline",
            Self::SectionProduction => "section_production",
            Self::Assembly => "assembly",
            Self::SeoGeoCheck => "seo_geo_check",
            Self::Optimization => "optimization",
            Self::Interlinking => "interlinking",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for ArticleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
