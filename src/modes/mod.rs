//! Enhancement modes and their system-instruction templates.
//!
//! The registry is static data: one template per canonical mode, resolved by an
//! exhaustive match so adding a mode fails to compile until it has a template.

mod templates;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use templates::{DEEP_RESEARCH_INSTRUCTION, QUICK_REFINE_INSTRUCTION, THINK_MODE_INSTRUCTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancementMode {
    DeepResearch,
    ThinkMode,
    QuickRefine,
}

/// Mode names accepted from older extension builds.
const LEGACY_ALIASES: &[(&str, &str)] = &[("quick", "quick-refine"), ("advanced", "think-mode")];

impl EnhancementMode {
    pub const ALL: [EnhancementMode; 3] = [
        EnhancementMode::DeepResearch,
        EnhancementMode::ThinkMode,
        EnhancementMode::QuickRefine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnhancementMode::DeepResearch => "deep-research",
            EnhancementMode::ThinkMode => "think-mode",
            EnhancementMode::QuickRefine => "quick-refine",
        }
    }

    /// Exact match on a canonical name. Aliases are not considered here.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }

    pub fn template(self) -> &'static ModeTemplate {
        lookup(self)
    }
}

impl fmt::Display for EnhancementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a legacy mode name onto its canonical name; anything else passes through untouched.
pub fn resolve_alias(name: &str) -> &str {
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

#[derive(Debug, PartialEq, Eq)]
pub struct ModeTemplate {
    pub mode: EnhancementMode,
    pub display_name: &'static str,
    pub description: &'static str,
    pub system_instruction: &'static str,
    /// Completion token ceiling for the rewritten prompt.
    pub max_tokens: u32,
    /// Default bound on the upstream call for this mode.
    pub timeout: Duration,
}

static DEEP_RESEARCH: ModeTemplate = ModeTemplate {
    mode: EnhancementMode::DeepResearch,
    display_name: "Deep Research",
    description: "Frames the prompt as a broad, multi-source research question",
    system_instruction: DEEP_RESEARCH_INSTRUCTION,
    max_tokens: 2000,
    timeout: Duration::from_secs(45),
};

static THINK_MODE: ModeTemplate = ModeTemplate {
    mode: EnhancementMode::ThinkMode,
    display_name: "Think Mode",
    description: "Asks for explicit step-by-step reasoning before the answer",
    system_instruction: THINK_MODE_INSTRUCTION,
    max_tokens: 2000,
    timeout: Duration::from_secs(45),
};

static QUICK_REFINE: ModeTemplate = ModeTemplate {
    mode: EnhancementMode::QuickRefine,
    display_name: "Quick Refine",
    description: "Tightens the prompt for clarity and specificity",
    system_instruction: QUICK_REFINE_INSTRUCTION,
    max_tokens: 1500,
    timeout: Duration::from_secs(30),
};

pub fn lookup(mode: EnhancementMode) -> &'static ModeTemplate {
    match mode {
        EnhancementMode::DeepResearch => &DEEP_RESEARCH,
        EnhancementMode::ThinkMode => &THINK_MODE,
        EnhancementMode::QuickRefine => &QUICK_REFINE,
    }
}
