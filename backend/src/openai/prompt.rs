use std::str::FromStr;
use std::sync::Arc;

use landscape_shared::{SelectedStyles, StyleCategory, StyleKind, StyleToggle};
use log::{info, warn};

use super::client::CompletionApi;
use super::models::{ChatMessage, CompletionOptions};

pub const GENERIC_PROMPT: &str =
    "Professional landscape design, high quality, realistic, beautiful outdoor space";

const DESIGNER_SYSTEM_PROMPT: &str = "You are a professional landscape designer. Create detailed prompts for AI image generation that will produce realistic, high-quality landscape designs.";

const ENRICHMENT_OPTIONS: CompletionOptions = CompletionOptions {
    max_completion_tokens: 500,
    temperature: Some(0.7),
};

fn phrase_for(kind: StyleKind) -> &'static str {
    match kind {
        StyleKind::ConcreteCurbing => "professional concrete landscape curbing with clean edges",
        StyleKind::StoneCurbing => "natural stone landscape edging with earth tones",
        StyleKind::BrownMulch => "brown wood mulch ground cover with organic texture",
        StyleKind::RedMulch => "red-tinted wood mulch landscaping material",
        StyleKind::FlagstonePatio => "natural flagstone patio with irregular stone pattern",
        StyleKind::ConcretePatio => "smooth concrete patio with modern clean lines",
    }
}

/// Phrase for one toggle, or `None` when disabled or unrecognized.
fn category_phrase(
    label: &str,
    toggle: Option<&StyleToggle>,
    category: StyleCategory,
    default_kind: StyleKind,
) -> Option<&'static str> {
    let toggle = toggle.filter(|t| t.enabled)?;
    let kind = match toggle.kind.as_deref().map(str::trim) {
        None | Some("") => default_kind,
        Some(raw) => match StyleKind::from_str(raw) {
            Ok(kind) if kind.category() == category => kind,
            _ => {
                warn!("Skipping unrecognized {} type '{}'", label, raw);
                return None;
            }
        },
    };
    Some(phrase_for(kind))
}

/// Canonical phrases for every enabled category, in curbing, landscape, patio order.
pub fn style_phrases(styles: &SelectedStyles) -> Vec<&'static str> {
    [
        category_phrase(
            "curbing",
            styles.curbing.as_ref(),
            StyleCategory::Curbing,
            StyleKind::ConcreteCurbing,
        ),
        category_phrase(
            "landscape",
            styles.landscape.as_ref(),
            StyleCategory::Mulch,
            StyleKind::BrownMulch,
        ),
        category_phrase(
            "patio",
            styles.patio.as_ref(),
            StyleCategory::Patio,
            StyleKind::FlagstonePatio,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn templated_prompt(phrases: &[&str]) -> String {
    format!(
        "Professional landscape design featuring {}, high quality, realistic, beautiful outdoor space",
        phrases.join(", ")
    )
}

fn enrichment_request(phrases: &[&str]) -> String {
    format!(
        "Create a detailed, professional landscape design prompt featuring: {}. Make it suitable for AI image generation.",
        phrases.join(", ")
    )
}

/// Turns selected styles into an editing prompt. Never fails.
#[derive(Clone)]
pub struct PromptSynthesizer {
    completions: Arc<dyn CompletionApi>,
}

impl PromptSynthesizer {
    pub fn new(completions: Arc<dyn CompletionApi>) -> Self {
        Self { completions }
    }

    pub async fn synthesize(&self, styles: &SelectedStyles) -> String {
        let phrases = style_phrases(styles);
        if phrases.is_empty() {
            return GENERIC_PROMPT.to_string();
        }

        let messages = [
            ChatMessage::system(DESIGNER_SYSTEM_PROMPT),
            ChatMessage::user(enrichment_request(&phrases)),
        ];

        match self.completions.complete(&messages, ENRICHMENT_OPTIONS).await {
            Ok(Some(enriched)) => {
                info!("Prompt enriched for {} style(s)", phrases.len());
                enriched
            }
            Ok(None) => {
                warn!("Prompt enrichment returned no text, using template");
                templated_prompt(&phrases)
            }
            Err(e) => {
                warn!("Prompt enrichment failed, using template: {}", e);
                templated_prompt(&phrases)
            }
        }
    }
}
