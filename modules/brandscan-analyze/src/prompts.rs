//! Per-key prompt templates. Each lives as a `const` string, mirroring the
//! pack's per-key prompt-constant style. Cache fingerprints are tagged with
//! `Config::prompt_version` (default [`DEFAULT_PROMPT_VERSION`]) via
//! [`crate::services::Services`] — changing a template's wording without
//! bumping that version leaves stale cache entries keyed to the old text in
//! place.

use brandscan_common::model::AnalysisKey;

/// `Config::prompt_version`'s default when `PROMPT_VERSION` isn't set.
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

const SCORING_RUBRIC: &str = "\
**SCORING GUIDELINES:**
You MUST provide a numerical score from 0 to 5 based on the following rubric:
- 0: The principle is completely absent or highly detrimental.
- 1: The principle is present but extremely weak; barely noticeable or inconsistent.
- 2: The principle is somewhat present but weak; significant flaws or missed opportunities.
- 3: The principle is adequately applied; meets basic standards but not outstanding.
- 4: The principle is strong and consistently applied; a clear asset to the brand.
- 5: The principle is exceptional; a textbook example of brand excellence in this area.

Respond with a JSON object with \"score\", \"analysis\", \"evidence\", \"confidence\", \
\"confidence_rationale\", and \"recommendation\" keys. \"score\" must be an integer 0-5. \
\"confidence\" must be an integer 0-100.";

/// Per-key task description for each of the six memorability keys
/// (Diagnosis mode), grounded on the reference's own prompt wording.
fn memorability_task(key: AnalysisKey) -> &'static str {
    match key {
        AnalysisKey::Emotion => "Analyze the Emotion key. This is the primary key; without it, nothing is memorable.\n\
            Your analysis must cover: how the brand connects with audiences on an emotional level. Does it evoke \
            warmth, trust, joy, or admiration? Does it use meaningful experiences, human stories, or mission-driven \
            language? Is there a clear emotional reward for the user?",
        AnalysisKey::Attention => "Analyze the Attention key. This is a stimulus key.\n\
            Your analysis must cover: how the brand stands out and sustains interest. Evaluate its distinctiveness. \
            Does it use surprising visuals or headlines? Does it create an authentic and engaging journey for the \
            user, avoiding cliches and overuse of calls to action?",
        AnalysisKey::Story => "Analyze the Story key. This is a stimulus key.\n\
            Your analysis must cover: the clarity and power of the brand's narrative. Is there an authentic story \
            that explains who the brand is and what it promises? Does this story build trust and pique curiosity \
            more effectively than facts and figures alone?",
        AnalysisKey::Involvement => "Analyze the Involvement key. This is a stimulus key.\n\
            Your analysis must cover: how the brand makes the audience feel like active participants. Does it \
            connect to what is meaningful for them? Does it foster a sense of community or belonging? Does it \
            make people feel included and empowered?",
        AnalysisKey::Repetition => "Analyze the Repetition key. This is a reinforcement key.\n\
            Your analysis must cover: the strategic reuse of brand elements. Are key symbols, taglines, colors, or \
            experiences repeated consistently across touchpoints to reinforce memory and create new associations? \
            Is this repetition thoughtful, or does it risk overexposure?",
        AnalysisKey::Consistency => "Analyze the Consistency key. This is a reinforcement key.\n\
            Your analysis must cover: the coherence of the brand across all touchpoints. Do the tone, message, and \
            design feel aligned? Does this create a sense of familiarity, allowing the user's brain to recognize \
            patterns and anticipate what to expect?",
        other => panic!("{other:?} is not a memorability key"),
    }
}

/// Builds the full prompt for one of the six Diagnosis-mode memorability
/// keys: role, task, scoring rubric, and the input block (corpus plus an
/// optional brand summary for context).
pub fn memorability_prompt(key: AnalysisKey, text_corpus: &str, brand_summary: Option<&str>) -> String {
    let summary_block = brand_summary
        .map(|s| format!("\nBRAND SUMMARY (for context):\n---\n{s}\n---\n"))
        .unwrap_or_default();
    format!(
        "You are a senior brand strategist providing an expert evaluation.\n\n{task}\n\n{rubric}\n\n\
        FULL WEBSITE & SOCIAL MEDIA TEXT CORPUS:\n---\n{text_corpus}\n---\n{summary_block}",
        task = memorability_task(key),
        rubric = SCORING_RUBRIC,
    )
}

/// Keyword set used to score pre-selection chunks for each memorability key.
pub fn memorability_keywords(key: AnalysisKey) -> &'static [&'static str] {
    match key {
        AnalysisKey::Emotion => &["trust", "joy", "warmth", "mission", "story", "love", "care"],
        AnalysisKey::Attention => &["unique", "different", "bold", "surprising", "first", "only"],
        AnalysisKey::Story => &["story", "journey", "founded", "began", "history", "why we"],
        AnalysisKey::Involvement => &["community", "join", "together", "member", "belong", "you"],
        AnalysisKey::Repetition => &["brand", "logo", "tagline", "signature", "always", "every"],
        AnalysisKey::Consistency => &["consistent", "every", "across", "all", "tone", "voice"],
        _ => &[],
    }
}

pub fn positioning_themes_prompt(text_corpus: &str) -> String {
    format!(
        "You are a senior brand strategist. Identify 3-6 distinct positioning themes this brand repeatedly \
        communicates across the text below. For each theme, give a short name, a one-paragraph description, \
        1-3 verbatim supporting quotes taken directly from the text, and a confidence score (0-100).\n\n\
        Respond as JSON: {{\"themes\": [{{\"theme\": str, \"description\": str, \"evidence_quotes\": [str], \
        \"confidence\": int}}]}}\n\n\
        TEXT CORPUS:\n---\n{text_corpus}\n---"
    )
}

pub const POSITIONING_THEMES_KEYWORDS: &[&str] =
    &["mission", "vision", "values", "promise", "difference", "leader", "innovat"];

pub fn key_messages_prompt(text_corpus: &str) -> String {
    format!(
        "You are a senior brand strategist. Extract up to 6 key messages from the text below: taglines and value \
        propositions the brand uses to communicate its offering. For each, give the message verbatim, the \
        surrounding context, its type (\"Tagline\" or \"Value Proposition\"), and a confidence score (0-100).\n\n\
        Respond as JSON: {{\"key_messages\": [{{\"message\": str, \"context\": str, \"type\": str, \
        \"confidence\": int}}]}}\n\n\
        TEXT CORPUS:\n---\n{text_corpus}\n---"
    )
}

pub const KEY_MESSAGES_KEYWORDS: &[&str] = &["tagline", "we help", "we offer", "our promise", "value"];

pub fn tone_of_voice_prompt(text_corpus: &str) -> String {
    format!(
        "You are a senior brand strategist. Identify the brand's primary and secondary tone of voice from the \
        text below (e.g. \"authoritative\", \"playful\", \"empathetic\"). For each tone, give a justification and \
        a verbatim supporting quote of 5-25 words taken directly from the text — quotes shorter or longer than \
        that range, or not found verbatim in the text, are invalid. Also list any contradictions where the tone \
        shifts inconsistently, each with its own verbatim quote.\n\n\
        Respond as JSON: {{\"primary_tone\": {{\"tone\": str, \"justification\": str, \"evidence_quote\": str}}, \
        \"secondary_tone\": {{\"tone\": str, \"justification\": str, \"evidence_quote\": str}}, \
        \"contradictions\": [{{\"contradiction\": str, \"evidence_quote\": str}}], \"confidence\": int}}\n\n\
        TEXT CORPUS:\n---\n{text_corpus}\n---"
    )
}

pub const TONE_OF_VOICE_KEYWORDS: &[&str] = &["we are", "our tone", "believe", "committed", "passionate"];

pub fn brand_elements_prompt(text_summary: &str) -> String {
    format!(
        "You are a senior brand strategist reviewing the attached homepage screenshot(s) alongside a summary of \
        the brand's written content. Assess the brand's visual identity: overall impression, color palette, \
        typography, and imagery style, each with a note on consistency across the screenshots. Then assess \
        strategic alignment: where the visual identity harmonizes with the written brand messaging, and where it \
        dissonates. Give an overall coherence score (0-5) and a confidence score (0-100).\n\n\
        Respond as JSON: {{\"overall_impression\": {{\"summary\": str, \"keywords\": [str]}}, \
        \"coherence_score\": int, \"visual_identity\": {{\"color_palette\": {{\"description\": str, \
        \"consistency_notes\": str}}, \"typography\": {{\"description\": str, \"consistency_notes\": str}}, \
        \"imagery_style\": {{\"description\": str, \"consistency_notes\": str}}}}, \"strategic_alignment\": \
        {{\"harmony\": str, \"dissonance\": str}}, \"confidence\": int}}\n\n\
        WRITTEN BRAND CONTENT SUMMARY:\n---\n{text_summary}\n---"
    )
}

pub fn visual_text_alignment_prompt(top_themes: &str, brand_elements_summary: &str) -> String {
    format!(
        "You are a senior brand strategist. Given the brand's top positioning themes and a summary of its visual \
        identity assessment below, judge whether the visual identity reinforces or contradicts the written \
        positioning. Answer \"Yes\" or \"No\" and give a one-sentence justification.\n\n\
        Respond as JSON: {{\"alignment\": \"Yes\" | \"No\", \"justification\": str}}\n\n\
        TOP POSITIONING THEMES:\n---\n{top_themes}\n---\n\n\
        VISUAL IDENTITY SUMMARY:\n---\n{brand_elements_summary}\n---"
    )
}

/// Brand-overview synthesis run once per scan, ahead of the memorability
/// keys, so each key gets the same compact brand context instead of
/// re-deriving it from the raw corpus every time.
pub fn brand_synthesis_prompt(corpus: &str) -> String {
    format!(
        "Analyze the following text from a company's website and social media. Provide a concise, one-paragraph \
        summary of the brand's mission, tone, and primary offerings. This summary will be used as context for \
        further analysis.\n\n---\n{corpus}\n---"
    )
}

pub fn executive_summary_prompt(analyses_text: &str) -> String {
    format!(
        "You are a senior brand strategist delivering a final executive summary. Based on the six key analyses \
        below, provide: an overall summary, the 2-3 strongest keys, the 2-3 weakest keys, and the single most \
        important strategic focus.\n\n\
        Respond as JSON: {{\"summary\": str, \"strengths\": [str], \"weaknesses\": [str], \
        \"strategic_focus\": str}}\n\n\
        ---\n{analyses_text}\n---"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memorability_prompt_embeds_corpus_and_rubric() {
        let prompt = memorability_prompt(AnalysisKey::Emotion, "some corpus text", None);
        assert!(prompt.contains("some corpus text"));
        assert!(prompt.contains("SCORING GUIDELINES"));
    }

    #[test]
    fn tone_of_voice_prompt_states_the_quote_length_bound() {
        let prompt = tone_of_voice_prompt("corpus");
        assert!(prompt.contains("5-25 words"));
    }

    #[test]
    #[should_panic]
    fn memorability_task_panics_on_non_memorability_key() {
        memorability_task(AnalysisKey::PositioningThemes);
    }
}
