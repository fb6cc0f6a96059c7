use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which analysis the scan performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    Diagnosis,
    Discovery,
}

/// Immutable request that starts a scan. `seed_url` must already have
/// passed the SSRF policy (`crate::ssrf::check`) before a `ScanRequest`
/// is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub seed_url: String,
    pub mode: ScanMode,
    pub preferred_lang: String,
    pub scan_id: Uuid,
}

impl ScanRequest {
    pub fn new(seed_url: String, mode: ScanMode, preferred_lang: Option<String>) -> Self {
        Self {
            seed_url,
            mode,
            preferred_lang: preferred_lang.unwrap_or_else(|| "en".to_string()),
            scan_id: Uuid::new_v4(),
        }
    }
}

/// Where a discovered link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOrigin {
    Html,
    Sitemap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredLink {
    pub url: String,
    pub anchor_text: String,
    pub origin: LinkOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLink {
    pub url: String,
    pub anchor_text: String,
    pub origin: LinkOrigin,
    pub score: i32,
}

/// An opaque handle to a cached screenshot blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub cache_id: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime: ScreenshotMime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMime {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ScreenshotMime {
    pub fn content_type(&self) -> &'static str {
        match self {
            ScreenshotMime::Png => "image/png",
            ScreenshotMime::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: Option<String>,
    pub distilled: Option<String>,
    pub screenshot: Option<Screenshot>,
}

impl Page {
    /// A distillate is only ever considered present when it meets the
    /// minimum-length and header-prefix invariant.
    pub fn has_valid_distillate(&self) -> bool {
        match &self.distilled {
            Some(text) => text.len() >= 50 && text.starts_with("==="),
            None => false,
        }
    }
}

/// Ordered, size-bounded concatenation of page distillates plus an optional
/// social distillate, ready to hand to the Analyzer.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub text: String,
    pub page_count: usize,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Name of a schema-validated analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKey {
    PositioningThemes,
    KeyMessages,
    ToneOfVoice,
    BrandElements,
    VisualTextAlignment,
    Emotion,
    Attention,
    Story,
    Involvement,
    Repetition,
    Consistency,
}

impl AnalysisKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKey::PositioningThemes => "positioning_themes",
            AnalysisKey::KeyMessages => "key_messages",
            AnalysisKey::ToneOfVoice => "tone_of_voice",
            AnalysisKey::BrandElements => "brand_elements",
            AnalysisKey::VisualTextAlignment => "visual_text_alignment",
            AnalysisKey::Emotion => "emotion",
            AnalysisKey::Attention => "attention",
            AnalysisKey::Story => "story",
            AnalysisKey::Involvement => "involvement",
            AnalysisKey::Repetition => "repetition",
            AnalysisKey::Consistency => "consistency",
        }
    }

    pub const DISCOVERY_TEXTUAL: [AnalysisKey; 3] = [
        AnalysisKey::PositioningThemes,
        AnalysisKey::KeyMessages,
        AnalysisKey::ToneOfVoice,
    ];

    pub const MEMORABILITY: [AnalysisKey; 6] = [
        AnalysisKey::Emotion,
        AnalysisKey::Attention,
        AnalysisKey::Story,
        AnalysisKey::Involvement,
        AnalysisKey::Repetition,
        AnalysisKey::Consistency,
    ];
}

/// How a result's payload was ultimately produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Success,
    DegradedFallback,
    /// Never surfaced to clients; an internal-only state used while the
    /// validator is still attempting repair.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub latency_ms: u64,
    pub token_usage: u32,
    pub model: String,
    pub api_used: String,
    pub validation_status: ValidationStatus,
    pub repairs: Vec<String>,
    pub trace_id: Uuid,
    #[serde(default)]
    pub cache_hit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub key: AnalysisKey,
    pub payload: serde_json::Value,
    pub metrics: AnalysisMetrics,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: serde_json::Value,
    pub ttl_expires_at: chrono::DateTime<chrono::Utc>,
}
