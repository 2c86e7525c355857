//! Whisper model metadata catalog.
//!
//! Static catalog of the ggml model builds published on HuggingFace,
//! with sizes and checksums where known.

/// Metadata for a Whisper model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g. "tiny.en", "base", "large-v3")
    pub name: &'static str,
    /// Approximate download size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum; empty string skips verification
    pub sha1: &'static str,
    /// Download URL
    pub url: &'static str,
    /// Whether this model transcribes English only
    pub english_only: bool,
}

macro_rules! model {
    ($name:literal, $size:literal, $sha1:literal, $en:literal) => {
        ModelInfo {
            name: $name,
            size_mb: $size,
            sha1: $sha1,
            url: concat!(
                "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-",
                $name,
                ".bin"
            ),
            english_only: $en,
        }
    };
}

/// Catalog of downloadable models, smallest first.
///
/// `.en` variants are English-only and slightly more accurate for English;
/// the plain variants are multilingual and support language auto-detection.
pub const MODELS: &[ModelInfo] = &[
    model!("tiny.en", 75, "c78c86eb1a8faa21b369bcd33207cc90d64ae9df", true),
    model!("tiny", 75, "bd577a113a864445d4c299885e0cb97d4ba92b5f", false),
    model!("base.en", 142, "137c40403d78fd54d454da0f9bd998f78703390c", true),
    model!("base", 142, "465707469ff3a37a2b9b8d8f89f2f99de7299dac", false),
    model!("small.en", 466, "db8a495a91d927739e50b3fc1cc4c6b8f6c2d022", true),
    model!("small", 466, "55356645c2b361a969dfd0ef2c5a50d530afd8d5", false),
    model!("medium.en", 1533, "8c30f0e44ce9560643ebd10bbe50cd20eafd3723", true),
    model!("medium", 1533, "fd9727b6e1217c2f614f9b698455c4ffd82463b4", false),
    model!("large-v2", 3094, "0f4c8e34f21cf1a914c59d8b3ce882345ad349d6", false),
    model!("large-v3", 3094, "ad82bf6a9043ceed055076d0fd39f5f186ff8062", false),
];

/// Resolve catalog aliases: "large" means the newest large build.
pub fn resolve_name(name: &str) -> &str {
    match name {
        "large" => "large-v3",
        other => other,
    }
}

/// Find a model by name, resolving aliases.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    let resolved = resolve_name(name);
    MODELS.iter().find(|m| m.name == resolved)
}

/// All catalog models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// The default model for new installs.
pub fn default_model() -> &'static ModelInfo {
    MODELS
        .iter()
        .find(|m| m.name == crate::defaults::DEFAULT_MODEL)
        .unwrap_or(&MODELS[0])
}
