use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).map(|v| v.to_lowercase()) {
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        _ => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub extract: ExtractConfig,
    pub ocr: OcrConfig,
    pub llm: LlmConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &["GEMINI_API_KEY", "OCR_SPACE_API_KEY", "PORT"];

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCASK_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCASK_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            upload: UploadConfig::from_env_profiled(p),
            extract: ExtractConfig::from_env_profiled(p),
            ocr: OcrConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  upload:   max_files={}, max_file_bytes={}, context_char_cap={}",
            self.upload.max_files,
            self.upload.max_file_bytes,
            self.upload.context_char_cap
        );
        tracing::info!("  extract:  parse_timeout={}s", self.extract.parse_timeout_secs);
        tracing::info!(
            "  ocr:      remote={}, tesseract={} ({}), lang={}",
            self.ocr.remote_enabled(),
            self.ocr.tesseract_enabled,
            self.ocr.tesseract_bin,
            self.ocr.language
        );
        tracing::info!(
            "  llm:      model={}, configured={}",
            self.llm.gemini_model,
            self.llm.is_configured()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "upload": {
                "max_files": self.upload.max_files,
                "max_file_bytes": self.upload.max_file_bytes,
                "context_char_cap": self.upload.context_char_cap,
            },
            "extract": { "parse_timeout_secs": self.extract.parse_timeout_secs },
            "ocr": {
                "remote_configured": self.ocr.remote_enabled(),
                "language": self.ocr.language,
                "tesseract_enabled": self.ocr.tesseract_enabled,
                "timeout_secs": self.ocr.timeout_secs,
            },
            "llm": {
                "model": self.llm.gemini_model,
                "configured": self.llm.is_configured(),
                "timeout_secs": self.llm.timeout_secs,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 4000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Upload limits ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_bytes: usize,
    /// Per-file character cap applied when building the context blob.
    pub context_char_cap: usize,
}

impl UploadConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_files: profiled_env_parse(p, "UPLOAD_MAX_FILES", 5),
            max_file_bytes: profiled_env_parse(p, "UPLOAD_MAX_FILE_BYTES", 10 * 1024 * 1024),
            context_char_cap: profiled_env_parse(p, "CONTEXT_CHAR_CAP", 20_000),
        }
    }

    /// Request body ceiling: every file at its limit plus room for the form fields.
    pub fn body_limit(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_bytes)
            .saturating_add(1024 * 1024)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_bytes: 10 * 1024 * 1024,
            context_char_cap: 20_000,
        }
    }
}

// ── Structural parsers (PDF / DOCX / XLSX) ────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub parse_timeout_secs: u64,
}

impl ExtractConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            parse_timeout_secs: profiled_env_parse(p, "PARSE_TIMEOUT_SECS", 10),
        }
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.parse_timeout_secs)
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { parse_timeout_secs: 10 }
    }
}

// ── OCR (OCR.Space + local tesseract) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub ocr_space_api_key: Option<String>,
    pub ocr_space_url: String,
    /// Three-letter language code passed to both engines.
    pub language: String,
    pub tesseract_bin: String,
    pub tesseract_enabled: bool,
    pub timeout_secs: u64,
}

impl OcrConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            ocr_space_api_key: profiled_env_opt(p, "OCR_SPACE_API_KEY"),
            ocr_space_url: profiled_env_or(p, "OCR_SPACE_URL", "https://api.ocr.space/parse/image"),
            language: profiled_env_or(p, "OCR_LANGUAGE", "eng"),
            tesseract_bin: profiled_env_or(p, "TESSERACT_BIN", "tesseract"),
            tesseract_enabled: profiled_env_bool(p, "TESSERACT_ENABLED", true),
            timeout_secs: profiled_env_parse(p, "OCR_TIMEOUT_SECS", 15),
        }
    }

    /// The remote engine only joins the chain when a credential is present.
    pub fn remote_enabled(&self) -> bool {
        self.ocr_space_api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            ocr_space_api_key: None,
            ocr_space_url: "https://api.ocr.space/parse/image".to_string(),
            language: "eng".to_string(),
            tesseract_bin: "tesseract".to_string(),
            tesseract_enabled: true,
            timeout_secs: 15,
        }
    }
}

// ── LLM (Gemini) ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_base_url: profiled_env_or(
                p,
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.2),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 2048),
            timeout_secs: profiled_env_parse(p, "LLM_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile prefix so parallel tests never share keys.

    #[test]
    fn defaults_without_env() {
        let cfg = Config::for_profile("CFGTEST_EMPTY");
        assert_eq!(cfg.upload.max_files, 5);
        assert_eq!(cfg.upload.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.upload.context_char_cap, 20_000);
        assert_eq!(cfg.ocr.language, "eng");
        assert!(!cfg.llm.gemini_model.is_empty());
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTEST_A_CONTEXT_CHAR_CAP", "123");
        let cfg = Config::for_profile("cfgtest_a");
        assert_eq!(cfg.profile, "CFGTEST_A");
        assert_eq!(cfg.upload.context_char_cap, 123);
    }

    #[test]
    fn unparsable_values_fall_back_to_default() {
        env::set_var("CFGTEST_B_UPLOAD_MAX_FILES", "many");
        env::set_var("CFGTEST_B_TESSERACT_ENABLED", "maybe");
        let cfg = Config::for_profile("CFGTEST_B");
        assert_eq!(cfg.upload.max_files, 5);
        assert!(cfg.ocr.tesseract_enabled);
    }

    #[test]
    fn bool_flags_parse() {
        env::set_var("CFGTEST_C_TESSERACT_ENABLED", "false");
        let cfg = Config::for_profile("CFGTEST_C");
        assert!(!cfg.ocr.tesseract_enabled);
    }

    #[test]
    fn redacted_summary_hides_keys() {
        env::set_var("CFGTEST_D_GEMINI_API_KEY", "super-secret");
        env::set_var("CFGTEST_D_OCR_SPACE_API_KEY", "also-secret");
        let cfg = Config::for_profile("CFGTEST_D");
        assert!(cfg.llm.is_configured());
        assert!(cfg.ocr.remote_enabled());

        let summary = cfg.redacted_summary().to_string();
        assert!(!summary.contains("super-secret"));
        assert!(!summary.contains("also-secret"));
        assert!(summary.contains("\"configured\":true"));
    }

    #[test]
    fn discovers_profiles_from_marker_keys() {
        env::set_var("CFGTESTPROFILE_GEMINI_API_KEY", "k");
        let profiles = Config::available_profiles();
        assert!(profiles.contains(&"default".to_string()));
        assert!(profiles.contains(&"CFGTESTPROFILE".to_string()));
    }

    #[test]
    fn body_limit_covers_every_file() {
        let upload = UploadConfig::default();
        assert!(upload.body_limit() > upload.max_files * upload.max_file_bytes);
    }
}
