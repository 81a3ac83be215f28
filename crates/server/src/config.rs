use std::path::PathBuf;

/// Process configuration, read once at startup. The AI flag is injected into
/// the classification service at construction rather than read from the
/// environment inside business logic.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub ai_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            db_path: std::env::var("BANCHI_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("banchi.db")),
            ai_enabled: parse_bool(std::env::var("AI_CLASSIFICATION_ENABLED").ok().as_deref(), false),
        }
    }
}

/// Boolean-ish env values: true/1/yes/on, case-insensitive.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => {
            let v = v.trim().to_lowercase();
            if v.is_empty() {
                default
            } else {
                matches!(v.as_str(), "true" | "1" | "yes" | "on")
            }
        }
    }
}
