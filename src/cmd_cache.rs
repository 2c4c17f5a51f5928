//! Cache subcommand handlers for BirdSpot.

use birdspot_cache::CacheValue;
use birdspot_config::Config;

use crate::cli::CacheAction;
use crate::services;

/// Handle cache subcommands.
pub(crate) async fn handle_cache_command(
    action: CacheAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CacheAction::Get { raw_key } => cache_get(config, &raw_key).await,
    }
}

async fn cache_get(config: &Config, raw_key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cache = services::cache(&config.cache).await?;

    match cache.get(raw_key).await? {
        Some(value) => println!("{}", render(&value)?),
        None => println!("No cached value for '{}'", cache.key().derive(raw_key)),
    }
    Ok(())
}

fn render(value: &CacheValue) -> Result<String, serde_json::Error> {
    match value {
        CacheValue::Json(json) => serde_json::to_string_pretty(json),
        CacheValue::Bytes(bytes) => Ok(format!(
            "<{} bytes> {}",
            bytes.len(),
            String::from_utf8_lossy(bytes)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let rendered = render(&CacheValue::Json(json!({"score": 0.5}))).unwrap();
        assert!(rendered.contains("\"score\": 0.5"));
    }

    #[test]
    fn test_render_bytes() {
        let rendered = render(&CacheValue::Bytes(b"US-NY".to_vec())).unwrap();
        assert_eq!(rendered, "<5 bytes> US-NY");
    }
}
