//! Field validation shared by construction, setters and deserialization.

use crate::config::CatalogConfig;
use crate::entity::ProductId;
use crate::error::{Error, Result};

/// Largest id that survives a round trip through a JSON number (2^53).
pub const MAX_SAFE_ID: u64 = 1 << 53;

/// Validate a title length against the configured bounds.
pub fn validate_title(title: &str, config: &CatalogConfig) -> Result<()> {
    let len = title.chars().count();
    if len < config.title_min || len > config.title_max {
        return Err(Error::InvalidTitle(format!(
            "length {} outside [{}, {}]",
            len, config.title_min, config.title_max
        )));
    }
    Ok(())
}

/// Validate a description length against the configured bounds.
pub fn validate_description(description: &str, config: &CatalogConfig) -> Result<()> {
    let len = description.chars().count();
    if len < config.description_min || len > config.description_max {
        return Err(Error::InvalidDescription(format!(
            "length {} outside [{}, {}]",
            len, config.description_min, config.description_max
        )));
    }
    Ok(())
}

/// Validate a price. NaN and infinities are rejected.
pub fn validate_price(price: f64) -> Result<()> {
    if price.is_nan() {
        return Err(Error::InvalidPrice("price is NaN".to_string()));
    }
    if price.is_infinite() {
        return Err(Error::InvalidPrice("price is infinite".to_string()));
    }
    Ok(())
}

/// Validate image data against the configured size limit.
pub fn validate_image(image_data: &str, config: &CatalogConfig) -> Result<()> {
    if image_data.is_empty() {
        return Err(Error::InvalidImage("empty image data".to_string()));
    }
    if image_data.len() > config.image_max_bytes {
        return Err(Error::InvalidImage(format!(
            "{} bytes exceeds limit of {} bytes",
            image_data.len(),
            config.image_max_bytes
        )));
    }
    Ok(())
}

/// Convert a stored numeric id into a `ProductId`.
///
/// The id must be a positive whole number no larger than [`MAX_SAFE_ID`].
pub fn parse_id(raw: f64) -> Result<ProductId> {
    if !raw.is_finite() || raw % 1.0 != 0.0 {
        return Err(Error::InvalidId(format!("{} is not a whole number", raw)));
    }
    if raw <= 0.0 {
        return Err(Error::InvalidId(format!("{} is not positive", raw)));
    }
    if raw > MAX_SAFE_ID as f64 {
        return Err(Error::InvalidId(format!("{} is out of range", raw)));
    }
    Ok(ProductId::from(raw as u64))
}
