//! Catalog configuration: field bounds, image limits and shipping tax.

use crate::error::{Error, Result};

/// Default minimum title length, in characters.
pub const DEFAULT_TITLE_MIN: usize = 3;
/// Default maximum title length, in characters.
pub const DEFAULT_TITLE_MAX: usize = 250;
/// Default minimum description length, in characters.
pub const DEFAULT_DESCRIPTION_MIN: usize = 5;
/// Default maximum description length, in characters.
pub const DEFAULT_DESCRIPTION_MAX: usize = 500;
/// Default maximum image size (3 MB).
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 3 * 1024 * 1024;
/// Default shipping tax, as a percentage of the cart base cost.
pub const DEFAULT_SHIPPING_TAX_PERCENT: f64 = 5.0;

/// Configuration shared by the registry and every list built on it.
///
/// # Example
///
/// ```
/// use shop_kit::CatalogConfig;
///
/// let config = CatalogConfig::default()
///     .with_title_bounds(1, 80)
///     .with_shipping_tax_percent(10.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogConfig {
    /// Inclusive minimum title length.
    pub title_min: usize,
    /// Inclusive maximum title length.
    pub title_max: usize,
    /// Inclusive minimum description length.
    pub description_min: usize,
    /// Inclusive maximum description length.
    pub description_max: usize,
    /// Largest accepted image payload, in bytes of its data URI.
    pub image_max_bytes: usize,
    /// Shipping cost as a percentage of the cart base cost.
    pub shipping_tax_percent: f64,
    /// Whether serialized products carry their `imageData`.
    pub include_image_data: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            title_min: DEFAULT_TITLE_MIN,
            title_max: DEFAULT_TITLE_MAX,
            description_min: DEFAULT_DESCRIPTION_MIN,
            description_max: DEFAULT_DESCRIPTION_MAX,
            image_max_bytes: DEFAULT_IMAGE_MAX_BYTES,
            shipping_tax_percent: DEFAULT_SHIPPING_TAX_PERCENT,
            include_image_data: true,
        }
    }
}

impl CatalogConfig {
    /// Set inclusive title length bounds.
    pub fn with_title_bounds(mut self, min: usize, max: usize) -> Self {
        self.title_min = min;
        self.title_max = max;
        self
    }

    /// Set inclusive description length bounds.
    pub fn with_description_bounds(mut self, min: usize, max: usize) -> Self {
        self.description_min = min;
        self.description_max = max;
        self
    }

    /// Set the maximum image payload size.
    pub fn with_image_max_bytes(mut self, max: usize) -> Self {
        self.image_max_bytes = max;
        self
    }

    /// Set the shipping tax percentage.
    pub fn with_shipping_tax_percent(mut self, percent: f64) -> Self {
        self.shipping_tax_percent = percent;
        self
    }

    /// Choose whether image data is written with serialized products.
    pub fn with_image_data(mut self, include: bool) -> Self {
        self.include_image_data = include;
        self
    }

    /// Check that the bounds and percentages are usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for inverted bounds or a shipping tax that
    /// is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.title_min > self.title_max {
            return Err(Error::ConfigError(format!(
                "title bounds inverted: min {} > max {}",
                self.title_min, self.title_max
            )));
        }
        if self.description_min > self.description_max {
            return Err(Error::ConfigError(format!(
                "description bounds inverted: min {} > max {}",
                self.description_min, self.description_max
            )));
        }
        if !self.shipping_tax_percent.is_finite() || self.shipping_tax_percent < 0.0 {
            return Err(Error::ConfigError(format!(
                "shipping tax must be a non-negative percentage, got {}",
                self.shipping_tax_percent
            )));
        }
        Ok(())
    }
}
