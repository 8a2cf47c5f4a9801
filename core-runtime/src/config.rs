//! # Session Configuration
//!
//! Configuration for the radio session core, constructed once per service
//! through a fail-fast builder.
//!
//! The brand theme is an explicit configuration value threaded into the
//! notification presenter at construction. It replaces what used to be a
//! process-wide mutable field in earlier implementations of this system.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::{BrandTheme, SessionConfig};
//!
//! let config = SessionConfig::builder()
//!     .brand_theme(BrandTheme::named("slam"))
//!     .broadcaster("Triton Digital")
//!     .region("EU")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};

/// Iconography and layout identifiers for one brand.
///
/// Identifiers are opaque to the core; host bridges resolve them to their
/// platform's drawable/layout resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandTheme {
    /// Brand name (e.g. "slam").
    pub name: String,
    /// Layout resource identifier for the notification view.
    pub layout: String,
    /// Icon identifier for the play affordance.
    pub icon_play: String,
    /// Icon identifier for the pause affordance.
    pub icon_pause: String,
    /// Icon identifier for the dismiss button.
    pub icon_dismiss: String,
    /// Fixed label shown in place of title/artist during advertisement breaks.
    pub advertisement_label: String,
}

impl BrandTheme {
    /// Derive a theme from a brand name, using the `<name>_player_small`
    /// layout and `icon_state_*_<name>` icon naming convention.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            layout: format!("{name}_player_small"),
            icon_play: format!("icon_state_play_{name}"),
            icon_pause: format!("icon_state_pause_{name}"),
            icon_dismiss: format!("ic_close_{name}"),
            advertisement_label: "Advertisement".to_string(),
            name,
        }
    }

    /// Override the advertisement label.
    pub fn with_advertisement_label(mut self, label: impl Into<String>) -> Self {
        self.advertisement_label = label.into();
        self
    }
}

impl Default for BrandTheme {
    fn default() -> Self {
        Self::named("default")
    }
}

/// Configuration for one playback session service.
///
/// Use [`SessionConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Brand theme for the notification presenter.
    pub brand_theme: BrandTheme,
    /// Broadcaster name passed to the engine settings bundle.
    pub broadcaster: String,
    /// Provider service region passed to the engine settings bundle.
    pub region: String,
    /// Whether location-based ad targeting is enabled.
    pub location_tracking_enabled: bool,
    /// Targeting tags forwarded verbatim to the engine.
    pub ttags: Vec<String>,
    /// Whether the persistent notification starts enabled.
    pub notification_enabled: bool,
    /// Event bus buffer capacity.
    pub event_buffer: usize,
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.broadcaster.is_empty() {
            return Err(Error::Config(
                "Broadcaster name cannot be empty. Use .broadcaster() to set it.".to_string(),
            ));
        }

        if self.brand_theme.name.is_empty() {
            return Err(Error::Config("Brand theme name cannot be empty".to_string()));
        }

        if self.brand_theme.advertisement_label.is_empty() {
            return Err(Error::Config(
                "Advertisement label cannot be empty".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`SessionConfig`] instances.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    brand_theme: Option<BrandTheme>,
    broadcaster: Option<String>,
    region: Option<String>,
    location_tracking_enabled: Option<bool>,
    ttags: Option<Vec<String>>,
    notification_enabled: Option<bool>,
    event_buffer: Option<usize>,
}

impl SessionConfigBuilder {
    /// Sets the brand theme for the notification presenter.
    ///
    /// Default: [`BrandTheme::default`].
    pub fn brand_theme(mut self, theme: BrandTheme) -> Self {
        self.brand_theme = Some(theme);
        self
    }

    /// Sets the broadcaster name passed to the engine.
    ///
    /// Default: "Triton Digital".
    pub fn broadcaster(mut self, broadcaster: impl Into<String>) -> Self {
        self.broadcaster = Some(broadcaster.into());
        self
    }

    /// Sets the provider service region.
    ///
    /// Default: "EU".
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Enables or disables location-based ad targeting.
    ///
    /// Default: enabled.
    pub fn location_tracking(mut self, enabled: bool) -> Self {
        self.location_tracking_enabled = Some(enabled);
        self
    }

    /// Sets the targeting tags forwarded to the engine.
    ///
    /// Default: `["PLAYER:NOPREROLL"]`.
    pub fn ttags(mut self, ttags: Vec<String>) -> Self {
        self.ttags = Some(ttags);
        self
    }

    /// Enables or disables the persistent notification at startup.
    ///
    /// Default: enabled. Can be toggled at runtime through the service.
    pub fn notification_enabled(mut self, enabled: bool) -> Self {
        self.notification_enabled = Some(enabled);
        self
    }

    /// Sets the event bus buffer capacity.
    ///
    /// Default: 100.
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Builds the final `SessionConfig` instance, validating all values.
    pub fn build(self) -> Result<SessionConfig> {
        let config = SessionConfig {
            brand_theme: self.brand_theme.unwrap_or_default(),
            broadcaster: self
                .broadcaster
                .unwrap_or_else(|| "Triton Digital".to_string()),
            region: self.region.unwrap_or_else(|| "EU".to_string()),
            location_tracking_enabled: self.location_tracking_enabled.unwrap_or(true),
            ttags: self
                .ttags
                .unwrap_or_else(|| vec!["PLAYER:NOPREROLL".to_string()]),
            notification_enabled: self.notification_enabled.unwrap_or(true),
            event_buffer: self
                .event_buffer
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
