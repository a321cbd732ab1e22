use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};
use dotenvy::dotenv;

pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;
pub const DEFAULT_ZOOM_STEP: f64 = 1.25;
pub const DEFAULT_MIN_SELECTION: f64 = 5.0;
pub const DEFAULT_HISTORY_DEPTH: usize = 30;
pub const DEFAULT_SLIDESHOW_SECS: u64 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Drags whose clipped width or height is not above this are discarded.
    pub min_selection: f64,
    /// Upscale limit for small images in fit mode. `None` renders them at native size.
    pub fit_upscale_cap: Option<f64>,
    pub history_depth: usize,
    pub slideshow_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_selection: DEFAULT_MIN_SELECTION,
            fit_upscale_cap: None,
            history_depth: DEFAULT_HISTORY_DEPTH,
            slideshow_interval: Duration::from_secs(DEFAULT_SLIDESHOW_SECS),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let mut builder = Self::builder();

        if let Some(v) = env_parse::<f64>("PIXVIEW_MIN_ZOOM")? {
            builder = builder.with_min_zoom(v);
        }
        if let Some(v) = env_parse::<f64>("PIXVIEW_MAX_ZOOM")? {
            builder = builder.with_max_zoom(v);
        }
        if let Some(v) = env_parse::<f64>("PIXVIEW_ZOOM_STEP")? {
            builder = builder.with_zoom_step(v);
        }
        if let Some(v) = env_parse::<f64>("PIXVIEW_MIN_SELECTION")? {
            builder = builder.with_min_selection(v);
        }
        if let Some(v) = env_parse::<f64>("PIXVIEW_FIT_UPSCALE_CAP")? {
            builder = builder.with_fit_upscale_cap(Some(v));
        }
        if let Some(v) = env_parse::<usize>("PIXVIEW_HISTORY_DEPTH")? {
            builder = builder.with_history_depth(v);
        }
        if let Some(v) = env_parse::<u64>("PIXVIEW_SLIDESHOW_SECS")? {
            builder = builder.with_slideshow_interval(Duration::from_secs(v));
        }

        builder.build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            config: Self::default(),
        }
    }

    /// Starts a builder from this configuration, e.g. to layer CLI flags
    /// over values loaded from the environment.
    pub fn into_builder(self) -> ConfigBuilder {
        ConfigBuilder { config: self }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(AppError::config("min zoom must be a positive number"));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom > self.min_zoom) {
            return Err(AppError::config(format!(
                "max zoom ({}) must be greater than min zoom ({})",
                self.max_zoom, self.min_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(AppError::config("zoom step must be greater than 1"));
        }
        if !(self.min_selection.is_finite() && self.min_selection >= 0.0) {
            return Err(AppError::config("min selection must not be negative"));
        }
        if let Some(cap) = self.fit_upscale_cap {
            if !(cap.is_finite() && cap >= 1.0) {
                return Err(AppError::config("fit upscale cap must be at least 1"));
            }
        }
        if self.history_depth == 0 {
            return Err(AppError::config("history depth must be at least 1"));
        }
        if self.slideshow_interval.is_zero() {
            return Err(AppError::config("slideshow interval must not be zero"));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw:?}"))),
        Err(_) => Ok(None),
    }
}

/// Builder for overriding individual settings, e.g. from CLI flags.
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn with_min_zoom(mut self, v: f64) -> Self {
        self.config.min_zoom = v;
        self
    }

    pub fn with_max_zoom(mut self, v: f64) -> Self {
        self.config.max_zoom = v;
        self
    }

    pub fn with_zoom_step(mut self, v: f64) -> Self {
        self.config.zoom_step = v;
        self
    }

    pub fn with_min_selection(mut self, v: f64) -> Self {
        self.config.min_selection = v;
        self
    }

    pub fn with_fit_upscale_cap(mut self, v: Option<f64>) -> Self {
        self.config.fit_upscale_cap = v;
        self
    }

    pub fn with_history_depth(mut self, v: usize) -> Self {
        self.config.history_depth = v;
        self
    }

    pub fn with_slideshow_interval(mut self, v: Duration) -> Self {
        self.config.slideshow_interval = v;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fit_upscale_cap, None);
    }

    // The only test that touches process env, so no other test races it.
    #[test]
    fn load_reads_env_overrides() {
        unsafe { env::set_var("PIXVIEW_SLIDESHOW_SECS", "7") };
        let config = Config::load().unwrap();
        assert_eq!(config.slideshow_interval, Duration::from_secs(7));

        unsafe { env::set_var("PIXVIEW_SLIDESHOW_SECS", "soon") };
        let err = Config::load().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        unsafe { env::remove_var("PIXVIEW_SLIDESHOW_SECS") };
    }

    #[test]
    fn rejects_inverted_zoom_bounds() {
        let err = Config::builder()
            .with_min_zoom(4.0)
            .with_max_zoom(2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rejects_step_that_cannot_zoom() {
        assert!(Config::builder().with_zoom_step(1.0).build().is_err());
        assert!(Config::builder().with_zoom_step(f64::NAN).build().is_err());
    }

    #[test]
    fn rejects_zero_history_and_small_cap() {
        assert!(Config::builder().with_history_depth(0).build().is_err());
        assert!(Config::builder().with_fit_upscale_cap(Some(0.5)).build().is_err());
        assert!(Config::builder().with_fit_upscale_cap(Some(1.5)).build().is_ok());
    }
}
