//! # Rule Configuration
//!
//! The host supplies the permission rules as an ordered list of named
//! entries, typically from a feature-flag payload or a remote config file.
//! Loading that document is the host's job; this module parses it from a
//! string, validates it, and turns it into a [`PermissionRuleChain`].
//!
//! ```yaml
//! rules:
//!   - name: notification_ads_per_hour
//!     kind: per_window_cap
//!     window_secs: 3600
//!     max_count: 2
//!     ad_kind: notification
//!   - name: conversion_exclusion
//!     kind: conversion_exclusion
//! ```

use std::collections::HashSet;
use std::num::NonZeroU32;

use adgate_core::{AdKind, ConfigError, ConfirmationKind};
use serde::{Deserialize, Serialize};

use crate::chain::{PermissionRuleChain, RuleEntry};
use crate::rules::{PermissionRule, DAY_SECS, HOUR_SECS};

/// Longest accepted window or gap: 400 days.
pub const MAX_WINDOW_SECS: u64 = 400 * DAY_SECS;

const fn cap(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => panic!("cap must be nonzero"),
    }
}

const NOTIFICATIONS_PER_HOUR: NonZeroU32 = cap(2);
const NOTIFICATIONS_PER_DAY: NonZeroU32 = cap(40);
const FEED_ADS_PER_HOUR: NonZeroU32 = cap(4);
const FEED_ADS_PER_DAY: NonZeroU32 = cap(20);

/// Ordered permission rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl RuleSetConfig {
    /// Create a configuration from entries in evaluation order.
    pub fn new(rules: Vec<RuleEntry>) -> Self {
        Self { rules }
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML (including a zero
    /// `max_count`) and any validation
    /// error from [`RuleSetConfig::validate`].
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON (including a zero
    /// `max_count`) and any validation
    /// error from [`RuleSetConfig::validate`].
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every rule is well-formed.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyRuleName`] for a blank name.
    /// - [`ConfigError::DuplicateRuleName`] when two entries share a name.
    /// - [`ConfigError::InvalidWindow`] for a window or gap outside
    ///   `1..=MAX_WINDOW_SECS`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (position, entry) in self.rules.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::EmptyRuleName(position));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateRuleName(entry.name.clone()));
            }
            validate_rule(&entry.name, &entry.rule)?;
        }
        Ok(())
    }

    /// Validate and build the rule chain.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn into_chain(self) -> Result<PermissionRuleChain, ConfigError> {
        self.validate()?;
        Ok(PermissionRuleChain::new(self.rules))
    }

    /// The default rule set.
    ///
    /// - Notifications: 2 per hour, 40 per day, 30 minutes apart.
    /// - New tab page: 4 per hour, 20 per day, 5 minutes apart.
    /// - Inline content and promoted content: 4 per hour, 20 per day.
    /// - Any single ad at most once per 10 minutes.
    /// - No ad after it has converted.
    pub fn standard() -> Self {
        let mut rules = vec![RuleEntry::new(
            "conversion_exclusion",
            PermissionRule::ConversionExclusion,
        )];
        rules.push(RuleEntry::new(
            "per_ad_minimum_gap",
            PermissionRule::PerAdCap {
                window_secs: 10 * 60,
                max_count: NonZeroU32::MIN,
                confirmation_kind: ConfirmationKind::Viewed,
            },
        ));
        for (kind, per_hour, per_day, gap_secs) in [
            (
                AdKind::Notification,
                NOTIFICATIONS_PER_HOUR,
                NOTIFICATIONS_PER_DAY,
                Some(30 * 60),
            ),
            (
                AdKind::NewTabPageAd,
                FEED_ADS_PER_HOUR,
                FEED_ADS_PER_DAY,
                Some(5 * 60),
            ),
            (AdKind::InlineContentAd, FEED_ADS_PER_HOUR, FEED_ADS_PER_DAY, None),
            (AdKind::PromotedContent, FEED_ADS_PER_HOUR, FEED_ADS_PER_DAY, None),
        ] {
            rules.push(RuleEntry::new(
                format!("{kind}_per_hour"),
                PermissionRule::per_hour(kind, per_hour),
            ));
            rules.push(RuleEntry::new(
                format!("{kind}_per_day"),
                PermissionRule::per_day(kind, per_day),
            ));
            if let Some(gap) = gap_secs {
                rules.push(RuleEntry::new(
                    format!("{kind}_minimum_wait"),
                    PermissionRule::minimum_interval(kind, gap),
                ));
            }
        }
        Self { rules }
    }
}

fn validate_rule(name: &str, rule: &PermissionRule) -> Result<(), ConfigError> {
    let seconds = match *rule {
        PermissionRule::PerWindowCap { window_secs, .. }
        | PermissionRule::PerAdCap { window_secs, .. }
        | PermissionRule::PerCreativeSetCap { window_secs, .. } => window_secs,
        PermissionRule::MinimumInterval { min_gap_secs, .. } => min_gap_secs,
        PermissionRule::ConversionExclusion => return Ok(()),
    };
    if seconds == 0 || seconds > MAX_WINDOW_SECS {
        return Err(ConfigError::InvalidWindow {
            rule: name.to_string(),
            seconds,
            max: MAX_WINDOW_SECS,
        });
    }
    Ok(())
}
