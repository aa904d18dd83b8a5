//! # Ad Surfaces and Confirmation Kinds
//!
//! Defines the two closed enumerations every other module keys on:
//! [`AdKind`] (which surface an ad is shown on) and [`ConfirmationKind`]
//! (which lifecycle signal an event records). Both are single definitions
//! shared across the workspace, so adding a variant forces every `match`
//! to handle it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;

/// The surface or format an advertisement is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    /// System notification ad.
    Notification,
    /// Sponsored image on the new tab page.
    NewTabPageAd,
    /// Card rendered inline in a content feed.
    InlineContentAd,
    /// Promoted article in a content feed.
    PromotedContent,
}

impl AdKind {
    /// Return all ad kinds as a slice, in declaration order.
    pub fn all() -> &'static [AdKind] {
        &[
            Self::Notification,
            Self::NewTabPageAd,
            Self::InlineContentAd,
            Self::PromotedContent,
        ]
    }

    /// The total number of ad kinds.
    pub const COUNT: usize = 4;

    /// Return the snake_case name used in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::NewTabPageAd => "new_tab_page_ad",
            Self::InlineContentAd => "inline_content_ad",
            Self::PromotedContent => "promoted_content",
        }
    }
}

impl std::fmt::Display for AdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError::UnknownAdKind(s.to_string()))
    }
}

/// A lifecycle signal recorded against a shown ad.
///
/// Exactly one confirmation kind is recorded per ad event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationKind {
    /// The ad was selected and handed to the surface.
    Served,
    /// The ad was displayed to the user.
    Viewed,
    /// The user clicked the ad.
    Clicked,
    /// The user dismissed the ad.
    Dismissed,
    /// The user stayed on the ad's landing page.
    Landed,
    /// The user converted after interacting with the ad.
    Conversion,
}

impl ConfirmationKind {
    /// Return all confirmation kinds as a slice, in declaration order.
    pub fn all() -> &'static [ConfirmationKind] {
        &[
            Self::Served,
            Self::Viewed,
            Self::Clicked,
            Self::Dismissed,
            Self::Landed,
            Self::Conversion,
        ]
    }

    /// The total number of confirmation kinds.
    pub const COUNT: usize = 6;

    /// Return the snake_case name used in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::Viewed => "viewed",
            Self::Clicked => "clicked",
            Self::Dismissed => "dismissed",
            Self::Landed => "landed",
            Self::Conversion => "conversion",
        }
    }
}

impl std::fmt::Display for ConfirmationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfirmationKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError::UnknownConfirmationKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_kind_count_matches_all() {
        assert_eq!(AdKind::all().len(), AdKind::COUNT);
    }

    #[test]
    fn confirmation_kind_count_matches_all() {
        assert_eq!(ConfirmationKind::all().len(), ConfirmationKind::COUNT);
    }

    #[test]
    fn ad_kind_display_matches_serde() {
        for kind in AdKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn confirmation_kind_display_matches_serde() {
        for kind in ConfirmationKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn ad_kind_from_str_accepts_every_name() {
        for kind in AdKind::all() {
            assert_eq!(kind.as_str().parse::<AdKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn ad_kind_from_str_rejects_unknown() {
        let err = "banner".parse::<AdKind>().unwrap_err();
        assert!(format!("{err}").contains("banner"));
    }

    #[test]
    fn confirmation_kind_from_str_rejects_unknown() {
        let err = "VIEWED".parse::<ConfirmationKind>().unwrap_err();
        assert!(format!("{err}").contains("VIEWED"));
    }
}
