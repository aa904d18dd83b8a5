//! # Candidate Ads
//!
//! A [`CandidateAd`] is an ad offered for delivery by the serving source.
//! The kind-specific fields live in [`Creative`]; the ad's [`AdKind`] is
//! derived from the creative variant, so a candidate cannot claim one
//! surface while carrying another surface's payload.

use adgate_core::{AdKind, Segment, ValidationError};
use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Creative
// ---------------------------------------------------------------------------

/// Kind-specific presentation fields of an ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Creative {
    /// System notification.
    Notification {
        /// Notification title.
        title: String,
        /// Notification body text.
        body: String,
        /// Page opened when the notification is clicked.
        target_url: String,
    },
    /// Sponsored new tab page image.
    NewTabPageAd {
        /// Advertiser shown under the image.
        company_name: String,
        /// Background image location.
        image_url: String,
        /// Alternative text for the image.
        alt: String,
        /// Page opened when the logo is clicked.
        target_url: String,
    },
    /// Inline card in a content feed.
    InlineContentAd {
        /// Card title.
        title: String,
        /// Card description.
        description: String,
        /// Card image location.
        image_url: String,
        /// Image dimensions, e.g. `900x750`.
        dimensions: String,
        /// Call-to-action label.
        cta_text: String,
        /// Page opened when the card is clicked.
        target_url: String,
    },
    /// Promoted article in a content feed.
    PromotedContent {
        /// Article title.
        title: String,
        /// Article description.
        description: String,
        /// Page opened when the article is clicked.
        target_url: String,
    },
}

impl Creative {
    /// The surface this creative is rendered on.
    pub fn ad_kind(&self) -> AdKind {
        match self {
            Self::Notification { .. } => AdKind::Notification,
            Self::NewTabPageAd { .. } => AdKind::NewTabPageAd,
            Self::InlineContentAd { .. } => AdKind::InlineContentAd,
            Self::PromotedContent { .. } => AdKind::PromotedContent,
        }
    }

    fn required_text(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Notification { title, body, .. } => {
                vec![("title", title.as_str()), ("body", body.as_str())]
            }
            Self::NewTabPageAd {
                company_name, alt, ..
            } => vec![("company_name", company_name.as_str()), ("alt", alt.as_str())],
            Self::InlineContentAd {
                title,
                description,
                dimensions,
                cta_text,
                ..
            } => vec![
                ("title", title.as_str()),
                ("description", description.as_str()),
                ("dimensions", dimensions.as_str()),
                ("cta_text", cta_text.as_str()),
            ],
            Self::PromotedContent {
                title, description, ..
            } => vec![("title", title.as_str()), ("description", description.as_str())],
        }
    }

    fn required_urls(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Notification { target_url, .. } | Self::PromotedContent { target_url, .. } => {
                vec![("target_url", target_url.as_str())]
            }
            Self::NewTabPageAd {
                image_url,
                target_url,
                ..
            }
            | Self::InlineContentAd {
                image_url,
                target_url,
                ..
            } => vec![
                ("image_url", image_url.as_str()),
                ("target_url", target_url.as_str()),
            ],
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let ad_kind = self.ad_kind();
        for (field, value) in self.required_text() {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { ad_kind, field });
            }
        }
        for (field, value) in self.required_urls() {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { ad_kind, field });
            }
            validate_web_url(field, value)?;
        }
        Ok(())
    }
}

fn validate_web_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let url = Url::parse(value).map_err(|e| ValidationError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("scheme \"{other}\" is not http or https"),
        }),
    }
}

// ---------------------------------------------------------------------------
// CandidateAd
// ---------------------------------------------------------------------------

/// An ad under consideration for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAd {
    /// Identifier of this ad instance in the catalog.
    pub ad_identifier: String,
    /// Campaign creative set the ad belongs to.
    pub creative_set_id: String,
    /// Classification segment, e.g. `technology & computing-software`.
    pub segment: String,
    /// Kind-specific presentation fields.
    pub creative: Creative,
}

impl CandidateAd {
    /// Create a candidate ad.
    pub fn new(
        ad_identifier: impl Into<String>,
        creative_set_id: impl Into<String>,
        segment: impl Into<String>,
        creative: Creative,
    ) -> Self {
        Self {
            ad_identifier: ad_identifier.into(),
            creative_set_id: creative_set_id.into(),
            segment: segment.into(),
            creative,
        }
    }

    /// The surface this candidate targets.
    pub fn ad_kind(&self) -> AdKind {
        self.creative.ad_kind()
    }

    /// Check the candidate's validity invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: empty identifier, empty segment,
    /// a missing kind-specific field, or a URL that is not http(s).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ad_identifier.trim().is_empty() {
            return Err(ValidationError::EmptyAdIdentifier);
        }
        Segment::new(self.segment.as_str())?;
        self.creative.validate()
    }

    /// The validated segment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySegment`] if the segment is blank.
    pub fn segment(&self) -> Result<Segment, ValidationError> {
        Segment::new(self.segment.as_str())
    }
}
