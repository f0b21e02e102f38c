//! Normalized, size-bounded presence value sent to the broadcast endpoint

use chrono::{DateTime, Utc};

/// Maximum byte length of every free-text field accepted by the endpoint
pub const MAX_FIELD_BYTES: usize = 128;

pub const DEFAULT_LARGE_IMAGE_KEY: &str = "li_1";
pub const DEFAULT_SMALL_IMAGE_KEY: &str = "class_0";
pub const AWAY_SMALL_IMAGE_KEY: &str = "away";

/// Truncate to at most [`MAX_FIELD_BYTES`] without splitting a UTF-8 sequence
fn bounded(text: impl Into<String>) -> String {
    let mut text = text.into();
    if text.len() > MAX_FIELD_BYTES {
        let mut end = MAX_FIELD_BYTES;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// An image from the endpoint's registered asset catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAsset {
    key: String,
    text: String,
}

impl ImageAsset {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: bounded(key),
            text: bounded(text),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub start: DateTime<Utc>,
}

/// Party shown next to the activity. `size <= max` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    size: u32,
    max: u32,
    id: String,
}

impl Party {
    /// `max` is raised to `size` when the roster is larger than the cap
    pub fn new(size: u32, max: u32, id: impl Into<String>) -> Self {
        Self {
            size,
            max: max.max(size),
            id: bounded(id),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// What should be shown. Equality is structural and drives send suppression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceRecord {
    details: String,
    state: String,
    large_image: ImageAsset,
    small_image: ImageAsset,
    timestamps: Option<Timestamps>,
    party: Option<Party>,
}

impl PresenceRecord {
    pub fn builder() -> PresenceRecordBuilder {
        PresenceRecordBuilder::default()
    }

    /// The record shown while in menus or after logout
    pub fn menu(details: impl Into<String>, start: Option<DateTime<Utc>>) -> Self {
        Self::builder()
            .details(details)
            .large_image(ImageAsset::new(DEFAULT_LARGE_IMAGE_KEY, ""))
            .small_image(ImageAsset::new(DEFAULT_SMALL_IMAGE_KEY, ""))
            .start(start)
            .build()
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn large_image(&self) -> &ImageAsset {
        &self.large_image
    }

    pub fn small_image(&self) -> &ImageAsset {
        &self.small_image
    }

    pub fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }

    pub fn party(&self) -> Option<&Party> {
        self.party.as_ref()
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = bounded(details);
        self
    }

    pub fn with_start(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.timestamps = start.map(|start| Timestamps { start });
        self
    }
}

#[derive(Debug, Default)]
pub struct PresenceRecordBuilder {
    record: PresenceRecord,
}

impl PresenceRecordBuilder {
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.record.details = bounded(details);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.record.state = bounded(state);
        self
    }

    pub fn large_image(mut self, image: ImageAsset) -> Self {
        self.record.large_image = image;
        self
    }

    pub fn small_image(mut self, image: ImageAsset) -> Self {
        self.record.small_image = image;
        self
    }

    pub fn start(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.record.timestamps = start.map(|start| Timestamps { start });
        self
    }

    pub fn party(mut self, party: Option<Party>) -> Self {
        self.record.party = party;
        self
    }

    pub fn build(self) -> PresenceRecord {
        self.record
    }
}
