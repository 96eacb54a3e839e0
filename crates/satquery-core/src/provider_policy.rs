use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Remote or local source of catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Discos,
    Celestrak,
    SpaceTrack,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discos => "discos",
            Self::Celestrak => "celestrak",
            Self::SpaceTrack => "spacetrack",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paging and cooldown rules for the DISCOS objects endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscosPolicy {
    pub page_size: u32,
    pub pages_per_cooldown: u32,
    pub cooldown: Duration,
}

impl Default for DiscosPolicy {
    fn default() -> Self {
        Self {
            page_size: 100,
            pages_per_cooldown: 20,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl DiscosPolicy {
    /// Whether the fetcher must pause after `current_page` before requesting more.
    pub fn cooldown_due(&self, current_page: u32, total_pages: u32) -> bool {
        self.pages_per_cooldown > 0
            && current_page < total_pages
            && current_page % self.pages_per_cooldown == 0
    }
}

/// Batching and rate limits for the Space-Track query API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceTrackPolicy {
    pub batch_size: usize,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl Default for SpaceTrackPolicy {
    fn default() -> Self {
        Self {
            batch_size: 500,
            quota_window: Duration::from_secs(60),
            quota_limit: 20,
        }
    }
}
