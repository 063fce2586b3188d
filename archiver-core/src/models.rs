use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric Medusa episode status (`4` downloaded, `6` archived, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EpisodeStatus(pub i32);

impl EpisodeStatus {
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<i32> for EpisodeStatus {
    fn from(code: i32) -> Self {
        EpisodeStatus(code)
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A show reported by Medusa as having episodes at the source status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    /// Identifier as Medusa handed it out; passed through untouched.
    pub id: String,
    /// Key used by `api/v2` routes, e.g. `tvdb12345`.
    pub slug: String,
    pub name: String,
}

impl Series {
    /// Series discovered through the management page, keyed by TVDB id.
    pub fn from_tvdb(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            slug: format!("tvdb{id}"),
            id,
            name: name.into(),
        }
    }

    /// Series discovered through the internal API, where the slug is the id.
    pub fn from_slug(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: slug.clone(),
            slug,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Episode {
    pub series_id: String,
    /// 0 when a slug-only episode carries no numbers.
    pub season: u32,
    pub number: u32,
    /// Composite key from the internal API (`s01e02`), kept verbatim.
    pub slug: Option<String>,
}

impl Episode {
    pub fn numbered(
        series_id: impl Into<String>,
        season: u32,
        number: u32,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            season,
            number,
            slug: None,
        }
    }

    /// The key Medusa expects in update payloads.
    pub fn slug(&self) -> String {
        match &self.slug {
            Some(slug) => slug.clone(),
            None => format!("s{}e{}", self.season, self.number),
        }
    }
}

impl PartialOrd for Episode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Episode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.series_id, self.season, self.number, &self.slug).cmp(&(
            &other.series_id,
            other.season,
            other.number,
            &other.slug,
        ))
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slug {
            Some(slug) => f.write_str(slug),
            None => write!(f, "S{:02}E{:02}", self.season, self.number),
        }
    }
}

/// Parses `s01e02`-style keys (case-insensitive) into season and episode.
pub fn parse_episode_slug(slug: &str) -> Option<(u32, u32)> {
    let lower = slug.trim().to_ascii_lowercase();
    let rest = lower.strip_prefix('s')?;
    let (season, episode) = rest.split_once('e')?;
    Some((season.parse().ok()?, episode.parse().ok()?))
}

/// A series together with its episodes at the source status, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredShow {
    pub series: Series,
    pub episodes: Vec<Episode>,
}

impl DiscoveredShow {
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }
}

pub fn total_episodes(shows: &[DiscoveredShow]) -> usize {
    shows.iter().map(DiscoveredShow::episode_count).sum()
}
