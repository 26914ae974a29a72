use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a wanted record.
///
/// The server uses integer keys but the list only ever compares them as
/// strings, so ids are kept as text regardless of the wire encoding.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::serde_util::string_or_number(deserializer).map(RecordId)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" | "show" | "tv" => Ok(MediaKind::Series),
            other => Err(format!("Invalid media type: {}. Use 'movie' or 'series'", other)),
        }
    }
}

/// Catalogs an external identifier can come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExternalSource {
    /// Primary catalog, meaningful for movies
    Tmdb,
    /// Secondary catalog, meaningful for series
    Tvdb,
    Anilist,
}

impl ExternalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalSource::Tmdb => "tmdb",
            ExternalSource::Tvdb => "tvdb",
            ExternalSource::Anilist => "anilist",
        }
    }

    /// Public page for an id in this catalog, used when the caller gives no link
    pub fn default_link(&self, external_id: &str, kind: MediaKind) -> String {
        match (self, kind) {
            (ExternalSource::Tmdb, MediaKind::Series) => {
                format!("https://www.themoviedb.org/tv/{}", external_id)
            }
            (ExternalSource::Tmdb, MediaKind::Movie) => {
                format!("https://www.themoviedb.org/movie/{}", external_id)
            }
            (ExternalSource::Tvdb, _) => format!("https://thetvdb.com/series/{}", external_id),
            (ExternalSource::Anilist, _) => format!("https://anilist.co/anime/{}", external_id),
        }
    }
}

impl fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExternalSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tmdb" => Ok(ExternalSource::Tmdb),
            "tvdb" => Ok(ExternalSource::Tvdb),
            "anilist" => Ok(ExternalSource::Anilist),
            other => Err(format!("Invalid external source: {}. Use 'tmdb', 'tvdb' or 'anilist'", other)),
        }
    }
}

/// Downstream services a record can be pushed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Radarr,
    Sonarr,
}

impl Service {
    pub const ALL: [Service; 2] = [Service::Radarr, Service::Sonarr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Radarr => "radarr",
            Service::Sonarr => "sonarr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Radarr => "Radarr",
            Service::Sonarr => "Sonarr",
        }
    }

    /// Media kind this service manages
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Service::Radarr => MediaKind::Movie,
            Service::Sonarr => MediaKind::Series,
        }
    }

    /// External id a record needs before it can be pushed here
    pub fn required_source(&self) -> ExternalSource {
        match self {
            Service::Radarr => ExternalSource::Tmdb,
            Service::Sonarr => ExternalSource::Tvdb,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "radarr" => Ok(Service::Radarr),
            "sonarr" => Ok(Service::Sonarr),
            other => Err(format!("Invalid service: {}. Use 'radarr' or 'sonarr'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "crate::serde_util::opt_string_or_number")]
    pub tmdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "crate::serde_util::opt_string_or_number")]
    pub tvdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "crate::serde_util::opt_string_or_number")]
    pub anilist: Option<String>,
}

impl ExternalIds {
    pub fn get(&self, source: ExternalSource) -> Option<&str> {
        match source {
            ExternalSource::Tmdb => self.tmdb.as_deref(),
            ExternalSource::Tvdb => self.tvdb.as_deref(),
            ExternalSource::Anilist => self.anilist.as_deref(),
        }
    }

    pub fn set(&mut self, source: ExternalSource, external_id: String) {
        match source {
            ExternalSource::Tmdb => self.tmdb = Some(external_id),
            ExternalSource::Tvdb => self.tvdb = Some(external_id),
            ExternalSource::Anilist => self.anilist = Some(external_id),
        }
    }
}

/// "Downloaded" tri-state as reported by the content endpoint.
///
/// Encoded on the wire as `null` / `false` / `true`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum DownloadState {
    /// Not yet known, typically while a downstream job is still running
    #[default]
    Unknown,
    No,
    Yes,
}

impl DownloadState {
    pub fn is_known(&self) -> bool {
        !matches!(self, DownloadState::Unknown)
    }
}

impl From<Option<bool>> for DownloadState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => DownloadState::Unknown,
            Some(false) => DownloadState::No,
            Some(true) => DownloadState::Yes,
        }
    }
}

impl From<DownloadState> for Option<bool> {
    fn from(value: DownloadState) -> Self {
        match value {
            DownloadState::Unknown => None,
            DownloadState::No => Some(false),
            DownloadState::Yes => Some(true),
        }
    }
}

/// Root folder assigned per downstream service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicePaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radarr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<String>,
}

impl ServicePaths {
    pub fn get(&self, service: Service) -> Option<&str> {
        match service {
            Service::Radarr => self.radarr.as_deref(),
            Service::Sonarr => self.sonarr.as_deref(),
        }
    }

    pub fn set(&mut self, service: Service, path: String) {
        match service {
            Service::Radarr => self.radarr = Some(path),
            Service::Sonarr => self.sonarr = Some(path),
        }
    }
}

/// One wanted media entry as rendered in the list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WantedRecord {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    pub media_type: MediaKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub in_radarr: bool,
    #[serde(default)]
    pub in_sonarr: bool,
    #[serde(default)]
    pub downloaded: DownloadState,
    #[serde(default)]
    pub root_paths: ServicePaths,
    #[serde(default)]
    pub missing_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl WantedRecord {
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>, media_type: MediaKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: None,
            media_type,
            category: String::new(),
            external_ids: ExternalIds::default(),
            in_radarr: false,
            in_sonarr: false,
            downloaded: DownloadState::Unknown,
            root_paths: ServicePaths::default(),
            missing_external: false,
            created_at: None,
        }
    }

    pub fn external_id(&self, source: ExternalSource) -> Option<&str> {
        self.external_ids.get(source)
    }

    pub fn has_external(&self, source: ExternalSource) -> bool {
        self.external_id(source).is_some()
    }

    pub fn in_service(&self, service: Service) -> bool {
        match service {
            Service::Radarr => self.in_radarr,
            Service::Sonarr => self.in_sonarr,
        }
    }

    pub fn set_in_service(&mut self, service: Service, present: bool) {
        match service {
            Service::Radarr => self.in_radarr = present,
            Service::Sonarr => self.in_sonarr = present,
        }
    }

    /// Right kind and carries the external id the service needs
    pub fn can_push_to(&self, service: Service) -> bool {
        self.media_type == service.media_kind() && self.has_external(service.required_source())
    }

    /// Pushable and not yet present downstream
    pub fn is_add_eligible(&self, service: Service) -> bool {
        self.can_push_to(service) && !self.in_service(service)
    }

    /// Pushable and already present downstream
    pub fn is_update_eligible(&self, service: Service) -> bool {
        self.can_push_to(service) && self.in_service(service)
    }

    /// Whether `source` is the id that satisfies this record's "missing external" flag.
    ///
    /// Movies need tmdb, series need tvdb, and anime (any kind) is satisfied by anilist.
    pub fn external_clears_missing(&self, source: ExternalSource) -> bool {
        match source {
            ExternalSource::Tmdb => self.media_type == MediaKind::Movie,
            ExternalSource::Tvdb => self.media_type == MediaKind::Series,
            ExternalSource::Anilist => self.category.eq_ignore_ascii_case("anime"),
        }
    }

    /// Record an assigned external id and clear "missing external" where it applies.
    pub fn assign_external(&mut self, source: ExternalSource, external_id: impl Into<String>) {
        self.external_ids.set(source, external_id.into());
        if self.external_clears_missing(source) {
            self.missing_external = false;
        }
    }
}
