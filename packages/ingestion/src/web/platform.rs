//! Known-platform detection and oEmbed endpoints.
//!
//! Video platforms are a fixed set whose oEmbed response is considered
//! sufficient on its own; rich-embed platforms still get an HTML pass for
//! the remaining metadata fields.

/// How much the platform's oEmbed response covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// oEmbed success makes the HTML fetch unnecessary
    Video,
    /// oEmbed enriches, HTML is still fetched
    Rich,
}

/// A platform with a known oEmbed endpoint.
#[derive(Debug)]
pub struct Platform {
    pub name: &'static str,
    pub kind: PlatformKind,
    hosts: &'static [&'static str],
    oembed_endpoint: &'static str,
}

/// Fixed platform table, video platforms first.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "youtube",
        kind: PlatformKind::Video,
        hosts: &["youtube.com", "youtu.be"],
        oembed_endpoint: "https://www.youtube.com/oembed?format=json&url=",
    },
    Platform {
        name: "vimeo",
        kind: PlatformKind::Video,
        hosts: &["vimeo.com"],
        oembed_endpoint: "https://vimeo.com/api/oembed.json?url=",
    },
    Platform {
        name: "dailymotion",
        kind: PlatformKind::Video,
        hosts: &["dailymotion.com"],
        oembed_endpoint: "https://www.dailymotion.com/services/oembed?format=json&url=",
    },
    Platform {
        name: "tiktok",
        kind: PlatformKind::Video,
        hosts: &["tiktok.com"],
        oembed_endpoint: "https://www.tiktok.com/oembed?url=",
    },
    Platform {
        name: "twitter",
        kind: PlatformKind::Rich,
        hosts: &["twitter.com", "x.com"],
        oembed_endpoint: "https://publish.twitter.com/oembed?url=",
    },
    Platform {
        name: "reddit",
        kind: PlatformKind::Rich,
        hosts: &["reddit.com"],
        oembed_endpoint: "https://www.reddit.com/oembed?url=",
    },
    Platform {
        name: "spotify",
        kind: PlatformKind::Rich,
        hosts: &["open.spotify.com", "spotify.com"],
        oembed_endpoint: "https://open.spotify.com/oembed?url=",
    },
    Platform {
        name: "soundcloud",
        kind: PlatformKind::Rich,
        hosts: &["soundcloud.com"],
        oembed_endpoint: "https://soundcloud.com/oembed?format=json&url=",
    },
    Platform {
        name: "flickr",
        kind: PlatformKind::Rich,
        hosts: &["flickr.com"],
        oembed_endpoint: "https://www.flickr.com/services/oembed?format=json&url=",
    },
    Platform {
        name: "codepen",
        kind: PlatformKind::Rich,
        hosts: &["codepen.io"],
        oembed_endpoint: "https://codepen.io/api/oembed?format=json&url=",
    },
];

impl Platform {
    pub fn is_video(&self) -> bool {
        self.kind == PlatformKind::Video
    }

    /// Full oEmbed lookup URL for a target page.
    pub fn oembed_url(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        format!("{}{}", self.oembed_endpoint, encoded)
    }
}

/// Detect a known platform from the URL's hostname.
pub fn detect(url: &str) -> Option<&'static Platform> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    PLATFORMS
        .iter()
        .find(|p| p.hosts.iter().any(|h| host_matches(&host, h)))
}

fn host_matches(host: &str, platform_host: &str) -> bool {
    host == platform_host || host.ends_with(&format!(".{}", platform_host))
}

/// Derive the stable video ID from a YouTube URL, across the URL shapes
/// YouTube serves (`watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`).
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    let id = if host.contains("youtu.be") {
        parsed.path_segments()?.next().map(|s| s.to_string())
    } else if host.contains("youtube.com") {
        let path = parsed.path();
        if path == "/watch" {
            parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        } else if let Some(rest) = path.strip_prefix("/embed/") {
            Some(rest.to_string())
        } else if let Some(rest) = path.strip_prefix("/shorts/") {
            Some(rest.to_string())
        } else {
            None
        }
    } else {
        None
    };

    id.filter(|v| !v.is_empty())
}

/// Upgrade a thumbnail to its highest-resolution variant when the
/// platform exposes one addressable by a stable ID.
pub fn upgrade_thumbnail(platform: &Platform, page_url: &str, thumbnail: &str) -> String {
    if platform.name == "youtube" {
        if let Some(id) = youtube_video_id(page_url) {
            return format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", id);
        }
    }
    thumbnail.to_string()
}
