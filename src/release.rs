use crate::{
    data::github::GithubRelease,
    error::Result,
    native::{current_platform, Platform},
};

/// A published version of the game, as listed by the release host
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Release {
    pub tag_name: String,
    pub is_prerelease: bool,
    pub name: String,
    pub published_at: String,
    pub body: String,

    pub linux64_url: Option<String>,
    pub windows64_url: Option<String>,
    pub windows32_url: Option<String>,
    pub webgl_url: Option<String>,
}

impl From<GithubRelease> for Release {
    fn from(gh: GithubRelease) -> Self {
        let mut release = Self {
            tag_name: gh.tag_name,
            is_prerelease: gh.prerelease,
            name: gh.name.unwrap_or_default(),
            published_at: gh.published_at.unwrap_or_default(),
            body: gh.body.unwrap_or_default(),
            ..Default::default()
        };

        for asset in gh.assets {
            let slot = match Platform::from_asset_name(&asset.name) {
                Some(Platform::Linux64) => &mut release.linux64_url,
                Some(Platform::Windows64) => &mut release.windows64_url,
                Some(Platform::Windows32) => &mut release.windows32_url,
                Some(Platform::WebGl) => &mut release.webgl_url,
                None => continue,
            };
            *slot = Some(asset.browser_download_url);
        }

        release
    }
}

impl Release {
    pub fn url_for(&self, platform: Platform) -> Option<&str> {
        let url = match platform {
            Platform::Linux64 => &self.linux64_url,
            Platform::Windows64 => &self.windows64_url,
            Platform::Windows32 => &self.windows32_url,
            Platform::WebGl => &self.webgl_url,
        };
        url.as_deref()
    }

    /// Download location of the archive for the running platform
    pub fn current_os_url(&self) -> Option<&str> {
        self.url_for(current_platform()?)
    }
}

/// Parse a release listing body into releases, keeping the listing order
pub fn parse_releases(data: &[u8]) -> Result<Vec<Release>> {
    let listing: Vec<GithubRelease> = serde_json::from_slice(data)?;
    Ok(listing.into_iter().map(Release::from).collect())
}
