use serde::{Deserialize, Serialize};

/// One entry of the release listing. Fields the provider omits
/// deserialize as empty values.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct GithubRelease {
    pub tag_name: String,
    pub prerelease: bool,
    pub name: Option<String>,
    pub published_at: Option<String>,
    pub body: Option<String>,
    pub assets: Vec<GithubAsset>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}
