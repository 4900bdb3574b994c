use crate::release::Release;

/// Which releases the version list shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleaseFilter {
    pub show_prereleases: bool,
}

impl Default for ReleaseFilter {
    fn default() -> Self {
        Self {
            show_prereleases: true,
        }
    }
}

impl ReleaseFilter {
    pub fn new(show_prereleases: bool) -> Self {
        Self { show_prereleases }
    }

    pub fn accepts(&self, release: &Release) -> bool {
        self.show_prereleases || !release.is_prerelease
    }

    /// Indices of the accepted releases, in listing order
    pub fn apply(&self, releases: &[Release]) -> Vec<usize> {
        releases
            .iter()
            .enumerate()
            .filter(|(_, release)| self.accepts(release))
            .map(|(i, _)| i)
            .collect()
    }
}
