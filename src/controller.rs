//! Window-independent launcher state.
//!
//! The controller owns the release listing, the current selection and the
//! single in-flight request. A front-end calls the `on_*` handlers from its
//! widgets and `poll` once per frame, then renders from the accessors.

use crate::{
    config::LauncherConfig,
    downloader::{download_bytes, http_client, DlStatus, ThreadData, ThreadStatus},
    error::{Error, Result},
    filter::ReleaseFilter,
    release::{parse_releases, Release},
    Launcher,
};
use log::{error, info, warn};
use reqwest::Client;
use std::process::Child;
use tokio::runtime::Handle;

/// What the running request is for
enum Pending {
    Listing,
    Install(Release),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub value: u64,
    /// None while the size is unknown
    pub max: Option<u64>,
}

impl Progress {
    pub fn fraction(&self) -> Option<f32> {
        match self.max {
            Some(0) | None => None,
            Some(max) => Some((self.value as f32 / max as f32).min(1.0)),
        }
    }
}

pub struct Controller {
    launcher: Launcher,
    releases_url: String,
    client: Client,
    handle: Handle,

    filter: ReleaseFilter,
    releases: Vec<Release>,
    /// Indices into `releases` shown in the version list
    filtered: Vec<usize>,
    entries: Vec<String>,
    /// Index into `filtered`
    selected: Option<usize>,

    task: Option<(Pending, ThreadData<DlStatus, ()>)>,
    progress: Option<Progress>,
    last_error: Option<String>,
    children: Vec<Child>,
}

impl Controller {
    pub fn new(config: &LauncherConfig, launcher: Launcher, handle: Handle) -> Result<Self> {
        Ok(Self {
            launcher,
            releases_url: config.releases_url.clone(),
            client: http_client(&config.user_agent)?,
            handle,
            filter: ReleaseFilter::new(config.show_prereleases),
            releases: Vec::new(),
            filtered: Vec::new(),
            entries: Vec::new(),
            selected: None,
            task: None,
            progress: None,
            last_error: None,
            children: Vec::new(),
        })
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Labels of the version list, in display order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn show_prereleases(&self) -> bool {
        self.filter.show_prereleases
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    pub fn selected_release(&self) -> Option<&Release> {
        let idx = *self.filtered.get(self.selected?)?;
        self.releases.get(idx)
    }

    fn selected_installed(&self) -> bool {
        self.selected_release()
            .map_or(false, |r| self.launcher.is_version_installed(&r.tag_name))
    }

    /// Buttons act on the selection and are locked during a request
    pub fn actions_enabled(&self) -> bool {
        !self.is_busy() && self.selected_release().is_some()
    }

    pub fn action_label(&self) -> &'static str {
        if self.selected_installed() {
            "Uninstall"
        } else {
            "Install"
        }
    }

    pub fn can_play(&self) -> bool {
        self.selected_installed()
    }

    pub fn fetch_versions(&mut self) {
        info!("fetching releases from {}", self.releases_url);
        let url = self.releases_url.clone();
        self.start_download(url, Pending::Listing);
    }

    pub fn on_refresh_clicked(&mut self) {
        self.fetch_versions();
    }

    pub fn set_show_prereleases(&mut self, show: bool) {
        if self.filter.show_prereleases != show {
            self.filter.show_prereleases = show;
            self.apply_filter();
        }
    }

    pub fn apply_filter(&mut self) {
        self.filtered = self.filter.apply(&self.releases);
        self.update_release_list();
    }

    /// Rebuild the version list and select its first entry
    pub fn update_release_list(&mut self) {
        self.entries = self
            .filtered
            .iter()
            .map(|&idx| {
                let tag = &self.releases[idx].tag_name;
                if self.launcher.is_version_installed(tag) {
                    format!("{} [installed]", tag)
                } else {
                    tag.clone()
                }
            })
            .collect();

        self.select(0);
    }

    /// Rebuild the version list but keep the current selection
    pub fn update_version_combobox(&mut self) {
        let selected = self.selected;
        self.update_release_list();
        if let Some(idx) = selected {
            self.select(idx);
        }
    }

    pub fn select(&mut self, idx: usize) {
        self.selected = if idx < self.entries.len() {
            Some(idx)
        } else {
            None
        };
    }

    /// Uninstall the selected version if present, otherwise start
    /// downloading its archive for this platform
    pub fn on_download_clicked(&mut self) {
        if let Err(err) = self.install_or_uninstall() {
            self.report(err);
        }
    }

    fn install_or_uninstall(&mut self) -> Result<()> {
        if self.is_busy() {
            return Ok(());
        }
        let release = match self.selected_release() {
            Some(release) => release.clone(),
            None => return Ok(()),
        };

        if self.launcher.is_version_installed(&release.tag_name) {
            self.launcher.uninstall(&release.tag_name)?;
            self.update_version_combobox();
        } else {
            let url = release
                .current_os_url()
                .ok_or_else(|| Error::NoAsset(release.tag_name.clone()))?
                .to_string();
            info!("installing {} from {}", release.tag_name, url);
            self.start_download(url, Pending::Install(release));
        }

        Ok(())
    }

    pub fn on_play_clicked(&mut self) {
        let tag = match self.selected_release() {
            Some(release) => release.tag_name.clone(),
            None => return,
        };

        match self.launcher.start_version(&tag) {
            Ok(child) => self.children.push(child),
            Err(err) => self.report(err),
        }
    }

    fn start_download(&mut self, url: String, pending: Pending) {
        if self.is_busy() {
            warn!("ignoring request for {}, another one is running", url);
            return;
        }

        self.last_error = None;
        self.progress = Some(Progress {
            value: 0,
            max: None,
        });
        let task = download_bytes(&self.handle, self.client.clone(), url);
        self.task = Some((pending, task));
    }

    /// Drain the running request. Call once per frame.
    pub fn poll(&mut self) {
        self.reap_children();

        loop {
            let message = match &mut self.task {
                Some((_, task)) => task.message(),
                None => return,
            };

            let outcome = match message {
                Ok(DlStatus::Progress(value, max)) => {
                    self.progress = Some(Progress { value, max });
                    continue;
                }
                Err(ThreadStatus::Waiting) => return,
                Ok(DlStatus::Finish(data)) => Ok(data),
                Ok(DlStatus::Error(msg)) => Err(Error::Other(msg)),
                Err(ThreadStatus::Closed) => Err(Error::from("download interrupted")),
            };

            if let Some((pending, _)) = self.task.take() {
                self.finish(pending, outcome);
            }
            return;
        }
    }

    fn finish(&mut self, pending: Pending, data: Result<Vec<u8>>) {
        let result = match pending {
            Pending::Listing => self.complete_listing(data),
            Pending::Install(release) => {
                data.and_then(|data| self.complete_install(&release, &data))
            }
        };

        self.progress = None;
        if let Err(err) = result {
            self.report(err);
        }
    }

    /// Any failed refresh, network or parse, empties the list
    fn complete_listing(&mut self, data: Result<Vec<u8>>) -> Result<()> {
        let result = data.and_then(|data| parse_releases(&data)).map(|releases| {
            info!("{} releases listed", releases.len());
            self.releases = releases;
        });
        if result.is_err() {
            self.releases.clear();
        }

        self.apply_filter();
        result
    }

    fn complete_install(&mut self, release: &Release, data: &[u8]) -> Result<()> {
        let progress = &mut self.progress;
        let result = self
            .launcher
            .install_from_bytes(&release.tag_name, data, |value, max| {
                *progress = Some(Progress {
                    value: value as u64,
                    max: Some(max as u64),
                });
            });

        self.update_version_combobox();
        result.map(|_| ())
    }

    fn reap_children(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                info!("game process {} exited with {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!("cannot query game process {}: {}", child.id(), err);
                false
            }
        });
    }

    fn report(&mut self, err: Error) {
        error!("{}", err);
        self.last_error = Some(err.to_string());
    }
}

#[cfg(test)]
mod test {
    use super::{Controller, Progress};
    use crate::{
        config::LauncherConfig,
        install::test::{archive, game_archive},
        native::current_platform,
        Launcher,
    };
    use mockito::{Server, ServerGuard};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::runtime::Handle;

    fn listing(base: &str) -> String {
        let assets = ["linux-x86_64", "windows-x86_64", "windows-x86"]
            .iter()
            .map(|prefix| {
                format!(
                    r#"{{"name": "{}.zip", "browser_download_url": "{}/download/{}.zip"}}"#,
                    prefix, base, prefix
                )
            })
            .collect::<Vec<_>>()
            .join(",");

        format!(
            r#"[
                {{"tag_name": "v0.4.0", "prerelease": true, "name": "Preview",
                  "published_at": "2023-04-02T10:00:00Z", "body": "notes", "assets": [{}]}},
                {{"tag_name": "v0.3.1", "prerelease": false, "name": "Stable", "assets": [{}]}}
            ]"#,
            assets, assets
        )
    }

    struct Fixture {
        server: ServerGuard,
        dir: TempDir,
        controller: Controller,
    }

    async fn fixture() -> Fixture {
        let server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = LauncherConfig {
            releases_url: format!("{}/releases", server.url()),
            user_agent: "styx-test".to_string(),
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let launcher = config.launcher().unwrap();
        let controller = Controller::new(&config, launcher, Handle::current()).unwrap();

        Fixture {
            server,
            dir,
            controller,
        }
    }

    async fn mock_listing(server: &mut ServerGuard) -> mockito::Mock {
        let body = listing(&server.url());
        server
            .mock("GET", "/releases")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    async fn settle(controller: &mut Controller) {
        for _ in 0..1000 {
            controller.poll();
            if !controller.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("request did not finish");
    }

    #[tokio::test]
    async fn listing_fills_the_version_list() {
        let mut fx = fixture().await;
        let _m = mock_listing(&mut fx.server).await;
        let launcher = Launcher::new("BeyondStyx".to_string(), fx.dir.path().to_path_buf());
        launcher
            .install_from_bytes("v0.3.1", &game_archive(&launcher), |_, _| {})
            .unwrap();

        assert!(!fx.controller.actions_enabled());
        fx.controller.fetch_versions();
        assert!(fx.controller.is_busy());
        assert!(!fx.controller.actions_enabled());
        settle(&mut fx.controller).await;

        assert_eq!(fx.controller.last_error(), None);
        assert_eq!(fx.controller.progress(), None);
        assert_eq!(
            fx.controller.entries(),
            &["v0.4.0".to_string(), "v0.3.1 [installed]".to_string()]
        );
        assert_eq!(fx.controller.selected_index(), Some(0));
        assert_eq!(fx.controller.action_label(), "Install");
        assert!(!fx.controller.can_play());
        assert!(fx.controller.actions_enabled());

        fx.controller.select(1);
        assert_eq!(fx.controller.selected_release().unwrap().name, "Stable");
        assert_eq!(fx.controller.action_label(), "Uninstall");
        assert!(fx.controller.can_play());

        fx.controller.select(5);
        assert_eq!(fx.controller.selected_index(), None);
        assert!(!fx.controller.actions_enabled());
    }

    #[tokio::test]
    async fn prerelease_toggle_filters_the_list() {
        let mut fx = fixture().await;
        let _m = mock_listing(&mut fx.server).await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;

        fx.controller.set_show_prereleases(false);
        assert_eq!(fx.controller.entries(), &["v0.3.1".to_string()]);
        assert_eq!(fx.controller.selected_release().unwrap().tag_name, "v0.3.1");
        assert_eq!(fx.controller.releases().len(), 2);

        fx.controller.set_show_prereleases(true);
        assert_eq!(fx.controller.entries().len(), 2);
    }

    #[tokio::test]
    async fn install_then_uninstall_selected_version() {
        if current_platform().is_none() {
            return;
        }

        let mut fx = fixture().await;
        let _m = mock_listing(&mut fx.server).await;
        let archive = game_archive(fx.controller.launcher());
        let _dl = fx
            .server
            .mock("GET", mockito::Matcher::Regex(r"^/download/.*\.zip$".to_string()))
            .with_status(200)
            .with_body(archive)
            .create_async()
            .await;

        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;
        fx.controller.select(1);

        fx.controller.on_download_clicked();
        assert!(fx.controller.is_busy());
        settle(&mut fx.controller).await;

        assert_eq!(fx.controller.last_error(), None);
        assert!(fx.controller.launcher().is_version_installed("v0.3.1"));
        assert_eq!(fx.controller.selected_index(), Some(1));
        assert_eq!(fx.controller.entries()[1], "v0.3.1 [installed]");
        assert_eq!(fx.controller.action_label(), "Uninstall");
        assert!(fx.controller.can_play());

        fx.controller.on_download_clicked();
        assert!(!fx.controller.is_busy());
        assert!(!fx.dir.path().join("v0.3.1").exists());
        assert_eq!(fx.controller.entries()[1], "v0.3.1");
        assert_eq!(fx.controller.selected_index(), Some(1));
        assert_eq!(fx.controller.action_label(), "Install");
    }

    #[tokio::test]
    async fn failed_listing_clears_the_list() {
        let mut fx = fixture().await;
        let first = mock_listing(&mut fx.server).await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;
        assert_eq!(fx.controller.entries().len(), 2);
        first.remove_async().await;

        let _m = fx
            .server
            .mock("GET", "/releases")
            .with_status(500)
            .create_async()
            .await;
        fx.controller.on_refresh_clicked();
        settle(&mut fx.controller).await;

        assert!(fx.controller.last_error().is_some());
        assert!(fx.controller.releases().is_empty());
        assert!(fx.controller.entries().is_empty());
        assert_eq!(fx.controller.selected_index(), None);
    }

    #[tokio::test]
    async fn release_without_platform_archive_is_reported() {
        let mut fx = fixture().await;
        let _m = fx
            .server
            .mock("GET", "/releases")
            .with_status(200)
            .with_body(r#"[{"tag_name": "v0.2.0", "prerelease": false, "assets": []}]"#)
            .create_async()
            .await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;

        fx.controller.select(0);
        fx.controller.on_download_clicked();

        let err = fx.controller.last_error().unwrap();
        assert!(err.contains("no download for this platform"), "{}", err);
        assert!(!fx.controller.is_busy());
        assert!(fx.controller.actions_enabled());
        assert_eq!(fx.controller.progress(), None);
    }

    #[tokio::test]
    async fn failed_archive_download_leaves_version_uninstalled() {
        if current_platform().is_none() {
            return;
        }

        let mut fx = fixture().await;
        let _m = mock_listing(&mut fx.server).await;
        let _dl = fx
            .server
            .mock("GET", mockito::Matcher::Regex(r"^/download/.*\.zip$".to_string()))
            .with_status(404)
            .create_async()
            .await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;

        fx.controller.on_download_clicked();
        assert!(fx.controller.is_busy());
        settle(&mut fx.controller).await;

        assert!(fx.controller.last_error().is_some());
        assert_eq!(fx.controller.progress(), None);
        assert!(!fx.controller.is_busy());
        assert!(fx.controller.actions_enabled());
        assert_eq!(fx.controller.action_label(), "Install");
        assert!(!fx.controller.launcher().is_version_installed("v0.4.0"));
    }

    #[tokio::test]
    async fn archive_without_executable_is_reported() {
        if current_platform().is_none() {
            return;
        }

        let mut fx = fixture().await;
        let _m = mock_listing(&mut fx.server).await;
        let _dl = fx
            .server
            .mock("GET", mockito::Matcher::Regex(r"^/download/.*\.zip$".to_string()))
            .with_status(200)
            .with_body(archive(&[("readme.txt", "nothing to run")]))
            .create_async()
            .await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;

        fx.controller.on_download_clicked();
        settle(&mut fx.controller).await;

        let err = fx.controller.last_error().unwrap();
        assert!(err.contains("archive did not contain"), "{}", err);
        assert_eq!(fx.controller.action_label(), "Install");
        assert!(!fx.controller.can_play());
        assert_eq!(fx.controller.selected_index(), Some(0));
    }

    #[tokio::test]
    async fn malformed_listing_clears_the_list() {
        let mut fx = fixture().await;
        let first = mock_listing(&mut fx.server).await;
        fx.controller.fetch_versions();
        settle(&mut fx.controller).await;
        assert_eq!(fx.controller.entries().len(), 2);
        first.remove_async().await;

        let _m = fx
            .server
            .mock("GET", "/releases")
            .with_status(200)
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;
        fx.controller.on_refresh_clicked();
        settle(&mut fx.controller).await;

        assert!(fx.controller.last_error().is_some());
        assert!(fx.controller.releases().is_empty());
        assert!(fx.controller.entries().is_empty());
    }

    #[tokio::test]
    async fn buttons_without_selection_do_nothing() {
        let mut fx = fixture().await;
        fx.controller.on_download_clicked();
        fx.controller.on_play_clicked();

        assert!(!fx.controller.is_busy());
        assert_eq!(fx.controller.last_error(), None);
    }

    #[test]
    fn progress_fraction() {
        let half = Progress {
            value: 50,
            max: Some(100),
        };
        assert_eq!(half.fraction(), Some(0.5));
        assert_eq!(Progress { value: 3, max: None }.fraction(), None);
        assert_eq!(
            Progress {
                value: 3,
                max: Some(0)
            }
            .fraction(),
            None
        );
    }
}
