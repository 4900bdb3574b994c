//! egui front-end over the [`Controller`].

use crate::{config::LauncherConfig, controller::Controller};
use eframe::egui;
use log::warn;
use std::path::PathBuf;

pub const WINDOW_TITLE: &str = "Beyond Styx Launcher";

pub struct LauncherApp {
    controller: Controller,

    /// Settings file the prerelease checkbox is saved to
    config_path: Option<PathBuf>,
}

impl LauncherApp {
    /// Window creation also kicks off the first listing refresh
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        mut controller: Controller,
        config_path: Option<PathBuf>,
    ) -> Self {
        controller.fetch_versions();
        Self {
            controller,
            config_path,
        }
    }

    fn set_show_prereleases(&mut self, show: bool) {
        self.controller.set_show_prereleases(show);

        if let Some(path) = &self.config_path {
            let saved = LauncherConfig::update_file(path, |c| c.show_prereleases = show);
            if let Err(err) = saved {
                warn!("cannot save {}: {}", path.display(), err);
            }
        }
    }

    fn version_row(&mut self, ui: &mut egui::Ui) {
        let entries = self.controller.entries().to_vec();
        let current = self.controller.selected_index();
        let mut picked = current;

        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.controller.is_busy(), |ui| {
                let selected_text = current
                    .and_then(|i| entries.get(i))
                    .cloned()
                    .unwrap_or_default();

                egui::ComboBox::from_label("Version")
                    .selected_text(selected_text)
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for (i, entry) in entries.iter().enumerate() {
                            ui.selectable_value(&mut picked, Some(i), entry.as_str());
                        }
                    });

                let mut show = self.controller.show_prereleases();
                if ui.checkbox(&mut show, "Show prereleases").changed() {
                    self.set_show_prereleases(show);
                }
            });
        });

        if picked != current {
            if let Some(idx) = picked {
                self.controller.select(idx);
            }
        }
    }

    fn button_row(&mut self, ui: &mut egui::Ui) {
        let enabled = self.controller.actions_enabled();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.controller.is_busy(), egui::Button::new("Refresh"))
                .clicked()
            {
                self.controller.on_refresh_clicked();
            }

            let label = self.controller.action_label();
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                self.controller.on_download_clicked();
            }

            if self.controller.can_play()
                && ui.add_enabled(enabled, egui::Button::new("Play")).clicked()
            {
                self.controller.on_play_clicked();
            }
        });
    }

    fn details(&self, ui: &mut egui::Ui) {
        let release = match self.controller.selected_release() {
            Some(release) => release,
            None => return,
        };

        ui.separator();
        let title = if release.name.is_empty() {
            &release.tag_name
        } else {
            &release.name
        };
        ui.heading(title.as_str());
        if release.is_prerelease {
            ui.label(egui::RichText::new("prerelease").italics());
        }
        if !release.published_at.is_empty() {
            ui.label(format!("Published {}", release.published_at));
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(release.body.as_str());
            });
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some(progress) = self.controller.progress() {
                let bar = match progress.fraction() {
                    Some(fraction) => egui::ProgressBar::new(fraction).show_percentage(),
                    None => egui::ProgressBar::new(0.0).animate(true),
                };
                ui.add(bar);
            }
            if let Some(err) = self.controller.last_error() {
                ui.colored_label(egui::Color32::RED, err);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.version_row(ui);
            self.button_row(ui);
            self.details(ui);
        });

        if self.controller.is_busy() {
            ctx.request_repaint();
        }
    }
}
