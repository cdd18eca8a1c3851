//! The three export modes.
//!
//! Each run produces an [`ExportReport`]: an ordered list of events plus the
//! error that aborted the run, if any. Nothing is printed here; see
//! [`super::report`] for presentation.

use super::{
    client::FigmaApi,
    error::{ExportError, Missing},
    types::resolve_image_url,
};
use crate::{
    cli::ExportArgs,
    config::{FigmaConfig, is_plain_file_name},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File the hero-only modes write to.
pub const HERO_BANNER_FILE: &str = "hero-banner.png";

/// Depth of the hero subtree searched for an image fill.
const RAW_IMAGE_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Render every configured node
    Bulk,
    /// Render the bottom layer of the hero banner only
    HeroBackground,
    /// Download the original image behind the hero's image fill
    HeroRawImage,
}

impl ExportMode {
    pub fn from_args(args: &ExportArgs) -> Self {
        if args.hero_raw_image {
            Self::HeroRawImage
        } else if args.hero_background_only {
            Self::HeroBackground
        } else {
            Self::Bulk
        }
    }
}

/// How a saved file was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedKind {
    Rendered,
    BackgroundOnly,
    RawImage,
}

#[derive(Debug)]
pub enum ExportEvent {
    /// The API set its `err` field
    ApiWarning(String),
    /// A node came back without a download URL
    Skipped(String),
    /// Exporting the background layer found under the hero banner
    Exporting(String),
    Saved { path: PathBuf, kind: SavedKind },
    DownloadFailed {
        file: String,
        error: ExportError,
    },
    /// Raw image unavailable, falling back to the rendered background
    FallbackToBackground,
}

/// Outcome of one export run.
#[derive(Debug)]
pub struct ExportReport {
    pub mode: ExportMode,
    pub images_dir: PathBuf,
    pub events: Vec<ExportEvent>,
    /// Error that stopped the run early.
    pub aborted: Option<ExportError>,
}

impl ExportReport {
    pub fn new(mode: ExportMode, images_dir: PathBuf) -> Self {
        Self {
            mode,
            images_dir,
            events: Vec::new(),
            aborted: None,
        }
    }

    /// Report for a run stopped before it began.
    pub fn not_started(mode: ExportMode, images_dir: PathBuf, error: ExportError) -> Self {
        Self {
            aborted: Some(error),
            ..Self::new(mode, images_dir)
        }
    }

    pub fn saved(&self) -> impl Iterator<Item = &Path> {
        self.events.iter().filter_map(|event| match event {
            ExportEvent::Saved { path, .. } => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ExportError)> {
        self.events.iter().filter_map(|event| match event {
            ExportEvent::DownloadFailed { file, error } => Some((file.as_str(), error)),
            _ => None,
        })
    }

    /// No abort and no failed download.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failures().next().is_none()
    }
}

/// Runs an export mode against a [`FigmaApi`].
pub struct Exporter<'a, A: FigmaApi> {
    api: &'a A,
    figma: &'a FigmaConfig,
    images_dir: PathBuf,
}

impl<'a, A: FigmaApi> Exporter<'a, A> {
    pub fn new(api: &'a A, figma: &'a FigmaConfig, images_dir: PathBuf) -> Self {
        Self {
            api,
            figma,
            images_dir,
        }
    }

    /// Create the image directory, then run `mode`.
    pub fn run(&self, mode: ExportMode) -> ExportReport {
        let mut report = ExportReport::new(mode, self.images_dir.clone());

        let result = fs::create_dir_all(&self.images_dir)
            .map_err(|err| ExportError::Io(self.images_dir.clone(), err))
            .and_then(|()| match mode {
                ExportMode::Bulk => self.export_bulk(&mut report),
                ExportMode::HeroBackground => self.export_hero_background(&mut report),
                ExportMode::HeroRawImage => self.export_hero_raw_image(&mut report),
            });

        report.aborted = result.err();
        report
    }

    /// Render all configured nodes in one request and download each.
    ///
    /// A failed download is recorded and the loop goes on.
    fn export_bulk(&self, report: &mut ExportReport) -> Result<(), ExportError> {
        let response = self.api.render_images(&self.figma.node_ids())?;

        if let Some(err) = response.error() {
            report.events.push(ExportEvent::ApiWarning(err.to_owned()));
        }

        for (node_id, url) in response.images() {
            let Some(url) = url else {
                report.events.push(ExportEvent::Skipped(node_id.to_owned()));
                continue;
            };

            let file = self.figma.output_name(node_id);
            if !is_plain_file_name(&file) {
                let error = ExportError::UnsafeOutput(file.clone());
                report.events.push(ExportEvent::DownloadFailed { file, error });
                continue;
            }

            let path = self.images_dir.join(&file);
            let event = match self.api.download(url, &path) {
                Ok(_) => ExportEvent::Saved {
                    path,
                    kind: SavedKind::Rendered,
                },
                Err(error) => ExportEvent::DownloadFailed { file, error },
            };
            report.events.push(event);
        }

        Ok(())
    }

    /// Render only the first child of the hero banner.
    fn export_hero_background(&self, report: &mut ExportReport) -> Result<(), ExportError> {
        let background = self.find_background_child()?;
        report.events.push(ExportEvent::Exporting(background.clone()));

        let response = self.api.render_images(&[background.as_str()])?;
        let url = response
            .url_for(&background)
            .ok_or_else(|| ExportError::NotFound(Missing::RenderUrl(background.clone())))?;

        self.save_hero(report, url, SavedKind::BackgroundOnly)
    }

    /// Download the raw image behind the hero's first image fill, falling
    /// back to the rendered background when no URL can be resolved.
    fn export_hero_raw_image(&self, report: &mut ExportReport) -> Result<(), ExportError> {
        let hero = &self.figma.hero_banner_node;
        let nodes = self.api.file_nodes(hero, RAW_IMAGE_DEPTH)?;
        let document = nodes
            .entry(hero)
            .ok_or(ExportError::NotFound(Missing::HeroNode))?
            .document
            .as_ref()
            .ok_or(ExportError::NotFound(Missing::HeroDocument))?;
        let image_ref = document
            .find_image_ref()
            .ok_or(ExportError::NotFound(Missing::ImageFill))?;

        let fills = self.api.image_fills()?.into_map();
        match resolve_image_url(&fills, image_ref) {
            Some(url) => self.save_hero(report, url, SavedKind::RawImage),
            None => {
                report.events.push(ExportEvent::FallbackToBackground);
                self.export_hero_background(report)
            }
        }
    }

    /// First direct child of the hero banner, the bottom layer in Figma.
    fn find_background_child(&self) -> Result<String, ExportError> {
        let hero = &self.figma.hero_banner_node;
        let nodes = self.api.file_nodes(hero, 1)?;
        let document = nodes
            .entry(hero)
            .ok_or(ExportError::NotFound(Missing::HeroNode))?
            .document
            .as_ref()
            .ok_or(ExportError::NotFound(Missing::HeroDocument))?;

        document
            .children()
            .first()
            .and_then(|child| child.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(ExportError::NotFound(Missing::BackgroundLayer))
    }

    fn save_hero(
        &self,
        report: &mut ExportReport,
        url: &str,
        kind: SavedKind,
    ) -> Result<(), ExportError> {
        let path = self.images_dir.join(HERO_BANNER_FILE);
        self.api.download(url, &path)?;
        report.events.push(ExportEvent::Saved { path, kind });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figma::{
        error::Stage,
        types::{ImageFillsResponse, ImagesResponse, NodesResponse},
    };
    use std::{cell::RefCell, collections::VecDeque};

    /// Scripted API: JSON bodies are served in order and every call is logged.
    #[derive(Default)]
    struct FakeApi {
        images: RefCell<VecDeque<&'static str>>,
        nodes: Option<&'static str>,
        fills: Option<&'static str>,
        forbidden: Option<Stage>,
        failing_urls: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn check(&self, stage: Stage) -> Result<(), ExportError> {
            if self.forbidden == Some(stage) {
                return Err(ExportError::Http {
                    stage,
                    status: 403,
                    reason: "Forbidden".into(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl FigmaApi for FakeApi {
        fn render_images(&self, ids: &[&str]) -> Result<ImagesResponse, ExportError> {
            self.calls.borrow_mut().push(format!("images {}", ids.join(",")));
            self.check(Stage::RenderImages)?;
            let body = self.images.borrow_mut().pop_front().unwrap_or("{}");
            Ok(serde_json::from_str(body).unwrap())
        }

        fn file_nodes(&self, id: &str, depth: u32) -> Result<NodesResponse, ExportError> {
            self.calls.borrow_mut().push(format!("nodes {id} {depth}"));
            self.check(Stage::FileNodes)?;
            Ok(serde_json::from_str(self.nodes.unwrap_or("{}")).unwrap())
        }

        fn image_fills(&self) -> Result<ImageFillsResponse, ExportError> {
            self.calls.borrow_mut().push("fills".into());
            self.check(Stage::ImageFills)?;
            Ok(serde_json::from_str(self.fills.unwrap_or("{}")).unwrap())
        }

        fn download(&self, url: &str, dest: &Path) -> Result<u64, ExportError> {
            self.calls.borrow_mut().push(format!("download {url}"));
            if self.failing_urls.iter().any(|failing| *failing == url) {
                return Err(ExportError::Transport {
                    stage: Stage::Download,
                    message: "connection reset".into(),
                });
            }
            fs::write(dest, url).map_err(|err| ExportError::Io(dest.to_path_buf(), err))?;
            Ok(url.len() as u64)
        }
    }

    const HERO_CHILDREN: &str =
        r#"{"nodes":{"49:136":{"document":{"id":"49:136","children":[{"id":"1:1"},{"id":"1:2"}]}}}}"#;

    fn run(api: &FakeApi, mode: ExportMode) -> (tempfile::TempDir, ExportReport) {
        let dir = tempfile::tempdir().unwrap();
        let figma = FigmaConfig::default();
        let images_dir = dir.path().join("yoga/static/yoga/images");
        let report = Exporter::new(api, &figma, images_dir).run(mode);
        (dir, report)
    }

    #[test]
    fn test_mode_from_args() {
        let mut args = ExportArgs::default();
        assert_eq!(ExportMode::from_args(&args), ExportMode::Bulk);
        args.hero_background_only = true;
        assert_eq!(ExportMode::from_args(&args), ExportMode::HeroBackground);
        args.hero_background_only = false;
        args.hero_raw_image = true;
        assert_eq!(ExportMode::from_args(&args), ExportMode::HeroRawImage);
    }

    #[test]
    fn test_bulk_skips_null_urls() {
        let api = FakeApi {
            images: RefCell::new(
                [r#"{"images":{"49:133":"http://x/a.png","49:134":null}}"#].into(),
            ),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::Bulk);

        assert!(report.is_success());
        let saved: Vec<_> = report.saved().collect();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].ends_with("yoga/images/header.png"));
        assert_eq!(fs::read_to_string(saved[0]).unwrap(), "http://x/a.png");
        assert!(matches!(
            report.events.last(),
            Some(ExportEvent::Skipped(node)) if node == "49:134"
        ));
        assert_eq!(
            api.calls(),
            vec!["images 49:133,49:134,49:136", "download http://x/a.png"]
        );
    }

    #[test]
    fn test_bulk_continues_past_failed_download() {
        let api = FakeApi {
            images: RefCell::new(
                [r#"{"images":{"49:133":"http://x/a.png","49:134":"http://x/b.png","7:7":"http://x/c.png"}}"#]
                    .into(),
            ),
            failing_urls: vec!["http://x/a.png"],
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::Bulk);

        assert!(report.aborted.is_none());
        assert!(!report.is_success());
        let failures: Vec<_> = report.failures().map(|(file, _)| file).collect();
        assert_eq!(failures, vec!["header.png"]);

        let saved: Vec<_> = report
            .saved()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(saved, vec!["logo.png", "7-7.png"]);
    }

    #[test]
    fn test_bulk_refuses_ids_escaping_images_dir() {
        let api = FakeApi {
            images: RefCell::new(
                [r#"{"images":{"../../evil":"http://x/e.png","a/b":"http://x/f.png","49:134":"http://x/b.png"}}"#]
                    .into(),
            ),
            ..FakeApi::default()
        };
        let (dir, report) = run(&api, ExportMode::Bulk);

        let failures: Vec<_> = report.failures().map(|(file, _)| file).collect();
        assert_eq!(failures, vec!["../../evil.png", "a/b.png"]);
        assert!(matches!(
            report.failures().next(),
            Some((_, ExportError::UnsafeOutput(_)))
        ));
        assert_eq!(api.calls(), vec!["images 49:133,49:134,49:136", "download http://x/b.png"]);
        assert!(!dir.path().join("yoga/static/evil.png").exists());
        assert_eq!(report.saved().count(), 1);
    }

    #[test]
    fn test_bulk_records_api_err() {
        let api = FakeApi {
            images: RefCell::new([r#"{"images":{},"err":"Invalid node ids"}"#].into()),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::Bulk);

        assert!(matches!(
            report.events.as_slice(),
            [ExportEvent::ApiWarning(err)] if err == "Invalid node ids"
        ));
    }

    #[test]
    fn test_bulk_http_error_aborts() {
        let api = FakeApi {
            forbidden: Some(Stage::RenderImages),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::Bulk);

        let err = report.aborted.as_ref().unwrap();
        assert!(err.hint().is_some());
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_background_uses_first_child() {
        let api = FakeApi {
            nodes: Some(HERO_CHILDREN),
            images: RefCell::new([r#"{"images":{"1:1":"http://x/bg.png"}}"#].into()),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroBackground);

        assert!(report.is_success());
        assert_eq!(
            api.calls(),
            vec!["nodes 49:136 1", "images 1:1", "download http://x/bg.png"]
        );
        let saved: Vec<_> = report.saved().collect();
        assert!(saved[0].ends_with(HERO_BANNER_FILE));
    }

    #[test]
    fn test_background_without_children() {
        let api = FakeApi {
            nodes: Some(r#"{"nodes":{"49:136":{"document":{"children":[]}}}}"#),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroBackground);

        assert!(matches!(
            report.aborted,
            Some(ExportError::NotFound(Missing::BackgroundLayer))
        ));
        assert_eq!(api.calls(), vec!["nodes 49:136 1"]);
    }

    #[test]
    fn test_background_missing_nodes_and_document() {
        let api = FakeApi::default();
        let (_dir, report) = run(&api, ExportMode::HeroBackground);
        assert!(matches!(
            report.aborted,
            Some(ExportError::NotFound(Missing::HeroNode))
        ));

        let api = FakeApi {
            nodes: Some(r#"{"nodes":{"49:136":{}}}"#),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroBackground);
        assert!(matches!(
            report.aborted,
            Some(ExportError::NotFound(Missing::HeroDocument))
        ));
    }

    #[test]
    fn test_background_not_renderable() {
        let api = FakeApi {
            nodes: Some(HERO_CHILDREN),
            images: RefCell::new([r#"{"images":{"1:1":null}}"#].into()),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroBackground);

        let err = report.aborted.as_ref().unwrap();
        assert!(err.to_string().contains("Node may not be renderable"));
        assert_eq!(report.saved().count(), 0);
    }

    #[test]
    fn test_raw_image_resolves_first_ref_by_prefix() {
        let api = FakeApi {
            nodes: Some(
                r#"{"nodes":{"49:136":{"document":{"children":[
                    {"id":"1:1","children":[{"id":"1:5","fills":[{"type":"IMAGE","imageRef":"abc"}]}]},
                    {"id":"1:2","fills":[{"imageRef":"zzz"}]}
                ]}}}}"#,
            ),
            fills: Some(r#"{"images":{"abc123":"http://x/raw.png","zzz":"http://x/other.png"}}"#),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroRawImage);

        assert!(report.is_success());
        assert_eq!(
            api.calls(),
            vec!["nodes 49:136 4", "fills", "download http://x/raw.png"]
        );
        assert!(matches!(
            report.events.as_slice(),
            [ExportEvent::Saved { kind: SavedKind::RawImage, .. }]
        ));
    }

    #[test]
    fn test_raw_image_without_fill() {
        let api = FakeApi {
            nodes: Some(r#"{"nodes":{"49:136":{"document":{"children":[{"id":"1:1"}]}}}}"#),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroRawImage);

        let err = report.aborted.as_ref().unwrap();
        assert!(err.to_string().contains("--hero-background-only"));
        assert_eq!(api.calls(), vec!["nodes 49:136 4"]);
    }

    #[test]
    fn test_raw_image_falls_back_to_background() {
        let api = FakeApi {
            nodes: Some(
                r#"{"nodes":{"49:136":{"document":{"children":[
                    {"id":"1:1","fills":[{"imageRef":"abc"}]},
                    {"id":"1:2"}
                ]}}}}"#,
            ),
            fills: Some(r#"{"images":{"x1":"http://x/1.png","y2":"http://x/2.png"}}"#),
            images: RefCell::new([r#"{"images":{"1:1":"http://x/bg.png"}}"#].into()),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroRawImage);

        assert!(report.is_success());
        assert!(matches!(report.events[0], ExportEvent::FallbackToBackground));
        assert_eq!(
            api.calls(),
            vec![
                "nodes 49:136 4",
                "fills",
                "nodes 49:136 1",
                "images 1:1",
                "download http://x/bg.png"
            ]
        );
    }

    #[test]
    fn test_raw_image_fills_error() {
        let api = FakeApi {
            nodes: Some(r#"{"nodes":{"49:136":{"document":{"fills":[{"imageRef":"abc"}]}}}}"#),
            forbidden: Some(Stage::ImageFills),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroRawImage);

        assert_eq!(
            report.aborted.as_ref().unwrap().to_string(),
            "Image fills API error: 403 Forbidden"
        );
    }

    #[test]
    fn test_creates_directory_before_requests() {
        let api = FakeApi {
            forbidden: Some(Stage::FileNodes),
            ..FakeApi::default()
        };
        let (_dir, report) = run(&api, ExportMode::HeroBackground);

        assert!(report.aborted.is_some());
        assert!(report.images_dir.is_dir());
    }

    #[test]
    fn test_rerun_overwrites_same_files() {
        let body = r#"{"images":{"49:133":"http://x/a.png","49:134":"http://x/b.png"}}"#;
        let api = FakeApi {
            images: RefCell::new([body, body].into()),
            ..FakeApi::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let figma = FigmaConfig::default();
        let exporter = Exporter::new(&api, &figma, dir.path().to_path_buf());

        let first = exporter.run(ExportMode::Bulk);
        let first_bytes = fs::read(dir.path().join("logo.png")).unwrap();
        let second = exporter.run(ExportMode::Bulk);
        let second_bytes = fs::read(dir.path().join("logo.png")).unwrap();

        assert_eq!(
            first.saved().collect::<Vec<_>>(),
            second.saved().collect::<Vec<_>>()
        );
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
