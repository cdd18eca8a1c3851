//! Figma REST API client.
//!
//! [`FigmaApi`] is the seam between the export routine and the network;
//! [`HttpClient`] is the blocking `reqwest` implementation.

use super::{
    error::{ExportError, Stage},
    types::{ImageFillsResponse, ImagesResponse, NodesResponse},
};
use crate::config::FigmaConfig;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::{fs::File, path::Path};

/// Header carrying the personal access token.
const TOKEN_HEADER: &str = "X-Figma-Token";

/// Calls the export routine makes against Figma.
pub trait FigmaApi {
    /// Render nodes as PNG and return their temporary download URLs.
    fn render_images(&self, ids: &[&str]) -> Result<ImagesResponse, ExportError>;

    /// Fetch a node subtree down to `depth` levels.
    fn file_nodes(&self, id: &str, depth: u32) -> Result<NodesResponse, ExportError>;

    /// Fetch the file's image reference to URL mapping.
    fn image_fills(&self) -> Result<ImageFillsResponse, ExportError>;

    /// Download `url` into `dest`, overwriting it. Returns the bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ExportError>;
}

/// Blocking HTTP implementation of [`FigmaApi`].
pub struct HttpClient {
    http: Client,
    api_base: String,
    file_key: String,
    token: String,
}

impl HttpClient {
    pub fn new(figma: &FigmaConfig, token: String) -> Result<Self, ExportError> {
        let http = Client::builder()
            .user_agent(concat!("yoga/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ExportError::transport(Stage::Client, &err))?;

        Ok(Self {
            http,
            api_base: figma.api_base.trim_end_matches('/').to_owned(),
            file_key: figma.file_key.clone(),
            token,
        })
    }

    fn images_url(&self, ids: &[&str]) -> String {
        let ids = ids
            .iter()
            .map(|id| urlencoding::encode(id))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/images/{}?ids={ids}&format=png",
            self.api_base, self.file_key
        )
    }

    fn nodes_url(&self, id: &str, depth: u32) -> String {
        format!(
            "{}/files/{}/nodes?ids={}&depth={depth}",
            self.api_base,
            self.file_key,
            urlencoding::encode(id)
        )
    }

    fn fills_url(&self) -> String {
        format!("{}/files/{}/images", self.api_base, self.file_key)
    }

    /// GET an API endpoint with the token header and decode the JSON body.
    fn get_json<T: DeserializeOwned>(&self, stage: Stage, url: &str) -> Result<T, ExportError> {
        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|err| ExportError::transport(stage, &err))?;
        let body = check_status(stage, response)?
            .bytes()
            .map_err(|err| ExportError::transport(stage, &err))?;

        serde_json::from_slice(&body).map_err(|err| ExportError::Decode {
            stage,
            message: err.to_string(),
        })
    }
}

impl FigmaApi for HttpClient {
    fn render_images(&self, ids: &[&str]) -> Result<ImagesResponse, ExportError> {
        self.get_json(Stage::RenderImages, &self.images_url(ids))
    }

    fn file_nodes(&self, id: &str, depth: u32) -> Result<NodesResponse, ExportError> {
        self.get_json(Stage::FileNodes, &self.nodes_url(id, depth))
    }

    fn image_fills(&self) -> Result<ImageFillsResponse, ExportError> {
        self.get_json(Stage::ImageFills, &self.fills_url())
    }

    // Download URLs are pre-signed and live on another host, so the token
    // is not sent along.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, ExportError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|err| ExportError::transport(Stage::Download, &err))?;
        let mut response = check_status(Stage::Download, response)?;

        let mut file =
            File::create(dest).map_err(|err| ExportError::Io(dest.to_path_buf(), err))?;
        response
            .copy_to(&mut file)
            .map_err(|err| ExportError::transport(Stage::Download, &err))
    }
}

fn check_status(stage: Stage, response: Response) -> Result<Response, ExportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ExportError::Http {
        stage,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, thread};
    use tiny_http::{Response as HttpResponse, Server};

    type Seen = Vec<(String, Option<String>)>;

    /// Serve the given responses in order, recording URL and token header.
    fn spawn_server(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let request = server.recv().unwrap();
                let token = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv(TOKEN_HEADER))
                    .map(|h| h.value.as_str().to_owned());
                seen.push((request.url().to_owned(), token));
                request
                    .respond(HttpResponse::from_string(body).with_status_code(status))
                    .unwrap();
            }
            seen
        });
        (format!("http://{addr}"), handle)
    }

    fn client(base: &str) -> HttpClient {
        let figma = FigmaConfig {
            api_base: format!("{base}/v1/"),
            file_key: "KEY".into(),
            ..FigmaConfig::default()
        };
        HttpClient::new(&figma, "secret".into()).unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client("https://api.figma.com");

        assert_eq!(
            client.images_url(&["49:133", "49:134"]),
            "https://api.figma.com/v1/images/KEY?ids=49%3A133,49%3A134&format=png"
        );
        assert_eq!(
            client.nodes_url("49:136", 4),
            "https://api.figma.com/v1/files/KEY/nodes?ids=49%3A136&depth=4"
        );
        assert_eq!(client.fills_url(), "https://api.figma.com/v1/files/KEY/images");
    }

    #[test]
    fn test_render_images_sends_token() {
        let (base, server) =
            spawn_server(vec![(200, r#"{"images":{"49:133":"http://x/a.png"}}"#)]);
        let response = client(&base).render_images(&["49:133"]).unwrap();

        assert_eq!(response.url_for("49:133"), Some("http://x/a.png"));
        let seen = server.join().unwrap();
        assert_eq!(seen[0].0, "/v1/images/KEY?ids=49%3A133&format=png");
        assert_eq!(seen[0].1.as_deref(), Some("secret"));
    }

    #[test]
    fn test_forbidden_maps_to_http_error() {
        let (base, server) = spawn_server(vec![(403, r#"{"status":403,"err":"Invalid token"}"#)]);
        let err = client(&base).file_nodes("49:136", 1).unwrap_err();

        assert!(matches!(
            err,
            ExportError::Http {
                stage: Stage::FileNodes,
                status: 403,
                ..
            }
        ));
        assert!(err.hint().is_some());
        server.join().unwrap();
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let (base, server) = spawn_server(vec![(200, "<html>")]);
        let err = client(&base).image_fills().unwrap_err();

        assert!(matches!(err, ExportError::Decode { stage: Stage::ImageFills, .. }));
        server.join().unwrap();
    }

    #[test]
    fn test_download_overwrites_without_token() {
        let (base, server) = spawn_server(vec![(200, "PNGDATA")]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("header.png");
        fs::write(&dest, "old content that is longer").unwrap();

        let written = client(&base)
            .download(&format!("{base}/render/a.png"), &dest)
            .unwrap();

        assert_eq!(written, 7);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "PNGDATA");
        let seen = server.join().unwrap();
        assert_eq!(seen[0].1, None);
    }

    #[test]
    fn test_download_error_leaves_no_new_file() {
        let (base, server) = spawn_server(vec![(404, "missing")]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("logo.png");

        let err = client(&base)
            .download(&format!("{base}/render/b.png"), &dest)
            .unwrap_err();

        assert!(matches!(err, ExportError::Http { status: 404, .. }));
        assert!(!dest.exists());
        server.join().unwrap();
    }
}
