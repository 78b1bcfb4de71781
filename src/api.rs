//! HTTP surface of the script tree, served with poem.
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::info;
use log::warn;
use poem::Body;
use poem::Endpoint;
use poem::EndpointExt;
use poem::FromRequest;
use poem::IntoResponse;
use poem::Request;
use poem::RequestBody;
use poem::Response;
use poem::Route;
use poem::Server;
use poem::endpoint::StaticFilesEndpoint;
use poem::error::ResponseError;
use poem::get;
use poem::handler;
use poem::http::StatusCode;
use poem::listener::TcpListener;
use poem::middleware::CatchPanic;
use poem::web::Data;
use poem::web::Form;
use poem::web::Json;
use poem::web::Multipart;
use poem::web::Query;
use serde::Deserialize;
use serde::Serialize;

use crate::Config;
use crate::DirectoryListing;
use crate::Error;
use crate::Resource;
use crate::ScriptFs;
use crate::ScriptPath;
use crate::errors::ErrorKind;
use crate::resource::API_ROOT;
use crate::resource::SCRIPTS_PREFIX;
use crate::resource::parse_resource_path;
use crate::resource::script_url;

/// Content type of raw script bodies.
pub const SCRIPT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Body of `GET /api/v1/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiInfo {
    /// Always `maiden`.
    pub api: String,
    /// Version of the serving crate.
    pub version: String,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            api: "maiden".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Body of a successful rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameResult {
    /// Resource url of the renamed entry.
    pub url: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human readable reason.
    pub error: String,
}

impl ResponseError for Error {
    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// The script routes are registered at the top level, never under `nest`, so
// the request uri still carries the full scripts prefix.
fn request_path(req: &Request) -> Result<ScriptPath, Error> {
    parse_resource_path(SCRIPTS_PREFIX, req.uri().path())
}

#[handler]
fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo::default())
}

#[handler]
async fn list_scripts(scripts: Data<&ScriptFs>) -> poem::Result<Json<DirectoryListing>> {
    Ok(Json(scripts.list(&ScriptPath::root()).await?))
}

#[handler]
async fn get_script(req: &Request, scripts: Data<&ScriptFs>) -> poem::Result<Response> {
    let path = request_path(req)?;
    match scripts.get(&path).await? {
        Resource::Directory(listing) => Ok(Json(listing).into_response()),
        Resource::File(file) => Ok(Response::builder()
            .content_type(SCRIPT_CONTENT_TYPE)
            .body(Body::from_async_read(file))),
    }
}

#[derive(Debug, Default, Deserialize)]
struct PutParams {
    kind: Option<String>,
}

#[handler]
async fn put_script(
    req: &Request,
    scripts: Data<&ScriptFs>,
    Query(params): Query<PutParams>,
    multipart: poem::Result<Multipart>,
) -> poem::Result<()> {
    let path = request_path(req)?;
    if params.kind.as_deref() == Some("directory") {
        scripts.make_dir(&path).await?;
        return Ok(());
    }

    let mut multipart =
        multipart.map_err(|e| Error::InvalidArgument(format!("missing value payload: {e}")))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidArgument(format!("malformed payload: {e}")))?
    {
        if field.name() == Some("value") {
            let mut contents = Box::pin(field.into_async_read());
            scripts.put(&path, &mut contents).await?;
            return Ok(());
        }
    }
    Err(Error::InvalidArgument("missing value payload".to_owned()).into())
}

#[derive(Debug, Deserialize)]
struct RenameForm {
    name: Option<String>,
}

/// The new leaf name of a rename, read from the `name` field of either a
/// urlencoded or a multipart form.
#[derive(Debug)]
struct RenameRequest {
    name: String,
}

impl<'a> FromRequest<'a> for RenameRequest {
    async fn from_request(req: &'a Request, body: &mut RequestBody) -> poem::Result<Self> {
        let is_multipart = req
            .content_type()
            .is_some_and(|ct| ct.starts_with("multipart/"));
        let name = if is_multipart {
            let mut multipart = Multipart::from_request(req, body).await?;
            let mut name = None;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| Error::InvalidArgument(format!("malformed form: {e}")))?
            {
                if field.name() == Some("name") {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| Error::InvalidArgument(format!("malformed form: {e}")))?;
                    name = Some(text);
                    break;
                }
            }
            name
        } else {
            let Form(form) = Form::<RenameForm>::from_request(req, body)
                .await
                .map_err(|e| Error::InvalidArgument(format!("malformed form: {e}")))?;
            form.name
        };
        let name = name.ok_or_else(|| Error::InvalidArgument("missing name".to_owned()))?;
        Ok(RenameRequest { name })
    }
}

#[handler]
async fn rename_script(
    req: &Request,
    scripts: Data<&ScriptFs>,
    rename: RenameRequest,
) -> poem::Result<Json<RenameResult>> {
    let path = request_path(req)?;
    let renamed = scripts.rename(&path, &rename.name).await?;
    Ok(Json(RenameResult {
        url: script_url(&renamed),
    }))
}

#[handler]
async fn delete_script(req: &Request, scripts: Data<&ScriptFs>) -> poem::Result<()> {
    let path = request_path(req)?;
    scripts.delete(&path).await?;
    Ok(())
}

async fn error_response(err: poem::Error) -> Response {
    (
        err.status(),
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

async fn log_request<E: Endpoint>(next: Arc<E>, req: Request) -> poem::Result<Response> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();
    let resp = next.get_response(req).await;
    info!("{} {} {} {:?}", resp.status().as_u16(), method, path, start.elapsed());
    Ok(resp)
}

/// Builds the application endpoint.
///
/// The API lives under `/api/v1`; when `site_dir` is given every other path
/// is served from it as static files.
pub fn build_app(scripts: ScriptFs, site_dir: Option<PathBuf>) -> impl Endpoint {
    let mut app = Route::new()
        .at(format!("{API_ROOT}/"), get(api_info))
        .at(SCRIPTS_PREFIX, get(list_scripts))
        .at(format!("{SCRIPTS_PREFIX}/"), get(list_scripts))
        .at(
            format!("{SCRIPTS_PREFIX}/*name"),
            get(get_script)
                .put(put_script)
                .patch(rename_script)
                .delete(delete_script),
        );
    if let Some(site_dir) = site_dir {
        app = app.nest(
            "/",
            StaticFilesEndpoint::new(site_dir).index_file("index.html"),
        );
    }
    app.data(scripts)
        .with(CatchPanic::new())
        .catch_all_error(error_response)
        .around(|ep, req| log_request(ep, req))
}

/// Serves the application described by `config` until the process is
/// stopped.
pub async fn serve(config: Config) -> io::Result<()> {
    let scripts = ScriptFs::new(config.scripts_dir());
    let site_dir = if config.site.is_dir() {
        Some(config.site.clone())
    } else {
        warn!("site directory {} not found, serving api only", config.site.display());
        None
    };
    let app = build_app(scripts, site_dir);
    Server::new(TcpListener::bind(config.listen_addr()))
        .run(app)
        .await
}
