#![warn(clippy::unwrap_used, clippy::expect_used)]

use crate::errors::http::HTTPError;
use crate::errors::logger::TracingMiddleware;
use crate::errors::reason::ReasonCode;
use crate::forms::{
    CollectionsForm, CreateStreamForm, EmbargoForm, FormData, FormErrors, LandingForm,
    ReorderForm, RightsForm, XmlForm,
};
use actix_cors::Cors;
use actix_server::Server;
use actix_web::{
    get, http::header, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use bdr_api::{DatastreamContent, FolderApi, ItemUpdate, ObjectInfo, StorageApi};
use bytes::Bytes;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Largest datastream accepted for upload
const UPLOAD_LIMIT: usize = 256 * 1024 * 1024;

const AUDIT_DSID: &str = "AUDIT";

/// Settings the handlers need from the service configuration
#[derive(Debug, Clone)]
pub struct EditorSettings {
    pub rights_choices: Vec<String>,
    pub xml_dsids: Vec<String>,
    pub library_parent_folder_id: String,
}

impl EditorSettings {
    fn is_xml(&self, dsid: &str) -> bool {
        self.xml_dsids.iter().any(|d| d == dsid)
    }

    /// The administrative identity, offered as the initial owner
    fn admin_identity(&self) -> Option<&str> {
        self.rights_choices.last().map(String::as_str)
    }
}

#[derive(Clone)]
pub struct RouteState {
    storage: Arc<dyn StorageApi>,
    folders: Arc<dyn FolderApi>,
    settings: Arc<EditorSettings>,
}

impl RouteState {
    pub fn new(
        storage: Arc<dyn StorageApi>,
        folders: Arc<dyn FolderApi>,
        settings: EditorSettings,
    ) -> Self {
        Self {
            storage,
            folders,
            settings: Arc::new(settings),
        }
    }

    async fn object(&self, pid: &str) -> Result<ObjectInfo, HTTPError> {
        self.storage
            .get_object(pid)
            .await?
            .ok_or_else(|| HTTPError::new(ReasonCode::ObjectNotFound, None))
    }

    async fn collection_choices(&self) -> Result<Vec<(String, String)>, HTTPError> {
        Ok(self
            .folders
            .get_folder(&self.settings.library_parent_folder_id)
            .await?
            .map(|folder| folder.subfolder_choices())
            .unwrap_or_default())
    }
}

fn see_object(pid: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            header::LOCATION,
            format!("/{}/", urlencoding::encode(pid)),
        ))
        .finish()
}

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(format!(
            "{{ \"server\": \"repo_direct\", \"version\": \"{}\" }}",
            env!("CARGO_PKG_VERSION")
        ))
}

#[tracing::instrument]
#[post("/")]
async fn landing(form: FormData) -> Result<HttpResponse, HTTPError> {
    let LandingForm { pid } = LandingForm::clean(&form)?;
    Ok(see_object(&pid))
}

#[get("/v0/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok()
}

#[derive(Serialize)]
struct ObjectResponse {
    object: ObjectInfo,
    collections_display: String,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/")]
async fn get_object(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<ObjectResponse>, HTTPError> {
    let object = state.object(&pid).await?;
    let collections_display = folders::decode_for_display(&object.collections);

    Ok(web::Json(ObjectResponse {
        object,
        collections_display,
    }))
}

#[derive(Serialize)]
struct RightsFormResponse {
    pid: String,
    choices: Vec<String>,
    owners: Vec<String>,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/edit/rights/")]
async fn get_rights_form(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<RightsFormResponse>, HTTPError> {
    let object = state.object(&pid).await?;

    Ok(web::Json(RightsFormResponse {
        pid: object.pid,
        choices: state.settings.rights_choices.clone(),
        owners: state
            .settings
            .admin_identity()
            .map(str::to_string)
            .into_iter()
            .collect(),
    }))
}

#[tracing::instrument(skip(state))]
#[post("/{pid}/edit/rights/")]
async fn edit_rights(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
    form: FormData,
) -> Result<HttpResponse, HTTPError> {
    let inputs = RightsForm::clean(&form, &state.settings.rights_choices)?;
    state.object(&pid).await?;

    let document = rights::build(&inputs);
    let update = ItemUpdate::rights(pid.as_str(), &document)?;
    state.storage.update_item(&update).await?;

    info!(pid = %pid, owners = inputs.owners.len(), "rights updated");
    Ok(see_object(&pid))
}

#[derive(Serialize)]
struct CollectionsFormResponse {
    pid: String,
    choices: Vec<(String, String)>,
    current: String,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/edit/collection/")]
async fn get_collections_form(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<CollectionsFormResponse>, HTTPError> {
    let object = state.object(&pid).await?;
    let choices = state.collection_choices().await?;

    Ok(web::Json(CollectionsFormResponse {
        current: folders::decode_for_display(&object.collections),
        pid: object.pid,
        choices,
    }))
}

#[tracing::instrument(skip(state))]
#[post("/{pid}/edit/collection/")]
async fn edit_collections(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
    form: FormData,
) -> Result<HttpResponse, HTTPError> {
    let choices = state.collection_choices().await?;
    let collections = CollectionsForm::clean(&form, &choices)?;
    state.object(&pid).await?;

    let update = ItemUpdate::collections(pid.as_str(), &collections);
    state.storage.update_item(&update).await?;

    info!(pid = %pid, collections = ?collections, "collections updated");
    Ok(see_object(&pid))
}

#[derive(Serialize)]
struct EmbargoResponse {
    pid: String,
    embargo_end_years: Vec<u16>,
    min_year: i32,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/edit/embargo/")]
async fn get_embargo_form(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<EmbargoResponse>, HTTPError> {
    let object = state.object(&pid).await?;

    Ok(web::Json(EmbargoResponse {
        pid: object.pid,
        embargo_end_years: object.embargo_end_years,
        min_year: current_year(),
    }))
}

#[tracing::instrument(skip(state))]
#[post("/{pid}/edit/embargo/")]
async fn edit_embargo(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
    form: FormData,
) -> Result<HttpResponse, HTTPError> {
    let end_year = EmbargoForm::clean(&form, current_year())?;
    state.object(&pid).await?;

    state
        .storage
        .update_item(&ItemUpdate::embargo(pid.as_str(), end_year))
        .await?;

    info!(pid = %pid, end_year, "embargo extended");
    Ok(see_object(&pid))
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

#[derive(Serialize)]
struct ReorderResponse {
    pid: String,
    children: Vec<String>,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/reorder/")]
async fn get_reorder_form(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<ReorderResponse>, HTTPError> {
    let object = state.object(&pid).await?;

    Ok(web::Json(ReorderResponse {
        pid: object.pid,
        children: object.children,
    }))
}

#[tracing::instrument(skip(state))]
#[post("/{pid}/reorder/")]
async fn reorder(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
    form: FormData,
) -> Result<HttpResponse, HTTPError> {
    let object = state.object(&pid).await?;
    let child_pids = ReorderForm::clean(&form, &object.children)?;

    state
        .storage
        .update_item(&ItemUpdate::child_order(pid.as_str(), &child_pids))
        .await?;

    info!(pid = %pid, children = child_pids.len(), "children reordered");
    Ok(see_object(&pid))
}

#[derive(Serialize)]
#[serde(untagged)]
enum DatastreamFormResponse {
    Xml {
        pid: String,
        dsid: String,
        xml_content: String,
    },
    File {
        pid: String,
        dsid: String,
        label: String,
        mimetype: String,
    },
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/{dsid}/edit/")]
async fn get_datastream_form(
    state: web::Data<RouteState>,
    path: web::Path<(String, String)>,
) -> Result<web::Json<DatastreamFormResponse>, HTTPError> {
    let (pid, dsid) = path.into_inner();
    let object = state.object(&pid).await?;

    if state.settings.is_xml(&dsid) {
        let xml_content = match state.storage.get_datastream(&pid, &dsid).await? {
            Some(content) => String::from_utf8_lossy(&content).into_owned(),
            None => "No datastream found".to_string(),
        };

        return Ok(web::Json(DatastreamFormResponse::Xml {
            pid,
            dsid,
            xml_content,
        }));
    }

    let Some(info) = object.datastreams.get(&dsid) else {
        return Err(HTTPError::new(ReasonCode::DatastreamNotFound, None));
    };

    Ok(web::Json(DatastreamFormResponse::File {
        label: info.label.clone(),
        mimetype: info.mimetype.clone(),
        pid,
        dsid,
    }))
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    label: Option<String>,
}

#[tracing::instrument(skip(state, req, body))]
#[post("/{pid}/{dsid}/edit/")]
async fn edit_datastream(
    state: web::Data<RouteState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<UploadQuery>,
    body: Bytes,
) -> Result<HttpResponse, HTTPError> {
    let (pid, dsid) = path.into_inner();
    let is_xml = state.settings.is_xml(&dsid);

    let content = if is_xml {
        let xml = XmlForm::clean(&FormData::parse(&body))?;
        DatastreamContent {
            content: Bytes::from(xml),
            mimetype: "text/xml".to_string(),
            label: None,
        }
    } else {
        let label = query.into_inner().label.filter(|l| !l.trim().is_empty());
        file_content(&req, body, label)?
    };

    let object = state.object(&pid).await?;
    if !object.has_datastream(&dsid) {
        info!(pid = %pid, dsid = %dsid, "datastream not on object, nothing uploaded");
        return Ok(see_object(&pid));
    }

    let size = content.content.len();
    state.storage.put_datastream(&pid, &dsid, content).await?;

    info!(pid = %pid, dsid = %dsid, size, xml = is_xml, "datastream replaced");
    Ok(see_object(&pid))
}

/// Raw body upload, typed by the request's content type
fn file_content(
    req: &HttpRequest,
    body: Bytes,
    label: Option<String>,
) -> Result<DatastreamContent, HTTPError> {
    if body.is_empty() {
        let mut errors = FormErrors::default();
        errors.add("file", "This field is required.");
        return Err(errors.into());
    }

    let mimetype = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(DatastreamContent {
        content: body,
        mimetype,
        label,
    })
}

#[derive(Serialize)]
struct CreateStreamResponse {
    pid: String,
    datastreams: Vec<String>,
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/edit/create_stream/")]
async fn get_create_stream_form(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<web::Json<CreateStreamResponse>, HTTPError> {
    let object = state.object(&pid).await?;

    Ok(web::Json(CreateStreamResponse {
        datastreams: object.datastreams.keys().cloned().collect(),
        pid: object.pid,
    }))
}

#[tracing::instrument(skip(state, req, body))]
#[post("/{pid}/edit/create_stream/")]
async fn create_stream(
    state: web::Data<RouteState>,
    req: HttpRequest,
    pid: web::Path<String>,
    body: Bytes,
) -> Result<HttpResponse, HTTPError> {
    let object = state.object(&pid).await?;
    let query = FormData::parse(req.query_string().as_bytes());
    let CreateStreamForm { dsid, label } = CreateStreamForm::clean(&query, &object)?;

    let content = file_content(&req, body, label)?;
    let size = content.content.len();
    state.storage.put_datastream(&pid, &dsid, content).await?;

    info!(pid = %pid, dsid = %dsid, size, "datastream created");
    Ok(see_object(&pid))
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/AUDIT/")]
async fn get_audit_trail(
    state: web::Data<RouteState>,
    pid: web::Path<String>,
) -> Result<HttpResponse, HTTPError> {
    state.object(&pid).await?;

    let Some(content) = state.storage.get_datastream(&pid, AUDIT_DSID).await? else {
        return Err(HTTPError::new(ReasonCode::DatastreamNotFound, None));
    };

    Ok(HttpResponse::Ok().content_type("text/xml").body(content))
}

#[tracing::instrument(skip(state))]
#[get("/{pid}/{dsid}/")]
async fn get_datastream(
    state: web::Data<RouteState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, HTTPError> {
    let (pid, dsid) = path.into_inner();
    let object = state.object(&pid).await?;

    let Some(content) = state.storage.get_datastream(&pid, &dsid).await? else {
        return Err(HTTPError::new(ReasonCode::DatastreamNotFound, None));
    };

    let mimetype = object
        .datastreams
        .get(&dsid)
        .map(|info| info.mimetype.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok().content_type(mimetype).body(content))
}

/// Registers every route. Fixed paths come before the `{dsid}` catch-alls.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(UPLOAD_LIMIT))
        .service(root)
        .service(landing)
        .service(health)
        .service(get_object)
        .service(get_rights_form)
        .service(edit_rights)
        .service(get_collections_form)
        .service(edit_collections)
        .service(get_embargo_form)
        .service(edit_embargo)
        .service(get_reorder_form)
        .service(reorder)
        .service(get_create_stream_form)
        .service(create_stream)
        .service(get_audit_trail)
        .service(get_datastream_form)
        .service(edit_datastream)
        .service(get_datastream);
}

pub fn create_rpc_server(rpc_laddr: String, state: RouteState) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(TracingMiddleware)
            .wrap(cors)
            .configure(configure)
    })
    .bind(rpc_laddr)?
    .run())
}
