use crate::error::UrdfServerError;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use urdf_runtime::events::{kind, now_millis};
use urdf_sparql::QueryResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct GidQuery {
    gid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeQuery {
    id: String,
    gid: Option<String>,
}

pub(crate) async fn health(
    State(state): State<AppState>,
) -> Result<Json<Value>, UrdfServerError> {
    let size = state.handle.health().await?;
    let body = json!({ "ok": true, "ts": now_millis(), "size": size });
    state
        .handle
        .events()
        .publish(kind::HEALTH, "GET", "/urdf/health", None, body.clone());
    Ok(Json(body))
}

pub(crate) async fn size(
    State(state): State<AppState>,
    Query(params): Query<GidQuery>,
) -> Result<Json<Value>, UrdfServerError> {
    let body = match &params.gid {
        Some(gid) => {
            let size = state.handle.size(Some(gid.clone())).await?;
            json!({ "ok": true, "ts": now_millis(), "gid": gid, "size": size })
        }
        None => {
            let total = state.handle.size(None).await?;
            json!({ "ok": true, "ts": now_millis(), "totalSize": total })
        }
    };
    state
        .handle
        .events()
        .publish(kind::SIZE, "GET", "/urdf/size", params.gid, body.clone());
    Ok(Json(body))
}

pub(crate) async fn graph(
    State(state): State<AppState>,
    Query(params): Query<GidQuery>,
) -> Result<Json<Value>, UrdfServerError> {
    let (gid, nodes) = state.handle.graph(params.gid).await?;
    let body = json!({ "ok": true, "ts": now_millis(), "gid": gid, "graph": nodes });
    state.handle.events().publish(
        kind::GRAPH,
        "GET",
        "/urdf/graph",
        Some(gid),
        json!({ "ok": true, "nodes": body["graph"].as_array().map(Vec::len) }),
    );
    Ok(Json(body))
}

pub(crate) async fn export(
    State(state): State<AppState>,
    Query(params): Query<GidQuery>,
) -> Result<Response, UrdfServerError> {
    let gid = params
        .gid
        .ok_or_else(|| UrdfServerError::BadRequest("'gid' query parameter required".to_owned()))?;
    let dataset = state.handle.export(gid.clone()).await?;

    let filename: String = gid
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let response = (
        [
            (header::CONTENT_TYPE, "application/ld+json".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.jsonld\""),
            ),
        ],
        Json(dataset),
    )
        .into_response();
    state.handle.events().publish(
        kind::GRAPH,
        "GET",
        "/urdf/export",
        Some(gid),
        json!({ "ok": true }),
    );
    Ok(response)
}

pub(crate) async fn node(
    State(state): State<AppState>,
    Query(params): Query<NodeQuery>,
) -> Result<Json<Value>, UrdfServerError> {
    let node = state
        .handle
        .node(params.id.clone(), params.gid.clone())
        .await?;
    let body = json!({
        "ok": true,
        "ts": now_millis(),
        "id": params.id,
        "gid": params.gid,
        "node": node,
    });
    state
        .handle
        .events()
        .publish(kind::NODE, "GET", "/urdf/node", Some(params.id), json!({ "ok": true }));
    Ok(Json(body))
}

pub(crate) async fn zurl(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.handle.zurl().to_vec())
}

pub(crate) async fn clear(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, UrdfServerError> {
    let gid = body
        .as_ref()
        .and_then(|Json(body)| body.get("gid"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    state.handle.clear(gid.clone()).await?;
    let body = json!({ "ok": true, "ts": now_millis(), "gid": gid });
    state
        .handle
        .events()
        .publish(kind::CLEAR, "POST", "/urdf/clear", gid, body.clone());
    Ok(Json(body))
}

pub(crate) async fn load(
    State(state): State<AppState>,
    Json(doc): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let size = state.handle.load(doc).await?;
    let body = json!({ "ok": true, "ts": now_millis(), "size": size });
    state
        .handle
        .events()
        .publish(kind::LOAD, "POST", "/urdf/load", None, body.clone());
    Ok(Json(body))
}

pub(crate) async fn load_file(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let doc = body
        .get("doc")
        .cloned()
        .ok_or_else(|| UrdfServerError::BadRequest("body must carry 'doc'".to_owned()))?;
    let report = state.handle.load_file(doc).await?;
    let body = json!({
        "ok": true,
        "ts": now_millis(),
        "gid": report.gid,
        "size": report.size,
        "totalSize": report.total_size,
    });
    state.handle.events().publish(
        kind::LOAD_FILE,
        "POST",
        "/urdf/loadFile",
        Some(report.gid),
        body.clone(),
    );
    Ok(Json(body))
}

pub(crate) async fn query(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let sparql = body
        .get("sparql")
        .and_then(Value::as_str)
        .ok_or_else(|| UrdfServerError::BadRequest("body must carry 'sparql'".to_owned()))?
        .to_owned();

    let summary = sparql.chars().take(80).collect::<String>();
    let response = state.handle.query(sparql).await?;
    let body = match response {
        QueryResponse::Ask(result) => json!({
            "ok": true,
            "ts": now_millis(),
            "type": "ASK",
            "result": result,
        }),
        QueryResponse::Select(rows) => json!({
            "ok": true,
            "ts": now_millis(),
            "type": "SELECT",
            "results": rows,
        }),
    };
    state.handle.events().publish(
        kind::QUERY,
        "POST",
        "/urdf/query",
        Some(summary),
        json!({ "ok": true, "type": body["type"] }),
    );
    Ok(Json(body))
}

pub(crate) async fn rules_create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let rule = required_field(&body, "rule")?;
    state.handle.rule_create(rule).await?;
    rules_ok(&state, "create").await
}

pub(crate) async fn rules_update(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let rule = required_field(&body, "rule")?;
    state.handle.rule_update(rule).await?;
    rules_ok(&state, "update").await
}

pub(crate) async fn rules_delete(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, UrdfServerError> {
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| UrdfServerError::BadRequest("body must carry 'id'".to_owned()))?
        .to_owned();
    state.handle.rule_delete(id).await?;
    rules_ok(&state, "delete").await
}

fn required_field(body: &Value, field: &str) -> Result<Value, UrdfServerError> {
    body.get(field)
        .cloned()
        .ok_or_else(|| UrdfServerError::BadRequest(format!("body must carry '{field}'")))
}

async fn rules_ok(state: &AppState, operation: &str) -> Result<Json<Value>, UrdfServerError> {
    let body = json!({ "ok": true, "ts": now_millis() });
    state.handle.events().publish(
        kind::RULES,
        "POST",
        "/urdf/rules",
        Some(operation.to_owned()),
        body.clone(),
    );
    Ok(Json(body))
}
