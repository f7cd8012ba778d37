//! Raw document read/write routes.
//!
//! These are the demonstration surface over the access layer: resolve the
//! path, open a transaction scope, and move raw documents through it. Typed
//! record mapping lives with the domain that owns the record types; at this
//! level documents stay raw apart from the metadata block, which is
//! normalized and stamped exactly the way the mapper does it.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use docstore::{resolve, with_async_transaction, AsyncStoreClient, Metadata, METADATA_KEY};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// GET /records/{collection}/{uid} — read one raw document.
pub async fn get_record(
    State(state): State<Arc<ServerState>>,
    Path((collection, uid)): Path<(String, String)>,
) -> ServerResult<impl IntoResponse> {
    let at = resolve([collection.as_str(), uid.as_str()])?;

    let snapshot = with_async_transaction(state.store.as_ref(), |_tx| {
        let store = state.store.clone();
        let at = at.clone();
        Box::pin(async move { store.get_document(&at).await })
    })
    .await?;

    match snapshot {
        Some(snap) => Ok(Json(Value::Object(snap.raw_fields().clone()))),
        None => Err(ServerError::NotFound),
    }
}

/// PUT /records/{collection}/{uid} — write one raw document.
///
/// The body's `_metadata` block (if any) is normalized, stamped with the
/// resolved location, and touched before the write, so a subsequent read maps
/// cleanly onto a typed record.
pub async fn put_record(
    State(state): State<Arc<ServerState>>,
    Path((collection, uid)): Path<(String, String)>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(mut fields) = payload?;
    let at = resolve([collection.as_str(), uid.as_str()])?;

    let raw_metadata = fields
        .remove(METADATA_KEY)
        .unwrap_or_else(|| Value::Object(Map::new()));
    let mut metadata: Metadata = serde_json::from_value(raw_metadata)
        .map_err(|e| ServerError::Validation(format!("bad {METADATA_KEY}: {e}")))?;
    metadata.set_path(at.clone());
    metadata.touch();
    fields.insert(METADATA_KEY.to_string(), serde_json::to_value(&metadata)?);

    let write_at = at.clone();
    with_async_transaction(state.store.as_ref(), |tx| {
        let store = state.store.clone();
        let at = write_at;
        Box::pin(async move {
            tx.set(at, fields);
            store.commit_transaction(tx).await
        })
    })
    .await?;

    Ok(Json(json!({
        "path": at.path(),
        "uid": at.id(),
    })))
}
