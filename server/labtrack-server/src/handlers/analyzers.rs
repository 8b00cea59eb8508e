use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use database_layer::{Analyzer, AnalyzerPatch, NewAnalyzer};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::AuthContext,
    server::LabTrackServer,
    types::{ErrorCodeResponse, UpdateManyRequest},
    validation::RequestValidation,
};

/// Create an analyzer
///
/// `POST /analyzers`
pub async fn create_analyzer(
    State(server): State<LabTrackServer>,
    auth: AuthContext,
    payload: Result<Json<NewAnalyzer>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Analyzer>)> {
    let Json(body) = payload?;
    body.validate()?;

    let analyzer = server.analyzers.create(&auth, body).await?;
    Ok((StatusCode::CREATED, Json(analyzer)))
}

/// List enabled analyzers
///
/// `GET /analyzers`
pub async fn list_analyzers(State(server): State<LabTrackServer>) -> ApiResult<Json<Vec<Analyzer>>> {
    Ok(Json(server.analyzers.find_all().await?))
}

/// `GET /analyzers/:id`
pub async fn get_analyzer(
    State(server): State<LabTrackServer>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Analyzer>> {
    let Path(id) = id?;
    Ok(Json(server.analyzers.find_by_id(id).await?))
}

/// Update one analyzer
///
/// `PUT /analyzers/:id`
pub async fn update_analyzer(
    State(server): State<LabTrackServer>,
    auth: AuthContext,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AnalyzerPatch>, JsonRejection>,
) -> ApiResult<Json<ErrorCodeResponse>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    server.analyzers.update_by_id(&auth, id, patch).await?;
    Ok(Json(ErrorCodeResponse::ok()))
}

/// Apply the same properties to several analyzers
///
/// `PATCH /analyzers`
pub async fn update_analyzers(
    State(server): State<LabTrackServer>,
    auth: AuthContext,
    payload: Result<Json<UpdateManyRequest>, JsonRejection>,
) -> ApiResult<Json<ErrorCodeResponse>> {
    let Json(request) = payload?;
    request.properties.validate()?;

    server
        .analyzers
        .update_by_ids(&auth, &request.ids, request.properties)
        .await?;
    Ok(Json(ErrorCodeResponse::ok()))
}

/// `DELETE /analyzers/:id`
pub async fn delete_analyzer(
    State(server): State<LabTrackServer>,
    auth: AuthContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Analyzer>> {
    let Path(id) = id?;
    Ok(Json(server.analyzers.delete_by_id(&auth, id).await?))
}
