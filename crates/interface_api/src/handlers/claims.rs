//! Claims handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::debug;
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::LedgerStore;

use crate::auth::{permissions, require_role, Claims};
use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Adjudicates a claim submission
///
/// Every accepted submission, rejections included, is recorded and answered
/// with 201.
pub async fn submit_claim<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<Claims>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimSubmissionResponse>), ApiError> {
    require_role(&user, permissions::CLAIM_SUBMIT).map_err(|e| ApiError::Forbidden(e.to_string()))?;
    request.validate()?;

    let outcome = state.engine.submit(&request.into_submission()).await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Gets a claim by ID
///
/// Accepts both `42` and `CLM-42`.
pub async fn get_claim<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require_role(&user, permissions::CLAIM_READ).map_err(|e| ApiError::Forbidden(e.to_string()))?;
    let claim_id: ClaimId = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid claim id '{}'", id)))?;

    debug!(claim_id = %claim_id, "Fetching claim");
    let claim = state.engine.store().get_claim(claim_id).await?;

    Ok(Json(claim.into()))
}
