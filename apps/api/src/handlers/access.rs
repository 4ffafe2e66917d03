use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use steward_core::{AppError, IdentityId};
use steward_domain::Action;

use crate::dto::{
    AccessDecisionResponse, AccessQuery, EffectiveActionsResponse, RoleCheckResponse, RoleQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn access_decision_handler(
    State(state): State<AppState>,
    Path(identity_id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> ApiResult<Json<AccessDecisionResponse>> {
    let identity_id = IdentityId::from_str(identity_id.as_str())?;
    let action = query
        .action
        .as_deref()
        .map(Action::from_str)
        .transpose()?
        .unwrap_or_default();

    let context = state.access_service.context_for(identity_id).await?;
    let decision = context.explain(query.module.as_str(), action);

    Ok(Json(AccessDecisionResponse::new(
        identity_id.to_string(),
        query.module,
        action,
        decision,
        &context,
    )))
}

pub async fn effective_actions_handler(
    State(state): State<AppState>,
    Path((identity_id, module)): Path<(String, String)>,
) -> ApiResult<Json<EffectiveActionsResponse>> {
    let identity_id = IdentityId::from_str(identity_id.as_str())?;
    let actions = state
        .access_service
        .effective_actions(identity_id, module.as_str())
        .await?;

    Ok(Json(EffectiveActionsResponse {
        identity_id: identity_id.to_string(),
        module,
        actions,
    }))
}

pub async fn role_check_handler(
    State(state): State<AppState>,
    Path(identity_id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<RoleCheckResponse>> {
    let identity_id = IdentityId::from_str(identity_id.as_str())?;
    let role_names: Vec<&str> = query
        .any_of
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if role_names.is_empty() {
        return Err(
            AppError::Validation("any_of must name at least one role".to_owned()).into(),
        );
    }

    let has_role = state
        .access_service
        .has_role(identity_id, role_names.as_slice())
        .await?;

    Ok(Json(RoleCheckResponse {
        identity_id: identity_id.to_string(),
        has_role,
    }))
}

pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(identity_id): Path<String>,
) -> ApiResult<StatusCode> {
    let identity_id = IdentityId::from_str(identity_id.as_str())?;
    state.access_service.invalidate(identity_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
