use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::job::SearchCriteria;
use crate::state::AppState;

/// Upper bound on resume text accepted from clients.
const MAX_RESUME_CHARS: usize = 50_000;

/// GET /api/v1/criteria
pub async fn handle_get_criteria(State(state): State<AppState>) -> Json<SearchCriteria> {
    Json(state.criteria.get())
}

/// PUT /api/v1/criteria
/// Replaces the criteria wholesale. Missing fields take their empty value.
pub async fn handle_put_criteria(
    State(state): State<AppState>,
    Json(mut criteria): Json<SearchCriteria>,
) -> Result<Json<SearchCriteria>, AppError> {
    if criteria.resume_text.chars().count() > MAX_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume_text exceeds {MAX_RESUME_CHARS} characters"
        )));
    }
    criteria.job_title = criteria.job_title.trim().to_string();
    criteria.location = criteria.location.trim().to_string();

    state.criteria.set(criteria.clone());
    Ok(Json(criteria))
}
