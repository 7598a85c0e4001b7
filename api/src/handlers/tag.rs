use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    models::tag::{
        is_valid_state, CreateTag, EditTag, Tag, TagFilter, TagList, TagQuery, MAX_AUTHOR_LEN,
        MAX_NAME_LEN, STATE_ENABLED,
    },
    AppState,
};

pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> Result<Json<TagList>, AppError> {
    if let Some(s) = query.state {
        check_state(s)?;
    }

    let filter = TagFilter {
        name: query.name.filter(|n| !n.is_empty()),
        state: query.state,
    };
    let limit = i64::from(state.page_size);
    let offset = page_offset(query.page, state.page_size);

    let lists = state.tags.list(&filter, offset, limit).await?;
    let total = state.tags.count(&filter).await?;

    Ok(Json(TagList { lists, total }))
}

pub async fn add_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTag>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let name = normalize_name(&payload.name)?;
    let tag_state = payload.state.unwrap_or(STATE_ENABLED);
    check_state(tag_state)?;
    check_author("created_by", &payload.created_by)?;

    if state.tags.exists_by_name(&name).await? {
        return Err(AppError::TagExists);
    }

    let tag = state
        .tags
        .create(Tag::new(name, tag_state, payload.created_by))
        .await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn edit_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EditTag>,
) -> Result<Json<Tag>, AppError> {
    if id <= 0 {
        return Err(AppError::InvalidParams("id must be positive".to_string()));
    }
    let name = payload.name.as_deref().map(normalize_name).transpose()?;
    if let Some(s) = payload.state {
        check_state(s)?;
    }
    check_author("modified_by", &payload.modified_by)?;

    let mut tag = state.tags.get(id).await?.ok_or(AppError::TagNotFound)?;

    if let Some(name) = name {
        if name != tag.name && state.tags.exists_by_name(&name).await? {
            return Err(AppError::TagExists);
        }
        tag.name = name;
    }
    if let Some(s) = payload.state {
        tag.state = s;
    }
    tag.modified_by = payload.modified_by;

    Ok(Json(state.tags.edit(tag).await?))
}

/// Row offset for a 1-based page number; missing or non-positive pages map
/// to the first page.
pub fn page_offset(page: Option<i64>, page_size: u32) -> i64 {
    match page {
        Some(p) if p > 0 => (p - 1).saturating_mul(i64::from(page_size)),
        _ => 0,
    }
}

/// Trims surrounding whitespace so `" rust"` and `"rust"` name the same tag.
fn normalize_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidParams(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

fn check_author(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() || value.chars().count() > MAX_AUTHOR_LEN {
        return Err(AppError::InvalidParams(format!(
            "{field} must be 1 to {MAX_AUTHOR_LEN} characters"
        )));
    }
    Ok(())
}

fn check_state(state: i32) -> Result<(), AppError> {
    if !is_valid_state(state) {
        return Err(AppError::InvalidParams("state must be 0 or 1".to_string()));
    }
    Ok(())
}
