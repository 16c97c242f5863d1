use crate::bars::LifeBarManager;
use crate::errors::AppError;
use crate::models::{
    CreateBarRequest, CreateTabRequest, DeleteTabResponse, ImageRequest, LifeBarView,
    LifeEditRequest, MaxLifeEditRequest, RenameRequest, ReorderRequest, StateResponse, TabSummary,
};
use crate::parse::{parse_delta, parse_max_life, LifeEdit};
use crate::state::SharedState;
use crate::store::Store;
use crate::tabs::{TabDeletion, TabManager};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

pub async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(state.with_store(|store| render_index(store)).await)
}

pub async fn get_state(State(state): State<SharedState>) -> Json<StateResponse> {
    Json(state.with_store(|store| snapshot(store)).await)
}

pub async fn create_tab(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTabRequest>,
) -> Json<StateResponse> {
    let name = payload.name.unwrap_or_default();
    let activate = payload.activate.unwrap_or(true);
    let view = state
        .with_store(|store| {
            TabManager::new(store).create_tab(&name, activate);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn switch_tab(
    State(state): State<SharedState>,
    Path(tab_id): Path<String>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            TabManager::new(store).switch_tab(&tab_id);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn rename_tab(
    State(state): State<SharedState>,
    Path(tab_id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            TabManager::new(store).rename_tab(&tab_id, &payload.name);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn delete_tab(
    State(state): State<SharedState>,
    Path(tab_id): Path<String>,
) -> Json<DeleteTabResponse> {
    let (outcome, tab_name, view) = state
        .with_store(|store| {
            let (outcome, tab_name) = match TabManager::new(store).delete_tab(&tab_id) {
                TabDeletion::Deleted => ("deleted", None),
                TabDeletion::ConfirmationRequired(request) => ("confirm", Some(request.tab_name)),
                TabDeletion::Ignored => ("ignored", None),
            };
            (outcome, tab_name, snapshot(store))
        })
        .await;

    Json(DeleteTabResponse {
        outcome: outcome.to_string(),
        tab_id,
        tab_name,
        state: view,
    })
}

pub async fn confirm_delete_tab(
    State(state): State<SharedState>,
    Path(tab_id): Path<String>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            TabManager::new(store).execute_delete_tab(&tab_id);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn create_bar(
    State(state): State<SharedState>,
    Json(payload): Json<CreateBarRequest>,
) -> Result<Json<StateResponse>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("life bar name must not be empty"));
    }

    let max_life = parse_max_life(&payload.max_life);
    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).create_life_bar(&payload.name, max_life);
            snapshot(store)
        })
        .await;
    Ok(Json(view))
}

pub async fn edit_life(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
    Json(payload): Json<LifeEditRequest>,
) -> Result<Json<StateResponse>, AppError> {
    state
        .with_store(|store| -> Result<_, AppError> {
            let mut bars = LifeBarManager::new(store);
            if let Some(current_life) = bars.bar(&bar_id).map(|bar| bar.current_life) {
                let edit = LifeEdit::from_input(current_life, &payload.input, payload.temporary)?;
                bars.apply_edit(&bar_id, edit);
            }
            Ok(Json(snapshot(store)))
        })
        .await
}

pub async fn edit_max_life(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
    Json(payload): Json<MaxLifeEditRequest>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            let mut bars = LifeBarManager::new(store);
            if let Some(max_life) = bars.bar(&bar_id).map(|bar| bar.max_life) {
                let delta = parse_delta(max_life, &payload.input);
                if delta != 0 {
                    bars.update_max_life(&bar_id, delta);
                }
            }
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn rename_bar(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).rename_life_bar(&bar_id, &payload.name);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn set_image(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
    Json(payload): Json<ImageRequest>,
) -> Result<Json<StateResponse>, AppError> {
    if payload.data.trim().is_empty() {
        return Err(AppError::bad_request("image data must not be empty"));
    }

    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).set_profile_image(&bar_id, &payload.data);
            snapshot(store)
        })
        .await;
    Ok(Json(view))
}

pub async fn clear_image(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).clear_profile_image(&bar_id);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn delete_bar(
    State(state): State<SharedState>,
    Path(bar_id): Path<String>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).delete_life_bar(&bar_id);
            snapshot(store)
        })
        .await;
    Json(view)
}

pub async fn reorder_bars(
    State(state): State<SharedState>,
    Json(payload): Json<ReorderRequest>,
) -> Json<StateResponse> {
    let view = state
        .with_store(|store| {
            LifeBarManager::new(store).reorder(&payload.dragged_id, &payload.target_id);
            snapshot(store)
        })
        .await;
    Json(view)
}

fn snapshot(store: &Store) -> StateResponse {
    let active_tab_id = store.active_tab_id().map(str::to_string);
    let tabs = store
        .tabs()
        .iter()
        .map(|tab| TabSummary {
            id: tab.id.clone(),
            name: tab.name.clone(),
            bar_count: tab.life_bars.len(),
            active: active_tab_id.as_deref() == Some(tab.id.as_str()),
        })
        .collect();
    let life_bars = store
        .active_tab()
        .map(|tab| {
            tab.life_bars
                .iter()
                .map(|bar| LifeBarView {
                    id: bar.id.clone(),
                    name: bar.name.clone(),
                    max_life: bar.max_life,
                    current_life: bar.current_life,
                    temp_life: bar.temp_life,
                    total_life: bar.total_life(),
                    has_image: bar.profile_image_base64.is_some(),
                })
                .collect()
        })
        .unwrap_or_default();

    StateResponse {
        active_tab_id,
        tabs,
        life_bars,
    }
}
