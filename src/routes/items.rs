use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use super::AppState;
use crate::db_mongo::models::{Item, NewItem, SearchField, is_present};
use crate::error::ApiError;
use crate::store::ItemStore;

const ITEM_NOT_FOUND: &str = "Objeto no encontrado";
const ITEMS_NOT_FOUND: &str = "Objetos no encontrados";
const DELETE_NOT_FOUND: &str = "No se encontró ningun objeto con el id seleccionado";
const MISSING_FIELDS: &str = "Error, faltan datos";
const INVALID_PRICE: &str = "Error en los datos";
const INVALID_ID: &str = "Error en el formato de datos a crear";

const LIST_FAILED: &str = "Error al obtener la coleccion en la base de datos";
const ITEM_FAILED: &str = "Error al obtener el objeto de la base de datos";
const ITEMS_FAILED: &str = "Error al obtener los objetos de la base de datos";
const CREATE_FAILED: &str = "Error al intentar agregar una nuevo objeto";
const DELETE_FAILED: &str = "Error al eliminar el objeto";

#[derive(Debug, Default, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub nombre: Value,
    #[serde(default)]
    pub precio: Value,
    #[serde(default)]
    pub categoria: Value,
}

impl CreateItemRequest {
    /// `None` unless every field is present.
    pub fn validate(self) -> Option<NewItem> {
        let all_present =
            is_present(&self.nombre) && is_present(&self.precio) && is_present(&self.categoria);

        all_present.then(|| NewItem {
            name: self.nombre,
            price: self.precio,
            category: self.categoria,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePriceRequest {
    #[serde(default)]
    pub precio: Value,
}

/// Bodies sent without a JSON content type are read as `{}`, so they fail
/// field validation rather than JSON parsing.
fn body_or_empty<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Item codes are any well-formed integer, zero included.
fn parse_code(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

pub async fn list_items<S: ItemStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.store.list().await.map_err(ApiError::store(LIST_FAILED))?;
    Ok(Json(items))
}

pub async fn get_item<S: ItemStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    // A malformed id cannot match any stored code.
    let code = parse_code(&id).ok_or(ApiError::NotFound(ITEM_NOT_FOUND))?;

    state
        .store
        .find_by_code(code)
        .await
        .map_err(ApiError::store(ITEM_FAILED))?
        .map(Json)
        .ok_or(ApiError::NotFound(ITEM_NOT_FOUND))
}

pub async fn find_by_name<S: ItemStore>(
    State(state): State<AppState<S>>,
    Path(nombre): Path<String>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .store
        .search(SearchField::Name, &nombre)
        .await
        .map_err(ApiError::store(ITEM_FAILED))?;

    if items.is_empty() {
        return Err(ApiError::NotFound(ITEM_NOT_FOUND));
    }
    Ok(Json(items))
}

pub async fn find_by_category<S: ItemStore>(
    State(state): State<AppState<S>>,
    Path(categoria): Path<String>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .store
        .search(SearchField::Category, &categoria)
        .await
        .map_err(ApiError::store(ITEMS_FAILED))?;

    if items.is_empty() {
        return Err(ApiError::NotFound(ITEMS_NOT_FOUND));
    }
    Ok(Json(items))
}

pub async fn create_item<S: ItemStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let new_item = body_or_empty(body)?
        .validate()
        .ok_or(ApiError::BadRequest(MISSING_FIELDS))?;

    let item = state
        .store
        .create(new_item)
        .await
        .map_err(ApiError::store(CREATE_FAILED))?;

    tracing::info!("Created item {}", item.code);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_price<S: ItemStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePriceRequest>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let payload = body_or_empty(body)?;
    let code = parse_code(&id).ok_or(ApiError::BadRequest(INVALID_PRICE))?;
    if !is_present(&payload.precio) {
        return Err(ApiError::BadRequest(INVALID_PRICE));
    }

    let item = state
        .store
        .update_price(code, payload.precio)
        .await
        .map_err(ApiError::store(ITEM_FAILED))?
        .ok_or(ApiError::NotFound(ITEM_NOT_FOUND))?;

    tracing::info!("Updated price of item {}", code);
    Ok(Json(item))
}

pub async fn delete_item<S: ItemStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code = parse_code(&id).ok_or(ApiError::BadRequest(INVALID_ID))?;

    let deleted = state
        .store
        .delete(code)
        .await
        .map_err(ApiError::store(DELETE_FAILED))?;

    if deleted == 0 {
        return Err(ApiError::NotFound(DELETE_NOT_FOUND));
    }

    tracing::info!("Deleted item {}", code);
    Ok(StatusCode::NO_CONTENT)
}
