// Reservation CRUD: /reservations and /reservations/:id

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use crate::access::scope;
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::{NewReservation, Reservation, ReservationPatch};
use crate::database::reservations::ReservationStore;
use crate::handlers::require_non_empty;
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};

pub fn routes() -> Router {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/reservations/:id",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
}

#[derive(Debug, Deserialize)]
pub struct ReservationDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// GET /reservations - every row the identity may see, in display order.
pub async fn list_reservations(
    Extension(current): Extension<CurrentIdentity>,
) -> ApiResult<Vec<Reservation>> {
    let identity = current.identity();
    let read_scope = scope::reservation_read_scope(identity.as_ref())?;

    let store = ReservationStore::new(DatabaseManager::pool()?);
    Ok(ApiResponse::success(store.list(&read_scope).await?))
}

/// GET /reservations/:id
pub async fn get_reservation(
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Reservation> {
    let identity = current.identity();
    let read_scope = scope::reservation_read_scope(identity.as_ref())?;

    let store = ReservationStore::new(DatabaseManager::pool()?);
    Ok(ApiResponse::success(store.get(&id, &read_scope).await?))
}

/// POST /reservations - create a reservation owned by the caller. All trip
/// fields are required; notes default to empty.
pub async fn create_reservation(
    Extension(current): Extension<CurrentIdentity>,
    Json(body): Json<ReservationDraft>,
) -> ApiResult<Reservation> {
    let Some(identity) = current.identity() else {
        return Err(scope::AccessError::Unauthenticated.into());
    };
    // Write eligibility is checked before the payload so a read-only role
    // gets 403 even for an empty body.
    scope::reservation_write_scope(Some(&identity), &config::config().policy)?;
    let owner_id = identity.id;

    require_non_empty(&[
        ("name", body.name.as_deref()),
        ("phone", body.phone.as_deref()),
        ("from", body.from.as_deref()),
        ("to", body.to.as_deref()),
        ("date", body.date.as_deref()),
        ("time", body.time.as_deref()),
    ])?;

    let draft = NewReservation {
        name: body.name.unwrap_or_default(),
        phone: body.phone.unwrap_or_default(),
        from: body.from.unwrap_or_default(),
        to: body.to.unwrap_or_default(),
        date: body.date.unwrap_or_default(),
        time: body.time.unwrap_or_default(),
        notes: body.notes.unwrap_or_default(),
    };

    let store = ReservationStore::new(DatabaseManager::pool()?);
    let reservation = store.create(draft, owner_id).await?;

    tracing::info!("Created reservation {} for account {}", reservation.id, owner_id);
    Ok(ApiResponse::created(reservation))
}

/// PUT /reservations/:id - merge patch; unspecified fields keep their stored
/// values.
pub async fn update_reservation(
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
    Json(patch): Json<ReservationPatch>,
) -> ApiResult<Reservation> {
    let identity = current.identity();
    let write_scope = scope::reservation_write_scope(identity.as_ref(), &config::config().policy)?;

    let store = ReservationStore::new(DatabaseManager::pool()?);
    Ok(ApiResponse::success(
        store.update(&id, &patch, &write_scope).await?,
    ))
}

/// DELETE /reservations/:id
pub async fn delete_reservation(
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let identity = current.identity();
    let write_scope = scope::reservation_write_scope(identity.as_ref(), &config::config().policy)?;

    let store = ReservationStore::new(DatabaseManager::pool()?);
    store.delete(&id, &write_scope).await?;

    tracing::info!("Deleted reservation {}", id);
    Ok(ApiResponse::<()>::no_content())
}
