pub mod model;
pub mod repo;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{attach_connection, DbConn};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Json, Router,
};
use model::{Car, CarUpdate, NewCar};

const CAR_NOT_FOUND: &str = "Car not found or no changes made";

/// Routes for the cars resource. Every route runs with a connection checked
/// out by [`attach_connection`].
pub fn cars_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/cars",
            get(list_cars_handler)
                .post(create_car_handler)
                .put(update_car_handler),
        )
        .route("/cars/{id}", delete(delete_car_handler))
        .route_layer(middleware::from_fn_with_state(state, attach_connection))
}

// list and create report driver failures as 200 with success=false; delete
// and update answer 500
async fn list_cars_handler(mut db: DbConn) -> ApiResult<Json<Envelope<Vec<Car>>>> {
    let cars = repo::list_cars(db.connection())
        .await
        .map_err(ApiError::query("Failed to retrieve cars", StatusCode::OK))?;

    tracing::debug!(count = cars.len(), "listed cars");
    Ok(Json(Envelope::success("Car data retrieved successfully", cars)))
}

async fn create_car_handler(
    mut db: DbConn,
    payload: Result<Json<NewCar>, JsonRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let Json(car) = payload?;

    repo::insert_car(db.connection(), &car)
        .await
        .map_err(ApiError::query("Failed to create car", StatusCode::OK))?;

    tracing::info!(make = ?car.make, model = ?car.model, year = ?car.year, "car created");
    Ok(Json(Envelope::done("Car successfully created")))
}

async fn delete_car_handler(
    mut db: DbConn,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let Path(id) = id?;

    let affected = repo::soft_delete_car(db.connection(), id)
        .await
        .map_err(ApiError::query(
            "Failed to delete car",
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;

    if affected == 0 {
        return Err(ApiError::NotFound("Car not found"));
    }

    tracing::info!(id, "car soft-deleted");
    Ok(Json(Envelope::done("Car deleted successfully")))
}

async fn update_car_handler(
    mut db: DbConn,
    payload: Result<Json<CarUpdate>, JsonRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let Json(car) = payload?;

    let affected = repo::update_car(db.connection(), &car)
        .await
        .map_err(ApiError::query(
            "Failed to update car",
            StatusCode::INTERNAL_SERVER_ERROR,
        ))?;

    if affected == 0 {
        return Err(ApiError::NotFound(CAR_NOT_FOUND));
    }

    tracing::info!(id = ?car.id, "car updated");
    Ok(Json(Envelope::done("Car updated successfully")))
}
