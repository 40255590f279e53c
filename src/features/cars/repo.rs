use crate::features::cars::model::{Car, CarUpdate, NewCar};
use serde_json::Value;
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, AnyConnection};

// every statement binds its input; nothing from the request is spliced into SQL text

pub async fn list_cars(conn: &mut AnyConnection) -> sqlx::Result<Vec<Car>> {
    sqlx::query_as::<_, Car>(
        r#"
        SELECT id, make, model, year,
               CASE WHEN deleted_flag THEN 1 ELSE 0 END AS deleted_flag
        FROM cars
        ORDER BY id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn insert_car(conn: &mut AnyConnection, car: &NewCar) -> sqlx::Result<u64> {
    let query = sqlx::query("INSERT INTO cars (make, model, year) VALUES (?, ?, ?)");
    let query = bind_json(query, &car.make);
    let query = bind_json(query, &car.model);
    let query = bind_json(query, &car.year);

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}

/// Flags the car as deleted. Returns the number of rows matched.
pub async fn soft_delete_car(conn: &mut AnyConnection, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE cars SET deleted_flag = ? WHERE id = ?")
        .bind(true)
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn update_car(conn: &mut AnyConnection, car: &CarUpdate) -> sqlx::Result<u64> {
    let query = sqlx::query("UPDATE cars SET make = ?, model = ?, year = ? WHERE id = ?");
    let query = bind_json(query, &car.make);
    let query = bind_json(query, &car.model);
    let query = bind_json(query, &car.year);
    let query = bind_json(query, &car.id);

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}

// binds a JSON value with the closest SQL type; arrays and objects go in as their JSON text
fn bind_json<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &Option<Value>,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        None | Some(Value::Null) => query.bind(None::<String>),
        Some(Value::Bool(b)) => query.bind(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Some(Value::String(s)) => query.bind(s.clone()),
        Some(other) => query.bind(other.to_string()),
    }
}
