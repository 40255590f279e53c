use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

#[derive(Serialize, Debug, Eq, PartialEq, Clone, Display)]
#[display("{} {} {} (#{})", year, make, model, id)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub deleted_flag: bool,
}

// the flag is selected as an integer: booleans don't decode uniformly through the Any driver
impl<'r> FromRow<'r, AnyRow> for Car {
    fn from_row(row: &'r AnyRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            make: row.try_get("make")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            deleted_flag: row.try_get::<i64, _>("deleted_flag")? != 0,
        })
    }
}

// fields are raw JSON values: whatever the client sent is bound as is and the
// database decides whether it fits the column (a missing field becomes NULL
// and hits the NOT NULL constraint, "2020" is coerced into the year column)
#[derive(Deserialize, Debug, Clone)]
pub struct NewCar {
    pub make: Option<Value>,
    pub model: Option<Value>,
    pub year: Option<Value>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CarUpdate {
    pub id: Option<Value>,
    pub make: Option<Value>,
    pub model: Option<Value>,
    pub year: Option<Value>,
}
