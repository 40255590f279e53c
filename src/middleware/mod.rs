pub mod connection;

pub use connection::{attach_connection, DbConn};
