//! Database layer: order store operations over the PostgreSQL pool

pub mod orders;
