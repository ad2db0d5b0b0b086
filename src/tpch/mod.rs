//! TPC-H relations used by Q5: schemas, row store and data generator

mod generator;
mod schema;
mod tables;

pub use generator::*;
pub use schema::*;
pub use tables::*;
