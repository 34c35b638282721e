pub mod points_store;
