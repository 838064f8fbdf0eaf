pub mod clean_orders;
pub mod seed_orders;
