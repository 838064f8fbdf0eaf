pub mod use_cases;

pub use use_cases::clean_orders::clean_orders;
pub use use_cases::seed_orders::seed_orders;
