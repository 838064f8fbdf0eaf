pub mod analytics;
pub mod connection;
pub mod orders;

pub use analytics::AnalyticsRepository;
pub use orders::OrderRepository;
