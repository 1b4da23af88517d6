pub mod analytics_service;
pub mod currency_service;
pub mod market_status_service;
pub mod price_service;
pub mod single_flight;
pub mod symbol_resolver;
