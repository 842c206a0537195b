pub mod calendar;
pub mod loader;
pub mod qa;
pub mod series;

pub use calendar::{align, common_trading_days, month_end_indices};
pub use loader::load_price_csv;
pub use series::{PricePoint, PriceSeries, SeriesError};
