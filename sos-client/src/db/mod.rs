pub mod interruption_queries;
pub mod order_queries;
pub mod reading_queries;

pub use interruption_queries::interruptions_started_in;
pub use order_queries::display_order;
pub use reading_queries::{
    readings_at, readings_for_code_in_month, readings_for_codes_on, readings_on, readings_on_dates_at,
};
