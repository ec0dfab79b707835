// ============================================================================
// Domain Models Module
// Orders, the book's data structures and the values it reports
// ============================================================================

pub mod book_side;
pub mod config;
pub mod execution;
pub mod order;
pub mod order_queue;
pub mod price_level;
pub mod price_tree;
pub mod snapshot;

pub use book_side::OrderBookSide;
pub use config::OrderBookConfig;
pub use execution::Execution;
pub use order::{Order, OrderId, Side};
pub use order_queue::{OrderQueue, QueueHandle};
pub use price_level::PriceLevel;
pub use price_tree::PriceTree;
pub use snapshot::{Depth, OrderBookSnapshot, PriceVolume};
