pub mod due_queue;
pub mod quality;
pub mod review_card;
pub mod review_history;
pub mod review_session;
pub mod sm2;
pub mod stats;

pub use due_queue::{Priority, due_queue};
pub use quality::Quality;
pub use review_card::ReviewCard;
pub use review_history::{ReviewHistory, ReviewTotals};
pub use review_session::ReviewSession;
pub use sm2::advance;
pub use stats::{CardMaturity, ReviewStats, review_stats};
