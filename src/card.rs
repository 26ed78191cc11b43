//! 連絡先カードのデータモデル
//!
//! ## 使い方
//!
//! ```ignore
//! use vcim::card::{AttributeLine, Card};
//!
//! let card = Card::new(vec![
//!     AttributeLine::fn_name("Mr. Rogers"),
//!     AttributeLine::email("mr@rogers.com"),
//! ]);
//! assert!(card.has_email("mr@rogers.com"));
//! ```

mod line;
mod record;

pub use line::{AttributeLine, LineName};
pub use record::Card;
