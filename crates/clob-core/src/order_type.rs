//! Order types accepted by the matching core.

use serde::{Deserialize, Serialize};

/// Execution policy of a submitted order.
///
/// - `Market`: cross at any price; any residual is discarded.
/// - `Limit`: cross up to the limit price; residual rests in the book.
/// - `Ioc`: immediate-or-cancel; like a limit sweep but the residual is
///   cancelled instead of resting. The limit price is optional.
/// - `Fok`: fill-or-kill; executes the full quantity atomically or not at
///   all. The limit price is optional.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
    Ioc,
    Fok,
}
