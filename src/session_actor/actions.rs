//! Step transitions for the Session actor. Each action returns the session as it is afterwards.

use crate::model::OrderId;

#[derive(Debug, Clone)]
pub enum SessionAction {
    /// `Idle -> AwaitingPickup`, binding the freshly created order.
    BeginOrder(OrderId),
    /// One step forward through pickup, dropoff and contact.
    Advance,
    /// `AwaitingComment -> Idle`. Unbinds the order and remembers `contact`.
    CompleteOrder { contact: String },
    /// `Idle -> AwaitingFreeformQuestion`.
    BeginQuestion,
    /// `AwaitingFreeformQuestion -> Idle`.
    FinishQuestion,
    /// Any step `-> Idle`. The bound order, if any, is left as it is.
    Reset,
}
