//! Resource endpoints: accounts, communities, events, journals, submissions,
//! transactions.
//!
//! Every handler receives the caller's claims explicitly (where the route is
//! protected) and runs the role/ownership policy before touching the store.

pub mod communities;
pub mod events;
pub mod journals;
pub mod submissions;
pub mod transactions;
pub mod users;
