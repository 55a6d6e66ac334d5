//! Remote client for the blocking target's HTTP surface (§4.F).

pub mod remote;

pub use remote::RemoteClient;
