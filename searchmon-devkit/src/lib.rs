/*!
# searchmon DevKit - stubs and helpers for testing without Redis

- Scripted store connector ([`MockStore`]) recording every call
- `FT.INFO` reply builders shaped like RediSearch RESP2 replies
- [`FleetHarness`] wiring the scripted store into the real collector
*/

pub mod reply_helpers;
pub mod store_stub;
pub mod test_utils;

pub use reply_helpers::{bulk, FtInfoReply};
pub use store_stub::{InstanceScript, MockStore, StoreEvent, UNKNOWN_COMMAND, UNKNOWN_INDEX};
pub use test_utils::{expect_error, expect_success, FleetHarness};
