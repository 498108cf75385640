/*!
# Overclouded DevKit - Stubs and helpers for kernel development

Library for exercising the acquisition kernel without a cloud account:
- Stub fetcher standing in for the management API
- Builders for management API payloads
- Harness with a fixed clock and JSON-level assertions
*/

pub mod fetch_stub;
pub mod fixtures;
pub mod test_utils;

pub use fetch_stub::StubFetcher;
pub use fixtures::{list, routes, ArmFixture};
pub use test_utils::TestHarness;
