// handlers/protected - endpoints behind the permission guard
//
// Each route is wrapped with `require_permission`, which validates the bearer
// token and injects the verified `Claims` as a request extension before the
// handler runs.

pub mod drinks;

pub use drinks::create as create_drink;
pub use drinks::delete as delete_drink;
pub use drinks::detail as drinks_detail;
pub use drinks::update as update_drink;
