// handlers - two security tiers
//
// Public (no token) → Protected (bearer token with a scoped permission)
pub mod public;
pub mod protected;
