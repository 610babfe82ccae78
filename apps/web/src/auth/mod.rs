// Google sign-in: consent redirect, callback handling and role-based landing page.
// The backend API owns the token exchange; this service only relays the code.

pub mod handlers;
pub mod messages;
pub mod oauth;
