// handlers/public/mod.rs - Public handlers (no principal required)
//
// Sign-up/sign-in, the page gate, the public job board and location hints.
// The principal is still resolved for these routes so pages can show chrome
// and the job board can mark jobs a student already applied to.

pub mod auth;
pub mod jobs;
pub mod locations;
pub mod pages;
