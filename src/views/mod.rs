//! Page logic behind the UI surfaces: listing, application form, and the
//! shelter dashboard. Markup, routing wiring, and styling live elsewhere;
//! these types hold the request/response behavior worth testing.

pub mod apply;
pub mod dashboard;
pub mod pets;
