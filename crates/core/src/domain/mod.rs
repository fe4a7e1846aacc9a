pub mod decision;
pub mod event;
pub mod product;
pub mod recommendation;
pub mod user;
pub mod weather;
