pub mod edit;
pub mod health;
pub mod images;
pub mod pages;
