pub mod assets;
pub mod collect;
pub mod guards;
pub mod health;
pub mod profiles;
