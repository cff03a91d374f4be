pub mod analytics;
pub mod bundles;
pub mod companies;
pub mod courses;
pub mod orders;
