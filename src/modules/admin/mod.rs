mod seed;

pub use seed::seed_admin_if_needed;
