pub mod deal;
pub mod profile;

pub use deal::DealRepository;
pub use profile::ProfileRepository;
