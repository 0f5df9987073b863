pub mod alquran_cloud;
pub mod muslim_salat;

pub use alquran_cloud::AlQuranCloudClient;
pub use muslim_salat::MuslimSalatClient;
