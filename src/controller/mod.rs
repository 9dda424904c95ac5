pub use features::FeatureController;
pub use server::ServerController;

mod features;
mod server;
