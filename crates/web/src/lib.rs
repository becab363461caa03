mod error;
mod handler;
mod processor;
mod resource;
mod server;

pub mod router;

pub use error::ProcessError;
pub use handler::handler_fn;
pub use handler::BoxError;
pub use handler::Handler;
pub use handler::HandlerFn;
pub use processor::RequestProcessor;
pub use resource::ResourceError;
pub use resource::StaticResources;
pub use resource::StaticResourcesBuilder;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
