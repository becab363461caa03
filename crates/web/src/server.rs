//! TCP front end.
//!
//! The accept loop runs on tokio. Each accepted connection is handed to a
//! blocking thread where [`RequestProcessor::respond`] reads the request with
//! plain blocking I/O, bounded by the read timeout. The response is then
//! written back through a [`FramedWrite`] with the [`ResponseEncoder`] and the
//! connection is shut down: one request per connection.

use std::io::{self, BufReader};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use futures::SinkExt;
use jwp_http::codec::{ReaderConfig, ResponseEncoder};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, info, warn};

use crate::processor::RequestProcessor;
use crate::resource::StaticResources;
use crate::router::Router;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    router: Option<Arc<Router>>,
    resources: Option<Arc<StaticResources>>,
    read_timeout: Option<Duration>,
    reader_config: ReaderConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            address: None,
            router: None,
            resources: None,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            reader_config: ReaderConfig::default(),
        }
    }

    pub fn bind<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn router(mut self, router: impl Into<Arc<Router>>) -> Self {
        self.router = Some(router.into());
        self
    }

    pub fn resources(mut self, resources: impl Into<Arc<StaticResources>>) -> Self {
        self.resources = Some(resources.into());
        self
    }

    /// Upper bound for every blocking read on a connection, `None` waits forever.
    ///
    /// A peer that stalls longer than this gets the 500 page.
    pub fn read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn reader_config(mut self, reader_config: ReaderConfig) -> Self {
        self.reader_config = reader_config;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = match self.address {
            None => return Err(ServerBuildError::MissingAddress),
            Some(Err(e)) => return Err(ServerBuildError::InvalidAddress { source: e }),
            Some(Ok(address)) if address.is_empty() => {
                return Err(ServerBuildError::InvalidAddress { source: io::Error::new(io::ErrorKind::InvalidInput, "no socket address resolved") });
            }
            Some(Ok(address)) => address,
        };
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let resources = self.resources.ok_or(ServerBuildError::MissingResources)?;

        let processor = RequestProcessor::new(router, resources).with_config(self.reader_config);
        Ok(Server { address, processor, read_timeout: self.read_timeout })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("static resources must be set")]
    MissingResources,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

#[derive(Debug)]
pub struct Server {
    address: Vec<SocketAddr>,
    processor: RequestProcessor,
    read_timeout: Option<Duration>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn processor(&self) -> &RequestProcessor {
        &self.processor
    }

    /// Binds the configured address and serves until the process exits.
    pub async fn start(self) {
        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        self.serve(tcp_listener).await;
    }

    /// Serves connections accepted on an already bound listener.
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let processor = self.processor.clone();
            let read_timeout = self.read_timeout;

            tokio::spawn(async move {
                match serve_connection(processor, tcp_stream, read_timeout).await {
                    Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "connection failed"),
                }
            });
        }
    }
}

async fn serve_connection(processor: RequestProcessor, tcp_stream: TcpStream, read_timeout: Option<Duration>) -> io::Result<()> {
    let std_stream = tcp_stream.into_std()?;
    std_stream.set_nonblocking(false)?;
    std_stream.set_read_timeout(read_timeout)?;

    let (response, std_stream) = tokio::task::spawn_blocking(move || {
        let response = processor.respond(BufReader::new(&std_stream));
        (response, std_stream)
    })
    .await
    .map_err(io::Error::other)?;

    std_stream.set_nonblocking(true)?;
    let mut framed = FramedWrite::new(TcpStream::from_std(std_stream)?, ResponseEncoder);
    framed.send(response).await?;
    framed.into_inner().shutdown().await
}
