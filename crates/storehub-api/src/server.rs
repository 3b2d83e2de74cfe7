//! hyper transport for the [`Router`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::http::{Method, Request, Response, Router};
use crate::state::AppState;

/// Accepts connections on `addr` and serves `router` until the listener fails.
///
/// # Errors
///
/// Returns an error if binding `addr` or accepting a connection fails.
pub async fn serve(addr: SocketAddr, router: Router<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    let router = Arc::new(router);
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = Arc::clone(&router);
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(peer = %peer, error = %err, "Error serving connection");
            }
        });
    }
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: Arc<Router<AppState>>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let method = req.method().as_str().parse::<Method>();
    let res = match method {
        Ok(method) => {
            let mut api_req = Request::new(method, req.uri().path());
            if let Some(query) = req.uri().query() {
                api_req.query = Request::parse_query_string(query);
            }
            for (key, value) in req.headers() {
                if let Ok(v) = value.to_str() {
                    api_req.headers.insert(key.to_string(), v.to_string());
                }
            }
            match req.collect().await {
                Ok(body) => {
                    api_req.body = body.to_bytes().to_vec();
                    router.handle(api_req).await
                }
                Err(err) => {
                    warn!(error = %err, "Failed to read request body");
                    Response::error(400, "Failed to read request body")
                }
            }
        }
        Err(err) => err.to_response(false),
    };

    Ok(into_hyper(res))
}

fn into_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut builder = HyperResponse::builder()
        .status(StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(Bytes::from(res.body)))
        .unwrap_or_else(|err| {
            error!(error = %err, "Invalid response");
            let mut fallback = HyperResponse::new(Full::new(Bytes::from_static(
                br#"{"error":"Internal server error"}"#,
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
