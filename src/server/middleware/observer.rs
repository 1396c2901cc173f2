//! Exchange capture middleware

use crate::core::capture::ResponseCapture;
use crate::core::observer::{Exchange, Observer};
use actix_web::HttpMessage;
use actix_web::body::{BodySize, MessageBody};
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{self, HeaderMap};
use bytes::Bytes;
use futures::future::{Ready, ready};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

const EVENT_STREAM: &str = "text/event-stream";

/// Captures every exchange passing through the wrapped service
#[derive(Debug, Clone)]
pub struct ObserverMiddleware {
    observer: Arc<Observer>,
}

impl ObserverMiddleware {
    pub fn new(observer: Arc<Observer>) -> Self {
        Self { observer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ObserverMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<CaptureBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ObserverMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ObserverMiddlewareService {
            service,
            observer: self.observer.clone(),
        }))
    }
}

/// Service implementation for the observer middleware
pub struct ObserverMiddlewareService<S> {
    service: S,
    observer: Arc<Observer>,
}

impl<S, B> Service<ServiceRequest> for ObserverMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<CaptureBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let remote_addr = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        let exchange = self.observer.begin(
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
            &remote_addr,
        );

        let Some(exchange) = exchange else {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_body(|_, body| CaptureBody::passthrough(body)))
            });
        };

        let reader = exchange.wrap_reader(req.take_payload());
        let payload: Payload = Payload::Stream {
            payload: Box::pin(reader),
        };
        req.set_payload(payload);

        let observer = self.observer.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = match fut.await {
                Ok(res) => res,
                Err(err) => {
                    // record what the client will see for the error
                    let response = err.error_response();
                    let mut capture = exchange.response_capture();
                    capture.set_status(response.status());
                    observer.complete(exchange, response.headers(), capture);
                    return Err(err);
                }
            };

            if is_event_stream(res.headers()) {
                return Ok(res.map_body(|_, body| CaptureBody::passthrough(body)));
            }

            let mut capture = exchange.response_capture();
            capture.set_status(res.status());
            let completion = Completion {
                observer,
                exchange,
                response_headers: res.headers().clone(),
                capture,
            };

            Ok(res.map_body(move |_, body| CaptureBody::new(body, completion)))
        })
    }
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(EVENT_STREAM))
}

/// Pending record, emitted once the response body is finished or dropped
struct Completion {
    observer: Arc<Observer>,
    exchange: Exchange,
    response_headers: HeaderMap,
    capture: ResponseCapture,
}

impl Completion {
    fn finish(self) {
        self.observer
            .complete(self.exchange, &self.response_headers, self.capture);
    }
}

pin_project! {
    /// Response body that forwards chunks unchanged while recording them
    pub struct CaptureBody<B> {
        #[pin]
        body: B,
        completion: Option<Completion>,
    }

    impl<B> PinnedDrop for CaptureBody<B> {
        fn drop(this: Pin<&mut Self>) {
            // client went away before the body finished
            if let Some(completion) = this.project().completion.take() {
                completion.finish();
            }
        }
    }
}

impl<B> CaptureBody<B> {
    fn new(body: B, completion: Completion) -> Self {
        Self {
            body,
            completion: Some(completion),
        }
    }

    fn passthrough(body: B) -> Self {
        Self {
            body,
            completion: None,
        }
    }
}

impl<B: MessageBody> MessageBody for CaptureBody<B> {
    type Error = B::Error;

    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        let this = self.project();

        match this.body.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(completion) = this.completion.as_mut() {
                    completion.capture.record(&chunk);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                if let Some(completion) = this.completion.take() {
                    completion.finish();
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }
}
