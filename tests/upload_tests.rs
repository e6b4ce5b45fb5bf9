//! Upload pipeline tests against a scripted transport

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{HeaderMap, StatusCode};
use opplast::{
    Client, Error, InlineDispatcher, Method, MultipartPart, Transport, TransportRequest,
    TransportResponse, UploadRequest, callback,
};
use tokio::sync::mpsc;

/// What the scripted transport does with a request
#[derive(Clone)]
enum Script {
    Respond {
        status: u16,
        body: Option<&'static str>,
    },
    ConnectionRefused,
}

#[derive(Clone)]
struct ScriptedTransport {
    script: Script,
    calls: Arc<AtomicUsize>,
    captured: Arc<Mutex<Option<TransportRequest>>>,
}

impl ScriptedTransport {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            captured: Arc::new(Mutex::new(None)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn captured(&self) -> TransportRequest {
        self.captured
            .lock()
            .unwrap()
            .take()
            .expect("no request was captured")
    }
}

impl Transport for ScriptedTransport {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, opplast::Result<TransportResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.captured.lock().unwrap() = Some(request);

        let script = self.script.clone();
        Box::pin(async move {
            match script {
                Script::Respond { status, body } => {
                    let body = body.map(|text| {
                        let (tx, rx) = mpsc::channel(1);
                        if !text.is_empty() {
                            tx.try_send(Ok(Bytes::from_static(text.as_bytes()))).unwrap();
                        }
                        rx
                    });
                    Ok(TransportResponse {
                        status: StatusCode::from_u16(status).unwrap(),
                        headers: HeaderMap::new(),
                        body,
                    })
                }
                Script::ConnectionRefused => {
                    Err(Error::Network("connection refused".to_string()))
                }
            }
        })
    }
}

#[derive(Debug)]
enum Delivered {
    Success {
        status: u16,
        body: Option<String>,
    },
    Failure {
        status: i32,
        body: Option<String>,
        error: Error,
    },
}

fn capture() -> (
    Box<dyn opplast::UploadCallback>,
    mpsc::UnboundedReceiver<Delivered>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let failure_tx = tx.clone();
    let callback = callback::handlers(
        move |status, body| {
            let _ = tx.send(Delivered::Success { status, body });
        },
        move |status, body, error| {
            let _ = failure_tx.send(Delivered::Failure {
                status,
                body,
                error,
            });
        },
    );
    (callback, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Delivered>) -> Delivered {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no outcome within five seconds")
        .expect("outcome channel closed")
}

fn scripted_client(script: Script) -> (Client, ScriptedTransport) {
    let transport = ScriptedTransport::new(script);
    let client = Client::builder()
        .transport(transport.clone())
        .dispatcher(InlineDispatcher)
        .build()
        .unwrap();
    (client, transport)
}

fn fixture(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn success_is_delivered_exactly_once() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .callback(callback)
        .dispatch()
        .unwrap();

    match next(&mut rx).await {
        Delivered::Success { status, body } => {
            assert_eq!(status, 200);
            assert_eq!(body.as_deref(), Some("ok"));
        }
        other => panic!("expected success, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn http_error_is_delivered_as_failure() {
    let (client, _transport) = scripted_client(Script::Respond {
        status: 404,
        body: Some("not found"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .callback(callback)
        .dispatch()
        .unwrap();

    match next(&mut rx).await {
        Delivered::Failure {
            status,
            body,
            error,
        } => {
            assert_eq!(status, 404);
            assert_eq!(body.as_deref(), Some("not found"));
            match error {
                Error::HttpStatus { status, reason } => {
                    assert_eq!(status, 404);
                    assert_eq!(reason, "Not Found");
                }
                other => panic!("expected an HTTP status error, got {other}"),
            }
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_reports_unknown_status() {
    let (client, _transport) = scripted_client(Script::ConnectionRefused);
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .callback(callback)
        .dispatch()
        .unwrap();

    match next(&mut rx).await {
        Delivered::Failure {
            status,
            body,
            error,
        } => {
            assert_eq!(status, -1);
            assert!(body.is_none());
            assert!(matches!(error, Error::Network(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_and_empty_bodies_are_absent() {
    for script in [
        Script::Respond {
            status: 204,
            body: None,
        },
        Script::Respond {
            status: 200,
            body: Some(""),
        },
    ] {
        let (client, _transport) = scripted_client(script);
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "note.txt", b"hello");
        let (callback, mut rx) = capture();

        client
            .post("http://localhost:8080/upload", &path)
            .callback(callback)
            .dispatch()
            .unwrap();

        match next(&mut rx).await {
            Delivered::Success { body, .. } => assert!(body.is_none()),
            other => panic!("expected success, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn file_part_defaults_to_the_file_key() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"fixture payload");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .callback(callback)
        .dispatch()
        .unwrap();
    next(&mut rx).await;

    let request = transport.captured();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url, "http://localhost:8080/upload");

    let parts = request.body.parts();
    assert_eq!(parts.len(), 1);
    match &parts[0] {
        MultipartPart::File {
            name,
            path: source,
            content_type,
            file_name,
        } => {
            assert_eq!(name, "file");
            assert_eq!(std::fs::read(source).unwrap(), b"fixture payload");
            assert!(content_type.is_none());
            assert_eq!(file_name, "note.txt");
        }
        other => panic!("expected a file part, got {other:?}"),
    }
}

#[tokio::test]
async fn custom_key_and_params_are_encoded_in_order() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "data.bin", b"bytes");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .file_key("k")
        .param("a", "1")
        .param("b", "2")
        .callback(callback)
        .dispatch()
        .unwrap();
    next(&mut rx).await;

    let request = transport.captured();
    let parts = request.body.parts();
    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], MultipartPart::File { name, .. } if name == "k"));
    assert!(
        matches!(&parts[1], MultipartPart::Field { name, value } if name == "a" && value == "1")
    );
    assert!(
        matches!(&parts[2], MultipartPart::Field { name, value } if name == "b" && value == "2")
    );
}

#[tokio::test]
async fn declared_media_type_reaches_the_transport() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .content_type("text/plain")
        .callback(callback)
        .dispatch()
        .unwrap();
    next(&mut rx).await;

    let request = transport.captured();
    match &request.body.parts()[0] {
        MultipartPart::File { content_type, .. } => {
            assert_eq!(content_type.as_deref(), Some("text/plain"));
        }
        other => panic!("expected a file part, got {other:?}"),
    }
}

#[tokio::test]
async fn put_uploads_use_the_put_method() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 201,
        body: None,
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .put("http://localhost:8080/upload", &path)
        .callback(callback)
        .dispatch()
        .unwrap();
    next(&mut rx).await;

    assert_eq!(transport.captured().method, Method::PUT);
}

#[tokio::test]
async fn canonical_upload_accepts_a_prebuilt_request() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "doc.txt", b"hello");
    let (callback, mut rx) = capture();

    let request = UploadRequest::new(Method::PUT, "http://localhost:8080/upload", &path)
        .file_key("doc")
        .param("rev", "3");
    client.upload(request, callback);

    match next(&mut rx).await {
        Delivered::Success { status, .. } => assert_eq!(status, 200),
        other => panic!("expected success, got {other:?}"),
    }

    let captured = transport.captured();
    assert_eq!(captured.method, Method::PUT);
    assert!(matches!(&captured.body.parts()[0], MultipartPart::File { name, .. } if name == "doc"));
}

#[tokio::test]
async fn dispatch_without_callback_fails_synchronously() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");

    let err = client
        .post("http://localhost:8080/upload", &path)
        .dispatch()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn bad_media_type_never_reaches_the_transport() {
    let (client, transport) = scripted_client(Script::Respond {
        status: 200,
        body: Some("ok"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "note.txt", b"hello");
    let (callback, mut rx) = capture();

    client
        .post("http://localhost:8080/upload", &path)
        .content_type("plainly bogus")
        .callback(callback)
        .dispatch()
        .unwrap();

    match next(&mut rx).await {
        Delivered::Failure {
            status,
            body,
            error,
        } => {
            assert_eq!(status, -1);
            assert!(body.is_none());
            assert!(matches!(error, Error::Encoding(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn concurrent_uploads_stay_independent() {
    let (client_a, transport_a) = scripted_client(Script::Respond {
        status: 201,
        body: Some("first"),
    });
    let (client_b, transport_b) = scripted_client(Script::Respond {
        status: 404,
        body: Some("second"),
    });
    let dir = tempfile::tempdir().unwrap();
    let path_a = fixture(&dir, "a.txt", b"payload a");
    let path_b = fixture(&dir, "b.txt", b"payload b");
    let (callback_a, mut rx_a) = capture();
    let (callback_b, mut rx_b) = capture();

    client_a
        .post("http://localhost:8080/a", &path_a)
        .callback(callback_a)
        .dispatch()
        .unwrap();
    client_b
        .post("http://localhost:8080/b", &path_b)
        .callback(callback_b)
        .dispatch()
        .unwrap();

    match next(&mut rx_a).await {
        Delivered::Success { status, body } => {
            assert_eq!(status, 201);
            assert_eq!(body.as_deref(), Some("first"));
        }
        other => panic!("expected success, got {other:?}"),
    }
    match next(&mut rx_b).await {
        Delivered::Failure { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body.as_deref(), Some("second"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(transport_a.calls(), 1);
    assert_eq!(transport_b.calls(), 1);

    let captured_a = transport_a.captured();
    let captured_b = transport_b.captured();
    assert_eq!(captured_a.url, "http://localhost:8080/a");
    assert_eq!(captured_b.url, "http://localhost:8080/b");
}
