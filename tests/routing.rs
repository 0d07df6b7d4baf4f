//! Request-time routing behaviour of a full `Horus` instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use horus::{factory, Error, Horus, MethodMatch, RunOptions, Shutdown};

mod common;

#[test]
fn test_normalized_facts() {
    let horus = factory(common::request("get", "//users//42?page=2&x=//y", "example.com:8080"));
    let facts = horus.facts();

    assert_eq!(facts.method, "GET");
    assert_eq!(facts.hostname, "example.com");
    assert_eq!(facts.path, "/users/42/");
}

#[test]
fn test_method_token_and_captures() {
    let mut horus = factory(common::request("GET", "/users/42/", "example.com"));
    let mut seen = Vec::new();

    horus
        .router()
        .on("GET /users/(\\d+)", |_, caps| {
            seen.push(caps.get(0).map(str::to_string));
            Ok(())
        })
        .unwrap();

    assert_eq!(seen, vec![Some("42".to_string())]);
}

#[test]
fn test_route_without_token_follows_request_method() {
    for method in ["GET", "POST"] {
        let mut horus = factory(common::request(method, "/users", "example.com"));
        let mut fired = Vec::new();

        horus
            .router()
            .on("users", |ctx, _| {
                fired.push(format!("any:{}", ctx.method()));
                Ok(())
            })
            .unwrap()
            .on("GET users", |_, _| {
                fired.push("get".to_string());
                Ok(())
            })
            .unwrap();

        match method {
            "GET" => assert_eq!(fired, vec!["any:GET", "get"]),
            _ => assert_eq!(fired, vec!["any:POST"]),
        }
    }
}

#[test]
fn test_group_prefix_is_restored() {
    let mut horus = factory(common::request("GET", "/api/users/", "example.com"));
    let mut fired = Vec::new();

    horus
        .router()
        .group("api", |api, _| {
            api.on("users", |_, _| {
                fired.push("h");
                Ok(())
            })?;
            Ok(())
        })
        .unwrap()
        .on("users", |_, _| {
            fired.push("h2");
            Ok(())
        })
        .unwrap();

    assert_eq!(fired, vec!["h"]);
}

#[test]
fn test_group_prefix_is_restored_after_failure() {
    let mut horus = factory(common::request("GET", "/api/users/", "example.com"));
    let mut router = horus.router();

    let failed = router
        .group("api", |api, _| {
            api.on("users", |_, _| Err("handler blew up".into()))?;
            Ok(())
        })
        .is_err();
    assert!(failed);
    assert_eq!(router.prefix(), "/");

    let mut sibling = false;
    router
        .on("api/users", |_, _| {
            sibling = true;
            Ok(())
        })
        .unwrap();
    assert!(sibling);
}

#[test]
fn test_vhost_dispatch() {
    let mut hits = Vec::new();
    for host in ["admin.example.com", "www.example.com:443"] {
        let mut horus = factory(common::request("GET", "/", host));
        horus
            .router()
            .vhost("admin\\.example\\.com", |_, caps| {
                hits.push((host, caps.len()));
                Ok(())
            })
            .unwrap();
    }

    assert_eq!(hits, vec![("admin.example.com", 0)]);
}

#[test]
fn test_no_first_match_wins() {
    let mut horus = factory(common::request("GET", "/users", "example.com"));
    let mut fired = Vec::new();

    horus
        .router()
        .on("users", |_, _| {
            fired.push("h1");
            Ok(())
        })
        .unwrap()
        .on("users", |_, _| {
            fired.push("h2");
            Ok(())
        })
        .unwrap()
        .group("/", |root, _| {
            root.on("(\\w+)", |_, _| {
                fired.push("h3");
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    assert_eq!(fired, vec!["h1", "h2", "h3"]);
}

#[test]
fn test_exact_method_mode() {
    let options = RunOptions {
        method_match: MethodMatch::Exact,
        ..RunOptions::default()
    };
    let mut horus = Horus::with_options(common::request("GET", "/users", "example.com"), options);
    let mut fired = Vec::new();

    horus
        .router()
        .on("G users", |_, _| {
            fired.push("partial");
            Ok(())
        })
        .unwrap()
        .on("get users", |_, _| {
            fired.push("exact");
            Ok(())
        })
        .unwrap();

    assert_eq!(fired, vec!["exact"]);
}

#[tokio::test]
async fn test_app_runs_only_after_body_end() {
    let (tx, body) = common::streaming_body();
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("host", "example.com")
        .body(body)
        .unwrap();

    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let task = tokio::spawn(Horus::new(request).run(move |ctx| {
        flag.store(true, Ordering::SeqCst);
        let len = ctx.body().map(|b| b.len()).unwrap_or_default();
        ctx.reply().write_str(&len.to_string());
        Ok(())
    }));

    tx.send(Ok(Bytes::from_static(b"part one "))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!called.load(Ordering::SeqCst), "app ran before the body ended");

    tx.send(Ok(Bytes::from_static(b"part two"))).await.unwrap();
    drop(tx);

    let response = task.await.unwrap().unwrap();
    assert!(called.load(Ordering::SeqCst));
    assert_eq!(common::body_string(response).await, "17");
}

#[tokio::test]
async fn test_layers_run_before_app() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut horus = factory(common::request("GET", "/", "example.com"));

    for name in ["auth", "log"] {
        let order = order.clone();
        horus.layers().bind(move |_| {
            order.lock().unwrap().push(name);
            Ok(())
        });
    }

    let app_order = order.clone();
    let response = horus
        .run(move |ctx| {
            app_order.lock().unwrap().push("app");
            ctx.reply().status(StatusCode::NO_CONTENT);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(*order.lock().unwrap(), vec!["auth", "log", "app"]);
}

#[tokio::test]
async fn test_shutdown_cancels_pending_body() {
    let (tx, body) = common::streaming_body();
    let request = Request::builder()
        .method("PUT")
        .uri("/")
        .header("host", "example.com")
        .body(body)
        .unwrap();

    let shutdown = Shutdown::new();
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let task = tokio::spawn(Horus::new(request).run_until(
        move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        },
        shutdown.signal(),
    ));

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.trigger();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!called.load(Ordering::SeqCst));
    drop(tx);
}

#[tokio::test]
async fn test_body_timeout() {
    let (_tx, body) = common::streaming_body();
    let request = Request::builder()
        .uri("/")
        .header("host", "example.com")
        .body(body)
        .unwrap();

    let options = RunOptions {
        body_timeout: Some(Duration::from_millis(30)),
        ..RunOptions::default()
    };
    let result = Horus::with_options(request, options).run(|_| Ok(())).await;
    assert!(matches!(result, Err(Error::BodyTimeout(_))));
}

#[tokio::test]
async fn test_body_is_exposed_to_app() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("host", "example.com")
        .body(Body::from("raw bytes"))
        .unwrap();

    let response = Horus::new(request)
        .run(|ctx| {
            let body = ctx.body().cloned().unwrap_or_default();
            ctx.reply().write(&body);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(common::body_string(response).await, "raw bytes");
}

#[tokio::test]
async fn test_large_body_still_reaches_app() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("host", "example.com")
        .body(Body::from(vec![b'x'; 2 * 1024 * 1024]))
        .unwrap();

    let mut body_kept = None;
    let response = Horus::new(request)
        .run(|ctx| {
            body_kept = Some(ctx.body().is_some());
            ctx.reply().status(StatusCode::ACCEPTED);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_kept, Some(false));
}

#[tokio::test]
async fn test_request_started_after_shutdown_is_cancelled() {
    let (_tx, body) = common::streaming_body();
    let request = Request::builder()
        .method("PUT")
        .uri("/")
        .header("host", "example.com")
        .body(body)
        .unwrap();

    let shutdown = Shutdown::new();
    shutdown.trigger();

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        Horus::new(request).run_until(|_| Ok(()), shutdown.signal()),
    )
    .await
    .expect("stalled body should not outlive shutdown");
    assert!(matches!(result, Err(Error::Cancelled)));
}
