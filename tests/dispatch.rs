//! End-to-end dispatch behaviour through the public API.

use verb_router::{Lookup, ParamValue, Pattern, PatternOptions};

mod common;

fn pattern(source: &str) -> Pattern {
    Pattern::new(source, &PatternOptions::default()).unwrap()
}

fn found_name(lookup: &Lookup<()>) -> Option<String> {
    lookup.route().map(|route| route.name().to_string())
}

#[test]
fn test_build_then_match_recovers_values() {
    let p = pattern("/users/<user>/posts/<post>.json");
    let values = common::params(&[("user", "john doe"), ("post", "a/b ё")]);

    let path = p.build(&values);
    assert_eq!(path, "/users/john%20doe/posts/a%2Fb%20%D1%91.json");
    assert_eq!(p.matches(&path), Some(values));
}

#[test]
fn test_start_anchor_flag() {
    let anchored = pattern("/api/<version>");
    let floating = pattern("/api/<version> s");

    assert!(anchored.matches("/mount/api/v1").is_none());

    let params = floating.matches("/mount/api/v1").unwrap();
    assert_eq!(params["version"], ParamValue::from("v1"));
}

#[test]
fn test_end_anchor_flag() {
    assert!(pattern("/static/").matches("/static/app.js").is_none());
    assert!(pattern("/static/ e").matches("/static/app.js").is_some());
}

#[test]
fn test_case_insensitive_accepts_any_escape_case() {
    let tolerant = pattern("/café/ i");
    for path in ["/café/", "/CAFÉ/", "/caf%C3%A9/", "/caf%c3%a9/", "/CAF%C3%A9/"] {
        assert!(tolerant.matches(path).is_some(), "{path} should match");
    }

    let strict = pattern("/café/");
    assert!(strict.matches("/café/").is_some());
    assert!(strict.matches("/caf%C3%A9/").is_some());
    assert!(strict.matches("/caf%c3%a9/").is_none());
    assert!(strict.matches("/CAFÉ/").is_none());
}

#[test]
fn test_repeated_parameter_collects_sequence() {
    let p = pattern("/compare/<id>/<id>/");
    let params = p.matches("/compare/10/20/").unwrap();
    assert_eq!(params["id"], ParamValue::from(vec!["10", "20"]));

    assert_eq!(p.build(&params), "/compare/10/20/");
}

#[test]
fn test_restricted_parameter() {
    let p = pattern("/feed.<format=rss,atom>");
    assert_eq!(
        p.matches("/feed.atom").unwrap()["format"],
        ParamValue::from("atom")
    );
    assert!(p.matches("/feed.json").is_none());
}

#[test]
fn test_optional_group() {
    let p = pattern("/news/(<page>/)");
    assert!(p.matches("/news/").unwrap().is_empty());
    assert_eq!(
        p.matches("/news/3/").unwrap()["page"],
        ParamValue::from("3")
    );
}

#[test]
fn test_unregistered_verb_is_rejected() {
    let router = common::router(&[("/any", "any"), ("POST /any", "post")]);

    match router.find("PATCH", "/any", None) {
        Lookup::MethodNotAllowed(allow) => assert!(allow.is_empty()),
        other => panic!("expected empty allow list, got {other:?}"),
    }
}

#[test]
fn test_allow_list_for_wrong_method() {
    let router = common::router(&[
        ("GET /x", "a"),
        ("POST /x", "b"),
        ("POST,PUT /y", "c"),
        ("GET,POST /x", "d"),
    ]);

    match router.find("PUT", "/x", None) {
        Lookup::MethodNotAllowed(allow) => assert_eq!(allow, ["GET", "HEAD", "POST"]),
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
    assert!(matches!(router.find("PUT", "/z", None), Lookup::NotFound));
}

#[test]
fn test_upsert_moves_route_to_end() {
    let mut router = common::router(&[("/a", "r"), ("/c", "other")]);
    router.add_route("/b", Some("r"), ()).unwrap();

    let names: Vec<&str> = router.routes().map(|route| route.name()).collect();
    assert_eq!(names, ["other", "r"]);
    assert_eq!(found_name(&router.find("GET", "/b", None)).as_deref(), Some("r"));
    assert!(matches!(router.find("GET", "/a", None), Lookup::NotFound));
}

#[test]
fn test_continuation_walks_every_match() {
    let router = common::router(&[("/p", "r1"), ("POST /p", "skip"), ("* /p", "r2")]);

    let first = router.find("GET", "/p", None);
    assert_eq!(found_name(&first).as_deref(), Some("r1"));

    let second = router.find("GET", "/p", Some("r1"));
    assert_eq!(found_name(&second).as_deref(), Some("r2"));

    assert!(matches!(router.find("GET", "/p", Some("r2")), Lookup::NotFound));
    assert!(matches!(router.find("GET", "/p", Some("nope")), Lookup::NotFound));

    let all: Vec<String> = router
        .find_all("GET", "/p")
        .into_iter()
        .map(|(route, _)| route.name().to_string())
        .collect();
    assert_eq!(all, ["r1", "r2"]);
}

#[test]
fn test_head_follows_get() {
    let router = common::router(&[("/page", "page")]);
    assert!(router.find("HEAD", "/page", None).is_found());
    assert_eq!(router.allowed_verbs("/page"), ["GET", "HEAD"]);
}

#[test]
fn test_url_generation_by_name() {
    let router = common::router(&[("/archive/<year>/(<month>/)", "archive")]);

    let values = common::params(&[("year", "2024"), ("month", "05")]);
    assert_eq!(
        router.build("archive", &values).as_deref(),
        Some("/archive/2024/05/")
    );

    // the group's static text is emitted even without its parameter
    let values = common::params(&[("year", "2024")]);
    assert_eq!(
        router.build("archive", &values).as_deref(),
        Some("/archive/2024//")
    );
}
