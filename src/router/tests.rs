use super::{
    LinearMatcher, MatchEngine, MatchOutcome, PathLookup, PathMatcher, PathResolver,
    SegmentCache,
};
use crate::runtime_config::ResolverConfig;
use crate::spec::{Contract, ContractError, PathItem, Paths, Server};
use http::Method;
use std::sync::Arc;

fn item(methods: &[Method]) -> Arc<PathItem> {
    Arc::new(
        methods
            .iter()
            .fold(PathItem::default(), |item, m| item.with_method(m.clone())),
    )
}

fn contract(servers: &[&str], templates: &[(&str, &[Method])]) -> Arc<Contract> {
    let paths: Paths = templates
        .iter()
        .map(|(t, methods)| (t.to_string(), item(methods)))
        .collect();
    Arc::new(Contract {
        title: "test".into(),
        version: "1.0.0".into(),
        servers: servers.iter().map(|s| Server::new(*s)).collect(),
        paths: Some(paths),
    })
}

fn resolver(templates: &[(&str, &[Method])]) -> PathResolver {
    PathResolver::new(contract(&[], templates)).unwrap()
}

fn linear_only(contract: Arc<Contract>) -> PathResolver {
    let config = ResolverConfig {
        indexed_lookup: false,
        ..ResolverConfig::default()
    };
    PathResolver::with_config(contract, config).unwrap()
}

const GET: &[Method] = &[Method::GET];

#[test]
fn test_missing_paths_is_a_contract_error() {
    let contract = Arc::new(Contract {
        title: "empty".into(),
        ..Contract::default()
    });
    let err = PathResolver::new(contract).unwrap_err();
    assert_eq!(
        err,
        ContractError::MissingPaths {
            title: "empty".into()
        }
    );
}

#[test]
fn test_empty_paths_resolve_to_not_found() {
    let resolver = resolver(&[]);
    let resolution = resolver.resolve(&Method::GET, "/anything");
    assert!(!resolution.is_match());
    assert!(resolution.errors[0].is_path_missing());
    assert_eq!(resolution.engine, MatchEngine::Unmatched);
}

#[test]
fn test_literal_precedence_both_orders() {
    for templates in [
        [("/Messages/{id}", GET), ("/Messages/Operations", GET)],
        [("/Messages/Operations", GET), ("/Messages/{id}", GET)],
    ] {
        let resolver = resolver(&templates);
        let resolution = resolver.resolve(&Method::GET, "/Messages/Operations");
        assert!(resolution.is_match());
        assert_eq!(
            resolution.matched_template.as_deref(),
            Some("/Messages/Operations")
        );
        assert_eq!(resolution.engine, MatchEngine::Indexed);
    }
}

#[test]
fn test_tie_break_by_declaration_order() {
    let resolver = resolver(&[("/pets/{petId}", GET), ("/pets/{petName}", GET)]);
    let resolution = resolver.resolve(&Method::GET, "/pets/fluffy");
    assert_eq!(resolution.matched_template.as_deref(), Some("/pets/{petId}"));
}

#[test]
fn test_monotonic_specificity() {
    let resolver = resolver(&[
        ("/api/{version}/users/{id}", GET),
        ("/api/v1/users/{id}", GET),
        ("/api/v1/users/me", GET),
    ]);
    let cases = [
        ("/api/v1/users/me", "/api/v1/users/me"),
        ("/api/v1/users/123", "/api/v1/users/{id}"),
        ("/api/v2/users/123", "/api/{version}/users/{id}"),
    ];
    for (path, expected) in cases {
        let resolution = resolver.resolve(&Method::GET, path);
        assert_eq!(resolution.matched_template.as_deref(), Some(expected), "{path}");
    }
}

#[test]
fn test_method_miss_reports_literal_template() {
    let resolver = resolver(&[("/pets/{id}", GET), ("/pets/mine", GET)]);
    let resolution = resolver.resolve(&Method::PATCH, "/pets/mine");
    assert!(!resolution.is_match());
    assert_eq!(resolution.matched_template.as_deref(), Some("/pets/mine"));
    let error = &resolution.errors[0];
    assert!(error.is_operation_missing());
    assert_eq!(error.spec_path.as_deref(), Some("/pets/mine"));
    assert!(resolution.path_item.is_some());
}

#[test]
fn test_method_present_on_less_specific_template() {
    let resolver = resolver(&[("/pets/mine", GET), ("/pets/{id}", &[Method::DELETE])]);
    let resolution = resolver.resolve(&Method::DELETE, "/pets/mine");
    assert!(resolution.is_match());
    assert_eq!(resolution.matched_template.as_deref(), Some("/pets/{id}"));
    assert_eq!(resolution.engine, MatchEngine::Linear);
}

#[test]
fn test_base_path_round_trip() {
    let contract = contract(&["https://x.com/base3/base4/base5/base6/"], &[("/user", GET)]);
    let resolver = PathResolver::new(contract).unwrap();
    let resolution =
        resolver.resolve(&Method::GET, "https://x.com/base3/base4/base5/base6/user");
    assert!(resolution.is_match());
    assert_eq!(resolution.matched_template.as_deref(), Some("/user"));
}

#[test]
fn test_errors_carry_unstripped_path() {
    let contract = contract(&["https://x.com/api"], &[("/user", GET)]);
    let resolver = PathResolver::new(contract).unwrap();
    let resolution = resolver.resolve(&Method::GET, "https://x.com/api/nobody");
    assert_eq!(resolution.errors[0].request_path, "/api/nobody");
    assert!(resolution.errors[0].message.contains("/api/nobody"));
}

#[test]
fn test_fragment_symmetry() {
    let resolver = resolver(&[
        ("/hashy#one", GET),
        ("/hashy#two", &[Method::POST]),
        ("/other#section", GET),
    ]);

    let one = resolver.resolve(&Method::GET, "https://x.com/hashy#one");
    assert_eq!(one.matched_template.as_deref(), Some("/hashy#one"));
    assert!(one.is_match());

    let stripped = resolver.resolve(&Method::GET, "https://x.com/other");
    assert_eq!(stripped.matched_template.as_deref(), Some("/other#section"));

    let crossed = resolver.resolve(&Method::POST, "https://x.com/hashy#one");
    assert!(!crossed.is_match());
    assert_eq!(crossed.matched_template.as_deref(), Some("/hashy#one"));
    assert!(crossed.errors[0].is_operation_missing());
}

#[test]
fn test_odata_and_malformed_templates() {
    let resolver = resolver(&[
        ("/entities('{Entity'", GET),
        ("/entities('{Entity}')", GET),
        ("/other", GET),
    ]);
    assert_eq!(resolver.malformed_templates().len(), 1);
    assert_eq!(
        resolver.malformed_templates()[0].template,
        "/entities('{Entity'"
    );

    for path in ["/entities('1')", "/entities('dummy')"] {
        let resolution = resolver.resolve(&Method::GET, path);
        assert_eq!(
            resolution.matched_template.as_deref(),
            Some("/entities('{Entity}')"),
            "{path}"
        );
        assert_eq!(resolution.engine, MatchEngine::Linear);
    }
    assert!(resolver.resolve(&Method::GET, "/other").is_match());
}

#[test]
fn test_no_candidate_path() {
    let resolver = resolver(&[("/a/fishy/on/a/dishy", GET)]);
    let resolution = resolver.resolve(&Method::GET, "/not/here");
    assert!(resolution.path_item.is_none());
    assert!(resolution.matched_template.is_none());
    let error = &resolution.errors[0];
    assert!(error.is_path_missing());
    assert!(error.message.contains("/not/here"));
    assert!(error.message.contains("GET"));
    assert!(error.location.is_none());
}

#[test]
fn test_idempotent_resolution() {
    let resolver = resolver(&[
        ("/entities('{Entity}')", GET),
        ("/pets/{id}", GET),
        ("/pets/mine", GET),
    ]);
    for path in ["/entities('7')", "/pets/mine", "/pets/3", "/nowhere"] {
        let first = resolver.resolve(&Method::GET, path);
        for _ in 0..5 {
            let again = resolver.resolve(&Method::GET, path);
            assert_eq!(again.matched_template, first.matched_template);
            assert_eq!(again.errors, first.errors);
            assert_eq!(again.engine, first.engine);
        }
    }
}

#[test]
fn test_cache_disabled_resolves_identically() {
    let templates: &[(&str, &[Method])] = &[
        ("/entities('{Entity}')", GET),
        ("/colors/{.color}", GET),
        ("/pets/{id}", GET),
    ];
    let cached = PathResolver::new(contract(&[], templates)).unwrap();
    let uncached = PathResolver::with_config(
        contract(&[], templates),
        ResolverConfig {
            segment_cache: false,
            precompile: false,
            ..ResolverConfig::default()
        },
    )
    .unwrap();
    assert!(uncached.cache().is_none());
    for path in ["/entities('1')", "/colors/.red", "/pets/9", "/x"] {
        let a = cached.resolve(&Method::GET, path);
        let b = uncached.resolve(&Method::GET, path);
        assert_eq!(a.matched_template, b.matched_template, "{path}");
    }
}

#[test]
fn test_shared_cache_is_warmed_by_precompile() {
    let cache = SegmentCache::new();
    let _resolver = PathResolver::with_cache(
        contract(&[], &[("/pets/{id}", GET), ("/entities('{E}')", GET)]),
        ResolverConfig::default(),
        cache.clone(),
    )
    .unwrap();
    assert_eq!(cache.size(), 3);
}

#[test]
fn test_resolve_request() {
    let resolver = resolver(&[("/pets/{id}", GET)]);
    let request = http::Request::get("/pets/5?verbose=true").body(()).unwrap();
    let resolution = resolver.resolve_request(&request);
    assert!(resolution.is_match());
    assert!(resolution.operation(&Method::GET).is_some());
    assert!(resolution.operation(&Method::POST).is_none());
}

#[test]
fn test_introspection() {
    let contract = contract(
        &["https://x.com/v1", "https://y.com"],
        &[("/a", GET), ("/b/{.x}", GET), ("/c/{id}", GET)],
    );
    let resolver = PathResolver::new(contract).unwrap();
    assert_eq!(resolver.base_paths(), ["/v1", "/"]);
    assert_eq!(resolver.templates().collect::<Vec<_>>(), ["/a", "/b/{.x}", "/c/{id}"]);
    assert_eq!(resolver.indexed_template_count(), 2);
    assert!(resolver.malformed_templates().is_empty());
}

/// Resolve every request with both engine settings and compare the results.
///
/// When the tree indexes every template, its direct hits are also compared
/// with the linear winner.
fn assert_engines_agree(templates: &[(&str, &[Method])], requests: &[&str]) {
    let contract = contract(&[], templates);
    let paths = contract.paths.as_ref().unwrap();
    let indexed = PathLookup::build(paths);
    let linear = LinearMatcher::new(paths, Vec::new(), Some(SegmentCache::new()));
    let engines: [&dyn PathMatcher; 2] = [&indexed, &linear];
    let fully_indexed = templates.iter().all(|(t, _)| indexed.is_indexed(t));

    let via_index = PathResolver::new(Arc::clone(&contract)).unwrap();
    let via_scan = linear_only(Arc::clone(&contract));

    for path in requests {
        for method in [Method::GET, Method::POST] {
            if fully_indexed {
                let outcomes: Vec<Option<String>> = engines
                    .iter()
                    .map(|engine| match engine.find(&method, path) {
                        MatchOutcome::Found(m) => Some(m.template.to_string()),
                        _ => None,
                    })
                    .collect();
                // a found result from the tree must be the linear winner
                if outcomes[0].is_some() {
                    assert_eq!(outcomes[0], outcomes[1], "{method} {path}");
                }
            }

            let a = via_index.resolve(&method, path);
            let b = via_scan.resolve(&method, path);
            assert_eq!(a.matched_template, b.matched_template, "{method} {path}");
            assert_eq!(a.errors, b.errors, "{method} {path}");
        }
    }
}

#[test]
fn test_indexed_and_linear_engines_agree() {
    let templates: &[(&str, &[Method])] = &[
        ("/", GET),
        ("/pets", &[Method::GET, Method::POST]),
        ("/pets/{petId}", GET),
        ("/pets/{petName}", GET),
        ("/pets/mine", &[Method::POST]),
        ("/pets/{petId}/toys/{toyId}", GET),
        ("/pets/{petId}/toys/favourite", GET),
        ("/api/{version}/users/{id}", GET),
        ("/api/v1/users/{id}", GET),
        ("/api/v1/users/me", GET),
        ("/{tenant}/users/{id}", GET),
        ("/a/b/c", GET),
        ("/a/{x}/d", GET),
        ("/Messages/{id}", GET),
        ("/Messages/Operations", GET),
    ];
    let requests = [
        "/",
        "/pets",
        "/pets/",
        "/pets/fluffy",
        "/pets/mine",
        "/pets/1/toys/2",
        "/pets/1/toys/favourite",
        "/api/v1/users/me",
        "/api/v1/users/123",
        "/api/v2/users/123",
        "/acme/users/123",
        "/a/b/c",
        "/a/b/d",
        "/a/z/d",
        "/Messages/Operations",
        "/Messages/42",
        "/nowhere/at/all",
        "/pets/1/toys",
    ];
    assert_engines_agree(templates, &requests);
}

#[test]
fn test_engines_agree_on_fragment_templates() {
    assert_engines_agree(
        &[("/hashy#one", GET), ("/hashy", GET), ("/hashy#two", &[Method::POST])],
        &["/hashy", "/hashy#one", "/hashy#two", "/hashy#three"],
    );
}

#[test]
fn test_engines_agree_on_mixed_placeholder_styles() {
    assert_engines_agree(
        &[
            ("/orders/{;m}/items", GET),
            ("/orders/{id}/{sub}", GET),
            ("/orders/{id}/items", &[Method::POST]),
            ("/pets/{.fmt}", GET),
            ("/pets/{id}", GET),
            ("/files/{name*}", &[Method::POST]),
            ("/files/{name}", GET),
            ("/entities('{Entity}')", GET),
            ("/{tenant}", GET),
        ],
        &[
            "/orders/;m=1/items",
            "/orders/7/items",
            "/orders/7/other",
            "/pets/.json",
            "/pets/7",
            "/files/a,b",
            "/entities('1')",
            "/acme",
        ],
    );
}

#[test]
fn test_unindexed_template_outranks_tree_hit() {
    let templates: &[(&str, &[Method])] =
        &[("/orders/{;m}/items", GET), ("/orders/{id}/{sub}", GET)];
    let resolution = resolver(templates).resolve(&Method::GET, "/orders/;m=1/items");
    assert!(resolution.is_match());
    assert_eq!(
        resolution.matched_template.as_deref(),
        Some("/orders/{;m}/items")
    );
    assert_eq!(resolution.engine, MatchEngine::Linear);

    let scanned =
        linear_only(contract(&[], templates)).resolve(&Method::GET, "/orders/;m=1/items");
    assert_eq!(scanned.matched_template, resolution.matched_template);

    // the tree hit stands when nothing unindexed outranks it
    let plain = resolver(templates).resolve(&Method::GET, "/orders/7/other");
    assert_eq!(plain.matched_template.as_deref(), Some("/orders/{id}/{sub}"));
    assert_eq!(plain.engine, MatchEngine::Indexed);
}

#[test]
fn test_earlier_unindexed_template_wins_tie() {
    let earlier = resolver(&[("/pets/{.fmt}", GET), ("/pets/{id}", GET)]);
    let resolution = earlier.resolve(&Method::GET, "/pets/.json");
    assert_eq!(resolution.matched_template.as_deref(), Some("/pets/{.fmt}"));

    let later = resolver(&[("/pets/{id}", GET), ("/pets/{.fmt}", GET)]);
    let later = later.resolve(&Method::GET, "/pets/.json");
    assert_eq!(later.matched_template.as_deref(), Some("/pets/{id}"));
    assert_eq!(later.engine, MatchEngine::Indexed);
}

#[test]
fn test_double_slash_target_is_not_an_authority() {
    let resolver = resolver(&[("/pets/{id}", GET), ("/{id}", GET)]);
    let resolution = resolver.resolve(&Method::GET, "//pets/1");
    assert!(!resolution.is_match());
    assert!(resolution.matched_template.is_none());
    assert_eq!(resolution.errors[0].request_path, "//pets/1");
}

#[test]
fn test_percent_encoded_targets_match_decoded_templates() {
    let resolver = resolver(&[("/my pets", GET), ("/café/{id}", GET)]);

    let spaced = resolver.resolve(&Method::GET, "https://x.com/my pets");
    assert_eq!(spaced.matched_template.as_deref(), Some("/my pets"));
    let encoded = resolver.resolve(&Method::GET, "/my%20pets");
    assert_eq!(encoded.matched_template.as_deref(), Some("/my pets"));

    let utf8 = resolver.resolve(&Method::GET, "https://x.com/café/1");
    assert_eq!(utf8.matched_template.as_deref(), Some("/café/{id}"));
    assert_eq!(utf8.engine, MatchEngine::Indexed);
}

#[test]
fn test_indexed_miss_falls_back_to_linear() {
    let resolver = resolver(&[("/a/b/c", GET), ("/a/{x}/d", GET)]);
    let resolution = resolver.resolve(&Method::GET, "/a/b/d");
    assert_eq!(resolution.matched_template.as_deref(), Some("/a/{x}/d"));
    assert_eq!(resolution.engine, MatchEngine::Linear);
}

#[test]
fn test_concurrent_resolution() {
    let resolver = resolver(&[
        ("/entities('{Entity}')", GET),
        ("/pets/{id}", GET),
        ("/pets/mine", GET),
        ("/colors/{.c}", GET),
    ]);
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for i in 0..200 {
                    let entity = resolver.resolve(&Method::GET, &format!("/entities('{i}')"));
                    assert_eq!(
                        entity.matched_template.as_deref(),
                        Some("/entities('{Entity}')")
                    );
                    let mine = resolver.resolve(&Method::GET, "/pets/mine");
                    assert_eq!(mine.matched_template.as_deref(), Some("/pets/mine"));
                }
            });
        }
    });
}
