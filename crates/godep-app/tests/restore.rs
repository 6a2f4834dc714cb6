//! Restore scenarios against the filesystem fakes.

use camino::Utf8PathBuf;
use godep_app::{RestoreError, RestoreFailure, RestoreInput, RestoreOutcome, RestoreReport, run_restore};
use godep_spool::{SpoolError, SpoolLayout};
use godep_test_util::{FakeUpstream, FakeVcs, StaticLoader, StaticResolver, package, utf8_root};
use godep_types::{ImportPath, Manifest, PinnedDependency};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    root: Utf8PathBuf,
    layout: SpoolLayout,
    vcs: FakeVcs,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        Self {
            layout: SpoolLayout::new(root.join("spool")),
            root,
            _tmp: tmp,
            vcs: FakeVcs::new(),
        }
    }

    fn upstream(&self, name: &str) -> FakeUpstream {
        FakeUpstream::new(self.root.join("upstream").join(name))
    }

    fn restore(
        &self,
        manifest: &Manifest,
        loader: &StaticLoader,
        resolver: &StaticResolver,
    ) -> anyhow::Result<RestoreReport> {
        let text = manifest.to_json().expect("serialize");
        run_restore(RestoreInput {
            manifest_text: &text,
            loader,
            resolver,
            layout: &self.layout,
            fast_remote: "fast",
            main_remote: "main",
            jobs: 4,
        })
    }
}

fn manifest(deps: &[(&str, &str)]) -> Manifest {
    let mut m = Manifest::new(ImportPath::new("example.com/prog"), "go1.2");
    m.deps = deps
        .iter()
        .map(|(path, rev)| PinnedDependency::new(ImportPath::new(path), *rev, ""))
        .collect();
    m
}

fn failure(err: &anyhow::Error) -> &RestoreFailure {
    err.downcast_ref::<RestoreFailure>().expect("restore failure")
}

#[test]
fn empty_manifest_is_a_no_op() {
    let fx = Fixture::new();
    let loader = StaticLoader::failing("must not be called");
    let report = fx.restore(&manifest(&[]), &loader, &StaticResolver::new()).expect("restore");
    assert!(report.entries.is_empty());
    assert!(loader.requests().is_empty());
    assert!(!fx.layout.root().exists());
}

#[test]
fn second_restore_performs_no_fetch() {
    let fx = Fixture::new();
    let up = fx.upstream("a");
    up.commit("deadbeef", &[("a.go", "package a\n"), ("util/u.go", "package util\n")]);
    let resolver = StaticResolver::new().with_root("lib/a", up.url(), Arc::new(fx.vcs.clone()));
    let m = manifest(&[("lib/a", "deadbeef")]);

    let first = fx.restore(&m, &StaticLoader::new(), &resolver).expect("first restore");
    assert_eq!(first.entries, vec![(ImportPath::new("lib/a"), RestoreOutcome::Restored)]);
    let checkout = fx.root.join("spool/rev/de/adbeef/src/lib/a");
    assert_eq!(
        std::fs::read_to_string(checkout.join("util/u.go")).expect("read"),
        "package util\n"
    );
    assert_eq!(fx.vcs.fetches(), 1);

    let second = fx.restore(&m, &StaticLoader::new(), &resolver).expect("second restore");
    assert_eq!(second.count(RestoreOutcome::Skipped), 1);
    assert_eq!(fx.vcs.fetches(), 1);
    assert_eq!(fx.vcs.checkouts(), 1);
}

#[test]
fn existing_checkout_is_skipped_without_fetching() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.root.join("spool/rev/de/adbeef/src/lib/a")).expect("mkdir");
    let resolver = StaticResolver::new().with_root("lib/a", "https://example.com/a", Arc::new(fx.vcs.clone()));

    let report = fx
        .restore(&manifest(&[("lib/a", "deadbeef")]), &StaticLoader::new(), &resolver)
        .expect("restore");
    assert_eq!(report.entries, vec![(ImportPath::new("lib/a"), RestoreOutcome::Skipped)]);
    assert_eq!(fx.vcs.fetches(), 0);
    assert!(!fx.root.join("spool/repo").exists());
}

#[test]
fn revision_missing_after_fetch_is_unknown() {
    let fx = Fixture::new();
    let up = fx.upstream("a");
    up.commit("cafebabe", &[("a.go", "package a\n")]);
    let resolver = StaticResolver::new().with_root("lib/a", up.url(), Arc::new(fx.vcs.clone()));

    let err = fx
        .restore(&manifest(&[("lib/a", "deadbeef")]), &StaticLoader::new(), &resolver)
        .unwrap_err();
    match failure(&err).errors.as_slice() {
        [RestoreError::Checkout {
            source: SpoolError::UnknownRevision { import_path, rev },
            ..
        }] => {
            assert_eq!(import_path.as_str(), "lib/a");
            assert_eq!(rev, "deadbeef");
        }
        other => panic!("unexpected errors: {other:?}"),
    }
    assert!(err.to_string().contains("unknown rev deadbeef for lib/a"));
}

#[test]
fn ambient_copy_is_fetched_before_upstream() {
    let fx = Fixture::new();
    let ambient = fx.root.join("gopath");
    let local = FakeUpstream::new(ambient.join("src/example.com/a"));
    local.commit("deadbeef", &[("a.go", "package a\n")]);
    // The canonical upstream does not exist; fetching it would fail.
    let resolver = StaticResolver::new().with_root(
        "example.com/a",
        fx.root.join("nowhere").as_str(),
        Arc::new(fx.vcs.clone()),
    );
    let loader = StaticLoader::new().with_package(package(&ambient, "example.com/a", &[]));

    let report = fx
        .restore(&manifest(&[("example.com/a", "deadbeef")]), &loader, &resolver)
        .expect("restore");
    assert_eq!(report.count(RestoreOutcome::Restored), 1);
    assert_eq!(fx.vcs.fetches(), 1);

    let requested = loader.requests();
    let names: Vec<&str> = requested[0].iter().map(ImportPath::as_str).collect();
    assert_eq!(names, ["example.com/prog", "example.com/a"]);
}

#[test]
fn upstream_is_fetched_when_the_ambient_copy_lacks_the_revision() {
    let fx = Fixture::new();
    let ambient = fx.root.join("gopath");
    let local = FakeUpstream::new(ambient.join("src/example.com/a"));
    local.commit("0ld0ld00", &[("a.go", "package a // old\n")]);
    let up = fx.upstream("a");
    up.commit("deadbeef", &[("a.go", "package a // new\n")]);

    let resolver = StaticResolver::new().with_root("example.com/a", up.url(), Arc::new(fx.vcs.clone()));
    let loader = StaticLoader::new().with_package(package(&ambient, "example.com/a", &[]));

    fx.restore(&manifest(&[("example.com/a", "deadbeef")]), &loader, &resolver)
        .expect("restore");
    assert_eq!(fx.vcs.fetches(), 2);
    let text = std::fs::read_to_string(fx.root.join("spool/rev/de/adbeef/src/example.com/a/a.go"))
        .expect("read");
    assert_eq!(text, "package a // new\n");
}

#[test]
fn revisions_of_one_root_share_a_single_fetch() {
    let fx = Fixture::new();
    let up = fx.upstream("lib");
    up.commit("aaa111", &[("one/one.go", "package one\n")]);
    up.commit("bbb222", &[("two/two.go", "package two\n")]);
    let resolver = StaticResolver::new().with_root("example.com/lib", up.url(), Arc::new(fx.vcs.clone()));

    let report = fx
        .restore(
            &manifest(&[("example.com/lib/one", "aaa111"), ("example.com/lib/two", "bbb222")]),
            &StaticLoader::new(),
            &resolver,
        )
        .expect("restore");
    assert_eq!(report.count(RestoreOutcome::Restored), 2);
    assert_eq!(fx.vcs.fetches(), 1);

    let one = fx.root.join("spool/rev/aa/a111/src/example.com/lib/one/one.go");
    let two = fx.root.join("spool/rev/bb/b222/src/example.com/lib/two/two.go");
    assert!(one.is_file() && two.is_file());
    assert!(fx.root.join("spool/repo/example.com/lib").is_dir());
}

#[test]
fn resolution_failure_aborts_before_any_fetch() {
    let fx = Fixture::new();
    let up = fx.upstream("a");
    up.commit("deadbeef", &[("a.go", "package a\n")]);
    let resolver = StaticResolver::new().with_root("lib/a", up.url(), Arc::new(fx.vcs.clone()));

    let err = fx
        .restore(
            &manifest(&[("lib/a", "deadbeef"), ("unknown.org/x", "deadbeef")]),
            &StaticLoader::new(),
            &resolver,
        )
        .unwrap_err();
    assert!(format!("{err:#}").contains("unknown.org/x"));
    assert_eq!(fx.vcs.fetches(), 0);
    assert!(!fx.layout.root().exists());
}

#[test]
fn one_failure_does_not_stop_the_others() {
    let fx = Fixture::new();
    let good = fx.upstream("good");
    good.commit("deadbeef", &[("g.go", "package g\n")]);
    let resolver = StaticResolver::new()
        .with_root("lib/good", good.url(), Arc::new(fx.vcs.clone()))
        .with_root("lib/bad", fx.root.join("nowhere").as_str(), Arc::new(fx.vcs.clone()));

    let err = fx
        .restore(
            &manifest(&[("lib/bad", "deadbeef"), ("lib/good", "deadbeef")]),
            &StaticLoader::new(),
            &resolver,
        )
        .unwrap_err();
    let f = failure(&err);
    assert!(matches!(f.errors.as_slice(), [RestoreError::Fetch { .. }]));
    assert_eq!(f.errors[0].import_path().as_str(), "lib/bad");
    assert_eq!(f.report.entries, vec![(ImportPath::new("lib/good"), RestoreOutcome::Restored)]);
}

#[test]
fn malformed_manifest_is_a_parse_error() {
    let fx = Fixture::new();
    let err = run_restore(RestoreInput {
        manifest_text: "{\"ImportPath\": ",
        loader: &StaticLoader::new(),
        resolver: &StaticResolver::new(),
        layout: &fx.layout,
        fast_remote: "fast",
        main_remote: "main",
        jobs: 1,
    })
    .unwrap_err();
    assert!(err.to_string().contains("parse manifest"));
}

#[test]
fn empty_repository_cache_left_by_a_failed_run_is_recreated() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.root.join("spool/repo/lib/a")).expect("mkdir");
    let up = fx.upstream("a");
    up.commit("deadbeef", &[("a.go", "package a\n")]);
    let resolver = StaticResolver::new().with_root("lib/a", up.url(), Arc::new(fx.vcs.clone()));

    let report = fx
        .restore(&manifest(&[("lib/a", "deadbeef")]), &StaticLoader::new(), &resolver)
        .expect("restore");
    assert_eq!(report.entries, vec![(ImportPath::new("lib/a"), RestoreOutcome::Restored)]);
    assert!(fx.root.join("spool/rev/de/adbeef/src/lib/a/a.go").is_file());
}

#[test]
fn each_ambient_copy_of_a_shared_root_is_fetched() {
    let fx = Fixture::new();
    let first = fx.root.join("gopath-one");
    let second = fx.root.join("gopath-two");
    FakeUpstream::new(first.join("src/example.com/lib")).commit("aaa111", &[("one/one.go", "package one\n")]);
    FakeUpstream::new(second.join("src/example.com/lib")).commit("bbb222", &[("two/two.go", "package two\n")]);
    // Neither revision is reachable upstream.
    let resolver = StaticResolver::new().with_root(
        "example.com/lib",
        fx.root.join("nowhere").as_str(),
        Arc::new(fx.vcs.clone()),
    );
    let loader = StaticLoader::new()
        .with_package(package(&first, "example.com/lib/one", &[]))
        .with_package(package(&second, "example.com/lib/two", &[]));

    let report = fx
        .restore(
            &manifest(&[("example.com/lib/one", "aaa111"), ("example.com/lib/two", "bbb222")]),
            &loader,
            &resolver,
        )
        .expect("restore");
    assert_eq!(report.count(RestoreOutcome::Restored), 2);
    assert_eq!(fx.vcs.fetches(), 2);
    assert!(fx.root.join("spool/rev/bb/b222/src/example.com/lib/two/two.go").is_file());
}
