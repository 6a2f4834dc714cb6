//! Property tests for the persisted manifest contract.

use godep_types::{ImportPath, Manifest, PinnedDependency};
use proptest::prelude::*;

fn import_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9.]{0,8}", 1..5).prop_map(|segs| segs.join("/"))
}

fn dependency() -> impl Strategy<Value = PinnedDependency> {
    (import_path(), "[0-9a-f]{3,40}", "[ -~]{0,20}").prop_map(|(path, rev, comment)| {
        PinnedDependency::new(ImportPath::new(path), rev, comment)
    })
}

proptest! {
    #[test]
    fn persisted_manifest_parses_back_identically(
        root in import_path(),
        go_version in "[ -~]{0,30}",
        deps in prop::collection::vec(dependency(), 0..6),
    ) {
        let mut m = Manifest::new(ImportPath::new(root), go_version);
        m.deps = deps;

        let text = m.to_json().expect("serialize");
        let back = Manifest::from_json(&text).expect("parse");

        prop_assert_eq!(&back.import_path, &m.import_path);
        prop_assert_eq!(back.deps.len(), m.deps.len());
        for (a, b) in back.deps.iter().zip(m.deps.iter()) {
            prop_assert_eq!(&a.import_path, &b.import_path);
            prop_assert_eq!(&a.rev, &b.rev);
            prop_assert_eq!(&a.comment, &b.comment);
        }
    }

    #[test]
    fn parser_never_panics(input in ".*") {
        let _ = godep_types::fuzz::parse_manifest(&input);
    }
}

#[test]
fn empty_comment_is_not_written() {
    let mut m = Manifest::new(ImportPath::new("example.com/prog"), "");
    m.deps.push(PinnedDependency::new(ImportPath::new("lib/a"), "deadbeef", ""));
    let text = m.to_json().expect("serialize");
    assert!(!text.contains("Comment"));
    assert!(text.ends_with("}\n"));
}
