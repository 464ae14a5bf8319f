//! Property tests for remote predicates and probing

use nautodog_core::remote::{
    EXISTS_MARKER, NOT_EXISTS_MARKER, READABLE_MARKER, RemotePredicate, UNREADABLE_MARKER,
};
use proptest::prelude::*;

use crate::common::{FakeFile, FakeRemote};

/// Strategy for output lines that are not markers
fn noise_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,40}".prop_filter("must not be a marker", |line| {
        let trimmed = line.trim();
        ![READABLE_MARKER, UNREADABLE_MARKER, EXISTS_MARKER, NOT_EXISTS_MARKER].contains(&trimmed)
    })
}

proptest! {
    /// Property: a marker line decides the answer regardless of other lines
    #[test]
    fn marker_line_decides(
        before in prop::collection::vec(noise_strategy(), 0..4),
        after in prop::collection::vec(noise_strategy(), 0..4),
        value in any::<bool>(),
    ) {
        let predicate = RemotePredicate::readable_file("/etc/hosts");
        let marker = if value { READABLE_MARKER } else { UNREADABLE_MARKER };
        let mut lines = before;
        lines.push(marker.to_string());
        lines.extend(after);
        prop_assert_eq!(predicate.parse(&lines.join("\n")).unwrap(), value);
    }

    /// Property: output without a marker line is never read as false
    #[test]
    fn output_without_marker_is_an_error(lines in prop::collection::vec(noise_strategy(), 0..6)) {
        let predicate = RemotePredicate::readable_file("/etc/hosts");
        prop_assert!(predicate.parse(&lines.join("\n")).is_err());
    }

    /// Property: markers embedded in longer lines do not count
    #[test]
    fn embedded_markers_do_not_count(prefix in "[a-z]{1,5}", suffix in "[a-z]{0,5}") {
        let predicate = RemotePredicate::readable_file("/etc/hosts");
        let output = format!("{prefix}{READABLE_MARKER}{suffix}\n{prefix}{UNREADABLE_MARKER}");
        prop_assert!(predicate.parse(&output).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: probing reports exactly whether the file exists and is readable
    #[test]
    fn probe_matches_remote_state(
        name in "[a-z][a-z0-9_.-]{0,10}",
        exists in any::<bool>(),
        readable in any::<bool>(),
    ) {
        let path = format!("/data/{name}");
        let mut remote = FakeRemote::new().with_dir("/data");
        if exists {
            let file = FakeFile::new(b"x", "root", "root", "644");
            remote = remote.with_file(&path, if readable { file } else { file.unreadable() });
        }
        let mut host = remote.host();
        host.connect().unwrap();

        prop_assert_eq!(host.probe(&path).unwrap(), exists && readable);
    }
}
