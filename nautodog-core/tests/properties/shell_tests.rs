//! Property tests for shell command construction

use nautodog_core::remote::OwnershipSnapshot;
use nautodog_core::remote::shell::{self, Elevation, quote};
use proptest::prelude::*;

use crate::common::unquote;

/// Strategy for remote path segments, including awkward characters
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._'$&;|-]{1,12}".prop_filter("not a dot segment", |s| s != "." && s != "..")
}

proptest! {
    /// Property: a quoted value is read back by the shell as one word
    #[test]
    fn quote_round_trips(value in any::<String>()) {
        let quoted = quote(&value);
        prop_assert_eq!(unquote(&quoted), Some(value));
    }

    /// Property: quoted values never leave a single quote open
    #[test]
    fn quote_is_balanced(value in any::<String>()) {
        let quoted = quote(&value);
        prop_assert!(quoted.starts_with('\''));
        prop_assert!(quoted.ends_with('\''));
        prop_assert_eq!(quoted.matches('\'').count() % 2, 0);
    }

    /// Property: parent and file name recompose the path
    #[test]
    fn parent_and_name_recompose(segments in prop::collection::vec(segment_strategy(), 1..5)) {
        let path = format!("/{}", segments.join("/"));
        let parent = shell::parent_dir(&path);
        let name = shell::file_name(&path);
        prop_assert_eq!(name, segments.last().unwrap().as_str());
        prop_assert_eq!(shell::join(&parent, name), path);
    }

    /// Property: elevation only prefixes
    #[test]
    fn elevation_prefixes_command(command in "[a-z]{1,8}( '[a-z/]{1,12}')?") {
        let sudo = Elevation::default();
        prop_assert_eq!(sudo.apply(&command), format!("sudo {command}"));
        prop_assert_eq!(Elevation::new("").apply(&command), command);
    }

    /// Property: well-formed stat output parses back into its parts
    #[test]
    fn stat_output_parses(
        owner in "[a-z_][a-z0-9_-]{0,15}",
        group in "[a-z_][a-z0-9_-]{0,15}",
        mode in "[0-7]{3,4}",
    ) {
        let snapshot = OwnershipSnapshot::parse(&format!("{owner}:{group} {mode}\n")).unwrap();
        prop_assert_eq!(snapshot.owner, owner);
        prop_assert_eq!(snapshot.group, group);
        prop_assert_eq!(snapshot.mode, mode);
    }

    /// Property: trailing shell metacharacters make stat output unusable
    #[test]
    fn stat_parse_rejects_trailing_metacharacters(noise in "[;&|`$()<>][ -~]{0,10}") {
        let output = format!("root:root 644{noise}");
        prop_assert!(OwnershipSnapshot::parse(&output).is_none());
    }
}
