//! Property tests for the comment marker codec

use std::collections::BTreeMap;

use proptest::prelude::*;
use reviewbot::core::services::marker::{self, MarkerInfo};

fn token() -> impl Strategy<Value = String> {
    // printable ASCII plus the characters that need escaping
    "[ -~\t\n%=>]{1,16}"
}

fn info() -> impl Strategy<Value = MarkerInfo> {
    (
        token(),
        proptest::option::of(token()),
        proptest::collection::btree_map("[a-z_]{1,8}", token(), 0..4),
    )
        .prop_map(|(state, result, extra): (String, Option<String>, BTreeMap<String, String>)| {
            let mut info = MarkerInfo::new(&state, result.as_deref());
            info.extend(&extra);
            info
        })
}

proptest! {
    #[test]
    fn marker_roundtrips(message in "[ -~\n]{0,200}", bot in token(), info in info()) {
        let body = marker::encode(&message, &bot, &info);
        let decoded = marker::decode(&body).unwrap();

        prop_assert_eq!(&decoded.bot, &bot);
        prop_assert_eq!(&decoded.info, &info);
        prop_assert_eq!(marker::strip(&body), message.trim());
    }

    #[test]
    fn truncation_keeps_marker(message in "[a-z ]{0,400}", max in 60usize..200) {
        let info = MarkerInfo::new("done", Some("accepted"));
        let body = marker::encode(&message, "check-source", &info);
        let cut = marker::truncate(&body, max);

        prop_assert!(cut.chars().count() <= max);
        prop_assert_eq!(marker::decode(&cut).map(|m| m.info), Some(info));
    }
}
