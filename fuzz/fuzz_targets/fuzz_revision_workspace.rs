//! Fuzz target for mapping revision strings to spool workspaces.
//!
//! Any accepted revision must stay inside `rev/` of the spool.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_revision_workspace
//! ```

#![no_main]

use godep_spool::SpoolLayout;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|rev: &str| {
    let layout = SpoolLayout::new("/spool");
    if let Some(ws) = layout.revision_workspace(rev) {
        assert!(ws.starts_with("/spool/rev"));
        assert_eq!(ws.components().count(), 5);
    }
});
