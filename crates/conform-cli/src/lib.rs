//! # conform-cli: Command-Line Front End
//!
//! Provides the `conform` binary. Argument parsing, printing and exit-code
//! mapping live here; every check is delegated to `conform-schema`.
//!
//! ## Invocation
//!
//! ```bash
//! conform contracts/policy_snapshot.schema.json /tmp/snapshot.json
//! conform contracts/aussen_event.schema.json data/samples/aussensensor.jsonl
//! conform --schemas contracts/ --samples data/samples/
//! ```
//!
//! ## Exit status
//!
//! | Code | Meaning                                  |
//! |------|------------------------------------------|
//! | 0    | every checked record conforms            |
//! | 1    | validation, load or operational failure  |
//! | 2    | usage error                              |

pub mod output;
pub mod validate;

/// Every checked record conforms.
pub const EXIT_OK: u8 = 0;
/// Validation, load or operational failure.
pub const EXIT_FAILED: u8 = 1;
/// Unrecognised argument combination.
pub const EXIT_USAGE: u8 = 2;
