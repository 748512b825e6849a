//! CLI Exit Code Registry
//!
//! Single source of truth for `tripsheet` exit codes. Scripts that wrap the
//! monthly merge rely on them, so codes are never renumbered.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | General error (unspecified)                                |
//! | 2    | Usage error (bad arguments, bad glob pattern)              |
//! | 3    | I/O error (cannot read input directory, cannot write CSV)  |
//! | 4    | Profile cannot be read, parsed or validated                |
//! | 5    | Nothing to merge: no records produced, no file written     |
//! | 6    | Partial: output written but at least one workbook failed   |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or glob pattern.
pub const EXIT_USAGE: u8 = 2;

/// Reading inputs or writing the merged CSV failed.
pub const EXIT_IO: u8 = 3;

/// Profile file unreadable, malformed, or failing validation.
pub const EXIT_PROFILE_INVALID: u8 = 4;

/// No workbook produced a single record. No output file is written.
pub const EXIT_NOTHING_TO_MERGE: u8 = 5;

/// Merged output was written, but one or more workbooks could not be loaded.
pub const EXIT_PARTIAL: u8 = 6;
